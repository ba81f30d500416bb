//! Notifications emitted by the switcher
//!
//! Fire-and-forget: the switcher never waits on or inspects the outcome of a
//! notification. The daemon fans them out over a broadcast channel.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::layout::Layout;

/// Events reported to the user-facing side
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// A layout was activated
    LayoutChanged {
        layout: Layout,
    },

    /// A switch attempt did not complete
    Error {
        message: String,
    },
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notification::LayoutChanged { layout } => write!(f, "Switched to: {}", layout.name()),
            Notification::Error { message } => write!(f, "Error: {}", message),
        }
    }
}

/// Receiver of switcher notifications
pub trait Notifier {
    fn notify(&self, notification: Notification);
}

impl Notifier for broadcast::Sender<Notification> {
    fn notify(&self, notification: Notification) {
        // No subscribers is not an error
        let _ = self.send(notification);
    }
}

/// Log every notification until the channel closes
pub async fn log_notifications(mut rx: broadcast::Receiver<Notification>) {
    loop {
        match rx.recv().await {
            Ok(notification @ Notification::LayoutChanged { .. }) => {
                info!(%notification, "layout notification");
            }
            Ok(notification @ Notification::Error { .. }) => {
                error!(%notification, "layout notification");
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(skipped = n, "notification receiver lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutHandle;

    #[test]
    fn test_notification_serialization() {
        let event = Notification::LayoutChanged {
            layout: Layout::new(LayoutHandle(0x0409_0409), "English"),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("layout_changed"));
        assert!(json.contains("English"));
    }

    #[test]
    fn test_notification_deserialization() {
        let json = r#"{"type":"error","message":"no keyboard layouts available"}"#;
        let event: Notification = serde_json::from_str(json).unwrap();
        assert!(matches!(event, Notification::Error { .. }));
        assert_eq!(event.to_string(), "Error: no keyboard layouts available");
    }

    #[test]
    fn test_broadcast_notifier_without_subscribers() {
        let (tx, rx) = broadcast::channel(4);
        drop(rx);
        tx.notify(Notification::Error {
            message: "ignored".to_string(),
        });
    }
}
