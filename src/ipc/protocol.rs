//! IPC message protocol definitions
//!
//! All messages are JSON-encoded, prefixed with a 4-byte little-endian length.

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::gesture::{MenuAction, MenuReply};
use crate::layout::Layout;
use crate::strategy::SwitchingAlgorithm;
use crate::switcher::SwitcherStatus;

/// Largest accepted message body
pub const MAX_FRAME_LEN: usize = 1024 * 1024;

/// Requests from the tray side to the daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Ping to check connectivity
    Ping,

    /// Request current daemon status
    GetStatus,

    /// Switch layout now, with the given or the configured algorithm
    Switch {
        #[serde(default)]
        algorithm: Option<SwitchingAlgorithm>,
    },

    /// Change the configured algorithm
    SetAlgorithm { algorithm: SwitchingAlgorithm },

    /// Forget strategy memory
    ResetStrategies,
}

impl Request {
    /// Menu action this request maps to, `None` for requests the server answers itself
    pub fn action(&self) -> Option<MenuAction> {
        match self {
            Request::Ping => None,
            Request::GetStatus => Some(MenuAction::Status),
            Request::Switch { algorithm } => Some(MenuAction::Switch(*algorithm)),
            Request::SetAlgorithm { algorithm } => Some(MenuAction::SetAlgorithm(*algorithm)),
            Request::ResetStrategies => Some(MenuAction::ResetStrategies),
        }
    }
}

/// Responses from daemon to the tray side
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Pong response to ping
    Pong,

    /// Current daemon status
    Status(DaemonStatus),

    /// A layout was activated
    Switched { layout: Layout },

    /// Configured algorithm changed
    AlgorithmSet { algorithm: SwitchingAlgorithm },

    /// Strategy memory cleared
    Reset,

    /// Error response
    Error { code: String, message: String },
}

impl Response {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Response::Error {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Full daemon status snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonStatus {
    /// Daemon version
    pub version: String,

    /// Whether the hotkey is registered
    pub hotkey_registered: bool,

    /// Uptime in seconds
    pub uptime_secs: u64,

    pub switcher: SwitcherStatus,
}

impl DaemonStatus {
    pub fn new(switcher: SwitcherStatus, hotkey_registered: bool, uptime_secs: u64) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            hotkey_registered,
            uptime_secs,
            switcher,
        }
    }
}

/// Convert a driver reply to a response; status replies need the daemon fields
pub fn response_for(reply: MenuReply, hotkey_registered: bool, uptime_secs: u64) -> Response {
    match reply {
        MenuReply::Switched(layout) => Response::Switched { layout },
        MenuReply::AlgorithmSet(algorithm) => Response::AlgorithmSet { algorithm },
        MenuReply::Reset => Response::Reset,
        MenuReply::Status(switcher) => {
            Response::Status(DaemonStatus::new(switcher, hotkey_registered, uptime_secs))
        }
        MenuReply::Failed(e) => Response::error(e.code(), e.to_string()),
    }
}

/// Read one length-prefixed JSON message; `None` on a clean end of stream
pub async fn read_message<R, T>(reader: &mut R) -> Result<Option<T>>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_FRAME_LEN {
        bail!("message too large: {} bytes", len);
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;

    let message = serde_json::from_slice(&body).context("failed to parse message")?;
    Ok(Some(message))
}

/// Write one length-prefixed JSON message
pub async fn write_message<W, T>(writer: &mut W, message: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let body = serde_json::to_vec(message)?;
    let len = (body.len() as u32).to_le_bytes();

    writer.write_all(&len).await?;
    writer.write_all(&body).await?;
    writer.flush().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutHandle;
    use crate::switcher::SwitchError;

    fn frame(json: &str) -> Vec<u8> {
        let mut bytes = (json.len() as u32).to_le_bytes().to_vec();
        bytes.extend_from_slice(json.as_bytes());
        bytes
    }

    #[test]
    fn test_request_serialization() {
        let req = Request::SetAlgorithm {
            algorithm: SwitchingAlgorithm::MostRecent,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("set_algorithm"));
        assert!(json.contains("most_recent"));
    }

    #[test]
    fn test_switch_algorithm_is_optional() {
        let req: Request = serde_json::from_str(r#"{"type":"switch"}"#).unwrap();
        assert_eq!(req.action(), Some(MenuAction::Switch(None)));

        let req: Request = serde_json::from_str(r#"{"type":"switch","algorithm":"cycle"}"#).unwrap();
        assert_eq!(req.action(), Some(MenuAction::Switch(Some(SwitchingAlgorithm::Cycle))));

        assert_eq!(Request::Ping.action(), None);
    }

    #[test]
    fn test_failed_reply_carries_code() {
        let resp = response_for(MenuReply::Failed(SwitchError::NoLayoutsAvailable), true, 0);
        match resp {
            Response::Error { code, message } => {
                assert_eq!(code, "no_layouts_available");
                assert_eq!(message, "no keyboard layouts available");
            }
            other => panic!("unexpected response {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_read_message() {
        let mut stream = tokio_test::io::Builder::new()
            .read(&frame(r#"{"type":"ping"}"#))
            .build();

        let request: Option<Request> = read_message(&mut stream).await.unwrap();
        assert!(matches!(request, Some(Request::Ping)));

        let eof: Option<Request> = read_message(&mut stream).await.unwrap();
        assert!(eof.is_none());
    }

    #[tokio::test]
    async fn test_read_rejects_oversized_frame() {
        let len = ((MAX_FRAME_LEN + 1) as u32).to_le_bytes();
        let mut stream = tokio_test::io::Builder::new().read(&len).build();

        let result: Result<Option<Request>> = read_message(&mut stream).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_write_message() {
        let response = Response::Switched {
            layout: Layout::new(LayoutHandle(1), "A"),
        };
        let json = serde_json::to_string(&response).unwrap();
        let expected = frame(&json);

        let mut stream = tokio_test::io::Builder::new()
            .write(&expected[..4])
            .write(&expected[4..])
            .build();
        write_message(&mut stream, &response).await.unwrap();
    }
}
