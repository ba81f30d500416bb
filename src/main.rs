//! layout-switcher: background daemon for keyboard layout switching
//!
//! The daemon registers one global modifier chord and reacts to it:
//! - A quick tap toggles between the two most recently used layouts
//! - Further presses while the chord is held cycle through all layouts
//! - A loopback IPC channel stands in for the tray menu
//!
//! Hotkey notifications, modifier polling and menu commands are all handled
//! on a single task, so the switching state is never shared.

// Only the Windows build wires the switcher into `run`
#![cfg_attr(not(windows), allow(dead_code))]

mod config;
mod events;
mod gesture;
mod hotkey;
mod ipc;
mod layout;
mod lifecycle;
mod platform;
mod strategy;
mod switcher;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "layout-switcher starting");

    // Load configuration
    let config = Config::load()?;
    info!(
        chord = %config.chord,
        poll_ms = config.poll_interval.as_millis() as u64,
        algorithm = %config.algorithm,
        ipc_addr = %config.ipc_addr,
        "configuration loaded"
    );

    run(config).await?;

    info!("layout-switcher stopped");
    Ok(())
}

#[cfg(windows)]
async fn run(config: Config) -> Result<()> {
    use anyhow::Context;
    use tokio::sync::{broadcast, mpsc};
    use tracing::{error, warn};

    use crate::events::{log_notifications, Notification};
    use crate::gesture::{GestureClassifier, GestureDriver};
    use crate::hotkey::HotkeyListener;
    use crate::ipc::Server;
    use crate::lifecycle::ShutdownSignal;
    use crate::platform::{Win32KeyProbe, Win32Layouts};
    use crate::strategy::StrategySet;
    use crate::switcher::{GestureBindings, SwitchController};

    let shutdown = ShutdownSignal::new();

    // Hotkey listener -> gesture driver
    let (hotkey_tx, hotkey_rx) = mpsc::channel(32);
    // IPC server -> gesture driver
    let (menu_tx, menu_rx) = mpsc::channel(32);
    // Switch controller -> notification log
    let (notify_tx, notify_rx) = broadcast::channel::<Notification>(64);
    let notifications = tokio::spawn(log_notifications(notify_rx));

    let mut controller = SwitchController::new(
        Win32Layouts::new(),
        notify_tx,
        StrategySet::standard(),
        GestureBindings::default(),
        config.algorithm,
    )
    .context("failed to configure switcher")?;

    let layouts = controller.refresh();
    info!(layouts, "keyboard layouts enumerated");

    // Start the hotkey listener (runs on dedicated thread)
    let hotkey_listener = HotkeyListener::new(config.chord, hotkey_tx);
    let hotkey_registered = match hotkey_listener.start() {
        Ok(()) => {
            info!(chord = %config.chord, "hotkey listener started");
            true
        }
        Err(e) => {
            error!(?e, "failed to start hotkey listener");
            warn!("continuing with the menu channel only");
            false
        }
    };

    let server = Server::bind(config.ipc_addr, menu_tx, hotkey_registered).await?;

    let mut driver = GestureDriver::new(
        GestureClassifier::new(config.chord),
        controller,
        Win32KeyProbe::new(),
        config.poll_interval,
    );

    info!("daemon initialized, entering main loop");

    tokio::select! {
        _ = driver.run(hotkey_rx, menu_rx) => {
            info!("gesture driver exited");
        }

        result = server.run() => {
            if let Err(e) = result {
                error!(?e, "IPC server error");
            }
        }

        result = shutdown.wait() => match result {
            Ok(()) => info!("shutdown signal received"),
            Err(e) => error!(?e, "failed to listen for shutdown signals"),
        },
    }

    // Cleanup
    info!("shutting down...");

    driver.shutdown();
    hotkey_listener.stop();
    server.shutdown().await;

    // Last notification sender goes with the controller
    drop(driver);
    let _ = notifications.await;

    Ok(())
}

#[cfg(not(windows))]
async fn run(config: Config) -> Result<()> {
    use tracing::error;

    error!(chord = %config.chord, "keyboard layout switching requires Windows");
    anyhow::bail!("unsupported platform")
}
