//! Configuration loading and management

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::hotkey::Chord;
use crate::strategy::SwitchingAlgorithm;

const HOTKEY_VAR: &str = "LAYOUT_SWITCHER_HOTKEY";
const POLL_MS_VAR: &str = "LAYOUT_SWITCHER_POLL_MS";
const ALGORITHM_VAR: &str = "LAYOUT_SWITCHER_ALGORITHM";
const IPC_ADDR_VAR: &str = "LAYOUT_SWITCHER_IPC_ADDR";

const DEFAULT_POLL_MS: u64 = 200;
const DEFAULT_IPC_ADDR: &str = "127.0.0.1:47631";

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Hotkey chord; the first modifier triggers, the second re-arms taps
    pub chord: Chord,

    /// Modifier poll interval while a chord is in progress
    pub poll_interval: Duration,

    /// Algorithm used by plain menu activations
    pub algorithm: SwitchingAlgorithm,

    /// Loopback address of the menu command channel
    pub ipc_addr: SocketAddr,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let chord = match lookup(HOTKEY_VAR) {
            Some(value) => value
                .parse::<Chord>()
                .with_context(|| format!("invalid {}", HOTKEY_VAR))?,
            None => Chord::default(),
        };

        let poll_ms = match lookup(POLL_MS_VAR) {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .with_context(|| format!("invalid {}: '{}'", POLL_MS_VAR, value))?,
            None => DEFAULT_POLL_MS,
        };
        if poll_ms == 0 {
            bail!("{} must be greater than zero", POLL_MS_VAR);
        }

        let algorithm = match lookup(ALGORITHM_VAR) {
            Some(value) => value
                .parse::<SwitchingAlgorithm>()
                .with_context(|| format!("invalid {}", ALGORITHM_VAR))?,
            None => SwitchingAlgorithm::default(),
        };

        let ipc_addr: SocketAddr = lookup(IPC_ADDR_VAR)
            .as_deref()
            .unwrap_or(DEFAULT_IPC_ADDR)
            .trim()
            .parse()
            .with_context(|| format!("invalid {}", IPC_ADDR_VAR))?;
        if !ipc_addr.ip().is_loopback() {
            bail!("{} must be a loopback address, got {}", IPC_ADDR_VAR, ipc_addr);
        }

        Ok(Self {
            chord,
            poll_interval: Duration::from_millis(poll_ms),
            algorithm,
            ipc_addr,
        })
    }
}
