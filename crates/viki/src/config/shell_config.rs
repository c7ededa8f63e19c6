use crate::config::{DEFAULT_DRAIN_TICK_MS, default_true};

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Desktop shell configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Interval between two mailbox drains on the UI thread.
    #[serde(default = "default_drain_tick_ms")]
    pub drain_tick_ms: u64,

    /// Register CTRL+SHIFT+Space to toggle listening.
    #[serde(default = "default_true")]
    pub hotkey_enabled: bool,

    /// Read typed commands from standard input.
    #[serde(default = "default_true")]
    pub console_enabled: bool,
}

impl ShellConfig {
    /// Drain interval, never zero.
    pub fn drain_tick(&self) -> Duration {
        Duration::from_millis(self.drain_tick_ms.max(1))
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            drain_tick_ms: DEFAULT_DRAIN_TICK_MS,
            hotkey_enabled: true,
            console_enabled: true,
        }
    }
}

fn default_drain_tick_ms() -> u64 {
    DEFAULT_DRAIN_TICK_MS
}
