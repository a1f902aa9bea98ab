//! Hook timing configuration, typically deserialized from the runtime's
//! TOML config file.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HookConfig {
    /// Delay between an instance-created notification and hooking, letting
    /// the widget's internal initialization settle.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// How long to keep the formatting options disabled after a paste, so
    /// the widget's asynchronous post-processing cannot re-trigger on the
    /// inserted text.
    #[serde(default = "default_restore_delay_ms")]
    pub option_restore_delay_ms: u64,
}

fn default_settle_delay_ms() -> u64 {
    100
}

fn default_restore_delay_ms() -> u64 {
    500
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
            option_restore_delay_ms: default_restore_delay_ms(),
        }
    }
}

impl HookConfig {
    /// Short delays for tests that drive real sleeps.
    pub fn fast() -> Self {
        Self {
            settle_delay_ms: 5,
            option_restore_delay_ms: 5,
        }
    }
}
