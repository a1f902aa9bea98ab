//! Runtime configuration, composed from the subsystem configs and loadable
//! from a TOML file.

use libreclip_editor::HookConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideConfig {
    /// Event types the interception policy drops. Fixed for the page's
    /// lifetime once the runtime starts.
    #[serde(default = "default_blocked_events")]
    pub blocked_events: Vec<String>,

    /// Instance hooking delays.
    #[serde(default)]
    pub hook: HookConfig,

    /// Staggered re-initialization passes after window load.
    #[serde(default = "default_post_load_delays")]
    pub post_load_delays_ms: Vec<u64>,
}

fn default_blocked_events() -> Vec<String> {
    [
        "copy",
        "cut",
        "paste",
        "selectstart",
        "contextmenu",
        "keydown",
        "keyup",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_post_load_delays() -> Vec<u64> {
    vec![100, 500, 1000]
}

impl Default for OverrideConfig {
    fn default() -> Self {
        Self {
            blocked_events: default_blocked_events(),
            hook: HookConfig::default(),
            post_load_delays_ms: default_post_load_delays(),
        }
    }
}

impl OverrideConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}
