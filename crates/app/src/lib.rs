pub mod config;
pub mod runtime;

pub use config::OverrideConfig;
pub use runtime::{Runtime, StatusSnapshot};
