//! # Popup rotation
//!
//! The decorative side of the extension: each time the popup opens, it shows
//! the next image in a fixed carousel. The index to show is resolved through
//! an ordered storage chain — extension storage, page-local storage, session
//! storage — with a random pick as the terminal fallback when every tier is
//! broken. Nothing here is consumed by the override core.

pub mod rotation;
pub mod storage;

pub use rotation::RotationChain;
pub use storage::{MemoryTier, RandomTier, StorageError, StorageTier};
