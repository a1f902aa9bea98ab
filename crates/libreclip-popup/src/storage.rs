//! Storage tiers for the rotation index. Each tier is one strategy; the
//! chain tries them in order and the first readable tier wins.

use parking_lot::Mutex;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// The tier's backing store threw or is not present in this context.
    #[error("storage tier unavailable: {0}")]
    Unavailable(String),
}

/// One place the rotation index can live.
pub trait StorageTier: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(None)` means the tier works but holds no value yet; only an
    /// `Err` falls through to the next tier.
    fn load(&self) -> Result<Option<String>, StorageError>;

    fn store(&self, value: &str) -> Result<(), StorageError>;
}

/// In-memory tier standing in for extension/local/session storage, with a
/// scriptable broken state.
pub struct MemoryTier {
    name: &'static str,
    cell: Mutex<Option<String>>,
    broken: AtomicBool,
    store_broken: AtomicBool,
}

impl MemoryTier {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            cell: Mutex::new(None),
            broken: AtomicBool::new(false),
            store_broken: AtomicBool::new(false),
        }
    }

    pub fn set_broken(&self, broken: bool) {
        self.broken.store(broken, Ordering::SeqCst);
    }

    /// Break writes only: reads keep working.
    pub fn set_store_broken(&self, broken: bool) {
        self.store_broken.store(broken, Ordering::SeqCst);
    }

    pub fn value(&self) -> Option<String> {
        self.cell.lock().clone()
    }

    pub fn set_value(&self, value: &str) {
        *self.cell.lock() = Some(value.to_string());
    }
}

impl StorageTier for MemoryTier {
    fn name(&self) -> &'static str {
        self.name
    }

    fn load(&self) -> Result<Option<String>, StorageError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(self.name.to_string()));
        }
        Ok(self.cell.lock().clone())
    }

    fn store(&self, value: &str) -> Result<(), StorageError> {
        if self.broken.load(Ordering::SeqCst) || self.store_broken.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(self.name.to_string()));
        }
        *self.cell.lock() = Some(value.to_string());
        Ok(())
    }
}

/// Terminal tier: always answers with a fresh in-range pick and accepts
/// writes without persisting anything.
pub struct RandomTier {
    total: usize,
}

impl RandomTier {
    pub fn new(total: usize) -> Self {
        Self { total }
    }
}

impl StorageTier for RandomTier {
    fn name(&self) -> &'static str {
        "random"
    }

    fn load(&self) -> Result<Option<String>, StorageError> {
        let index = rand::thread_rng().gen_range(1..=self.total.max(1));
        Ok(Some(index.to_string()))
    }

    fn store(&self, _value: &str) -> Result<(), StorageError> {
        Ok(())
    }
}
