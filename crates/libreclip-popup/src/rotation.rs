//! Round-robin rotation over a fixed-size image carousel, persisted through
//! the first storage tier that still works.

use crate::storage::StorageTier;
use std::sync::Arc;
use tracing::{debug, warn};

/// Ordered tier chain plus the carousel size. `next_image` resolves the
/// 1-based index to show now and writes the following index back to the
/// tier that answered.
pub struct RotationChain {
    tiers: Vec<Arc<dyn StorageTier>>,
    total: usize,
}

impl RotationChain {
    pub fn new(total: usize, tiers: Vec<Arc<dyn StorageTier>>) -> Self {
        Self { tiers, total }
    }

    pub fn next_image(&self) -> usize {
        for tier in &self.tiers {
            match tier.load() {
                Ok(stored) => {
                    let current = normalize(stored.as_deref(), self.total);
                    let future = if current >= self.total { 1 } else { current + 1 };
                    if let Err(e) = tier.store(&future.to_string()) {
                        // The value we return is still valid; the next open
                        // will just resolve through a later tier.
                        warn!(tier = tier.name(), error = %e, "Could not persist next index");
                    }
                    debug!(tier = tier.name(), index = current, next = future, "Rotation resolved");
                    return current;
                }
                Err(e) => {
                    debug!(tier = tier.name(), error = %e, "Storage tier failed, falling through");
                }
            }
        }
        warn!("Every storage tier failed, showing the first image");
        1
    }
}

/// Stored garbage and out-of-range values normalize to the first image.
fn normalize(stored: Option<&str>, total: usize) -> usize {
    match stored.and_then(|s| s.trim().parse::<usize>().ok()) {
        Some(index) if (1..=total).contains(&index) => index,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryTier, RandomTier};

    const TOTAL: usize = 6;

    fn chain(tiers: Vec<Arc<MemoryTier>>) -> RotationChain {
        RotationChain::new(
            TOTAL,
            tiers
                .into_iter()
                .map(|t| t as Arc<dyn StorageTier>)
                .collect(),
        )
    }

    #[test]
    fn first_open_shows_image_one_and_advances() {
        let primary = Arc::new(MemoryTier::new("extension"));
        let chain = chain(vec![primary.clone()]);

        assert_eq!(chain.next_image(), 1);
        assert_eq!(primary.value().as_deref(), Some("2"));
        assert_eq!(chain.next_image(), 2);
        assert_eq!(primary.value().as_deref(), Some("3"));
    }

    #[test]
    fn rotation_wraps_back_to_one() {
        let primary = Arc::new(MemoryTier::new("extension"));
        primary.set_value("6");
        let chain = chain(vec![primary.clone()]);

        assert_eq!(chain.next_image(), 6);
        assert_eq!(primary.value().as_deref(), Some("1"));
    }

    #[test]
    fn garbage_and_out_of_range_values_normalize() {
        for bad in ["0", "7", "999", "-3", "not a number", ""] {
            let primary = Arc::new(MemoryTier::new("extension"));
            primary.set_value(bad);
            let chain = chain(vec![primary.clone()]);
            assert_eq!(chain.next_image(), 1, "stored {bad:?} should show image 1");
            assert_eq!(primary.value().as_deref(), Some("2"));
        }
    }

    #[test]
    fn broken_tier_falls_through_to_the_next() {
        let extension = Arc::new(MemoryTier::new("extension"));
        extension.set_broken(true);
        let local = Arc::new(MemoryTier::new("local"));
        local.set_value("4");
        let chain = chain(vec![extension.clone(), local.clone()]);

        assert_eq!(chain.next_image(), 4);
        // The answering tier got the increment; the broken one was skipped.
        assert_eq!(local.value().as_deref(), Some("5"));
        assert_eq!(extension.value(), None);
    }

    #[test]
    fn random_terminal_tier_answers_when_every_store_is_broken() {
        let stores: Vec<Arc<dyn StorageTier>> = vec![
            {
                let t = Arc::new(MemoryTier::new("extension"));
                t.set_broken(true);
                t
            },
            {
                let t = Arc::new(MemoryTier::new("local"));
                t.set_broken(true);
                t
            },
            {
                let t = Arc::new(MemoryTier::new("session"));
                t.set_broken(true);
                t
            },
            Arc::new(RandomTier::new(TOTAL)),
        ];
        let chain = RotationChain::new(TOTAL, stores);

        for _ in 0..50 {
            let index = chain.next_image();
            assert!((1..=TOTAL).contains(&index));
        }
    }

    #[test]
    fn exhausted_chain_without_a_terminal_tier_shows_image_one() {
        let broken = Arc::new(MemoryTier::new("extension"));
        broken.set_broken(true);
        let chain = chain(vec![broken]);
        assert_eq!(chain.next_image(), 1);
    }

    #[test]
    fn store_failure_still_returns_the_resolved_index() {
        // A tier that reads fine but cannot persist: readable value wins,
        // the failed write is logged and ignored.
        let flaky = Arc::new(MemoryTier::new("extension"));
        flaky.set_value("3");
        flaky.set_store_broken(true);
        let chain = RotationChain::new(TOTAL, vec![flaky.clone() as Arc<dyn StorageTier>]);

        let index = chain.next_image();
        assert_eq!(index, 3);
        // Unpersisted: the stored value did not advance.
        assert_eq!(flaky.value().as_deref(), Some("3"));
    }
}
