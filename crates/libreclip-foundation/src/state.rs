use crate::error::OverrideError;
use crossbeam_channel::{Receiver, Sender};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

/// Process-wide override lifecycle. `Armed` means the page-wide layers are
/// applied and the widget namespace has been detected; `Active` means at
/// least one editor instance is currently overridden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OverrideState {
    Unarmed,
    Armed,
    Active,
}

impl std::fmt::Display for OverrideState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverrideState::Unarmed => write!(f, "UNARMED"),
            OverrideState::Armed => write!(f, "ARMED"),
            OverrideState::Active => write!(f, "ACTIVE"),
        }
    }
}

/// Shared handle on the override state machine. Clones observe the same
/// underlying state; transitions are validated and broadcast to subscribers.
#[derive(Clone)]
pub struct StateHandle {
    state: Arc<RwLock<OverrideState>>,
    state_tx: Sender<OverrideState>,
    state_rx: Receiver<OverrideState>,
}

impl Default for StateHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl StateHandle {
    pub fn new() -> Self {
        let (state_tx, state_rx) = crossbeam_channel::unbounded();
        Self {
            state: Arc::new(RwLock::new(OverrideState::Unarmed)),
            state_tx,
            state_rx,
        }
    }

    /// Validated transition. Self-transitions are accepted silently so the
    /// staggered re-initialization passes can re-arm without bookkeeping.
    pub fn transition(&self, new_state: OverrideState) -> Result<(), OverrideError> {
        let mut current = self.state.write();

        if *current == new_state {
            return Ok(());
        }

        let valid = matches!(
            (&*current, &new_state),
            (OverrideState::Unarmed, OverrideState::Armed)
                | (OverrideState::Armed, OverrideState::Active)
                | (OverrideState::Armed, OverrideState::Unarmed)
                | (OverrideState::Active, OverrideState::Unarmed)
        );

        if !valid {
            return Err(OverrideError::InvalidTransition {
                from: current.to_string(),
                to: new_state.to_string(),
            });
        }

        tracing::info!("Override state transition: {} -> {}", *current, new_state);
        *current = new_state;
        let _ = self.state_tx.send(new_state);
        Ok(())
    }

    /// Force the machine back to `Unarmed` from any state.
    pub fn reset(&self) {
        let mut current = self.state.write();
        if *current != OverrideState::Unarmed {
            tracing::info!("Override state reset: {} -> UNARMED", *current);
            *current = OverrideState::Unarmed;
            let _ = self.state_tx.send(OverrideState::Unarmed);
        }
    }

    pub fn current(&self) -> OverrideState {
        *self.state.read()
    }

    /// Whether the page-wide layers have been applied and detection succeeded.
    pub fn hooked(&self) -> bool {
        matches!(self.current(), OverrideState::Armed | OverrideState::Active)
    }

    /// Whether at least one editor instance is actively overridden.
    pub fn active(&self) -> bool {
        self.current() == OverrideState::Active
    }

    pub fn subscribe(&self) -> Receiver<OverrideState> {
        self.state_rx.clone()
    }
}
