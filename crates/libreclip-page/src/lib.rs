//! # Host-page surface for LibreClip
//!
//! Everything the override engine needs from the page it is injected into,
//! behind a narrow capability seam:
//!
//! - [`PageHost`] / [`ElementHandle`]: style injection, element cleanup,
//!   handler-slot access, registration filtering, mutation and lifecycle
//!   subscriptions.
//! - [`SelectionLiberator`]: forces text-selectability page-wide and keeps
//!   stripping blocking attributes as the page mutates.
//! - [`EventInterceptor`]: standing policy that drops page attempts to
//!   register handlers for blocklisted event types and clears the legacy
//!   single-slot handlers.
//! - [`MemoryPage`]: in-memory host used by the test suites and the demo
//!   binary.

pub mod host;
pub mod interception;
pub mod liberation;
pub mod memory;
pub mod policy;

pub use host::{
    ElementHandle, HandlerScope, LifecyclePhase, MutationKind, MutationRecord, PageHost,
    RegistrationFilter,
};
pub use interception::EventInterceptor;
pub use liberation::{SelectionLiberator, BLOCKING_ATTRIBUTES, BLOCKING_CLASSES};
pub use memory::{MemoryElement, MemoryPage};
pub use policy::InterceptionPolicy;
