//! # Editor override core
//!
//! Everything that runs against the embedded editor widget:
//!
//! - [`capability`]: the narrow trait seam over the widget API (namespace,
//!   instance handle, document model). Shape uncertainty on the widget side
//!   lives entirely behind this seam.
//! - [`registry`]: namespace detection and hook-once instance registration,
//!   including factory-created and diff-pair instances.
//! - [`engine`]: the model-level edit engine — select-all, copy, cut and
//!   paste implemented directly against the document model.
//! - [`sim`]: an in-memory widget implementing the whole seam, for tests
//!   and the demo binary.

pub mod capability;
pub mod config;
pub mod engine;
pub mod position;
pub mod registry;
pub mod sim;

pub use capability::{
    CommandFilter, EditorCommand, EditorHandle, EditorId, EditorNamespace, EditorOptions,
    EditorOptionsPatch, InstanceEvent, KeyDisposition, KeyInterceptor, TextModel,
};
pub use config::HookConfig;
pub use engine::{classify_chord, EditorAction, EditorOverride};
pub use position::{Position, SelectionRange};
pub use registry::EditorRegistry;
pub use sim::{SimEditor, SimModel, SimNamespace};
