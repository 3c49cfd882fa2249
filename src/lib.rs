//! pflow: compiles hierarchical net definitions into a flat vector addition
//! system model and emits it for downstream runtimes.
//!
//! The pipeline is `document` (read and flatten entity records) →
//! `compile` (index places, resolve references, derive vectors) →
//! `codegen` (render the model).

pub mod codegen;
pub mod compile;
pub mod config;
pub mod document;
pub mod net;
pub mod options;

pub use compile::{CompileError, Compiler, compile};
pub use document::{DocumentError, NetDocument, NetRecords};
pub use net::Model;
