//! # Compiled net model
//!
//! A flattened net with `N` places compiles to a vector addition system with
//! guards: every place owns a fixed offset in `0..N`, every transition owns a
//! delta vector `d ∈ ℤ^N` and zero or more inhibitor guard vectors keyed by the
//! guarded place's label.
//!
//! ```rust
//! use pflow::compile::compile;
//! use pflow::document::NetDocument;
//!
//! let source = r#"
//! <document>
//!   <subnet>
//!     <place><id>1</id><label>A</label><tokens>1</tokens></place>
//!     <place><id>2</id><label>B</label><tokens>0</tokens></place>
//!     <transition><id>3</id><label>fire</label></transition>
//!     <arc><sourceId>1</sourceId><destinationId>3</destinationId>
//!          <multiplicity>1</multiplicity><type>regular</type></arc>
//!     <arc><sourceId>3</sourceId><destinationId>2</destinationId>
//!          <multiplicity>1</multiplicity><type>regular</type></arc>
//!   </subnet>
//! </document>"#;
//!
//! let document = NetDocument::parse("demo", source).unwrap();
//! let model = compile(&document.records).unwrap();
//! assert_eq!(model.transitions["fire"].delta.as_slice(), &[-1, 1]);
//! ```

pub mod ids;
pub mod index_vec;
pub mod io;
pub mod model;
pub mod structure;

pub use ids::{ElementId, PlaceOffset};
pub use index_vec::{Idx, IndexVec};
pub use model::{DiagnosticReport, Model};
pub use structure::{DEFAULT_ROLE, Place, Transition, Vector, Weight};
