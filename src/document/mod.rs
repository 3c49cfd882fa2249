//! Document reader: turns a net definition document into flat, typed entity
//! records. Nothing here interprets the net; that is the compiler's job.
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod entity;
pub mod markup;
pub mod reader;
pub mod schema;

pub use entity::{
    ArcRecord, NetRecords, PlaceRecord, ReferencePlaceRecord, RoleRecord, TransitionRecord,
};

/// Every variant means the document is malformed or unreadable.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed markup at line {line}, column {column}")]
    Syntax { line: usize, column: usize },
    #[error("document has no root net")]
    MissingRootNet,
    #[error("{entity} is missing required field `{field}`")]
    MissingField { entity: String, field: String },
    #[error("{entity} field `{field}` has invalid value {value:?}")]
    InvalidValue {
        entity: String,
        field: String,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetDocument {
    /// Net name, used by emitters to name the generated machine.
    pub name: String,
    pub records: NetRecords,
}

impl NetDocument {
    pub fn parse(name: impl Into<String>, source: &str) -> Result<Self, DocumentError> {
        let root = markup::parse_document(source)?;
        Ok(Self {
            name: name.into(),
            records: reader::read_records(&root)?,
        })
    }

    /// Reads `path` in full; the net is named after the file stem.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "net".to_owned());
        Self::parse(name, &source)
    }
}
