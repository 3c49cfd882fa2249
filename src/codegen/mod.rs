//! Emitters: mechanical consumers of a compiled [`Model`].
//!
//! Source targets embed the place and transition tables as literal data next
//! to a fixed scaffold; data targets serialize the model as-is.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::net::io::{self, EmitError};
use crate::net::model::Model;

pub mod python;
pub mod rust;

pub use python::PythonSource;
pub use rust::RustSource;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    #[default]
    Rust,
    Python,
    Json,
    Ron,
}

impl Target {
    pub const NAMES: [&'static str; 4] = ["rust", "python", "json", "ron"];

    pub fn as_str(self) -> &'static str {
        match self {
            Target::Rust => "rust",
            Target::Python => "python",
            Target::Json => "json",
            Target::Ron => "ron",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rust" => Ok(Target::Rust),
            "python" => Ok(Target::Python),
            "json" => Ok(Target::Json),
            "ron" => Ok(Target::Ron),
            other => Err(format!("unsupported target {other:?}")),
        }
    }
}

/// Renders `model` for `target`; `name` names the generated machine.
pub fn emit(model: &Model, name: &str, target: Target) -> Result<String, EmitError> {
    match target {
        Target::Rust => Ok(RustSource::new(model, name).to_string()),
        Target::Python => Ok(PythonSource::new(model, name).to_string()),
        Target::Json => io::to_json_string(model),
        Target::Ron => io::to_ron_string(model),
    }
}

/// CamelCase type name for a net name such as a file stem.
pub fn type_name(name: &str) -> String {
    let mut out: String = name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect();
    if out.chars().next().is_none_or(|c| c.is_ascii_digit()) {
        out.insert_str(0, "Net");
    }
    out
}
