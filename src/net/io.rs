//! Serialization of a compiled model as JSON or RON text.
use std::fs::File;
use std::io::Write;
use std::path::Path;

use ron::ser::PrettyConfig;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("ron error: {0}")]
    Ron(#[from] ron::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn to_json_string<T>(value: &T) -> Result<String, EmitError>
where
    T: Serialize,
{
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn to_ron_string<T>(value: &T) -> Result<String, EmitError>
where
    T: Serialize,
{
    let mut pretty = PrettyConfig::default();
    pretty.new_line = "\n".into();
    Ok(ron::ser::to_string_pretty(value, pretty)?)
}

/// Writes already-rendered text to `path`, creating or truncating it.
pub fn write_text<P: AsRef<Path>>(path: P, content: &str) -> Result<(), EmitError> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    if !content.ends_with('\n') {
        file.write_all(b"\n")?;
    }
    Ok(())
}
