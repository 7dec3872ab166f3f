//! JSON helpers with validation and optional gzip framing.
//!
//! Paths ending in `.gz` are written compressed and read back through a
//! gzip decoder; every other path is plain UTF-8 JSON.

use crate::error::{IoError, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Serializes data to pretty-printed JSON.
pub fn to_json_pretty<T>(data: &T) -> Result<String>
where
    T: Serialize,
{
    serde_json::to_string_pretty(data)
        .map_err(|e| IoError::serialization(format!("JSON serialization failed: {}", e)))
}

/// Deserializes data from a JSON string. Blank input is a validation error.
pub fn from_json<T>(json: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    if json.trim().is_empty() {
        return Err(IoError::validation("Empty JSON string"));
    }

    serde_json::from_str(json)
        .map_err(|e| IoError::serialization(format!("JSON deserialization failed: {}", e)))
}

fn is_gzip_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

/// Writes pretty JSON, gzip-compressed when the path ends in `.gz`.
pub fn write_json_file<T, P>(data: &T, path: P) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let json = to_json_pretty(data)?;
    let context = || format!("writing JSON to {:?}", path);

    if is_gzip_path(path) {
        let file = File::create(path).map_err(|e| IoError::FileSystem(e).with_context(context()))?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder
            .write_all(json.as_bytes())
            .map_err(|e| IoError::compression(e.to_string()).with_context(context()))?;
        encoder
            .finish()
            .map_err(|e| IoError::compression(e.to_string()).with_context(context()))?;
    } else {
        std::fs::write(path, json).map_err(|e| IoError::FileSystem(e).with_context(context()))?;
    }
    Ok(())
}

/// Reads JSON written by [`write_json_file`].
pub fn read_json_file<T, P>(path: P) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let context = || format!("reading JSON from {:?}", path);

    let json = if is_gzip_path(path) {
        let file = File::open(path).map_err(|e| IoError::FileSystem(e).with_context(context()))?;
        let mut decoder = GzDecoder::new(file);
        let mut json = String::new();
        decoder
            .read_to_string(&mut json)
            .map_err(|e| IoError::compression(e.to_string()).with_context(context()))?;
        json
    } else {
        std::fs::read_to_string(path).map_err(|e| IoError::FileSystem(e).with_context(context()))?
    };
    from_json(&json).map_err(|e| e.with_context(context()))
}
