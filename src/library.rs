//! draw.io library serialization
//!
//! A library file is a single `<mxlibrary>` element whose text is a JSON
//! array of image records. This is the format draw.io reads through
//! *File > Open Library*.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::converter::ImageRecord;
use crate::error::ConvertError;

const OPEN_TAG: &str = "<mxlibrary>";
const CLOSE_TAG: &str = "</mxlibrary>";

/// Serialize records to library file content
pub fn render_library(records: &[ImageRecord]) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(records)?;
    Ok(format!("{}{}{}", OPEN_TAG, json, CLOSE_TAG))
}

/// Write `<output_root>/<name>.xml`, replacing any existing file
pub fn write_library(
    records: &[ImageRecord],
    name: &str,
    output_root: &Path,
) -> Result<PathBuf, ConvertError> {
    let path = output_root.join(format!("{}.xml", name));
    let content = render_library(records).map_err(|source| ConvertError::Serialize {
        path: path.clone(),
        source,
    })?;
    fs::write(&path, content).map_err(|e| ConvertError::io(&path, e))?;
    Ok(path)
}

/// Create the output directory if it does not exist yet
///
/// Only the directory itself is created; missing parents are an error.
pub fn ensure_output_dir(output_root: &Path) -> Result<(), ConvertError> {
    match fs::create_dir(output_root) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists && output_root.is_dir() => Ok(()),
        Err(e) => Err(ConvertError::io(output_root, e)),
    }
}

/// Extract the JSON array text from library file content
pub fn library_json(content: &str) -> Option<&str> {
    content.strip_prefix(OPEN_TAG)?.strip_suffix(CLOSE_TAG)
}
