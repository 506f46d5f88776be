//! Exporting the edited map.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::document::SvgDocument;
use crate::error::Result;

/// File name offered for download.
pub const EXPORT_FILE_NAME: &str = "map.svg";

/// MIME type of exported maps.
pub const SVG_MIME_TYPE: &str = "image/svg+xml";

/// A serialized map ready to be offered as a download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedFile {
    pub file_name: String,
    pub mime_type: String,
    pub contents: String,
}

impl ExportedFile {
    /// Writes the file into `dir` and returns its full path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.contents)?;
        info!(path = %path.display(), bytes = self.contents.len(), "exported map");
        Ok(path)
    }
}

/// Serializes the presentation tree, including every inline style applied
/// since upload.
pub fn export(document: &SvgDocument, file_name: &str) -> ExportedFile {
    ExportedFile {
        file_name: file_name.to_string(),
        mime_type: SVG_MIME_TYPE.to_string(),
        contents: document.to_markup(),
    }
}
