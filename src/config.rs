//! Session configuration.
//!
//! Configuration is a small JSON document; every field is optional:
//!
//! ```json
//! {
//!   "classPrefix": "mapviz-",
//!   "strict": false,
//!   "exportFileName": "map.svg",
//!   "seed": 42
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::export::EXPORT_FILE_NAME;
use crate::layer::{AnalyzerOptions, DEFAULT_PREFIX};

/// Settings a [`Session`](crate::Session) is constructed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// Class prefix marking layer elements.
    pub class_prefix: String,

    /// Reject maps containing children that are not layers.
    pub strict: bool,

    /// Name of the exported file.
    pub export_file_name: String,

    /// Seed for repaint color draws. `None` seeds from the OS.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            class_prefix: DEFAULT_PREFIX.to_string(),
            strict: false,
            export_file_name: EXPORT_FILE_NAME.to_string(),
            seed: None,
        }
    }
}

impl SessionConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn analyzer_options(&self) -> AnalyzerOptions {
        AnalyzerOptions {
            prefix: self.class_prefix.clone(),
            strict: self.strict,
        }
    }
}
