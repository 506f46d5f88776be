//! Browser bindings for WASM front ends.
//!
//! [`WebSession`] wraps a [`Session`] for a page that owns the actual DOM:
//! the page renders the preview from [`WebSession::svg_markup`] and builds
//! its picker controls from [`WebSession::rows`], forwarding control events
//! back as method calls.
//!
//! # Feature Flag
//!
//! This module is only available with the `tsify` feature enabled:
//!
//! ```toml
//! [dependencies]
//! mapviz-colorizer = { version = "0.1", features = ["tsify"] }
//! ```
//!
//! # Example (JavaScript/TypeScript)
//!
//! ```javascript
//! import init, { WebSession } from 'mapviz-colorizer';
//!
//! await init();
//! const session = new WebSession();
//!
//! svgInput.addEventListener('change', async () => {
//!     const generation = session.beginUpload();
//!     const text = await svgInput.files[0].text();
//!     if (session.completeUpload(generation, text)) {
//!         preview.innerHTML = session.svgMarkup();
//!         renderRows(session.rows());
//!     }
//! });
//! ```

use wasm_bindgen::prelude::*;

use crate::config::SessionConfig;
use crate::error::Error;
use crate::profile::PaletteProfile;
use crate::session::{Command, Configurable, Outcome, Session, UploadTicket};

fn js_error(err: Error) -> JsError {
    JsError::new(&err.to_string())
}

// ============================================================================
// WebSession
// ============================================================================

/// A [`Session`] exposed to JavaScript.
#[wasm_bindgen]
pub struct WebSession {
    session: Session,
}

impl Default for WebSession {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl WebSession {
    /// Creates a session with the default configuration.
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebSession {
        Self {
            session: Session::new(SessionConfig::default()),
        }
    }

    /// Creates a session from a JSON configuration document.
    #[wasm_bindgen(js_name = "fromConfigJson")]
    pub fn from_config_json(json: &str) -> Result<WebSession, JsError> {
        let config = SessionConfig::from_json(json).map_err(js_error)?;
        Ok(Self {
            session: Session::new(config),
        })
    }

    // ---- Upload ----

    /// Starts an upload and returns its generation number.
    ///
    /// Call this before reading the file so that a slower, earlier read
    /// cannot overwrite a newer upload.
    #[wasm_bindgen(js_name = "beginUpload")]
    pub fn begin_upload(&mut self) -> u64 {
        self.session.begin_upload().generation()
    }

    /// Completes an upload with the file's text.
    ///
    /// Returns `false` if a newer upload was started in the meantime.
    #[wasm_bindgen(js_name = "completeUpload")]
    pub fn complete_upload(&mut self, generation: u64, markup: String) -> Result<bool, JsError> {
        let outcome = self
            .session
            .dispatch(Command::UploadSvg {
                ticket: UploadTicket::from_generation(generation),
                markup,
            })
            .map_err(js_error)?;
        Ok(!matches!(outcome, Outcome::StaleUpload))
    }

    // ---- Editing ----

    /// Handles a color input change and returns how many elements were repainted.
    #[wasm_bindgen(js_name = "setLayerColor")]
    pub fn set_layer_color(
        &mut self,
        layer_class: String,
        index: usize,
        color: String,
    ) -> Result<usize, JsError> {
        let outcome = self
            .session
            .dispatch(Command::SetLayerColor {
                layer_class,
                index,
                color,
            })
            .map_err(js_error)?;
        match outcome {
            Outcome::Repainted { elements, .. } => Ok(elements),
            _ => Ok(0),
        }
    }

    /// Handles a click on a row's "add" control and returns the re-rendered row.
    #[wasm_bindgen(js_name = "addColorSlot")]
    pub fn add_color_slot(&mut self, layer_class: String) -> Result<JsValue, JsError> {
        self.session
            .dispatch(Command::AddColorSlot {
                layer_class: layer_class.clone(),
            })
            .map_err(js_error)?;
        let row = self.session.panel().row(&layer_class);
        Ok(serde_wasm_bindgen::to_value(&row)?)
    }

    /// Applies a palette profile and returns how many layers changed.
    #[wasm_bindgen(js_name = "applyProfile")]
    pub fn apply_profile(&mut self, profile: PaletteProfile) -> Result<usize, JsError> {
        self.session.apply_profile(&profile).map_err(js_error)
    }

    #[wasm_bindgen(js_name = "exportProfile")]
    pub fn export_profile(&self) -> PaletteProfile {
        self.session.export_profile()
    }

    // ---- Presentation ----

    /// The picker rows, in display order.
    pub fn rows(&self) -> Result<JsValue, JsError> {
        let rows: Vec<_> = self.session.panel().rows().collect();
        Ok(serde_wasm_bindgen::to_value(&rows)?)
    }

    /// The current markup of the map, for the preview container.
    #[wasm_bindgen(js_name = "svgMarkup")]
    pub fn svg_markup(&self) -> Option<String> {
        self.session.document().map(|doc| doc.to_markup())
    }

    /// Serializes the map for download; the page wraps it in a blob named
    /// `map.svg` with type `image/svg+xml`.
    #[wasm_bindgen(js_name = "exportSvg")]
    pub fn export_svg(&mut self) -> Result<String, JsError> {
        match self.session.dispatch(Command::ExportSvg).map_err(js_error)? {
            Outcome::Exported(file) => Ok(file.contents),
            _ => Ok(String::new()),
        }
    }

    #[wasm_bindgen(js_name = "statusMessage")]
    pub fn status_message(&self) -> String {
        self.session.status().message()
    }

    #[wasm_bindgen(js_name = "downloadVisible")]
    pub fn download_visible(&self) -> bool {
        self.session.is_download_visible()
    }
}
