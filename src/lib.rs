//! mapviz-colorizer: interactive recoloring of mapviz map SVGs
//!
//! Maps generated by mapviz tag every shape with a layer class such as
//! `mapviz-water` or `mapviz-building`. This crate discovers those layers,
//! keeps an editable palette per layer, drives a picker UI for them and
//! exports the recolored map.
//!
//! # Example
//!
//! ```
//! use mapviz_colorizer::{Command, Outcome, Session, SessionConfig};
//!
//! let svg = r##"<svg xmlns="http://www.w3.org/2000/svg">
//!   <path class="mapviz-water" fill="#0000ff" d="M0 0h10v10z"/>
//!   <path class="mapviz-building" fill="#888888" d="M2 2h3v3z"/>
//! </svg>"##;
//!
//! let mut session = Session::new(SessionConfig::default().with_seed(7));
//! session.upload(svg).unwrap();
//!
//! // One picker row per layer, sorted by display name
//! let labels: Vec<_> = session.panel().rows().map(|row| row.label.as_str()).collect();
//! assert_eq!(labels, ["Building", "Water"]);
//!
//! // Edit a color slot; every element of the layer is repainted
//! session
//!     .dispatch(Command::SetLayerColor {
//!         layer_class: "mapviz-water".into(),
//!         index: 0,
//!         color: "#00ffff".into(),
//!     })
//!     .unwrap();
//!
//! if let Outcome::Exported(file) = session.dispatch(Command::ExportSvg).unwrap() {
//!     assert_eq!(file.file_name, "map.svg");
//!     assert!(file.contents.contains("fill: #00ffff;"));
//! }
//! ```
//!
//! # Palette Profiles
//!
//! Palettes can be saved and re-applied through the [`Configurable`] trait:
//!
//! ```
//! use mapviz_colorizer::{Configurable, PaletteProfile, Session, SessionConfig};
//!
//! let mut session = Session::new(SessionConfig::default());
//! session
//!     .upload(r##"<svg><path class="mapviz-forest" fill="#2d5a27"/></svg>"##)
//!     .unwrap();
//!
//! let profile = PaletteProfile::new().with_layer("forest", ["#1b4d1b", "#2e6b2e"]);
//! session.apply_profile(&profile).unwrap();
//!
//! let json = session.export_profile().to_json().unwrap();
//! assert!(json.contains("#2e6b2e"));
//! ```

mod binder;
mod config;
mod document;
mod error;
mod export;
mod layer;
mod preview;
mod profile;
mod session;
mod store;

#[cfg(feature = "tsify")]
mod web;

pub use binder::{
    AddSlotControl, ColorInput, PanelItem, PickerRow, SidePanel, render_row, render_rows,
    repaint_layer,
};
pub use config::SessionConfig;
pub use document::{Attribute, Element, Node, SvgDocument};
pub use error::{Error, Result};
pub use export::{EXPORT_FILE_NAME, ExportedFile, SVG_MIME_TYPE, export};
pub use layer::{
    AnalysisReport, AnalyzerOptions, DEFAULT_PREFIX, LayerColor, LayerInfo, MalformedLayer,
    MalformedReason, ParsedLayer, SvgInfo, analyze, parse_layer_class,
};
pub use preview::{render_preview, render_svg};
pub use profile::{LayerPalette, PaletteProfile};
pub use session::{Command, Configurable, Outcome, Session, Status, UploadTicket};
pub use store::ColorStore;

#[cfg(feature = "tsify")]
pub use web::WebSession;
