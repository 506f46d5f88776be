//! Error type shared by every part of the colorizer.

use crate::layer::MalformedReason;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong while loading, editing or exporting a map.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The uploaded markup is not well-formed XML.
    #[error("invalid SVG markup: {0}")]
    Xml(#[from] quick_xml::Error),

    /// An element carries an attribute that could not be read.
    #[error("invalid attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// The markup contains no element at all.
    #[error("SVG markup has no root element")]
    NoRootElement,

    /// The markup contains more than one top-level element.
    #[error("SVG markup has more than one root element (found <{0}>)")]
    MultipleRootElements(String),

    /// The markup ends while an element is still open.
    #[error("element <{0}> is never closed")]
    UnclosedElement(String),

    /// A direct child of the map root does not follow the layer class convention.
    #[error("malformed layer element {element}: {reason}")]
    MalformedLayer {
        element: String,
        reason: MalformedReason,
    },

    /// No layer is registered under the given class.
    #[error("unknown layer `{0}`")]
    LayerNotFound(String),

    /// A color slot index past the end of a layer's palette.
    #[error("color slot {index} out of range for layer `{layer_class}` ({len} slots)")]
    IndexOutOfRange {
        layer_class: String,
        index: usize,
        len: usize,
    },

    /// A color value that cannot be interpreted as a CSS color.
    #[error("invalid color `{0}`")]
    InvalidColor(String),

    /// A palette with no colors was supplied for a layer.
    #[error("palette for layer `{0}` is empty")]
    EmptyPalette(String),

    /// A command needs a loaded map but none has been uploaded yet.
    #[error("no SVG map has been loaded")]
    NoDocument,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
