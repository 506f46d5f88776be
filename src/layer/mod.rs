//! Layer model for mapviz maps.
//!
//! A map SVG groups its shapes into layers through a class name of the form
//! `mapviz-<layer>`. This module holds the discovered layer metadata and the
//! palette of colors each layer may be painted with.
//!
//! # Structure
//!
//! ```text
//! SvgInfo (IndexMap, discovery order)
//!   "mapviz-water"    ─► LayerInfo { name: water,    display: Water,    colors: [#0000ff] }
//!   "mapviz-building" ─► LayerInfo { name: building, display: Building, colors: [#888, #999] }
//! ```
//!
//! Layers are discovered by [`analyze`] and edited through
//! [`ColorStore`](crate::ColorStore).

pub mod analyzer;

pub use analyzer::{
    AnalysisReport, AnalyzerOptions, DEFAULT_PREFIX, MalformedLayer, MalformedReason,
    ParsedLayer, analyze, parse_layer_class,
};

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// LayerColor
// ============================================================================

/// A color value as it appears in the map, usually a hex string.
///
/// Colors discovered in the document are kept verbatim so that deduplication
/// compares exactly what the file contains. [`LayerColor::to_hex`] gives the
/// normalized form a color input control expects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerColor(String);

impl LayerColor {
    /// The initial SVG fill, used for layers whose elements declare none.
    pub const DEFAULT_FILL: &'static str = "black";

    /// Wraps a color value without validating it.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Parses a user-supplied color, rejecting anything that is not a hex
    /// color or a CSS color keyword.
    pub fn parse(value: &str) -> Result<Self> {
        let color = Self::new(value.trim());
        if color.to_rgb().is_none() {
            return Err(Error::InvalidColor(value.to_string()));
        }
        Ok(color)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interprets the value as an sRGB color.
    pub fn to_rgb(&self) -> Option<Srgb<u8>> {
        let value = self.0.trim().to_ascii_lowercase();
        if value.starts_with('#') {
            Srgb::<u8>::from_str(&value).ok()
        } else {
            palette::named::from_str(&value)
        }
    }

    /// Normalizes the value to lowercase `#rrggbb`.
    ///
    /// Values that are not colors (`none`, paint server references) map to
    /// `#000000`, which is what a color input shows for them.
    pub fn to_hex(&self) -> String {
        let rgb = self.to_rgb().unwrap_or(Srgb::new(0, 0, 0));
        format!("#{:02x}{:02x}{:02x}", rgb.red, rgb.green, rgb.blue)
    }
}

impl fmt::Display for LayerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayerColor {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// LayerInfo
// ============================================================================

/// Discovered metadata and palette for one layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerInfo {
    /// The first class name of the layer's elements, e.g. `mapviz-water`.
    pub layer_class: String,

    /// The class name without its prefix, e.g. `water`.
    pub layer_name: String,

    /// The layer name with its first letter upper-cased, e.g. `Water`.
    pub display_name: String,

    /// The palette, never empty. Indexed by color slot.
    pub colors: Vec<LayerColor>,
}

impl LayerInfo {
    /// Creates a layer with an empty palette from a parsed class name.
    pub fn from_parsed(parsed: ParsedLayer) -> Self {
        Self {
            layer_class: parsed.layer_class,
            layer_name: parsed.layer_name,
            display_name: parsed.display_name,
            colors: Vec::new(),
        }
    }

    /// Adds a color unless the palette already contains it.
    pub fn merge_color(&mut self, color: LayerColor) {
        if !self.colors.contains(&color) {
            self.colors.push(color);
        }
    }
}

// ============================================================================
// SvgInfo
// ============================================================================

/// All layers of one map, keyed by layer class in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SvgInfo {
    layers: IndexMap<String, LayerInfo>,
}

impl SvgInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for a parsed layer, creating it on first sight.
    pub fn entry(&mut self, parsed: ParsedLayer) -> &mut LayerInfo {
        self.layers
            .entry(parsed.layer_class.clone())
            .or_insert_with(|| LayerInfo::from_parsed(parsed))
    }

    pub fn get(&self, layer_class: &str) -> Option<&LayerInfo> {
        self.layers.get(layer_class)
    }

    pub fn get_mut(&mut self, layer_class: &str) -> Option<&mut LayerInfo> {
        self.layers.get_mut(layer_class)
    }

    /// Finds a layer by its unprefixed name.
    pub fn find_by_name(&self, layer_name: &str) -> Option<&LayerInfo> {
        self.layers.values().find(|layer| layer.layer_name == layer_name)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Iterates over the layers in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &LayerInfo> {
        self.layers.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut LayerInfo> {
        self.layers.values_mut()
    }

    /// Returns the layers ordered by display name.
    ///
    /// The comparison is case-sensitive and the sort is stable, so layers
    /// with equal display names keep their discovery order.
    pub fn sorted(&self) -> Vec<&LayerInfo> {
        let mut layers: Vec<_> = self.layers.values().collect();
        layers.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        layers
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(class: &str) -> ParsedLayer {
        parse_layer_class(Some(class), DEFAULT_PREFIX).unwrap()
    }

    #[test]
    fn color_normalization() {
        assert_eq!(LayerColor::new("#FFF").to_hex(), "#ffffff");
        assert_eq!(LayerColor::new("#00ff7f").to_hex(), "#00ff7f");
        assert_eq!(LayerColor::new("red").to_hex(), "#ff0000");
        assert_eq!(LayerColor::new("none").to_hex(), "#000000");
    }

    #[test]
    fn color_parse_rejects_garbage() {
        assert!(LayerColor::parse("#12345").is_err());
        assert!(LayerColor::parse("not-a-color").is_err());
        assert_eq!(LayerColor::parse(" #abc ").unwrap().as_str(), "#abc");
    }

    #[test]
    fn merge_color_deduplicates() {
        let mut info = SvgInfo::new();
        let layer = info.entry(parsed("mapviz-water"));
        layer.merge_color("#00f".into());
        layer.merge_color("#00f".into());
        layer.merge_color("#0ff".into());

        assert_eq!(
            info.get("mapviz-water").unwrap().colors,
            vec![LayerColor::new("#00f"), LayerColor::new("#0ff")]
        );
    }

    #[test]
    fn sorted_by_display_name() {
        let mut info = SvgInfo::new();
        info.entry(parsed("mapviz-wall"));
        info.entry(parsed("mapviz-bridge"));

        let names: Vec<_> = info.sorted().iter().map(|l| l.display_name.as_str()).collect();
        assert_eq!(names, ["Bridge", "Wall"]);
    }

    #[test]
    fn sort_keeps_discovery_order_for_equal_names() {
        let mut info = SvgInfo::new();
        info.entry(parsed("mapviz-b"));
        info.entry(parsed("mapviz-A"));
        info.entry(parsed("mapviz-a"));
        info.entry(parsed("mapviz-B"));

        // "a" and "A" both display as "A"; discovery order decides the tie.
        let classes: Vec<_> = info.sorted().iter().map(|l| l.layer_class.as_str()).collect();
        assert_eq!(classes, ["mapviz-A", "mapviz-a", "mapviz-b", "mapviz-B"]);
    }

    #[test]
    fn find_by_name() {
        let mut info = SvgInfo::new();
        info.entry(parsed("mapviz-forest"));
        assert!(info.find_by_name("forest").is_some());
        assert!(info.find_by_name("mapviz-forest").is_none());
    }
}
