//! Serializable palette profiles.
//!
//! A [`PaletteProfile`] maps layer names to palettes. It can be saved from a
//! session, edited by hand and applied to another upload of the same map, or
//! sent between a browser front end and the colorizer as JSON.
//!
//! # Example
//!
//! ```
//! use mapviz_colorizer::PaletteProfile;
//!
//! let profile = PaletteProfile::new()
//!     .with_layer("water", ["#1f4e79"])
//!     .with_layer("building", ["#8c8c8c", "#a0a0a0"]);
//!
//! let json = profile.to_json().unwrap();
//! let restored = PaletteProfile::from_json(&json).unwrap();
//! assert_eq!(restored.layers["building"].colors.len(), 2);
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

// ============================================================================
// LayerPalette
// ============================================================================

/// The palette for one layer.
///
/// A single color paints every element of the layer the same; several
/// colors are drawn at random per element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "tsify", derive(tsify_next::Tsify))]
#[cfg_attr(feature = "tsify", tsify(into_wasm_abi, from_wasm_abi))]
pub struct LayerPalette {
    pub colors: Vec<String>,
}

impl LayerPalette {
    pub fn new<I, S>(colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            colors: colors.into_iter().map(Into::into).collect(),
        }
    }
}

// ============================================================================
// PaletteProfile
// ============================================================================

/// Palettes keyed by layer name (the class name without its prefix).
///
/// # JSON Format
///
/// ```json
/// {
///   "layers": {
///     "water": { "colors": ["#1f4e79"] },
///     "building": { "colors": ["#8c8c8c", "#a0a0a0"] }
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "tsify", derive(tsify_next::Tsify))]
#[cfg_attr(feature = "tsify", tsify(into_wasm_abi, from_wasm_abi))]
pub struct PaletteProfile {
    #[serde(default)]
    #[cfg_attr(feature = "tsify", tsify(type = "Record<string, LayerPalette>"))]
    pub layers: IndexMap<String, LayerPalette>,
}

impl PaletteProfile {
    /// Creates an empty profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the palette of one layer.
    pub fn with_layer<I, S>(mut self, layer_name: impl Into<String>, colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.layers
            .insert(layer_name.into(), LayerPalette::new(colors));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Merges `other` into this profile; its palettes win on conflicts.
    pub fn merge(&mut self, other: PaletteProfile) {
        self.layers.extend(other.layers);
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_keeps_layer_order() {
        let profile = PaletteProfile::new()
            .with_layer("water", ["#00f"])
            .with_layer("building", ["#888", "#999"]);

        let json = profile.to_json().unwrap();
        assert_eq!(
            json,
            r##"{"layers":{"water":{"colors":["#00f"]},"building":{"colors":["#888","#999"]}}}"##
        );
    }

    #[test]
    fn empty_profile_deserializes() {
        let profile = PaletteProfile::from_json("{}").unwrap();
        assert!(profile.is_empty());
    }

    #[test]
    fn merge_overrides_conflicts() {
        let mut base = PaletteProfile::new()
            .with_layer("water", ["#00f"])
            .with_layer("forest", ["#060"]);
        base.merge(PaletteProfile::new().with_layer("water", ["#0ff"]));

        assert_eq!(base.layers.len(), 2);
        assert_eq!(base.layers["water"].colors, ["#0ff"]);
        assert_eq!(base.layers["forest"].colors, ["#060"]);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(PaletteProfile::from_json(r#"{"layers": []}"#).is_err());
    }
}
