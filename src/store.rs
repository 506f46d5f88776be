//! Authoritative per-layer palettes.

use rand::Rng;

use crate::error::{Error, Result};
use crate::layer::{LayerColor, LayerInfo, SvgInfo};

/// Holds the [`SvgInfo`] of the loaded map and the operations that edit it.
///
/// The store never repaints the document itself; callers follow each
/// mutation with [`repaint_layer`](crate::repaint_layer).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorStore {
    info: SvgInfo,
}

impl ColorStore {
    pub fn new(info: SvgInfo) -> Self {
        Self { info }
    }

    pub fn info(&self) -> &SvgInfo {
        &self.info
    }

    pub fn layer(&self, layer_class: &str) -> Result<&LayerInfo> {
        self.info
            .get(layer_class)
            .ok_or_else(|| Error::LayerNotFound(layer_class.to_string()))
    }

    fn layer_mut(&mut self, layer_class: &str) -> Result<&mut LayerInfo> {
        self.info
            .get_mut(layer_class)
            .ok_or_else(|| Error::LayerNotFound(layer_class.to_string()))
    }

    /// Replaces the color in slot `index` of a layer's palette.
    ///
    /// The palette never grows through this call: an index past the end is
    /// an [`Error::IndexOutOfRange`].
    pub fn set_color(&mut self, layer_class: &str, index: usize, color: LayerColor) -> Result<()> {
        let layer = self.layer_mut(layer_class)?;
        let len = layer.colors.len();
        let slot = layer
            .colors
            .get_mut(index)
            .ok_or_else(|| Error::IndexOutOfRange {
                layer_class: layer_class.to_string(),
                index,
                len,
            })?;
        *slot = color;
        Ok(())
    }

    /// Appends a copy of the layer's last color and returns the new slot count.
    pub fn add_color_slot(&mut self, layer_class: &str) -> Result<usize> {
        let layer = self.layer_mut(layer_class)?;
        let last = layer
            .colors
            .last()
            .cloned()
            .ok_or_else(|| Error::EmptyPalette(layer_class.to_string()))?;
        layer.colors.push(last);
        Ok(layer.colors.len())
    }

    /// Replaces a layer's whole palette.
    pub fn replace_colors(&mut self, layer_class: &str, colors: Vec<LayerColor>) -> Result<()> {
        if colors.is_empty() {
            return Err(Error::EmptyPalette(layer_class.to_string()));
        }
        self.layer_mut(layer_class)?.colors = colors;
        Ok(())
    }

    /// Draws one color of the layer's palette uniformly at random.
    ///
    /// Every slot is a separate candidate, so a color held in two slots is
    /// twice as likely as one held in a single slot.
    pub fn random_pick<R: Rng + ?Sized>(&self, layer_class: &str, rng: &mut R) -> Result<&LayerColor> {
        let colors = &self.layer(layer_class)?.colors;
        if colors.is_empty() {
            return Err(Error::EmptyPalette(layer_class.to_string()));
        }
        Ok(&colors[rng.random_range(0..colors.len())])
    }
}

// ============================================================================
// Tests
// ============================================================================
