//! Layer discovery.
//!
//! Walks the direct children of a map's root element and groups them into
//! layers by their first class name. Class names are parsed through
//! [`parse_layer_class`], which either yields a [`ParsedLayer`] or explains
//! why the element cannot be a layer.

use std::fmt;

use tracing::{debug, warn};

use super::{LayerColor, SvgInfo};
use crate::document::Element;
use crate::error::{Error, Result};

/// Class prefix written by the mapviz generator.
pub const DEFAULT_PREFIX: &str = "mapviz-";

// ============================================================================
// Class Parsing
// ============================================================================

/// The identifiers derived from a well-formed layer class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLayer {
    pub layer_class: String,
    pub layer_name: String,
    pub display_name: String,
}

/// Why an element's class attribute does not name a layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    /// No class attribute, or one containing only whitespace.
    MissingClass,

    /// The first class name does not start with the layer prefix.
    MissingPrefix(String),

    /// The first class name is the bare prefix.
    EmptyLayerName(String),
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingClass => f.write_str("element has no class name"),
            Self::MissingPrefix(class) => write!(f, "class `{class}` lacks the layer prefix"),
            Self::EmptyLayerName(class) => write!(f, "class `{class}` has an empty layer name"),
        }
    }
}

/// Parses the value of a `class` attribute into layer identifiers.
///
/// Only the first class name matters; further names are ignored.
///
/// ```
/// use mapviz_colorizer::parse_layer_class;
///
/// let parsed = parse_layer_class(Some("mapviz-water outline"), "mapviz-").unwrap();
/// assert_eq!(parsed.layer_name, "water");
/// assert_eq!(parsed.display_name, "Water");
/// ```
pub fn parse_layer_class(
    class_attr: Option<&str>,
    prefix: &str,
) -> Result<ParsedLayer, MalformedReason> {
    let layer_class = class_attr
        .and_then(|classes| classes.split_whitespace().next())
        .ok_or(MalformedReason::MissingClass)?;

    let layer_name = layer_class
        .strip_prefix(prefix)
        .ok_or_else(|| MalformedReason::MissingPrefix(layer_class.to_string()))?;

    if layer_name.is_empty() {
        return Err(MalformedReason::EmptyLayerName(layer_class.to_string()));
    }

    Ok(ParsedLayer {
        layer_class: layer_class.to_string(),
        layer_name: layer_name.to_string(),
        display_name: capitalize(layer_name),
    })
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ============================================================================
// Analysis
// ============================================================================

/// How the analyzer treats the map's children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerOptions {
    /// Class prefix marking layer elements.
    pub prefix: String,

    /// Fail on the first malformed child instead of skipping it.
    pub strict: bool,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            strict: false,
        }
    }
}

/// A child element that was skipped during lenient analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLayer {
    /// Tag name of the offending element.
    pub element: String,

    /// Position among the root's element children, starting at 0.
    pub position: usize,

    pub reason: MalformedReason,
}

impl MalformedLayer {
    /// Human-readable name of the element, e.g. `<path> #3`.
    pub fn describe(&self) -> String {
        format!("<{}> #{}", self.element, self.position)
    }
}

/// The outcome of analyzing one map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisReport {
    pub info: SvgInfo,
    pub skipped: Vec<MalformedLayer>,
}

/// Discovers the layers among the direct children of `root`.
///
/// Children sharing a layer class contribute their `fill` values to one
/// entry; repeated values are kept once. A child without `fill`, or with a
/// blank one, adds no color, and a layer left without any color gets
/// [`LayerColor::DEFAULT_FILL`].
pub fn analyze(root: &Element, options: &AnalyzerOptions) -> Result<AnalysisReport> {
    let mut report = AnalysisReport::default();

    for (position, child) in root.child_elements().enumerate() {
        let parsed = match parse_layer_class(child.attribute("class").as_deref(), &options.prefix)
        {
            Ok(parsed) => parsed,
            Err(reason) => {
                let malformed = MalformedLayer {
                    element: child.name.clone(),
                    position,
                    reason,
                };
                if options.strict {
                    return Err(Error::MalformedLayer {
                        element: malformed.describe(),
                        reason: malformed.reason,
                    });
                }
                warn!(
                    element = %malformed.describe(),
                    reason = %malformed.reason,
                    "skipping malformed layer element"
                );
                report.skipped.push(malformed);
                continue;
            }
        };

        let layer = report.info.entry(parsed);
        if let Some(fill) = child.attribute("fill") {
            let fill = fill.trim();
            if !fill.is_empty() {
                layer.merge_color(LayerColor::new(fill));
            }
        }
    }

    for layer in report.info.iter_mut() {
        if layer.colors.is_empty() {
            layer.colors.push(LayerColor::new(LayerColor::DEFAULT_FILL));
        }
    }

    debug!(
        layers = report.info.len(),
        skipped = report.skipped.len(),
        "analyzed map layers"
    );
    Ok(report)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SvgDocument;

    fn analyze_markup(markup: &str) -> AnalysisReport {
        let doc = SvgDocument::parse(markup).unwrap();
        analyze(doc.root(), &AnalyzerOptions::default()).unwrap()
    }

    #[test]
    fn parse_well_formed_class() {
        let parsed = parse_layer_class(Some("mapviz-living_street"), DEFAULT_PREFIX).unwrap();
        assert_eq!(parsed.layer_class, "mapviz-living_street");
        assert_eq!(parsed.layer_name, "living_street");
        assert_eq!(parsed.display_name, "Living_street");
    }

    #[test]
    fn parse_malformed_classes() {
        assert_eq!(
            parse_layer_class(None, DEFAULT_PREFIX),
            Err(MalformedReason::MissingClass)
        );
        assert_eq!(
            parse_layer_class(Some("   "), DEFAULT_PREFIX),
            Err(MalformedReason::MissingClass)
        );
        assert_eq!(
            parse_layer_class(Some("road mapviz-street"), DEFAULT_PREFIX),
            Err(MalformedReason::MissingPrefix("road".into()))
        );
        assert_eq!(
            parse_layer_class(Some("mapviz-"), DEFAULT_PREFIX),
            Err(MalformedReason::EmptyLayerName("mapviz-".into()))
        );
    }

    #[test]
    fn custom_prefix() {
        let parsed = parse_layer_class(Some("osm-rail"), "osm-").unwrap();
        assert_eq!(parsed.display_name, "Rail");
    }

    #[test]
    fn one_layer_per_distinct_class() {
        let report = analyze_markup(
            r##"<svg class="mapviz-map">
                <path class="mapviz-building" fill="#888"/>
                <path class="mapviz-building" fill="#999"/>
                <path class="mapviz-building" fill="#888"/>
                <path class="mapviz-water" fill="#00f"/>
            </svg>"##,
        );

        assert_eq!(report.info.len(), 2);
        let building = report.info.get("mapviz-building").unwrap();
        assert_eq!(building.colors, vec![LayerColor::new("#888"), LayerColor::new("#999")]);
        assert!(report.info.get("mapviz-map").is_none());
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn nested_elements_are_not_layers() {
        let report = analyze_markup(
            r##"<svg><g class="mapviz-group" fill="#111"><path class="mapviz-inner" fill="#222"/></g></svg>"##,
        );

        assert_eq!(report.info.len(), 1);
        assert!(report.info.get("mapviz-inner").is_none());
    }

    #[test]
    fn missing_fill_defaults_to_black() {
        let report = analyze_markup(
            r##"<svg><polyline class="mapviz-railway" points="0,0 1,1"/><path class="mapviz-street" fill="#333"/><path class="mapviz-street"/></svg>"##,
        );

        assert_eq!(
            report.info.get("mapviz-railway").unwrap().colors,
            vec![LayerColor::new("black")]
        );
        assert_eq!(
            report.info.get("mapviz-street").unwrap().colors,
            vec![LayerColor::new("#333")]
        );
    }

    #[test]
    fn blank_fill_counts_as_missing() {
        let report = analyze_markup(
            r##"<svg><path class="mapviz-a" fill=""/><path class="mapviz-a" fill="#fff"/><path class="mapviz-b" fill="  "/></svg>"##,
        );

        assert_eq!(
            report.info.get("mapviz-a").unwrap().colors,
            vec![LayerColor::new("#fff")]
        );
        assert_eq!(
            report.info.get("mapviz-b").unwrap().colors,
            vec![LayerColor::new("black")]
        );
    }

    #[test]
    fn lenient_mode_skips_malformed_children() {
        let report = analyze_markup(
            r##"<svg><rect fill="#fff"/><path class="other" fill="#000"/><path class="mapviz-green" fill="#0f0"/></svg>"##,
        );

        assert_eq!(report.info.len(), 1);
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.skipped[0].describe(), "<rect> #0");
        assert_eq!(report.skipped[0].reason, MalformedReason::MissingClass);
        assert_eq!(
            report.skipped[1].reason,
            MalformedReason::MissingPrefix("other".into())
        );
    }

    #[test]
    fn strict_mode_names_the_offending_element() {
        let doc = SvgDocument::parse(
            r##"<svg><path class="mapviz-green" fill="#0f0"/><circle class="dot"/></svg>"##,
        )
        .unwrap();
        let options = AnalyzerOptions {
            strict: true,
            ..AnalyzerOptions::default()
        };

        match analyze(doc.root(), &options) {
            Err(Error::MalformedLayer { element, reason }) => {
                assert_eq!(element, "<circle> #1");
                assert_eq!(reason, MalformedReason::MissingPrefix("dot".into()));
            }
            other => panic!("expected malformed layer error, got {other:?}"),
        }
    }
}
