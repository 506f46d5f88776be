//! Picker rows, the side panel hosting them, and repainting.
//!
//! The binder is independent of any UI toolkit: it produces plain row
//! descriptions that a front end turns into controls, and it applies palette
//! changes to the presentation tree.

use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::document::{Element, SvgDocument};
use crate::error::Result;
use crate::layer::{LayerInfo, SvgInfo};
use crate::store::ColorStore;

// ============================================================================
// Picker Rows
// ============================================================================

/// One color input control, bound to a slot of a layer's palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorInput {
    pub layer_class: String,
    pub index: usize,

    /// The slot's color as `#rrggbb`.
    pub value: String,
}

/// The control that appends a color slot to a layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSlotControl {
    pub layer_class: String,
}

/// The controls for one layer: a label, one input per color slot and an
/// "add" control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickerRow {
    pub layer_class: String,
    pub label: String,
    pub inputs: Vec<ColorInput>,
    pub add: AddSlotControl,
}

/// Builds the row for a single layer.
pub fn render_row(layer: &LayerInfo) -> PickerRow {
    let inputs = layer
        .colors
        .iter()
        .enumerate()
        .map(|(index, color)| ColorInput {
            layer_class: layer.layer_class.clone(),
            index,
            value: color.to_hex(),
        })
        .collect();

    PickerRow {
        layer_class: layer.layer_class.clone(),
        label: layer.display_name.clone(),
        inputs,
        add: AddSlotControl {
            layer_class: layer.layer_class.clone(),
        },
    }
}

/// Builds one row per layer, ordered by display name.
pub fn render_rows(info: &SvgInfo) -> Vec<PickerRow> {
    info.sorted().into_iter().map(render_row).collect()
}

// ============================================================================
// SidePanel
// ============================================================================

/// An entry of the side panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PanelItem {
    /// Content owned by the host page (headings, the upload control, ...).
    Content { text: String },

    /// A generated picker row.
    Row(PickerRow),

    /// Marks where generated rows go.
    Anchor,
}

/// The panel hosting the picker rows.
///
/// Generated rows are always inserted immediately before the anchor, so
/// host content after the anchor (such as the download trigger) stays below
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidePanel {
    items: Vec<PanelItem>,
}

impl Default for SidePanel {
    fn default() -> Self {
        Self::new()
    }
}

impl SidePanel {
    /// Creates a panel holding only the anchor.
    pub fn new() -> Self {
        Self {
            items: vec![PanelItem::Anchor],
        }
    }

    /// Creates a panel with host content before and after the anchor.
    pub fn with_content(before: &[&str], after: &[&str]) -> Self {
        let content = |text: &&str| PanelItem::Content {
            text: text.to_string(),
        };
        let mut items: Vec<_> = before.iter().map(content).collect();
        items.push(PanelItem::Anchor);
        items.extend(after.iter().map(content));
        Self { items }
    }

    pub fn items(&self) -> &[PanelItem] {
        &self.items
    }

    /// Iterates over the generated rows in panel order.
    pub fn rows(&self) -> impl Iterator<Item = &PickerRow> {
        self.items.iter().filter_map(|item| match item {
            PanelItem::Row(row) => Some(row),
            _ => None,
        })
    }

    pub fn row_count(&self) -> usize {
        self.rows().count()
    }

    pub fn row(&self, layer_class: &str) -> Option<&PickerRow> {
        self.rows().find(|row| row.layer_class == layer_class)
    }

    fn anchor_position(&self) -> usize {
        self.items
            .iter()
            .position(|item| matches!(item, PanelItem::Anchor))
            .unwrap_or(self.items.len())
    }

    /// Inserts rows, in order, immediately before the anchor.
    pub fn insert_rows(&mut self, rows: Vec<PickerRow>) {
        let at = self.anchor_position();
        self.items
            .splice(at..at, rows.into_iter().map(PanelItem::Row));
    }

    /// Removes every generated row and returns how many were removed.
    ///
    /// The set of rows is captured into a fixed list before the first
    /// removal; removing while walking the live panel would shift the
    /// remaining entries and skip every other row.
    pub fn detach_rows(&mut self) -> usize {
        let snapshot: Vec<String> = self.rows().map(|row| row.layer_class.clone()).collect();
        for layer_class in &snapshot {
            self.detach_row(layer_class);
        }
        snapshot.len()
    }

    /// Removes the row of one layer. Returns false if there was none.
    pub fn detach_row(&mut self, layer_class: &str) -> bool {
        let position = self.items.iter().position(
            |item| matches!(item, PanelItem::Row(row) if row.layer_class == layer_class),
        );
        match position {
            Some(position) => {
                self.items.remove(position);
                true
            }
            None => false,
        }
    }

    /// Swaps in a freshly rendered row for the same layer, keeping its
    /// position. Returns false if the layer has no row.
    pub fn replace_row(&mut self, row: PickerRow) -> bool {
        let existing = self.items.iter_mut().find_map(|item| match item {
            PanelItem::Row(current) if current.layer_class == row.layer_class => Some(current),
            _ => None,
        });
        match existing {
            Some(current) => {
                *current = row;
                true
            }
            None => false,
        }
    }
}

// ============================================================================
// Repaint
// ============================================================================

/// Repaints every element of a layer with an independently drawn palette
/// color and returns how many elements were painted.
///
/// Elements are matched by class anywhere in the tree. The color goes into
/// the inline style; the `fill` attribute read during analysis is left
/// untouched.
pub fn repaint_layer<R: Rng + ?Sized>(
    document: &mut SvgDocument,
    store: &ColorStore,
    layer_class: &str,
    rng: &mut R,
) -> Result<usize> {
    store.layer(layer_class)?;

    let mut painted = 0;
    document.root_mut().try_for_each_element_mut(&mut |element: &mut Element| {
        if element.has_class(layer_class) {
            let color = store.random_pick(layer_class, &mut *rng)?;
            element.set_style_property("fill", color.as_str());
            painted += 1;
        }
        Ok(())
    })?;

    debug!(layer = layer_class, elements = painted, "repainted layer");
    Ok(painted)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Node;
    use crate::layer::{AnalyzerOptions, LayerColor, analyze};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn load(markup: &str) -> (SvgDocument, ColorStore) {
        let doc = SvgDocument::parse(markup).unwrap();
        let report = analyze(doc.root(), &AnalyzerOptions::default()).unwrap();
        (doc, ColorStore::new(report.info))
    }

    fn row_for(class: &str) -> PickerRow {
        PickerRow {
            layer_class: class.to_string(),
            label: class.to_string(),
            inputs: Vec::new(),
            add: AddSlotControl {
                layer_class: class.to_string(),
            },
        }
    }

    #[test]
    fn rows_are_sorted_and_bound_to_slots() {
        let (_, store) = load(
            r##"<svg><path class="mapviz-wall" fill="#FFF"/><path class="mapviz-bridge" fill="#111"/><path class="mapviz-bridge" fill="#222"/></svg>"##,
        );

        let rows = render_rows(store.info());
        let labels: Vec<_> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["Bridge", "Wall"]);

        let bridge = &rows[0];
        assert_eq!(bridge.inputs.len(), 2);
        assert_eq!(bridge.inputs[1].index, 1);
        assert_eq!(bridge.inputs[1].layer_class, "mapviz-bridge");
        assert_eq!(bridge.inputs[1].value, "#222222");
        assert_eq!(bridge.add.layer_class, "mapviz-bridge");
        assert_eq!(rows[1].inputs[0].value, "#ffffff");
    }

    #[test]
    fn rows_go_before_the_anchor() {
        let mut panel = SidePanel::with_content(&["Layers"], &["Download"]);
        panel.insert_rows(vec![row_for("a"), row_for("b")]);

        let kinds: Vec<_> = panel
            .items()
            .iter()
            .map(|item| match item {
                PanelItem::Content { text } => text.clone(),
                PanelItem::Row(row) => row.layer_class.clone(),
                PanelItem::Anchor => "^".to_string(),
            })
            .collect();
        assert_eq!(kinds, ["Layers", "a", "b", "^", "Download"]);
    }

    #[test]
    fn detach_removes_every_row() {
        let mut panel = SidePanel::with_content(&["Layers"], &[]);
        panel.insert_rows((0..7).map(|i| row_for(&format!("mapviz-{i}"))).collect());
        assert_eq!(panel.row_count(), 7);

        assert_eq!(panel.detach_rows(), 7);
        assert_eq!(panel.row_count(), 0);
        assert_eq!(panel.items().len(), 2);
    }

    #[test]
    fn replace_row_keeps_position() {
        let mut panel = SidePanel::new();
        panel.insert_rows(vec![row_for("a"), row_for("b"), row_for("c")]);

        let mut updated = row_for("b");
        updated.label = "B!".to_string();
        assert!(panel.replace_row(updated));
        assert!(!panel.replace_row(row_for("zzz")));

        let labels: Vec<_> = panel.rows().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["a", "B!", "c"]);
    }

    #[test]
    fn repaint_uses_only_palette_colors() {
        let mut markup = String::from(r#"<svg class="mapviz-map">"#);
        for _ in 0..100 {
            markup.push_str(r##"<path class="mapviz-green" fill="#fff"/>"##);
        }
        markup.push_str(r##"<path class="mapviz-water" fill="#00f"/></svg>"##);

        let (mut doc, mut store) = load(&markup);
        store
            .replace_colors("mapviz-green", vec![LayerColor::new("#fff"), LayerColor::new("#000")])
            .unwrap();

        let mut rng = StdRng::seed_from_u64(7);
        let painted = repaint_layer(&mut doc, &store, "mapviz-green", &mut rng).unwrap();
        assert_eq!(painted, 100);

        let fills: Vec<_> = doc
            .root()
            .child_elements()
            .filter(|e| e.has_class("mapviz-green"))
            .map(|e| e.style_property("fill"))
            .collect();
        assert_eq!(fills.len(), 100);
        assert!(fills.iter().all(|fill| matches!(fill.as_deref(), Some("#fff") | Some("#000"))));
        assert!(fills.iter().any(|fill| fill.as_deref() == Some("#000")));

        // Analysis input stays as uploaded.
        let first = doc.root().child_elements().next().unwrap();
        assert_eq!(first.attribute("fill").as_deref(), Some("#fff"));

        // Other layers are untouched.
        let water = doc.root().child_elements().last().unwrap();
        assert!(water.style_property("fill").is_none());
    }

    #[test]
    fn repaint_reaches_nested_elements() {
        let (mut doc, store) = load(
            r##"<svg><path class="mapviz-green" fill="#0f0"/><g class="mapviz-group"><circle class="mapviz-green"/></g></svg>"##,
        );

        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(repaint_layer(&mut doc, &store, "mapviz-green", &mut rng).unwrap(), 2);

        let Some(Node::Element(group)) = doc.root().children.get(1) else {
            panic!("expected group element");
        };
        let circle = group.child_elements().next().unwrap();
        assert_eq!(circle.style_property("fill").as_deref(), Some("#0f0"));
    }

    #[test]
    fn repaint_matches_escaped_class_names() {
        let (mut doc, store) = load(r##"<svg><path class="mapviz-a&amp;b" fill="#fff"/></svg>"##);
        assert!(store.info().get("mapviz-a&b").is_some());

        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(repaint_layer(&mut doc, &store, "mapviz-a&b", &mut rng).unwrap(), 1);

        let path = doc.root().child_elements().next().unwrap();
        assert_eq!(path.style_property("fill").as_deref(), Some("#fff"));
    }

    #[test]
    fn repaint_unknown_layer_fails() {
        let (mut doc, store) = load(r##"<svg><path class="mapviz-green" fill="#0f0"/></svg>"##);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(repaint_layer(&mut doc, &store, "mapviz-red", &mut rng).is_err());
    }
}
