//! The colorizer session: one controller owning all state of a running UI.
//!
//! A [`Session`] replaces the loose globals of a page script. It owns the
//! presentation tree, the [`ColorStore`], the [`SidePanel`], the status
//! indicator and the random source used for repaints. Front ends translate
//! their events into [`Command`]s and hand them to [`Session::dispatch`].
//!
//! # Uploads
//!
//! Reading a file is the only asynchronous step. A front end calls
//! [`Session::begin_upload`] when the user picks a file and sends the
//! resulting ticket along with the text once it has been read. Tickets from
//! uploads that were superseded in the meantime are ignored, so the most
//! recently started upload always wins.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::binder::{SidePanel, render_row, render_rows, repaint_layer};
use crate::config::SessionConfig;
use crate::document::SvgDocument;
use crate::error::{Error, Result};
use crate::export::{ExportedFile, export};
use crate::layer::{LayerColor, MalformedLayer, analyze};
use crate::profile::{LayerPalette, PaletteProfile};
use crate::store::ColorStore;

// ============================================================================
// Configurable Trait
// ============================================================================

/// Types whose palettes can be driven by a [`PaletteProfile`].
pub trait Configurable {
    /// Applies a profile and returns how many layers it changed.
    fn apply_profile(&mut self, profile: &PaletteProfile) -> Result<usize>;

    /// Exports the current palettes as a profile.
    fn export_profile(&self) -> PaletteProfile;
}

// ============================================================================
// Commands
// ============================================================================

/// Identifies one upload attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadTicket {
    generation: u64,
}

impl UploadTicket {
    pub(crate) fn from_generation(generation: u64) -> Self {
        Self { generation }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Everything a front end can ask the session to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// The text of an uploaded file has been read.
    UploadSvg { ticket: UploadTicket, markup: String },

    /// A color input changed.
    SetLayerColor {
        layer_class: String,
        index: usize,
        color: String,
    },

    /// The "add" control of a row was clicked.
    AddColorSlot { layer_class: String },

    /// The download trigger was clicked.
    ExportSvg,
}

/// The result of a successfully handled [`Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Uploaded { layers: usize, skipped: usize },

    /// The upload was superseded by a newer one and has been dropped.
    StaleUpload,

    Repainted { layer_class: String, elements: usize },

    SlotAdded { layer_class: String, slots: usize },

    Exported(ExportedFile),
}

/// What the status indicator shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Nothing loaded yet.
    Idle,

    /// A map is loaded and editable.
    Ready { layers: usize, skipped: usize },

    /// The last command failed; previous state is unchanged.
    Failed(String),
}

impl Status {
    /// A short message for the status indicator.
    pub fn message(&self) -> String {
        match self {
            Self::Idle => "Upload an SVG map to begin".to_string(),
            Self::Ready { layers, skipped: 0 } => plural(*layers, "layer"),
            Self::Ready { layers, skipped } => {
                format!(
                    "{} ({} skipped)",
                    plural(*layers, "layer"),
                    plural(*skipped, "element")
                )
            }
            Self::Failed(message) => format!("Error: {message}"),
        }
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

// ============================================================================
// Session
// ============================================================================

/// State of one colorizer UI.
pub struct Session {
    config: SessionConfig,
    document: Option<SvgDocument>,
    store: ColorStore,
    skipped: Vec<MalformedLayer>,
    panel: SidePanel,
    status: Status,
    download_visible: bool,
    generation: u64,
    rng: StdRng,
}

impl Session {
    /// Creates a session with an empty side panel.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_panel(config, SidePanel::new())
    }

    /// Creates a session around an existing side panel.
    pub fn with_panel(config: SessionConfig, panel: SidePanel) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            config,
            document: None,
            store: ColorStore::default(),
            skipped: Vec::new(),
            panel,
            status: Status::Idle,
            download_visible: false,
            generation: 0,
            rng,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The presentation tree of the loaded map.
    pub fn document(&self) -> Option<&SvgDocument> {
        self.document.as_ref()
    }

    pub fn store(&self) -> &ColorStore {
        &self.store
    }

    pub fn panel(&self) -> &SidePanel {
        &self.panel
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Children skipped by the last successful analysis.
    pub fn skipped(&self) -> &[MalformedLayer] {
        &self.skipped
    }

    /// Whether the download trigger is shown. It appears after the first
    /// successful analysis.
    pub fn is_download_visible(&self) -> bool {
        self.download_visible
    }

    /// Starts an upload, superseding any upload still in flight.
    pub fn begin_upload(&mut self) -> UploadTicket {
        self.generation += 1;
        UploadTicket::from_generation(self.generation)
    }

    /// Starts and completes an upload in one step.
    pub fn upload(&mut self, markup: impl Into<String>) -> Result<Outcome> {
        let ticket = self.begin_upload();
        self.dispatch(Command::UploadSvg {
            ticket,
            markup: markup.into(),
        })
    }

    /// Handles one command and updates the status indicator.
    pub fn dispatch(&mut self, command: Command) -> Result<Outcome> {
        let result = match command {
            Command::UploadSvg { ticket, markup } => self.handle_upload(ticket, &markup),
            Command::SetLayerColor {
                layer_class,
                index,
                color,
            } => self.handle_set_color(layer_class, index, &color),
            Command::AddColorSlot { layer_class } => self.handle_add_slot(layer_class),
            Command::ExportSvg => self.handle_export(),
        };

        match &result {
            Ok(Outcome::StaleUpload) => {}
            Ok(_) => self.status = self.ready_status(),
            Err(err) => {
                warn!(error = %err, "command failed");
                self.status = Status::Failed(err.to_string());
            }
        }
        result
    }

    fn ready_status(&self) -> Status {
        Status::Ready {
            layers: self.store.info().len(),
            skipped: self.skipped.len(),
        }
    }

    fn handle_upload(&mut self, ticket: UploadTicket, markup: &str) -> Result<Outcome> {
        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                latest = self.generation,
                "dropping superseded upload"
            );
            return Ok(Outcome::StaleUpload);
        }

        let document = SvgDocument::parse(markup)?;
        let report = analyze(document.root(), &self.config.analyzer_options())?;

        let removed = self.panel.detach_rows();
        debug!(rows = removed, "detached previous picker rows");

        self.store = ColorStore::new(report.info);
        self.panel.insert_rows(render_rows(self.store.info()));
        self.document = Some(document);
        self.skipped = report.skipped;
        self.download_visible = true;

        let layers = self.store.info().len();
        let skipped = self.skipped.len();
        info!(layers, skipped, "loaded map");
        Ok(Outcome::Uploaded { layers, skipped })
    }

    fn handle_set_color(&mut self, layer_class: String, index: usize, color: &str) -> Result<Outcome> {
        let color = LayerColor::parse(color)?;
        let document = self.document.as_mut().ok_or(Error::NoDocument)?;

        self.store.set_color(&layer_class, index, color)?;
        let elements = repaint_layer(document, &self.store, &layer_class, &mut self.rng)?;
        self.panel.replace_row(render_row(self.store.layer(&layer_class)?));

        Ok(Outcome::Repainted {
            layer_class,
            elements,
        })
    }

    fn handle_add_slot(&mut self, layer_class: String) -> Result<Outcome> {
        if self.document.is_none() {
            return Err(Error::NoDocument);
        }

        let slots = self.store.add_color_slot(&layer_class)?;
        self.panel.replace_row(render_row(self.store.layer(&layer_class)?));

        Ok(Outcome::SlotAdded { layer_class, slots })
    }

    fn handle_export(&mut self) -> Result<Outcome> {
        let document = self.document.as_ref().ok_or(Error::NoDocument)?;
        Ok(Outcome::Exported(export(document, &self.config.export_file_name)))
    }
}

impl Configurable for Session {
    /// Replaces the palette of every loaded layer named in the profile and
    /// repaints it. Names without a matching layer are ignored.
    ///
    /// All colors are validated before anything changes. A failure is shown
    /// in the status indicator like a failed command.
    fn apply_profile(&mut self, profile: &PaletteProfile) -> Result<usize> {
        let result = self.replace_palettes(profile);
        match &result {
            Ok(_) => self.status = self.ready_status(),
            Err(err) => {
                warn!(error = %err, "profile failed");
                self.status = Status::Failed(err.to_string());
            }
        }
        result
    }

    fn export_profile(&self) -> PaletteProfile {
        let layers = self
            .store
            .info()
            .sorted()
            .into_iter()
            .map(|layer| {
                let colors = layer.colors.iter().map(|c| c.as_str().to_string());
                (layer.layer_name.clone(), LayerPalette::new(colors))
            })
            .collect();
        PaletteProfile { layers }
    }
}

impl Session {
    fn replace_palettes(&mut self, profile: &PaletteProfile) -> Result<usize> {
        let document = self.document.as_mut().ok_or(Error::NoDocument)?;

        let mut updates = Vec::new();
        for (layer_name, palette) in &profile.layers {
            let Some(layer) = self.store.info().find_by_name(layer_name) else {
                warn!(layer = %layer_name, "profile names a layer missing from the map");
                continue;
            };
            let colors = palette
                .colors
                .iter()
                .map(|color| LayerColor::parse(color))
                .collect::<Result<Vec<_>>>()?;
            if colors.is_empty() {
                return Err(Error::EmptyPalette(layer.layer_class.clone()));
            }
            updates.push((layer.layer_class.clone(), colors));
        }

        for (layer_class, colors) in &updates {
            self.store.replace_colors(layer_class, colors.clone())?;
            repaint_layer(document, &self.store, layer_class, &mut self.rng)?;
            self.panel.replace_row(render_row(self.store.layer(layer_class)?));
        }

        Ok(updates.len())
    }
}

// ============================================================================
// Tests
// ============================================================================
