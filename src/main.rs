use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use mapviz_colorizer::{
    Command, Configurable, Outcome, PaletteProfile, Session, SessionConfig, render_preview,
};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// JSON session configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Fail on map children that are not layers
    #[arg(long, global = true)]
    strict: bool,

    /// Seed for random palette draws
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the layers of a map
    Layers { input: PathBuf },

    /// Print the palette profile of a map
    Profile { input: PathBuf },

    /// Recolor a map and export it
    Recolor {
        input: PathBuf,

        /// Palette profile to apply
        #[arg(short, long)]
        profile: Option<PathBuf>,

        /// Layer palette override, e.g. `water=#1f4e79` or `building=#888,#999`
        #[arg(short = 's', long = "set", value_parser = parse_override)]
        overrides: Vec<LayerOverride>,

        /// Directory the exported map is written to
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Also rasterize the result to this PNG file
        #[arg(long)]
        preview: Option<PathBuf>,

        #[arg(long, default_value = "1024")]
        size: u32,
    },
}

#[derive(Debug, Clone)]
struct LayerOverride {
    layer_name: String,
    colors: Vec<String>,
}

fn parse_override(value: &str) -> Result<LayerOverride, String> {
    let (layer_name, colors) = value
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=COLOR[,COLOR...], got `{value}`"))?;
    let colors: Vec<String> = colors
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();
    if layer_name.trim().is_empty() || colors.is_empty() {
        return Err(format!("expected NAME=COLOR[,COLOR...], got `{value}`"));
    }
    Ok(LayerOverride {
        layer_name: layer_name.trim().to_string(),
        colors,
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    let mut config = match &cli.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if cli.strict {
        config.strict = true;
    }
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }

    match cli.command {
        Commands::Layers { input } => {
            let session = load_session(config, &input)?;
            for row in session.panel().rows() {
                let colors: Vec<_> = session
                    .store()
                    .layer(&row.layer_class)?
                    .colors
                    .iter()
                    .map(|c| c.to_string())
                    .collect();
                println!("{:<20} {:<28} {}", row.label, row.layer_class, colors.join(", "));
            }
            for skipped in session.skipped() {
                println!("skipped {}: {}", skipped.describe(), skipped.reason);
            }
        }
        Commands::Profile { input } => {
            let session = load_session(config, &input)?;
            println!("{}", session.export_profile().to_json_pretty()?);
        }
        Commands::Recolor {
            input,
            profile,
            overrides,
            output,
            preview,
            size,
        } => {
            let mut session = load_session(config, &input)?;

            let mut palette = match &profile {
                Some(path) => {
                    let json = fs::read_to_string(path)
                        .with_context(|| format!("failed to read profile {}", path.display()))?;
                    PaletteProfile::from_json(&json)?
                }
                None => PaletteProfile::new(),
            };
            for layer in overrides {
                palette = palette.with_layer(layer.layer_name, layer.colors);
            }

            if !palette.is_empty() {
                let changed = session.apply_profile(&palette)?;
                info!(layers = changed, "applied palette");
            }

            let Outcome::Exported(file) = session.dispatch(Command::ExportSvg)? else {
                bail!("export produced no file");
            };
            fs::create_dir_all(&output)?;
            let path = file.write_to(&output)?;
            println!("{}", path.display());

            if let Some(png) = preview {
                let document = session.document().context("no map loaded")?;
                let Some(image) = render_preview(document, size) else {
                    bail!("failed to rasterize {}", input.display());
                };
                image
                    .save(&png)
                    .with_context(|| format!("failed to write preview {}", png.display()))?;
                println!("{}", png.display());
            }
        }
    }

    Ok(())
}

fn load_session(config: SessionConfig, input: &Path) -> Result<Session> {
    let markup = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;

    let mut session = Session::new(config);
    session
        .upload(markup)
        .with_context(|| format!("failed to load map {}", input.display()))?;
    Ok(session)
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .unwrap_or(&"info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level.to_string()))
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
