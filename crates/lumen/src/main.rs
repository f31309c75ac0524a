//! `lumen`: apply a single-slider filter to a photo and keep a gallery of
//! saved edits.
//!
//! ```text
//! lumen filters
//! lumen apply photo.jpg -o noir.png --filter noir
//! lumen apply photo.jpg -o warm.jpg --filter sepia --intensity 0.8 --compare fade.png --record
//! lumen gallery list
//! lumen gallery show <ID> --export saved.jpg
//! lumen gallery delete <ID>
//! ```

mod compare;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use lumen_pipeline::{ContextOptions, ExchangeImage, FilterPipeline, FilterVariant, Intensity};
use lumen_store::{DirectoryStore, EditedPhoto, PhotoStore, StoreConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;
use uuid::Uuid;

use crate::compare::{Fade, blend_images, parse_degrees, parse_percent};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Gallery directory that recorded edits are saved to.
    #[arg(long, global = true, value_name = "DIR", default_value = ".lumen-gallery")]
    gallery: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the available filters and whether they respond to intensity.
    Filters {
        /// Print the catalog as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Apply a filter to an image file.
    Apply(ApplyArgs),

    /// Browse and prune recorded edits.
    #[command(subcommand)]
    Gallery(GalleryCommand),
}

#[derive(clap::Args)]
struct ApplyArgs {
    /// Input image path.
    input: PathBuf,

    /// Output image path. `.jpg`/`.jpeg` write JPEG, anything else is
    /// saved in the format its extension names.
    #[arg(short, long)]
    output: PathBuf,

    /// Filter name, e.g. "noir", "sepia", "color-adjust".
    #[arg(short, long, default_value = "Original", value_parser = parse_filter)]
    filter: FilterVariant,

    /// Filter intensity; values outside 0..=1 are clamped.
    #[arg(short, long, default_value_t = 0.5, allow_negative_numbers = true)]
    intensity: f64,

    /// Also write a before/after fade comparison to this path.
    #[arg(long, value_name = "PATH")]
    compare: Option<PathBuf>,

    /// Horizontal midpoint of the comparison fade, percent of width.
    #[arg(long, value_name = "PCT", default_value = "50", value_parser = parse_percent)]
    fade_x: f64,

    /// Vertical midpoint of the comparison fade, percent of height.
    #[arg(long, value_name = "PCT", default_value = "50", value_parser = parse_percent)]
    fade_y: f64,

    /// Clockwise rotation of the comparison fade in degrees.
    /// 0 = left to right, 90 = top to bottom.
    #[arg(
        long,
        value_name = "DEG",
        default_value = "0",
        value_parser = parse_degrees,
        allow_negative_numbers = true
    )]
    fade_angle: f64,

    /// Save the result to the gallery and print its summary as JSON.
    #[arg(long)]
    record: bool,

    /// JPEG quality for `.jpg` outputs and recorded edits.
    #[arg(long, default_value_t = StoreConfig::DEFAULT_JPEG_QUALITY)]
    jpeg_quality: u8,

    /// Render context options as JSON, e.g. '{"max_render_extent":4096}'.
    #[arg(long, value_name = "JSON")]
    config_json: Option<String>,
}

#[derive(Subcommand)]
enum GalleryCommand {
    /// List recorded edits, newest first.
    List {
        /// Print the summaries as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show one recorded edit.
    Show {
        /// Record id.
        id: Uuid,

        /// Write the stored image to this path.
        #[arg(long, value_name = "PATH")]
        export: Option<PathBuf>,
    },

    /// Delete a recorded edit.
    Delete {
        /// Record id.
        id: Uuid,
    },
}

fn parse_filter(s: &str) -> Result<FilterVariant, String> {
    s.parse().map_err(|e| format!("{e}"))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}

fn list_filters(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        let entries: Vec<serde_json::Value> = FilterVariant::all()
            .map(|f| {
                serde_json::json!({
                    "name": f.display_name(),
                    "supports_intensity": f.supports_intensity(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for filter in FilterVariant::all() {
            let slider = if filter.supports_intensity() {
                "intensity"
            } else {
                "-"
            };
            println!("{:<14}{slider}", filter.display_name());
        }
    }
    Ok(())
}

fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"))
}

fn save(image: &ExchangeImage, path: &Path, jpeg_quality: u8) -> Result<(), Box<dyn std::error::Error>> {
    if is_jpeg(path) {
        std::fs::write(path, image.encode_jpeg(jpeg_quality)?)?;
    } else {
        image.to_rgba_image()?.save(path)?;
    }
    Ok(())
}

fn apply(args: ApplyArgs, gallery: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let options: ContextOptions = match &args.config_json {
        Some(json) => serde_json::from_str(json).map_err(|e| format!("--config-json: {e}"))?,
        None => ContextOptions::default(),
    };
    let store_config = StoreConfig {
        jpeg_quality: args.jpeg_quality,
    };
    store_config
        .validate()
        .map_err(|e| format!("--jpeg-quality: {e}"))?;

    info!(path = %args.input.display(), "reading image");
    let bytes = std::fs::read(&args.input)?;
    let original = ExchangeImage::decode(&bytes)?;

    let pipeline = FilterPipeline::with_options(options);
    let intensity = Intensity::new(args.intensity);
    info!(
        filter = %args.filter,
        intensity = intensity.get(),
        width = original.width(),
        height = original.height(),
        "applying filter",
    );
    let edited = pipeline.apply(args.filter, intensity.get(), &original);

    info!(path = %args.output.display(), "saving");
    save(&edited, &args.output, args.jpeg_quality)?;

    if let Some(compare_path) = &args.compare {
        let fade = Fade {
            center: (args.fade_x, args.fade_y),
            angle: args.fade_angle,
        };
        let blended = blend_images(&original.to_rgba_image()?, &edited.to_rgba_image()?, &fade);
        info!(path = %compare_path.display(), "saving comparison");
        blended.save(compare_path)?;
    }

    if args.record {
        let record = EditedPhoto::capture(args.filter, intensity, &edited, &store_config)?;
        let summary = record.summary();
        let mut store = DirectoryStore::open(gallery)?;
        store.insert(record)?;
        info!(id = %summary.id, gallery = %store.root().display(), "recorded edit");
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    info!("done");
    Ok(())
}

fn run_gallery(command: GalleryCommand, gallery: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = DirectoryStore::open(gallery)?;
    match command {
        GalleryCommand::List { json } => {
            let records = store.recent();
            if json {
                let summaries: Vec<_> = records.iter().map(|r| r.summary()).collect();
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else if records.is_empty() {
                eprintln!("gallery {} is empty", store.root().display());
            } else {
                for record in records {
                    println!(
                        "{}  {}  {:<14}{:.2}",
                        record.id,
                        record.created_at.format("%Y-%m-%d %H:%M:%S"),
                        record.filter_name,
                        record.intensity,
                    );
                }
            }
        }
        GalleryCommand::Show { id, export } => {
            let record = store
                .get(id)
                .ok_or_else(|| format!("no recorded edit with id {id}"))?;
            let image = record.decode_image()?;
            println!("id:        {}", record.id);
            println!("filter:    {}", record.filter_name);
            println!("intensity: {:.2}", record.intensity);
            println!("saved:     {}", record.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
            println!(
                "image:     {}x{} ({} bytes)",
                image.width(),
                image.height(),
                record.image_bytes.len()
            );
            if let Some(path) = export {
                std::fs::write(&path, &record.image_bytes)?;
                info!(path = %path.display(), "exported recorded image");
            }
        }
        GalleryCommand::Delete { id } => {
            let removed = store.delete(id)?;
            info!(id = %removed.id, filter = %removed.filter_name, "deleted recorded edit");
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Filters { json } => list_filters(json),
        Command::Apply(args) => apply(args, &cli.gallery),
        Command::Gallery(command) => run_gallery(command, &cli.gallery),
    }
}
