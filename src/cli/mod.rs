//! # CLI Module
//!
//! Command-line interface for media identification and thumbnails.
//!
//! ## Usage
//! ```bash
//! # Classification, metadata and canonical name of a file
//! media-id inspect ~/Photos/IMG_4120.JPG
//!
//! # Sidecars, edits and copies of the same asset
//! media-id related ~/Photos/IMG_4120.JPG
//!
//! # One derivative, or the whole default set
//! media-id thumb ~/Photos/IMG_4120.JPG --profile tile_500
//! media-id thumbs ~/Photos/IMG_4120.JPG --force
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use media_identity::core::{DerivativeEngine, DeriveConfig, MediaFile, ProfileTable};
use media_identity::error::Result;
use media_identity::events::{DeriveEvent, Event, EventChannel};
use std::path::{Path, PathBuf};
use std::thread;

/// Media identity - classify media files and render cached thumbnails
#[derive(Parser, Debug)]
#[command(name = "media-id")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show classification, metadata and canonical names of a file
    Inspect {
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// List the files that belong to the same asset, in processing order
    Related {
        path: PathBuf,

        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Render (or reuse) one derivative
    Thumb {
        path: PathBuf,

        /// Rendering profile name
        #[arg(short, long)]
        profile: String,

        #[command(flatten)]
        cache: CacheArgs,

        /// Regenerate even if the derivative exists
        #[arg(short, long)]
        force: bool,
    },

    /// Render the default derivative set
    Thumbs {
        path: PathBuf,

        #[command(flatten)]
        cache: CacheArgs,

        /// Regenerate derivatives that already exist
        #[arg(short, long)]
        force: bool,
    },

    /// List the rendering profiles
    Profiles {
        /// JSON file with a custom profile table
        #[arg(long)]
        profiles: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
struct CacheArgs {
    /// Derivative cache directory
    #[arg(long)]
    cache: Option<PathBuf>,

    /// JSON file with a custom profile table
    #[arg(long)]
    profiles: Option<PathBuf>,
}

impl CacheArgs {
    fn engine(&self) -> Result<DerivativeEngine> {
        let root = self
            .cache
            .clone()
            .unwrap_or_else(DeriveConfig::default_cache_root);
        let config = DeriveConfig::new(root).profiles(load_profiles(self.profiles.as_deref())?);
        Ok(DerivativeEngine::new(config))
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { path, output } => run_inspect(&path, output),
        Commands::Related { path, output } => run_related(&path, output),
        Commands::Thumb {
            path,
            profile,
            cache,
            force,
        } => run_thumb(&path, &profile, &cache, force),
        Commands::Thumbs { path, cache, force } => run_thumbs(&path, &cache, force),
        Commands::Profiles { profiles } => run_profiles(profiles.as_deref()),
    }
}

fn load_profiles(path: Option<&Path>) -> Result<ProfileTable> {
    match path {
        Some(path) => ProfileTable::from_json_file(path),
        None => Ok(ProfileTable::standard()),
    }
}

fn run_inspect(path: &Path, output: OutputFormat) -> Result<()> {
    let file = MediaFile::open(path)?;
    let metadata = file.metadata().ok();
    let canonical = file.canonical_name()?;

    match output {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "path": file.file_name(),
                "category": file.category(),
                "mime": file.mime_type(),
                "size": file.size(),
                "hash": file.hash()?,
                "canonical_name": canonical,
                "name_from_file": file.canonical_name_from_file(),
                "date_created": file.date_created(),
                "width": file.width(),
                "height": file.height(),
                "aspect_ratio": file.aspect_ratio(),
                "orientation": file.orientation(),
                "metadata": metadata.as_deref(),
            });
            print_json(&value);
        }
        OutputFormat::Pretty => {
            let term = Term::stdout();
            let line = |label: &str, value: String| {
                term.write_line(&format!("  {:<14} {}", style(label).dim(), value)).ok();
            };

            term.write_line(&format!("{}", style(file.file_name().display()).bold())).ok();
            line("category", style(file.category()).cyan().to_string());
            line("mime", file.mime_type().to_string());
            line("size", format_bytes(file.size()));
            line("canonical", style(&canonical).green().to_string());
            line("from file", file.canonical_name_from_file());
            line("created", file.date_created().to_rfc3339());
            if file.width() > 0 {
                line("dimensions", format!("{}x{} ({:.1} MP)", file.width(), file.height(), file.megapixels()));
            }
            if let Some(camera) = file.camera_display() {
                line("camera", camera);
            }
            if !file.lens_model().is_empty() {
                line("lens", file.lens_model());
            }
            if !file.exposure().is_empty() {
                line(
                    "exposure",
                    format!("{}s f/{:.1} ISO {} {:.0}mm", file.exposure(), file.f_number(), file.iso(), file.focal_length()),
                );
            }
            if let Some(meta) = metadata.as_deref().filter(|m| m.has_location) {
                line("location", format!("{:.6}, {:.6}", meta.latitude, meta.longitude));
            }
            if let Some(edited) = file.edited_name() {
                line("edited", edited.display().to_string());
            }
        }
    }

    Ok(())
}

fn run_related(path: &Path, output: OutputFormat) -> Result<()> {
    let file = MediaFile::open(path)?;
    let related = file.related_files()?;
    let main = related.main_file().map(|f| f.file_name());

    match output {
        OutputFormat::Json => {
            let members: Vec<_> = related
                .iter()
                .map(|f| {
                    serde_json::json!({
                        "path": f.file_name(),
                        "category": f.category(),
                        "mime": f.mime_type(),
                        "main": Some(f.file_name()) == main,
                    })
                })
                .collect();
            print_json(&serde_json::json!({ "key": related.key(), "files": members }));
        }
        OutputFormat::Pretty => {
            let term = Term::stdout();
            term.write_line(&format!(
                "{} ({} files)",
                style(related.key()).bold(),
                related.len()
            ))
            .ok();
            for member in &related {
                let marker = if Some(member.file_name()) == main {
                    style("★").green().to_string()
                } else {
                    style("○").dim().to_string()
                };
                term.write_line(&format!(
                    "  {} {:<8} {}",
                    marker,
                    style(member.category()).cyan(),
                    member.relative_name(file.directory()).display()
                ))
                .ok();
            }
        }
    }

    Ok(())
}

fn run_thumb(path: &Path, profile: &str, cache: &CacheArgs, force: bool) -> Result<()> {
    let file = MediaFile::open(path)?;
    let engine = cache.engine()?;

    let thumb = if force {
        engine.resample(&file, profile)?
    } else {
        engine.thumbnail(&file, profile)?
    };

    println!("{}", thumb.display());
    Ok(())
}

fn run_thumbs(path: &Path, cache: &CacheArgs, force: bool) -> Result<()> {
    let file = MediaFile::open(path)?;
    let engine = cache.engine()?;
    let term = Term::stderr();

    let (sender, receiver) = EventChannel::new();

    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );

    let pb = progress.clone();
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Event::Derive(event) = event;
            match &event {
                DeriveEvent::Started { total, .. } => pb.set_length(*total as u64),
                DeriveEvent::Skipped { profile, .. } | DeriveEvent::Generated { profile, .. } => {
                    pb.set_message(profile.clone());
                }
                DeriveEvent::Failed { profile, message } => {
                    pb.println(format!("{} {}: {}", style("✗").red(), profile, message));
                }
                DeriveEvent::Completed { .. } => pb.finish_and_clear(),
            }
            if event.is_profile_done() {
                pb.inc(1);
            }
        }
    });

    let result = engine.resample_default(&file, force, Some(&sender));

    drop(sender);
    event_thread.join().ok();
    let report = result?;

    term.write_line(&format!(
        "{} {} generated, {} reused, {} failed",
        if report.is_complete() {
            style("✓").green().bold()
        } else {
            style("!").yellow().bold()
        },
        style(report.generated.len()).cyan(),
        style(report.skipped.len()).dim(),
        style(report.failures.len()).red()
    ))
    .ok();
    term.write_line(&format!(
        "  {}",
        style(engine.config().cache_root().display()).dim()
    ))
    .ok();

    Ok(())
}

fn run_profiles(path: Option<&Path>) -> Result<()> {
    let table = load_profiles(path)?;
    let term = Term::stdout();

    for profile in table.iter() {
        let options: Vec<&str> = profile.options.iter().map(|o| o.token()).collect();
        term.write_line(&format!(
            "{} {:<10} {:>5}x{:<5} {}",
            if profile.default_set {
                style("*").green()
            } else {
                style(" ").dim()
            },
            profile.name,
            profile.width,
            profile.height,
            style(options.join(", ")).dim()
        ))
        .ok();
    }

    Ok(())
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("failed to serialize output: {}", e),
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
