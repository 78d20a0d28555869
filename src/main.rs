use aquamark::config::EngineConfig;
use aquamark::engine::Watermarker;
use aquamark::params::WatermarkSpec;
use aquamark::store::JsonStore;
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aquamark")]
#[command(about = "Overlay named watermarks onto images, with cached output")]
#[command(long_about = "\
Overlay named watermarks onto images, with cached output

Watermark images are registered under a name in a JSON store, then applied
to targets with a request string of comma-separated options:

  aquamark add brand logo.png
  aquamark apply \"brand,position=br,opacity=60%\" photo1.jpg photo2.jpg

Each output lands in a watermarked/ directory next to its source, at a
path derived from the resolved parameters. Re-running with the same
request reuses the existing file; editing the watermark definition
invalidates it.

Request options (all optional):
  position   tl|tr|bl|br, center, random, or X x Y pairs (50%x50%, 30x40)
  opacity    integer percent, default 50%
  scale      multiplier (1.5), fit, percent (75%), or WxH (120x40)
  rotation   degrees or \"random\"
  tile       0|1  repeat the mark across the whole image
  greyscale  0|1  desaturate the mark
  obscure, quality, random_position_once   override the engine config")]
#[command(version)]
struct Cli {
    /// Watermark definition store (JSON)
    #[arg(long, default_value = "watermarks.json", global = true)]
    store: PathBuf,

    /// Engine configuration file (TOML); defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply a watermark to one or more images
    Apply {
        /// Request string: "name,key=value,..."
        spec: String,
        /// Target image files
        #[arg(required = true)]
        targets: Vec<String>,
    },
    /// Register a watermark image under a name (replaces an existing entry)
    Add {
        name: String,
        image: PathBuf,
        /// Register without activating
        #[arg(long)]
        inactive: bool,
    },
    /// List watermark definitions
    List,
    /// Activate a watermark
    Enable { name: String },
    /// Deactivate a watermark
    Disable { name: String },
    /// Delete a watermark definition
    Remove { name: String },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Command::Apply { spec, targets } => {
            let spec = WatermarkSpec::parse(&spec)?;
            let store = JsonStore::load(&cli.store)?;
            let engine = Watermarker::new(config);

            // independent targets; same-path races are idempotent writes
            let results: Vec<(String, Result<String, _>)> = targets
                .par_iter()
                .map(|target| (target.clone(), engine.apply(&store, target, &spec)))
                .collect();

            let mut failures = 0;
            for (target, result) in results {
                match result {
                    Ok(out) => println!("{target} -> {out}"),
                    Err(err) => {
                        failures += 1;
                        eprintln!("{target}: {err}");
                    }
                }
            }
            if failures > 0 {
                return Err(format!("{failures} target(s) failed").into());
            }
        }
        Command::Add {
            name,
            image,
            inactive,
        } => {
            let mut store = JsonStore::load(&cli.store)?;
            let record = store.add(&name, image, !inactive);
            println!(
                "registered {:?} (id {}, {})",
                record.name,
                record.id,
                if record.is_active { "active" } else { "inactive" }
            );
            store.save(&cli.store)?;
        }
        Command::List => {
            let store = JsonStore::load(&cli.store)?;
            if store.is_empty() {
                println!("no watermarks registered");
            }
            for record in store.iter() {
                println!(
                    "{:<20} {:<9} updated {}  {}",
                    record.name,
                    if record.is_active { "active" } else { "inactive" },
                    record.date_updated.format("%Y-%m-%d %H:%M:%S"),
                    record.image.display(),
                );
            }
        }
        Command::Enable { name } => {
            let mut store = JsonStore::load(&cli.store)?;
            store.set_active(&name, true)?;
            store.save(&cli.store)?;
            println!("enabled {name:?}");
        }
        Command::Disable { name } => {
            let mut store = JsonStore::load(&cli.store)?;
            store.set_active(&name, false)?;
            store.save(&cli.store)?;
            println!("disabled {name:?}");
        }
        Command::Remove { name } => {
            let mut store = JsonStore::load(&cli.store)?;
            let removed = store.remove(&name)?;
            store.save(&cli.store)?;
            println!("removed {:?} (id {})", removed.name, removed.id);
        }
    }

    Ok(())
}
