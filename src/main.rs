use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use emotion_volume::data::loader::load_file;
use emotion_volume::report::{analyze, single_slice, AnalysisContext, AnalysisReport};
use emotion_volume::{EngineConfig, MappingTables, Orientation, Region, RegionMetadataStore};

#[derive(Parser, Debug)]
#[command(author, version, about = "Map emotion scores onto brain-region overlays", long_about = None)]
struct Args {
    /// Engine configuration (TOML); defaults are used when absent
    #[arg(short, long, global = true, env = "EMOVOL_CONFIG", default_value = "emotion-volume.toml")]
    config: PathBuf,

    /// Use the seeded metadata in memory and never write the store
    #[arg(long, global = true)]
    no_persist: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline and print (or write) the JSON report
    Analyze {
        /// Analyzer output: .json, .csv or .parquet
        input: PathBuf,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also dump every overlay as a PNG into this directory
        #[arg(long)]
        png_dir: Option<PathBuf>,

        /// Slices per orientation
        #[arg(long)]
        slices: Option<usize>,
    },
    /// Print region metadata records
    Regions {
        /// Only this region (e.g. `amygdala`)
        #[arg(long)]
        region: Option<String>,
    },
    /// Project one slice and list its active regions
    Slice {
        input: PathBuf,

        /// axial, coronal or sagittal
        #[arg(long)]
        orientation: String,

        /// Anatomical position along the orientation's fixed axis
        #[arg(long, allow_hyphen_values = true)]
        position: i64,

        /// Write the overlay PNG here
        #[arg(long)]
        png: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = EngineConfig::load_or_default(Some(args.config.as_path()))?;
    if let Command::Analyze {
        slices: Some(n), ..
    } = &args.command
    {
        config.slices_per_view = *n;
    }

    let tables = match &config.mapping_path {
        Some(path) => MappingTables::load(path)?,
        None => MappingTables::builtin(),
    };
    let metadata = if args.no_persist {
        RegionMetadataStore::in_memory()
    } else {
        RegionMetadataStore::open(&config.metadata_path)?
    };
    let ctx = AnalysisContext {
        tables: &tables,
        config: &config,
        metadata: &metadata,
    };

    match args.command {
        Command::Analyze {
            input,
            output,
            png_dir,
            ..
        } => {
            let analysis = load_file(&input)?;
            let report = analyze(&analysis, ctx)?;
            if let Some(dir) = png_dir {
                let written = write_overlays(&report, &dir)?;
                log::info!("wrote {written} overlays to {}", dir.display());
            }
            let json = serde_json::to_string_pretty(&report)?;
            match output {
                Some(path) => fs::write(&path, json)
                    .with_context(|| format!("writing report {}", path.display()))?,
                None => println!("{json}"),
            }
        }
        Command::Regions { region } => {
            let regions = match region {
                Some(name) => vec![name.parse::<Region>()?],
                None => Region::ALL.to_vec(),
            };
            for region in regions {
                let info = metadata.get(region);
                println!("{} ({})", info.name, region.key());
                if !info.description.is_empty() {
                    println!("  {}", info.description);
                }
                if !info.functions.is_empty() {
                    println!("  functions: {}", info.functions.join(", "));
                }
                if !info.music_relation.is_empty() {
                    println!("  music: {}", info.music_relation);
                }
            }
        }
        Command::Slice {
            input,
            orientation,
            position,
            png,
        } => {
            let orientation: Orientation = orientation.parse()?;
            let analysis = load_file(&input)?;
            let slice = single_slice(&analysis, orientation, position, ctx)?;
            println!(
                "{orientation} @ {position}: {}x{} overlay, {} illuminated pixels",
                slice.overlay.width(),
                slice.overlay.height(),
                slice.overlay.illuminated()
            );
            for r in &slice.regions {
                println!("  {:<28} {:.3}", r.info.name, r.activation);
            }
            if let Some(path) = png {
                fs::write(&path, slice.overlay.to_png()?)
                    .with_context(|| format!("writing {}", path.display()))?;
            }
        }
    }

    Ok(())
}

fn write_overlays(report: &AnalysisReport, dir: &Path) -> Result<usize> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let mut written = 0;
    for (orientation, view) in &report.brain_views {
        for slice in &view.slices {
            let path = dir.join(format!("{orientation}_{:03}.png", slice.index));
            fs::write(&path, slice.overlay.to_png()?)
                .with_context(|| format!("writing {}", path.display()))?;
            written += 1;
        }
    }
    Ok(written)
}
