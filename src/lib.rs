//! Lanternfly: builds the spotted lanternfly detection dataset.
//!
//! A labeling directory holds PNG images, one Pascal VOC style XML
//! annotation per image, and one manifest per split listing the image
//! identifiers that belong to it. This crate turns each split into a lazy
//! sequence of `(identifier, Example)` pairs with labels lower-cased and
//! boxes normalized to the image size.
//!
//! # Modules
//!
//! - [`ir`]: Example records, bounding boxes and the annotation reader
//! - [`builder`]: Manifests, example assembly and split generation
//! - [`features`]: Dataset metadata, feature schema and class vocabulary
//! - [`validation`]: Checks over generated examples
//! - [`stats`]: Per-split counts and label histograms
//! - [`error`]: Error types for lanternfly operations
//!
//! # Example
//!
//! ```no_run
//! use lanternfly::builder::{BuilderConfig, DatasetBuilder};
//!
//! let builder = DatasetBuilder::new(BuilderConfig::new("/srv/lanternfly/labeling"));
//! for examples in builder.split_generators()? {
//!     for item in examples {
//!         let (id, example) = item?;
//!         println!("{id}: {:?}", example.labels);
//!     }
//! }
//! # Ok::<(), lanternfly::LanternflyError>(())
//! ```

pub mod builder;
pub mod error;
pub mod features;
pub mod ir;
pub mod stats;
pub mod validation;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};

use builder::{BuilderConfig, DatasetBuilder, SplitExamples};
pub use error::LanternflyError;
use features::{write_dataset_info, FeaturesDict};
use ir::io_jsonl::{self, ExampleRecord};
use ir::SplitName;

/// The lanternfly CLI application.
#[derive(Parser)]
#[command(name = "lanternfly")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Generate example records for every split.
    Generate(GenerateArgs),
    /// Generate every split and check examples for problems.
    Validate(ValidateArgs),
    /// Show per-split example, object and label counts.
    Stats(StatsArgs),
    /// Print dataset metadata and feature schema as JSON.
    Info,
}

/// Where to find the labeling directory and which splits to build.
#[derive(clap::Args)]
struct SourceArgs {
    /// Labeling directory containing image_sets/, images/ and annotations/.
    data_dir: Option<PathBuf>,

    /// YAML config file with `data_dir` and `splits`.
    #[arg(long, env = "LANTERNFLY_CONFIG")]
    config: Option<PathBuf>,

    /// Split to build (repeatable). Defaults to train and test.
    #[arg(long = "split", value_name = "NAME")]
    splits: Vec<SplitName>,
}

impl SourceArgs {
    /// Merges the config file (if any) with command-line overrides.
    fn into_builder(self) -> Result<DatasetBuilder, LanternflyError> {
        let mut config = match (&self.config, self.data_dir) {
            (Some(path), data_dir) => {
                let mut config = BuilderConfig::from_yaml_file(path)?;
                if let Some(data_dir) = data_dir {
                    config.data_dir = data_dir;
                }
                config
            }
            (None, Some(data_dir)) => BuilderConfig::new(data_dir),
            (None, None) => {
                return Err(LanternflyError::ConfigInvalid(
                    "no data directory given (pass DATA_DIR or --config)".to_string(),
                ));
            }
        };

        if !self.splits.is_empty() {
            config.splits = self.splits;
        }
        config.validate()?;

        Ok(DatasetBuilder::new(config))
    }
}

/// Arguments for the generate subcommand.
#[derive(clap::Args)]
struct GenerateArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Directory to write <split>.jsonl and dataset_info.json into.
    /// Without it, records are printed to stdout as JSON lines.
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
}

/// Arguments for the validate subcommand.
#[derive(clap::Args)]
struct ValidateArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Treat warnings as errors (exit non-zero if any warnings).
    #[arg(long)]
    strict: bool,

    /// Skip checking that image files exist.
    #[arg(long)]
    skip_images: bool,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    output: ReportFormat,
}

/// Arguments for the stats subcommand.
#[derive(clap::Args)]
struct StatsArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    output: ReportFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// Run the lanternfly CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), LanternflyError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Generate(args)) => run_generate(args),
        Some(Commands::Validate(args)) => run_validate(args),
        Some(Commands::Stats(args)) => run_stats(args),
        Some(Commands::Info) => run_info(),
        None => {
            println!("lanternfly {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Builds the spotted lanternfly detection dataset.");
            println!();
            println!("Run 'lanternfly --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the generate subcommand.
fn run_generate(args: GenerateArgs) -> Result<(), LanternflyError> {
    let builder = args.source.into_builder()?;
    let features = builder.info().features;
    let generators = builder.split_generators()?;

    match args.output {
        Some(output) => {
            fs::create_dir_all(&output).map_err(LanternflyError::Io)?;
            let mut staged = Vec::new();

            if let Err(err) = stage_outputs(&output, &builder, generators, &features, &mut staged)
            {
                for (tmp, _) in &staged {
                    // The file may not exist if staging failed before creating it.
                    let _ = fs::remove_file(tmp);
                }
                return Err(err);
            }

            for (tmp, dest) in staged {
                fs::rename(&tmp, &dest).map_err(LanternflyError::Io)?;
            }
            Ok(())
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            for examples in generators {
                for record in checked_records(examples, &features) {
                    io_jsonl::write_record(&mut out, &record?).map_err(|source| {
                        LanternflyError::JsonWrite {
                            path: PathBuf::from("<stdout>"),
                            source,
                        }
                    })?;
                }
            }
            out.flush().map_err(LanternflyError::Io)
        }
    }
}

/// Writes every split and `dataset_info.json` under temporary names.
///
/// Each `(temporary, final)` path pair is pushed to `staged` before its file
/// is created, so the caller can clean up after a failure at any point.
fn stage_outputs(
    output: &Path,
    builder: &DatasetBuilder,
    generators: Vec<SplitExamples>,
    features: &FeaturesDict,
    staged: &mut Vec<(PathBuf, PathBuf)>,
) -> Result<(), LanternflyError> {
    let mut info = builder.info();

    for examples in generators {
        let split = examples.split().clone();
        let (tmp, dest) = staged_paths(output, &format!("{split}.jsonl"));
        staged.push((tmp.clone(), dest));
        let written = io_jsonl::write_examples_jsonl(&tmp, checked_records(examples, features))?;
        log::info!("generated {written} example(s) for split '{split}'");
        info.record_split(&split, written);
    }

    let (tmp, dest) = staged_paths(output, "dataset_info.json");
    staged.push((tmp.clone(), dest));
    write_dataset_info(&tmp, &info)
}

fn staged_paths(output: &Path, name: &str) -> (PathBuf, PathBuf) {
    (output.join(format!("{name}.tmp")), output.join(name))
}

/// Records of a split, each checked against the class vocabulary first.
fn checked_records<'a>(
    examples: SplitExamples,
    features: &'a FeaturesDict,
) -> impl Iterator<Item = Result<ExampleRecord, LanternflyError>> + 'a {
    examples.map(move |item| {
        let (id, example) = item?;
        features.encode_example(&example)?;
        Ok(ExampleRecord::new(id, example))
    })
}

/// Execute the validate subcommand.
fn run_validate(args: ValidateArgs) -> Result<(), LanternflyError> {
    let builder = args.source.into_builder()?;
    let opts = validation::ValidateOptions {
        strict: args.strict,
        check_images: !args.skip_images,
    };
    let report = validation::validate_dataset(&builder, &opts)?;

    match args.output {
        ReportFormat::Json => println!("{}", to_pretty_json(&report)?),
        ReportFormat::Text => print!("{}", report),
    }

    let has_errors = report.error_count() > 0;
    let has_warnings = report.warning_count() > 0;

    if has_errors || (opts.strict && has_warnings) {
        Err(LanternflyError::ValidationFailed {
            error_count: report.error_count(),
            warning_count: report.warning_count(),
            report,
        })
    } else {
        Ok(())
    }
}

/// Execute the stats subcommand.
fn run_stats(args: StatsArgs) -> Result<(), LanternflyError> {
    let builder = args.source.into_builder()?;
    let report = stats::stats_dataset(&builder, &stats::StatsOptions::default())?;

    match args.output {
        ReportFormat::Json => println!("{}", to_pretty_json(&report)?),
        ReportFormat::Text => print!("{}", report),
    }
    Ok(())
}

/// Execute the info subcommand.
fn run_info() -> Result<(), LanternflyError> {
    println!("{}", to_pretty_json(&features::DatasetInfo::lanternfly())?);
    Ok(())
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String, LanternflyError> {
    serde_json::to_string_pretty(value).map_err(|source| LanternflyError::JsonWrite {
        path: PathBuf::from("<stdout>"),
        source,
    })
}
