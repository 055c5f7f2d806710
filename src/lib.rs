//! Yoloprep: dataset preparation for YOLO training.
//!
//! Yoloprep takes a COCO-style JSON export (e.g. from Label Studio) and
//! turns it into a training-ready YOLO dataset: per-image normalized
//! label files, a reproducible train/val/test split, and the `data.yaml`
//! class manifest the training engine consumes. Everything downstream of
//! dataset preparation (the model, training, inference) belongs to the
//! external detection framework.
//!
//! # Modules
//!
//! - [`coco`]: typed COCO JSON schema and reader
//! - [`convert`]: COCO to YOLO label conversion
//! - [`split`]: train/val/test partitioning
//! - [`classes`]: COCO-id to YOLO-index class remapping
//! - [`stats`]: dataset coverage summaries
//! - [`error`]: error types for yoloprep operations

pub mod bbox;
pub mod classes;
pub mod coco;
pub mod convert;
pub mod error;
pub mod split;
pub mod stats;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use error::PrepError;

use classes::ClassMap;
use split::SplitOptions;

/// The yoloprep CLI application.
#[derive(Parser)]
#[command(name = "yoloprep")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Convert COCO JSON annotations to YOLO label files.
    Convert(ConvertArgs),
    /// Split paired images and labels into train/val/test.
    Split(SplitArgs),
    /// Convert and split in one run, writing data.yaml.
    Prepare(PrepareArgs),
    /// Print a coverage summary for a COCO JSON file.
    Stats(StatsArgs),
}

/// Arguments for the convert subcommand.
#[derive(clap::Args)]
struct ConvertArgs {
    /// COCO JSON annotation file.
    annotations: PathBuf,

    /// Directory to write label files (and classes.txt) into.
    #[arg(long)]
    output: PathBuf,

    /// Ordered class list (classes.txt or a data.yaml with a names key)
    /// pinning the index assignment. Without it, indices follow sorted
    /// COCO category ids.
    #[arg(long)]
    classes: Option<PathBuf>,
}

/// Arguments for the split subcommand.
#[derive(clap::Args)]
struct SplitArgs {
    /// Directory containing the source images.
    #[arg(long = "images-dir")]
    images_dir: PathBuf,

    /// Directory containing the YOLO label files.
    #[arg(long = "labels-dir")]
    labels_dir: PathBuf,

    /// Output dataset root.
    #[arg(long)]
    output: PathBuf,

    /// Fraction of the dataset held out from train.
    #[arg(long = "test-size", default_value_t = 0.2)]
    test_size: f64,

    /// Fraction of the held-out portion that becomes test (the rest is val).
    #[arg(long = "val-size", default_value_t = 0.5)]
    val_size: f64,

    /// Shuffle seed. Omitting it makes the split non-reproducible.
    #[arg(long)]
    seed: Option<u64>,
}

/// Arguments for the prepare subcommand.
#[derive(clap::Args)]
struct PrepareArgs {
    /// COCO JSON annotation file.
    annotations: PathBuf,

    /// Directory containing the source images.
    #[arg(long = "images-dir")]
    images_dir: PathBuf,

    /// Output dataset root.
    #[arg(long)]
    output: PathBuf,

    /// Fraction of the dataset held out from train.
    #[arg(long = "test-size", default_value_t = 0.2)]
    test_size: f64,

    /// Fraction of the held-out portion that becomes test (the rest is val).
    #[arg(long = "val-size", default_value_t = 0.5)]
    val_size: f64,

    /// Shuffle seed. Omitting it makes the split non-reproducible.
    #[arg(long)]
    seed: Option<u64>,

    /// Ordered class list pinning the index assignment.
    #[arg(long)]
    classes: Option<PathBuf>,
}

/// Arguments for the stats subcommand.
#[derive(clap::Args)]
struct StatsArgs {
    /// COCO JSON annotation file.
    annotations: PathBuf,
}

/// Run the yoloprep CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), PrepError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Convert(args)) => run_convert(args),
        Some(Commands::Split(args)) => run_split(args),
        Some(Commands::Prepare(args)) => run_prepare(args),
        Some(Commands::Stats(args)) => run_stats(args),
        None => {
            println!("yoloprep {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Dataset preparation for YOLO training.");
            println!();
            println!("Run 'yoloprep --help' for usage information.");
            Ok(())
        }
    }
}

/// Build the class map, honoring a user-supplied class file when given.
fn build_class_map(
    coco: &coco::CocoDataset,
    classes: Option<&PathBuf>,
) -> Result<ClassMap, PrepError> {
    match classes {
        Some(path) => {
            let names = classes::load_class_names(path)?;
            ClassMap::from_name_list(names, coco)
        }
        None => Ok(ClassMap::from_coco(coco)),
    }
}

fn run_convert(args: ConvertArgs) -> Result<(), PrepError> {
    let coco = coco::read_coco_json(&args.annotations)?;
    let class_map = build_class_map(&coco, args.classes.as_ref())?;

    let report = convert::convert_dataset(&coco, &class_map, &args.output)?;
    class_map.write_classes_txt(&args.output.join("classes.txt"))?;

    print!("{report}");
    Ok(())
}

fn run_split(args: SplitArgs) -> Result<(), PrepError> {
    let opts = SplitOptions {
        test_size: args.test_size,
        val_size: args.val_size,
        seed: args.seed,
    };

    let report = split::split_dataset(&args.images_dir, &args.labels_dir, &args.output, &opts)?;

    print!("{report}");
    Ok(())
}

fn run_prepare(args: PrepareArgs) -> Result<(), PrepError> {
    let opts = SplitOptions {
        test_size: args.test_size,
        val_size: args.val_size,
        seed: args.seed,
    };
    // Fail on bad fractions before converting anything.
    split::validate_split_options(&opts)?;

    let coco = coco::read_coco_json(&args.annotations)?;
    let class_map = build_class_map(&coco, args.classes.as_ref())?;

    let labels_dir = args.output.join("yolo_labels");
    let convert_report = convert::convert_dataset(&coco, &class_map, &labels_dir)?;
    class_map.write_classes_txt(&labels_dir.join("classes.txt"))?;

    let split_report = split::split_dataset(&args.images_dir, &labels_dir, &args.output, &opts)?;
    class_map.write_data_yaml(&args.output)?;

    print!("{convert_report}");
    print!("{split_report}");
    println!("Wrote {}", args.output.join("data.yaml").display());
    Ok(())
}

fn run_stats(args: StatsArgs) -> Result<(), PrepError> {
    let coco = coco::read_coco_json(&args.annotations)?;
    let report = stats::coverage_report(&coco);

    print!("{report}");
    Ok(())
}
