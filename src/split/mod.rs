//! Train/val/test dataset splitting.
//!
//! Partitions a directory of images (and their label files, matched by
//! stem) into `images/{train,val,test}` and `labels/{train,val,test}`
//! under a new root. Files are copied, never moved, so re-running with
//! different fractions leaves the source dataset intact.
//!
//! The partition is two-stage: `test_size` of the shuffled image list is
//! held out, then `val_size` of the held-out portion becomes `test` and
//! the remainder becomes `val`. The defaults (0.2 and 0.5) give an
//! 80/10/10 split.

mod report;

pub use report::SplitReport;

use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use walkdir::WalkDir;

use crate::error::PrepError;

pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "webp"];
const LABEL_EXTENSION: &str = "txt";

/// Split fractions and reproducibility settings.
#[derive(Clone, Copy, Debug)]
pub struct SplitOptions {
    /// Fraction of the full set held out from train.
    pub test_size: f64,
    /// Fraction of the held-out set that becomes test (the remainder is val).
    pub val_size: f64,
    /// Seed for a reproducible shuffle. Unseeded splits are not reproducible.
    pub seed: Option<u64>,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            val_size: 0.5,
            seed: None,
        }
    }
}

/// Validate split options before any file I/O.
pub fn validate_split_options(opts: &SplitOptions) -> Result<(), PrepError> {
    for (name, value) in [("test_size", opts.test_size), ("val_size", opts.val_size)] {
        if !value.is_finite() || value <= 0.0 || value >= 1.0 {
            return Err(PrepError::InvalidConfig {
                message: format!("{} must be strictly between 0.0 and 1.0, got {}", name, value),
            });
        }
    }
    Ok(())
}

/// Splits the dataset under `output_root`.
///
/// Every discovered image lands in exactly one split together with its
/// label file when one exists; images without a label are treated as
/// background and counted once in the report. No output directory is
/// created until the input set is known to be non-empty.
pub fn split_dataset(
    images_dir: &Path,
    labels_dir: &Path,
    output_root: &Path,
    opts: &SplitOptions,
) -> Result<SplitReport, PrepError> {
    validate_split_options(opts)?;

    if !images_dir.is_dir() {
        return Err(PrepError::LayoutInvalid {
            path: images_dir.to_path_buf(),
            message: "images directory not found".to_string(),
        });
    }
    if !labels_dir.is_dir() {
        return Err(PrepError::LayoutInvalid {
            path: labels_dir.to_path_buf(),
            message: "labels directory not found".to_string(),
        });
    }

    let mut images = collect_image_files(images_dir)?;
    if images.is_empty() {
        return Err(PrepError::EmptyDataset {
            path: images_dir.to_path_buf(),
        });
    }
    images.sort();

    match opts.seed {
        Some(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            images.shuffle(&mut rng);
        }
        None => {
            let mut rng = rand::rng();
            images.shuffle(&mut rng);
        }
    }

    let held_count = ((images.len() as f64) * opts.test_size).round() as usize;
    let held_count = held_count.min(images.len());
    let (held, train) = images.split_at(held_count);

    let test_count = ((held.len() as f64) * opts.val_size).round() as usize;
    let test_count = test_count.min(held.len());
    let (test, val) = held.split_at(test_count);

    let mut report = SplitReport {
        train: train.len(),
        val: val.len(),
        test: test.len(),
        seed: opts.seed,
        ..Default::default()
    };

    for (split, files) in [("train", train), ("val", val), ("test", test)] {
        let split_images_dir = output_root.join("images").join(split);
        let split_labels_dir = output_root.join("labels").join(split);
        fs::create_dir_all(&split_images_dir).map_err(PrepError::Io)?;
        fs::create_dir_all(&split_labels_dir).map_err(PrepError::Io)?;

        for image_path in files {
            copy_pair(
                image_path,
                labels_dir,
                &split_images_dir,
                &split_labels_dir,
                &mut report,
            )?;
        }
    }

    Ok(report)
}

fn copy_pair(
    image_path: &Path,
    labels_dir: &Path,
    split_images_dir: &Path,
    split_labels_dir: &Path,
    report: &mut SplitReport,
) -> Result<(), PrepError> {
    let file_name = image_path
        .file_name()
        .ok_or_else(|| PrepError::LayoutInvalid {
            path: image_path.to_path_buf(),
            message: "image path has no file name".to_string(),
        })?;

    fs::copy(image_path, split_images_dir.join(file_name)).map_err(PrepError::Io)?;

    let label_name = Path::new(file_name).with_extension(LABEL_EXTENSION);
    let label_path = labels_dir.join(&label_name);
    if label_path.is_file() {
        fs::copy(&label_path, split_labels_dir.join(&label_name)).map_err(PrepError::Io)?;
    } else {
        report.missing_labels += 1;
    }

    Ok(())
}

fn collect_image_files(images_dir: &Path) -> Result<Vec<PathBuf>, PrepError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(images_dir).follow_links(true) {
        let entry = entry.map_err(|source| PrepError::LayoutInvalid {
            path: images_dir.to_path_buf(),
            message: format!("failed while traversing directory: {source}"),
        })?;

        if entry.file_type().is_file() && has_image_extension(entry.path()) {
            files.push(entry.path().to_path_buf());
        }
    }

    Ok(files)
}

fn has_image_extension(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    IMAGE_EXTENSIONS
        .iter()
        .any(|allowed| ext.eq_ignore_ascii_case(allowed))
}
