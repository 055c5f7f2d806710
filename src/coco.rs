//! Typed COCO JSON reader.
//!
//! Only the detection subset of COCO is modeled: `images`, `annotations`
//! and `categories`. The schema is strict about the keys the converter
//! depends on (a file without `images` or `annotations` fails to
//! deserialize and surfaces as a [`PrepError::CocoJsonParse`]) and
//! permissive about everything else.
//!
//! # COCO Format Reference
//!
//! COCO bounding boxes use `[x, y, width, height]` where `(x, y)` is the
//! top-left corner in absolute pixel coordinates.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::error::PrepError;

/// Top-level COCO dataset structure.
#[derive(Debug, Deserialize)]
pub struct CocoDataset {
    pub images: Vec<CocoImage>,

    pub annotations: Vec<CocoAnnotation>,

    /// Optional: converted datasets fall back to `class_<id>` names.
    #[serde(default)]
    pub categories: Vec<CocoCategory>,
}

/// COCO image entry.
#[derive(Debug, Deserialize)]
pub struct CocoImage {
    pub id: u64,
    pub width: u32,
    pub height: u32,
    pub file_name: String,
}

/// COCO annotation entry.
#[derive(Debug, Deserialize)]
pub struct CocoAnnotation {
    #[serde(default)]
    pub id: u64,

    pub image_id: u64,
    pub category_id: u64,

    /// COCO bbox format: [x, y, width, height] with (x,y) as top-left corner
    pub bbox: [f64; 4],
}

/// COCO category entry.
#[derive(Debug, Deserialize)]
pub struct CocoCategory {
    pub id: u64,
    pub name: String,
}

/// Reads a COCO dataset from a JSON file.
///
/// # Errors
/// Returns [`PrepError::Io`] if the file cannot be opened and
/// [`PrepError::CocoJsonParse`] if it is not valid COCO JSON.
pub fn read_coco_json(path: &Path) -> Result<CocoDataset, PrepError> {
    let file = File::open(path).map_err(PrepError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| PrepError::CocoJsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a COCO dataset from a JSON string.
///
/// Useful for testing without file I/O.
pub fn from_coco_str(json: &str) -> Result<CocoDataset, serde_json::Error> {
    serde_json::from_str(json)
}

/// Reads a COCO dataset from a byte slice.
///
/// Useful for fuzzing and processing raw bytes without UTF-8 validation overhead.
pub fn from_coco_slice(bytes: &[u8]) -> Result<CocoDataset, serde_json::Error> {
    serde_json::from_slice(bytes)
}
