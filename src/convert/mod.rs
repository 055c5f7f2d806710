//! COCO JSON to YOLO label conversion.
//!
//! One label file is written per usable image, named after the image with
//! the extension replaced by `.txt`, each line holding
//! `class_index cx cy w h` in normalized coordinates. Images are
//! processed in file-name order with fixed 6-decimal precision, so
//! repeated runs over unchanged input are byte-identical.
//!
//! Per-item problems never abort the run: orphaned annotations,
//! zero-sized images and degenerate boxes are skipped and counted in the
//! returned [`ConvertReport`].

mod report;

pub use report::ConvertReport;

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::bbox::{BBox, Pixel};
use crate::classes::ClassMap;
use crate::coco::{CocoAnnotation, CocoDataset, CocoImage};
use crate::error::PrepError;

/// Converts a parsed COCO dataset into per-image YOLO label files.
///
/// Creates `labels_dir` if missing. Zero-annotation images get an empty
/// label file so the output tree is self-describing; images with zero
/// width or height get no file at all.
pub fn convert_dataset(
    coco: &CocoDataset,
    class_map: &ClassMap,
    labels_dir: &Path,
) -> Result<ConvertReport, PrepError> {
    fs::create_dir_all(labels_dir).map_err(PrepError::Io)?;

    let mut report = ConvertReport {
        images: coco.images.len(),
        classes: class_map.len(),
        ..Default::default()
    };

    let image_ids: BTreeMap<u64, &CocoImage> =
        coco.images.iter().map(|img| (img.id, img)).collect();

    let mut annotations_by_image: BTreeMap<u64, Vec<&CocoAnnotation>> = BTreeMap::new();
    for ann in &coco.annotations {
        if !image_ids.contains_key(&ann.image_id) {
            report.orphan_annotations += 1;
            continue;
        }
        annotations_by_image.entry(ann.image_id).or_default().push(ann);
    }

    let mut images_sorted: Vec<&CocoImage> = coco.images.iter().collect();
    images_sorted.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    for image in images_sorted {
        if image.width == 0 || image.height == 0 {
            report.skipped_images += 1;
            continue;
        }

        let Some(label_name) = label_file_name(&image.file_name) else {
            report.skipped_images += 1;
            continue;
        };

        let mut contents = String::new();
        for ann in annotations_by_image
            .get(&image.id)
            .map_or(&[][..], |anns| anns.as_slice())
        {
            let Some(class_index) = class_map.index_of(ann.category_id) else {
                report.unmapped_annotations += 1;
                continue;
            };

            let [x, y, w, h] = ann.bbox;
            let bbox = BBox::<Pixel>::from_xywh(x, y, w, h)
                .to_norm(image.width as f64, image.height as f64)
                .clamped();

            if !bbox.is_finite() || bbox.is_degenerate() {
                report.degenerate_boxes += 1;
                continue;
            }

            let (cx, cy, w, h) = bbox.to_cxcywh();
            writeln!(
                contents,
                "{} {:.6} {:.6} {:.6} {:.6}",
                class_index, cx, cy, w, h
            )
            .expect("writing to a String cannot fail");
            report.label_lines += 1;
        }

        fs::write(labels_dir.join(label_name), contents).map_err(PrepError::Io)?;
        report.converted_images += 1;
    }

    Ok(report)
}

/// Label file name for an image: the basename with the extension
/// replaced by `.txt`. Returns `None` for path-only names like `.` that
/// have no usable basename.
fn label_file_name(image_file_name: &str) -> Option<PathBuf> {
    let base = Path::new(image_file_name).file_name()?;
    Some(Path::new(base).with_extension("txt"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coco::from_coco_str;

    fn two_image_coco() -> CocoDataset {
        from_coco_str(
            r#"{
                "images": [
                    {"id": 1, "width": 400, "height": 200, "file_name": "left.jpg"},
                    {"id": 2, "width": 100, "height": 100, "file_name": "right.jpg"}
                ],
                "categories": [{"id": 5, "name": "person"}],
                "annotations": [
                    {"id": 1, "image_id": 1, "category_id": 5, "bbox": [100.0, 50.0, 40.0, 20.0]},
                    {"id": 2, "image_id": 2, "category_id": 5, "bbox": [10.0, 10.0, 20.0, 20.0]},
                    {"id": 3, "image_id": 99, "category_id": 5, "bbox": [0.0, 0.0, 5.0, 5.0]}
                ]
            }"#,
        )
        .expect("parse fixture")
    }

    #[test]
    fn orphan_annotation_is_counted_not_fatal() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let coco = two_image_coco();
        let class_map = ClassMap::from_coco(&coco);

        let report = convert_dataset(&coco, &class_map, temp.path()).expect("convert");

        assert_eq!(report.converted_images, 2);
        assert_eq!(report.orphan_annotations, 1);
        assert_eq!(report.label_lines, 2);
        assert!(temp.path().join("left.txt").is_file());
        assert!(temp.path().join("right.txt").is_file());
    }

    #[test]
    fn label_lines_use_fixed_precision() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let coco = two_image_coco();
        let class_map = ClassMap::from_coco(&coco);

        convert_dataset(&coco, &class_map, temp.path()).expect("convert");

        let left = fs::read_to_string(temp.path().join("left.txt")).expect("read label");
        assert_eq!(left, "0 0.300000 0.300000 0.100000 0.100000\n");
    }

    #[test]
    fn zero_annotation_image_gets_empty_file() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let coco = from_coco_str(
            r#"{
                "images": [{"id": 1, "width": 64, "height": 64, "file_name": "bg.png"}],
                "annotations": []
            }"#,
        )
        .expect("parse");
        let class_map = ClassMap::from_coco(&coco);

        let report = convert_dataset(&coco, &class_map, temp.path()).expect("convert");

        assert_eq!(report.converted_images, 1);
        let contents = fs::read_to_string(temp.path().join("bg.txt")).expect("read label");
        assert!(contents.is_empty());
    }

    #[test]
    fn zero_dimension_image_is_skipped_with_warning() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let coco = from_coco_str(
            r#"{
                "images": [
                    {"id": 1, "width": 0, "height": 480, "file_name": "broken.jpg"},
                    {"id": 2, "width": 32, "height": 32, "file_name": "fine.jpg"}
                ],
                "annotations": [
                    {"image_id": 1, "category_id": 1, "bbox": [1, 1, 2, 2]}
                ]
            }"#,
        )
        .expect("parse");
        let class_map = ClassMap::from_coco(&coco);

        let report = convert_dataset(&coco, &class_map, temp.path()).expect("convert");

        assert_eq!(report.skipped_images, 1);
        assert_eq!(report.converted_images, 1);
        assert!(!temp.path().join("broken.txt").exists());
        assert!(temp.path().join("fine.txt").is_file());
    }

    #[test]
    fn box_degenerating_after_clamp_is_skipped() {
        let temp = tempfile::tempdir().expect("create temp dir");
        // Entirely outside the image: clamps to a zero-width sliver.
        let coco = from_coco_str(
            r#"{
                "images": [{"id": 1, "width": 100, "height": 100, "file_name": "a.jpg"}],
                "annotations": [
                    {"image_id": 1, "category_id": 1, "bbox": [150.0, 150.0, 20.0, 20.0]},
                    {"image_id": 1, "category_id": 1, "bbox": [10.0, 10.0, 20.0, 20.0]}
                ]
            }"#,
        )
        .expect("parse");
        let class_map = ClassMap::from_coco(&coco);

        let report = convert_dataset(&coco, &class_map, temp.path()).expect("convert");

        assert_eq!(report.degenerate_boxes, 1);
        assert_eq!(report.label_lines, 1);
    }

    #[test]
    fn conversion_is_byte_idempotent() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let first_dir = temp.path().join("first");
        let second_dir = temp.path().join("second");

        let coco = two_image_coco();
        let class_map = ClassMap::from_coco(&coco);

        convert_dataset(&coco, &class_map, &first_dir).expect("first convert");
        convert_dataset(&coco, &class_map, &second_dir).expect("second convert");

        for name in ["left.txt", "right.txt"] {
            let first = fs::read(first_dir.join(name)).expect("read first");
            let second = fs::read(second_dir.join(name)).expect("read second");
            assert_eq!(first, second, "label file {name} differs between runs");
        }
    }

    #[test]
    fn pinned_class_list_skips_unlisted_annotations() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let coco = from_coco_str(
            r#"{
                "images": [{"id": 1, "width": 100, "height": 100, "file_name": "a.jpg"}],
                "categories": [{"id": 1, "name": "car"}, {"id": 2, "name": "boat"}],
                "annotations": [
                    {"image_id": 1, "category_id": 1, "bbox": [0, 0, 10, 10]},
                    {"image_id": 1, "category_id": 2, "bbox": [0, 0, 10, 10]}
                ]
            }"#,
        )
        .expect("parse");

        let class_map =
            ClassMap::from_name_list(vec!["car".to_string()], &coco).expect("build map");
        let report = convert_dataset(&coco, &class_map, temp.path()).expect("convert");

        assert_eq!(report.label_lines, 1);
        assert_eq!(report.unmapped_annotations, 1);
    }
}
