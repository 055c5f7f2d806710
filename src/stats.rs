//! Dataset coverage statistics.
//!
//! A read-only summary of a COCO annotation file: how many images are
//! annotated, how the annotations spread across categories, and how many
//! annotations are orphaned. Used to sanity-check coverage before
//! converting and training.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::coco::CocoDataset;

/// Coverage summary for one COCO annotation file.
#[derive(Clone, Debug, Default)]
pub struct CoverageReport {
    pub images: usize,
    pub annotations: usize,
    pub categories: usize,
    /// Images with at least one non-orphaned annotation.
    pub annotated_images: usize,
    /// Images with no annotations at all.
    pub background_images: usize,
    /// Annotations referencing an image id absent from `images`.
    pub orphan_annotations: usize,
    /// Per-category annotation counts, sorted by count descending.
    pub per_category: Vec<CategoryCount>,
}

/// A single category with its annotation count.
#[derive(Clone, Debug)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

/// Computes the coverage report for a parsed dataset.
pub fn coverage_report(coco: &CocoDataset) -> CoverageReport {
    let image_ids: HashSet<u64> = coco.images.iter().map(|img| img.id).collect();
    let declared_names: BTreeMap<u64, &str> = coco
        .categories
        .iter()
        .map(|cat| (cat.id, cat.name.as_str()))
        .collect();

    let mut annotated: HashSet<u64> = HashSet::new();
    let mut orphan_annotations = 0;
    let mut counts: BTreeMap<u64, usize> = BTreeMap::new();

    for ann in &coco.annotations {
        if image_ids.contains(&ann.image_id) {
            annotated.insert(ann.image_id);
        } else {
            orphan_annotations += 1;
        }
        *counts.entry(ann.category_id).or_insert(0) += 1;
    }

    let mut per_category: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(coco_id, count)| CategoryCount {
            name: declared_names
                .get(&coco_id)
                .map(|name| (*name).to_string())
                .unwrap_or_else(|| format!("class_{}", coco_id)),
            count,
        })
        .collect();
    per_category.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

    CoverageReport {
        images: coco.images.len(),
        annotations: coco.annotations.len(),
        categories: per_category.len(),
        annotated_images: annotated.len(),
        background_images: coco.images.len() - annotated.len(),
        orphan_annotations,
        per_category,
    }
}

impl fmt::Display for CoverageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Coverage: {} image(s), {} annotation(s), {} class(es)",
            self.images, self.annotations, self.categories
        )?;
        writeln!(
            f,
            "  {} annotated, {} background, {} orphan annotation(s)",
            self.annotated_images, self.background_images, self.orphan_annotations
        )?;

        if !self.per_category.is_empty() {
            writeln!(f, "Annotations per class:")?;
            for entry in &self.per_category {
                writeln!(f, "  {:<24} {}", entry.name, entry.count)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coco::from_coco_str;

    fn sample_coco() -> CocoDataset {
        from_coco_str(
            r#"{
                "images": [
                    {"id": 1, "width": 100, "height": 100, "file_name": "a.jpg"},
                    {"id": 2, "width": 100, "height": 100, "file_name": "b.jpg"},
                    {"id": 3, "width": 100, "height": 100, "file_name": "c.jpg"}
                ],
                "categories": [{"id": 1, "name": "person"}, {"id": 2, "name": "dog"}],
                "annotations": [
                    {"image_id": 1, "category_id": 1, "bbox": [0, 0, 10, 10]},
                    {"image_id": 1, "category_id": 1, "bbox": [5, 5, 10, 10]},
                    {"image_id": 2, "category_id": 2, "bbox": [0, 0, 10, 10]},
                    {"image_id": 42, "category_id": 1, "bbox": [0, 0, 10, 10]}
                ]
            }"#,
        )
        .expect("parse sample")
    }

    #[test]
    fn counts_annotated_background_and_orphans() {
        let report = coverage_report(&sample_coco());

        assert_eq!(report.images, 3);
        assert_eq!(report.annotations, 4);
        assert_eq!(report.annotated_images, 2);
        assert_eq!(report.background_images, 1);
        assert_eq!(report.orphan_annotations, 1);
    }

    #[test]
    fn per_category_sorts_by_count_descending() {
        let report = coverage_report(&sample_coco());

        assert_eq!(report.per_category.len(), 2);
        assert_eq!(report.per_category[0].name, "person");
        assert_eq!(report.per_category[0].count, 3);
        assert_eq!(report.per_category[1].name, "dog");
        assert_eq!(report.per_category[1].count, 1);
    }

    #[test]
    fn display_lists_classes() {
        let report = coverage_report(&sample_coco());
        let text = report.to_string();

        assert!(text.contains("Coverage: 3 image(s), 4 annotation(s), 2 class(es)"));
        assert!(text.contains("person"));
        assert!(text.contains("1 orphan annotation(s)"));
    }
}
