//! Conversion outcome reporting.

use std::fmt;

/// Counters describing a conversion run.
///
/// Warnings are totals for the whole run; the converter never logs
/// per-file.
#[derive(Clone, Debug, Default)]
pub struct ConvertReport {
    /// Images present in the input JSON.
    pub images: usize,
    /// Images that received a label file.
    pub converted_images: usize,
    /// Images skipped entirely (zero width/height or unusable name).
    pub skipped_images: usize,
    /// Label lines written across all files.
    pub label_lines: usize,
    /// Classes in the remapping.
    pub classes: usize,
    /// Annotations referencing an image id absent from `images`.
    pub orphan_annotations: usize,
    /// Boxes dropped as non-finite or zero-area after clamping.
    pub degenerate_boxes: usize,
    /// Annotations whose category is not in the (pinned) class map.
    pub unmapped_annotations: usize,
}

impl ConvertReport {
    /// Total per-item warnings accumulated during the run.
    pub fn warning_count(&self) -> usize {
        self.skipped_images
            + self.orphan_annotations
            + self.degenerate_boxes
            + self.unmapped_annotations
    }
}

impl fmt::Display for ConvertReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Converted {} of {} image(s): {} label line(s), {} class(es)",
            self.converted_images, self.images, self.label_lines, self.classes
        )?;

        if self.warning_count() == 0 {
            return Ok(());
        }

        writeln!(f, "{} warning(s):", self.warning_count())?;
        if self.skipped_images > 0 {
            writeln!(
                f,
                "  {} image(s) skipped (zero width/height or unusable file name)",
                self.skipped_images
            )?;
        }
        if self.orphan_annotations > 0 {
            writeln!(
                f,
                "  {} annotation(s) referenced an unknown image id",
                self.orphan_annotations
            )?;
        }
        if self.degenerate_boxes > 0 {
            writeln!(
                f,
                "  {} box(es) dropped as degenerate after clamping",
                self.degenerate_boxes
            )?;
        }
        if self.unmapped_annotations > 0 {
            writeln!(
                f,
                "  {} annotation(s) had no class in the supplied class list",
                self.unmapped_annotations
            )?;
        }

        Ok(())
    }
}
