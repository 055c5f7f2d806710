//! Split outcome reporting.

use std::fmt;

/// Counters describing a split run.
#[derive(Clone, Debug, Default)]
pub struct SplitReport {
    pub train: usize,
    pub val: usize,
    pub test: usize,
    /// Images that had no label file (background-only), counted once per run.
    pub missing_labels: usize,
    /// Seed used for the shuffle, if any.
    pub seed: Option<u64>,
}

impl SplitReport {
    pub fn total(&self) -> usize {
        self.train + self.val + self.test
    }
}

impl fmt::Display for SplitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Split {} image(s): {} train, {} val, {} test",
            self.total(),
            self.train,
            self.val,
            self.test
        )?;

        match self.seed {
            Some(seed) => writeln!(f, "Shuffled with seed {} (reproducible)", seed)?,
            None => writeln!(f, "Shuffled without a seed (not reproducible)")?,
        }

        if self.missing_labels > 0 {
            writeln!(
                f,
                "{} image(s) had no label file (treated as background)",
                self.missing_labels
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_and_seed_render() {
        let report = SplitReport {
            train: 8,
            val: 1,
            test: 1,
            missing_labels: 2,
            seed: Some(42),
        };

        let text = report.to_string();
        assert!(text.contains("Split 10 image(s): 8 train, 1 val, 1 test"));
        assert!(text.contains("seed 42"));
        assert!(text.contains("2 image(s) had no label file"));
    }

    #[test]
    fn unseeded_split_is_flagged() {
        let report = SplitReport {
            train: 1,
            ..Default::default()
        };
        assert!(report.to_string().contains("not reproducible"));
    }
}
