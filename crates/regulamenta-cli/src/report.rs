use std::fmt;

use regulamenta_extract::ExtractionReport;

/// One-line outcome of a batch job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub job: &'static str,
    pub processed: usize,
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl Summary {
    pub fn new(job: &'static str) -> Self {
        Self {
            job,
            ..Default::default()
        }
    }

    pub fn from_extraction(report: &ExtractionReport) -> Self {
        Self {
            job: "extract",
            processed: report.processed,
            written: report.written(),
            skipped: report.skipped,
            failed: report.failed,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} processed, {} written, {} skipped, {} failed",
            self.job, self.processed, self.written, self.skipped, self.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_line_format() {
        let s = Summary {
            processed: 12,
            written: 9,
            skipped: 2,
            failed: 1,
            ..Summary::new("download")
        };
        assert_eq!(s.to_string(), "download: 12 processed, 9 written, 2 skipped, 1 failed");
    }

    #[test]
    fn extraction_counts_carry_over() {
        let report = ExtractionReport {
            processed: 5,
            skipped: 1,
            failed: 1,
            embedded: 2,
            ocr: 1,
            ..Default::default()
        };
        let s = Summary::from_extraction(&report);
        assert_eq!((s.processed, s.written, s.skipped, s.failed), (5, 3, 1, 1));
    }
}
