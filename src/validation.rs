//! Page sequence validation.
//!
//! [`validate_pages`] inspects a finished page sequence and returns a
//! [`ValidationReport`] describing its structure and anything a reader of
//! the output document would notice.
//!
//! # Example
//!
//! ```
//! use lecture2pdf::{FrameSample, PageRecord, validate_pages};
//!
//! let pages = vec![PageRecord {
//!     index: 0,
//!     image: FrameSample::new(0.0, ()),
//!     start: 0.0,
//!     end: 12.0,
//!     text: String::new(),
//!     cue_count: 0,
//! }];
//! let report = validate_pages(&pages);
//! assert!(report.is_valid());
//! assert_eq!(report.warnings.len(), 1); // a page without captions
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::assembler::PageRecord;

/// Scenes shorter than this are reported as likely false splits.
const SHORT_SCENE_SECONDS: f64 = 0.5;

/// Summary of page sequence validation.
///
/// Contains lists of informational notices, warnings, and errors.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Informational notices (not problems).
    pub info: Vec<String>,
    /// Issues a reader may notice, such as pages without captions.
    pub warnings: Vec<String>,
    /// Broken invariants: gaps, overlaps, misnumbered pages.
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// Returns `true` if no errors were found.
    ///
    /// Warnings do not affect this result.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of issues (info + warnings + errors).
    pub fn issue_count(&self) -> usize {
        self.info.len() + self.warnings.len() + self.errors.len()
    }
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for item in &self.info {
            writeln!(f, "[INFO] {item}")?;
        }
        for item in &self.warnings {
            writeln!(f, "[WARN] {item}")?;
        }
        for item in &self.errors {
            writeln!(f, "[ERROR] {item}")?;
        }
        if self.issue_count() == 0 {
            writeln!(f, "No issues found.")?;
        }
        Ok(())
    }
}

/// Run validation checks over a page sequence.
pub fn validate_pages<D>(pages: &[PageRecord<D>]) -> ValidationReport {
    let mut report = ValidationReport::default();

    let (Some(first), Some(last)) = (pages.first(), pages.last()) else {
        report.errors.push("Document has no pages".to_string());
        return report;
    };

    // ── Ordering and timeline ──────────────────────────────────────
    for (position, page) in pages.iter().enumerate() {
        if page.index != position {
            report.errors.push(format!(
                "Page at position {position} carries index {}",
                page.index
            ));
        }
        if page.end < page.start {
            report.errors.push(format!(
                "Page {} has an inverted interval [{:.3}, {:.3})",
                page.index, page.start, page.end
            ));
        }
    }

    for pair in pages.windows(2) {
        let (before, after) = (&pair[0], &pair[1]);
        if before.end < after.start {
            report.errors.push(format!(
                "Gap between page {} (ends {:.3}s) and page {} (starts {:.3}s)",
                before.index, before.end, after.index, after.start
            ));
        } else if before.end > after.start {
            report.errors.push(format!(
                "Page {} (ends {:.3}s) overlaps page {} (starts {:.3}s)",
                before.index, before.end, after.index, after.start
            ));
        }
    }

    // ── Content ────────────────────────────────────────────────────
    let silent: Vec<usize> = pages
        .iter()
        .filter(|page| page.text.is_empty())
        .map(|page| page.index)
        .collect();
    if silent.len() == pages.len() && pages.len() > 1 {
        report
            .warnings
            .push("No page has a caption; were subtitles supplied?".to_string());
    } else {
        for index in silent {
            report.warnings.push(format!("Page {index} has no caption"));
        }
    }

    for page in pages {
        let duration = page.end - page.start;
        if duration < SHORT_SCENE_SECONDS && pages.len() > 1 {
            report.warnings.push(format!(
                "Page {} covers only {duration:.3}s, possibly a spurious split",
                page.index
            ));
        }
    }

    let cues: usize = pages.iter().map(|page| page.cue_count).sum();
    report.info.push(format!(
        "{} pages covering {:.3}s–{:.3}s, {cues} cues",
        pages.len(),
        first.start,
        last.end
    ));

    report
}
