//! Per-run processing report.

use serde::Serialize;
use std::collections::BTreeMap;

/// A document the pipeline skipped, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedDocument {
    pub path: String,
    pub reason: String,
}

/// Counts and diagnostics accumulated over one processing run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub documents_processed: usize,
    pub documents_skipped: Vec<SkippedDocument>,
    /// Distinct global entities by RDF class name.
    pub entities_by_kind: BTreeMap<String, usize>,
    pub placeholders_created: usize,
    pub collisions_detected: usize,
}

impl RunReport {
    pub fn record_skip(&mut self, path: impl Into<String>, reason: impl ToString) {
        self.documents_skipped.push(SkippedDocument {
            path: path.into(),
            reason: reason.to_string(),
        });
    }

    /// Whether any document was skipped. CLI contexts exit non-zero when true.
    pub fn has_skips(&self) -> bool {
        !self.documents_skipped.is_empty()
    }
}
