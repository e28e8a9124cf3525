//! Parsed DMARC report bundle
//!
//! Records are produced by an external report parser and are passed
//! through untouched, so they stay opaque JSON values here.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::error::Result;

/// Aggregate and forensic report records ready for upload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsingResults {
    /// Periodic per-domain summaries of authentication outcomes
    #[serde(default)]
    pub aggregate_reports: Vec<Value>,
    /// Per-message authentication failure details
    #[serde(default)]
    pub forensic_reports: Vec<Value>,
}

impl ParsingResults {
    pub fn new(aggregate_reports: Vec<Value>, forensic_reports: Vec<Value>) -> Self {
        Self {
            aggregate_reports,
            forensic_reports,
        }
    }

    /// Read a results document (`{"aggregate_reports": [...], "forensic_reports": [...]}`)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn is_empty(&self) -> bool {
        self.aggregate_reports.is_empty() && self.forensic_reports.is_empty()
    }
}
