//! Usage records, the unit of output

pub mod enrich;

pub use enrich::{UsageEnricher, split_repo_path};

use serde::{Deserialize, Serialize};

use crate::types::{Library, TemplateLanguage};

/// One enriched usage of a component.
///
/// Field order is the serialized order. Records are never modified after
/// being emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub repo: String,
    pub component: String,
    pub library: Library,
    pub labels: Vec<String>,
    pub template_language: TemplateLanguage,
    /// `1 + ` newlines in `code`
    pub line_count: usize,
    /// `(` characters in `code`
    pub parenthesis_count: usize,
    /// Characters in `code`
    pub length: usize,
    pub repo_last_updated: String,
    pub usage_example: UsageExample,
    pub code: String,
    pub path: String,
}

/// A renderable excerpt pointing back at the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageExample {
    pub github_url: String,
    pub line_number: u64,
    pub code: String,
    pub path: String,
}

impl UsageRecord {
    /// Last line of the excerpt
    pub fn line_stop(&self) -> u64 {
        self.usage_example.line_number + newline_count(&self.code) as u64
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

pub(crate) fn newline_count(code: &str) -> usize {
    code.matches('\n').count()
}
