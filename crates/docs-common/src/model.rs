use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single finding produced while validating an example resource file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    #[serde(rename = "type")]
    pub severity: Severity,
    /// Path of the file the issue was found in, as it was read.
    pub file: PathBuf,
    pub message: String,
    /// 0-based line in `file`, when the parser reported one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl ValidationIssue {
    pub fn error(file: &Path, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            file: file.to_path_buf(),
            message: message.into(),
            line: None,
        }
    }

    pub fn warning(file: &Path, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            file: file.to_path_buf(),
            message: message.into(),
            line: None,
        }
    }

    pub fn at_line(mut self, line: Option<usize>) -> Self {
        self.line = line;
        self
    }
}

/// Issues collected over one validation pass.
///
/// Each call to [`validate_tree`](crate::validate::validate_tree) builds and
/// returns its own report; nothing is shared between passes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        match issue.severity {
            Severity::Error => self.errors.push(issue),
            Severity::Warning => self.warnings.push(issue),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// A directory of example resource files under the examples root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub files: Vec<PathBuf>,
}

/// A documentation page prepared for search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchableDocument {
    /// Unique key, the page's file stem (e.g. "01-introduction").
    pub slug: String,
    pub title: String,
    /// Page body, capped at [`MAX_CONTENT_CHARS`](crate::corpus::MAX_CONTENT_CHARS).
    pub content: String,
    pub excerpt: String,
}

/// A ranked hit from [`SearchIndex::search`](crate::search::SearchIndex::search).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    /// Fuzzy match score, lower is better (0 = exact).
    pub score: f64,
}

/// Metadata for a documentation page, derived from its file name and heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocMetadata {
    pub slug: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

/// A documentation page as loaded from disk, front matter stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doc {
    pub meta: DocMetadata,
    pub body: String,
}
