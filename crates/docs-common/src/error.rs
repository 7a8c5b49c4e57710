//! Error types shared by the validator CLI and the search service.
//!
//! Validation findings are not errors: they are collected as
//! [`ValidationIssue`](crate::model::ValidationIssue)s in a report. `DocsError`
//! covers failures to load content at all. Binary crates wrap it in their own
//! error types via `#[from]`.
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DocsError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid front matter in {}: {message}", path.display())]
    FrontMatter { path: PathBuf, message: String },
}

impl DocsError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
