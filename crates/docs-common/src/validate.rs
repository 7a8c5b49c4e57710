//! Validator for the example Gateway API resources under `content/examples`.
//!
//! The examples root holds one directory per category, each with `.yaml`/`.yml`
//! files. Every file goes through three checks, always in this order:
//! - syntax: each YAML document must parse
//! - version: `gateway.networking.k8s.io/<version>` must be a known version
//! - schema: Kubernetes-style resources must carry their required fields
//!
//! Files may hold several documents separated by `---` lines. Documents are
//! parsed one by one, so a broken document never hides problems in its
//! siblings.
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_yaml::Value;
use tracing::{debug, warn};

use crate::error::DocsError;
use crate::model::{Category, ValidationIssue, ValidationReport};

pub const GATEWAY_API_GROUP: &str = "gateway.networking.k8s.io";
pub const GATEWAY_API_VERSIONS: &[&str] = &["v1", "v1beta1", "v1alpha2"];
pub const DEFAULT_GATEWAY_API_VERSION: &str = "v1";

const RESOURCE_EXTENSIONS: &[&str] = &["yaml", "yml"];
const REQUIRED_FIELDS: &[&str] = &["apiVersion", "kind", "metadata.name"];

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"apiVersion:\s*['"]?gateway\.networking\.k8s\.io/(v[\w.]+)['"]?"#)
        .expect("valid regex")
});

/// Extra required fields per resource kind, as dotted paths.
const KIND_REQUIRED_FIELDS: &[(&str, &[&str])] = &[
    ("Gateway", &["spec.gatewayClassName"]),
    ("HTTPRoute", &["spec.parentRefs"]),
];

/// Validate every resource file under `root`.
///
/// A missing root yields an empty report; callers decide whether that is worth
/// reporting. Files that cannot be read are logged and skipped.
pub fn validate_tree(root: &Path) -> ValidationReport {
    let mut report = ValidationReport::new();

    if !root.is_dir() {
        debug!(root = %root.display(), "examples root not found, nothing to validate");
        return report;
    }

    let categories = match list_categories(root) {
        Ok(categories) => categories,
        Err(e) => {
            warn!(error = %e, "failed to list example categories");
            return report;
        }
    };

    for category in &categories {
        debug!(category = %category.name, files = category.files.len(), "validating category");
        for file in &category.files {
            match std::fs::read_to_string(file) {
                Ok(content) => validate_file(file, &content, &mut report),
                Err(e) => warn!(file = %file.display(), error = %e, "skipping unreadable file"),
            }
        }
    }

    report
}

/// List the categories under `root`, sorted by name, each with its resource
/// files sorted by name.
pub fn list_categories(root: &Path) -> Result<Vec<Category>, DocsError> {
    let entries = std::fs::read_dir(root).map_err(|e| DocsError::io(root, e))?;

    let mut categories = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| DocsError::io(root, e))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let files = match list_resource_files(&path) {
            Ok(files) => files,
            Err(e) => {
                warn!(error = %e, "skipping unreadable category");
                continue;
            }
        };

        categories.push(Category {
            name: entry.file_name().to_string_lossy().to_string(),
            files,
        });
    }

    categories.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(categories)
}

fn list_resource_files(dir: &Path) -> Result<Vec<PathBuf>, DocsError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| DocsError::io(dir, e))? {
        let path = entry.map_err(|e| DocsError::io(dir, e))?.path();
        let is_resource = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| RESOURCE_EXTENSIONS.contains(&ext));
        if is_resource && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Run the syntax, version and schema checks on one file's text.
pub fn validate_file(file: &Path, content: &str, report: &mut ValidationReport) {
    let documents = parse_documents(content);
    check_syntax(file, &documents, report);
    check_api_versions(file, content, report);
    check_schema(file, &documents, report);
}

struct ParsedDocument {
    /// 1-based position of the document in its file.
    ordinal: usize,
    /// 0-based file line the document starts on.
    start_line: usize,
    parsed: Result<Value, serde_yaml::Error>,
}

struct ParsedFile {
    multi_document: bool,
    documents: Vec<ParsedDocument>,
}

fn parse_documents(content: &str) -> ParsedFile {
    let Some(segments) = split_documents(content) else {
        return parse_stream(content);
    };

    let documents = segments
        .into_iter()
        .enumerate()
        .filter(|(_, segment)| !is_blank_document(&segment.text))
        .map(|(i, segment)| ParsedDocument {
            ordinal: i + 1,
            start_line: segment.start_line,
            parsed: serde_yaml::from_str(&segment.text),
        })
        .collect();

    ParsedFile {
        multi_document: true,
        documents,
    }
}

/// Parse text without bare `---` lines as a YAML stream. Separators carrying
/// a comment or tag (`--- # route`) still start new documents here. Error
/// locations are relative to the whole file.
fn parse_stream(content: &str) -> ParsedFile {
    let mut documents = Vec::new();
    if is_blank_document(content) {
        return ParsedFile {
            multi_document: false,
            documents,
        };
    }

    for (i, deserializer) in serde_yaml::Deserializer::from_str(content).enumerate() {
        let parsed = Value::deserialize(deserializer);
        let failed = parsed.is_err();
        documents.push(ParsedDocument {
            ordinal: i + 1,
            start_line: 0,
            parsed,
        });
        // The parser cannot resync after an error.
        if failed {
            break;
        }
    }

    ParsedFile {
        multi_document: documents.len() > 1,
        documents,
    }
}

struct Segment {
    start_line: usize,
    text: String,
}

/// Split on `---` boundary lines. Returns `None` for single-document text.
fn split_documents(content: &str) -> Option<Vec<Segment>> {
    if !content.lines().any(is_document_boundary) {
        return None;
    }

    let mut segments = Vec::new();
    let mut current = Segment {
        start_line: 0,
        text: String::new(),
    };

    for (n, line) in content.lines().enumerate() {
        if is_document_boundary(line) {
            let next = Segment {
                start_line: n + 1,
                text: String::new(),
            };
            segments.push(std::mem::replace(&mut current, next));
        } else {
            current.text.push_str(line);
            current.text.push('\n');
        }
    }
    segments.push(current);

    Some(segments)
}

fn is_document_boundary(line: &str) -> bool {
    line.trim_end() == "---"
}

/// Whitespace- and comment-only documents carry no resource.
fn is_blank_document(text: &str) -> bool {
    text.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    })
}

fn check_syntax(file: &Path, parsed: &ParsedFile, report: &mut ValidationReport) {
    for document in &parsed.documents {
        let Err(e) = &document.parsed else {
            continue;
        };

        let message = if parsed.multi_document {
            format!("Invalid YAML syntax in document {}: {e}", document.ordinal)
        } else {
            format!("Invalid YAML syntax: {e}")
        };
        // serde_yaml locations are 1-based and relative to the document text.
        let line = e
            .location()
            .map(|loc| document.start_line + loc.line().saturating_sub(1));

        report.push(ValidationIssue::error(file, message).at_line(line));
    }
}

/// Warn about unknown or non-default Gateway API versions, once per distinct
/// version in the file.
fn check_api_versions(file: &Path, content: &str, report: &mut ValidationReport) {
    let mut seen: Vec<&str> = Vec::new();
    for caps in VERSION_RE.captures_iter(content) {
        let Some(version) = caps.get(1).map(|m| m.as_str()) else {
            continue;
        };
        if seen.contains(&version) {
            continue;
        }
        seen.push(version);

        if !GATEWAY_API_VERSIONS.contains(&version) {
            report.push(ValidationIssue::warning(
                file,
                format!(
                    "Unknown Gateway API version: {version}. Supported versions: {}",
                    GATEWAY_API_VERSIONS.join(", ")
                ),
            ));
        } else if version != DEFAULT_GATEWAY_API_VERSION {
            report.push(ValidationIssue::warning(
                file,
                format!(
                    "Using {version} instead of {DEFAULT_GATEWAY_API_VERSION}. \
                     Consider updating to {DEFAULT_GATEWAY_API_VERSION} for stable API."
                ),
            ));
        }
    }
}

fn check_schema(file: &Path, parsed: &ParsedFile, report: &mut ValidationReport) {
    for document in &parsed.documents {
        if let Ok(value) = &document.parsed {
            check_resource(file, value, report);
        }
    }
}

fn check_resource(file: &Path, resource: &Value, report: &mut ValidationReport) {
    if !resource.is_mapping() {
        return;
    }
    // Not a Kubernetes resource, e.g. a values fragment.
    if !is_present(resource, "apiVersion") && !is_present(resource, "kind") {
        return;
    }

    for path in REQUIRED_FIELDS {
        if !is_present(resource, path) {
            report.push(ValidationIssue::error(
                file,
                format!("Missing required field: {path}"),
            ));
        }
    }

    let Some(kind) = resource.get("kind").and_then(Value::as_str) else {
        return;
    };
    for path in required_fields_for_kind(kind) {
        if !is_present(resource, path) {
            report.push(ValidationIssue::error(
                file,
                format!("{kind} resource missing required field: {path}"),
            ));
        }
    }
}

/// Kind-specific required fields, empty for kinds without extra rules.
pub fn required_fields_for_kind(kind: &str) -> &'static [&'static str] {
    KIND_REQUIRED_FIELDS
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, paths)| *paths)
        .unwrap_or(&[])
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |node, key| node.get(key))
}

fn is_present(value: &Value, path: &str) -> bool {
    match lookup(value, path) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Sequence(seq)) => !seq.is_empty(),
        Some(Value::Mapping(map)) => !map.is_empty(),
        Some(_) => true,
    }
}
