//! Loader for the documentation pages under `content/docs`.
//!
//! Pages are `.md`/`.mdx` files; the slug is the file stem and the title is
//! the first `# ` heading. A numeric file prefix (`01-introduction`) gives the
//! page its position in the sidebar.
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::DocsError;
use crate::model::{Doc, DocMetadata, SearchableDocument};

/// Upper bound on the body text handed to the search index, in chars.
pub const MAX_CONTENT_CHARS: usize = 5000;
pub const MAX_EXCERPT_CHARS: usize = 150;
const MIN_EXCERPT_LINE_CHARS: usize = 50;

/// Numeric sidebar prefix of a slug, e.g. `01-`.
static ORDER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)-").expect("valid regex"));

const DOC_EXTENSIONS: &[&str] = &["mdx", "md"];
const SKIPPED_STEMS: &[&str] = &["README"];

/// Load every page in `docs_dir`, ordered for navigation.
///
/// A missing directory is an empty corpus. When both `x.mdx` and `x.md` exist
/// the `.mdx` file wins, so slugs stay unique.
pub fn load_docs(docs_dir: &Path) -> Result<Vec<Doc>, DocsError> {
    if !docs_dir.is_dir() {
        debug!(docs_dir = %docs_dir.display(), "docs directory not found");
        return Ok(Vec::new());
    }

    let mut by_slug: HashMap<String, PathBuf> = HashMap::new();
    for entry in std::fs::read_dir(docs_dir).map_err(|e| DocsError::io(docs_dir, e))? {
        let path = entry.map_err(|e| DocsError::io(docs_dir, e))?.path();
        let Some((slug, ext)) = doc_slug(&path) else {
            continue;
        };
        if !path.is_file() {
            continue;
        }
        let replace = match by_slug.get(&slug) {
            Some(existing) => ext == "mdx" && existing.extension().is_some_and(|e| e == "md"),
            None => true,
        };
        if replace {
            by_slug.insert(slug, path);
        }
    }

    let mut docs = Vec::with_capacity(by_slug.len());
    for (slug, path) in by_slug {
        let raw = std::fs::read_to_string(&path).map_err(|e| DocsError::io(&path, e))?;
        if path.extension().is_some_and(|e| e == "md") {
            debug!(slug = %slug, "document uses .md extension, consider converting to .mdx");
        }
        docs.push(parse_doc(&path, slug, &raw)?);
    }

    docs.sort_by(|a, b| compare_meta(&a.meta, &b.meta));
    Ok(docs)
}

/// Load the docs and prepare them for search.
pub fn load_searchable_docs(docs_dir: &Path) -> Result<Vec<SearchableDocument>, DocsError> {
    let docs = load_docs(docs_dir)?;
    Ok(docs.iter().map(to_searchable).collect())
}

pub fn to_searchable(doc: &Doc) -> SearchableDocument {
    searchable_document(&doc.meta.slug, &doc.meta.title, &doc.body)
}

/// Build a search record from a page body: derive the excerpt from the full
/// body and cap the indexed content.
pub fn searchable_document(slug: &str, title: &str, body: &str) -> SearchableDocument {
    SearchableDocument {
        slug: slug.to_string(),
        title: title.to_string(),
        content: truncate_chars(body, MAX_CONTENT_CHARS).to_string(),
        excerpt: derive_excerpt(body),
    }
}

/// First non-heading line longer than 50 chars, cut to 150 chars with `...`
/// appended when cut. Empty when no line qualifies.
pub fn derive_excerpt(body: &str) -> String {
    let Some(line) = body
        .lines()
        .find(|line| line.trim().chars().count() > MIN_EXCERPT_LINE_CHARS && !line.starts_with('#'))
    else {
        return String::new();
    };

    let excerpt = truncate_chars(line, MAX_EXCERPT_CHARS);
    if excerpt.len() < line.len() {
        format!("{excerpt}...")
    } else {
        excerpt.to_string()
    }
}

/// SHA-256 over slugs and content, used to tell whether an index built from
/// an earlier snapshot is stale.
pub fn corpus_fingerprint(docs: &[SearchableDocument]) -> String {
    let mut hasher = Sha256::new();
    for doc in docs {
        hasher.update(doc.slug.as_bytes());
        hasher.update([0u8]);
        hasher.update(doc.title.as_bytes());
        hasher.update([0u8]);
        hasher.update(doc.content.as_bytes());
        hasher.update([0xffu8]);
    }
    format!("{:x}", hasher.finalize())
}

fn doc_slug(path: &Path) -> Option<(String, &'static str)> {
    let ext = path.extension()?.to_str()?;
    let ext = *DOC_EXTENSIONS.iter().find(|known| **known == ext)?;
    let stem = path.file_stem()?.to_str()?;
    if SKIPPED_STEMS.contains(&stem) {
        return None;
    }
    Some((stem.to_string(), ext))
}

fn parse_doc(path: &Path, slug: String, raw: &str) -> Result<Doc, DocsError> {
    let (front_matter, body) = split_front_matter(raw);
    let data = match front_matter {
        Some(yaml) => parse_front_matter(path, yaml)?,
        None => Value::Null,
    };

    let title = heading_title(raw)
        .or_else(|| data.get("title").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| slug.clone());
    let description = data
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string);
    let order = slug_order(&slug);

    Ok(Doc {
        meta: DocMetadata {
            slug,
            title,
            description,
            order,
        },
        body: body.to_string(),
    })
}

/// Split a leading `---` … `---` YAML block from the page body.
pub fn split_front_matter(raw: &str) -> (Option<&str>, &str) {
    let Some(rest) = raw
        .strip_prefix("---\n")
        .or_else(|| raw.strip_prefix("---\r\n"))
    else {
        return (None, raw);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return (Some(yaml), body);
        }
        offset += line.len();
    }

    warn!("front matter is not closed, treating the whole page as body");
    (None, raw)
}

fn parse_front_matter(path: &Path, yaml: &str) -> Result<Value, DocsError> {
    if yaml.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_yaml::from_str(yaml).map_err(|e| DocsError::FrontMatter {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn heading_title(raw: &str) -> Option<String> {
    raw.lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(|title| title.trim().to_string())
}

fn slug_order(slug: &str) -> Option<u32> {
    ORDER_RE.captures(slug)?[1].parse().ok()
}

fn compare_meta(a: &DocMetadata, b: &DocMetadata) -> std::cmp::Ordering {
    match (a.order, b.order) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.slug.cmp(&b.slug)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.slug.cmp(&b.slug),
    }
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
