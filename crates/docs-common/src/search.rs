//! Fuzzy search over the documentation corpus.
//!
//! Matches the query against each document's title, content and excerpt using
//! approximate substring matching: a field's score is the fewest edits needed
//! to turn the query into some substring of the field, divided by the query
//! length. 0 is an exact match, 1 is no match at all.
//!
//! Field scores are combined the way Fuse.js combines keys, weighting each
//! field by a length norm so a hit in a short title outranks the same hit
//! buried in a long body.
use tracing::debug;

use crate::model::{SearchResult, SearchableDocument};

pub const MAX_RESULTS: usize = 8;
pub const DEFAULT_THRESHOLD: f64 = 0.3;
pub const MIN_MATCH_CHAR_LEN: usize = 2;
/// Longer queries are cut to this many chars before matching. Matching cost
/// grows with query length times field length.
pub const MAX_QUERY_CHARS: usize = 64;

/// Floor for inexact matches; only a query equal to the whole field scores 0.
const MIN_INEXACT_SCORE: f64 = 0.001;
const INDEXED_FIELDS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    /// Highest field score still counted as a match.
    pub threshold: f64,
    /// Queries shorter than this (in chars) match nothing.
    pub min_match_char_len: usize,
    /// Only this many leading chars of the query are matched.
    pub max_query_chars: usize,
    pub limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            min_match_char_len: MIN_MATCH_CHAR_LEN,
            max_query_chars: MAX_QUERY_CHARS,
            limit: MAX_RESULTS,
        }
    }
}

struct IndexedField {
    /// Lowercased text.
    chars: Vec<char>,
    norm: f64,
}

struct IndexedDocument {
    doc: SearchableDocument,
    /// Title, content, excerpt. Blank fields are not indexed.
    fields: [Option<IndexedField>; INDEXED_FIELDS],
}

/// Immutable index over one corpus snapshot. Rebuild it when the corpus changes.
pub struct SearchIndex {
    entries: Vec<IndexedDocument>,
    options: SearchOptions,
    key_weight: f64,
}

impl SearchIndex {
    pub fn build(documents: Vec<SearchableDocument>) -> Self {
        Self::with_options(documents, SearchOptions::default())
    }

    pub fn with_options(documents: Vec<SearchableDocument>, options: SearchOptions) -> Self {
        let entries: Vec<IndexedDocument> = documents
            .into_iter()
            .map(|doc| {
                let fields = [
                    index_field(&doc.title),
                    index_field(&doc.content),
                    index_field(&doc.excerpt),
                ];
                IndexedDocument { doc, fields }
            })
            .collect();

        debug!(documents = entries.len(), "search index built");

        Self {
            entries,
            options,
            key_weight: 1.0 / INDEXED_FIELDS as f64,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Return up to `limit` matches, best (lowest score) first. Ties keep
    /// corpus order. A blank query returns nothing; a query longer than
    /// `max_query_chars` is matched by its prefix.
    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let mut pattern: Vec<char> = query.to_lowercase().chars().collect();
        if pattern.len() > self.options.max_query_chars {
            debug!(
                query_chars = pattern.len(),
                max = self.options.max_query_chars,
                "truncating long query"
            );
            pattern.truncate(self.options.max_query_chars);
        }
        if pattern.len() < self.options.min_match_char_len {
            return Vec::new();
        }

        let mut hits: Vec<(usize, f64)> = self
            .entries
            .iter()
            .enumerate()
            .filter_map(|(idx, entry)| self.score_document(entry, &pattern).map(|score| (idx, score)))
            .collect();

        hits.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        hits.truncate(self.options.limit);

        debug!(query, hits = hits.len(), "search complete");

        hits.into_iter()
            .map(|(idx, score)| {
                let doc = &self.entries[idx].doc;
                SearchResult {
                    slug: doc.slug.clone(),
                    title: doc.title.clone(),
                    excerpt: doc.excerpt.clone(),
                    score,
                }
            })
            .collect()
    }

    fn score_document(&self, entry: &IndexedDocument, pattern: &[char]) -> Option<f64> {
        let mut total = 1.0_f64;
        let mut matched = false;

        for field in entry.fields.iter().flatten() {
            let Some(score) = field_score(&field.chars, pattern, self.options.threshold) else {
                continue;
            };
            matched = true;
            let base = if score == 0.0 { f64::EPSILON } else { score };
            total *= base.powf(self.key_weight * field.norm);
        }

        matched.then_some(total)
    }
}

fn index_field(text: &str) -> Option<IndexedField> {
    if text.trim().is_empty() {
        return None;
    }
    Some(IndexedField {
        chars: text.to_lowercase().chars().collect(),
        norm: field_norm(text),
    })
}

/// `1 / sqrt(tokens)`, rounded to three decimals. Tokens are space-separated.
fn field_norm(text: &str) -> f64 {
    let tokens = text.split(' ').filter(|t| !t.is_empty()).count().max(1);
    let norm = 1.0 / (tokens as f64).sqrt();
    (norm * 1000.0).round() / 1000.0
}

fn field_score(text: &[char], pattern: &[char], threshold: f64) -> Option<f64> {
    if text == pattern {
        return Some(0.0);
    }
    let errors = substring_edit_distance(pattern, text);
    let score = (errors as f64 / pattern.len() as f64).max(MIN_INEXACT_SCORE);
    (score <= threshold).then_some(score)
}

/// Fewest insertions, deletions and substitutions turning `pattern` into any
/// substring of `text`. The match may start anywhere in `text` for free.
fn substring_edit_distance(pattern: &[char], text: &[char]) -> usize {
    let m = pattern.len();
    // column[i]: distance between pattern[..i] and the best text suffix ending here.
    let mut column: Vec<usize> = (0..=m).collect();
    let mut best = m;

    for &t in text {
        let mut diagonal = column[0];
        for i in 1..=m {
            let above = column[i];
            let substitution = diagonal + usize::from(pattern[i - 1] != t);
            column[i] = substitution.min(column[i - 1] + 1).min(above + 1);
            diagonal = above;
        }
        best = best.min(column[m]);
        if best == 0 {
            break;
        }
    }

    best
}
