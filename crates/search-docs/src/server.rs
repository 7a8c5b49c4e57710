//! HTTP surface for the docs search.
//!
//! Routes:
//! - `GET /api/search-docs`: the full searchable corpus, for client-side search
//! - `GET /api/search?q=...`: ranked results from the server-side index
//! - `GET /healthz`
//!
//! The corpus is re-read on every request. The search index is cached and
//! rebuilt only when the corpus fingerprint changes.
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::info;

use docs_common::corpus::{corpus_fingerprint, load_searchable_docs};
use docs_common::model::{SearchResult, SearchableDocument};
use docs_common::search::SearchIndex;

use crate::error::AppError;

struct CachedIndex {
    fingerprint: String,
    index: Arc<SearchIndex>,
}

#[derive(Clone)]
pub struct AppState {
    docs_dir: Arc<PathBuf>,
    index: Arc<RwLock<Option<CachedIndex>>>,
}

impl AppState {
    pub fn new(docs_dir: PathBuf) -> Self {
        Self {
            docs_dir: Arc::new(docs_dir),
            index: Arc::new(RwLock::new(None)),
        }
    }

    async fn load_corpus(&self) -> Result<Vec<SearchableDocument>, AppError> {
        let docs_dir = Arc::clone(&self.docs_dir);
        let docs = tokio::task::spawn_blocking(move || load_searchable_docs(&docs_dir)).await??;
        Ok(docs)
    }

    /// Current index, rebuilt first if the corpus changed since the last build.
    async fn current_index(&self) -> Result<Arc<SearchIndex>, AppError> {
        let docs = self.load_corpus().await?;
        let fingerprint = corpus_fingerprint(&docs);

        if let Some(cached) = self.index.read().await.as_ref() {
            if cached.fingerprint == fingerprint {
                return Ok(Arc::clone(&cached.index));
            }
        }

        let index = Arc::new(SearchIndex::build(docs));
        info!(
            documents = index.len(),
            fingerprint = %&fingerprint[..12],
            "search index rebuilt"
        );
        *self.index.write().await = Some(CachedIndex {
            fingerprint,
            index: Arc::clone(&index),
        });
        Ok(index)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/search-docs", get(search_docs))
        .route("/api/search", get(search))
        .route("/healthz", get(|| async { "ok" }))
        .with_state(state)
}

async fn search_docs(State(state): State<AppState>) -> Result<Json<Vec<SearchableDocument>>, AppError> {
    let docs = state.load_corpus().await?;
    info!(documents = docs.len(), "serving search corpus");
    Ok(Json(docs))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchResult>>, AppError> {
    if params.q.trim().is_empty() {
        return Ok(Json(Vec::new()));
    }
    let index = state.current_index().await?;
    // Scoring is CPU-bound; keep it off the runtime workers.
    let results = tokio::task::spawn_blocking(move || index.search(&params.q)).await?;
    Ok(Json(results))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use crate::error::{ErrorBody, SEARCH_DATA_ERROR};

    fn write_docs(dir: &Path) {
        std::fs::write(
            dir.join("01-introduction.mdx"),
            "---\ndescription: Start here\n---\n# Introduction\n\nThe Gateway API is a family of resources that model service networking in Kubernetes.\n",
        )
        .expect("write");
        std::fs::write(
            dir.join("02-http-routing.mdx"),
            "# HTTP Routing\n\nAn HTTPRoute attaches to a Gateway listener and forwards matching requests to backends.\n",
        )
        .expect("write");
    }

    async fn get_response(app: &Router, uri: &str) -> axum::response::Response {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        app.clone().oneshot(req).await.unwrap()
    }

    async fn body_json<T: serde::de::DeserializeOwned>(resp: axum::response::Response) -> T {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn search_docs_returns_corpus() {
        let dir = tempfile::tempdir().unwrap();
        write_docs(dir.path());
        let app = router(AppState::new(dir.path().to_path_buf()));

        let resp = get_response(&app, "/api/search-docs").await;
        assert_eq!(resp.status(), StatusCode::OK);

        let docs: Vec<SearchableDocument> = body_json(resp).await;
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].slug, "01-introduction");
        assert_eq!(docs[0].title, "Introduction");
        assert!(docs[0].excerpt.starts_with("The Gateway API is a family"));
        assert!(!docs[0].content.contains("description: Start here"));
    }

    #[tokio::test]
    async fn search_ranks_title_match_first() {
        let dir = tempfile::tempdir().unwrap();
        write_docs(dir.path());
        let app = router(AppState::new(dir.path().to_path_buf()));

        let resp = get_response(&app, "/api/search?q=HTTP%20Routing").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let results: Vec<SearchResult> = body_json(resp).await;
        assert_eq!(results[0].slug, "02-http-routing");
    }

    #[tokio::test]
    async fn blank_query_returns_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        write_docs(dir.path());
        let app = router(AppState::new(dir.path().to_path_buf()));

        for uri in ["/api/search?q=", "/api/search"] {
            let resp = get_response(&app, uri).await;
            assert_eq!(resp.status(), StatusCode::OK);
            let results: Vec<SearchResult> = body_json(resp).await;
            assert!(results.is_empty());
        }
    }

    #[tokio::test]
    async fn oversized_query_is_answered() {
        let dir = tempfile::tempdir().unwrap();
        write_docs(dir.path());
        let app = router(AppState::new(dir.path().to_path_buf()));

        let uri = format!("/api/search?q=gateway{}", "x".repeat(20_000));
        let resp = get_response(&app, &uri).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let results: Vec<SearchResult> = body_json(resp).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn index_rebuilds_when_corpus_changes() {
        let dir = tempfile::tempdir().unwrap();
        write_docs(dir.path());
        let app = router(AppState::new(dir.path().to_path_buf()));

        let results: Vec<SearchResult> = body_json(get_response(&app, "/api/search?q=referencegrant").await).await;
        assert!(results.is_empty());

        std::fs::write(
            dir.path().join("03-reference-grant.mdx"),
            "# ReferenceGrant\n\nA ReferenceGrant allows routes to reference backends in other namespaces.\n",
        )
        .unwrap();

        let results: Vec<SearchResult> = body_json(get_response(&app, "/api/search?q=referencegrant").await).await;
        assert_eq!(results[0].slug, "03-reference-grant");
    }

    #[tokio::test]
    async fn load_failure_is_generic_500() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.mdx"), "---\ntitle: [unclosed\n---\n# Broken\n").unwrap();
        let app = router(AppState::new(dir.path().to_path_buf()));

        for uri in ["/api/search-docs", "/api/search?q=broken"] {
            let resp = get_response(&app, uri).await;
            assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
            let body: ErrorBody = body_json(resp).await;
            assert_eq!(body.error, SEARCH_DATA_ERROR);
        }
    }

    #[tokio::test]
    async fn missing_docs_dir_is_empty_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(AppState::new(dir.path().join("missing")));

        let docs: Vec<SearchableDocument> = body_json(get_response(&app, "/api/search-docs").await).await;
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn healthz() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(AppState::new(dir.path().to_path_buf()));
        let resp = get_response(&app, "/healthz").await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
