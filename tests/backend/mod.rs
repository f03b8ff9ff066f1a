use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use leptos_redeem_codes::{CodeFields, CodeId, CodePatch, Document};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::{net::TcpListener, task::JoinHandle};
use tower::ServiceBuilder;
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing::{Level, Span};

pub struct AbortOnDrop<T>(pub JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Document API backed by memory. Inspect and manipulate it directly from tests.
#[derive(Debug, Clone, Default)]
pub struct Backend {
    collections: Arc<Mutex<HashMap<String, Vec<Document>>>>,
    authorization_headers: Arc<Mutex<Vec<Option<String>>>>,
    next_id: Arc<AtomicUsize>,
    fail_batch_delete: Arc<AtomicBool>,
}

impl Backend {
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn remove(&self, collection: &str, id: &str) {
        if let Some(documents) = self.collections.lock().unwrap().get_mut(collection) {
            documents.retain(|doc| doc.id != id);
        }
    }

    /// `Authorization` header of every request received so far.
    pub fn authorization_headers(&self) -> Vec<Option<String>> {
        self.authorization_headers.lock().unwrap().clone()
    }

    pub fn fail_batch_delete(&self, fail: bool) {
        self.fail_batch_delete.store(fail, Ordering::SeqCst);
    }

    fn record(&self, headers: &HeaderMap) {
        let authorization = headers
            .get(http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned);
        self.authorization_headers
            .lock()
            .unwrap()
            .push(authorization);
    }
}

pub async fn start_axum_backend(backend: Backend) -> (SocketAddr, AbortOnDrop<()>) {
    let router = Router::new()
        .route(
            "/api/collections/{collection}/documents",
            get(list_documents).post(create_document),
        )
        .route(
            "/api/collections/{collection}/documents/{id}",
            patch(update_document).delete(delete_document),
        )
        .route(
            "/api/collections/{collection}/documents:batchDelete",
            post(batch_delete),
        )
        .with_state(backend);

    let router = router.layer(
        ServiceBuilder::new()
            // Mark the specific headers as sensitive so that they don't show up in logs.
            .layer(SetSensitiveRequestHeadersLayer::new([
                http::header::AUTHORIZATION,
            ]))
            // Add high level tracing to all requests.
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(
                        DefaultMakeSpan::new()
                            .level(Level::INFO)
                            .include_headers(false),
                    )
                    .on_response(|response: &Response, latency: Duration, _span: &Span| {
                        tracing::info!(
                            status = response.status().as_u16(),
                            latency = format_args!("{} ms", latency.as_millis()),
                            "response"
                        );
                    }),
            ),
    );

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("TcpListener");
    let addr = listener.local_addr().expect("local addr");

    let server_jh = tokio::spawn(async move {
        tracing::info!(%addr, "Serving test backend...");
        axum::serve(listener, router.into_make_service())
            .await
            .expect("Server to start successfully");
        tracing::info!("Test backend stopped!");
    });

    (addr, AbortOnDrop(server_jh))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListParams {
    order_by: String,
    direction: String,
}

async fn list_documents(
    State(backend): State<Backend>,
    Path(collection): Path<String>,
    Query(params): Query<ListParams>,
    headers: HeaderMap,
) -> Response {
    backend.record(&headers);
    if params.order_by != "createdAt" {
        return (StatusCode::BAD_REQUEST, "unsupported order field").into_response();
    }
    let mut documents = backend.documents(&collection);
    documents.sort_by_key(|doc| doc.fields.created_at);
    if params.direction == "desc" {
        documents.reverse();
    }
    Json(json!({ "documents": documents })).into_response()
}

async fn create_document(
    State(backend): State<Backend>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    Json(fields): Json<CodeFields>,
) -> Response {
    backend.record(&headers);
    let id = format!("code-{}", backend.next_id.fetch_add(1, Ordering::SeqCst));
    backend
        .collections
        .lock()
        .unwrap()
        .entry(collection)
        .or_default()
        .push(Document {
            id: id.clone(),
            fields,
        });
    (StatusCode::CREATED, Json(json!({ "id": id }))).into_response()
}

async fn update_document(
    State(backend): State<Backend>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(patch): Json<CodePatch>,
) -> Response {
    backend.record(&headers);
    let mut collections = backend.collections.lock().unwrap();
    let Some(doc) = collections
        .get_mut(&collection)
        .and_then(|documents| documents.iter_mut().find(|doc| doc.id == id))
    else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if let Some(is_used) = patch.is_used {
        doc.fields.is_used = is_used;
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn delete_document(
    State(backend): State<Backend>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    backend.record(&headers);
    let mut collections = backend.collections.lock().unwrap();
    let Some(documents) = collections.get_mut(&collection) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let before = documents.len();
    documents.retain(|doc| doc.id != id);
    match documents.len() == before {
        true => StatusCode::NOT_FOUND.into_response(),
        false => StatusCode::NO_CONTENT.into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct BatchDelete {
    ids: Vec<CodeId>,
}

async fn batch_delete(
    State(backend): State<Backend>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    Json(batch): Json<BatchDelete>,
) -> Response {
    backend.record(&headers);
    if backend.fail_batch_delete.load(Ordering::SeqCst) {
        return (StatusCode::FORBIDDEN, "batch delete not permitted").into_response();
    }
    if let Some(documents) = backend.collections.lock().unwrap().get_mut(&collection) {
        documents.retain(|doc| !batch.ids.contains(&doc.id));
    }
    StatusCode::NO_CONTENT.into_response()
}
