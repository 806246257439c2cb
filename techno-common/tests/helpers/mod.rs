//! Stub directory / authority servers for integration tests
//!
//! Each stub answers fixed replies keyed by exact request path and records
//! every request it sees as `"METHOD /path"`.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

use techno_common::{ResolveTarget, ServiceAccess, SessionContract, TechnoConfig};

/// Directory location used by every test: `/directory/v1/`
pub const DIRECTORY_PREFIX: &str = "/directory";
pub const DIRECTORY_VERSION: &str = "/v1/";

/// Authority paths are built under `/session/v1/api/`
pub const AUTHORITY_BASE: &str = "/session/v1/api/";

/// Canned reply for one path
#[derive(Clone)]
pub enum Reply {
    Json(Value),
    Raw(StatusCode, &'static str),
}

struct StubState {
    replies: HashMap<String, Reply>,
    hits: Mutex<Vec<String>>,
}

/// Running stub server, shut down on drop
pub struct Stub {
    pub url: String,
    state: Arc<StubState>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Stub {
    pub async fn start(replies: Vec<(String, Reply)>) -> Stub {
        let state = Arc::new(StubState {
            replies: replies.into_iter().collect(),
            hits: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .fallback(dispatch)
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Stub {
            url: format!("http://{}", addr),
            state,
            shutdown: Some(shutdown_tx),
        }
    }

    /// Every request seen so far, in order
    pub fn hits(&self) -> Vec<String> {
        self.state.hits.lock().expect("hits lock").clone()
    }

    /// Number of requests whose path equals `path`
    pub fn count(&self, path: &str) -> usize {
        self.hits()
            .iter()
            .filter(|hit| hit.split_once(' ').map(|(_, p)| p) == Some(path))
            .count()
    }
}

impl Drop for Stub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn dispatch(State(state): State<Arc<StubState>>, method: Method, uri: Uri) -> Response {
    let path = uri.path().to_string();
    state
        .hits
        .lock()
        .expect("hits lock")
        .push(format!("{} {}", method, path));

    match state.replies.get(&path) {
        Some(Reply::Json(value)) => Json(value.clone()).into_response(),
        Some(Reply::Raw(status, body)) => (*status, *body).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Base URL nothing listens on
pub async fn closed_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{}", addr)
}

/// Directory location served by a stub at `url`
pub fn directory_at(url: &str) -> ResolveTarget {
    ResolveTarget {
        host: url.to_string(),
        prefix: DIRECTORY_PREFIX.to_string(),
        version: DIRECTORY_VERSION.to_string(),
        api_path: String::new(),
    }
}

/// Directory path for a lookup of `service`
pub fn lookup_path(service: &str, region: Option<&str>) -> String {
    let mut path = format!(
        "{}{}hostPrefixVersion/{}",
        DIRECTORY_PREFIX, DIRECTORY_VERSION, service
    );
    if let Some(region) = region {
        path.push('/');
        path.push_str(region);
    }
    path
}

/// Authority location as the directory reports it
pub fn authority_target(url: &str) -> ResolveTarget {
    ResolveTarget {
        host: url.to_string(),
        prefix: "/session".to_string(),
        version: "/v1/".to_string(),
        api_path: "api/".to_string(),
    }
}

/// Directory reply pointing at the authority stub
pub fn authority_reply(url: &str) -> Reply {
    Reply::Json(json!({
        "host": url,
        "prefix": "/session",
        "version": "/v1/",
        "api": "api/",
    }))
}

/// Path of an authority endpoint under [`AUTHORITY_BASE`]
pub fn authority_path(suffix: &str) -> String {
    format!("{}{}", AUTHORITY_BASE, suffix)
}

/// Configuration pointing at a directory stub
pub fn config_for(directory_url: &str, contract: SessionContract) -> TechnoConfig {
    let mut config = TechnoConfig::default();
    config.directory = directory_at(directory_url);
    config.session_contract = contract;
    config.secret = techno_common::SharedSecret::new("svc-secret");
    config
}

pub fn access_for(directory_url: &str, contract: SessionContract) -> ServiceAccess {
    ServiceAccess::from_config(&config_for(directory_url, contract)).expect("service access")
}
