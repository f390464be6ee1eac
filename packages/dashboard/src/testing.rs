//! In-memory [`ApiTransport`] used by the unit tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::FetchError;
use crate::transport::ApiTransport;

#[derive(Debug, Clone)]
enum StubResponse {
    Json(serde_json::Value),
    Status(u16),
}

#[derive(Debug, Default)]
struct StubState {
    responses: BTreeMap<String, StubResponse>,
    requests: Vec<String>,
}

/// Serves canned responses keyed by path. Unknown paths answer 404.
/// Clones share state, so a test can keep a handle to inspect requests.
#[derive(Debug, Clone, Default)]
pub struct StubTransport {
    state: Arc<Mutex<StubState>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(self, path: &str, body: serde_json::Value) -> Self {
        self.set(path, StubResponse::Json(body));
        self
    }

    pub fn with_status(self, path: &str, status: u16) -> Self {
        self.set(path, StubResponse::Status(status));
        self
    }

    pub fn set_json(&self, path: &str, body: serde_json::Value) {
        self.set(path, StubResponse::Json(body));
    }

    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }

    fn set(&self, path: &str, response: StubResponse) {
        self.state
            .lock()
            .unwrap()
            .responses
            .insert(path.to_string(), response);
    }

    fn respond(
        &self,
        method: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, FetchError> {
        let mut state = self.state.lock().unwrap();

        let mut line = format!("{method} {path}");
        if !query.is_empty() {
            let pairs: Vec<String> = query.iter().map(|(k, v)| format!("{k}={v}")).collect();
            line.push('?');
            line.push_str(&pairs.join("&"));
        }
        state.requests.push(line);

        match state.responses.get(path).cloned() {
            Some(StubResponse::Json(value)) => Ok(value),
            Some(StubResponse::Status(status)) => Err(FetchError::Status {
                url: path.to_string(),
                status,
            }),
            None => Err(FetchError::Status {
                url: path.to_string(),
                status: 404,
            }),
        }
    }
}

#[async_trait]
impl ApiTransport for StubTransport {
    async fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, FetchError> {
        self.respond("GET", path, query)
    }

    async fn post_json(&self, path: &str) -> Result<serde_json::Value, FetchError> {
        self.respond("POST", path, &[])
    }
}
