use async_trait::async_trait;
use serde_json::Value;

use super::{SnapshotSource, SourceError};

/// Fetches snapshot documents over HTTP with a GET to `base_url + path`.
#[derive(Clone, Debug)]
pub struct HttpSnapshotSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSnapshotSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    async fn fetch(&self, path: &str) -> Result<Value, SourceError> {
        let transport = |err: reqwest::Error| SourceError::Transport {
            path: path.to_string(),
            message: err.to_string(),
        };

        let response = self.client.get(self.url(path)).send().await.map_err(transport)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(SourceError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        serde_json::from_slice(&body).map_err(|err| SourceError::Parse {
            path: path.to_string(),
            message: err.to_string(),
        })
    }
}
