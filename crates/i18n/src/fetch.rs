use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use core_types::{ContentFetcher, FetchError};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct HttpContentFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpContentFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl ContentFetcher for HttpContentFetcher {
    async fn fetch_json(&self, path: &str) -> Result<Value, FetchError> {
        let url = self.url_for(path);
        debug!(%url, "fetching content document");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| FetchError::Transport {
                path: path.to_string(),
                message: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let text = response.text().await.map_err(|err| FetchError::Transport {
            path: path.to_string(),
            message: err.to_string(),
        })?;
        decode(path, &text)
    }
}

#[derive(Debug, Clone)]
pub struct DirContentFetcher {
    root: PathBuf,
}

impl DirContentFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ContentFetcher for DirContentFetcher {
    async fn fetch_json(&self, path: &str) -> Result<Value, FetchError> {
        let file = self.root.join(path.trim_start_matches('/'));
        match tokio::fs::read_to_string(&file).await {
            Ok(text) => decode(path, &text),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(FetchError::not_found(path)),
            Err(err) => Err(FetchError::Transport {
                path: path.to_string(),
                message: err.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticContentFetcher {
    documents: HashMap<String, Value>,
}

impl StaticContentFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<String>, document: Value) -> Self {
        self.insert(path, document);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, document: Value) {
        self.documents.insert(path.into(), document);
    }

    pub fn remove(&mut self, path: &str) -> Option<Value> {
        self.documents.remove(path)
    }
}

#[async_trait]
impl ContentFetcher for StaticContentFetcher {
    async fn fetch_json(&self, path: &str) -> Result<Value, FetchError> {
        self.documents
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::not_found(path))
    }
}

fn decode(path: &str, text: &str) -> Result<Value, FetchError> {
    serde_json::from_str(text).map_err(|err| FetchError::Decode {
        path: path.to_string(),
        message: err.to_string(),
    })
}
