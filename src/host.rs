//! Host API client.
//!
//! The host reports its file tree as a flat manifest at `/emergence` and
//! serves raw file content at `/emergence/<path>`. Authentication is
//! resolved before any request is made; the client only ever sees a
//! concrete credential value.

use crate::error::SyncError;
use crate::manifest::Manifest;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{Stream, StreamExt};
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::pin::Pin;
use std::time::Duration;
use tracing::debug;

/// Raw content stream for a single manifest path
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, SyncError>> + Send>>;

/// Resolved authentication, in priority order: token, access key, login
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Developer session token, sent as an `Authorization: Token <t>` header
    Token(String),
    /// Inheritance key, sent as an `accessKey` query parameter
    AccessKey(String),
    /// Developer username and password, sent as `_LOGIN[...]` query parameters
    Login { username: String, password: String },
}

/// Remote manifest and content source
#[async_trait]
pub trait Host: Send + Sync {
    /// Fetch the flat path-to-hash manifest
    async fn fetch_manifest(&self) -> Result<Manifest, SyncError>;

    /// Fetch the raw content stream for one manifest path
    async fn fetch_file(&self, path: &str) -> Result<ByteStream, SyncError>;
}

#[derive(Deserialize)]
struct ManifestResponse {
    files: BTreeMap<String, BTreeMap<String, String>>,
}

const HOST_HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for an emergence host
pub struct HttpHost {
    client: Client,
    host: String,
    base_url: String,
    credentials: Credentials,
}

impl HttpHost {
    pub fn new(host: &str, credentials: Credentials) -> Result<Self, SyncError> {
        let client = Client::builder()
            .connect_timeout(HOST_HTTP_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| SyncError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            host: host.to_string(),
            base_url: base_url(host),
            credentials,
        })
    }

    fn get(&self, url: String) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        match &self.credentials {
            Credentials::Token(token) => request.header(
                reqwest::header::AUTHORIZATION,
                format!("Token {}", token),
            ),
            Credentials::AccessKey(key) => request.query(&[("accessKey", key.as_str())]),
            Credentials::Login { username, password } => request.query(&[
                ("_LOGIN[username]", username.as_str()),
                ("_LOGIN[password]", password.as_str()),
            ]),
        }
    }
}

#[async_trait]
impl Host for HttpHost {
    async fn fetch_manifest(&self) -> Result<Manifest, SyncError> {
        let url = format!("{}/emergence", self.base_url);
        debug!(url = %url, "Requesting manifest");

        let response = self
            .get(url)
            .send()
            .await
            .map_err(|e| SyncError::ManifestFetch {
                host: self.host.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::ManifestFetch {
                host: self.host.clone(),
                reason: format!("got status {}", status),
            });
        }

        let body: ManifestResponse =
            response.json().await.map_err(|e| SyncError::ManifestFetch {
                host: self.host.clone(),
                reason: format!("invalid manifest body: {}", e),
            })?;

        Manifest::from_files(body.files)
    }

    async fn fetch_file(&self, path: &str) -> Result<ByteStream, SyncError> {
        let url = format!("{}/emergence/{}", self.base_url, path);
        debug!(url = %url, "Requesting file content");

        let response = self
            .get(url)
            .send()
            .await
            .map_err(|e| SyncError::BlobDownload {
                path: path.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::BlobDownload {
                path: path.to_string(),
                reason: format!("got status {}", status),
            });
        }

        let path = path.to_string();
        let stream = response
            .bytes_stream()
            .map(move |chunk| {
                chunk.map_err(|e| SyncError::BlobDownload {
                    path: path.clone(),
                    reason: e.to_string(),
                })
            })
            .boxed();

        Ok(stream)
    }
}

/// Normalize a host argument into a base URL.
///
/// A bare hostname gets the `http://` scheme the host protocol historically
/// used; an explicit scheme is honored as given.
fn base_url(host: &str) -> String {
    let base = if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    };
    base.trim_end_matches('/').to_string()
}
