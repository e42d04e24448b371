//! Network data sources.
//!
//! A source is the handle through which the planner reads the stop
//! repository. Sources are created explicitly at startup and owned by the
//! snapshot store; nothing connects lazily on first use.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use tracing::debug;

use super::error::SourceError;
use super::records::{EdgeRecord, NetworkData, RouteRecord, StopRecord, parse_records};

/// Something that can produce a full copy of the stop network.
pub trait NetworkSource: Send + Sync {
    /// Fetch every stop, edge and route.
    fn fetch(&self) -> impl Future<Output = Result<NetworkData, SourceError>> + Send;

    /// Short description for logs.
    fn describe(&self) -> String;
}

/// Configuration for the HTTP repository client.
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// Base URL; `/stops`, `/edges` and `/routes` are appended.
    pub base_url: String,
    /// Optional key sent in the `x-apikey` header
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl HttpSourceConfig {
    /// Create a new config for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
}

/// Client for a JSON stop repository served over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    http: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    /// Create a new HTTP source.
    pub fn new(config: HttpSourceConfig) -> Result<Self, SourceError> {
        let mut headers = HeaderMap::new();

        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|_| SourceError::Config("invalid API key format".to_string()))?;
            headers.insert(HeaderName::from_static("x-apikey"), value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// GET `{base_url}/{collection}`. A 404 yields `None` so optional
    /// collections can be absent.
    async fn get_collection(&self, collection: &str) -> Result<Option<String>, SourceError> {
        let url = format!("{}/{}", self.base_url, collection);
        debug!(%url, "fetching collection");

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(SourceError::Unauthorized);
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(Some(response.text().await?))
    }

    async fn get_required<T: for<'de> Deserialize<'de>>(
        &self,
        collection: &str,
    ) -> Result<Vec<T>, SourceError> {
        match self.get_collection(collection).await? {
            Some(body) => parse_records(collection, &body),
            None => Err(SourceError::Api {
                status: 404,
                message: format!("{collection} not found"),
            }),
        }
    }

    async fn get_optional<T: for<'de> Deserialize<'de>>(
        &self,
        collection: &str,
    ) -> Result<Vec<T>, SourceError> {
        match self.get_collection(collection).await? {
            Some(body) => parse_records(collection, &body),
            None => Ok(Vec::new()),
        }
    }
}

impl NetworkSource for HttpSource {
    async fn fetch(&self) -> Result<NetworkData, SourceError> {
        let (stops, edges, routes) = futures::try_join!(
            self.get_required::<StopRecord>("stops"),
            self.get_required::<EdgeRecord>("edges"),
            self.get_optional::<RouteRecord>("routes"),
        )?;

        NetworkData::from_records(stops, edges, routes)
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

/// Loads the network from `stops.json`, `edges.json` and an optional
/// `routes.json` in a directory.
///
/// Useful for development and tests without a running repository.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    dir: PathBuf,
}

impl JsonFileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn read(&self, file: &str) -> Result<Option<String>, SourceError> {
        let path = self.dir.join(file);
        match tokio::fs::read_to_string(&path).await {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SourceError::Io { path, source }),
        }
    }

    async fn read_required(&self, file: &str) -> Result<String, SourceError> {
        self.read(file).await?.ok_or_else(|| SourceError::Io {
            path: self.dir.join(file),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })
    }
}

impl NetworkSource for JsonFileSource {
    async fn fetch(&self) -> Result<NetworkData, SourceError> {
        let body = self.read_required("stops.json").await?;
        let stops = parse_records::<StopRecord>("stops.json", &body)?;
        let body = self.read_required("edges.json").await?;
        let edges = parse_records::<EdgeRecord>("edges.json", &body)?;
        let routes = match self.read("routes.json").await? {
            Some(body) => parse_records::<RouteRecord>("routes.json", &body)?,
            None => Vec::new(),
        };

        NetworkData::from_records(stops, edges, routes)
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}

/// The sources the server can be configured with.
#[derive(Debug, Clone)]
pub enum Source {
    Http(HttpSource),
    Files(JsonFileSource),
}

impl NetworkSource for Source {
    async fn fetch(&self) -> Result<NetworkData, SourceError> {
        match self {
            Source::Http(source) => source.fetch().await,
            Source::Files(source) => source.fetch().await,
        }
    }

    fn describe(&self) -> String {
        match self {
            Source::Http(source) => format!("http {}", source.describe()),
            Source::Files(source) => format!("files {}", source.describe()),
        }
    }
}
