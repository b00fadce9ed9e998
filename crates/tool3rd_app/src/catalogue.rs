use std::error::Error as _;
use std::fs;
use std::io;
use std::time::Duration;

use futures_util::StreamExt;
use thiserror::Error;
use tool3rd_core::CatalogueSeries;
use tool3rd_protocol::Settings;
use url::Url;

pub const DEFAULT_CATALOGUE_URL: &str = "https://cdn.jsdelivr.net/gh/proj3rd/3gpp-specs-in-json/";
const LISTING_FILE: &str = ".dir-list.json";
const MAX_RESOURCE_BYTES: u64 = 256 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("invalid catalogue url: {0}")]
    InvalidUrl(String),
    #[error("failed to read certificate {path}: {source}")]
    Certificate { path: String, source: io::Error },
    #[error("failed to configure http client: {0}")]
    Client(String),
    #[error("connection reset: {0}")]
    ConnectionReset(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected status {0}")]
    HttpStatus(u16),
    #[error("response exceeds {0} bytes")]
    TooLarge(u64),
    #[error("invalid catalogue listing: {0}")]
    Listing(#[from] serde_json::Error),
    #[error("resource is not utf-8 text")]
    NotText,
}

impl CatalogueError {
    /// Title and description shown to the user.
    pub fn notification(&self) -> (String, String) {
        match self {
            CatalogueError::ConnectionReset(_) => (
                "Connection reset".to_string(),
                "The connection was reset. If you are behind a proxy, configure it in the \
                 settings. Otherwise download the resource manually and load it from a file."
                    .to_string(),
            ),
            CatalogueError::Certificate { .. } => ("Certificate error".to_string(), self.to_string()),
            other => (
                "Download failed".to_string(),
                format!("{other}. You can download the resource manually and load it from a file."),
            ),
        }
    }
}

/// Remote catalogue of serialized specifications.
#[async_trait::async_trait]
pub trait CatalogueSource: Send + Sync {
    async fn listing(&self) -> Result<Vec<CatalogueSeries>, CatalogueError>;

    async fn resource(&self, series: &str, spec: &str, version: &str) -> Result<String, CatalogueError>;
}

#[derive(Debug, Clone)]
pub struct HttpCatalogue {
    base: Url,
    client: reqwest::Client,
}

impl HttpCatalogue {
    /// Builds a client honoring the proxy and certificate settings.
    pub fn new(base: &str, settings: &Settings) -> Result<Self, CatalogueError> {
        let base = normalize_base(base)?;

        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(120));
        if let Some(proxy_url) = settings.proxy.url() {
            let proxy = reqwest::Proxy::all(proxy_url.as_str())
                .map_err(|err| CatalogueError::Client(err.to_string()))?;
            builder = builder.proxy(proxy);
        }
        if let Some(path) = settings.certificate.active_path() {
            let pem = fs::read(path).map_err(|source| CatalogueError::Certificate {
                path: path.to_string(),
                source,
            })?;
            let certificate = reqwest::Certificate::from_pem(&pem)
                .map_err(|err| CatalogueError::Client(err.to_string()))?;
            builder = builder.add_root_certificate(certificate);
        }
        if !settings.verify_certificate {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder
            .build()
            .map_err(|err| CatalogueError::Client(err.to_string()))?;

        Ok(Self { base, client })
    }

    pub fn listing_url(&self) -> Result<Url, CatalogueError> {
        self.base
            .join(LISTING_FILE)
            .map_err(|err| CatalogueError::InvalidUrl(err.to_string()))
    }

    pub fn resource_url(&self, series: &str, spec: &str, version: &str) -> Result<Url, CatalogueError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| CatalogueError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend([series, spec, version]);
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<Vec<u8>, CatalogueError> {
        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogueError::HttpStatus(status.as_u16()));
        }
        if response
            .content_length()
            .is_some_and(|len| len > MAX_RESOURCE_BYTES)
        {
            return Err(CatalogueError::TooLarge(MAX_RESOURCE_BYTES));
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            if bytes.len() as u64 + chunk.len() as u64 > MAX_RESOURCE_BYTES {
                return Err(CatalogueError::TooLarge(MAX_RESOURCE_BYTES));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl CatalogueSource for HttpCatalogue {
    async fn listing(&self) -> Result<Vec<CatalogueSeries>, CatalogueError> {
        let bytes = self.get(self.listing_url()?).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn resource(&self, series: &str, spec: &str, version: &str) -> Result<String, CatalogueError> {
        let bytes = self.get(self.resource_url(series, spec, version)?).await?;
        String::from_utf8(bytes).map_err(|_| CatalogueError::NotText)
    }
}

fn normalize_base(base: &str) -> Result<Url, CatalogueError> {
    let with_slash = if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    };
    let url = Url::parse(&with_slash).map_err(|err| CatalogueError::InvalidUrl(err.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(CatalogueError::InvalidUrl(base.to_string()));
    }
    Ok(url)
}

fn map_reqwest_error(err: reqwest::Error) -> CatalogueError {
    if is_connection_reset(&err) {
        return CatalogueError::ConnectionReset(err.to_string());
    }
    if err.is_timeout() {
        return CatalogueError::Timeout(err.to_string());
    }
    CatalogueError::Network(err.to_string())
}

fn is_connection_reset(err: &reqwest::Error) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            if io_err.kind() == io::ErrorKind::ConnectionReset {
                return true;
            }
        }
        source = cause.source();
    }
    false
}
