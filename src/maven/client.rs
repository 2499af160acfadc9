use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use super::models::{VersionDetails, VersionListing};
use crate::catalog::Endpoints;

const USER_AGENT: &str = concat!("opencollab-downloads/", env!("CARGO_PKG_VERSION"));

/// Any failed upstream call. Callers treat every variant the same way; the
/// variants only keep the diagnostics apart.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} responded with {status}")]
    Status { url: String, status: StatusCode },
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    #[allow(unused)]
    pub fn url(&self) -> &str {
        match self {
            FetchError::Request { url, .. } | FetchError::Status { url, .. } | FetchError::Decode { url, .. } => url,
        }
    }
}

/// The three upstream endpoints, keyed by the `group/path/artifact` prefix.
#[async_trait]
pub trait MavenApi: Send + Sync {
    async fn versions(&self, path: &str) -> Result<VersionListing, FetchError>;

    async fn details(&self, path: &str, version: &str) -> Result<VersionDetails, FetchError>;

    fn download_url(&self, path: &str, version: &str, file_name: &str) -> String;
}

/// `MavenApi` over HTTP, talking to a Reposilite-style JSON API.
#[derive(Debug, Clone)]
pub struct HttpMavenApi {
    client: Client,
    endpoints: Endpoints,
}

impl HttpMavenApi {
    pub fn new(endpoints: Endpoints) -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self::with_client(client, endpoints))
    }

    pub fn with_client(client: Client, endpoints: Endpoints) -> Self {
        Self { client, endpoints }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: String) -> Result<T, FetchError> {
        let result = self.try_fetch_json(&url).await;
        if let Err(err) = &result {
            tracing::error!(%url, error = %err, "Error fetching data");
        }
        result
    }

    async fn try_fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        tracing::debug!(%url, "GET");

        let res = self.client.get(url).send().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        res.json::<T>().await.map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl MavenApi for HttpMavenApi {
    async fn versions(&self, path: &str) -> Result<VersionListing, FetchError> {
        self.fetch_json(format!("{}/{path}", self.endpoints.versions())).await
    }

    async fn details(&self, path: &str, version: &str) -> Result<VersionDetails, FetchError> {
        self.fetch_json(format!("{}/{path}/{version}", self.endpoints.details())).await
    }

    fn download_url(&self, path: &str, version: &str, file_name: &str) -> String {
        format!("{}/{path}/{version}/{file_name}", self.endpoints.downloads())
    }
}
