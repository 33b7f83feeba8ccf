use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::debug;

use super::RestClient;
use crate::error::Error;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;

pub fn default_http_client(timeout: Duration) -> Result<Client, Error> {
    Ok(Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()?)
}

/// [`RestClient`] talking to one node's REST gateway over HTTP
#[derive(Clone)]
pub struct HttpRestClient {
    http: Client,
    base: Url,
}

impl std::fmt::Debug for HttpRestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRestClient")
            .field("base", &self.base.as_str())
            .finish()
    }
}

impl HttpRestClient {
    pub fn new(http: Client, base: &str) -> Result<Self, Error> {
        let base = Url::parse(base.trim_end_matches('/'))
            .map_err(|e| Error::config(format!("invalid endpoint address '{base}': {e}")))?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "unsupported endpoint scheme '{}'",
                base.scheme()
            )));
        }

        Ok(Self { http, base })
    }

    pub fn from_address(base: &str, timeout: Duration) -> Result<Self, Error> {
        Self::new(default_http_client(timeout)?, base)
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Append `path` to the base, keeping any path prefix the endpoint has
    /// (gateways are often mounted under `/rest` or similar)
    fn url_for(&self, path: &str) -> Result<Url, Error> {
        let joined = format!(
            "{}/{}",
            self.base.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );

        Url::parse(&joined).map_err(|e| Error::config(format!("invalid request path '{path}': {e}")))
    }
}

#[async_trait]
impl RestClient for HttpRestClient {
    async fn request(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, Error> {
        let url = self.url_for(path)?;

        debug!(url = %url, ?params, "rest request");

        let res = self.http.get(url).query(params).send().await?;

        let status = res.status();

        if status.as_u16() == 404 {
            return Err(Error::NotFound(path.to_string()));
        }

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = res.bytes().await?;

        Ok(serde_json::from_slice(&bytes)?)
    }
}
