// src/core/net.rs
// One blocking GET against the archive's tRPC search endpoint. No retries.

use reqwest::{
    blocking::{Client, Response},
    header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, ORIGIN, REFERER},
};

use crate::config::options::FetchOptions;
use crate::error::{ConfigError, FetchError};

/// Owns its HTTP client; built by the caller and handed to a fetcher.
pub struct ArchiveClient {
    client: Client,
    url: String,
}

impl ArchiveClient {
    pub fn new(opts: &FetchOptions) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(opts.timeout())
            .user_agent(opts.user_agent.clone())
            .default_headers(default_headers(&opts.base_url))
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        Ok(Self { client, url: opts.url() })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// GET `url?{query}` and return the body text.
    /// Transport errors, timeouts and non-2xx all come back as `FetchError`.
    pub fn get_text(&self, query: &[(&str, String)]) -> Result<String, FetchError> {
        logd!("GET {} ({} params)", self.url, query.len());
        let resp = self.client.get(&self.url).query(query).send()?;
        ensure_success(&resp)?;
        Ok(resp.text()?)
    }
}

fn ensure_success(resp: &Response) -> Result<(), FetchError> {
    if !resp.status().is_success() {
        return Err(FetchError::Status {
            status: resp.status().as_u16(),
            url: resp.url().to_string(),
        });
    }
    Ok(())
}

/// Headers the archive's front end sends; the endpoint answers JSONL only with these.
fn default_headers(base_url: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(ACCEPT, HeaderValue::from_static("*/*"));
    h.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    h.insert(
        HeaderName::from_static("trpc-accept"),
        HeaderValue::from_static("application/jsonl"),
    );
    h.insert(
        HeaderName::from_static("x-trpc-source"),
        HeaderValue::from_static("nextjs-react"),
    );

    let base = base_url.trim_end_matches('/');
    if let Ok(v) = HeaderValue::from_str(base) {
        h.insert(ORIGIN, v);
    }
    if let Ok(v) = HeaderValue::from_str(&format!("{base}/cards")) {
        h.insert(REFERER, v);
    }
    h
}
