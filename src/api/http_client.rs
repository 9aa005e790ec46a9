use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use std::time::Duration;

use crate::config::Config;
use crate::error::AdvisorError;

/// Outbound HTTP client shared by the Gemini and weather integrations.
pub fn build_http_client(cfg: &Config) -> Result<reqwest::Client, AdvisorError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let mut builder = reqwest::Client::builder()
        .user_agent(concat!("farm-advisor/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(5))
        .timeout(Duration::from_secs(cfg.gemini.timeout_secs))
        .default_headers(headers);
    if let Some(proxy_url) = cfg.basic.proxy.as_ref() {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
    }
    Ok(builder.build()?)
}
