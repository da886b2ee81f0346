//! HTTP document fetch, available behind the `fetch` feature.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::{Error, Result};
use crate::AnalysisConfig;

/// Fetch a document over HTTP and return its body text.
pub fn fetch_document(target: &str, config: &AnalysisConfig) -> Result<String> {
    let parsed = url::Url::parse(target)
        .map_err(|e| Error::LoadError(format!("invalid URL {}: {}", target, e)))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(Error::LoadError(format!(
            "unsupported scheme: {}",
            parsed.scheme()
        )));
    }

    let client = Client::builder()
        .timeout(Duration::from_millis(config.timeout_ms))
        .build()
        .map_err(|e| Error::LoadError(format!("Failed to build HTTP client: {}", e)))?;

    let resp = client
        .get(parsed.as_str())
        .header("User-Agent", config.user_agent.clone())
        .send()
        .map_err(|e| Error::LoadError(format!("Failed to fetch {}: {}", target, e)))?;

    resp.text()
        .map_err(|e| Error::LoadError(format!("Failed to read response body: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_http_schemes() {
        let err = fetch_document("ftp://example.com/x.html", &AnalysisConfig::default());
        assert!(matches!(err, Err(Error::LoadError(_))));
    }
}
