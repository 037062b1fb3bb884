use std::collections::HashMap;
use std::time::Duration;

use super::types::DocumentFetcher;
use super::ExtractionError;

/// Downloads documents from their public storage URL.
pub struct HttpDocumentFetcher {
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HttpDocumentFetcher {
    pub fn new(timeout_secs: u64) -> Result<Self, ExtractionError> {
        let client = build_http_client(timeout_secs)?;
        Ok(Self {
            client,
            timeout_secs,
        })
    }
}

impl DocumentFetcher for HttpDocumentFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, ExtractionError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| map_send_error(e, url, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractionError::DownloadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .map_err(|e| map_send_error(e, url, self.timeout_secs))?;

        tracing::debug!(url = %url, size = bytes.len(), "Document downloaded");
        Ok(bytes.to_vec())
    }
}

pub(crate) fn build_http_client(
    timeout_secs: u64,
) -> Result<reqwest::blocking::Client, ExtractionError> {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ExtractionError::HttpClient(e.to_string()))
}

pub(crate) fn map_send_error(e: reqwest::Error, target: &str, timeout_secs: u64) -> ExtractionError {
    if e.is_connect() {
        ExtractionError::Connection(target.to_string())
    } else if e.is_timeout() {
        ExtractionError::Timeout(timeout_secs)
    } else {
        ExtractionError::HttpClient(e.to_string())
    }
}

/// In-memory fetcher for tests: serves registered bytes, fails for anything else.
#[derive(Default)]
pub struct MockDocumentFetcher {
    documents: HashMap<String, Vec<u8>>,
}

impl MockDocumentFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, url: &str, bytes: &[u8]) -> Self {
        self.documents.insert(url.to_string(), bytes.to_vec());
        self
    }
}

impl DocumentFetcher for MockDocumentFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, ExtractionError> {
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| ExtractionError::NotAvailable(url.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_serves_registered_bytes() {
        let fetcher = MockDocumentFetcher::new().with_document("https://files.test/a.png", b"abc");
        assert_eq!(fetcher.fetch("https://files.test/a.png").unwrap(), b"abc");
    }

    #[test]
    fn mock_fails_for_unknown_url() {
        let fetcher = MockDocumentFetcher::new();
        let err = fetcher.fetch("https://files.test/missing.png").unwrap_err();
        assert!(matches!(err, ExtractionError::NotAvailable(_)));
    }

    #[test]
    fn unreachable_host_is_an_error() {
        let fetcher = HttpDocumentFetcher::new(2).unwrap();
        // Port 9 (discard) on localhost is closed in test environments.
        assert!(fetcher.fetch("http://127.0.0.1:9/pan.png").is_err());
    }
}
