//! OCR over HTTP via the OCR.space `parse/image` API.
//!
//! The image travels as a base64 data URI in a form-encoded body; the API key
//! goes in the `apikey` header. Only the first parsed page is used.

use base64::Engine as _;
use serde::Deserialize;

use super::fetch::{build_http_client, map_send_error};
use super::types::OcrEngine;
use super::ExtractionError;

pub const DEFAULT_OCR_ENDPOINT: &str = "https://api.ocr.space/parse/image";

/// Production OCR engine backed by OCR.space.
pub struct OcrSpaceClient {
    endpoint: String,
    api_key: String,
    language: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OcrSpaceClient {
    pub fn new(
        endpoint: &str,
        api_key: &str,
        language: &str,
        timeout_secs: u64,
    ) -> Result<Self, ExtractionError> {
        Ok(Self {
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            language: language.to_string(),
            client: build_http_client(timeout_secs)?,
            timeout_secs,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OcrSpaceResponse {
    #[serde(default)]
    parsed_results: Option<Vec<OcrSpaceParsedResult>>,
    #[serde(default)]
    is_errored_on_processing: bool,
    /// A string or a list of strings depending on the failure.
    #[serde(default)]
    error_message: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OcrSpaceParsedResult {
    #[serde(default)]
    parsed_text: Option<String>,
}

impl OcrEngine for OcrSpaceClient {
    fn ocr_image(&self, image_bytes: &[u8], mime_type: &str) -> Result<String, ExtractionError> {
        let _span = tracing::info_span!("ocr_space", image_size = image_bytes.len()).entered();
        let start = std::time::Instant::now();

        let encoded = base64::engine::general_purpose::STANDARD.encode(image_bytes);
        let data_uri = format!("data:{mime_type};base64,{encoded}");
        let form = [
            ("base64Image", data_uri.as_str()),
            ("language", self.language.as_str()),
        ];

        let response = self
            .client
            .post(&self.endpoint)
            .header("apikey", &self.api_key)
            .form(&form)
            .send()
            .map_err(|e| map_send_error(e, &self.endpoint, self.timeout_secs))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| map_send_error(e, &self.endpoint, self.timeout_secs))?;
        if !status.is_success() {
            return Err(ExtractionError::OcrStatus {
                status: status.as_u16(),
                body,
            });
        }

        let text = parse_ocr_response(&body)?;
        tracing::info!(
            elapsed_ms = %start.elapsed().as_millis(),
            text_len = text.len(),
            "OCR extraction complete"
        );
        Ok(text)
    }
}

/// Pull the first page's text out of an OCR.space JSON body.
///
/// A well-formed response without parsed results yields an empty string.
fn parse_ocr_response(body: &str) -> Result<String, ExtractionError> {
    let parsed: OcrSpaceResponse = serde_json::from_str(body)
        .map_err(|e| ExtractionError::ResponseParsing(e.to_string()))?;

    if parsed.is_errored_on_processing {
        let message = match parsed.error_message {
            Some(serde_json::Value::String(s)) => s,
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join("; "),
            _ => "unknown OCR error".to_string(),
        };
        return Err(ExtractionError::OcrProcessing(message));
    }

    Ok(parsed
        .parsed_results
        .and_then(|results| results.into_iter().next())
        .and_then(|first| first.parsed_text)
        .unwrap_or_default())
}

/// Mock OCR engine for unit testing without the remote service.
pub struct MockOcrEngine {
    text: Option<String>,
}

impl MockOcrEngine {
    pub fn new(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
        }
    }

    /// An engine whose every call fails.
    pub fn failing() -> Self {
        Self { text: None }
    }
}

impl OcrEngine for MockOcrEngine {
    fn ocr_image(&self, _image_bytes: &[u8], _mime_type: &str) -> Result<String, ExtractionError> {
        self.text
            .clone()
            .ok_or_else(|| ExtractionError::OcrProcessing("mock OCR failure".into()))
    }
}
