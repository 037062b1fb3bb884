use serde::{Deserialize, Serialize};

use super::ExtractionError;

/// Text recovered from one PDF page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageText {
    pub page_number: usize,
    pub text: String,
}

/// Resolves a storage locator to the document's raw bytes.
pub trait DocumentFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, ExtractionError>;
}

/// OCR engine abstraction (allows mocking for tests)
pub trait OcrEngine {
    /// Recognise the text in an encoded image. `mime_type` describes the bytes.
    fn ocr_image(&self, image_bytes: &[u8], mime_type: &str) -> Result<String, ExtractionError>;
}

/// PDF text extraction abstraction
pub trait PdfExtractor {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<Vec<PageText>, ExtractionError>;
}
