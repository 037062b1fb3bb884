pub mod types;
pub mod format;
pub mod fetch;
pub mod ocr;
pub mod pdf;
pub mod text;

pub use types::*;
pub use format::*;
pub use fetch::*;
pub use ocr::*;
pub use pdf::*;
pub use text::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Could not reach {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Download of {url} failed with status {status}")]
    DownloadStatus { url: String, status: u16 },

    #[error("OCR service returned status {status}: {body}")]
    OcrStatus { status: u16, body: String },

    #[error("OCR processing failed: {0}")]
    OcrProcessing(String),

    #[error("OCR response could not be parsed: {0}")]
    ResponseParsing(String),

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("Document is unreadable: {chars} characters of text extracted")]
    Unreadable { chars: usize },

    #[error("Document not available at {0}")]
    NotAvailable(String),
}
