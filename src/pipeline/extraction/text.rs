//! Bytes → text, with the failure policy each document class needs.
//!
//! Image OCR is best-effort: any failure becomes empty text so the
//! completeness gate downstream turns it into a re-upload request. PDF
//! statements must carry an embedded text layer of at least
//! [`MIN_PDF_TEXT_CHARS`] characters, otherwise they are `Unreadable`.

use super::format::sniff_format;
use super::types::{OcrEngine, PdfExtractor};
use super::ExtractionError;

/// Below this many characters a PDF is treated as scanned or empty.
pub const MIN_PDF_TEXT_CHARS: usize = 50;

/// OCR an identity or salary document. Never fails.
///
/// Documents uploaded as PDFs are read from their text layer instead; a PDF
/// that cannot be read yields empty text as well.
pub fn image_text(ocr: &dyn OcrEngine, pdf: &dyn PdfExtractor, bytes: &[u8]) -> String {
    let format = sniff_format(bytes);

    if format.is_pdf() {
        return match pdf_text(pdf, bytes) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "PDF text extraction failed, continuing with empty text");
                String::new()
            }
        };
    }

    match ocr.ocr_image(bytes, format.mime_type()) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "OCR failed, continuing with empty text");
            String::new()
        }
    }
}

/// Read the embedded text of a PDF, rejecting scanned or empty files.
pub fn pdf_text(pdf: &dyn PdfExtractor, bytes: &[u8]) -> Result<String, ExtractionError> {
    let text = pdf
        .extract_text(bytes)?
        .into_iter()
        .map(|p| p.text)
        .collect::<Vec<_>>()
        .join("\n");

    let chars = text.trim().chars().count();
    if chars < MIN_PDF_TEXT_CHARS {
        return Err(ExtractionError::Unreadable { chars });
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extraction::ocr::MockOcrEngine;
    use crate::pipeline::extraction::pdf::MockPdfExtractor;
    use crate::pipeline::extraction::types::PageText;

    const PNG_HEADER: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn image_bytes_go_through_ocr() {
        let text = image_text(
            &MockOcrEngine::new("Name: Preeti Negi"),
            &MockPdfExtractor::failing(),
            PNG_HEADER,
        );
        assert_eq!(text, "Name: Preeti Negi");
    }

    #[test]
    fn ocr_failure_degrades_to_empty_text() {
        let text = image_text(&MockOcrEngine::failing(), &MockPdfExtractor::failing(), PNG_HEADER);
        assert_eq!(text, "");
    }

    #[test]
    fn pdf_upload_of_identity_document_uses_text_layer() {
        let body = "Employee Name: Preeti Negi\nEmployer: Acme Finserv Pvt Ltd\nNet Pay: 85,000";
        let text = image_text(
            &MockOcrEngine::failing(),
            &MockPdfExtractor::with_text(body),
            b"%PDF-1.7\n",
        );
        assert_eq!(text, body);
    }

    #[test]
    fn unreadable_pdf_upload_degrades_to_empty_text() {
        let text = image_text(
            &MockOcrEngine::new("should not be used"),
            &MockPdfExtractor::with_text("   "),
            b"%PDF-1.7\n",
        );
        assert_eq!(text, "");
    }

    #[test]
    fn short_pdf_text_is_unreadable() {
        let err = pdf_text(&MockPdfExtractor::with_text("Statement\n  p1  "), b"%PDF").unwrap_err();
        assert!(matches!(err, ExtractionError::Unreadable { chars } if chars < MIN_PDF_TEXT_CHARS));
    }

    #[test]
    fn pages_are_joined() {
        let pages = vec![
            PageText {
                page_number: 1,
                text: "Account Holder Name: Preeti Negi".into(),
            },
            PageText {
                page_number: 2,
                text: "01/03/2024 NEFT SALARY ACME 85,000.00".into(),
            },
        ];
        let text = pdf_text(&MockPdfExtractor::with_pages(pages), b"%PDF").unwrap();
        assert!(text.contains("Preeti Negi\n01/03/2024"));
    }

    #[test]
    fn parse_failure_propagates() {
        assert!(matches!(
            pdf_text(&MockPdfExtractor::failing(), b"%PDF"),
            Err(ExtractionError::PdfParsing(_))
        ));
    }
}
