use super::types::{PageText, PdfExtractor};
use super::ExtractionError;

/// PDF text extractor using the pdf-extract crate.
/// Handles digital PDFs with embedded text layers; scanned PDFs come back
/// (nearly) empty.
pub struct PdfTextExtractor;

impl PdfExtractor for PdfTextExtractor {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<Vec<PageText>, ExtractionError> {
        let page_texts = pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
            .map_err(|e| ExtractionError::PdfParsing(e.to_string()))?;

        let pages = page_texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| PageText {
                page_number: i + 1,
                text,
            })
            .collect();

        Ok(pages)
    }
}

/// Mock PDF extractor returning fixed pages.
pub struct MockPdfExtractor {
    pages: Option<Vec<PageText>>,
}

impl MockPdfExtractor {
    pub fn with_text(text: &str) -> Self {
        Self {
            pages: Some(vec![PageText {
                page_number: 1,
                text: text.to_string(),
            }]),
        }
    }

    pub fn with_pages(pages: Vec<PageText>) -> Self {
        Self { pages: Some(pages) }
    }

    /// An extractor that cannot parse anything.
    pub fn failing() -> Self {
        Self { pages: None }
    }
}

impl PdfExtractor for MockPdfExtractor {
    fn extract_text(&self, _pdf_bytes: &[u8]) -> Result<Vec<PageText>, ExtractionError> {
        self.pages
            .clone()
            .ok_or_else(|| ExtractionError::PdfParsing("mock PDF failure".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Generate a valid PDF with text using lopdf (the library that pdf-extract uses internally).
    fn make_test_pdf(text: &str) -> Vec<u8> {
        use lopdf::dictionary;
        use lopdf::{Document, Object, Stream};

        let mut doc = Document::with_version("1.4");

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let content = format!("BT /F1 12 Tf 72 700 Td ({text}) Tj ET");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

        let resources = dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        };

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => resources,
        });

        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        });

        if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(page_id) {
            dict.set("Parent", pages_id);
        }

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn extract_text_from_digital_pdf() {
        let pdf_bytes = make_test_pdf("Account Holder Name: Preeti Negi");
        let pages = PdfTextExtractor.extract_text(&pdf_bytes).unwrap();

        assert!(!pages.is_empty());
        let full_text: String = pages.iter().map(|p| p.text.clone()).collect();
        assert!(
            full_text.contains("Preeti") || full_text.contains("Account"),
            "Expected statement text, got: {full_text}"
        );
    }

    #[test]
    fn invalid_pdf_returns_error() {
        assert!(PdfTextExtractor.extract_text(b"not a pdf").is_err());
    }

    #[test]
    fn mock_extractor_serves_pages() {
        let pages = MockPdfExtractor::with_text("hello").extract_text(b"").unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].page_number, 1);
        assert!(MockPdfExtractor::failing().extract_text(b"").is_err());
    }
}
