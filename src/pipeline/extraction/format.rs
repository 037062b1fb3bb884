use serde::{Deserialize, Serialize};

/// File formats recognised from magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileFormat {
    Pdf,
    Jpeg,
    Png,
    Tiff,
    Webp,
    Unknown,
}

impl FileFormat {
    /// MIME type used when handing the bytes to OCR. Unknown bytes are sent
    /// as PNG and left to the provider to reject.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Jpeg => "image/jpeg",
            Self::Png | Self::Unknown => "image/png",
            Self::Tiff => "image/tiff",
            Self::Webp => "image/webp",
        }
    }

    pub fn is_pdf(&self) -> bool {
        matches!(self, Self::Pdf)
    }
}

/// Detect file format from magic bytes (NOT file extensions).
pub fn sniff_format(bytes: &[u8]) -> FileFormat {
    match bytes {
        // PDF: starts with %PDF
        [0x25, 0x50, 0x44, 0x46, ..] => FileFormat::Pdf,
        // JPEG: starts with FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => FileFormat::Jpeg,
        // PNG: starts with 89 50 4E 47
        [0x89, 0x50, 0x4E, 0x47, ..] => FileFormat::Png,
        // TIFF: little-endian (49 49 2A 00) or big-endian (4D 4D 00 2A)
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => FileFormat::Tiff,
        // WebP: RIFF....WEBP
        _ if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" => {
            FileFormat::Webp
        }
        _ => FileFormat::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_pdf() {
        assert_eq!(sniff_format(b"%PDF-1.4\n..."), FileFormat::Pdf);
    }

    #[test]
    fn detects_common_images() {
        assert_eq!(sniff_format(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00]), FileFormat::Jpeg);
        assert_eq!(
            sniff_format(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            FileFormat::Png
        );
        assert_eq!(sniff_format(&[0x49, 0x49, 0x2A, 0x00]), FileFormat::Tiff);
        assert_eq!(sniff_format(b"RIFF\x10\x00\x00\x00WEBPVP8 "), FileFormat::Webp);
    }

    #[test]
    fn unknown_bytes_fall_back_to_png_mime() {
        let format = sniff_format(b"hello");
        assert_eq!(format, FileFormat::Unknown);
        assert_eq!(format.mime_type(), "image/png");
    }

    #[test]
    fn empty_input_is_unknown() {
        assert_eq!(sniff_format(&[]), FileFormat::Unknown);
    }
}
