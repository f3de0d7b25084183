//! File signature detection.

/// Document kinds recognised from leading magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    /// ZIP container (`.docx` and other OOXML files).
    Ooxml,
    /// OLE compound file (legacy `.doc`).
    Compound,
    Unknown,
}

const PDF_MAGIC: &[u8] = b"%PDF-";
const ZIP_MAGIC: &[u8] = &[0x50, 0x4B, 0x03, 0x04];
const CFB_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

impl DocumentKind {
    /// Detect from content magic bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        if data.starts_with(PDF_MAGIC) {
            Self::Pdf
        } else if data.starts_with(ZIP_MAGIC) {
            Self::Ooxml
        } else if data.starts_with(CFB_MAGIC) {
            Self::Compound
        } else {
            Self::Unknown
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Ooxml => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Compound => "application/msword",
            Self::Unknown => "application/octet-stream",
        }
    }

    /// Whether a word processor could plausibly open this file.
    pub fn is_word_document(&self) -> bool {
        matches!(self, Self::Ooxml | Self::Compound)
    }

    /// Number of leading bytes needed to tell every kind apart.
    pub const SNIFF_LEN: usize = 8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_pdf() {
        assert_eq!(DocumentKind::from_bytes(b"%PDF-1.7\n..."), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_bytes(b"%PD"), DocumentKind::Unknown);
    }

    #[test]
    fn test_detect_word_documents() {
        let docx = [0x50, 0x4B, 0x03, 0x04, 0x14, 0x00];
        assert_eq!(DocumentKind::from_bytes(&docx), DocumentKind::Ooxml);
        assert!(DocumentKind::from_bytes(&docx).is_word_document());

        let doc = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1, 0x00];
        assert_eq!(DocumentKind::from_bytes(&doc), DocumentKind::Compound);
        assert_eq!(DocumentKind::Compound.mime_type(), "application/msword");
    }

    #[test]
    fn test_unknown() {
        assert_eq!(DocumentKind::from_bytes(b""), DocumentKind::Unknown);
        assert!(!DocumentKind::from_bytes(b"hello").is_word_document());
    }
}
