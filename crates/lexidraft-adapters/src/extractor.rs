//! Text extraction for plain-text uploads.

use lexidraft_core::{
    application::{ApplicationError, ports::TextExtractor},
    error::LexiResult,
};

/// MIME types this extractor reads.
pub const TEXT_MIME_TYPES: [&str; 2] = ["text/plain", "text/markdown"];

/// Reads UTF-8 text and markdown documents.
///
/// Binary word-processor formats are reported as `UnsupportedFormat`; a
/// richer extractor can be slotted in behind the same port.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PlainTextExtractor {
    fn extract_text(&self, bytes: &[u8], mime_type: &str) -> LexiResult<String> {
        if !TEXT_MIME_TYPES.contains(&mime_type) {
            return Err(ApplicationError::UnsupportedFormat {
                mime: mime_type.to_string(),
            }
            .into());
        }

        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        let text = std::str::from_utf8(bytes).map_err(|e| ApplicationError::ExtractionFailed {
            reason: format!("document is not valid UTF-8: {e}"),
        })?;

        Ok(text.replace("\r\n", "\n"))
    }
}

/// Guess a MIME type from a file extension.
pub fn mime_from_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "txt" | "text" => Some("text/plain"),
        "md" | "markdown" => Some("text/markdown"),
        "pdf" => Some("application/pdf"),
        "docx" => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use lexidraft_core::error::LexiError;

    use super::*;

    #[test]
    fn reads_utf8_and_normalizes_newlines() {
        let text = PlainTextExtractor
            .extract_text(b"\xEF\xBB\xBFline one\r\nline two", "text/plain")
            .unwrap();
        assert_eq!(text, "line one\nline two");
    }

    #[test]
    fn binary_formats_are_unsupported() {
        let err = PlainTextExtractor
            .extract_text(b"%PDF-1.7", "application/pdf")
            .unwrap_err();
        assert!(matches!(
            err,
            LexiError::Application(ApplicationError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn invalid_utf8_fails_extraction() {
        let err = PlainTextExtractor
            .extract_text(&[0xff, 0xfe, 0x00], "text/markdown")
            .unwrap_err();
        assert!(matches!(
            err,
            LexiError::Application(ApplicationError::ExtractionFailed { .. })
        ));
    }

    #[test]
    fn extensions_map_to_mime() {
        assert_eq!(mime_from_extension("MD"), Some("text/markdown"));
        assert_eq!(mime_from_extension("exe"), None);
    }
}
