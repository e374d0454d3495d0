use std::path::Path;

use common::error::AppError;
use tracing::warn;

use super::pdf_ingestion::extract_pdf_text;

/// Non-`text/*` MIME types that are still read as plain text.
const TEXTUAL_APPLICATION_TYPES: [&str; 6] = [
    "application/octet-stream",
    "application/json",
    "application/xml",
    "application/x-subrip",
    "application/x-sh",
    "application/toml",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Text,
    Pdf,
    Unsupported,
}

pub fn classify(mime_type: &str) -> FileKind {
    if mime_type == "application/pdf" {
        FileKind::Pdf
    } else if mime_type.starts_with("text/") || TEXTUAL_APPLICATION_TYPES.contains(&mime_type) {
        FileKind::Text
    } else {
        FileKind::Unsupported
    }
}

/// Reads the text of a file. Returns `Ok(None)` for formats that carry no
/// extractable text (images, audio, archives).
pub async fn extract_text_from_file(
    path: &Path,
    mime_type: &str,
) -> Result<Option<String>, AppError> {
    match classify(mime_type) {
        FileKind::Text => {
            let raw = tokio::fs::read(path).await?;
            Ok(Some(String::from_utf8_lossy(&raw).into_owned()))
        }
        FileKind::Pdf => extract_pdf_text(path).await.map(Some),
        FileKind::Unsupported => {
            warn!(
                path = %path.display(),
                mime_type,
                "Skipping file without extractable text"
            );
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_common_transcript_formats() {
        assert_eq!(classify("text/plain"), FileKind::Text);
        assert_eq!(classify("text/markdown"), FileKind::Text);
        assert_eq!(classify("text/vtt"), FileKind::Text);
        assert_eq!(classify("application/x-subrip"), FileKind::Text);
        assert_eq!(classify("application/octet-stream"), FileKind::Text);
        assert_eq!(classify("application/pdf"), FileKind::Pdf);
        assert_eq!(classify("image/png"), FileKind::Unsupported);
        assert_eq!(classify("audio/mpeg"), FileKind::Unsupported);
    }

    #[tokio::test]
    async fn invalid_utf8_is_read_lossily() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("legacy.txt");
        tokio::fs::write(&path, b"caf\xe9 meeting").await.expect("write");

        let text = extract_text_from_file(&path, "text/plain")
            .await
            .expect("extract")
            .expect("text");

        assert!(text.starts_with("caf"));
        assert!(text.ends_with(" meeting"));
    }

    #[tokio::test]
    async fn unsupported_files_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("photo.png");
        tokio::fs::write(&path, [0_u8, 1, 2]).await.expect("write");

        let text = extract_text_from_file(&path, "image/png")
            .await
            .expect("extract");

        assert!(text.is_none());
    }
}
