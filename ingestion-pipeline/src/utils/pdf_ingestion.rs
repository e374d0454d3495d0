use std::path::Path;

use common::error::AppError;
use tracing::debug;

/// Extracts the text layer of a PDF. Scanned PDFs without a text layer yield
/// an empty string.
pub async fn extract_pdf_text(file_path: &Path) -> Result<String, AppError> {
    let pdf_bytes = tokio::fs::read(file_path).await?;

    let extraction = tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem(&pdf_bytes).map(|s| s.trim().to_string())
    })
    .await?
    .map_err(|err| {
        AppError::Processing(format!(
            "Failed to extract text from PDF {}: {err}",
            file_path.display()
        ))
    })?;

    debug!(
        path = %file_path.display(),
        chars = extraction.len(),
        "Extracted PDF text layer"
    );

    Ok(reflow_paragraphs(&extraction.replace('\r', "")))
}

/// Joins hard-wrapped lines into paragraphs, keeping list and heading lines
/// on their own.
fn reflow_paragraphs(input: &str) -> String {
    let mut paragraphs = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if !buffer.is_empty() {
                paragraphs.push(buffer.join(" "));
                buffer.clear();
            }
            continue;
        }

        if is_structural_line(trimmed) {
            if !buffer.is_empty() {
                paragraphs.push(buffer.join(" "));
                buffer.clear();
            }
            paragraphs.push(trimmed.to_string());
            continue;
        }

        buffer.push(trimmed);
    }

    if !buffer.is_empty() {
        paragraphs.push(buffer.join(" "));
    }

    paragraphs.join("\n\n")
}

fn is_structural_line(line: &str) -> bool {
    line.starts_with('#')
        || line.starts_with('-')
        || line.starts_with('*')
        || line.starts_with('>')
        || line.starts_with("| ")
        || line.chars().next().is_some_and(|c| c.is_ascii_digit()) && line.contains('.')
}
