//! Resume text extraction: PDF bytes in, plain text out.
//!
//! Pages are concatenated in page order with no boundary markers. Layout, headings and
//! tables are not reconstructed; the prompts only need the raw words.

use bytes::Bytes;
use tracing::{debug, warn};

use crate::errors::AppError;

const PDF_MAGIC: &[u8] = b"%PDF";

/// Extracts the text of an uploaded PDF.
///
/// Parsing runs on the blocking pool; a malformed document that makes the parser panic
/// surfaces as `UnprocessableEntity` rather than taking the worker down.
pub async fn extract_resume_text(document: Bytes) -> Result<String, AppError> {
    if document.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }
    if !document.starts_with(PDF_MAGIC) {
        return Err(AppError::UnprocessableEntity(
            "Uploaded file is not a PDF document".to_string(),
        ));
    }

    let size = document.len();
    let text = tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem(&document).map_err(|e| e.to_string())
    })
    .await
    .map_err(|e| {
        warn!("PDF extraction aborted: {e}");
        AppError::UnprocessableEntity("The PDF could not be read".to_string())
    })?
    .map_err(|e| {
        warn!("PDF extraction failed: {e}");
        AppError::UnprocessableEntity(format!("The PDF could not be read: {e}"))
    })?;

    if text.trim().is_empty() {
        return Err(AppError::UnprocessableEntity(
            "No text could be extracted from the PDF (is it a scanned image?)".to_string(),
        ));
    }

    debug!("Extracted {} chars from {} byte PDF", text.chars().count(), size);
    Ok(text)
}
