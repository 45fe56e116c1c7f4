//! Document loading: PDF bytes to plain text.
//!
//! The upload surface accepts a single PDF per conversation. Extraction
//! failures and documents with no extractable text both surface as
//! [`RagError::DocumentLoad`], so an unreadable file never produces a
//! namespace.

use resume_chat_core::error::RagError;

/// MIME type accepted by the upload surface.
pub const MIME_PDF: &str = "application/pdf";

/// Extract plain text from an uploaded PDF.
pub fn extract_text(bytes: &[u8]) -> Result<String, RagError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| RagError::DocumentLoad(format!("PDF extraction failed: {e}")))?;

    if text.trim().is_empty() {
        return Err(RagError::DocumentLoad(
            "no text could be extracted from the PDF".to_string(),
        ));
    }

    Ok(text)
}
