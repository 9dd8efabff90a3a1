//! PDF text extraction via `lopdf`.

use std::fmt;

use lopdf::Document;

use super::ExtractionError;

/// Concatenate the text of every page in page-number order.
///
/// Pages whose text cannot be decoded are logged and skipped; only an unreadable document fails.
pub(super) fn extract(bytes: &[u8]) -> Result<String, ExtractionError> {
    let document =
        Document::load_mem(bytes).map_err(|error| ExtractionError::Pdf(error.to_string()))?;

    // `get_pages` is keyed by page number, so iteration is already in reading order.
    let pages = document
        .get_pages()
        .into_keys()
        .map(|page_number| (page_number, document.extract_text(&[page_number])));
    let text = join_pages(pages);
    tracing::trace!(chars = text.chars().count(), "Extracted PDF text");
    Ok(text)
}

fn join_pages<E: fmt::Display>(pages: impl Iterator<Item = (u32, Result<String, E>)>) -> String {
    let mut text = String::new();
    for (page_number, page_text) in pages {
        match page_text {
            Ok(page_text) => text.push_str(&page_text),
            Err(error) => {
                tracing::warn!(page = page_number, error = %error, "Skipping unreadable PDF page");
            }
        }
    }
    text
}
