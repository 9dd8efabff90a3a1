//! Fixed-width chunking of extracted text.
//!
//! Chunks are non-overlapping windows of `CHUNK_SIZE` characters taken in order, so the last one
//! may be shorter and concatenating them reproduces the input exactly. Widths are counted in
//! Unicode scalar values, which keeps multi-byte characters intact.

/// Width of every chunk except possibly the last, in characters.
pub const CHUNK_SIZE: usize = 500;

/// Number of leading chunks sent to the search provider.
pub const MAX_CHUNKS: usize = 5;

/// Split `text` into consecutive windows of `size` characters.
///
/// Returns an empty vector for empty input or a zero `size`.
pub fn chunk_text(text: &str, size: usize) -> Vec<&str> {
    if size == 0 {
        return Vec::new();
    }

    let mut chunks = Vec::with_capacity(text.len() / size + 1);
    let mut start = 0;
    let mut count = 0;
    for (offset, _) in text.char_indices() {
        if count == size {
            chunks.push(&text[start..offset]);
            start = offset;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}

/// The chunks that are actually searched: the first `MAX_CHUNKS` windows of `CHUNK_SIZE`.
pub fn search_chunks(text: &str) -> Vec<&str> {
    let mut chunks = chunk_text(text, CHUNK_SIZE);
    chunks.truncate(MAX_CHUNKS);
    chunks
}
