//! Character-window text chunker with a separator cascade.
//!
//! Splits document text into overlapping chunks of at most `chunk_size`
//! characters. Each cut prefers the highest-priority separator found inside
//! the current window — paragraph break, line break, sentence-ending
//! punctuation, then word boundary — and falls back to a hard cut at
//! exactly `chunk_size` characters when the window contains none of them.
//! The next chunk starts `chunk_overlap` characters before the previous
//! cut, bounding context loss across a split boundary.
//!
//! # Guarantees
//!
//! - Chunks appear in source order with contiguous indices `0, 1, 2, …`.
//! - Unique (non-overlapping) spans concatenate to the exact source text.
//! - Adjacent chunks share at most `chunk_overlap` characters.
//! - All cuts land on UTF-8 character boundaries.
//! - Empty input produces an empty sequence, not an error.

use uuid::Uuid;

use crate::models::Chunk;

/// Separators tried at each cut, highest priority first. The cut lands just
/// after the separator, so trailing punctuation stays with its sentence.
const SEPARATORS: [&str; 6] = ["\n\n", "\n", ". ", "! ", "? ", " "];

/// Split text into overlapping chunks of at most `chunk_size` characters.
///
/// `document_id` is recorded on every chunk. `chunk_overlap` must be
/// smaller than `chunk_size`; it is clamped if not, since the window could
/// not otherwise advance.
pub fn split_text(
    document_id: &str,
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Vec<Chunk> {
    if text.is_empty() {
        return Vec::new();
    }

    let chunk_size = chunk_size.max(1);
    let overlap = chunk_overlap.min(chunk_size - 1);

    // Byte offset of every character boundary, including the end of text,
    // so windows are measured in characters but sliced in bytes.
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let total_chars = bounds.len() - 1;

    let mut chunks = Vec::new();
    let mut start = 0usize;
    let mut ordinal: i64 = 0;

    while start < total_chars {
        let window_end = (start + chunk_size).min(total_chars);
        let end = if window_end == total_chars {
            total_chars
        } else {
            find_cut(text, &bounds, start, window_end, start + overlap)
        };

        let piece = &text[bounds[start]..bounds[end]];
        chunks.push(make_chunk(document_id, ordinal, piece));
        ordinal += 1;

        if end == total_chars {
            break;
        }
        // Step back for overlap, but always advance past the previous start.
        start = if end > start + overlap { end - overlap } else { end };
    }

    chunks
}

/// Pick the cut point (as a character index) for a window that does not
/// reach the end of the text: the last occurrence of the highest-priority
/// separator, or the full window when no separator applies. The cut must
/// clear `min_end` — the region shared with the previous chunk — so every
/// chunk carries text the previous one did not.
fn find_cut(
    text: &str,
    bounds: &[usize],
    start: usize,
    window_end: usize,
    min_end: usize,
) -> usize {
    let lo = bounds[start];
    let hi = bounds[window_end];
    let window = &text[lo..hi];

    for sep in SEPARATORS {
        if let Some(pos) = window.rfind(sep) {
            let cut = lo + pos + sep.len();
            if let Ok(idx) = bounds.binary_search(&cut) {
                if idx > min_end {
                    return idx;
                }
            }
        }
    }

    window_end
}

fn make_chunk(document_id: &str, index: i64, text: &str) -> Chunk {
    Chunk {
        id: Uuid::new_v4().to_string(),
        document_id: document_id.to_string(),
        chunk_index: index,
        text: text.to_string(),
    }
}
