//! Document chunking.
//!
//! This module provides the [`Chunker`] trait and [`RecursiveChunker`], which
//! splits hierarchically by paragraphs, sentences, then words before falling
//! back to a hard character cut. Consecutive chunks from the same document
//! carry a bounded character overlap so that retrieval never loses context at
//! a chunk boundary.

use crate::document::{Chunk, Document};

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with text and metadata but no embeddings.
/// Embeddings are attached later by the pipeline.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has empty text.
    /// Each returned chunk has an empty embedding vector.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Separator hierarchy: paragraphs, then sentence ends, then words.
const SEPARATORS: [&str; 5] = ["\n\n", ". ", "! ", "? ", " "];

/// Splits text hierarchically: paragraphs → sentences → words → characters.
///
/// Segments produced by one separator level are merged back together up to
/// `chunk_size`; a segment that still exceeds `chunk_size` is split again
/// with the next-level separator. When a chunk is closed, up to
/// `chunk_overlap` trailing characters of it seed the next chunk.
///
/// Chunk IDs are generated as `{document_id}_{chunk_index}`. Each chunk
/// inherits the parent document's metadata plus a `chunk_index` field, so
/// reading order within a document is recoverable.
///
/// # Example
///
/// ```rust,ignore
/// use kisaan_rag::RecursiveChunker;
///
/// let chunker = RecursiveChunker::new(500, 20);
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per chunk
    /// * `chunk_overlap` — maximum number of characters carried over between
    ///   consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.is_empty() {
            return Vec::new();
        }

        let raw_chunks =
            split_and_merge(&document.text, self.chunk_size, self.chunk_overlap, &SEPARATORS);

        raw_chunks
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                let mut metadata = document.metadata.clone();
                metadata.insert("chunk_index".to_string(), i.to_string());
                Chunk {
                    id: format!("{}_{i}", document.id),
                    text,
                    embedding: Vec::new(),
                    metadata,
                    document_id: document.id.clone(),
                }
            })
            .collect()
    }
}

/// Largest index `<= at` that lies on a char boundary of `s`.
fn floor_char_boundary(s: &str, at: usize) -> usize {
    if at >= s.len() {
        return s.len();
    }
    let mut i = at;
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// The longest suffix of `s` that fits in `max_len` bytes, starting at a
/// char boundary.
fn overlap_tail(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut start = s.len() - max_len;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}

/// Split text at a separator while keeping the separator attached to the
/// preceding segment.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut result = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        result.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        result.push(&text[start..]);
    }

    result
}

/// Hard character cut with overlap, used when no separator level fits.
fn split_by_size(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let mut end = floor_char_boundary(text, start + chunk_size);
        if end <= start {
            // A single char wider than chunk_size; take it whole.
            end = start + text[start..].chars().next().map(char::len_utf8).unwrap_or(1);
        }
        chunks.push(text[start..end].to_string());
        if end == text.len() {
            break;
        }
        let step = chunk_size.saturating_sub(chunk_overlap);
        if step == 0 {
            break;
        }
        start = floor_char_boundary(text, start + step).max(start + 1);
        while !text.is_char_boundary(start) {
            start += 1;
        }
    }

    chunks
}

/// Split text by a separator, then merge segments into chunks that respect
/// `chunk_size`, seeding each new chunk with the tail of the previous one.
/// A segment exceeding `chunk_size` is split further using the next-level
/// separator.
fn split_and_merge(
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
    separators: &[&str],
) -> Vec<String> {
    if text.len() <= chunk_size {
        return vec![text.to_string()];
    }
    if separators.is_empty() {
        return split_by_size(text, chunk_size, chunk_overlap);
    }

    let separator = separators[0];
    let remaining_separators = &separators[1..];

    let segments: Vec<&str> = if separator == " " {
        text.split_inclusive(' ').collect()
    } else {
        split_keeping_separator(text, separator)
    };

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();

    for segment in segments {
        if current.is_empty() {
            current = segment.to_string();
        } else if current.len() + segment.len() <= chunk_size {
            current.push_str(segment);
        } else {
            flush(&mut chunks, current, chunk_size, chunk_overlap, remaining_separators);
            // Seed the next chunk with the tail of the one just emitted.
            let tail = chunks.last().map(|c| overlap_tail(c, chunk_overlap)).unwrap_or("");
            current = if !tail.is_empty() && tail.len() + segment.len() <= chunk_size {
                let mut seeded = tail.to_string();
                seeded.push_str(segment);
                seeded
            } else {
                segment.to_string()
            };
        }
    }

    if !current.is_empty() {
        flush(&mut chunks, current, chunk_size, chunk_overlap, remaining_separators);
    }

    chunks
}

/// Emit a finished chunk, recursing into the next separator level if it is
/// still too large.
fn flush(
    chunks: &mut Vec<String>,
    current: String,
    chunk_size: usize,
    chunk_overlap: usize,
    remaining_separators: &[&str],
) {
    if current.len() > chunk_size {
        chunks.extend(split_and_merge(&current, chunk_size, chunk_overlap, remaining_separators));
    } else {
        chunks.push(current);
    }
}
