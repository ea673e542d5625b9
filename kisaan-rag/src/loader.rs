//! PDF directory loader and metadata reduction.
//!
//! Loading is best-effort: a missing or unreadable directory yields an empty
//! list with a warning, and a file that fails text extraction is skipped.
//! Every page of every readable PDF becomes one [`Document`] carrying
//! `source` (the file path) and `page` metadata.

use std::collections::HashMap;
use std::path::Path;

use tracing::{info, warn};

use crate::document::{Document, SOURCE_KEY, UNKNOWN_SOURCE};

/// Load every `*.pdf` file in a directory, producing one [`Document`] per page.
///
/// Pages are numbered from 1 in the `page` metadata field. Document IDs are
/// `{file_stem}_p{page}` so that re-ingesting the same corpus produces the
/// same IDs. Failures are non-fatal: the function logs and returns whatever
/// it could read, down to an empty list.
pub fn load_pdf_dir(data_path: &Path) -> Vec<Document> {
    let entries = match std::fs::read_dir(data_path) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %data_path.display(), error = %e, "cannot read data directory");
            return Vec::new();
        }
    };

    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension().and_then(|ext| ext.to_str()).is_some_and(|ext| {
                ext.eq_ignore_ascii_case("pdf")
            })
        })
        .collect();
    // Stable ingestion order regardless of directory iteration order.
    paths.sort();

    let mut documents = Vec::new();
    for path in paths {
        let pages = match pdf_extract::extract_text_by_pages(&path) {
            Ok(pages) => pages,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "failed to extract PDF text, skipping");
                continue;
            }
        };

        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("document")
            .to_string();
        let source = path.display().to_string();

        for (page_idx, text) in pages.into_iter().enumerate() {
            let page = page_idx + 1;
            let mut metadata = HashMap::new();
            metadata.insert(SOURCE_KEY.to_string(), source.clone());
            metadata.insert("page".to_string(), page.to_string());
            documents.push(Document { id: format!("{stem}_p{page}"), text, metadata });
        }
    }

    info!(path = %data_path.display(), count = documents.len(), "loaded documents");
    documents
}

/// Narrow a document's metadata to the single `source` field, defaulting to
/// `"unknown"` when no source is present. Pure; the content is untouched.
pub fn reduce_metadata(document: Document) -> Document {
    let source = document
        .metadata
        .get(SOURCE_KEY)
        .cloned()
        .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());

    Document {
        id: document.id,
        text: document.text,
        metadata: HashMap::from([(SOURCE_KEY.to_string(), source)]),
    }
}
