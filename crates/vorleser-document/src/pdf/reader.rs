// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open PDFs from memory and pull the native text layer page by
// page using the `lopdf` crate.

use lopdf::Document;
use tracing::{debug, instrument, warn};
use vorleser_core::error::{Result, VorleserError};

/// Source of the native (embedded) text of a PDF.
pub trait PdfTextLayer: Send + Sync {
    /// Text of every physical page, in page order.
    ///
    /// Fails only when the payload cannot be parsed as a PDF; a page whose
    /// text cannot be decoded contributes an empty string.
    fn page_texts(&self, data: &[u8]) -> Result<Vec<String>>;
}

/// [`PdfTextLayer`] backed by [`PdfReader`].
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeTextLayer;

impl PdfTextLayer for NativeTextLayer {
    fn page_texts(&self, data: &[u8]) -> Result<Vec<String>> {
        PdfReader::from_bytes(data)?.page_texts()
    }
}

/// Reads an in-memory PDF document.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
}

impl PdfReader {
    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            VorleserError::Extraction(format!("failed to load PDF from memory: {err}"))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");
        Ok(Self { document })
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Native text of a single page (1-indexed).
    pub fn page_text(&self, page_number: u32) -> Result<String> {
        let pages = self.document.get_pages();
        if !pages.contains_key(&page_number) {
            return Err(VorleserError::Extraction(format!(
                "page {} out of range (document has {} pages)",
                page_number,
                pages.len()
            )));
        }

        self.document.extract_text(&[page_number]).map_err(|err| {
            VorleserError::Extraction(format!("failed to extract text of page {page_number}: {err}"))
        })
    }

    /// Native text of every page, in page order.
    ///
    /// Pages whose content cannot be decoded (unknown font encodings, broken
    /// content streams) yield an empty string: the caller's quality heuristic
    /// decides whether the text layer is usable at all.
    pub fn page_texts(&self) -> Result<Vec<String>> {
        // lopdf pages are keyed by 1-indexed page number, in a sorted map.
        let page_numbers: Vec<u32> = self.document.get_pages().keys().copied().collect();

        let mut texts = Vec::with_capacity(page_numbers.len());
        for page_number in page_numbers {
            match self.page_text(page_number) {
                Ok(text) => texts.push(text),
                Err(err) => {
                    warn!(page_number, %err, "Unreadable text layer, treating page as empty");
                    texts.push(String::new());
                }
            }
        }

        debug!(pages = texts.len(), "Native text layer read");
        Ok(texts)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_text_per_page_in_order() {
        let data = fixtures::text_pdf(&["Hello first page", "Second page here"]);
        let reader = PdfReader::from_bytes(&data).unwrap();
        assert_eq!(reader.page_count(), 2);

        let texts = reader.page_texts().unwrap();
        assert_eq!(texts.len(), 2);
        assert!(texts[0].contains("Hello first page"), "got {:?}", texts[0]);
        assert!(texts[1].contains("Second page here"), "got {:?}", texts[1]);
    }

    #[test]
    fn page_without_text_yields_empty_string() {
        let data = fixtures::text_pdf(&["", "Only text"]);
        let texts = NativeTextLayer.page_texts(&data).unwrap();
        assert_eq!(texts.len(), 2);
        assert!(texts[0].trim().is_empty());
    }

    #[test]
    fn page_out_of_range_is_rejected() {
        let data = fixtures::text_pdf(&["one"]);
        let reader = PdfReader::from_bytes(&data).unwrap();
        assert!(reader.page_text(0).is_err());
        assert!(reader.page_text(2).is_err());
    }

    #[test]
    fn garbage_bytes_are_an_extraction_error() {
        match PdfReader::from_bytes(b"this is not a pdf at all") {
            Err(VorleserError::Extraction(msg)) => assert!(msg.contains("failed to load PDF")),
            Err(other) => panic!("unexpected error variant: {other}"),
            Ok(_) => panic!("garbage parsed as PDF"),
        }
    }
}
