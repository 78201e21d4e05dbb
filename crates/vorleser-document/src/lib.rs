// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// vorleser-document — Turning source documents into text segments.
//
// Provides OCR image preprocessing (orientation, downscale, grayscale,
// sharpen, threshold), the native PDF text layer, DOCX paragraph reading and
// chunking, the OCR seam, and the `PageExtractor` that ties them together.

pub mod docx;
pub mod extract;
pub mod image;
pub mod normalize;
pub mod pdf;
pub mod scan;

// Re-export the primary types so callers can use `vorleser_document::PageExtractor` etc.
pub use extract::PageExtractor;
pub use self::image::{ImagePreprocessor, SourceImage};
pub use normalize::normalize;
pub use pdf::{NativeTextLayer, PageRasterizer, PdfReader, PdfTextLayer};
pub use scan::TextRecognizer;

#[cfg(feature = "ocr")]
pub use scan::ocr::{OcrConfig, OcrEngine};

#[cfg(feature = "pdfium")]
pub use pdf::PdfiumRasterizer;
