// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — native text layer reading and page rasterisation.

pub mod reader;
pub mod render;

pub use reader::{NativeTextLayer, PdfReader, PdfTextLayer};
pub use render::PageRasterizer;

#[cfg(feature = "pdfium")]
pub use render::PdfiumRasterizer;
