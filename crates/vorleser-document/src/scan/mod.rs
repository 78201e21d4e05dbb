// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Optical character recognition (OCR) seam.
//
// The extractor only depends on [`TextRecognizer`]; the `ocrs`-backed engine
// is available with the `ocr` feature.

use image::DynamicImage;
use vorleser_core::error::Result;

#[cfg(feature = "ocr")]
pub mod ocr;

#[cfg(feature = "ocr")]
pub use ocr::OcrEngine;

/// Turns an image into plain text, lines separated by `\n`.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &DynamicImage) -> Result<String>;
}
