// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF rasterisation — render every page to an image for OCR.
//
// The pdfium-backed implementation is only available with the `pdfium`
// feature and needs the pdfium shared library at runtime (either on the
// system library path or at an explicit location).

use image::DynamicImage;
use vorleser_core::error::Result;

/// Renders the physical pages of a PDF to raster images.
pub trait PageRasterizer: Send + Sync {
    /// One image per physical page, in page order.
    fn rasterize(&self, data: &[u8]) -> Result<Vec<DynamicImage>>;
}

#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumRasterizer;

#[cfg(feature = "pdfium")]
mod pdfium {
    use std::path::PathBuf;

    use image::DynamicImage;
    use pdfium_render::prelude::*;
    use tracing::{debug, info, instrument};
    use vorleser_core::error::{Result, VorleserError};

    use super::PageRasterizer;

    /// Longest rendered edge when none is configured. Large enough for OCR
    /// on letter/A4 pages, small enough to bound memory on posters.
    const DEFAULT_MAX_PIXELS: u32 = 2500;

    /// [`PageRasterizer`] backed by the pdfium library.
    #[derive(Debug, Clone)]
    pub struct PdfiumRasterizer {
        /// Explicit pdfium library path; `None` binds the system library.
        library_path: Option<PathBuf>,
        /// Cap on the longest edge of each rendered page.
        max_pixels: u32,
    }

    impl Default for PdfiumRasterizer {
        fn default() -> Self {
            Self {
                library_path: None,
                max_pixels: DEFAULT_MAX_PIXELS,
            }
        }
    }

    impl PdfiumRasterizer {
        /// Bind the pdfium library found at `path` instead of the system one.
        pub fn with_library(path: impl Into<PathBuf>) -> Self {
            Self {
                library_path: Some(path.into()),
                ..Self::default()
            }
        }

        pub fn with_max_pixels(mut self, max_pixels: u32) -> Self {
            self.max_pixels = max_pixels.max(1);
            self
        }

        fn bind(&self) -> Result<Pdfium> {
            let bindings = match &self.library_path {
                Some(path) => Pdfium::bind_to_library(path),
                None => Pdfium::bind_to_system_library(),
            }
            .map_err(|err| {
                VorleserError::Extraction(format!("no page rasteriser available: pdfium {err:?}"))
            })?;
            Ok(Pdfium::new(bindings))
        }
    }

    impl PageRasterizer for PdfiumRasterizer {
        #[instrument(skip_all, fields(bytes_len = data.len(), max_pixels = self.max_pixels))]
        fn rasterize(&self, data: &[u8]) -> Result<Vec<DynamicImage>> {
            let pdfium = self.bind()?;
            let document = pdfium.load_pdf_from_byte_slice(data, None).map_err(|err| {
                VorleserError::Extraction(format!("failed to open PDF for rendering: {err:?}"))
            })?;

            let render_config = PdfRenderConfig::new()
                .set_target_width(self.max_pixels as i32)
                .set_maximum_height(self.max_pixels as i32);

            let pages = document.pages();
            info!(pages = pages.len(), "Rasterising PDF pages");

            let mut images = Vec::with_capacity(pages.len() as usize);
            for (index, page) in pages.iter().enumerate() {
                let bitmap = page.render_with_config(&render_config).map_err(|err| {
                    VorleserError::Extraction(format!(
                        "failed to rasterise page {}: {err:?}",
                        index + 1
                    ))
                })?;
                let image = bitmap.as_image();
                debug!(
                    page = index + 1,
                    width = image.width(),
                    height = image.height(),
                    "Page rendered"
                );
                images.push(image);
            }

            Ok(images)
        }
    }
}
