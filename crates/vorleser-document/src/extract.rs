// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page extraction — turn a source document into an ordered list of text
// segments, choosing between the native PDF text layer and OCR.

use image::DynamicImage;
use tracing::{debug, info, instrument, warn};
use vorleser_core::config::ExtractionConfig;
use vorleser_core::error::{Result, VorleserError};
use vorleser_core::types::{OcrParams, SourceKind};

use crate::docx;
use crate::image::{ImagePreprocessor, SourceImage};
use crate::pdf::{NativeTextLayer, PageRasterizer, PdfTextLayer};
use crate::scan::TextRecognizer;

/// Extracts text segments from PDF, DOCX and image sources.
///
/// The extractor owns its collaborators; OCR and PDF rasterisation are
/// optional and only consulted when a source needs them.
pub struct PageExtractor {
    config: ExtractionConfig,
    preprocessor: ImagePreprocessor,
    text_layer: Box<dyn PdfTextLayer>,
    rasterizer: Option<Box<dyn PageRasterizer>>,
    recognizer: Option<Box<dyn TextRecognizer>>,
}

impl PageExtractor {
    /// An extractor reading PDFs through `lopdf`, with no OCR capability.
    pub fn new(config: ExtractionConfig) -> Self {
        Self {
            preprocessor: ImagePreprocessor::new(config.max_image_dimension),
            config,
            text_layer: Box::new(NativeTextLayer),
            rasterizer: None,
            recognizer: None,
        }
    }

    pub fn with_text_layer(mut self, layer: impl PdfTextLayer + 'static) -> Self {
        self.text_layer = Box::new(layer);
        self
    }

    pub fn with_rasterizer(mut self, rasterizer: impl PageRasterizer + 'static) -> Self {
        self.rasterizer = Some(Box::new(rasterizer));
        self
    }

    pub fn with_recognizer(mut self, recognizer: impl TextRecognizer + 'static) -> Self {
        self.recognizer = Some(Box::new(recognizer));
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn preprocessor(&self) -> &ImagePreprocessor {
        &self.preprocessor
    }

    /// Whether scanned PDFs can be OCR'd (needs both a rasteriser and a
    /// recogniser).
    pub fn can_ocr_pdf(&self) -> bool {
        self.rasterizer.is_some() && self.recognizer.is_some()
    }

    /// Extract the segments of `data`, one per PDF page, DOCX chunk, or image.
    ///
    /// Never returns an empty list: a source without text yields one empty
    /// segment.
    #[instrument(skip_all, fields(kind = %kind, bytes_len = data.len(), force_ocr = params.force_ocr, threshold = params.threshold))]
    pub fn extract(&self, data: &[u8], kind: SourceKind, params: OcrParams) -> Result<Vec<String>> {
        let mut segments = match kind {
            SourceKind::Pdf => self.extract_pdf(data, params)?,
            SourceKind::Docx => self.extract_docx(data)?,
            SourceKind::Image => vec![self.extract_image(data, params.threshold)?],
        };

        if segments.is_empty() {
            segments.push(String::new());
        }
        info!(segments = segments.len(), "Extraction complete");
        Ok(segments)
    }

    // -- PDF -----------------------------------------------------------------

    fn extract_pdf(&self, data: &[u8], params: OcrParams) -> Result<Vec<String>> {
        if params.force_ocr {
            info!(strategy = "ocr", "OCR forced, skipping native text layer");
            return self.ocr_pdf(data, params.threshold);
        }

        let native = self.text_layer.page_texts(data)?;
        let stripped_chars: usize = native.iter().map(|page| page.trim().chars().count()).sum();
        debug!(pages = native.len(), stripped_chars, "Native text layer measured");

        if stripped_chars >= self.config.min_native_text_chars {
            info!(strategy = "native", pages = native.len(), "Using native text layer");
            return Ok(native);
        }

        if !self.can_ocr_pdf() {
            warn!(
                stripped_chars,
                "Native text layer looks empty but OCR is unavailable, keeping native text"
            );
            return Ok(native);
        }

        info!(strategy = "ocr", stripped_chars, "Native text layer too thin, falling back to OCR");
        self.ocr_pdf(data, params.threshold)
    }

    fn ocr_pdf(&self, data: &[u8], threshold: u8) -> Result<Vec<String>> {
        let rasterizer = self.rasterizer.as_deref().ok_or_else(|| {
            VorleserError::Extraction("no page rasteriser configured, cannot OCR PDF pages".into())
        })?;
        let recognizer = self.recognizer()?;

        let rendered = rasterizer.rasterize(data)?;
        let mut pages = Vec::with_capacity(rendered.len());
        for (index, page) in rendered.into_iter().enumerate() {
            let prepared = if self.config.preprocess_pdf_ocr {
                let gray = self
                    .preprocessor
                    .preprocess(&SourceImage::from_dynamic(page), threshold);
                DynamicImage::ImageLuma8(gray)
            } else {
                page
            };
            let text = recognizer.recognize(&prepared)?;
            debug!(page = index + 1, chars = text.chars().count(), "Page recognised");
            pages.push(text);
        }
        Ok(pages)
    }

    // -- DOCX ----------------------------------------------------------------

    fn extract_docx(&self, data: &[u8]) -> Result<Vec<String>> {
        let paragraphs = docx::read_paragraphs(data)?;
        Ok(docx::chunk_paragraphs(&paragraphs, self.config.docx_chunk_chars))
    }

    // -- Image ---------------------------------------------------------------

    fn extract_image(&self, data: &[u8], threshold: u8) -> Result<String> {
        let prepared = self.preprocessor.preprocess_bytes(data, threshold)?;
        let recognizer = self.recognizer()?;
        recognizer.recognize(&DynamicImage::ImageLuma8(prepared))
    }

    fn recognizer(&self) -> Result<&dyn TextRecognizer> {
        self.recognizer.as_deref().ok_or_else(|| {
            VorleserError::Extraction("no OCR engine configured, cannot recognise text".into())
        })
    }
}
