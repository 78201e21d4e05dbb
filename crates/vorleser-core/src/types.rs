// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Vorleser.

use serde::{Deserialize, Serialize};

use crate::config::ExtractionConfig;

/// MIME type of every exported audio artifact.
pub const AUDIO_MIME_TYPE: &str = "audio/mp3";

/// Supported input document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Pdf,
    Docx,
    /// Any raster image the `image` crate can decode (PNG, JPEG, TIFF, ...).
    Image,
}

impl SourceKind {
    /// Canonical MIME type for the kind.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Image => "image/*",
        }
    }

    /// Infer the kind from a file extension (case-insensitive, no dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "png" | "jpg" | "jpeg" | "tif" | "tiff" | "bmp" | "webp" => Some(Self::Image),
            _ => None,
        }
    }

    /// Infer the kind from a file name's final extension.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        Self::from_extension(ext)
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Image => "image",
        };
        f.write_str(label)
    }
}

/// User-tunable OCR parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OcrParams {
    /// Skip the native PDF text layer and OCR every page.
    pub force_ocr: bool,
    /// Global binarisation threshold (0–255) applied before OCR.
    pub threshold: u8,
}

impl Default for OcrParams {
    fn default() -> Self {
        Self {
            force_ocr: false,
            threshold: 128,
        }
    }
}

/// Identity of an extraction: the source plus whichever OCR parameters can
/// change its result.
///
/// Two fingerprints compare equal exactly when re-running extraction would be
/// pointless, so hosts use it to decide between re-extracting and keeping the
/// current session (and its edits).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceFingerprint {
    pub name: String,
    pub size: u64,
    pub kind: SourceKind,
    /// Present only when the kind has a native-vs-OCR choice (PDF).
    pub force_ocr: Option<bool>,
    /// Present only when the threshold feeds the extraction result.
    pub threshold: Option<u8>,
}

impl SourceFingerprint {
    /// Build the fingerprint for a source under the given parameters.
    ///
    /// - images: the threshold participates, `force_ocr` does not (images are
    ///   always OCR'd).
    /// - PDFs: `force_ocr` participates; the threshold participates only when
    ///   rasterised pages are preprocessed before OCR.
    /// - DOCX: no parameters participate.
    pub fn new(
        name: impl Into<String>,
        size: u64,
        kind: SourceKind,
        params: OcrParams,
        config: &ExtractionConfig,
    ) -> Self {
        let (force_ocr, threshold) = match kind {
            SourceKind::Image => (None, Some(params.threshold)),
            SourceKind::Pdf => (
                Some(params.force_ocr),
                config.preprocess_pdf_ocr.then_some(params.threshold),
            ),
            SourceKind::Docx => (None, None),
        };
        Self {
            name: name.into(),
            size,
            kind,
            force_ocr,
            threshold,
        }
    }
}

impl std::fmt::Display for SourceFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} bytes, {})", self.name, self.size, self.kind)?;
        if let Some(force) = self.force_ocr {
            write!(f, " force_ocr={force}")?;
        }
        if let Some(threshold) = self.threshold {
            write!(f, " threshold={threshold}")?;
        }
        Ok(())
    }
}

/// A named voice shown in the voice picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoicePreset {
    /// Label shown to the user (e.g. "Australian Female").
    pub label: String,
    /// Identifier passed to the speech service (e.g. "en-AU-NatashaNeural").
    pub voice_id: String,
}

impl VoicePreset {
    pub fn new(label: impl Into<String>, voice_id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            voice_id: voice_id.into(),
        }
    }
}

/// Synthesised audio ready for playback or download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioArtifact {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: &'static str,
}

impl AudioArtifact {
    /// Wrap synthesised bytes, naming the file after the source document.
    pub fn for_source(source_name: &str, bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            file_name: audio_file_name(source_name),
            mime_type: AUDIO_MIME_TYPE,
        }
    }
}

/// Replace the final extension of `source_name` with `.mp3`.
///
/// `report.v2.pdf` → `report.v2.mp3`, `notes` → `notes.mp3`, and an empty or
/// extension-only name falls back to `audio.mp3`.
pub fn audio_file_name(source_name: &str) -> String {
    let stem = match source_name.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => source_name,
    };
    let stem = stem.trim();
    if stem.is_empty() {
        "audio.mp3".to_string()
    } else {
        format!("{stem}.mp3")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_file_name() {
        assert_eq!(SourceKind::from_file_name("Scan.JPG"), Some(SourceKind::Image));
        assert_eq!(SourceKind::from_file_name("thesis.final.pdf"), Some(SourceKind::Pdf));
        assert_eq!(SourceKind::from_file_name("letter.docx"), Some(SourceKind::Docx));
        assert_eq!(SourceKind::from_file_name("legacy.doc"), None);
        assert_eq!(SourceKind::from_file_name("README"), None);
    }

    #[test]
    fn audio_name_replaces_last_extension() {
        assert_eq!(audio_file_name("report.pdf"), "report.mp3");
        assert_eq!(audio_file_name("report.v2.docx"), "report.v2.mp3");
        assert_eq!(audio_file_name("notes"), "notes.mp3");
        assert_eq!(audio_file_name(".pdf"), "audio.mp3");
        assert_eq!(audio_file_name(""), "audio.mp3");
    }

    #[test]
    fn artifact_carries_mp3_mime() {
        let artifact = AudioArtifact::for_source("scan.png", vec![1, 2, 3]);
        assert_eq!(artifact.file_name, "scan.mp3");
        assert_eq!(artifact.mime_type, "audio/mp3");
        assert_eq!(artifact.bytes, vec![1, 2, 3]);
    }

    #[test]
    fn image_fingerprint_tracks_threshold_only() {
        let config = ExtractionConfig::default();
        let a = SourceFingerprint::new(
            "page.png",
            10,
            SourceKind::Image,
            OcrParams { force_ocr: false, threshold: 100 },
            &config,
        );
        let b = SourceFingerprint::new(
            "page.png",
            10,
            SourceKind::Image,
            OcrParams { force_ocr: true, threshold: 100 },
            &config,
        );
        let c = SourceFingerprint::new(
            "page.png",
            10,
            SourceKind::Image,
            OcrParams { force_ocr: false, threshold: 101 },
            &config,
        );
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn pdf_fingerprint_ignores_threshold_unless_preprocessing() {
        let mut config = ExtractionConfig::default();
        let low = OcrParams { force_ocr: true, threshold: 90 };
        let high = OcrParams { force_ocr: true, threshold: 200 };

        let a = SourceFingerprint::new("doc.pdf", 5, SourceKind::Pdf, low, &config);
        let b = SourceFingerprint::new("doc.pdf", 5, SourceKind::Pdf, high, &config);
        assert_eq!(a, b);

        let native = SourceFingerprint::new(
            "doc.pdf",
            5,
            SourceKind::Pdf,
            OcrParams { force_ocr: false, threshold: 90 },
            &config,
        );
        assert_ne!(a, native);

        config.preprocess_pdf_ocr = true;
        let a = SourceFingerprint::new("doc.pdf", 5, SourceKind::Pdf, low, &config);
        let b = SourceFingerprint::new("doc.pdf", 5, SourceKind::Pdf, high, &config);
        assert_ne!(a, b);
    }

    #[test]
    fn docx_fingerprint_is_name_and_size() {
        let config = ExtractionConfig::default();
        let a = SourceFingerprint::new(
            "a.docx",
            7,
            SourceKind::Docx,
            OcrParams { force_ocr: true, threshold: 3 },
            &config,
        );
        let b = SourceFingerprint::new("a.docx", 7, SourceKind::Docx, OcrParams::default(), &config);
        let c = SourceFingerprint::new("a.docx", 8, SourceKind::Docx, OcrParams::default(), &config);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
