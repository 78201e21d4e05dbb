// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, VorleserError};
use crate::types::VoicePreset;

/// Persistent application settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub extraction: ExtractionConfig,
    pub speech: SpeechConfig,
}

/// Tunables for page extraction and OCR preprocessing.
///
/// The two text-length heuristics were tuned empirically; they are kept here
/// rather than hard-coded so deployments can adjust them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Below this many stripped characters across all pages, a PDF's native
    /// text layer is treated as absent and every page is OCR'd instead.
    /// Each page is trimmed on its own before counting.
    pub min_native_text_chars: usize,
    /// Character bound for DOCX page chunks.
    pub docx_chunk_chars: usize,
    /// Longest image side allowed before downscaling (pixels).
    pub max_image_dimension: u32,
    /// Run rasterised PDF pages through the threshold preprocessor before OCR.
    pub preprocess_pdf_ocr: bool,
    /// Threshold the slider starts at.
    pub default_threshold: u8,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_native_text_chars: 50,
            docx_chunk_chars: 1000,
            max_image_dimension: 3000,
            preprocess_pdf_ocr: false,
            default_threshold: 128,
        }
    }
}

/// Speech output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Voice used when the user has not picked one.
    pub default_voice: String,
    /// Voices offered in the picker.
    pub voices: Vec<VoicePreset>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            default_voice: "en-AU-NatashaNeural".into(),
            voices: vec![
                VoicePreset::new("Australian Female", "en-AU-NatashaNeural"),
                VoicePreset::new("Australian Male", "en-AU-WilliamNeural"),
                VoicePreset::new("US Female", "en-US-AriaNeural"),
                VoicePreset::new("US Male", "en-US-ChristopherNeural"),
            ],
        }
    }
}

impl SpeechConfig {
    /// Look up a voice id by its picker label.
    pub fn voice_for_label(&self, label: &str) -> Option<&str> {
        self.voices
            .iter()
            .find(|preset| preset.label == label)
            .map(|preset| preset.voice_id.as_str())
    }
}

impl AppConfig {
    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Load settings, falling back to defaults when the file is absent.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Persist settings as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Reject settings that would make extraction misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.extraction.docx_chunk_chars == 0 {
            return Err(VorleserError::Config(
                "extraction.docx_chunk_chars must be greater than zero".into(),
            ));
        }
        if self.extraction.max_image_dimension == 0 {
            return Err(VorleserError::Config(
                "extraction.max_image_dimension must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
