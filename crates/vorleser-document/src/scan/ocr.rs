// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR engine backed by `ocrs`, a pure-Rust recogniser running neural network
// models through `rten`.
//
// # Model Setup
//
// Two model files are needed:
//
// - `text-detection.rten` locates text regions in the image.
// - `text-recognition.rten` decodes characters from detected regions.
//
// Running `ocrs-cli` once downloads both into `$XDG_CACHE_HOME/ocrs`
// (typically `~/.cache/ocrs`), which is where [`OcrConfig::default`] looks.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use ocrs::{ImageSource, OcrEngine as OcrsEngine, OcrEngineParams};
use rten::Model;
use tracing::{debug, info, instrument};
use vorleser_core::error::{Result, VorleserError};

use super::TextRecognizer;

const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// `$XDG_CACHE_HOME/ocrs`, falling back to `~/.cache/ocrs`.
fn default_model_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        PathBuf::from("ocrs-models")
    }
}

/// Where to load the OCR models from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrConfig {
    pub detection_model_path: PathBuf,
    pub recognition_model_path: PathBuf,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self::from_dir(default_model_dir())
    }
}

impl OcrConfig {
    /// Expect `text-detection.rten` and `text-recognition.rten` inside `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
            recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }

    pub fn from_paths(
        detection_model: impl Into<PathBuf>,
        recognition_model: impl Into<PathBuf>,
    ) -> Self {
        Self {
            detection_model_path: detection_model.into(),
            recognition_model_path: recognition_model.into(),
        }
    }

    /// Both model files are present on disk.
    pub fn models_present(&self) -> bool {
        self.detection_model_path.exists() && self.recognition_model_path.exists()
    }

    /// Fail with an actionable message when either model file is missing.
    pub fn validate(&self) -> Result<()> {
        for (role, path) in [
            ("detection", &self.detection_model_path),
            ("recognition", &self.recognition_model_path),
        ] {
            if !path.exists() {
                return Err(VorleserError::Extraction(format!(
                    "no OCR engine available: {role} model not found at {}; \
                     run `ocrs-cli` once to download models",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

/// Loaded OCR models, reusable across pages and documents.
///
/// Model loading is the expensive step, so build one engine per process and
/// share it. `ocrs` and `rten` are very slow in debug builds.
pub struct OcrEngine {
    engine: OcrsEngine,
}

impl OcrEngine {
    #[instrument(skip_all, fields(
        detection = %config.detection_model_path.display(),
        recognition = %config.recognition_model_path.display(),
    ))]
    pub fn new(config: &OcrConfig) -> Result<Self> {
        config.validate()?;

        info!("Loading OCR detection model");
        let detection_model = Model::load_file(&config.detection_model_path).map_err(|err| {
            VorleserError::Extraction(format!(
                "failed to load OCR detection model from {}: {err}",
                config.detection_model_path.display()
            ))
        })?;

        info!("Loading OCR recognition model");
        let recognition_model =
            Model::load_file(&config.recognition_model_path).map_err(|err| {
                VorleserError::Extraction(format!(
                    "failed to load OCR recognition model from {}: {err}",
                    config.recognition_model_path.display()
                ))
            })?;

        let engine = OcrsEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|err| VorleserError::Extraction(format!("failed to initialise OCR engine: {err}")))?;

        info!("OCR engine initialised");
        Ok(Self { engine })
    }

    /// Load models from the default cache directory.
    pub fn with_defaults() -> Result<Self> {
        Self::new(&OcrConfig::default())
    }

    pub fn from_model_dir(dir: impl AsRef<Path>) -> Result<Self> {
        Self::new(&OcrConfig::from_dir(dir))
    }

    /// Recognise all text in `image`, lines separated by `\n`.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn recognize_text(&self, image: &DynamicImage) -> Result<String> {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();

        let source = ImageSource::from_bytes(rgb.as_raw(), (width, height)).map_err(|err| {
            VorleserError::Extraction(format!(
                "OCR could not read image ({width}x{height}): {err}"
            ))
        })?;

        let input = self
            .engine
            .prepare_input(source)
            .map_err(|err| VorleserError::Extraction(format!("OCR preprocessing failed: {err}")))?;

        let text = self
            .engine
            .get_text(&input)
            .map_err(|err| VorleserError::Extraction(format!("OCR recognition failed: {err}")))?;

        debug!(
            line_count = text.lines().count(),
            char_count = text.chars().count(),
            "OCR recognition complete"
        );
        Ok(text)
    }
}

impl TextRecognizer for OcrEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<String> {
        self.recognize_text(image)
    }
}

/// Default model directory, for diagnostics.
pub fn model_directory() -> PathBuf {
    default_model_dir()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_well_known_file_names() {
        let config = OcrConfig::default();
        assert!(config.detection_model_path.ends_with(DETECTION_MODEL_FILENAME));
        assert!(config.recognition_model_path.ends_with(RECOGNITION_MODEL_FILENAME));
        assert_eq!(config.detection_model_path.parent(), Some(model_directory().as_path()));
    }

    #[test]
    fn config_from_dir_and_paths() {
        let config = OcrConfig::from_dir("/tmp/my-models");
        assert_eq!(
            config.detection_model_path,
            PathBuf::from("/tmp/my-models/text-detection.rten")
        );
        assert_eq!(
            config.recognition_model_path,
            PathBuf::from("/tmp/my-models/text-recognition.rten")
        );

        let config = OcrConfig::from_paths("/a/detect.rten", "/b/recog.rten");
        assert_eq!(config.detection_model_path, PathBuf::from("/a/detect.rten"));
        assert_eq!(config.recognition_model_path, PathBuf::from("/b/recog.rten"));
    }

    #[test]
    fn missing_models_are_an_actionable_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = OcrConfig::from_dir(dir.path());
        assert!(!config.models_present());

        match OcrEngine::new(&config) {
            Err(VorleserError::Extraction(msg)) => {
                assert!(msg.contains("no OCR engine"), "got {msg}");
                assert!(msg.contains("detection"), "got {msg}");
            }
            Err(other) => panic!("unexpected error variant: {other}"),
            Ok(_) => panic!("engine built without models"),
        }
    }
}
