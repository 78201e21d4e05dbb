// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Vorleser.

use thiserror::Error;

/// Top-level error type for all Vorleser operations.
#[derive(Debug, Error)]
pub enum VorleserError {
    // -- Pipeline errors --
    /// The image payload could not be decoded into a pixel array.
    #[error("image preprocessing failed: {0}")]
    Preprocess(String),

    /// The document payload could not be decoded, or a required extraction
    /// collaborator (rasteriser, OCR engine) failed or is missing.
    #[error("text extraction failed: {0}")]
    Extraction(String),

    /// Blank input text, or the speech service failed.
    #[error("speech synthesis failed: {0}")]
    Synthesis(String),

    // -- Source errors --
    #[error("unsupported source type: {0}")]
    UnsupportedSource(String),

    #[error("no source document loaded")]
    NoSource,

    // -- Configuration / persistence --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, VorleserError>;
