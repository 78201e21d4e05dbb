// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every technical error is mapped to plain English saying what failed and
// what to try next. The core never retries on its own; `retriable` only tells
// the host whether offering a "try again" action makes sense.

use crate::error::VorleserError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Service hiccup; trying the same action again may work.
    Transient,
    /// The user has to act first, e.g. install OCR models or add text.
    ActionRequired,
    /// Damaged or unsupported file. Retrying will not help.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether a fresh attempt of the same action could succeed.
    pub retriable: bool,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

/// Convert a `VorleserError` into a `HumanError`.
pub fn humanize_error(err: &VorleserError) -> HumanError {
    match err {
        VorleserError::Preprocess(detail) => HumanError {
            message: "We couldn't read this image.".into(),
            suggestion: format!(
                "The image may be damaged or in an unusual format. Try saving it as a PNG or JPEG first. ({detail})"
            ),
            retriable: false,
            severity: Severity::Permanent,
        },

        VorleserError::Extraction(detail) => humanize_extraction_error(detail),

        VorleserError::Synthesis(detail) => {
            if detail.contains("no text") {
                HumanError {
                    message: "There is no text to read aloud.".into(),
                    suggestion: "Add some text to at least one page, then try again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "The speech service didn't produce any audio.".into(),
                    suggestion: format!(
                        "Check your internet connection and try again. ({detail})"
                    ),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        VorleserError::UnsupportedSource(detail) => HumanError {
            message: "This type of file isn't supported.".into(),
            suggestion: format!(
                "Upload a PDF, a Word document (.docx), or an image. (File: {detail})"
            ),
            retriable: false,
            severity: Severity::Permanent,
        },

        VorleserError::NoSource => HumanError {
            message: "No document has been uploaded.".into(),
            suggestion: "Choose a file to upload, then try again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        VorleserError::Config(detail) => HumanError {
            message: "The settings file couldn't be used.".into(),
            suggestion: format!("Fix or remove the settings file to use the defaults. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        VorleserError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "The app doesn't have permission to read that file.".into(),
                    suggestion: "Check the file permissions, or copy the file somewhere else first.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, your storage may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        VorleserError::Serialization(_) => HumanError {
            message: "The app had an internal data problem.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}

/// Extraction failures cover both damaged files and missing OCR support.
fn humanize_extraction_error(detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("no ocr engine") || lower.contains("no page rasteriser") {
        HumanError {
            message: "This document needs text recognition, which isn't set up.".into(),
            suggestion: "The file looks like a scan. Install the OCR models (or PDF renderer) and try again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        }
    } else if lower.contains("ocr") {
        HumanError {
            message: "Text recognition didn't work on this file.".into(),
            suggestion: "Try adjusting the threshold slider, or scan the page again with better lighting.".into(),
            retriable: true,
            severity: Severity::Transient,
        }
    } else {
        HumanError {
            message: "We couldn't read this document.".into(),
            suggestion: format!(
                "The file may be damaged or password-protected. Try opening it on a computer first, or try a different file. ({detail})"
            ),
            retriable: false,
            severity: Severity::Permanent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_document_is_permanent() {
        let err = VorleserError::Extraction("failed to load PDF from memory: invalid file header".into());
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::Permanent);
        assert!(!human.retriable);
        assert!(human.suggestion.contains("invalid file header"));
    }

    #[test]
    fn missing_ocr_engine_is_action_required() {
        let err = VorleserError::Extraction("no OCR engine configured for image source".into());
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
    }

    #[test]
    fn ocr_failure_is_transient() {
        let err = VorleserError::Extraction("OCR text recognition failed: tensor shape".into());
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::Transient);
        assert!(human.retriable);
    }

    #[test]
    fn blank_text_is_action_required() {
        let err = VorleserError::Synthesis("no text to synthesize".into());
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(!human.retriable);
    }

    #[test]
    fn service_failure_is_retriable() {
        let err = VorleserError::Synthesis("connection reset by peer".into());
        let human = humanize_error(&err);
        assert!(human.retriable);
    }

    #[test]
    fn undecodable_image_is_permanent() {
        let human = humanize_error(&VorleserError::Preprocess("bad magic".into()));
        assert_eq!(human.severity, Severity::Permanent);
    }
}
