// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Workspace — everything one user is working on: the stored upload, the OCR
// parameters, the editable session, and which extraction the session holds.

use tracing::{debug, info, instrument};
use vorleser_core::error::{Result, VorleserError};
use vorleser_core::types::{AudioArtifact, OcrParams, SourceFingerprint};

use crate::extraction::{Extraction, ExtractionCoordinator};
use crate::session::DocumentSession;
use crate::source::{SourceDocument, SourceStore};
use crate::synthesis::SpeechService;

/// What happened when an extraction was offered to the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The session was (re)loaded from the extraction.
    Loaded,
    /// The session already holds this fingerprint; edits were kept.
    Unchanged,
    /// A newer request exists; the extraction was discarded.
    Superseded,
}

/// Explicit per-user state.
#[derive(Debug, Default)]
pub struct Workspace {
    sources: SourceStore,
    params: OcrParams,
    session: DocumentSession,
    loaded: Option<SourceFingerprint>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// A workspace whose threshold starts at `threshold`.
    pub fn with_threshold(threshold: u8) -> Self {
        Self {
            params: OcrParams {
                threshold,
                ..OcrParams::default()
            },
            ..Self::default()
        }
    }

    // -- Source --------------------------------------------------------------

    /// Report what the upload widget currently holds.
    ///
    /// `None` keeps the stored source. A different upload (by name and size)
    /// empties the session until it is extracted. Returns whether a new
    /// source was detected.
    pub fn observe_upload(&mut self, upload: Option<SourceDocument>) -> bool {
        let is_new = match (&upload, self.sources.current()) {
            (Some(upload), Some(current)) => !upload.same_upload(current),
            (Some(_), None) => true,
            (None, _) => false,
        };
        self.sources.observe(upload);
        if is_new {
            info!("New source detected, clearing session");
            self.session.clear();
            self.loaded = None;
        }
        is_new
    }

    pub fn source(&self) -> Option<&SourceDocument> {
        self.sources.current()
    }

    /// Forget the source and the session. Forced OCR switches off; the
    /// threshold is kept.
    pub fn reset(&mut self) {
        self.sources.reset();
        self.session.clear();
        self.loaded = None;
        self.params = OcrParams {
            threshold: self.params.threshold,
            ..OcrParams::default()
        };
        info!("Workspace reset");
    }

    // -- Parameters ----------------------------------------------------------

    pub fn params(&self) -> OcrParams {
        self.params
    }

    pub fn set_force_ocr(&mut self, force_ocr: bool) {
        self.params.force_ocr = force_ocr;
    }

    pub fn set_threshold(&mut self, threshold: u8) {
        self.params.threshold = threshold;
    }

    // -- Session -------------------------------------------------------------

    pub fn session(&self) -> &DocumentSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut DocumentSession {
        &mut self.session
    }

    /// Fingerprint of the extraction the session was loaded from.
    pub fn loaded_fingerprint(&self) -> Option<&SourceFingerprint> {
        self.loaded.as_ref()
    }

    /// Whether the current source and parameters differ from what the
    /// session holds.
    pub fn needs_extraction(&self, coordinator: &ExtractionCoordinator) -> bool {
        match self.sources.current() {
            Some(source) => {
                let wanted = coordinator.fingerprint(source, self.params);
                self.loaded.as_ref() != Some(&wanted)
            }
            None => false,
        }
    }

    /// Load `extraction` into the session unless it is stale or already
    /// loaded.
    pub fn apply_extraction(
        &mut self,
        extraction: &Extraction,
        coordinator: &ExtractionCoordinator,
    ) -> ApplyOutcome {
        if !coordinator.is_current(&extraction.fingerprint) {
            debug!(fingerprint = %extraction.fingerprint, "Discarding superseded extraction");
            return ApplyOutcome::Superseded;
        }
        if self.loaded.as_ref() == Some(&extraction.fingerprint) {
            return ApplyOutcome::Unchanged;
        }

        self.session.load(extraction.segments.iter());
        self.loaded = Some(extraction.fingerprint.clone());
        info!(
            fingerprint = %extraction.fingerprint,
            pages = self.session.page_count(),
            "Session loaded from extraction"
        );
        ApplyOutcome::Loaded
    }

    /// Bring the session in line with the current source and parameters,
    /// extracting only when the fingerprint changed.
    #[instrument(skip_all)]
    pub async fn refresh(&mut self, coordinator: &ExtractionCoordinator) -> Result<ApplyOutcome> {
        let source = self.sources.current().cloned().ok_or(VorleserError::NoSource)?;
        if !self.needs_extraction(coordinator) {
            return Ok(ApplyOutcome::Unchanged);
        }

        let extraction = coordinator.extract(&source, self.params).await?;
        Ok(self.apply_extraction(&extraction, coordinator))
    }

    // -- Output --------------------------------------------------------------

    /// Assemble the document and synthesise it with `voice_id`.
    pub async fn synthesize(&mut self, speech: &SpeechService, voice_id: &str) -> Result<AudioArtifact> {
        let name = self
            .sources
            .current()
            .map(|source| source.name().to_owned())
            .ok_or(VorleserError::NoSource)?;
        let text = self.session.assemble();
        speech.render(&name, &text, voice_id).await
    }
}
