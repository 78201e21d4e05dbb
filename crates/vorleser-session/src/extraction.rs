// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Extraction coordinator — runs `PageExtractor` off the async executor,
// memoises the latest result by fingerprint, deduplicates concurrent
// requests, and tracks which request is the latest.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, instrument};
use vorleser_core::config::ExtractionConfig;
use vorleser_core::error::{Result, VorleserError};
use vorleser_core::types::{OcrParams, SourceFingerprint};
use vorleser_document::PageExtractor;

use crate::flight::SingleFlight;
use crate::source::SourceDocument;

/// Raw segments extracted for one fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub fingerprint: SourceFingerprint,
    pub segments: Arc<Vec<String>>,
    /// Served from the memo cache without running the extractor.
    pub from_cache: bool,
}

/// One-entry memo of the most recent extraction.
#[derive(Debug, Default)]
pub struct ExtractionCache {
    entry: Option<(SourceFingerprint, Arc<Vec<String>>)>,
}

impl ExtractionCache {
    pub fn get(&self, fingerprint: &SourceFingerprint) -> Option<Arc<Vec<String>>> {
        match &self.entry {
            Some((cached, segments)) if cached == fingerprint => Some(Arc::clone(segments)),
            _ => None,
        }
    }

    pub fn store(&mut self, fingerprint: SourceFingerprint, segments: Arc<Vec<String>>) {
        self.entry = Some((fingerprint, segments));
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }
}

/// Serialises access to a [`PageExtractor`] for async hosts.
pub struct ExtractionCoordinator {
    extractor: Arc<PageExtractor>,
    cache: Mutex<ExtractionCache>,
    latest: Mutex<Option<SourceFingerprint>>,
    flights: SingleFlight<SourceFingerprint, Arc<Vec<String>>>,
}

impl ExtractionCoordinator {
    pub fn new(extractor: PageExtractor) -> Self {
        Self {
            extractor: Arc::new(extractor),
            cache: Mutex::new(ExtractionCache::default()),
            latest: Mutex::new(None),
            flights: SingleFlight::new(),
        }
    }

    pub fn config(&self) -> &ExtractionConfig {
        self.extractor.config()
    }

    pub fn fingerprint(&self, source: &SourceDocument, params: OcrParams) -> SourceFingerprint {
        source.fingerprint(params, self.config())
    }

    /// Whether `fingerprint` belongs to the most recent request.
    pub fn is_current(&self, fingerprint: &SourceFingerprint) -> bool {
        self.lock_latest().as_ref() == Some(fingerprint)
    }

    /// Extract `source` under `params`.
    ///
    /// Marks the request as the latest one, so results of earlier requests
    /// for other fingerprints stop being current. A cached result for the
    /// same fingerprint is returned without re-running the extractor.
    #[instrument(skip_all, fields(source = %source.name(), kind = %source.kind()))]
    pub async fn extract(&self, source: &SourceDocument, params: OcrParams) -> Result<Extraction> {
        let fingerprint = self.fingerprint(source, params);
        *self.lock_latest() = Some(fingerprint.clone());

        if let Some(segments) = self.lock_cache().get(&fingerprint) {
            debug!(%fingerprint, "Extraction served from cache");
            return Ok(Extraction {
                fingerprint,
                segments,
                from_cache: true,
            });
        }

        let extractor = Arc::clone(&self.extractor);
        let bytes = source.shared_bytes();
        let kind = source.kind();
        let segments = self
            .flights
            .run(fingerprint.clone(), move || async move {
                tokio::task::spawn_blocking(move || extractor.extract(&bytes, kind, params))
                    .await
                    .map_err(|err| VorleserError::Extraction(format!("extraction task failed: {err}")))?
                    .map(Arc::new)
            })
            .await?;

        if self.is_current(&fingerprint) {
            self.lock_cache().store(fingerprint.clone(), Arc::clone(&segments));
        } else {
            debug!(%fingerprint, "Extraction finished after being superseded, not cached");
        }

        info!(%fingerprint, segments = segments.len(), "Extraction ready");
        Ok(Extraction {
            fingerprint,
            segments,
            from_cache: false,
        })
    }

    /// Forget the cached result and the latest request.
    pub fn reset(&self) {
        self.lock_cache().clear();
        *self.lock_latest() = None;
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, ExtractionCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_latest(&self) -> std::sync::MutexGuard<'_, Option<SourceFingerprint>> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
