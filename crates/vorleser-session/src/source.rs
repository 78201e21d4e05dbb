// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Uploaded source documents and their persistence across refresh cycles.

use std::sync::Arc;

use tracing::info;
use vorleser_core::config::ExtractionConfig;
use vorleser_core::error::{Result, VorleserError};
use vorleser_core::types::{OcrParams, SourceFingerprint, SourceKind};

/// An uploaded document: its bytes plus the metadata used to fingerprint it.
///
/// Bytes are shared, so cloning a source is cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    name: String,
    bytes: Arc<[u8]>,
    kind: SourceKind,
}

impl SourceDocument {
    /// Wrap an upload, inferring its kind from the file name's extension.
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Result<Self> {
        let name = name.into();
        let kind = SourceKind::from_file_name(&name)
            .ok_or_else(|| VorleserError::UnsupportedSource(name.clone()))?;
        Ok(Self::with_kind(name, bytes, kind))
    }

    pub fn with_kind(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>, kind: SourceKind) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Shared handle to the bytes, for moving into blocking tasks.
    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn fingerprint(&self, params: OcrParams, config: &ExtractionConfig) -> SourceFingerprint {
        SourceFingerprint::new(self.name.clone(), self.size(), self.kind, params, config)
    }

    /// Same upload as `other`, judged by name and size.
    pub fn same_upload(&self, other: &Self) -> bool {
        self.name == other.name && self.size() == other.size()
    }
}

/// Keeps the last upload alive while the upload widget reports nothing.
///
/// Hosts call [`observe`](Self::observe) on every refresh with whatever the
/// widget currently holds; only an explicit [`reset`](Self::reset) forgets
/// the source.
#[derive(Debug, Default)]
pub struct SourceStore {
    current: Option<SourceDocument>,
}

impl SourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record what the upload widget reports and return the effective source.
    ///
    /// `Some` replaces the stored source, `None` keeps it.
    pub fn observe(&mut self, upload: Option<SourceDocument>) -> Option<&SourceDocument> {
        if let Some(upload) = upload {
            let replaced = self
                .current
                .as_ref()
                .is_some_and(|current| !current.same_upload(&upload));
            info!(name = upload.name(), size = upload.size(), replaced, "Source stored");
            self.current = Some(upload);
        }
        self.current.as_ref()
    }

    pub fn current(&self) -> Option<&SourceDocument> {
        self.current.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    /// Forget the stored source.
    pub fn reset(&mut self) -> Option<SourceDocument> {
        self.current.take()
    }
}
