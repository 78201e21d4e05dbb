// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Speech synthesis — the gateway to the external text-to-speech service and
// the async service wrapping it.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::{info, instrument};
use vorleser_core::error::{Result, VorleserError};
use vorleser_core::types::AudioArtifact;

use crate::flight::SingleFlight;

/// Request/response access to a text-to-speech service.
///
/// Implementations may block (network I/O); [`SpeechService`] calls them on
/// the blocking pool.
pub trait SynthesisGateway: Send + Sync {
    /// MP3 audio of `text` spoken with `voice_id`.
    fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>>;
}

/// Async front end for a [`SynthesisGateway`].
pub struct SpeechService {
    gateway: Arc<dyn SynthesisGateway>,
    flights: SingleFlight<String, Arc<Vec<u8>>>,
}

impl SpeechService {
    pub fn new(gateway: impl SynthesisGateway + 'static) -> Self {
        Self::from_shared(Arc::new(gateway))
    }

    pub fn from_shared(gateway: Arc<dyn SynthesisGateway>) -> Self {
        Self {
            gateway,
            flights: SingleFlight::new(),
        }
    }

    /// Synthesise `text` with `voice_id`.
    ///
    /// Blank text is rejected before the gateway is called. Identical
    /// concurrent requests share one gateway call.
    #[instrument(skip(self, text), fields(chars = text.chars().count()))]
    pub async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>> {
        if text.trim().is_empty() {
            return Err(VorleserError::Synthesis("no text to synthesize".into()));
        }

        let gateway = Arc::clone(&self.gateway);
        let owned_text = text.to_owned();
        let owned_voice = voice_id.to_owned();
        let audio = self
            .flights
            .run(request_key(voice_id, text), move || async move {
                tokio::task::spawn_blocking(move || gateway.synthesize(&owned_text, &owned_voice))
                    .await
                    .map_err(|err| VorleserError::Synthesis(format!("synthesis task failed: {err}")))?
                    .map(Arc::new)
            })
            .await?;

        info!(bytes = audio.len(), "Speech synthesised");
        Ok(audio.as_ref().clone())
    }

    /// Synthesise `text` and package it as an MP3 named after `source_name`.
    pub async fn render(&self, source_name: &str, text: &str, voice_id: &str) -> Result<AudioArtifact> {
        let bytes = self.synthesize(text, voice_id).await?;
        Ok(AudioArtifact::for_source(source_name, bytes))
    }
}

/// SHA-256 over the voice id and text, hex-encoded.
fn request_key(voice_id: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(voice_id.as_bytes());
    // Separator so ("ab", "c") and ("a", "bc") hash differently.
    hasher.update([0u8]);
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}
