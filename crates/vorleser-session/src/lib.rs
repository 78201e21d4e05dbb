// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// vorleser-session — The editing session and the async services around it.
//
// Holds the paginated document being edited, persists the uploaded source
// across refresh cycles, coordinates extraction (memo cache, single-flight,
// supersession), and fronts the speech service.

pub mod extraction;
pub mod flight;
pub mod session;
pub mod source;
pub mod synthesis;
pub mod telemetry;
pub mod workspace;

pub use extraction::{Extraction, ExtractionCache, ExtractionCoordinator};
pub use flight::SingleFlight;
pub use session::DocumentSession;
pub use source::{SourceDocument, SourceStore};
pub use synthesis::{SpeechService, SynthesisGateway};
pub use workspace::{ApplyOutcome, Workspace};
