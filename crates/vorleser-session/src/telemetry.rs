// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Logging setup for hosts embedding Vorleser.

use tracing_subscriber::EnvFilter;
use vorleser_core::error::{Result, VorleserError};

/// Install a `fmt` subscriber filtered by `RUST_LOG`, or by
/// `default_directive` (e.g. `"info"`) when the variable is unset or invalid.
///
/// Fails if a global subscriber is already installed.
pub fn init(default_directive: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| VorleserError::Config(format!("failed to install tracing subscriber: {err}")))?;

    tracing::info!("Vorleser logging initialised");
    Ok(())
}
