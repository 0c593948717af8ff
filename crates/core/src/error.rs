//! Error taxonomy for the demo pipeline.
//!
//! Initialization failures are fatal: the binary reports them and exits,
//! there is no retry path. The steady-state frame loop can only fail on the
//! flip-completion watchdog.

use crate::surface::SurfaceError;
use thiserror::Error;

/// Fatal setup errors (surface creation, asset intake, bad geometry).
#[derive(Debug, Error)]
pub enum InitError {
    #[error("cannot allocate {what} surface ({width}x{height})")]
    SurfaceAlloc {
        what: &'static str,
        width: u32,
        height: u32,
        #[source]
        source: SurfaceError,
    },

    #[error("cannot load {name} bitmap: {reason}")]
    AssetLoad { name: &'static str, reason: String },

    #[error("mesh has zero extent on an axis; cannot derive texture coordinates")]
    DegenerateMesh,
}

/// Errors from the per-frame update/flip protocol.
#[derive(Debug, Error)]
pub enum PresentError {
    /// The display backend never reported the previous flip as complete.
    #[error("flip completion not reported within {waited_ms} ms")]
    FlipTimeout { waited_ms: u64 },

    #[error("display backend failure: {0}")]
    Backend(String),
}
