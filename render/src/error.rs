//! Error types for the rendering subsystem.

use thiserror::Error;

/// Failures inside the engine or while standing it up.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A refresh operation ran before `prepare` composited a panel. This is
    /// a programming error in the integration, not a runtime condition to
    /// recover from; it still travels through the job's result slot so the
    /// caller never blocks forever.
    #[error("panel has not been prepared")]
    PanelNotPrepared,

    #[error("could not allocate a {width}x{height} panel surface")]
    SurfaceAlloc { width: u32, height: u32 },

    #[error("failed to start the engine thread")]
    EngineStart(#[source] std::io::Error),

    /// The engine thread's factory failed before entering the event loop.
    #[error("engine construction failed: {0}")]
    EngineInit(String),
}

/// A job could not be enqueued (the engine thread is not running). Surfaced
/// synchronously by `submit`; the caller must not wait on a result slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("render engine is not running")]
pub struct DispatchError;

/// Snapshot could not be serialized to PNG.
#[derive(Debug, Error)]
#[error("failed to encode panel snapshot as PNG")]
pub struct PngError(#[from] png::EncodingError);
