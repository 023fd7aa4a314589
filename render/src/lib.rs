//! Clanpanel rendering: the single-threaded panel engine and the channel
//! discipline that feeds it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  queue / event_loop                 │
//! │   EngineHandle::submit ──mpsc──▶ dedicated thread   │
//! │        (oneshot result slot per RenderJob)          │
//! ├─────────────────────────────────────────────────────┤
//! │                      engine                         │
//! │     PanelEngine: Idle ⇄ PanelReady state machine    │
//! │   (prepare, refresh_*, snapshot — engine thread     │
//! │                      only)                          │
//! ├─────────────────────────────────────────────────────┤
//! │                      raster                         │
//! │              tiny-skia + cosmic-text                │
//! │                (drawing primitives)                 │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! All graphics state lives on one dedicated thread; every operation that
//! touches it is submitted as a [`queue::RenderJob`] and observed through a
//! typed result slot.

pub mod colors;
pub mod engine;
pub mod error;
pub mod event_loop;
pub mod queue;
pub mod raster;
pub mod snapshot;

pub use engine::{EngineConfig, PanelEngine};
pub use error::{DispatchError, PngError, RenderError};
pub use event_loop::run_event_loop;
pub use queue::{EngineEvent, EngineHandle, JobOutcome, RenderJob, spawn_engine};
pub use raster::Raster;
pub use snapshot::{Snapshot, encode_png};
