//! Multi-producer job queue in front of the single-threaded engine.
//!
//! HTTP handlers never touch the [`PanelEngine`](crate::PanelEngine)
//! directly. They describe the work as a [`RenderJob`] and submit it through
//! a cloneable [`EngineHandle`]; the engine thread executes jobs strictly in
//! arrival order and resolves each job's one-shot result slot exactly once,
//! with either a surface snapshot or the error the operation produced.

use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use tokio::sync::oneshot;
use tracing::info;

use crate::engine::PanelEngine;
use crate::error::{DispatchError, RenderError};
use crate::event_loop::run_event_loop;
use crate::snapshot::Snapshot;

/// What a resolved result slot carries: the post-operation surface snapshot,
/// or the operation's failure.
pub type JobOutcome = Result<Snapshot, RenderError>;

/// One unit of work for the engine thread.
pub struct RenderJob {
    /// The engine operation to run. Boxed so callers can capture whatever
    /// request data the operation needs.
    pub op: Box<dyn FnOnce(&mut PanelEngine) -> Result<(), RenderError> + Send>,
    /// Result slot. The event loop resolves it exactly once per job.
    pub reply: oneshot::Sender<JobOutcome>,
}

pub enum EngineEvent {
    Job(RenderJob),
    Quit,
}

/// Cloneable producer side of the queue. Cheap to clone; every HTTP handler
/// task holds one.
#[derive(Clone)]
pub struct EngineHandle {
    events: mpsc::Sender<EngineEvent>,
}

impl EngineHandle {
    /// Enqueue an operation and return the receiver for its result slot.
    ///
    /// Fails synchronously with [`DispatchError`] when the engine thread has
    /// exited; on success the returned receiver is guaranteed to resolve.
    pub fn submit<F>(&self, op: F) -> Result<oneshot::Receiver<JobOutcome>, DispatchError>
    where
        F: FnOnce(&mut PanelEngine) -> Result<(), RenderError> + Send + 'static,
    {
        let (reply, slot) = oneshot::channel();
        let job = RenderJob {
            op: Box::new(op),
            reply,
        };
        self.events
            .send(EngineEvent::Job(job))
            .map_err(|_| DispatchError)?;
        Ok(slot)
    }

    /// Ask the engine thread to drain pending jobs and exit.
    pub fn post_quit(&self) -> Result<(), DispatchError> {
        self.events.send(EngineEvent::Quit).map_err(|_| DispatchError)
    }
}

/// Spawn the dedicated engine thread.
///
/// The engine is constructed *inside* the new thread by `factory`, since the
/// font system and surface are not meant to cross threads; a confirmation
/// channel relays construction failure back to the caller.
pub fn spawn_engine<F>(factory: F) -> Result<(EngineHandle, JoinHandle<()>), RenderError>
where
    F: FnOnce() -> Result<PanelEngine, RenderError> + Send + 'static,
{
    let (event_tx, event_rx) = mpsc::channel::<EngineEvent>();
    let (confirm_tx, confirm_rx) = mpsc::channel::<Result<(), RenderError>>();

    let join = thread::Builder::new()
        .name("panel-engine".into())
        .spawn(move || {
            let mut engine = match factory() {
                Ok(engine) => {
                    let _ = confirm_tx.send(Ok(()));
                    engine
                }
                Err(error) => {
                    let _ = confirm_tx.send(Err(error));
                    return;
                }
            };
            info!("panel engine thread started");
            run_event_loop(&mut engine, &event_rx);
        })
        .map_err(RenderError::EngineStart)?;

    match confirm_rx.recv() {
        Ok(Ok(())) => Ok((EngineHandle { events: event_tx }, join)),
        Ok(Err(error)) => Err(error),
        Err(_) => Err(RenderError::EngineInit(
            "engine thread exited before confirming startup".into(),
        )),
    }
}
