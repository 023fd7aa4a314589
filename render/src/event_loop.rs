//! The engine thread's event loop.

use std::sync::mpsc;

use tracing::{debug, error, info};

use crate::engine::PanelEngine;
use crate::queue::EngineEvent;

/// Drain events until a quit request or a disconnected queue.
///
/// Each job runs to completion before the next is taken; its result slot is
/// resolved with a snapshot on success or the operation's error on failure.
/// A dropped receiver (caller gave up waiting) is logged and ignored.
pub fn run_event_loop(engine: &mut PanelEngine, events: &mpsc::Receiver<EngineEvent>) {
    loop {
        match events.recv() {
            Ok(EngineEvent::Job(job)) => {
                let outcome = (job.op)(engine).map(|()| engine.snapshot());
                if job.reply.send(outcome).is_err() {
                    debug!("render job caller went away before the result resolved");
                }
            }
            Ok(EngineEvent::Quit) => {
                info!("panel engine shutting down");
                return;
            }
            Err(_) => {
                error!("all engine handles dropped without a quit event");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use tokio::sync::oneshot;

    use super::*;
    use crate::engine::{EngineConfig, PanelEngine};
    use crate::error::RenderError;
    use crate::queue::{EngineEvent, RenderJob};

    #[test]
    fn loop_exits_when_all_senders_drop() {
        let mut engine = PanelEngine::new(EngineConfig::default()).unwrap();
        let (tx, rx) = mpsc::channel::<EngineEvent>();

        let (reply, slot) = oneshot::channel();
        tx.send(EngineEvent::Job(RenderJob {
            op: Box::new(|engine: &mut PanelEngine| {
                engine.prepare(&[0; 5]);
                Ok(())
            }),
            reply,
        }))
        .unwrap();
        drop(tx);

        run_event_loop(&mut engine, &rx);
        assert!(slot.blocking_recv().unwrap().is_ok());
    }

    #[test]
    fn errors_resolve_the_slot_and_the_loop_continues() {
        let mut engine = PanelEngine::new(EngineConfig::default()).unwrap();
        let (tx, rx) = mpsc::channel::<EngineEvent>();

        let (bad_reply, bad_slot) = oneshot::channel();
        tx.send(EngineEvent::Job(RenderJob {
            op: Box::new(|engine: &mut PanelEngine| engine.refresh_background(0)),
            reply: bad_reply,
        }))
        .unwrap();

        let (good_reply, good_slot) = oneshot::channel();
        tx.send(EngineEvent::Job(RenderJob {
            op: Box::new(|engine: &mut PanelEngine| {
                engine.prepare(&[0; 5]);
                Ok(())
            }),
            reply: good_reply,
        }))
        .unwrap();
        tx.send(EngineEvent::Quit).unwrap();

        run_event_loop(&mut engine, &rx);

        assert!(matches!(
            bad_slot.blocking_recv().unwrap(),
            Err(RenderError::PanelNotPrepared)
        ));
        assert!(good_slot.blocking_recv().unwrap().is_ok());
    }

    #[test]
    fn dropped_caller_does_not_stop_the_loop() {
        let mut engine = PanelEngine::new(EngineConfig::default()).unwrap();
        let (tx, rx) = mpsc::channel::<EngineEvent>();

        let (reply, slot) = oneshot::channel();
        drop(slot);
        tx.send(EngineEvent::Job(RenderJob {
            op: Box::new(|engine: &mut PanelEngine| {
                engine.prepare(&[0; 5]);
                Ok(())
            }),
            reply,
        }))
        .unwrap();

        let (reply, live_slot) = oneshot::channel();
        tx.send(EngineEvent::Job(RenderJob {
            op: Box::new(|_: &mut PanelEngine| Ok(())),
            reply,
        }))
        .unwrap();
        tx.send(EngineEvent::Quit).unwrap();

        run_event_loop(&mut engine, &rx);
        assert!(live_slot.blocking_recv().unwrap().is_ok());
    }
}
