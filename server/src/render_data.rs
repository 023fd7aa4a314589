//! Translation of a live status payload plus the current dataset into the
//! inputs the panel engine draws from.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use clanpanel_core::{BOSS_SLOTS, LAP_UNBOUNDED, ProgressValue, RegionData, phase_of};

/// Battle status supplied by the `/progress` caller's `data` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusQuery {
    pub lap: i64,
    pub lap_flags: [bool; BOSS_SLOTS],
    pub boss_hps: [u64; BOSS_SLOTS],
}

/// Everything a single `/progress` render pass needs, fully resolved before
/// the job is submitted so the engine closure captures plain data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderInputs {
    pub phase: usize,
    pub lap: u64,
    pub lap_flags: [bool; BOSS_SLOTS],
    /// `[event countdown, lap range]` bars for the panel header.
    pub totals: [ProgressValue; 2],
    pub bosses: [ProgressValue; BOSS_SLOTS],
}

/// The region has no usable event data (empty roster or truncated phases).
#[derive(Debug, Error)]
#[error("no event data available for the selected region")]
pub struct NoEventData;

/// Resolve the phase and all bar values for one render pass.
///
/// `now` is epoch seconds; the event countdown floors at zero once the
/// window has closed. The final (sentinel) phase maps the lap bar to the
/// uncapped marker so the renderer takes the "∞" path instead of dividing.
pub fn prepare_render_inputs(
    status: &StatusQuery,
    data: &RegionData,
    now: i64,
) -> Result<RenderInputs, NoEventData> {
    let phase = phase_of(&data.lap_ranges, status.lap);
    let range = *data.lap_ranges.get(phase).ok_or(NoEventData)?;
    let full_hp = data.roster.phase_hp.get(phase).ok_or(NoEventData)?;
    if full_hp.len() < BOSS_SLOTS {
        return Err(NoEventData);
    }

    let mut bosses = [ProgressValue::default(); BOSS_SLOTS];
    for (slot, value) in bosses.iter_mut().enumerate() {
        *value = ProgressValue::new(status.boss_hps[slot], full_hp[slot]);
    }

    let window = data.window;
    let event = ProgressValue::new(
        (window.end - now).max(0) as u64,
        (window.end - window.start).max(0) as u64,
    );

    let laps = if range.to == LAP_UNBOUNDED {
        ProgressValue::new(0, 0)
    } else {
        ProgressValue::new(
            (range.to - status.lap + 1).max(0) as u64,
            (range.to - range.from + 1).max(0) as u64,
        )
    };

    Ok(RenderInputs {
        phase,
        lap: status.lap.max(0) as u64,
        lap_flags: status.lap_flags,
        totals: [event, laps],
        bosses,
    })
}
