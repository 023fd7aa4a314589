//! Data model for the clan-battle event.
//!
//! Everything here is plain data. A [`Dataset`] is immutable once built;
//! a refresh produces a brand-new value and publishes it through
//! [`crate::DatasetCell`], so readers holding an old `Arc<Dataset>` are
//! never affected by a concurrent refresh.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of boss slots per phase-cycle.
pub const BOSS_SLOTS: usize = 5;

/// Sentinel upper bound on the final lap range: any lap beyond all finite
/// ranges still maps to the final phase.
pub const LAP_UNBOUNDED: i64 = 999;

/// One server population the event runs independently for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Cn,
    Tw,
    Jp,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::Cn, Region::Tw, Region::Jp];

    pub fn as_str(self) -> &'static str {
        match self {
            Region::Cn => "cn",
            Region::Tw => "tw",
            Region::Jp => "jp",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A current/total pair driving bars and countdowns.
///
/// A `total` of zero marks an uncapped quantity; consumers render it as the
/// "∞" path rather than dividing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressValue {
    pub current: u64,
    pub total: u64,
}

impl ProgressValue {
    pub fn new(current: u64, total: u64) -> Self {
        Self { current, total }
    }

    /// True when the total is the "uncapped" marker.
    pub fn is_unbounded(self) -> bool {
        self.total == 0
    }

    /// Fraction of the bar that is filled (`current / total`), 0 when
    /// unbounded.
    pub fn filled_fraction(self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.current.min(self.total) as f32 / self.total as f32
        }
    }

    /// Fraction of the bar left to cover (`(total - current) / total`),
    /// 0 when unbounded.
    pub fn remainder_fraction(self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.total.saturating_sub(self.current) as f32 / self.total as f32
        }
    }
}

/// Inclusive lap interval for one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LapRange {
    pub from: i64,
    pub to: i64,
}

impl LapRange {
    pub fn contains(self, lap: i64) -> bool {
        lap >= self.from && lap <= self.to
    }
}

/// Event schedule as epoch seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventWindow {
    pub start: i64,
    pub end: i64,
}

/// Boss lineup for one region: one entry per slot, plus per-phase full-HP
/// rows (`phase_hp[phase][slot]`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossRoster {
    pub ids: Vec<u64>,
    pub names: Vec<String>,
    pub phase_hp: Vec<Vec<u64>>,
}

/// Everything known about one region's current event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionData {
    pub roster: BossRoster,
    pub lap_ranges: Vec<LapRange>,
    pub window: EventWindow,
}

impl RegionData {
    /// A failed or absent region fetch degrades to empty data.
    pub fn is_empty(&self) -> bool {
        self.roster.ids.is_empty()
    }
}

/// The aggregate snapshot of all regions. Built by
/// [`crate::Aggregator::refresh`], never mutated in place.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub regions: HashMap<Region, RegionData>,
}

impl Dataset {
    pub fn region(&self, region: Region) -> Option<&RegionData> {
        self.regions.get(&region)
    }
}

/// Index of the phase containing `lap`.
///
/// Linear scan; a lap beyond every finite range clamps to the final phase
/// (whose upper bound is [`LAP_UNBOUNDED`] by construction). Pure, safe to
/// call concurrently.
pub fn phase_of(ranges: &[LapRange], lap: i64) -> usize {
    ranges
        .iter()
        .position(|r| r.contains(lap))
        .unwrap_or(ranges.len().saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges() -> Vec<LapRange> {
        vec![
            LapRange { from: 0, to: 10 },
            LapRange { from: 11, to: LAP_UNBOUNDED },
        ]
    }

    #[test]
    fn phase_of_first_range() {
        let r = ranges();
        assert_eq!(phase_of(&r, 0), 0);
        assert_eq!(phase_of(&r, 10), 0);
    }

    #[test]
    fn phase_of_final_range_and_sentinel() {
        let r = ranges();
        assert_eq!(phase_of(&r, 11), 1);
        assert_eq!(phase_of(&r, LAP_UNBOUNDED), 1);
        // Laps beyond every finite bound still land on the final phase.
        assert_eq!(phase_of(&r, 1_000_000), 1);
    }

    #[test]
    fn phase_of_gap_clamps_to_last() {
        let r = vec![LapRange { from: 1, to: 3 }, LapRange { from: 4, to: 6 }];
        assert_eq!(phase_of(&r, 50), 1);
    }

    #[test]
    fn phase_of_empty_ranges() {
        assert_eq!(phase_of(&[], 7), 0);
    }

    #[test]
    fn progress_fractions() {
        let p = ProgressValue::new(30, 100);
        assert!((p.filled_fraction() - 0.3).abs() < f32::EPSILON);
        assert!((p.remainder_fraction() - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn progress_unbounded_never_divides() {
        let p = ProgressValue::new(0, 0);
        assert!(p.is_unbounded());
        assert_eq!(p.filled_fraction(), 0.0);
        assert_eq!(p.remainder_fraction(), 0.0);
    }

    #[test]
    fn progress_overfull_clamps() {
        let p = ProgressValue::new(150, 100);
        assert_eq!(p.filled_fraction(), 1.0);
        assert_eq!(p.remainder_fraction(), 0.0);
    }
}
