//! Wire model of the upstream clan-battle metadata payload.
//!
//! The endpoint returns the full history of clan battles for a region; only
//! the most recent entry matters. Each entry carries an ordered `phases`
//! array whose first element also defines the boss lineup for every phase
//! of that event.

use serde::Deserialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::ParseError;
use crate::model::{BossRoster, EventWindow, LAP_UNBOUNDED, LapRange, RegionData};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClanBattleInfo {
    pub phases: Vec<PhaseInfo>,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseInfo {
    pub bosses: Vec<BossInfo>,
    pub lap_from: i64,
    pub lap_to: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BossInfo {
    pub unit_id: u64,
    pub name: String,
    pub hp: u64,
}

fn to_epoch_seconds(value: &str) -> Result<i64, ParseError> {
    OffsetDateTime::parse(value, &Rfc3339)
        .map(|t| t.unix_timestamp())
        .map_err(|_| ParseError::Timestamp {
            value: value.to_string(),
        })
}

/// Decode one region's payload into [`RegionData`].
///
/// Takes the last (most recent) clan-battle entry; the final lap range's
/// upper bound is overwritten with [`LAP_UNBOUNDED`] so every lap maps to
/// some phase.
pub fn parse_clan_battle(body: &[u8]) -> Result<RegionData, ParseError> {
    let infos: Vec<ClanBattleInfo> = serde_json::from_slice(body)?;
    let last = infos.last().ok_or(ParseError::Empty)?;
    let first_phase = last.phases.first().ok_or(ParseError::NoPhases)?;

    let mut roster = BossRoster {
        ids: first_phase.bosses.iter().map(|b| b.unit_id).collect(),
        names: first_phase.bosses.iter().map(|b| b.name.clone()).collect(),
        phase_hp: Vec::with_capacity(last.phases.len()),
    };
    let mut lap_ranges = Vec::with_capacity(last.phases.len());
    for phase in &last.phases {
        roster
            .phase_hp
            .push(phase.bosses.iter().map(|b| b.hp).collect());
        lap_ranges.push(LapRange {
            from: phase.lap_from,
            to: phase.lap_to,
        });
    }
    if let Some(last_range) = lap_ranges.last_mut() {
        last_range.to = LAP_UNBOUNDED;
    }

    Ok(RegionData {
        roster,
        lap_ranges,
        window: EventWindow {
            start: to_epoch_seconds(&last.start_time)?,
            end: to_epoch_seconds(&last.end_time)?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two entries; the parser must pick the later one.
    fn sample_payload() -> Vec<u8> {
        serde_json::json!([
            {
                "phases": [
                    {
                        "bosses": [
                            {"unitId": 100, "name": "Old Boss", "hp": 1}
                        ],
                        "lapFrom": 1,
                        "lapTo": 1
                    }
                ],
                "startTime": "2023-01-01T05:00:00+08:00",
                "endTime": "2023-01-05T23:59:59+08:00"
            },
            {
                "phases": [
                    {
                        "bosses": [
                            {"unitId": 1000, "name": "Wyvern", "hp": 6_000_000},
                            {"unitId": 1001, "name": "Basilisk", "hp": 8_000_000},
                            {"unitId": 1002, "name": "Chimera", "hp": 10_000_000},
                            {"unitId": 1003, "name": "Hydra", "hp": 12_000_000},
                            {"unitId": 1004, "name": "Leviathan", "hp": 15_000_000}
                        ],
                        "lapFrom": 1,
                        "lapTo": 6
                    },
                    {
                        "bosses": [
                            {"unitId": 1000, "name": "Wyvern", "hp": 12_000_000},
                            {"unitId": 1001, "name": "Basilisk", "hp": 14_000_000},
                            {"unitId": 1002, "name": "Chimera", "hp": 17_000_000},
                            {"unitId": 1003, "name": "Hydra", "hp": 19_000_000},
                            {"unitId": 1004, "name": "Leviathan", "hp": 22_000_000}
                        ],
                        "lapFrom": 7,
                        "lapTo": 30
                    }
                ],
                "startTime": "2024-05-01T05:00:00+08:00",
                "endTime": "2024-05-05T23:59:59+08:00"
            }
        ])
        .to_string()
        .into_bytes()
    }

    #[test]
    fn parses_latest_entry() {
        let data = parse_clan_battle(&sample_payload()).unwrap();
        assert_eq!(data.roster.ids, vec![1000, 1001, 1002, 1003, 1004]);
        assert_eq!(data.roster.names[0], "Wyvern");
        assert_eq!(data.roster.phase_hp.len(), 2);
        assert_eq!(data.roster.phase_hp[1][4], 22_000_000);
    }

    #[test]
    fn sentinels_final_lap_range() {
        let data = parse_clan_battle(&sample_payload()).unwrap();
        assert_eq!(data.lap_ranges[0], LapRange { from: 1, to: 6 });
        assert_eq!(data.lap_ranges[1], LapRange { from: 7, to: LAP_UNBOUNDED });
    }

    #[test]
    fn converts_timestamps_to_epoch_seconds() {
        let data = parse_clan_battle(&sample_payload()).unwrap();
        // 2024-05-01T05:00:00+08:00 == 2024-04-30T21:00:00Z
        assert_eq!(data.window.start, 1_714_510_800);
        assert!(data.window.end > data.window.start);
    }

    #[test]
    fn rejects_empty_history() {
        assert!(matches!(parse_clan_battle(b"[]"), Err(ParseError::Empty)));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            parse_clan_battle(b"not json"),
            Err(ParseError::Json(_))
        ));
    }
}
