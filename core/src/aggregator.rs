//! Concurrent refresh of the boss dataset.
//!
//! Fan-out/fan-in over the rayon pool: one task per region fetches and
//! parses that region's metadata, then one task set over the deduplicated
//! boss-id set fetches any icon asset not already on disk. A failed region
//! degrades to empty data; a failed icon simply stays absent. Neither
//! aborts sibling tasks.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use rayon::prelude::*;
use tracing::{info, warn};

use crate::error::FetchError;
use crate::fetch::{AssetStore, Fetch};
use crate::model::{Dataset, Region, RegionData};
use crate::wire;

pub struct Aggregator {
    fetcher: Arc<dyn Fetch>,
    store: Arc<dyn AssetStore>,
    metadata_base: String,
    icon_base: String,
}

impl Aggregator {
    pub fn new(
        fetcher: Arc<dyn Fetch>,
        store: Arc<dyn AssetStore>,
        metadata_base: impl Into<String>,
        icon_base: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            store,
            metadata_base: metadata_base.into(),
            icon_base: icon_base.into(),
        }
    }

    /// Build a fresh [`Dataset`].
    ///
    /// Blocks the caller until every region task and every icon task has
    /// finished. Never fails as a whole: each region independently degrades
    /// to [`RegionData::default`] on error.
    pub fn refresh(&self) -> Dataset {
        let seen = Mutex::new(HashSet::new());

        let regions: Vec<(Region, RegionData)> = Region::ALL
            .par_iter()
            .map(|&region| {
                let data = match self.fetch_region(region) {
                    Ok(data) => data,
                    Err(error) => {
                        warn!(%region, %error, "region metadata fetch failed, using empty data");
                        RegionData::default()
                    }
                };
                if let Ok(mut ids) = seen.lock() {
                    ids.extend(data.roster.ids.iter().copied());
                }
                (region, data)
            })
            .collect();

        let ids: Vec<u64> = seen.into_inner().unwrap_or_default().into_iter().collect();
        ids.par_iter().for_each(|&id| self.fetch_icon(id));

        Dataset {
            regions: regions.into_iter().collect(),
        }
    }

    fn fetch_region(&self, region: Region) -> Result<RegionData, FetchError> {
        let url = format!(
            "{}/api/Quest/GetClanBattleInfos?s={}",
            self.metadata_base, region
        );
        let body = self.fetcher.get(&url)?;
        wire::parse_clan_battle(&body).map_err(|source| FetchError::Malformed { url, source })
    }

    /// Fetch and persist one icon asset unless it is already stored.
    /// Missing icons are tolerated downstream as "no drawable icon".
    fn fetch_icon(&self, id: u64) {
        if self.store.exists(id) {
            return;
        }
        let url = format!("{}/icon/unit/{:06}.png", self.icon_base, id);
        match self.fetcher.get(&url) {
            Ok(bytes) => {
                info!(id, size = bytes.len(), "fetched icon asset");
                if let Err(error) = self.store.write(id, &bytes) {
                    warn!(id, %error, "failed to persist icon asset");
                }
            }
            Err(error) => warn!(id, %error, "icon fetch failed, asset stays absent"),
        }
    }
}
