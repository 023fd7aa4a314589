//! Clanpanel core: boss-battle event data model and refresh pipeline.
//!
//! This crate owns everything that is *not* drawing: the immutable
//! [`Dataset`] snapshot of every region's roster/phase/schedule data, the
//! [`DatasetCell`] that lets HTTP handlers read the latest snapshot while a
//! refresh publishes a new one, and the [`Aggregator`] that fans out over
//! regions and icon assets to build a fresh snapshot.

pub mod aggregator;
pub mod dataset;
pub mod error;
pub mod fetch;
pub mod model;
pub mod wire;

pub use aggregator::Aggregator;
pub use dataset::DatasetCell;
pub use error::{FetchError, ParseError};
pub use fetch::{AssetStore, DiskStore, Fetch, HttpFetcher};
pub use model::{
    BOSS_SLOTS, BossRoster, Dataset, EventWindow, LAP_UNBOUNDED, LapRange, ProgressValue, Region,
    RegionData, phase_of,
};
