//! Logging bootstrap.
//!
//! Compact stdout subscriber filtered through `RUST_LOG`; defaults to
//! `info` when the variable is unset or unparsable. Call once, first thing
//! in `main`.

use tracing_subscriber::{
    EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().compact())
        .init();
}
