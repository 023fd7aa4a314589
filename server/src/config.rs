//! Application configuration: a confy-backed TOML file with CLI overrides.

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

use clanpanel_core::Region;

const APP_NAME: &str = "clanpanel";

pub const FALLBACK_ICON_FILE: &str = "000000.png";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// The region whose panel this instance serves.
    pub region: Region,
    pub metadata_base: String,
    pub icon_base: String,
    pub icon_dir: PathBuf,
    pub font_dir: PathBuf,
    pub font_file: String,
    /// Where the panel font is downloaded from on first run.
    pub font_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 9540,
            region: Region::Cn,
            metadata_base: "https://pcr.satroki.tech".into(),
            icon_base: "https://redive.estertion.win".into(),
            icon_dir: PathBuf::from("icon"),
            font_dir: PathBuf::from("font"),
            font_file: "NotoSansSC-Regular.ttf".into(),
            font_url:
                "https://github.com/jsntn/webfonts/raw/refs/heads/master/NotoSansSC-Regular.ttf"
                    .into(),
        }
    }
}

impl AppConfig {
    /// Load from the platform config directory, or an explicit path. An
    /// unreadable file falls back to defaults.
    pub fn load(path: Option<&Path>) -> Self {
        match path {
            Some(path) => confy::load_path(path).unwrap_or_default(),
            None => confy::load(APP_NAME, "config").unwrap_or_default(),
        }
    }

    pub fn font_path(&self) -> PathBuf {
        self.font_dir.join(&self.font_file)
    }

    pub fn fallback_icon_path(&self) -> PathBuf {
        self.icon_dir.join(FALLBACK_ICON_FILE)
    }
}

#[derive(Debug, Parser)]
#[command(version, about = "clan battle status panel server")]
pub struct Cli {
    /// Listen address override.
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port override.
    #[arg(long)]
    pub port: Option<u16>,

    /// Explicit config file instead of the platform default location.
    #[arg(long)]
    pub config_path: Option<PathBuf>,
}

impl Cli {
    pub fn into_config(self) -> AppConfig {
        let mut config = AppConfig::load(self.config_path.as_deref());
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        config
    }
}
