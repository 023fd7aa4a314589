//! First-run environment preparation: asset directories, fallback icon,
//! panel font. Every failure here degrades (system fonts, blank icon slot)
//! instead of aborting startup.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use clanpanel_core::Fetch;

use crate::config::{AppConfig, FALLBACK_ICON_FILE};

pub fn init_assets(config: &AppConfig, fetcher: &dyn Fetch) {
    for dir in [&config.icon_dir, &config.font_dir] {
        if let Err(error) = fs::create_dir_all(dir) {
            warn!(dir = %dir.display(), %error, "could not create asset directory");
        }
    }

    let icon_path = config.fallback_icon_path();
    if !icon_path.exists() {
        let url = format!("{}/icon/unit/{}", config.icon_base, FALLBACK_ICON_FILE);
        download(fetcher, &url, &icon_path);
    }

    let font_path = config.font_path();
    if !font_path.exists() {
        download(fetcher, &config.font_url, &font_path);
    }
}

fn download(fetcher: &dyn Fetch, url: &str, dest: &Path) {
    match fetcher.get(url) {
        Ok(bytes) => {
            info!(url, dest = %dest.display(), size = bytes.len(), "downloaded asset");
            if let Err(error) = fs::write(dest, &bytes) {
                warn!(dest = %dest.display(), %error, "could not save asset");
            }
        }
        Err(error) => warn!(url, %error, "asset download failed, continuing without it"),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Mutex;

    use clanpanel_core::FetchError;

    use super::*;

    struct CountingFetch {
        requests: Mutex<Vec<String>>,
    }

    impl Fetch for CountingFetch {
        fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            Ok(b"asset bytes".to_vec())
        }
    }

    fn test_config(root: &Path) -> AppConfig {
        AppConfig {
            icon_dir: root.join("icon"),
            font_dir: root.join("font"),
            ..AppConfig::default()
        }
    }

    #[test]
    fn downloads_once_then_reuses_existing_files() {
        let root =
            std::env::temp_dir().join(format!("clanpanel-bootstrap-{}", std::process::id()));
        let config = test_config(&root);
        let fetch = CountingFetch {
            requests: Mutex::new(Vec::new()),
        };

        init_assets(&config, &fetch);
        assert!(config.fallback_icon_path().is_file());
        assert!(config.font_path().is_file());
        assert_eq!(fetch.requests.lock().unwrap().len(), 2);

        // Second run finds the files on disk.
        init_assets(&config, &fetch);
        assert_eq!(fetch.requests.lock().unwrap().len(), 2);

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn failed_download_leaves_no_file() {
        struct FailFetch;
        impl Fetch for FailFetch {
            fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
                Err(FetchError::Status {
                    url: url.to_string(),
                    status: 500,
                })
            }
        }

        let root = std::env::temp_dir().join(format!(
            "clanpanel-bootstrap-fail-{}",
            std::process::id()
        ));
        let config = test_config(&root);
        init_assets(&config, &FailFetch);
        assert!(!config.fallback_icon_path().exists());
        assert_eq!(config.font_path(), PathBuf::from(&root).join("font/NotoSansSC-Regular.ttf"));
        assert!(!config.font_path().exists());

        std::fs::remove_dir_all(&root).unwrap();
    }
}
