use std::path::{Path, PathBuf};

use color_eyre::eyre::WrapErr;
use tracing::debug;

use crate::config::AppConfig;

const CONFIG_DIR: &str = "watchlog";
const CONFIG_FILE: &str = "config.toml";

pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(CONFIG_DIR))
}

pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join(CONFIG_FILE))
}

/// Loads the user's configuration, falling back to defaults when no file exists.
pub fn load() -> color_eyre::Result<AppConfig> {
    let Some(path) = config_path() else {
        debug!("No config directory found, using defaults");
        return Ok(AppConfig::default());
    };
    load_from(&path)
}

pub fn load_from(path: &Path) -> color_eyre::Result<AppConfig> {
    if !path.exists() {
        debug!("Config file not found at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    let config: AppConfig =
        toml::from_str(&content).wrap_err_with(|| format!("Invalid config in {}", path.display()))?;
    debug!("Loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.notifications.duration_ms, 4000);
        assert_eq!(config.notifications.max_visible, 3);
    }

    #[test]
    fn reads_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            start_page = "friends"

            [theme]
            name = "Catppuccin Latte"

            [notifications]
            duration_ms = 2500

            [storage]
            data_file = "/tmp/watchlog.json"

            [metadata]
            cache_ttl_hours = 12
            "#,
        )
        .unwrap();

        let config = load_from(&path).unwrap();
        assert_eq!(config.start_page.as_deref(), Some("friends"));
        assert_eq!(config.theme.name, "Catppuccin Latte");
        assert_eq!(config.notifications.duration_ms, 2500);
        assert_eq!(config.notifications.max_visible, 3);
        assert_eq!(
            config.storage.data_file,
            Some(PathBuf::from("/tmp/watchlog.json"))
        );
        assert_eq!(config.metadata.cache_ttl_hours, 12);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[notifications\nduration_ms = ").unwrap();
        assert!(load_from(&path).is_err());
    }
}
