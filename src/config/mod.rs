pub mod actions;
pub mod key;
pub mod keybindings;
pub mod loader;
pub mod resolver;

use std::path::PathBuf;
use std::time::Duration;

pub use actions::*;
use keybindings::KeybindingsConfig;
pub use loader::load;
pub use resolver::KeyResolver;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "Catppuccin Mocha".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// How long a notification stays visible.
    pub duration_ms: u64,
    pub max_visible: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            duration_ms: 4000,
            max_visible: 3,
        }
    }
}

impl NotificationConfig {
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Snapshot file. Defaults to `watchlog/library.json` in the data directory.
    pub data_file: Option<PathBuf>,
}

impl StorageConfig {
    pub fn resolve_data_file(&self) -> Option<PathBuf> {
        self.data_file.clone().or_else(|| {
            dirs::data_local_dir().map(|dir| dir.join("watchlog").join("library.json"))
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    pub cache_ttl_hours: u32,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            cache_ttl_hours: 24 * 7,
        }
    }
}

impl MetadataConfig {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.cache_ttl_hours))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    /// Page opened on startup, e.g. `library` or `friends`.
    #[serde(default)]
    pub start_page: Option<String>,
}
