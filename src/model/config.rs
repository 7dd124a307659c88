use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULTS: &str = include_str!("../../config/default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub registry: RegistryConfig,
    pub view: ViewConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Serve the bundled fixture list instead of calling the registry.
    pub use_fixture_data: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewConfig {
    pub items_per_page: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    pub level: String,
}

impl AppConfig {
    /// Load configuration with layering: defaults → user config.
    pub fn load() -> Result<Self> {
        Self::load_from(user_config_path().as_deref())
    }

    /// Load the built-in defaults, overlaying the file at `user_path` if it exists.
    pub fn load_from(user_path: Option<&Path>) -> Result<Self> {
        let mut merged: toml::Value = toml::from_str(DEFAULTS).context("built-in defaults")?;

        if let Some(path) = user_path
            && path.exists()
        {
            let user_str = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let overlay: toml::Value = toml::from_str(&user_str)
                .with_context(|| format!("parsing {}", path.display()))?;
            merge_values(&mut merged, overlay);
        }

        let config: AppConfig = merged.try_into().context("invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.view.items_per_page == 0 {
            bail!("view.items_per_page must be at least 1");
        }
        if self.registry.base_url.trim().is_empty() {
            bail!("registry.base_url must not be empty");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.registry.timeout_secs)
    }
}

pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "yoapi-plugins")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Tables merge key by key; any other value in `overlay` replaces the base.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_load_without_user_file() {
        let config = AppConfig::load_from(None).unwrap();
        assert_eq!(config.view.items_per_page, 12);
        assert_eq!(config.registry.timeout_secs, 10);
        assert!(!config.registry.use_fixture_data);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn missing_user_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(Some(&dir.path().join("nope.toml"))).unwrap();
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn user_file_overrides_only_given_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "[registry]\nuse_fixture_data = true\n").unwrap();

        let config = AppConfig::load_from(Some(&path)).unwrap();
        assert!(config.registry.use_fixture_data);
        assert_eq!(config.registry.base_url, "https://registry.yoapi.dev");
        assert_eq!(config.view.items_per_page, 12);
    }

    #[test]
    fn zero_items_per_page_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[view]\nitems_per_page = 0\n").unwrap();

        let err = AppConfig::load_from(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("items_per_page"));
    }

    #[test]
    fn blank_base_url_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[registry]\nbase_url = \"  \"\n").unwrap();

        let err = AppConfig::load_from(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn malformed_user_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[registry\n").unwrap();

        assert!(AppConfig::load_from(Some(&path)).is_err());
    }
}
