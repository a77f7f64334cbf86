//! Configuration loading and discovery.
//!
//! Configuration is layered from, lowest precedence first:
//! 1. Built-in defaults
//! 2. User config in the XDG config directory
//! 3. The project config closest to the working directory
//! 4. Files passed explicitly (e.g. `--config`)
//!
//! # Supported formats
//!
//! - TOML (`.toml`)
//! - YAML (`.yaml`, `.yml`)
//! - JSON (`.json`)
//!
//! # Config file locations
//! - `.changelink.<ext>` in the current directory or any parent
//! - `changelink.<ext>` in the current directory or any parent
//! - `~/.config/changelink/config.<ext>` (user config)
//!
//! The parent walk stops at a directory containing `.git`.
//!
//! # Example
//! ```toml
//! log_level = "warn"
//!
//! [link]
//! base_url = "https://www.github.com/hashicorp/vault/blob/main/CHANGELOG.md#"
//! anchor_floor = "1.4.3"
//! comparison = "lexical"
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult, LinkResult};
use crate::link::{Comparison, DEFAULT_ANCHOR_FLOOR, DEFAULT_BASE_URL, VersionLinkFormatter};

/// The configuration for changelink.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Log level for the application (e.g., "debug", "info", "warn", "error").
    pub log_level: LogLevel,
    /// Directory for JSONL log files (falls back to platform defaults if unset).
    pub log_dir: Option<Utf8PathBuf>,
    /// Link formatting overrides.
    pub link: Option<LinkConfig>,
}

impl Config {
    /// Link settings with defaults filled in for anything not configured.
    pub fn link_settings(&self) -> LinkConfig {
        self.link.clone().unwrap_or_default()
    }
}

/// Link formatting overrides.
///
/// Unset fields keep the stock behavior, so an empty `[link]` section
/// produces the same URLs as no section at all.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct LinkConfig {
    /// Changelog URL ending in `#` (default: the Vault changelog).
    pub base_url: Option<String>,
    /// Oldest dotted version that gets an anchor (default: `1.4.3`).
    pub anchor_floor: Option<String>,
    /// Comparison mode (`"lexical"` or `"numeric"`, default: lexical).
    pub comparison: Option<Comparison>,
}

impl LinkConfig {
    /// Effective base URL.
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Effective anchor floor.
    pub fn anchor_floor(&self) -> &str {
        self.anchor_floor.as_deref().unwrap_or(DEFAULT_ANCHOR_FLOOR)
    }

    /// Effective comparison mode.
    pub fn comparison(&self) -> Comparison {
        self.comparison.unwrap_or_default()
    }

    /// Build a formatter from these settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `anchor_floor` is not a valid version for the
    /// selected comparison mode.
    pub fn formatter(&self) -> LinkResult<VersionLinkFormatter> {
        VersionLinkFormatter::new()
            .with_base_url(self.base_url())
            .with_threshold(self.anchor_floor(), self.comparison())
    }
}

/// Log level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Verbose output for debugging and development.
    Debug,
    /// Standard operational information (default).
    #[default]
    Info,
    /// Warnings about potential issues.
    Warn,
    /// Errors that indicate failures.
    Error,
}

impl LogLevel {
    /// Returns the log level as a lowercase string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Supported configuration file extensions (in order of preference).
const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

/// Application name for XDG directory lookup and config file names.
const APP_NAME: &str = "changelink";

/// Builder for loading configuration from multiple sources.
#[derive(Debug)]
pub struct ConfigLoader {
    /// Starting directory for project config search.
    project_search_root: Option<Utf8PathBuf>,
    /// Whether to include user config from XDG directory.
    include_user_config: bool,
    /// Stop searching when we hit a directory containing this file/dir.
    boundary_marker: Option<String>,
    /// Explicit config files, later ones winning.
    explicit_files: Vec<Utf8PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new config loader with user config enabled and a `.git`
    /// boundary.
    pub fn new() -> Self {
        Self {
            project_search_root: None,
            include_user_config: true,
            boundary_marker: Some(".git".to_string()),
            explicit_files: Vec::new(),
        }
    }

    /// Set the starting directory for project config search.
    pub fn with_project_search<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.project_search_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set whether to include user config from `~/.config/changelink/`.
    pub const fn with_user_config(mut self, include: bool) -> Self {
        self.include_user_config = include;
        self
    }

    /// Stop the parent walk at a directory containing `marker`.
    pub fn with_boundary_marker<S: Into<String>>(mut self, marker: S) -> Self {
        self.boundary_marker = Some(marker.into());
        self
    }

    /// Search all the way to the filesystem root.
    pub fn without_boundary_marker(mut self) -> Self {
        self.boundary_marker = None;
        self
    }

    /// Add an explicit config file. Explicit files override discovered ones.
    pub fn with_file<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.explicit_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Load configuration, merging all discovered sources.
    #[tracing::instrument(skip(self), fields(search_root = ?self.project_search_root))]
    pub fn load(self) -> ConfigResult<Config> {
        tracing::debug!("loading configuration");
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        let sources = self
            .include_user_config
            .then(find_user_config)
            .flatten()
            .into_iter()
            .chain(
                self.project_search_root
                    .as_deref()
                    .and_then(|root| self.find_project_config(root)),
            )
            .chain(self.explicit_files.iter().cloned());

        for source in sources {
            tracing::debug!(path = %source, "merging config file");
            figment = merge_file(figment, &source);
        }

        let config: Config = figment
            .extract()
            .map_err(|e| ConfigError::Deserialize(Box::new(e)))?;
        tracing::info!(
            log_level = config.log_level.as_str(),
            link_overrides = config.link.is_some(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Load configuration, returning [`ConfigError::NotFound`] if no config
    /// file exists in any location.
    pub fn load_or_error(self) -> ConfigResult<Config> {
        let has_user = self.include_user_config && find_user_config().is_some();
        let has_project = self
            .project_search_root
            .as_deref()
            .and_then(|root| self.find_project_config(root))
            .is_some();

        if !has_user && !has_project && self.explicit_files.is_empty() {
            return Err(ConfigError::NotFound);
        }

        self.load()
    }

    fn find_project_config(&self, start: &Utf8Path) -> Option<Utf8PathBuf> {
        for dir in start.ancestors() {
            if let Some(found) = config_in_dir(dir) {
                return Some(found);
            }

            // The boundary directory's own config still counts.
            if let Some(ref marker) = self.boundary_marker
                && dir.join(marker).exists()
            {
                break;
            }
        }

        None
    }
}

/// First `.changelink.<ext>` or `changelink.<ext>` in `dir`, by extension
/// preference.
fn config_in_dir(dir: &Utf8Path) -> Option<Utf8PathBuf> {
    CONFIG_EXTENSIONS.iter().find_map(|ext| {
        [
            dir.join(format!(".{APP_NAME}.{ext}")),
            dir.join(format!("{APP_NAME}.{ext}")),
        ]
        .into_iter()
        .find(|path| path.is_file())
    })
}

fn find_user_config() -> Option<Utf8PathBuf> {
    let config_dir = user_config_dir()?;
    CONFIG_EXTENSIONS
        .iter()
        .map(|ext| config_dir.join(format!("config.{ext}")))
        .find(|path| path.is_file())
}

/// Merge a config file into the figment, detecting format from extension.
fn merge_file(figment: Figment, path: &Utf8Path) -> Figment {
    match path.extension() {
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path.as_str())),
        Some("json") => figment.merge(Json::file_exact(path.as_str())),
        _ => figment.merge(Toml::file_exact(path.as_str())),
    }
}

/// Find the project config file path without loading it.
pub fn find_project_config<P: AsRef<Utf8Path>>(start: P) -> Option<Utf8PathBuf> {
    ConfigLoader::new()
        .without_boundary_marker()
        .find_project_config(start.as_ref())
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", APP_NAME)
}

/// Get the user config directory path (`~/.config/changelink/` on Linux).
pub fn user_config_dir() -> Option<Utf8PathBuf> {
    let proj_dirs = project_dirs()?;
    Utf8PathBuf::from_path_buf(proj_dirs.config_dir().to_path_buf()).ok()
}

/// Get the user cache directory path (`~/.cache/changelink/` on Linux).
pub fn user_cache_dir() -> Option<Utf8PathBuf> {
    let proj_dirs = project_dirs()?;
    Utf8PathBuf::from_path_buf(proj_dirs.cache_dir().to_path_buf()).ok()
}

/// Get the local data directory path (machine-specific, not synced).
pub fn user_data_local_dir() -> Option<Utf8PathBuf> {
    let proj_dirs = project_dirs()?;
    Utf8PathBuf::from_path_buf(proj_dirs.data_local_dir().to_path_buf()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn load_file(contents: &str, name: &str) -> ConfigResult<Config> {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join(name);
        fs::write(&config_path, contents).unwrap();
        let config_path = Utf8PathBuf::try_from(config_path).unwrap();

        ConfigLoader::new()
            .with_user_config(false)
            .with_file(&config_path)
            .load()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.log_level, LogLevel::Info);
        assert!(config.log_dir.is_none());
        assert!(config.link.is_none());
    }

    #[test]
    fn test_loader_builds_with_defaults() {
        let config = ConfigLoader::new()
            .with_user_config(false)
            .without_boundary_marker()
            .load()
            .unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_single_file_overrides_default() {
        let config = load_file(
            r#"log_level = "debug"
log_dir = "/tmp/changelink"
"#,
            "config.toml",
        )
        .unwrap();

        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(
            config.log_dir.as_ref().map(|dir| dir.as_str()),
            Some("/tmp/changelink")
        );
    }

    #[test]
    fn test_later_file_overrides_earlier() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path().join("base.toml");
        fs::write(&base, r#"log_level = "warn""#).unwrap();
        let over = tmp.path().join("override.toml");
        fs::write(&over, r#"log_level = "error""#).unwrap();

        let config = ConfigLoader::new()
            .with_user_config(false)
            .with_file(Utf8PathBuf::try_from(base).unwrap())
            .with_file(Utf8PathBuf::try_from(over).unwrap())
            .load()
            .unwrap();

        assert_eq!(config.log_level, LogLevel::Error);
    }

    #[test]
    fn test_project_config_discovery() {
        let tmp = TempDir::new().unwrap();
        let project_dir = tmp.path().join("project");
        let sub_dir = project_dir.join("src").join("deep");
        fs::create_dir_all(&sub_dir).unwrap();
        fs::write(project_dir.join(".changelink.toml"), r#"log_level = "debug""#).unwrap();

        let sub_dir = Utf8PathBuf::try_from(sub_dir).unwrap();
        let config = ConfigLoader::new()
            .with_user_config(false)
            .without_boundary_marker()
            .with_project_search(&sub_dir)
            .load()
            .unwrap();

        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_boundary_marker_stops_search() {
        let tmp = TempDir::new().unwrap();
        let parent = tmp.path().join("parent");
        let child = parent.join("child");
        let work = child.join("work");
        fs::create_dir_all(&work).unwrap();
        fs::write(parent.join(".changelink.toml"), r#"log_level = "warn""#).unwrap();
        fs::create_dir(child.join(".git")).unwrap();

        let work = Utf8PathBuf::try_from(work).unwrap();
        let config = ConfigLoader::new()
            .with_user_config(false)
            .with_boundary_marker(".git")
            .with_project_search(&work)
            .load()
            .unwrap();

        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_config_beside_boundary_is_found() {
        let tmp = TempDir::new().unwrap();
        let repo = tmp.path().join("repo");
        let src = repo.join("src");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir(repo.join(".git")).unwrap();
        fs::write(repo.join("changelink.yaml"), "log_level: error\n").unwrap();

        let src = Utf8PathBuf::try_from(src).unwrap();
        let config = ConfigLoader::new()
            .with_user_config(false)
            .with_project_search(&src)
            .load()
            .unwrap();

        assert_eq!(config.log_level, LogLevel::Error);
    }

    #[test]
    fn test_dotfile_preferred_over_regular_name() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".changelink.toml"), "").unwrap();
        fs::write(tmp.path().join("changelink.toml"), "").unwrap();

        let dir = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        let found = find_project_config(&dir).unwrap();
        assert_eq!(found.file_name(), Some(".changelink.toml"));
    }

    #[test]
    fn test_explicit_file_overrides_project_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".changelink.toml"), r#"log_level = "warn""#).unwrap();
        let over = tmp.path().join("override.toml");
        fs::write(&over, r#"log_level = "error""#).unwrap();

        let tmp_path = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        let config = ConfigLoader::new()
            .with_user_config(false)
            .without_boundary_marker()
            .with_project_search(&tmp_path)
            .with_file(Utf8PathBuf::try_from(over).unwrap())
            .load()
            .unwrap();

        assert_eq!(config.log_level, LogLevel::Error);
    }

    #[test]
    fn test_load_or_error_fails_when_no_config() {
        let result = ConfigLoader::new()
            .with_user_config(false)
            .without_boundary_marker()
            .load_or_error();

        assert!(matches!(result, Err(ConfigError::NotFound)));
    }

    #[test]
    fn test_invalid_file_is_deserialize_error() {
        let result = load_file("log_level = [", "config.toml");
        assert!(matches!(result, Err(ConfigError::Deserialize(_))));
    }

    #[test]
    fn test_link_section_toml() {
        let config = load_file(
            r#"
[link]
base_url = "https://example.com/CHANGELOG.md#"
anchor_floor = "1.6.0"
comparison = "numeric"
"#,
            "config.toml",
        )
        .unwrap();

        let link = config.link.unwrap();
        assert_eq!(link.base_url(), "https://example.com/CHANGELOG.md#");
        assert_eq!(link.anchor_floor(), "1.6.0");
        assert_eq!(link.comparison(), Comparison::Numeric);
    }

    #[test]
    fn test_link_section_json() {
        let config = load_file(r#"{"link": {"comparison": "lexical"}}"#, "config.json").unwrap();
        let link = config.link_settings();
        assert_eq!(link.comparison(), Comparison::Lexical);
        assert_eq!(link.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_unknown_comparison_is_rejected() {
        let result = load_file("link:\n  comparison: fuzzy\n", "config.yaml");
        assert!(result.is_err());
    }

    #[test]
    fn test_default_link_settings_match_stock_formatter() {
        let formatter = Config::default().link_settings().formatter().unwrap();
        assert_eq!(formatter, VersionLinkFormatter::new());
    }

    #[test]
    fn test_link_settings_build_formatter() {
        let link = LinkConfig {
            base_url: Some("https://example.com/CHANGELOG.md#".to_string()),
            anchor_floor: Some("2.0.0".to_string()),
            comparison: None,
        };
        let formatter = link.formatter().unwrap();
        assert!(!formatter.format(Some("1.9.9")).is_anchored());
        assert_eq!(
            formatter.format(Some("2.0.0")).as_str(),
            "https://example.com/CHANGELOG.md#v200"
        );
    }

    #[test]
    fn test_bad_anchor_floor_fails_formatter() {
        let link = LinkConfig {
            anchor_floor: Some("latest".to_string()),
            ..LinkConfig::default()
        };
        assert!(link.formatter().is_err());
    }

    #[test]
    fn test_user_config_dir() {
        if let Some(path) = user_config_dir() {
            assert!(path.as_str().contains("changelink"));
        }
    }
}
