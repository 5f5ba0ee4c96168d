//! Configuration management for fortdeps.
//!
//! This module provides the [`Config`] struct which controls file selection and
//! include following. Configuration can be loaded from:
//! - TOML files (`fortdeps.toml`)
//! - CLI arguments (which override file settings)
//!
//! Config files are auto-discovered by searching parent directories from the path
//! being scanned up to the filesystem root, plus the user's home directory.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::process::ScanOptions;

/// Config file names to search for (in order of priority, later overrides earlier)
const CONFIG_FILE_NAMES: &[&str] = &["fortdeps.toml"];

/// Fortran file extensions recognized without configuration
pub const FORTRAN_EXTENSIONS: &[&str] = &[
    "f90", "f95", "f03", "f08", "f18", "f", "for", "ftn", "fpp", "F90", "F95", "F03", "F08", "F18",
    "F", "FOR", "FTN", "FPP",
];

/// Check if a path has a default or extra Fortran extension
///
/// Extra extensions may be given with or without a leading dot.
#[must_use]
pub fn is_fortran_path(path: &Path, extra_extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            FORTRAN_EXTENSIONS.contains(&ext)
                || extra_extensions
                    .iter()
                    .any(|custom| custom.strip_prefix('.').unwrap_or(custom) == ext)
        })
}

/// Get the user's home directory
fn dirs_home() -> Option<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home));
    }
    // Fallback for Windows
    if let Ok(userprofile) = std::env::var("USERPROFILE") {
        return Some(PathBuf::from(userprofile));
    }
    None
}

// Serde default functions
fn default_true() -> bool {
    true
}
fn default_max_include_depth() -> usize {
    16
}
fn default_max_file_size() -> u64 {
    100 * 1024 * 1024
}

/// Main configuration struct for fortdeps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Extra Fortran file extensions (with or without leading dot)
    #[serde(default)]
    pub fortran_extensions: Vec<String>,

    /// Glob patterns for files/directories to skip
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Scan files named by `include` lines (default: true)
    #[serde(default = "default_true")]
    pub follow_includes: bool,

    /// Maximum nesting of followed includes (default: 16)
    #[serde(default = "default_max_include_depth")]
    pub max_include_depth: usize,

    /// Files larger than this many bytes are rejected (default: 100 MiB)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

/// Partial configuration for TOML parsing
///
/// All fields are `Option<T>` so we can distinguish between
/// "explicitly set" and "not specified" when merging configs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    pub fortran_extensions: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub follow_includes: Option<bool>,
    pub max_include_depth: Option<usize>,
    pub max_file_size: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            fortran_extensions: Vec::new(),
            exclude: Vec::new(),
            follow_includes: true,
            max_include_depth: default_max_include_depth(),
            max_file_size: default_max_file_size(),
        }
    }
}

impl Config {
    /// Maximum reasonable include nesting
    const MAX_INCLUDE_DEPTH: usize = 256;

    /// Validate configuration values are within reasonable bounds
    ///
    /// Returns an error message if validation fails, None if valid.
    #[must_use]
    pub fn validate(&self) -> Option<String> {
        if self.max_include_depth > Self::MAX_INCLUDE_DEPTH {
            return Some(format!(
                "max_include_depth {} exceeds maximum of {}",
                self.max_include_depth,
                Self::MAX_INCLUDE_DEPTH
            ));
        }
        if self.max_file_size == 0 {
            return Some("max_file_size must be at least 1".to_string());
        }
        for pattern in &self.exclude {
            if let Err(e) = glob::Pattern::new(pattern) {
                return Some(format!("invalid exclude pattern {pattern:?}: {e}"));
            }
        }
        if let Some(ext) = self
            .fortran_extensions
            .iter()
            .find(|ext| ext.trim_start_matches('.').is_empty())
        {
            return Some(format!("invalid Fortran extension {ext:?}"));
        }
        None
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let partial: PartialConfig = toml::from_str(&contents)?;
        let mut config = Self::default();
        config.apply_partial(partial);
        Ok(config)
    }

    /// Apply a partial config, only overriding fields that are explicitly set
    fn apply_partial(&mut self, partial: PartialConfig) {
        if let Some(v) = partial.follow_includes {
            self.follow_includes = v;
        }
        if let Some(v) = partial.max_include_depth {
            self.max_include_depth = v;
        }
        if let Some(v) = partial.max_file_size {
            self.max_file_size = v;
        }
        // Lists accumulate across files (more specific files add entries)
        for ext in partial.fortran_extensions.unwrap_or_default() {
            if !self.fortran_extensions.contains(&ext) {
                self.fortran_extensions.push(ext);
            }
        }
        for pattern in partial.exclude.unwrap_or_default() {
            if !self.exclude.contains(&pattern) {
                self.exclude.push(pattern);
            }
        }
    }

    /// Discover config files from parent directories of a given path
    ///
    /// Searches from the path's directory up to the root, then adds home directory config.
    /// Returns list of config file paths in order of priority (least specific first).
    #[must_use]
    pub fn discover_config_files(start_path: &Path) -> Vec<PathBuf> {
        let mut config_files = Vec::new();

        // Home directory config first (lowest priority)
        if let Some(home) = dirs_home() {
            for config_name in CONFIG_FILE_NAMES {
                let home_config = home.join(config_name);
                if home_config.is_file() {
                    config_files.push(home_config);
                }
            }
        }

        let start_dir = if start_path.is_file() {
            start_path.parent().map(Path::to_path_buf)
        } else if start_path.is_dir() {
            Some(start_path.to_path_buf())
        } else {
            std::env::current_dir().ok()
        };

        if let Some(dir) = start_dir {
            let mut ancestors: Vec<PathBuf> = dir.ancestors().map(Path::to_path_buf).collect();
            // Root first, so closer files come later and win
            ancestors.reverse();

            for ancestor in ancestors {
                for config_name in CONFIG_FILE_NAMES {
                    let config_path = ancestor.join(config_name);
                    if config_path.is_file() && !config_files.contains(&config_path) {
                        config_files.push(config_path);
                    }
                }
            }
        }

        config_files
    }

    /// Load and merge configuration from discovered config files
    ///
    /// Later files override earlier ones (only explicitly set values).
    /// Unreadable or malformed files are skipped with a warning.
    #[must_use]
    pub fn from_discovered_files(start_path: &Path) -> Self {
        let mut config = Self::default();
        for path in Self::discover_config_files(start_path) {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<PartialConfig>(&contents) {
                    Ok(partial) => {
                        debug!("Loaded config {}", path.display());
                        config.apply_partial(partial);
                    }
                    Err(e) => warn!("failed to parse {}: {e}", path.display()),
                },
                Err(e) => warn!("failed to read {}: {e}", path.display()),
            }
        }
        config
    }

    /// Check if a file has a Fortran extension
    ///
    /// Checks against both default extensions and configured extra extensions.
    #[must_use]
    pub fn is_fortran_file(&self, path: &Path) -> bool {
        is_fortran_path(path, &self.fortran_extensions)
    }

    /// Scanner options derived from this configuration
    #[must_use]
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            follow_includes: self.follow_includes,
            max_include_depth: self.max_include_depth,
            max_file_size: self.max_file_size,
            fortran_extensions: self.fortran_extensions.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.follow_includes);
        assert_eq!(config.max_include_depth, 16);
        assert_eq!(config.max_file_size, 100 * 1024 * 1024);
        assert!(config.exclude.is_empty());
    }

    #[test]
    fn test_serde_defaults_match_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_apply_partial() {
        let mut base = Config::default();
        let partial = PartialConfig {
            follow_includes: Some(false),
            max_include_depth: Some(4),
            ..Default::default()
        };

        base.apply_partial(partial);
        assert!(!base.follow_includes);
        assert_eq!(base.max_include_depth, 4);
        // Other fields should remain at defaults
        assert_eq!(base.max_file_size, 100 * 1024 * 1024);
    }

    #[test]
    fn test_config_apply_partial_preserves_unset() {
        let mut base = Config::default();
        base.follow_includes = false;

        let partial = PartialConfig {
            max_file_size: Some(1024),
            ..Default::default()
        };

        base.apply_partial(partial);
        assert!(!base.follow_includes);
        assert_eq!(base.max_file_size, 1024);
    }

    #[test]
    fn test_config_apply_partial_lists_accumulate() {
        let mut base = Config::default();
        base.exclude.push("build".to_string());

        let partial: PartialConfig =
            toml::from_str("exclude = [\"build\", \"*.bak\"]\nfortran_extensions = [\"inc\"]")
                .unwrap();
        base.apply_partial(partial);

        assert_eq!(base.exclude, vec!["build".to_string(), "*.bak".to_string()]);
        assert_eq!(base.fortran_extensions, vec!["inc".to_string()]);
    }

    #[test]
    fn test_partial_rejects_unknown_keys() {
        assert!(toml::from_str::<PartialConfig>("indent = 3").is_err());
    }

    #[test]
    fn test_from_discovered_files_returns_default_when_empty() {
        let path = PathBuf::from("/nonexistent/unique/path/file.f90");
        let config = Config::from_discovered_files(&path);
        assert!(config.follow_includes);
        assert_eq!(config.max_include_depth, 16);
    }

    #[test]
    fn test_is_fortran_file() {
        let mut config = Config::default();
        assert!(config.is_fortran_file(Path::new("src/a.f90")));
        assert!(config.is_fortran_file(Path::new("src/A.F90")));
        assert!(!config.is_fortran_file(Path::new("src/a.inc")));
        assert!(!config.is_fortran_file(Path::new("Makefile")));

        config.fortran_extensions.push(".inc".to_string());
        assert!(config.is_fortran_file(Path::new("src/a.inc")));
    }

    #[test]
    fn test_validate_default_config() {
        assert!(Config::default().validate().is_none());
    }

    #[test]
    fn test_validate_include_depth() {
        let config = Config {
            max_include_depth: 1000,
            ..Default::default()
        };
        assert!(config.validate().unwrap().contains("max_include_depth"));
    }

    #[test]
    fn test_validate_max_file_size() {
        let config = Config {
            max_file_size: 0,
            ..Default::default()
        };
        assert!(config.validate().unwrap().contains("max_file_size"));
    }

    #[test]
    fn test_validate_bad_exclude() {
        let config = Config {
            exclude: vec!["[".to_string()],
            ..Default::default()
        };
        assert!(config.validate().unwrap().contains("exclude"));
    }

    #[test]
    fn test_validate_empty_extension() {
        let config = Config {
            fortran_extensions: vec![".".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_some());
    }

    #[test]
    fn test_scan_options() {
        let config = Config {
            follow_includes: false,
            max_include_depth: 3,
            ..Default::default()
        };
        let options = config.scan_options();
        assert!(!options.follow_includes);
        assert_eq!(options.max_include_depth, 3);
    }
}
