//! Configuration management for polyfmt.
//!
//! This module provides the [`Config`] struct which controls detection
//! thresholds, the external tool time budget, and per-language tool
//! overrides. Configuration can be loaded from:
//! - TOML files (`polyfmt.toml`)
//! - CLI arguments (which override file settings)
//!
//! Config files are auto-discovered by searching parent directories from the
//! file being formatted up to the filesystem root, plus the user's home
//! directory. The loaded value is immutable for the life of the process and
//! passed by reference into the classifier and dispatcher.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::process::exec::{InputMode, ToolSpec};

/// Config file names to search for (in order of priority, later overrides earlier)
const CONFIG_FILE_NAMES: &[&str] = &["polyfmt.toml"];

/// Get the user's home directory
fn dirs_home() -> Option<PathBuf> {
    // Try HOME environment variable first (works on Unix and some Windows setups)
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
fn default_timeout_secs() -> u64 {
    30
}
fn default_min_reliable_len() -> usize {
    10
}
fn default_strong_threshold() -> u32 {
    6
}
fn default_weak_threshold() -> u32 {
    3
}
fn default_high_margin() -> u32 {
    2
}

/// Override for one pipeline stage of a language, from the `[tools]` table.
///
/// `command` is the argv (program first); a `temp_file_suffix` switches the
/// stage to temp-file I/O, with `{file}` in the argv replaced by the path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOverride {
    pub command: Vec<String>,
    #[serde(default)]
    pub temp_file_suffix: Option<String>,
}

impl ToolOverride {
    /// Convert into the executable stage spec.
    ///
    /// An empty `command` yields a spec naming a deliberately unresolvable
    /// program, which surfaces as the normal tool-unavailable path.
    #[must_use]
    pub fn to_spec(&self) -> ToolSpec {
        let program = self
            .command
            .first()
            .cloned()
            .unwrap_or_else(|| "misconfigured-tool".to_string());
        let args = self.command.iter().skip(1).cloned().collect();
        let input = match &self.temp_file_suffix {
            Some(suffix) => InputMode::TempFile {
                suffix: suffix.clone(),
            },
            None => InputMode::Stdin,
        };
        ToolSpec {
            program,
            args,
            input,
        }
    }
}

/// Main configuration struct for polyfmt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Wall-clock budget per external tool invocation, seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Inputs shorter than this many bytes are classified at low
    /// confidence regardless of matched patterns (default: 10)
    #[serde(default = "default_min_reliable_len")]
    pub min_reliable_len: usize,

    /// Tier-1 score at or above which a verdict may be high confidence
    /// (default: 6)
    #[serde(default = "default_strong_threshold")]
    pub strong_threshold: u32,

    /// Tier-1 score at or above which a verdict is at least medium
    /// confidence; below it tier 2 is consulted (default: 3)
    #[serde(default = "default_weak_threshold")]
    pub weak_threshold: u32,

    /// Minimum lead over the runner-up for a high-confidence verdict
    /// (default: 2)
    #[serde(default = "default_high_margin")]
    pub high_margin: u32,

    /// Per-language pipeline overrides, keyed by language identifier.
    /// Replaces the built-in stage list for that language entirely.
    #[serde(default)]
    pub tools: HashMap<String, Vec<ToolOverride>>,
}

/// Partial configuration for TOML parsing
///
/// All fields are `Option<T>` so we can distinguish between
/// "explicitly set" and "not specified" when merging configs.
#[derive(Debug, Clone, Default, Deserialize)]
struct PartialConfig {
    pub timeout_secs: Option<u64>,
    pub min_reliable_len: Option<usize>,
    pub strong_threshold: Option<u32>,
    pub weak_threshold: Option<u32>,
    pub high_margin: Option<u32>,
    #[serde(default)]
    pub tools: HashMap<String, Vec<ToolOverride>>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            timeout_secs: 30,
            min_reliable_len: 10,
            strong_threshold: 6,
            weak_threshold: 3,
            high_margin: 2,
            tools: HashMap::new(),
        }
    }
}

impl Config {
    /// Maximum reasonable tool timeout (10 minutes)
    const MAX_TIMEOUT_SECS: u64 = 600;
    /// Maximum reasonable minimum-length threshold
    const MAX_MIN_RELIABLE_LEN: usize = 1024;

    /// Validate configuration values are within reasonable bounds
    ///
    /// Returns an error message if validation fails, None if valid.
    #[must_use]
    pub fn validate(&self) -> Option<String> {
        if self.timeout_secs == 0 {
            return Some("timeout_secs must be at least 1".to_string());
        }
        if self.timeout_secs > Self::MAX_TIMEOUT_SECS {
            return Some(format!(
                "timeout_secs {} exceeds maximum of {}",
                self.timeout_secs,
                Self::MAX_TIMEOUT_SECS
            ));
        }
        if self.min_reliable_len > Self::MAX_MIN_RELIABLE_LEN {
            return Some(format!(
                "min_reliable_len {} exceeds maximum of {}",
                self.min_reliable_len,
                Self::MAX_MIN_RELIABLE_LEN
            ));
        }
        if self.weak_threshold == 0 {
            return Some("weak_threshold must be at least 1".to_string());
        }
        if self.strong_threshold < self.weak_threshold {
            return Some(format!(
                "strong_threshold {} is below weak_threshold {}",
                self.strong_threshold, self.weak_threshold
            ));
        }
        for (label, stages) in &self.tools {
            if label.parse::<crate::language::Language>().is_err() {
                return Some(format!("tools table names unsupported language `{label}`"));
            }
            if stages.iter().any(|s| s.command.is_empty()) {
                return Some(format!("tools.{label} contains an empty command"));
            }
        }
        None
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let partial: PartialConfig = toml::from_str(&contents)?;
        let mut config = Self::default();
        config.apply_partial(&partial);
        Ok(config)
    }

    /// Apply a partial config, only overriding fields that are explicitly set
    fn apply_partial(&mut self, partial: &PartialConfig) {
        if let Some(v) = partial.timeout_secs {
            self.timeout_secs = v;
        }
        if let Some(v) = partial.min_reliable_len {
            self.min_reliable_len = v;
        }
        if let Some(v) = partial.strong_threshold {
            self.strong_threshold = v;
        }
        if let Some(v) = partial.weak_threshold {
            self.weak_threshold = v;
        }
        if let Some(v) = partial.high_margin {
            self.high_margin = v;
        }
        // Merge tool tables (partial values override per language)
        for (k, v) in &partial.tools {
            self.tools.insert(k.clone(), v.clone());
        }
    }

    /// Discover config files from parent directories of a given path
    ///
    /// Searches from the file's directory up to the root, then adds home directory config.
    /// Returns list of config file paths in order of priority (least specific first).
    #[must_use]
    pub fn discover_config_files(start_path: &Path) -> Vec<PathBuf> {
        let mut config_files = Vec::new();

        // Add home directory config first (lowest priority)
        if let Some(home) = dirs_home() {
            for config_name in CONFIG_FILE_NAMES {
                let home_config = home.join(config_name);
                if home_config.is_file() {
                    config_files.push(home_config);
                }
            }
        }

        // Start from the file's parent directory (or the path itself if it's a directory)
        let start_dir = if start_path.is_file() {
            start_path.parent().map(Path::to_path_buf)
        } else if start_path.is_dir() {
            Some(start_path.to_path_buf())
        } else {
            // Path doesn't exist, use current directory
            std::env::current_dir().ok()
        };

        // Collect config files from parent directories (from root to current)
        if let Some(dir) = start_dir {
            let mut ancestors: Vec<PathBuf> = dir.ancestors().map(Path::to_path_buf).collect();
            // Reverse so we go from root to current (less specific to more specific)
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
    /// Returns default config if no files found.
    #[must_use]
    pub fn from_discovered_files(start_path: &Path) -> Self {
        let config_files = Self::discover_config_files(start_path);

        if config_files.is_empty() {
            return Self::default();
        }

        let mut config = Self::default();
        for path in &config_files {
            match std::fs::read_to_string(path) {
                Ok(contents) => match toml::from_str::<PartialConfig>(&contents) {
                    Ok(partial) => config.apply_partial(&partial),
                    Err(e) => eprintln!("Warning: failed to parse {}: {e}", path.display()),
                },
                Err(e) => eprintln!("Warning: failed to read {}: {e}", path.display()),
            }
        }
        config
    }
}
