use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use crate::bucket::Granularity;
use crate::category::BLANK_CATEGORY_DEFAULT;

/// Environment variable naming the display timezone.
pub const TIMEZONE_ENV: &str = "DAYBOOK_TZ";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DaybookConfig {
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub trend: TrendConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub categories: CategoryConfig,
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// IANA zone name. Absent means the machine's local zone.
    #[serde(default)]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendConfig {
    #[serde(default = "default_granularity")]
    pub granularity: Granularity,
    #[serde(default = "default_bucket_count")]
    pub bucket_count: usize,
    #[serde(default = "default_true")]
    pub include_other: bool,
    #[serde(default = "default_sample_minutes")]
    pub sample_minutes: NonZeroU32,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            granularity: default_granularity(),
            bucket_count: default_bucket_count(),
            include_other: default_true(),
            sample_minutes: default_sample_minutes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_min_display_minutes")]
    pub min_display_minutes: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            min_display_minutes: default_min_display_minutes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Label shown for events whose category is blank.
    #[serde(default = "default_blank_category")]
    pub blank_category: String,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            blank_category: default_blank_category(),
        }
    }
}

/// Load config from `path`. A missing file yields defaults.
pub fn load_config(path: &Path) -> Result<DaybookConfig> {
    if !path.exists() {
        return Ok(DaybookConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<DaybookConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// `<config_dir>/daybook/config.toml`, if the platform has a config dir.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("daybook/config.toml"))
}

pub fn load_user_config() -> Result<DaybookConfig> {
    match user_config_path() {
        Some(path) => load_config(&path),
        None => Ok(DaybookConfig::default()),
    }
}

/// Output mode name: flag, then `FORMAT`, then config, then TTY detection.
#[must_use]
pub fn resolve_output(cli_format: Option<&str>, config: &DaybookConfig) -> String {
    let env_format = env::var("FORMAT").ok();
    resolve_output_inner(
        cli_format,
        env_format.as_deref(),
        config.output.as_deref(),
        std::io::stdout().is_terminal(),
    )
}

fn resolve_output_inner(
    cli_format: Option<&str>,
    env_format: Option<&str>,
    config_output: Option<&str>,
    is_tty: bool,
) -> String {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "table" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    [cli_format, env_format, config_output]
        .into_iter()
        .flatten()
        .find_map(normalize_output_mode)
        .unwrap_or(if is_tty { "pretty" } else { "text" })
        .to_string()
}

/// Timezone name: flag, then `DAYBOOK_TZ`, then config. `None` means local.
#[must_use]
pub fn resolve_timezone(cli_timezone: Option<&str>, config: &DaybookConfig) -> Option<String> {
    let env_timezone = env::var(TIMEZONE_ENV).ok();
    resolve_timezone_inner(
        cli_timezone,
        env_timezone.as_deref(),
        config.calendar.timezone.as_deref(),
    )
}

fn resolve_timezone_inner(
    cli_timezone: Option<&str>,
    env_timezone: Option<&str>,
    config_timezone: Option<&str>,
) -> Option<String> {
    [cli_timezone, env_timezone, config_timezone]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|name| !name.is_empty())
        .map(str::to_string)
}

const fn default_true() -> bool {
    true
}

const fn default_granularity() -> Granularity {
    Granularity::Weekly
}

const fn default_bucket_count() -> usize {
    8
}

const fn default_sample_minutes() -> NonZeroU32 {
    NonZeroU32::MIN.saturating_add(59)
}

const fn default_min_display_minutes() -> u32 {
    15
}

fn default_blank_category() -> String {
    BLANK_CATEGORY_DEFAULT.to_string()
}
