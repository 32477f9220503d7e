//! Configuration management for Octodash
//!
//! This module handles loading, validation, and management of the dashboard
//! configuration from YAML files with support for environment variable overrides.
//! Every section has a documented default so an empty file (or no file at all)
//! yields a working London/Agile setup.

use crate::error::{OctodashError, Result};
use crate::homeassistant::{AlertCondition, ConditionLogic};
use crate::reconcile::TrimPolicy;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod defaults;

/// RGB triple as written in the YAML file (`[17, 24, 39]`)
pub type Rgb = [u8; 3];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tariff API endpoints and product codes
    pub tariff: TariffConfig,

    /// Per-day price cache location
    pub cache: CacheConfig,

    /// Canvas size, chart region and output sink
    pub display: DisplayConfig,

    /// Colours and price thresholds
    pub palette: PaletteConfig,

    /// Font selection
    pub fonts: FontConfig,

    /// Fetch/redraw cadence
    pub schedule: ScheduleConfig,

    /// Today/tomorrow window policy
    pub reconcile: ReconcileConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// IANA timezone used for wall-clock slots (e.g. Europe/London)
    pub timezone: String,

    /// Optional Home Assistant alert and message-of-the-day source
    pub home_assistant: Option<HomeAssistantConfig>,
}

/// Tariff API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TariffConfig {
    /// Base URL of the public tariff API
    pub api_base_url: String,

    /// Grid supply point region letter (C = London)
    pub region: String,

    /// Half-hourly electricity product code
    pub agile_product: String,

    /// Daily gas tracker product code
    pub gas_product: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Attempts per request before giving up
    pub max_retries: u32,

    /// Delay between attempts in milliseconds
    pub retry_delay_ms: u64,

    /// Upper bound on followed pagination links
    pub max_pages: u32,
}

/// Price cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding one JSON file per day
    pub dir: String,

    /// File name prefix, followed by the ISO date and `.json`
    pub file_prefix: String,
}

/// Which display sink receives rendered frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Save each frame as a timestamped PNG
    File,
    /// Push frames to a framebuffer-backed panel
    Panel,
}

/// Pixel region reserved for the bar chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRegionConfig {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub height: i32,
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Canvas width in pixels
    pub width: u32,

    /// Canvas height in pixels
    pub height: u32,

    /// Output sink selected at startup
    pub sink: SinkKind,

    /// Directory for PNG output (file sink)
    pub output_dir: String,

    /// Framebuffer device for the panel sink
    pub panel_device: String,

    /// Chart area within the canvas
    pub chart: ChartRegionConfig,
}

/// Price band boundaries in pence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceThresholds {
    /// Below this is green
    pub cheap: f64,
    /// Below this is blue
    pub normal: f64,
    /// Below this is yellow, otherwise red
    pub expensive: f64,
}

/// Colour palette
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    pub background: Rgb,
    pub text: Rgb,
    pub box_label: Rgb,
    pub green: Rgb,
    pub blue: Rgb,
    pub yellow: Rgb,
    pub red: Rgb,
    pub orange: Rgb,
    pub gas_label: Rgb,
    pub gas_tomorrow: Rgb,
    pub tomorrow_background: Rgb,
    pub gridline: Rgb,
    pub axis_label: Rgb,
    pub chart_label: Rgb,
    pub marker: Rgb,
    pub alert: Rgb,
    pub thresholds: PriceThresholds,
}

/// Font configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Built-in font style: "bold" or "regular"
    pub style: String,
}

/// Loop cadence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Seconds between price fetches
    pub fetch_interval_secs: u64,

    /// Seconds between redraws
    pub redraw_interval_secs: u64,

    /// Seconds to sleep after a failed cycle
    pub error_backoff_secs: u64,
}

/// Reconciler policy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// How today's series is trimmed when tomorrow's prices are known
    pub trim_policy: TrimPolicy,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Console-specific level override
    pub console_level: Option<String>,

    /// File-specific level override
    pub file_level: Option<String>,

    /// Path to log file (its directory receives daily rolled files)
    pub file: String,

    /// Number of rolled files to keep
    pub backup_count: u32,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

/// Home Assistant configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeAssistantConfig {
    /// Base URL, e.g. http://homeassistant.local:8123
    pub url: String,

    /// Long-lived access token
    pub token: String,

    /// Conditions raising the alert marker
    pub conditions: Vec<AlertCondition>,

    /// How conditions are combined
    pub logic: ConditionLogic,

    /// input_text entity holding the message of the day
    pub message_entity_id: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from an explicit path or the default locations,
    /// then apply environment overrides
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_paths = [
                    "octodash.yaml",
                    "/data/octodash.yaml",
                    "/etc/octodash/config.yaml",
                ];
                match default_paths.iter().find(|p| Path::new(p).exists()) {
                    Some(path) => Self::from_file(path)?,
                    None => Config::default(),
                }
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Apply `OCTODASH_*` variables from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup; empty values are ignored
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("OCTODASH_REGION") {
            self.tariff.region = v;
        }
        if let Some(v) = get("OCTODASH_AGILE_PRODUCT") {
            self.tariff.agile_product = v;
        }
        if let Some(v) = get("OCTODASH_GAS_PRODUCT") {
            self.tariff.gas_product = v;
        }
        if let Some(v) = get("OCTODASH_TIMEZONE") {
            self.timezone = v;
        }
        if let Some(v) = get("OCTODASH_CACHE_DIR") {
            self.cache.dir = v;
        }
        if let Some(v) = get("OCTODASH_OUTPUT_DIR") {
            self.display.output_dir = v;
        }
        if let Some(url) = get("OCTODASH_HA_URL") {
            self.home_assistant
                .get_or_insert_with(HomeAssistantConfig::default)
                .url = url;
        }
        if let Some(token) = get("OCTODASH_HA_TOKEN")
            && let Some(ha) = self.home_assistant.as_mut()
        {
            ha.token = token;
        }
    }

    /// Parsed timezone
    pub fn tz(&self) -> Result<Tz> {
        self.timezone.parse::<Tz>().map_err(|_| {
            OctodashError::validation(
                "timezone".to_string(),
                format!("Unknown timezone: {}", self.timezone),
            )
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.tariff.region.trim().is_empty() {
            return Err(OctodashError::validation(
                "tariff.region",
                "Region cannot be empty",
            ));
        }

        if self.tariff.agile_product.trim().is_empty() {
            return Err(OctodashError::validation(
                "tariff.agile_product",
                "Product code cannot be empty",
            ));
        }

        if self.tariff.gas_product.trim().is_empty() {
            return Err(OctodashError::validation(
                "tariff.gas_product",
                "Product code cannot be empty",
            ));
        }

        if self.tariff.request_timeout_secs == 0 {
            return Err(OctodashError::validation(
                "tariff.request_timeout_secs",
                "Must be greater than 0",
            ));
        }

        self.tz()?;

        if self.schedule.fetch_interval_secs == 0 || self.schedule.redraw_interval_secs == 0 {
            return Err(OctodashError::validation(
                "schedule",
                "Intervals must be greater than 0",
            ));
        }

        if self.display.width == 0 || self.display.height == 0 {
            return Err(OctodashError::validation(
                "display",
                "Canvas size must be non-zero",
            ));
        }

        let chart = self.display.chart;
        let width = i32::try_from(self.display.width).unwrap_or(i32::MAX);
        let height = i32::try_from(self.display.height).unwrap_or(i32::MAX);
        if chart.left < 0
            || chart.top < 0
            || chart.right <= chart.left
            || chart.height <= 0
            || chart.right > width
            || chart.top.checked_add(chart.height).is_none_or(|b| b > height)
        {
            return Err(OctodashError::validation(
                "display.chart",
                "Chart region must lie inside the canvas",
            ));
        }

        let t = self.palette.thresholds;
        if !(t.cheap < t.normal && t.normal < t.expensive) {
            return Err(OctodashError::validation(
                "palette.thresholds",
                "Thresholds must be strictly ascending",
            ));
        }

        if let Some(ha) = &self.home_assistant
            && ha.url.trim().is_empty()
        {
            return Err(OctodashError::validation(
                "home_assistant.url",
                "URL cannot be empty",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.display.width, 320);
        assert_eq!(config.display.height, 240);
        assert_eq!(config.tariff.region, "C");
        assert_eq!(config.schedule.fetch_interval_secs, 300);
        assert_eq!(config.schedule.redraw_interval_secs, 30);
        assert!(config.home_assistant.is_none());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.tariff.region = String::new();
        assert!(config.validate().is_err());

        config = Config::default();
        config.timezone = "Mars/Olympus_Mons".to_string();
        assert!(config.validate().is_err());

        config = Config::default();
        config.display.chart.right = 400;
        assert!(config.validate().is_err());

        config = Config::default();
        config.display.chart.top = 10;
        config.display.chart.height = i32::MAX;
        assert!(config.validate().is_err());

        config = Config::default();
        config.palette.thresholds.normal = 5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let deserialized: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.tariff.agile_product, deserialized.tariff.agile_product);
        assert_eq!(config.display.sink, deserialized.display.sink);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let cfg: Config = serde_yaml::from_str("tariff:\n  region: A\n").unwrap();
        assert_eq!(cfg.tariff.region, "A");
        assert_eq!(cfg.tariff.agile_product, TariffConfig::default().agile_product);
        assert_eq!(cfg.timezone, "Europe/London");
    }

    #[test]
    fn env_overrides_apply_and_skip_empty() {
        let vars: HashMap<&str, &str> = [
            ("OCTODASH_REGION", "H"),
            ("OCTODASH_GAS_PRODUCT", ""),
            ("OCTODASH_HA_URL", "http://ha.local:8123"),
            ("OCTODASH_HA_TOKEN", "secret"),
        ]
        .into_iter()
        .collect();

        let mut cfg = Config::default();
        cfg.apply_overrides_from(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.tariff.region, "H");
        assert_eq!(cfg.tariff.gas_product, TariffConfig::default().gas_product);
        let ha = cfg.home_assistant.unwrap();
        assert_eq!(ha.url, "http://ha.local:8123");
        assert_eq!(ha.token, "secret");
    }
}
