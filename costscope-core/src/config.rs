//! Configuration management
//!
//! Settings live in `settings.json` inside the app directory:
//! ```json
//! {
//!   "insights": { "spikePct": 40, "dropPct": -30, "concentrationPct": 40, "maxInsights": 5 },
//!   "charts": { "barTop": 10, "comparisonTop": 8 },
//!   "defaultDataset": "/path/to/costs.csv"
//! }
//! ```
//! Keys the CLI doesn't manage are preserved when saving.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    insights: InsightThresholds,
    #[serde(default)]
    charts: ChartLimits,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_dataset: Option<PathBuf>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Fixed thresholds used by the insight generator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InsightThresholds {
    /// Month-over-month increase (percent) above which a spike is reported
    pub spike_pct: f64,
    /// Month-over-month change (percent) below which a drop is reported
    pub drop_pct: f64,
    /// Top department share (percent) above which concentration is reported
    pub concentration_pct: f64,
    pub max_insights: usize,
}

impl Default for InsightThresholds {
    fn default() -> Self {
        Self {
            spike_pct: 40.0,
            drop_pct: -30.0,
            concentration_pct: 40.0,
            max_insights: 5,
        }
    }
}

/// Row limits for chart and comparison views
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartLimits {
    pub bar_top: usize,
    /// Pie charts show every slice unless set
    pub pie_top: Option<usize>,
    pub comparison_top: usize,
}

impl Default for ChartLimits {
    fn default() -> Self {
        Self {
            bar_top: 10,
            pie_top: None,
            comparison_top: 8,
        }
    }
}

/// Costscope configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub thresholds: InsightThresholds,
    pub limits: ChartLimits,
    /// Dataset loaded when no CSV path is given (bundled sample otherwise)
    pub default_dataset: Option<PathBuf>,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

/// Keys accepted by `Config::set` and `Config::unset`
pub const SETTING_KEYS: &[&str] = &[
    "spike-pct",
    "drop-pct",
    "concentration-pct",
    "max-insights",
    "bar-top",
    "pie-top",
    "comparison-top",
    "default-dataset",
];

impl Config {
    /// Load config from the app directory
    ///
    /// Thresholds can be overridden via COSTSCOPE_SPIKE_PCT,
    /// COSTSCOPE_DROP_PCT and COSTSCOPE_CONCENTRATION_PCT.
    pub fn load(app_dir: &Path) -> Result<Self> {
        let mut config = Self::load_settings(app_dir)?;

        if let Some(v) = env_pct("COSTSCOPE_SPIKE_PCT")? {
            config.thresholds.spike_pct = v;
        }
        if let Some(v) = env_pct("COSTSCOPE_DROP_PCT")? {
            config.thresholds.drop_pct = v;
        }
        if let Some(v) = env_pct("COSTSCOPE_CONCENTRATION_PCT")? {
            config.thresholds.concentration_pct = v;
        }

        Ok(config)
    }

    /// Load settings.json only, ignoring environment overrides
    ///
    /// Use this before `save` so overrides never end up on disk.
    pub fn load_settings(app_dir: &Path) -> Result<Self> {
        let settings_path = app_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)
                .with_context(|| format!("Failed to read {:?}", settings_path))?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        Ok(Self {
            thresholds: raw.insights,
            limits: raw.charts,
            default_dataset: raw.default_dataset.clone(),
            _raw_settings: raw,
        })
    }

    /// Save config to the app directory
    /// Preserves other settings that the CLI doesn't manage
    pub fn save(&self, app_dir: &Path) -> Result<()> {
        let settings_path = app_dir.join("settings.json");

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            self._raw_settings.clone()
        };

        settings.insights = self.thresholds;
        settings.charts = self.limits;
        settings.default_dataset = self.default_dataset.clone();

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    /// Change one setting by its CLI key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "spike-pct" => self.thresholds.spike_pct = parse_pct(key, value)?,
            "drop-pct" => self.thresholds.drop_pct = parse_pct(key, value)?,
            "concentration-pct" => self.thresholds.concentration_pct = parse_pct(key, value)?,
            "max-insights" => self.thresholds.max_insights = parse_count(key, value)?,
            "bar-top" => self.limits.bar_top = parse_count(key, value)?,
            "pie-top" => self.limits.pie_top = Some(parse_count(key, value)?),
            "comparison-top" => self.limits.comparison_top = parse_count(key, value)?,
            "default-dataset" => self.default_dataset = Some(PathBuf::from(value)),
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// Restore one setting to its default
    pub fn unset(&mut self, key: &str) -> Result<()> {
        let thresholds = InsightThresholds::default();
        let limits = ChartLimits::default();
        match key {
            "spike-pct" => self.thresholds.spike_pct = thresholds.spike_pct,
            "drop-pct" => self.thresholds.drop_pct = thresholds.drop_pct,
            "concentration-pct" => self.thresholds.concentration_pct = thresholds.concentration_pct,
            "max-insights" => self.thresholds.max_insights = thresholds.max_insights,
            "bar-top" => self.limits.bar_top = limits.bar_top,
            "pie-top" => self.limits.pie_top = limits.pie_top,
            "comparison-top" => self.limits.comparison_top = limits.comparison_top,
            "default-dataset" => self.default_dataset = None,
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// Current value of every setting, keyed like `set`
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("spike-pct", self.thresholds.spike_pct.to_string()),
            ("drop-pct", self.thresholds.drop_pct.to_string()),
            ("concentration-pct", self.thresholds.concentration_pct.to_string()),
            ("max-insights", self.thresholds.max_insights.to_string()),
            ("bar-top", self.limits.bar_top.to_string()),
            (
                "pie-top",
                self.limits.pie_top.map_or_else(|| "all".to_string(), |n| n.to_string()),
            ),
            ("comparison-top", self.limits.comparison_top.to_string()),
            (
                "default-dataset",
                self.default_dataset
                    .as_ref()
                    .map_or_else(|| "bundled sample".to_string(), |p| p.display().to_string()),
            ),
        ]
    }
}

fn unknown_key(key: &str) -> anyhow::Error {
    anyhow::anyhow!("Unknown setting '{}' (expected one of: {})", key, SETTING_KEYS.join(", "))
}

fn parse_pct(key: &str, raw: &str) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{} must be a number, got '{}'", key, raw))?;
    if !value.is_finite() {
        anyhow::bail!("{} must be finite", key);
    }
    Ok(value)
}

fn parse_count(key: &str, raw: &str) -> Result<usize> {
    raw.trim()
        .parse()
        .with_context(|| format!("{} must be a whole number, got '{}'", key, raw))
}

fn env_pct(key: &str) -> Result<Option<f64>> {
    match std::env::var(key) {
        Ok(raw) => parse_pct(key, &raw).map(Some),
        Err(_) => Ok(None),
    }
}
