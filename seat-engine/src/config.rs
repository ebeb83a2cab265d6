//! Engine configuration
//!
//! Every section has production defaults; hosts override single values with
//! the `with_*` builders or ship a JSON file loaded through [`EngineConfig::load`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Durations are stored as integer milliseconds in JSON
mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Pan/zoom controller tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Zoom level a double tap jumps to
    pub double_tap_scale: f64,
    /// Extra pan allowance beyond the content half-extent (canvas units)
    pub pan_margin: f64,
    /// Velocity decay time constant for inertial panning
    #[serde(with = "millis")]
    pub inertia_time_constant: Duration,
    /// Hard cap on inertial motion
    #[serde(with = "millis")]
    pub settle_duration: Duration,
    /// Velocity (canvas units / s) below which motion stops
    pub min_velocity: f64,
    #[serde(with = "millis")]
    pub animation_duration: Duration,
    /// Fraction of the canvas left around a focused region
    pub focus_padding: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.7,
            max_scale: 3.1,
            double_tap_scale: 2.0,
            pan_margin: 24.0,
            inertia_time_constant: Duration::from_millis(250),
            settle_duration: Duration::from_secs(1),
            min_velocity: 5.0,
            animation_duration: Duration::from_millis(250),
            focus_padding: 0.15,
        }
    }
}

impl ViewportConfig {
    pub fn with_scale_bounds(mut self, min: f64, max: f64) -> Self {
        self.min_scale = min;
        self.max_scale = max;
        self
    }

    pub fn with_pan_margin(mut self, margin: f64) -> Self {
        self.pan_margin = margin;
        self
    }

    pub fn with_animation_duration(mut self, duration: Duration) -> Self {
        self.animation_duration = duration;
        self
    }

    pub fn with_settle_duration(mut self, duration: Duration) -> Self {
        self.settle_duration = duration;
        self
    }

    pub(crate) fn validate(&self) -> EngineResult<()> {
        if !(self.min_scale > 0.0 && self.min_scale <= 1.0 && self.max_scale >= 1.0) {
            return Err(EngineError::Config(format!(
                "scale bounds must satisfy 0 < min <= 1 <= max (got {}..{})",
                self.min_scale, self.max_scale
            )));
        }
        if !(self.pan_margin.is_finite() && self.pan_margin >= 0.0) {
            return Err(EngineError::Config(format!(
                "pan_margin must be a non-negative number (got {})",
                self.pan_margin
            )));
        }
        if !(0.0..0.5).contains(&self.focus_padding) {
            return Err(EngineError::Config(format!(
                "focus_padding must be in [0, 0.5) (got {})",
                self.focus_padding
            )));
        }
        Ok(())
    }
}

/// Availability polling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    #[serde(with = "millis")]
    pub poll_interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(15),
        }
    }
}

impl SyncConfig {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Suggestion search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    #[serde(with = "millis")]
    pub debounce: Duration,
    pub min_query_chars: usize,
    pub max_query_chars: usize,
    /// Results requested per query (backend accepts 1..=8)
    pub limit: usize,
    pub enabled: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(200),
            min_query_chars: 2,
            max_query_chars: 80,
            limit: 5,
            enabled: true,
        }
    }
}

impl SearchConfig {
    pub const MAX_LIMIT: usize = 8;

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_min_query_chars(mut self, chars: usize) -> Self {
        self.min_query_chars = chars;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Limit clamped to what the backend accepts
    pub fn effective_limit(&self) -> usize {
        self.limit.clamp(1, Self::MAX_LIMIT)
    }
}

/// Log output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset
    pub directives: String,
    /// Directory for daily rolling log files; stdout only when `None`
    pub log_dir: Option<PathBuf>,
    pub file_prefix: String,
    /// Write the log file as JSON lines
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directives: "info".to_string(),
            log_dir: None,
            file_prefix: "seat-engine.log".to_string(),
            json: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_directives(mut self, directives: impl Into<String>) -> Self {
        self.directives = directives.into();
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub viewport: ViewportConfig,
    pub sync: SyncConfig,
    pub search: SearchConfig,
    pub logging: LoggingConfig,
}

impl EngineConfig {
    pub fn with_viewport(mut self, viewport: ViewportConfig) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_sync(mut self, sync: SyncConfig) -> Self {
        self.sync = sync;
        self
    }

    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Reject values the engines cannot run with
    pub fn validate(&self) -> EngineResult<()> {
        self.viewport.validate()?;
        if self.sync.poll_interval.is_zero() {
            return Err(EngineError::Config("poll_interval must be > 0".into()));
        }
        if self.search.min_query_chars > self.search.max_query_chars {
            return Err(EngineError::Config(
                "min_query_chars must not exceed max_query_chars".into(),
            ));
        }
        Ok(())
    }

    /// 从文件加载配置 (missing file yields defaults)
    pub fn load(path: &Path) -> EngineResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No engine config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            serde_json::from_str(&content).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save(&self, path: &Path) -> EngineResult<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| EngineError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.viewport.min_scale, 0.7);
        assert_eq!(config.viewport.max_scale, 3.1);
        assert_eq!(config.sync.poll_interval, Duration::from_secs(15));
        assert_eq!(config.search.debounce, Duration::from_millis(200));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::default()
            .with_sync(SyncConfig::default().with_poll_interval(Duration::from_secs(5)))
            .with_search(SearchConfig::default().with_limit(50).with_enabled(false));
        assert_eq!(config.sync.poll_interval, Duration::from_secs(5));
        assert_eq!(config.search.effective_limit(), 8);
        assert!(!config.search.enabled);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");

        let config = EngineConfig::default()
            .with_viewport(ViewportConfig::default().with_scale_bounds(0.5, 4.0))
            .with_logging(LoggingConfig::default().with_directives("debug,seat_engine=trace"));
        config.save(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"poll_interval\": 15000"));

        let loaded = EngineConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = EngineConfig::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(loaded, EngineConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{"search": {"debounce": 350}}"#).unwrap();
        let loaded = EngineConfig::load(&path).unwrap();
        assert_eq!(loaded.search.debounce, Duration::from_millis(350));
        assert_eq!(loaded.search.min_query_chars, 2);
        assert_eq!(loaded.viewport, ViewportConfig::default());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad = EngineConfig::default()
            .with_viewport(ViewportConfig::default().with_scale_bounds(1.5, 3.0));
        assert!(matches!(bad.validate(), Err(EngineError::Config(_))));

        let bad = EngineConfig::default()
            .with_sync(SyncConfig::default().with_poll_interval(Duration::ZERO));
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_negative_pan_margin_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{"viewport": {"pan_margin": -1000}}"#).unwrap();
        assert!(matches!(EngineConfig::load(&path), Err(EngineError::Config(_))));
    }
}
