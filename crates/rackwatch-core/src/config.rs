// crates/rackwatch-core/src/config.rs

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid value '{value}' for {var}")]
    EnvVar { var: String, value: String },
}

/// Anomaly thresholds. Runtime configuration rather than compiled-in
/// constants: the two legacy handlers drifted apart on the exact values
/// (85 vs 90 for temperature, 0.5 vs 0.7 for vibration), so the resolved
/// defaults below are authoritative and deployments that want different
/// values set them in config instead of forking the code.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    /// Above this, cooling may be needed (°F).
    pub temperature_high_f: f64,
    /// Below this, risk of static (%RH).
    pub humidity_low_pct: f64,
    /// Above this, risk of condensation (%RH).
    pub humidity_high_pct: f64,
    /// Above this, potential mechanical issue.
    pub vibration_high: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            temperature_high_f: 85.0,
            humidity_low_pct: 20.0,
            humidity_high_pct: 60.0,
            vibration_high: 0.5,
        }
    }
}

impl Thresholds {
    /// Loads thresholds from an optional TOML file, then applies per-field
    /// env overrides (`RACKWATCH_TEMP_THRESHOLD_F` and friends). Unset
    /// fields keep their defaults; a malformed override is an error rather
    /// than a silent fallback.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut thresholds = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                toml::from_str(&raw)?
            }
            None => Thresholds::default(),
        };

        override_from_env("RACKWATCH_TEMP_THRESHOLD_F", &mut thresholds.temperature_high_f)?;
        override_from_env("RACKWATCH_HUMIDITY_LOW_PCT", &mut thresholds.humidity_low_pct)?;
        override_from_env("RACKWATCH_HUMIDITY_HIGH_PCT", &mut thresholds.humidity_high_pct)?;
        override_from_env("RACKWATCH_VIBRATION_HIGH", &mut thresholds.vibration_high)?;

        Ok(thresholds)
    }
}

fn override_from_env(var: &str, field: &mut f64) -> Result<(), ConfigError> {
    if let Ok(raw) = std::env::var(var) {
        *field = raw.trim().parse().map_err(|_| ConfigError::EnvVar {
            var: var.to_string(),
            value: raw,
        })?;
    }
    Ok(())
}

/// Process-wide pipeline configuration, immutable after startup.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub thresholds: Thresholds,
    /// Upper bound on every external sink call. The pipeline must never
    /// hang on a collaborator.
    pub sink_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            thresholds: Thresholds::default(),
            sink_timeout: Duration::from_secs(5),
        }
    }
}
