//! Processor configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::error::InvalidParameterError;

/// Default current magnitude (mA) below which a row counts as rest.
pub const DEFAULT_CURRENT_THRESHOLD_MA: f64 = 1e-6;

/// How the parser reacts to a malformed data row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Skip the row, log it and report it to the caller.
    #[default]
    Tolerant,
    /// Abort the load on the first malformed row.
    Strict,
}

/// Settings passed explicitly into every load / processing call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Anti-noise threshold for cycle boundary detection (mA).
    #[serde(default = "default_threshold")]
    pub current_threshold_ma: f64,

    #[serde(default)]
    pub parse_mode: ParseMode,

    /// Above this fraction of wrong-width rows the file is rejected as a whole.
    #[serde(default = "default_mismatch_fraction")]
    pub max_column_mismatch_fraction: f64,
}

fn default_threshold() -> f64 {
    DEFAULT_CURRENT_THRESHOLD_MA
}

fn default_mismatch_fraction() -> f64 {
    0.5
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            current_threshold_ma: default_threshold(),
            parse_mode: ParseMode::default(),
            max_column_mismatch_fraction: default_mismatch_fraction(),
        }
    }
}

impl ProcessorConfig {
    /// Load a configuration from a JSON file. Missing fields fall back to defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        use anyhow::Context;

        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject out-of-range values before they reach the processor.
    pub fn validate(&self) -> Result<(), InvalidParameterError> {
        validate_threshold(self.current_threshold_ma)?;
        let f = self.max_column_mismatch_fraction;
        if !(0.0..=1.0).contains(&f) {
            return Err(InvalidParameterError::new(
                "max_column_mismatch_fraction",
                f,
                "must lie in [0, 1]",
            ));
        }
        Ok(())
    }
}

pub fn validate_threshold(threshold: f64) -> Result<(), InvalidParameterError> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(InvalidParameterError::new(
            "current_threshold_ma",
            threshold,
            "must be a finite, non-negative current",
        ));
    }
    Ok(())
}
