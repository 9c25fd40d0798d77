//! Engine Configuration - serialisable, JSON-loadable
//!
//! ```json
//! {
//!   "decay": 0.0,
//!   "third_factor": 1.0,
//!   "only_change": true,
//!   "reflex": { "frequency": 0.01, "quality": 0.6 },
//!   "predictors": { "Bandpass": { "frequency": 0.1, "quality": 0.6 } }
//! }
//! ```
//!
//! Missing keys fall back to `IsoConfig::default()`.

use crate::error::{IsoError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which scalar multiplies the integrated correlation in the weight update
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateSource {
    /// Fixed `INTEGRATION_CONSTANT` (1e-5), `learning_rate` is carried but unused
    #[default]
    IntegrationConstant,
    /// Use the configured `learning_rate`
    LearningRate,
}

/// Bandpass parameters (frequency in cycles per sample)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BandpassSpec {
    pub frequency: f64,
    pub quality: f64,
}

impl Default for BandpassSpec {
    fn default() -> Self {
        Self {
            frequency: 0.01,
            quality: 0.6,
        }
    }
}

/// How the predictive filter banks are laid out
///
/// Slot `j` of every predictive channel is scaled by `1 / (j + 1)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum PredictorSetup {
    /// Resonators at `frequency / (j + 1)`
    Bandpass { frequency: f64, quality: f64 },
    /// Traces with `taps / (j + 1)` taps and time constant `tau / (j + 1)`
    Traces { taps: usize, tau: f64, order: u32 },
}

/// Learning engine configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IsoConfig {
    /// Nominal learning rate (only applied with `RateSource::LearningRate`)
    pub learning_rate: f64,
    /// Weight decay coefficient
    pub decay: f64,
    /// Neuromodulatory gain on the correlation term
    pub third_factor: f64,
    /// Feed predictive filters with x[n] - x[n-1] instead of x[n]
    pub only_change: bool,
    /// Scalar used in the weight update
    pub rate_source: RateSource,
    /// Saturate combined activity at this value (None = unclamped)
    pub activity_clamp: Option<f64>,
    /// Reflex filter set up at construction
    pub reflex: BandpassSpec,
    /// Predictive bank layout, applied by `Isolearning::with_config` when present
    pub predictors: Option<PredictorSetup>,
    /// Directory for impulse-response dumps (None = no dumps)
    pub impulse_dir: Option<PathBuf>,
}

impl Default for IsoConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.000001,
            decay: 0.0,
            third_factor: 1.0,
            only_change: false,
            rate_source: RateSource::IntegrationConstant,
            activity_clamp: None,
            reflex: BandpassSpec::default(),
            predictors: None,
            impulse_dir: None,
        }
    }
}

impl IsoConfig {
    /// Parse from a JSON string
    pub fn from_json(source: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(source)
            .map_err(|e| IsoError::InvalidConfig(format!("bad config json: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&source)
    }

    /// Check scalar ranges
    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("learning_rate", self.learning_rate),
            ("decay", self.decay),
            ("third_factor", self.third_factor),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(IsoError::InvalidConfig(format!(
                    "{} must be finite, got {}",
                    name, value
                )));
            }
        }
        if let Some(limit) = self.activity_clamp {
            if limit.is_nan() {
                return Err(IsoError::InvalidConfig("activity_clamp is NaN".into()));
            }
        }
        Ok(())
    }

    /// Scalar applied to the integrated correlation
    pub fn effective_rate(&self) -> f64 {
        match self.rate_source {
            RateSource::IntegrationConstant => crate::learning::INTEGRATION_CONSTANT,
            RateSource::LearningRate => self.learning_rate,
        }
    }
}
