//! Engine Snapshots - checkpoint learned weights between runs
//!
//! Captures weights, correlation history and the scalar run state.
//! Filter histories are NOT captured: a restored engine resumes with
//! its filters as they currently are.

use crate::bank::Grid;
use crate::engine::{Isolearning, RunState};
use crate::error::{IsoError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serializable engine state
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Channels (reflex included)
    pub n_channels: usize,
    /// Filters per channel
    pub n_filters: usize,
    /// Weights, row-major
    pub weights: Vec<f64>,
    /// Correlation history, row-major
    pub last_correlation: Vec<f64>,
    /// Scalar run state
    pub state: RunState,
    /// Completed steps
    pub steps: u64,
}

impl EngineSnapshot {
    /// Weight at (channel, slot)
    pub fn weight(&self, channel: usize, slot: usize) -> Option<f64> {
        (channel < self.n_channels && slot < self.n_filters)
            .then(|| self.weights[channel * self.n_filters + slot])
    }

    /// Save as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Failed to encode snapshot")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))
    }

    /// Load from JSON
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to decode snapshot {}", path.display()))
    }
}

impl Isolearning {
    /// Capture weights, correlation history and run state
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            n_channels: self.n_channels(),
            n_filters: self.n_filters(),
            weights: self.weights().as_slice().to_vec(),
            last_correlation: self.correlations().as_slice().to_vec(),
            state: *self.state(),
            steps: self.steps(),
        }
    }

    /// Restore from a snapshot of the same shape
    pub fn restore(&mut self, snapshot: &EngineSnapshot) -> Result<()> {
        let expected = (self.n_channels(), self.n_filters());
        let actual = (snapshot.n_channels, snapshot.n_filters);
        if expected != actual {
            return Err(IsoError::ShapeMismatch { expected, actual });
        }

        let (rows, cols) = actual;
        let weights = Grid::from_vec(rows, cols, snapshot.weights.clone()).ok_or_else(|| {
            IsoError::Snapshot(format!(
                "{} weights for a {}x{} bank",
                snapshot.weights.len(),
                rows,
                cols
            ))
        })?;
        let last_correlation = Grid::from_vec(rows, cols, snapshot.last_correlation.clone())
            .ok_or_else(|| {
                IsoError::Snapshot(format!(
                    "{} correlations for a {}x{} bank",
                    snapshot.last_correlation.len(),
                    rows,
                    cols
                ))
            })?;
        if weights[(0, 0)] != 1.0 {
            return Err(IsoError::Snapshot(format!(
                "reflex weight must be 1.0, got {}",
                weights[(0, 0)]
            )));
        }

        self.restore_parts(weights, last_correlation, snapshot.state, snapshot.steps);
        Ok(())
    }
}
