//! Paired-Pulse Stimulus - classical conditioning protocol
//!
//! A predictive (conditioned) pulse starts every `period` samples; the
//! reflex (unconditioned) pulse follows `interval` samples later. Optional
//! jitter shifts each pair by a random 0..=max samples, seeded so runs
//! repeat exactly.

use crate::error::{IsoError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Pulse pair generator
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PairedPulses {
    /// Samples between pair onsets
    pub period: usize,
    /// Delay of the reflex pulse after the predictive pulse
    pub interval: usize,
    /// Pulse width in samples
    pub width: usize,
    /// Pulse height
    pub amplitude: f64,
    /// Max random shift per pair (0 = none)
    pub jitter: usize,
    /// RNG seed for jitter
    pub seed: u64,
}

/// Generated input streams
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stimulus {
    /// Samples for channel 0
    pub reflex: Vec<f64>,
    /// Samples for the predictive channel
    pub predictive: Vec<f64>,
}

impl Stimulus {
    /// Number of samples
    pub fn len(&self) -> usize {
        self.reflex.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reflex.is_empty()
    }

    /// `(reflex, predictive)` per step
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.reflex.iter().copied().zip(self.predictive.iter().copied())
    }
}

impl PairedPulses {
    /// Unit-height pulses without jitter
    pub fn new(period: usize, interval: usize, width: usize) -> Result<Self> {
        let pulses = Self {
            period,
            interval,
            width,
            amplitude: 1.0,
            jitter: 0,
            seed: 0,
        };
        pulses.validate()?;
        Ok(pulses)
    }

    /// Period and width must be non-zero
    pub fn validate(&self) -> Result<()> {
        if self.period == 0 || self.width == 0 {
            return Err(IsoError::InvalidConfig(format!(
                "pulse period and width must be non-zero, got {} and {}",
                self.period, self.width
            )));
        }
        Ok(())
    }

    /// Set pulse height
    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Shift each pair by a random 0..=max samples
    pub fn with_jitter(mut self, max: usize, seed: u64) -> Self {
        self.jitter = max;
        self.seed = seed;
        self
    }

    /// Generate `len` samples
    ///
    /// Fields are public and deserializable, so they are checked again here.
    pub fn generate(&self, len: usize) -> Result<Stimulus> {
        self.validate()?;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut stimulus = Stimulus {
            reflex: vec![0.0; len],
            predictive: vec![0.0; len],
        };

        for onset in (0..len).step_by(self.period) {
            let shift = if self.jitter > 0 {
                rng.gen_range(0..=self.jitter)
            } else {
                0
            };
            let cs = onset.saturating_add(shift);
            self.paint(&mut stimulus.predictive, cs);
            self.paint(&mut stimulus.reflex, cs.saturating_add(self.interval));
        }
        Ok(stimulus)
    }

    fn paint(&self, samples: &mut [f64], start: usize) {
        let end = start.saturating_add(self.width).min(samples.len());
        if start < end {
            samples[start..end].fill(self.amplitude);
        }
    }
}
