//! Bandpass Resonator
//!
//! ## Kernel
//!
//! ```text
//! omega = 2 pi f            (f in cycles per sample)
//! e     = omega / (2 Q)
//! w     = sqrt(omega^2 - e^2)
//! h(t)  = e^{-e t} sin(w t) / w
//! ```
//!
//! Discretised as `y[n] = b0 x[n] + c1 y[n-1] - c2 y[n-2]`, whose impulse
//! response is `h(n + 1)`: the current sample shows up in the current
//! output. Q <= 0.5 is over-damped and uses `sinh` in place of `sin`.

use crate::error::{IsoError, Result};
use super::TimeFilter;
use std::f64::consts::PI;

/// Pole layout of the resonator, carrying `w`
#[derive(Clone, Copy, Debug)]
enum Damping {
    Under(f64),
    Over(f64),
    Critical,
}

impl Damping {
    /// Continuous kernel h(t) for decay rate `e`
    fn kernel(self, e: f64, t: f64) -> f64 {
        let envelope = (-e * t).exp();
        match self {
            Self::Under(w) => envelope * (w * t).sin() / w,
            Self::Over(w) => envelope * (w * t).sinh() / w,
            Self::Critical => envelope * t,
        }
    }
}

/// Damped second-order resonator normalised to unit impulse-response peak
#[derive(Clone, Debug)]
pub struct BandpassFilter {
    /// Centre frequency (cycles per sample)
    pub frequency: f64,
    /// Quality factor
    pub quality: f64,
    /// Input gain (includes normalisation)
    b0: f64,
    /// First feedback coefficient
    c1: f64,
    /// Second feedback coefficient
    c2: f64,
    /// y[n-1]
    y1: f64,
    /// y[n-2]
    y2: f64,
}

impl BandpassFilter {
    /// Band between under- and over-damped treated as critical damping
    const CRITICAL_EPS: f64 = 1e-12;
    /// Envelope ratio at which the impulse response counts as settled
    const SETTLE_RATIO: f64 = 1e-9;
    /// Upper bound on samples scanned for the peak (see `new` for longer kernels)
    const MAX_SETTLE: usize = 100_000;

    /// Create a resonator at `frequency` with quality `quality`
    pub fn new(frequency: f64, quality: f64) -> Result<Self> {
        if !frequency.is_finite() || frequency <= 0.0 {
            return Err(IsoError::InvalidFilter(format!(
                "bandpass frequency must be positive, got {}",
                frequency
            )));
        }
        if !quality.is_finite() || quality <= 0.0 {
            return Err(IsoError::InvalidFilter(format!(
                "bandpass quality must be positive, got {}",
                quality
            )));
        }

        let omega = 2.0 * PI * frequency;
        let e = omega / (2.0 * quality);
        let disc = omega * omega - e * e;
        let decay = (-e).exp();

        let damping = if disc > Self::CRITICAL_EPS {
            Damping::Under(disc.sqrt())
        } else if disc < -Self::CRITICAL_EPS {
            Damping::Over((-disc).sqrt())
        } else {
            Damping::Critical
        };
        let (c1, radius, peak_time) = match damping {
            Damping::Under(w) => (2.0 * decay * w.cos(), decay, (w / e).atan() / w),
            Damping::Over(w) => (2.0 * decay * w.cosh(), (w - e).exp(), (w / e).atanh() / w),
            Damping::Critical => (2.0 * decay, decay, 1.0 / e),
        };
        let c2 = decay * decay;

        let mut filter = Self {
            frequency,
            quality,
            b0: damping.kernel(e, 1.0),
            c1,
            c2,
            y1: 0.0,
            y2: 0.0,
        };

        // The scan catches aliased peaks near Nyquist; the sampled kernel
        // around peak_time catches peaks beyond the scan at low frequencies.
        let analytic = [peak_time.floor(), peak_time.ceil()]
            .iter()
            .map(|&t| damping.kernel(e, t.max(1.0)).abs())
            .fold(0.0f64, f64::max);
        let peak = filter.raw_peak(Self::settle_len(radius)).max(analytic);
        if !peak.is_finite() || peak <= 0.0 {
            return Err(IsoError::InvalidFilter(format!(
                "bandpass f={} Q={} has no usable impulse response",
                frequency, quality
            )));
        }
        filter.b0 /= peak;
        filter.reset();
        Ok(filter)
    }

    /// Samples until the envelope falls below SETTLE_RATIO
    fn settle_len(radius: f64) -> usize {
        if radius <= 0.0 || radius >= 1.0 {
            return Self::MAX_SETTLE;
        }
        let n = (Self::SETTLE_RATIO.ln() / radius.ln()).ceil();
        (n as usize).clamp(16, Self::MAX_SETTLE)
    }

    /// Peak |h[n]| of the un-normalised kernel
    fn raw_peak(&mut self, len: usize) -> f64 {
        self.reset();
        let mut peak = 0.0f64;
        for n in 0..len {
            self.filter(if n == 0 { 1.0 } else { 0.0 });
            peak = peak.max(self.y1.abs());
        }
        self.reset();
        peak
    }

    /// Feedback coefficients (c1, c2)
    pub fn coefficients(&self) -> (f64, f64) {
        (self.c1, self.c2)
    }
}

impl TimeFilter for BandpassFilter {
    fn filter(&mut self, sample: f64) {
        let y = self.b0 * sample + self.c1 * self.y1 - self.c2 * self.y2;
        self.y2 = self.y1;
        self.y1 = y;
    }

    fn output(&self) -> f64 {
        self.y1
    }

    fn reset(&mut self) {
        self.y1 = 0.0;
        self.y2 = 0.0;
    }

    fn kind(&self) -> &'static str {
        "Bandpass"
    }
}
