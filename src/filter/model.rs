//! FilterModel - Facade Enum
//!
//! The filter bank stores `FilterModel`s only. Kernel structs are reached
//! through this enum so the engine can swap kernels per slot.

use crate::error::Result;
use super::{BandpassFilter, TimeFilter, TraceFilter};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Samples written by `dump_impulse`
pub const IMPULSE_LEN: usize = 1000;

/// Filter variants - the facade for all kernels
#[derive(Clone, Debug, Default)]
pub enum FilterModel {
    /// Not configured yet, output stays 0
    #[default]
    Idle,
    /// Damped resonator
    Bandpass(BandpassFilter),
    /// Exponential trace
    Trace(TraceFilter),
}

impl FilterModel {
    /// Create bandpass filter
    pub fn bandpass(frequency: f64, quality: f64) -> Result<Self> {
        Ok(Self::Bandpass(BandpassFilter::new(frequency, quality)?))
    }

    /// Create trace filter
    pub fn trace(taps: usize, tau: f64, order: u32) -> Result<Self> {
        Ok(Self::Trace(TraceFilter::new(taps, tau, order)?))
    }

    /// Reconfigure in place as a bandpass (history is cleared)
    pub fn configure_bandpass(&mut self, frequency: f64, quality: f64) -> Result<()> {
        *self = Self::bandpass(frequency, quality)?;
        Ok(())
    }

    /// Reconfigure in place as a trace (history is cleared)
    pub fn configure_trace(&mut self, taps: usize, tau: f64, order: u32) -> Result<()> {
        *self = Self::trace(taps, tau, order)?;
        Ok(())
    }

    /// Whether a kernel has been set up
    pub fn is_configured(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Response of a fresh copy of this filter to a unit impulse
    pub fn impulse_response(&self, len: usize) -> Vec<f64> {
        let mut scratch = self.clone();
        scratch.reset();
        (0..len)
            .map(|n| {
                scratch.filter(if n == 0 { 1.0 } else { 0.0 });
                scratch.output()
            })
            .collect()
    }

    /// Write the impulse response as `<n> <h[n]>` lines
    pub fn dump_impulse(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut out = BufWriter::new(File::create(path.as_ref())?);
        for (n, h) in self.impulse_response(IMPULSE_LEN).iter().enumerate() {
            writeln!(out, "{} {:e}", n, h)?;
        }
        out.flush()?;
        Ok(())
    }
}

impl TimeFilter for FilterModel {
    fn filter(&mut self, sample: f64) {
        match self {
            Self::Idle => {}
            Self::Bandpass(f) => f.filter(sample),
            Self::Trace(f) => f.filter(sample),
        }
    }

    fn output(&self) -> f64 {
        match self {
            Self::Idle => 0.0,
            Self::Bandpass(f) => f.output(),
            Self::Trace(f) => f.output(),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Idle => {}
            Self::Bandpass(f) => f.reset(),
            Self::Trace(f) => f.reset(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Bandpass(f) => f.kind(),
            Self::Trace(f) => f.kind(),
        }
    }
}
