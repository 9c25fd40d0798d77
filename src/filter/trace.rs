//! Trace Kernel
//!
//! ```text
//! h[k] = (k / tau)^order * e^{-k / tau},   k = 0 .. taps-1
//! ```
//!
//! order 0 is a plain exponential trace, order 1 an alpha function.
//! Peak gain depends on tau and order; the kernel is NOT normalised.

use crate::error::{IsoError, Result};
use super::TimeFilter;
use std::collections::VecDeque;

/// FIR exponential-trace filter
#[derive(Clone, Debug)]
pub struct TraceFilter {
    /// Number of taps
    pub taps: usize,
    /// Decay time constant (samples)
    pub tau: f64,
    /// Polynomial order of the rising edge
    pub order: u32,
    /// Kernel coefficients, newest sample first
    kernel: Vec<f64>,
    /// Input history, newest sample first
    history: VecDeque<f64>,
    /// Last output
    output: f64,
}

impl TraceFilter {
    /// Create a trace kernel. A tap count of 0 is raised to 1.
    pub fn new(taps: usize, tau: f64, order: u32) -> Result<Self> {
        if !tau.is_finite() || tau <= 0.0 {
            return Err(IsoError::InvalidFilter(format!(
                "trace time constant must be positive, got {}",
                tau
            )));
        }
        let taps = if taps == 0 {
            log::warn!("Trace with 0 taps requested, using 1");
            1
        } else {
            taps
        };

        let kernel = (0..taps)
            .map(|k| {
                let x = k as f64 / tau;
                x.powi(order as i32) * (-x).exp()
            })
            .collect();

        Ok(Self {
            taps,
            tau,
            order,
            kernel,
            history: VecDeque::from(vec![0.0; taps]),
            output: 0.0,
        })
    }

    /// Kernel coefficients h[0..taps]
    pub fn kernel(&self) -> &[f64] {
        &self.kernel
    }
}

impl TimeFilter for TraceFilter {
    fn filter(&mut self, sample: f64) {
        self.history.pop_back();
        self.history.push_front(sample);
        self.output = self
            .kernel
            .iter()
            .zip(self.history.iter())
            .map(|(h, x)| h * x)
            .sum();
    }

    fn output(&self) -> f64 {
        self.output
    }

    fn reset(&mut self) {
        self.history.iter_mut().for_each(|x| *x = 0.0);
        self.output = 0.0;
    }

    fn kind(&self) -> &'static str {
        "Trace"
    }
}
