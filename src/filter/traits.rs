//! Core Trait - the contract the learning engine relies on
//!
//! The engine only ever feeds samples and reads the latest output.
//! Anything else (coefficients, history) stays inside the kernel.

/// One time-domain filter advancing one sample per call
pub trait TimeFilter {
    /// Feed one input sample, advancing internal state by one step
    fn filter(&mut self, sample: f64);

    /// Output for the most recently applied sample
    fn output(&self) -> f64;

    /// Clear history, keep coefficients
    fn reset(&mut self);

    /// Kernel name for diagnostics
    fn kind(&self) -> &'static str;
}
