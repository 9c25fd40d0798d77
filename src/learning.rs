//! ISO Learning - differential-Hebbian weight update
//!
//! A predictive weight grows when its filter output coincides with a rising
//! combined activity, and shrinks when it coincides with a falling one.
//!
//! # Update Law
//!
//! For every predictive (channel, slot) with filter output `u` and weight `w`:
//!
//! ```text
//! c        = third * delta * u  -  decay * w * |u| * |delta|
//! integral = c - (c - c_prev) / 2          (trapezoid, = (c + c_prev) / 2)
//! w       += rate * integral
//! ```
//!
//! `delta` is the one-step derivative of the combined activity. The decay
//! term is gated by both magnitudes, so it shrinks weights toward zero
//! without flipping their sign on its own.

use crate::config::IsoConfig;

/// Integration constant applied in the weight update
pub const INTEGRATION_CONSTANT: f64 = 0.00001;

/// Correlation term for one predictive filter
#[inline]
pub fn iso_correlation(third_factor: f64, delta: f64, output: f64, decay: f64, weight: f64) -> f64 {
    third_factor * delta * output - decay * weight * output.abs() * delta.abs()
}

/// Trapezoidal step of the running integral
#[inline]
pub fn trapezoid(correlation: f64, last_correlation: f64) -> f64 {
    correlation - (correlation - last_correlation) / 2.0
}

/// Apply one ISO learning step over the predictive part of the bank
///
/// # Arguments
///
/// * `weights` - Predictive weights, row-major (mutable)
/// * `last_correlation` - Previous correlation per weight (mutable)
/// * `outputs` - Current filter outputs, same layout
/// * `delta` - Derivative of the combined activity
/// * `config` - Learning configuration
///
/// # Returns
///
/// Total absolute weight change this step
pub fn iso_update(
    weights: &mut [f64],
    last_correlation: &mut [f64],
    outputs: &[f64],
    delta: f64,
    config: &IsoConfig,
) -> f64 {
    assert_eq!(weights.len(), outputs.len());
    assert_eq!(weights.len(), last_correlation.len());

    let rate = config.effective_rate();
    let mut moved = 0.0;

    for ((w, c_prev), &u) in weights
        .iter_mut()
        .zip(last_correlation.iter_mut())
        .zip(outputs.iter())
    {
        let correlation = iso_correlation(config.third_factor, delta, u, config.decay, *w);
        let integral = trapezoid(correlation, *c_prev);
        let step = rate * integral;
        *w += step;
        *c_prev = correlation;
        moved += step.abs();
    }

    moved
}
