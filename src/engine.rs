//! Isolearning - the learning engine
//!
//! Owns the filter bank, the weight matrix and the correlation history.
//! Channel 0 is the reflex with one filter and a fixed weight of 1.0;
//! channels 1.. are predictive with `n_filters` learned weights each.
//!
//! ## Per-step cycle
//!
//! ```text
//! set_input(ch, x)  for every channel
//! predict()         feed bank -> activity, delta -> correlate -> integrate -> update
//! write_docu(step)  optional log row
//! ```

use crate::bank::Grid;
use crate::config::{BandpassSpec, IsoConfig, PredictorSetup};
use crate::docu::DocuSink;
use crate::error::{IsoError, Result};
use crate::filter::{FilterModel, TimeFilter};
use crate::learning::iso_update;
use serde::{Deserialize, Serialize};

/// Scalar state carried from one step to the next
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    /// Combined activity (reflex + weighted predictive outputs)
    pub activity: f64,
    /// Activity of the previous step
    pub last_activity: f64,
    /// activity - last_activity, the teaching signal
    pub delta: f64,
    /// Weighted sum of predictive outputs only
    pub auto_corr: f64,
    /// Previous auto_corr
    pub last_auto_corr: f64,
    /// auto_corr - last_auto_corr (diagnostic)
    pub delta_auto_corr: f64,
    /// Reflex filter output
    pub u_not: f64,
    /// Previous reflex filter output
    pub last_u_not: f64,
    /// u_not - last_u_not
    pub delta_u_not: f64,
    /// weight(0,0) * delta_u_not. Diagnostic only, never feeds the update.
    pub weighted_delta_u_not: f64,
    /// Sum of |dw| over predictive weights in the last step (diagnostic)
    #[serde(default)]
    pub weight_change: f64,
}

/// ISO learning engine
#[derive(Debug)]
pub struct Isolearning {
    /// Filter bank, (channel, slot)
    filters: Grid<FilterModel>,
    /// Weights, same shape as the bank
    weights: Grid<f64>,
    /// Correlation of the previous step, for the trapezoid
    last_correlation: Grid<f64>,
    /// Current sample per channel
    inputs: Vec<f64>,
    /// Previous sample per channel
    last_inputs: Vec<f64>,
    /// Channels that have received at least one sample
    fed: Vec<bool>,
    /// Predictive filter outputs of the current step (row-major, channel 1..)
    outputs: Vec<f64>,
    /// Scalar run state
    state: RunState,
    /// Configuration
    config: IsoConfig,
    /// Completed predict() calls
    steps: u64,
    /// Open log streams
    docu: Option<DocuSink>,
}

impl Isolearning {
    /// Create engine with default configuration
    pub fn new(n_channels: usize, n_filters: usize) -> Result<Self> {
        Self::with_config(n_channels, n_filters, IsoConfig::default())
    }

    /// Create engine with explicit configuration
    ///
    /// The reflex is set up from `config.reflex`; predictive banks from
    /// `config.predictors` when present, otherwise they stay idle until
    /// one of the `set_predictors_*` calls.
    pub fn with_config(n_channels: usize, n_filters: usize, config: IsoConfig) -> Result<Self> {
        if n_channels == 0 || n_filters == 0 {
            return Err(IsoError::InvalidConfig(format!(
                "need at least one channel and one filter, got {}x{}",
                n_channels, n_filters
            )));
        }
        config.validate()?;
        log::info!(
            "ISO init: # of channels = {}, # of filters = {}",
            n_channels,
            n_filters
        );

        let mut weights = Grid::new(n_channels, n_filters, 0.0);
        weights[(0, 0)] = 1.0;

        let mut engine = Self {
            filters: Grid::new(n_channels, n_filters, FilterModel::Idle),
            weights,
            last_correlation: Grid::new(n_channels, n_filters, 0.0),
            inputs: vec![0.0; n_channels],
            last_inputs: vec![0.0; n_channels],
            fed: vec![false; n_channels],
            outputs: vec![0.0; (n_channels - 1) * n_filters],
            state: RunState::default(),
            config,
            steps: 0,
            docu: None,
        };

        let reflex = engine.config.reflex;
        engine.set_reflex(reflex.frequency, reflex.quality)?;
        if let Some(setup) = engine.config.predictors {
            engine.configure_predictors(&setup)?;
        }
        Ok(engine)
    }

    // ------------------------------------------------------------------
    // Bank setup
    // ------------------------------------------------------------------

    /// Configure the reflex filter (0,0) as a bandpass
    pub fn set_reflex(&mut self, frequency: f64, quality: f64) -> Result<()> {
        self.filters[(0, 0)].configure_bandpass(frequency, quality)?;
        self.config.reflex = BandpassSpec { frequency, quality };
        self.dump_impulse(0, 0)
    }

    /// Predictive slot `j` of every channel becomes a bandpass at `frequency / (j + 1)`
    pub fn set_predictors_as_bandpass(&mut self, frequency: f64, quality: f64) -> Result<()> {
        for channel in 1..self.n_channels() {
            for slot in 0..self.n_filters() {
                let f = frequency / (slot + 1) as f64;
                log::debug!(
                    "Bandp channel {}, filter #{}: f={}, Q={}",
                    channel,
                    slot,
                    f,
                    quality
                );
                self.filters[(channel, slot)].configure_bandpass(f, quality)?;
                self.dump_impulse(channel, slot)?;
            }
        }
        self.config.predictors = Some(PredictorSetup::Bandpass { frequency, quality });
        Ok(())
    }

    /// Predictive slot `j` of every channel becomes a trace with
    /// `taps / (j + 1)` taps (truncated) and time constant `tau / (j + 1)`
    pub fn set_predictors_as_traces(&mut self, taps: usize, tau: f64, order: u32) -> Result<()> {
        for channel in 1..self.n_channels() {
            for slot in 0..self.n_filters() {
                let scale = (slot + 1) as f64;
                let slot_taps = (taps as f64 / scale) as usize;
                let slot_tau = tau / scale;
                log::debug!(
                    "Trace channel {}, filter #{}: taps={}, tau={}, order={}",
                    channel,
                    slot,
                    slot_taps,
                    slot_tau,
                    order
                );
                self.filters[(channel, slot)].configure_trace(slot_taps, slot_tau, order)?;
                self.dump_impulse(channel, slot)?;
            }
        }
        self.config.predictors = Some(PredictorSetup::Traces { taps, tau, order });
        Ok(())
    }

    /// Apply a predictor layout
    pub fn configure_predictors(&mut self, setup: &PredictorSetup) -> Result<()> {
        match *setup {
            PredictorSetup::Bandpass { frequency, quality } => {
                self.set_predictors_as_bandpass(frequency, quality)
            }
            PredictorSetup::Traces { taps, tau, order } => {
                self.set_predictors_as_traces(taps, tau, order)
            }
        }
    }

    /// Write `h0.dat` / `h<ch>_<slot>.dat` when an impulse dir is configured
    fn dump_impulse(&self, channel: usize, slot: usize) -> Result<()> {
        let Some(dir) = &self.config.impulse_dir else {
            return Ok(());
        };
        let name = if channel == 0 {
            "h0.dat".to_string()
        } else {
            format!("h{}_{:02}.dat", channel, slot)
        };
        self.filters[(channel, slot)].dump_impulse(dir.join(name))
    }

    // ------------------------------------------------------------------
    // Stepping
    // ------------------------------------------------------------------

    /// Store a new sample for `channel`; the old one becomes the last input
    pub fn set_input(&mut self, channel: usize, sample: f64) -> Result<()> {
        self.check_channel(channel)?;
        self.last_inputs[channel] = self.inputs[channel];
        self.inputs[channel] = sample;
        self.fed[channel] = true;
        Ok(())
    }

    /// One prediction/update step
    ///
    /// Fails only if some channel never received input.
    pub fn predict(&mut self) -> Result<()> {
        if let Some(channel) = self.fed.iter().position(|fed| !fed) {
            return Err(IsoError::UninitializedInput(channel));
        }
        let n_filters = self.n_filters();

        // Feed the bank: the reflex is a single filter
        self.filters[(0, 0)].filter(self.inputs[0]);
        for channel in 1..self.n_channels() {
            let sample = if self.config.only_change {
                self.inputs[channel] - self.last_inputs[channel]
            } else {
                self.inputs[channel]
            };
            for slot in 0..n_filters {
                self.filters[(channel, slot)].filter(sample);
            }
        }
        let predictive = &self.filters.as_slice()[n_filters..];
        for (out, f) in self.outputs.iter_mut().zip(predictive) {
            *out = f.output();
        }

        let state = &mut self.state;

        // Reflex output and its derivative
        state.u_not = self.filters[(0, 0)].output();
        state.delta_u_not = state.u_not - state.last_u_not;
        state.last_u_not = state.u_not;
        state.weighted_delta_u_not = self.weights[(0, 0)] * state.delta_u_not;

        // Combined activity and its derivative
        let predictive_weights = &self.weights.as_slice()[n_filters..];
        let weighted = || self.outputs.iter().zip(predictive_weights).map(|(u, w)| u * w);
        let mut activity = weighted().fold(state.u_not, |acc, x| acc + x);
        if let Some(limit) = self.config.activity_clamp {
            activity = activity.min(limit);
        }
        state.activity = activity;
        state.delta = activity - state.last_activity;
        state.last_activity = activity;

        // Predictive-only sum (diagnostic)
        state.auto_corr = weighted().fold(0.0, |acc, x| acc + x);
        state.delta_auto_corr = state.auto_corr - state.last_auto_corr;
        state.last_auto_corr = state.auto_corr;

        let delta = state.delta;
        self.state.weight_change = iso_update(
            &mut self.weights.as_mut_slice()[n_filters..],
            &mut self.last_correlation.as_mut_slice()[n_filters..],
            &self.outputs,
            delta,
            &self.config,
        );

        self.steps += 1;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Documentation
    // ------------------------------------------------------------------

    /// Open `<base>_output.dat`, `<base>_weights.dat`, `<base>_filter.dat`
    /// and `<base>_filters_weighted.dat`. Replaces any open sink.
    pub fn open_docu(&mut self, base: impl AsRef<std::path::Path>) -> Result<()> {
        self.docu = Some(DocuSink::open(base)?);
        Ok(())
    }

    /// Close the log streams
    pub fn close_docu(&mut self) {
        self.docu = None;
    }

    /// Whether log streams are open
    pub fn is_documenting(&self) -> bool {
        self.docu.is_some()
    }

    /// Append one row to each log stream (no-op without `open_docu`)
    pub fn write_docu(&mut self, step: u64) -> Result<()> {
        if let Some(docu) = self.docu.as_mut() {
            docu.write_row(
                step,
                self.state.activity,
                self.state.delta,
                &self.weights,
                &self.filters,
            )?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    fn check_channel(&self, channel: usize) -> Result<()> {
        if channel >= self.n_channels() {
            return Err(IsoError::OutOfRange {
                what: "channel",
                index: channel,
                bound: self.n_channels(),
            });
        }
        Ok(())
    }

    fn check_cell(&self, channel: usize, slot: usize) -> Result<()> {
        self.check_channel(channel)?;
        if slot >= self.n_filters() {
            return Err(IsoError::OutOfRange {
                what: "slot",
                index: slot,
                bound: self.n_filters(),
            });
        }
        Ok(())
    }

    /// Number of channels (reflex included)
    pub fn n_channels(&self) -> usize {
        self.weights.rows()
    }

    /// Filter slots per channel
    pub fn n_filters(&self) -> usize {
        self.weights.cols()
    }

    /// Weight of (channel, slot)
    pub fn weight(&self, channel: usize, slot: usize) -> Result<f64> {
        self.check_cell(channel, slot)?;
        Ok(self.weights[(channel, slot)])
    }

    /// Overwrite a predictive weight. The reflex weight (0,0) is fixed.
    pub fn set_weight(&mut self, channel: usize, slot: usize, weight: f64) -> Result<()> {
        self.check_cell(channel, slot)?;
        if (channel, slot) == (0, 0) {
            return Err(IsoError::FixedReflexWeight);
        }
        self.weights[(channel, slot)] = weight;
        Ok(())
    }

    /// Whole weight matrix
    pub fn weights(&self) -> &Grid<f64> {
        &self.weights
    }

    /// Filter at (channel, slot)
    pub fn filter(&self, channel: usize, slot: usize) -> Result<&FilterModel> {
        self.check_cell(channel, slot)?;
        Ok(&self.filters[(channel, slot)])
    }

    /// Current output of the filter at (channel, slot)
    pub fn filter_output(&self, channel: usize, slot: usize) -> Result<f64> {
        Ok(self.filter(channel, slot)?.output())
    }

    /// Whole filter bank
    pub fn filters(&self) -> &Grid<FilterModel> {
        &self.filters
    }

    /// Correlation computed for (channel, slot) in the last step
    pub fn last_correlation(&self, channel: usize, slot: usize) -> Result<f64> {
        self.check_cell(channel, slot)?;
        Ok(self.last_correlation[(channel, slot)])
    }

    /// Whole correlation history
    pub fn correlations(&self) -> &Grid<f64> {
        &self.last_correlation
    }

    /// Current sample of `channel`
    pub fn input(&self, channel: usize) -> Result<f64> {
        self.check_channel(channel)?;
        Ok(self.inputs[channel])
    }

    /// Combined activity of the last step
    pub fn activity(&self) -> f64 {
        self.state.activity
    }

    /// Activity derivative of the last step
    pub fn delta(&self) -> f64 {
        self.state.delta
    }

    /// Full scalar run state
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Completed predict() calls
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Current configuration
    pub fn config(&self) -> &IsoConfig {
        &self.config
    }

    /// Apply `edit` to a copy of the configuration; keep it only if it validates
    fn update_config(&mut self, edit: impl FnOnce(&mut IsoConfig)) -> Result<()> {
        let mut config = self.config.clone();
        edit(&mut config);
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Set the stored learning rate. Only applied when
    /// `rate_source` is `RateSource::LearningRate`. Must be finite.
    pub fn set_learning_rate(&mut self, learning_rate: f64) -> Result<()> {
        self.update_config(|c| c.learning_rate = learning_rate)
    }

    /// Set the decay coefficient. Must be finite.
    pub fn set_decay(&mut self, decay: f64) -> Result<()> {
        self.update_config(|c| c.decay = decay)
    }

    /// Set the third factor gating Hebbian growth; 0 freezes learning.
    /// Must be finite.
    pub fn set_third_factor(&mut self, third_factor: f64) -> Result<()> {
        self.update_config(|c| c.third_factor = third_factor)
    }

    /// Feed predictive filters the sample difference instead of the sample
    pub fn set_only_change(&mut self, only_change: bool) {
        self.config.only_change = only_change;
    }

    /// Saturate activity at `limit` before the derivative; `None` disables.
    /// A NaN limit is rejected.
    pub fn set_activity_clamp(&mut self, limit: Option<f64>) -> Result<()> {
        self.update_config(|c| c.activity_clamp = limit)
    }

    // ------------------------------------------------------------------
    // Snapshot plumbing (see snapshot.rs)
    // ------------------------------------------------------------------

    pub(crate) fn restore_parts(
        &mut self,
        weights: Grid<f64>,
        last_correlation: Grid<f64>,
        state: RunState,
        steps: u64,
    ) {
        self.weights = weights;
        self.last_correlation = last_correlation;
        self.state = state;
        self.steps = steps;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stimulus::PairedPulses;
    use tempfile::tempdir;

    /// 2 channels, 1 filter, reflex and predictor both bandpass(1.0, 0.6)
    fn scenario_engine() -> Isolearning {
        let mut engine = Isolearning::new(2, 1).unwrap();
        engine.set_reflex(1.0, 0.6).unwrap();
        engine.set_predictors_as_bandpass(1.0, 0.6).unwrap();
        engine
    }

    fn step(engine: &mut Isolearning, samples: &[f64]) {
        for (channel, &x) in samples.iter().enumerate() {
            engine.set_input(channel, x).unwrap();
        }
        engine.predict().unwrap();
    }

    fn pulse(n: usize) -> f64 {
        if n == 0 {
            1.0
        } else {
            0.0
        }
    }

    #[test]
    fn test_construction_defaults() {
        let engine = Isolearning::new(3, 4).unwrap();
        assert_eq!(engine.n_channels(), 3);
        assert_eq!(engine.n_filters(), 4);
        assert_eq!(engine.weight(0, 0).unwrap(), 1.0);
        for ((channel, slot), &w) in engine.weights().indexed() {
            if (channel, slot) != (0, 0) {
                assert_eq!(w, 0.0);
            }
        }
        assert_eq!(engine.config().learning_rate, 0.000001);
        assert_eq!(engine.config().decay, 0.0);
        assert_eq!(engine.config().third_factor, 1.0);
        assert_eq!(engine.filter(0, 0).unwrap().kind(), "Bandpass");
        assert!(!engine.filter(1, 0).unwrap().is_configured());
    }

    #[test]
    fn test_rejects_empty_shape() {
        assert!(Isolearning::new(0, 1).is_err());
        assert!(Isolearning::new(2, 0).is_err());
    }

    #[test]
    fn test_reflex_weight_never_changes() {
        let mut engine = Isolearning::new(3, 2).unwrap();
        engine.set_predictors_as_bandpass(0.05, 0.6).unwrap();
        engine.set_decay(0.3).unwrap();
        for n in 0..300 {
            let x = ((n as f64) * 0.37).sin();
            step(&mut engine, &[x, (n % 7) as f64, -x]);
            assert_eq!(engine.weight(0, 0).unwrap(), 1.0);
        }
        assert!(engine.weight(1, 0).unwrap() != 0.0);
    }

    #[test]
    fn test_correlation_without_decay() {
        let mut engine = scenario_engine();
        engine.set_third_factor(0.5).unwrap();
        for n in 0..30 {
            step(&mut engine, &[pulse(n), pulse(n)]);
            let u = engine.filter_output(1, 0).unwrap();
            let expected = engine.config().third_factor * engine.delta() * u;
            assert_eq!(engine.last_correlation(1, 0).unwrap(), expected);
        }
    }

    #[test]
    fn test_zero_third_factor_no_learning() {
        let mut engine = scenario_engine();
        engine.set_third_factor(0.0).unwrap();
        for n in 0..50 {
            step(&mut engine, &[pulse(n), pulse(n)]);
            assert_eq!(engine.weight(1, 0).unwrap(), 0.0);
        }
    }

    #[test]
    fn test_trapezoid_applied() {
        let mut engine = scenario_engine();
        for n in 0..20 {
            let w_before = engine.weight(1, 0).unwrap();
            let c_prev = engine.last_correlation(1, 0).unwrap();
            step(&mut engine, &[pulse(n), pulse(n)]);
            let c_new = engine.last_correlation(1, 0).unwrap();
            let applied = engine.weight(1, 0).unwrap() - w_before;
            let expected = crate::learning::INTEGRATION_CONSTANT * (c_new + c_prev) / 2.0;
            assert!(
                (applied - expected).abs() <= 1e-15,
                "step {}: applied {} expected {}",
                n,
                applied,
                expected
            );
        }
    }

    #[test]
    fn test_only_change_feeds_difference() {
        let mut engine = Isolearning::new(2, 1).unwrap();
        // 1 tap, order 0: output equals the sample fed in
        engine.set_predictors_as_traces(1, 1.0, 0).unwrap();
        engine.set_only_change(true);

        step(&mut engine, &[0.0, 3.0]);
        assert_eq!(engine.filter_output(1, 0).unwrap(), 3.0);

        step(&mut engine, &[0.0, 3.0]);
        assert_eq!(engine.filter_output(1, 0).unwrap(), 0.0);

        engine.set_only_change(false);
        step(&mut engine, &[0.0, 3.0]);
        assert_eq!(engine.filter_output(1, 0).unwrap(), 3.0);
    }

    #[test]
    fn test_scenario_paired_pulse_grows_weight() {
        let mut engine = scenario_engine();
        let mut first = None;
        for n in 0..50 {
            step(&mut engine, &[pulse(n), pulse(n)]);
            first.get_or_insert(engine.weight(1, 0).unwrap());
        }
        let w = engine.weight(1, 0).unwrap();
        assert!(first.unwrap() > 0.0);
        assert!(w > 0.0, "weight should grow, got {}", w);
    }

    #[test]
    fn test_scenario_silent_predictor_stays_zero() {
        let mut engine = scenario_engine();
        for n in 0..50 {
            step(&mut engine, &[pulse(n), 0.0]);
            assert_eq!(engine.weight(1, 0).unwrap(), 0.0);
        }
    }

    #[test]
    fn test_conditioning_predictor_leads_reflex() {
        let mut engine = Isolearning::new(2, 1).unwrap();
        engine.set_reflex(0.01, 0.6).unwrap();
        engine.set_predictors_as_bandpass(0.01, 0.6).unwrap();

        let stimulus = PairedPulses::new(400, 5, 1)
            .unwrap()
            .generate(1200)
            .unwrap();
        for (reflex, predictive) in stimulus.iter() {
            step(&mut engine, &[reflex, predictive]);
        }
        assert!(engine.weight(1, 0).unwrap() > 0.0);
    }

    #[test]
    fn test_uninitialised_input() {
        let mut engine = Isolearning::new(3, 1).unwrap();
        engine.set_input(0, 1.0).unwrap();
        engine.set_input(2, 1.0).unwrap();
        match engine.predict() {
            Err(IsoError::UninitializedInput(channel)) => assert_eq!(channel, 1),
            other => panic!("expected UninitializedInput, got {:?}", other),
        }
        engine.set_input(1, 0.0).unwrap();
        assert!(engine.predict().is_ok());
        assert_eq!(engine.steps(), 1);
    }

    #[test]
    fn test_out_of_range() {
        let mut engine = Isolearning::new(2, 3).unwrap();
        assert!(matches!(
            engine.set_input(2, 1.0),
            Err(IsoError::OutOfRange { what: "channel", index: 2, bound: 2 })
        ));
        assert!(matches!(
            engine.weight(1, 3),
            Err(IsoError::OutOfRange { what: "slot", index: 3, bound: 3 })
        ));
        assert!(engine.filter_output(5, 0).is_err());
        assert!(engine.last_correlation(0, 9).is_err());
    }

    #[test]
    fn test_set_weight() {
        let mut engine = Isolearning::new(2, 2).unwrap();
        engine.set_weight(1, 1, 0.25).unwrap();
        assert_eq!(engine.weight(1, 1).unwrap(), 0.25);
        assert!(matches!(
            engine.set_weight(0, 0, 2.0),
            Err(IsoError::FixedReflexWeight)
        ));
    }

    #[test]
    fn test_bandpass_slots_scale_frequency() {
        let mut engine = Isolearning::new(2, 3).unwrap();
        engine.set_predictors_as_bandpass(0.3, 0.7).unwrap();
        for slot in 0..3 {
            match engine.filter(1, slot).unwrap() {
                FilterModel::Bandpass(b) => {
                    assert!((b.frequency - 0.3 / (slot + 1) as f64).abs() < 1e-15);
                    assert_eq!(b.quality, 0.7);
                }
                other => panic!("expected bandpass, got {}", other.kind()),
            }
        }
        // channel 0 keeps a single reflex filter
        assert!(!engine.filter(0, 1).unwrap().is_configured());
    }

    #[test]
    fn test_trace_slots_scale_taps_and_tau() {
        let mut engine = Isolearning::new(2, 3).unwrap();
        engine.set_predictors_as_traces(10, 4.0, 1).unwrap();
        let expected = [(10, 4.0), (5, 2.0), (3, 4.0 / 3.0)];
        for (slot, &(taps, tau)) in expected.iter().enumerate() {
            match engine.filter(1, slot).unwrap() {
                FilterModel::Trace(t) => {
                    assert_eq!(t.taps, taps);
                    assert!((t.tau - tau).abs() < 1e-12);
                    assert_eq!(t.order, 1);
                }
                other => panic!("expected trace, got {}", other.kind()),
            }
        }
    }

    #[test]
    fn test_activity_clamp() {
        let mut clamped = Isolearning::new(1, 1).unwrap();
        clamped.set_activity_clamp(Some(0.5)).unwrap();
        let mut free = Isolearning::new(1, 1).unwrap();

        let mut peak_clamped = f64::MIN;
        let mut peak_free = f64::MIN;
        for n in 0..200 {
            step(&mut clamped, &[pulse(n)]);
            step(&mut free, &[pulse(n)]);
            peak_clamped = peak_clamped.max(clamped.activity());
            peak_free = peak_free.max(free.activity());
        }
        assert_eq!(peak_clamped, 0.5);
        assert!(peak_free > 0.5);
    }

    #[test]
    fn test_run_state_diagnostics() {
        let mut engine = scenario_engine();
        step(&mut engine, &[1.0, 0.0]);
        let state = *engine.state();
        assert_eq!(state.u_not, engine.filter_output(0, 0).unwrap());
        assert_eq!(state.delta_u_not, state.u_not);
        assert_eq!(state.weighted_delta_u_not, state.delta_u_not);
        assert_eq!(state.auto_corr, 0.0);
        assert_eq!(state.activity, state.u_not);
    }

    #[test]
    fn test_config_predictors_applied() {
        let config = IsoConfig {
            predictors: Some(PredictorSetup::Traces { taps: 8, tau: 2.0, order: 0 }),
            ..Default::default()
        };
        let engine = Isolearning::with_config(2, 2, config).unwrap();
        assert_eq!(engine.filter(1, 1).unwrap().kind(), "Trace");
    }

    #[test]
    fn test_impulse_dumps() {
        let dir = tempdir().unwrap();
        let config = IsoConfig {
            impulse_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let mut engine = Isolearning::with_config(3, 2, config).unwrap();
        assert!(dir.path().join("h0.dat").exists());

        engine.set_predictors_as_bandpass(0.1, 0.6).unwrap();
        for name in ["h1_00.dat", "h1_01.dat", "h2_00.dat", "h2_01.dat"] {
            assert!(dir.path().join(name).exists(), "missing {}", name);
        }
    }

    #[test]
    fn test_docu_three_steps() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("iso");

        let mut engine = Isolearning::new(2, 3).unwrap();
        engine.set_predictors_as_bandpass(0.1, 0.6).unwrap();
        engine.open_docu(&base).unwrap();
        assert!(engine.is_documenting());

        for n in 0..3 {
            step(&mut engine, &[pulse(n as usize), pulse(n as usize)]);
            engine.write_docu(n).unwrap();
        }
        engine.close_docu();

        let weights = std::fs::read_to_string(dir.path().join("iso_weights.dat")).unwrap();
        let lines: Vec<&str> = weights.lines().collect();
        assert_eq!(lines.len(), 3);
        for (n, line) in lines.iter().enumerate() {
            let fields: Vec<&str> = line.split(' ').collect();
            assert_eq!(fields[0], n.to_string());
            assert_eq!(fields.len(), 1 + 2 * 3);
            assert!(fields[1..].iter().all(|f| f.parse::<f64>().is_ok()));
        }

        let output = std::fs::read_to_string(dir.path().join("iso_output.dat")).unwrap();
        assert_eq!(output.lines().count(), 3);
    }

    #[test]
    fn test_write_docu_without_sink_is_noop() {
        let mut engine = Isolearning::new(1, 1).unwrap();
        assert!(engine.write_docu(0).is_ok());
    }

    #[test]
    fn test_setters_reject_non_finite() {
        let mut engine = Isolearning::new(2, 1).unwrap();
        let before = engine.config().clone();

        assert!(matches!(engine.set_decay(f64::NAN), Err(IsoError::InvalidConfig(_))));
        assert!(engine.set_third_factor(f64::INFINITY).is_err());
        assert!(engine.set_learning_rate(f64::NEG_INFINITY).is_err());
        assert!(engine.set_activity_clamp(Some(f64::NAN)).is_err());
        assert_eq!(engine.config(), &before);

        engine.set_decay(0.25).unwrap();
        engine.set_activity_clamp(Some(f64::INFINITY)).unwrap();
        engine.set_activity_clamp(None).unwrap();
        assert_eq!(engine.config().decay, 0.25);
        assert_eq!(engine.config().activity_clamp, None);
    }

    #[test]
    fn test_weight_change_tracks_update() {
        let mut engine = scenario_engine();
        for n in 0..40 {
            let before: Vec<f64> = engine.weights().as_slice().to_vec();
            step(&mut engine, &[pulse(n), pulse(n)]);
            let moved: f64 = engine
                .weights()
                .as_slice()
                .iter()
                .zip(&before)
                .map(|(w, b)| (w - b).abs())
                .sum();
            assert!((engine.state().weight_change - moved).abs() <= 1e-15);
        }
        assert!(engine.state().weight_change >= 0.0);

        let mut frozen = scenario_engine();
        frozen.set_third_factor(0.0).unwrap();
        for n in 0..20 {
            step(&mut frozen, &[pulse(n), pulse(n)]);
            assert_eq!(frozen.state().weight_change, 0.0);
        }
    }
}
