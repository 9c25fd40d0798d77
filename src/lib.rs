//! # Isolearn - ISO Learning over Filter Banks
//!
//! Differential-Hebbian learning in the style of classical conditioning.
//! A fixed reflex pathway and learned predictive pathways are each driven
//! through time-domain filters; predictive weights grow when their filter
//! output coincides with a rising combined activity.
//!
//! ## Core Components
//!
//! - **Filters**: bandpass resonators and exponential traces behind one trait
//! - **Grid**: fixed-shape (channel, slot) storage for the bank and weights
//! - **Isolearning**: the engine, one `predict()` per timestep
//! - **DocuSink**: gnuplot friendly per-step logs
//! - **EngineSnapshot**: JSON checkpoints of learned weights
//! - **PairedPulses**: conditioning stimulus generator
//!
//! ## Channels
//!
//! | Channel | Role | Filters | Weight |
//! |---------|------|---------|--------|
//! | 0 | Reflex | slot 0 only | fixed 1.0 |
//! | 1.. | Predictive | all slots | learned |
//!
//! ## Example
//!
//! ```ignore
//! use isolearn::Isolearning;
//!
//! let mut iso = Isolearning::new(2, 5)?;
//! iso.set_reflex(0.01, 0.6)?;
//! iso.set_predictors_as_bandpass(0.1, 0.6)?;
//! iso.open_docu("run")?;
//!
//! for step in 0..1000 {
//!     iso.set_input(0, reflex[step])?;
//!     iso.set_input(1, predictive[step])?;
//!     iso.predict()?;
//!     iso.write_docu(step as u64)?;
//! }
//! ```

// Filter primitive
pub mod filter;
pub use filter::{BandpassFilter, FilterModel, TimeFilter, TraceFilter};

// Fixed-shape storage
pub mod bank;
pub use bank::Grid;

// Configuration
pub mod config;
pub use config::{BandpassSpec, IsoConfig, PredictorSetup, RateSource};

// Update law
pub mod learning;
pub use learning::{iso_correlation, iso_update, trapezoid, INTEGRATION_CONSTANT};

// Engine
pub mod engine;
pub use engine::{Isolearning, RunState};

// Run logs
pub mod docu;
pub use docu::{DocuPaths, DocuSink};

// Checkpoints
pub mod snapshot;
pub use snapshot::EngineSnapshot;

// Stimulus generation
pub mod stimulus;
pub use stimulus::{PairedPulses, Stimulus};

// Error types
mod error;
pub use error::{IsoError, Result};
