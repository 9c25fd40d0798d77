//! # Filters - Time-Domain Kernels for the Filter Bank
//!
//! Every (channel, slot) in the learning engine owns one filter. Filters
//! see one sample per step and expose a single scalar output.
//!
//! ## Kernels
//!
//! - **Bandpass**: damped resonator `h(t) = e^{-et} sin(wt) / w`,
//!   normalised to unit peak
//! - **Trace**: FIR kernel `h[k] = (k/tau)^order e^{-k/tau}`, not normalised
//! - **Idle**: unconfigured slot, output stays at zero
//!
//! ## Example
//!
//! ```ignore
//! use isolearn::filter::{FilterModel, TimeFilter};
//!
//! let mut f = FilterModel::bandpass(0.01, 0.6)?;
//! f.filter(1.0);
//! let y = f.output();
//! ```

// Core trait
mod traits;
pub use traits::TimeFilter;

// Kernels (access through FilterModel)
mod bandpass;
mod trace;
pub use bandpass::BandpassFilter;
pub use trace::TraceFilter;

// Facade enum
mod model;
pub use model::{FilterModel, IMPULSE_LEN};
