//! Pure timing blocks for the CCD readout controller.
//!
//! This crate holds the arithmetic core of the workspace, free of any
//! transport or I/O concerns:
//!
//! - **Clock codes** ([`clock`]): quantization of microsecond intervals
//!   into the sequencer firmware's two-regime clock-count encoding
//! - **Analog front end** ([`analog`]): the dual-slope integrator's
//!   discrete gain set and slow/fast speed selection
//!
//! # Example
//!
//! ```
//! use ccd_timing::{ClockCode, Gain, IntegratorSpeed};
//!
//! // 10 us lands in the coarse regime: 31 steps of 320 ns.
//! let code = ClockCode::quantize(10.0);
//! assert_eq!(code.word(), 0x009F_0000);
//!
//! // 10 us is a slow integration; 2 us would be fast.
//! assert_eq!(IntegratorSpeed::for_integration_time(10.0), IntegratorSpeed::Slow);
//!
//! let gain = Gain::try_from(5).unwrap();
//! assert_eq!(gain.wire(), 5);
//! ```

pub mod analog;
pub mod clock;

pub use analog::*;
pub use clock::*;
