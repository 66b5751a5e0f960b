//! Clock-code quantization for the timing sequencer.
//!
//! The sequencer encodes a waveform interval as one byte: bit 7 selects
//! the step granularity (1 = 320 ns coarse steps, 0 = 40 ns fine steps)
//! and bits 6-0 carry the step count. The byte sits in bits 23-16 of the
//! 32-bit argument word appended to a timing command.

use tracing::warn;

/// Coarse regime step size in nanoseconds.
pub const COARSE_STEP_NS: u32 = 320;

/// Fine regime step size in nanoseconds.
pub const FINE_STEP_NS: u32 = 40;

/// Longest interval the encoding accepts, in microseconds. Requests above
/// this are clamped.
pub const MAX_INTERVAL_US: f64 = 163.0;

/// Bit 7 of the timing byte: set when the coarse regime is selected.
const COARSE_FLAG: u32 = 0x80;

/// Step granularity regimes available to the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Regime {
    /// 320 ns steps.
    Coarse,
    /// 40 ns steps.
    Fine,
}

impl Regime {
    /// Step size of this regime in nanoseconds.
    #[must_use]
    pub fn step_ns(self) -> u32 {
        match self {
            Self::Coarse => COARSE_STEP_NS,
            Self::Fine => FINE_STEP_NS,
        }
    }
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Coarse => write!(f, "coarse/320ns"),
            Self::Fine => write!(f, "fine/40ns"),
        }
    }
}

/// A quantized timing interval in the sequencer's packed encoding,
/// ready to be sent as a command argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClockCode(u32);

impl ClockCode {
    /// Quantize a microsecond interval into a clock code.
    ///
    /// Intervals above [`MAX_INTERVAL_US`] are clamped (with a warning,
    /// since the applied timing then differs from the request). The
    /// interval is truncated toward zero to whole nanoseconds; the
    /// firmware works in truncated nanoseconds, so rounding here would
    /// shift every boundary case.
    ///
    /// Above 4000 ns only the coarse regime can represent the interval.
    /// At or below 4000 ns both regimes are candidates: each remainder is
    /// folded to its nearer step boundary and the regime with the smaller
    /// folded error wins, ties going to coarse.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn quantize(duration_us: f64) -> Self {
        let us = if duration_us > MAX_INTERVAL_US {
            warn!(
                requested_us = duration_us,
                clamped_us = MAX_INTERVAL_US,
                "requested interval out of range, clamping"
            );
            MAX_INTERVAL_US
        } else {
            duration_us
        };

        // Truncation toward zero, not rounding.
        let ns = (us * 1000.0) as u32;

        let byte = if ns > 4000 {
            (ns / COARSE_STEP_NS) | COARSE_FLAG
        } else {
            let coarse_err = fold(ns % COARSE_STEP_NS, COARSE_STEP_NS);
            let fine_err = fold(ns % FINE_STEP_NS, FINE_STEP_NS);
            if coarse_err <= fine_err {
                (ns / COARSE_STEP_NS) | COARSE_FLAG
            } else {
                ns / FINE_STEP_NS
            }
        };

        Self(byte << 16)
    }

    /// The full 32-bit command argument word.
    #[must_use]
    pub fn word(self) -> u32 {
        self.0
    }

    /// The timing byte (bits 23-16 of the word).
    #[must_use]
    pub fn timing_byte(self) -> u8 {
        ((self.0 >> 16) & 0xFF) as u8
    }

    /// Which step regime the code selects.
    #[must_use]
    pub fn regime(self) -> Regime {
        if u32::from(self.timing_byte()) & COARSE_FLAG != 0 {
            Regime::Coarse
        } else {
            Regime::Fine
        }
    }

    /// The 7-bit step count field of the timing byte.
    ///
    /// For coarse intervals beyond ~40.9 us the quotient exceeds seven
    /// bits and the excess spills into higher word bits, matching the
    /// sequencer's integer arithmetic; this accessor reports only the
    /// field itself.
    #[must_use]
    pub fn step(self) -> u8 {
        self.timing_byte() & 0x7F
    }
}

impl std::fmt::Display for ClockCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

/// Quantize a microsecond interval into a clock code.
///
/// Free-function alias for [`ClockCode::quantize`], convenient for
/// diagnostics and doctests.
#[must_use]
pub fn quantize(duration_us: f64) -> ClockCode {
    ClockCode::quantize(duration_us)
}

/// Fold a division remainder to the distance from the nearer step
/// boundary.
fn fold(rem: u32, modulus: u32) -> u32 {
    if rem > modulus / 2 {
        modulus - rem
    } else {
        rem
    }
}
