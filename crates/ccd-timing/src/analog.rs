//! Dual-slope integrator settings: discrete gain and slow/fast speed.

use thiserror::Error;

/// Integration time below which the fast integrator is selected, in
/// microseconds.
pub const FAST_INTEGRATION_THRESHOLD_US: f64 = 4.5;

/// Dual-slope integrator gain.
///
/// The video board supports exactly four gain settings; anything else is
/// undefined behavior on the hardware side and is rejected here before a
/// command is ever built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gain {
    /// Unity gain.
    X1,
    /// Gain of 2.
    X2,
    /// Gain of 5.
    X5,
    /// Gain of 10.
    X10,
}

impl Gain {
    /// Wire value transmitted with the gain/speed command.
    #[must_use]
    pub fn wire(self) -> u32 {
        match self {
            Self::X1 => 1,
            Self::X2 => 2,
            Self::X5 => 5,
            Self::X10 => 10,
        }
    }
}

impl TryFrom<u32> for Gain {
    type Error = InvalidGain;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::X1),
            2 => Ok(Self::X2),
            5 => Ok(Self::X5),
            10 => Ok(Self::X10),
            other => Err(InvalidGain(other)),
        }
    }
}

impl std::fmt::Display for Gain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x", self.wire())
    }
}

/// A gain value outside the hardware's discrete set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid dual-slope integrator gain {0}, expected one of 1, 2, 5, 10")]
pub struct InvalidGain(pub u32);

/// Dual-slope integrator speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IntegratorSpeed {
    /// Slow integrator, wire value 0.
    #[default]
    Slow,
    /// Fast integrator, wire value 1.
    Fast,
}

impl IntegratorSpeed {
    /// Select the integrator speed for a requested integration time.
    ///
    /// Fast strictly below [`FAST_INTEGRATION_THRESHOLD_US`], slow at or
    /// above it.
    #[must_use]
    pub fn for_integration_time(integration_time_us: f64) -> Self {
        if integration_time_us < FAST_INTEGRATION_THRESHOLD_US {
            Self::Fast
        } else {
            Self::Slow
        }
    }

    /// Wire value transmitted with the gain/speed command.
    #[must_use]
    pub fn wire(self) -> u32 {
        match self {
            Self::Slow => 0,
            Self::Fast => 1,
        }
    }
}

impl std::fmt::Display for IntegratorSpeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Slow => write!(f, "slow"),
            Self::Fast => write!(f, "fast"),
        }
    }
}
