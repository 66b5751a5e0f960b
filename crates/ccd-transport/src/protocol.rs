//! Protocol constants shared between the core and transport
//! implementations.
//!
//! The controller addresses commands to a backplane board and identifies
//! each command and reply by a three-letter ASCII mnemonic packed
//! big-endian into the low 24 bits of a word ("DON" is 0x0044_4F4E).
//! Keeping the vocabulary as closed enums here means neither the core
//! nor a transport ever spells a magic literal.

/// Reply word acknowledging a command: ASCII "DON".
pub const REPLY_DONE: u32 = 0x0044_4F4E;

/// Reply word the firmware uses for a generic error: ASCII "ERR".
///
/// Informational only; the core treats every non-[`REPLY_DONE`] reply
/// uniformly as a rejection.
pub const REPLY_ERROR: u32 = 0x0045_5252;

/// Backplane boards addressable through the controller interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum BoardId {
    /// Host interface board.
    Interface = 1,
    /// Timing sequencer board. Carries the whole timing vocabulary.
    Timing = 2,
    /// Utility board.
    Utility = 3,
}

impl BoardId {
    /// Numeric board id used on the wire.
    #[must_use]
    pub fn id(self) -> u32 {
        self as u32
    }
}

impl std::fmt::Display for BoardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Interface => write!(f, "interface"),
            Self::Timing => write!(f, "timing"),
            Self::Utility => write!(f, "utility"),
        }
    }
}

/// Timing-board command vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CommandCode {
    /// "CIT" - set the dual-slope integration time.
    SetIntegralTime = 0x0043_4954,
    /// "SGN" - set integrator gain and speed.
    SetGainAndSpeed = 0x0053_474E,
    /// "CPR" - set the pre-pedestal settling wait.
    SetPedestalWait = 0x0043_5052,
    /// "CPO" - set the pre-signal settling wait.
    SetSignalWait = 0x0043_504F,
    /// "DGW" - set the dump gate pulse width.
    SetDumpGateWidth = 0x0044_4757,
    /// "OGW" - set the output gate pulse width.
    SetOutputGateWidth = 0x004F_4757,
    /// "RSW" - set the skipping reset gate pulse width.
    SetResetGateWidth = 0x0052_5357,
    /// "SWW" - set the summing well pulse width.
    SetSummingWellWidth = 0x0053_5757,
}

impl CommandCode {
    /// Packed opcode word used on the wire.
    #[must_use]
    pub fn opcode(self) -> u32 {
        self as u32
    }

    /// Three-letter mnemonic for logs and error messages.
    #[must_use]
    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::SetIntegralTime => "CIT",
            Self::SetGainAndSpeed => "SGN",
            Self::SetPedestalWait => "CPR",
            Self::SetSignalWait => "CPO",
            Self::SetDumpGateWidth => "DGW",
            Self::SetOutputGateWidth => "OGW",
            Self::SetResetGateWidth => "RSW",
            Self::SetSummingWellWidth => "SWW",
        }
    }
}

impl std::fmt::Display for CommandCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcodes_are_packed_ascii() {
        let packed = |m: &str| -> u32 {
            m.bytes().fold(0, |acc, b| (acc << 8) | u32::from(b))
        };
        assert_eq!(CommandCode::SetIntegralTime.opcode(), packed("CIT"));
        assert_eq!(CommandCode::SetGainAndSpeed.opcode(), packed("SGN"));
        assert_eq!(CommandCode::SetPedestalWait.opcode(), packed("CPR"));
        assert_eq!(CommandCode::SetSignalWait.opcode(), packed("CPO"));
        assert_eq!(CommandCode::SetDumpGateWidth.opcode(), packed("DGW"));
        assert_eq!(CommandCode::SetOutputGateWidth.opcode(), packed("OGW"));
        assert_eq!(CommandCode::SetResetGateWidth.opcode(), packed("RSW"));
        assert_eq!(CommandCode::SetSummingWellWidth.opcode(), packed("SWW"));
        assert_eq!(REPLY_DONE, packed("DON"));
        assert_eq!(REPLY_ERROR, packed("ERR"));
    }

    #[test]
    fn test_board_ids() {
        assert_eq!(BoardId::Interface.id(), 1);
        assert_eq!(BoardId::Timing.id(), 2);
        assert_eq!(BoardId::Utility.id(), 3);
    }

    #[test]
    fn test_mnemonic_display() {
        assert_eq!(CommandCode::SetGainAndSpeed.to_string(), "SGN");
        assert_eq!(BoardId::Timing.to_string(), "timing");
    }
}
