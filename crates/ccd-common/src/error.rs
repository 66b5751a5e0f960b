use thiserror::Error;

/// Controller error types covering configuration, transport, and
/// hardware-reported command failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CcdError {
    /// Configuration or initialization error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Command channel failure (device lost, timeout, short reply).
    #[error("transport error: {0}")]
    Transport(String),

    /// The controller answered a command with something other than the
    /// "done" sentinel. The raw reply word is preserved for diagnostics;
    /// the core does not classify it further.
    #[error("command {command} rejected by controller, reply 0x{reply:08X}")]
    CommandRejected {
        /// Mnemonic of the rejected command.
        command: String,
        /// Raw reply word returned by the hardware.
        reply: u32,
    },

    /// A dual-slope integrator gain outside the supported set was
    /// requested. Rejected before anything is transmitted.
    #[error("invalid dual-slope integrator gain {0}, expected one of 1, 2, 5, 10")]
    InvalidGain(u32),
}

/// Convenience type alias for controller operations.
pub type CcdResult<T> = Result<T, CcdError>;
