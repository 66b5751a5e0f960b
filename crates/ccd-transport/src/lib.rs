//! Command transport boundary for the CCD readout controller.
//!
//! This crate provides:
//! - [`CommandTransport`] trait abstracting the synchronous command/reply
//!   channel to the controller backplane
//! - [`protocol`] module with the closed board/command/reply vocabulary
//! - [`SimulatedTransport`] for bench work and tests without hardware
//!
//! A transport performs one blocking round trip per command and hands the
//! raw reply word back; interpreting the reply (against
//! [`protocol::REPLY_DONE`]) is the caller's job. Transport-level
//! failures such as a lost device or a timeout surface as
//! [`CcdError::Transport`](ccd_common::CcdError::Transport) and are
//! distinct from hardware-reported rejections.

pub mod protocol;

pub use protocol::*;

use ccd_common::CcdResult;
use std::collections::VecDeque;
use tracing::trace;

/// Synchronous command/reply channel to the controller.
///
/// Implementations block the calling thread for the round trip. Request/
/// reply pairing relies on exclusive access (`&mut self`); a shared
/// transport must be serialized by its owner.
pub trait CommandTransport: Send {
    /// Send one command to a board and return the raw reply word.
    ///
    /// # Errors
    ///
    /// Returns an error only for channel-level failures. A reply other
    /// than [`protocol::REPLY_DONE`] is not an error at this layer; the
    /// caller interprets the word.
    fn command(&mut self, board: BoardId, code: CommandCode, args: &[u32]) -> CcdResult<u32>;
}

/// One recorded command round trip, as seen by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentCommand {
    /// Board the command was addressed to.
    pub board: BoardId,
    /// Command code.
    pub code: CommandCode,
    /// Argument words, in transmission order.
    pub args: Vec<u32>,
}

/// In-memory transport for bench work and tests.
///
/// Records every request and answers from a scripted reply queue,
/// defaulting to [`protocol::REPLY_DONE`] once the queue is drained.
#[derive(Debug, Default)]
pub struct SimulatedTransport {
    sent: Vec<SentCommand>,
    replies: VecDeque<u32>,
}

impl SimulatedTransport {
    /// Create a transport that acknowledges everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a scripted reply for an upcoming command. Replies drain in
    /// FIFO order; once empty, commands are acknowledged with DON.
    pub fn push_reply(&mut self, reply: u32) {
        self.replies.push_back(reply);
    }

    /// All requests seen so far, in order.
    #[must_use]
    pub fn requests(&self) -> &[SentCommand] {
        &self.sent
    }

    /// Number of round trips performed.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.sent.len()
    }
}

impl CommandTransport for SimulatedTransport {
    fn command(&mut self, board: BoardId, code: CommandCode, args: &[u32]) -> CcdResult<u32> {
        self.sent.push(SentCommand {
            board,
            code,
            args: args.to_vec(),
        });
        let reply = self.replies.pop_front().unwrap_or(REPLY_DONE);
        trace!(%board, %code, ?args, reply = %format!("0x{reply:08X}"), "simulated round trip");
        Ok(reply)
    }
}
