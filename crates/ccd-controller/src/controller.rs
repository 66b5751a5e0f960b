//! The controller context: one timing-sequencer instance behind a
//! command transport, plus the parameter applicators.
//!
//! Every applicator follows the same shape: quantize the requested
//! physical quantity, transmit one command to the timing board, and
//! interpret the reply against the "done" sentinel. Nothing here retries;
//! retry policy belongs to the caller.

use ccd_common::{CcdError, CcdResult, TimingConfig};
use ccd_timing::{ClockCode, Gain, IntegratorSpeed};
use ccd_transport::{BoardId, CommandCode, CommandTransport, REPLY_DONE};
use tracing::{debug, info, warn};

/// A CCD readout controller driven over a command transport.
///
/// Owns the transport and the controller-wide integrator speed, which is
/// re-sent alongside gain whenever the integration time changes.
/// Exclusive access (`&mut self`) serializes both the speed field and
/// the request/reply channel; wrap one instance in a mutex to share it
/// across threads.
#[derive(Debug)]
pub struct CcdController<T: CommandTransport> {
    transport: T,
    integrator_speed: IntegratorSpeed,
}

impl<T: CommandTransport> CcdController<T> {
    /// Create a controller over `transport`. The integrator speed starts
    /// slow until an integration time is applied.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            integrator_speed: IntegratorSpeed::default(),
        }
    }

    /// The most recently selected integrator speed.
    #[must_use]
    pub fn integrator_speed(&self) -> IntegratorSpeed {
        self.integrator_speed
    }

    /// Shared access to the underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Consume the controller and hand the transport back.
    #[must_use]
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Send one timing-board command and interpret the reply.
    fn transmit(&mut self, code: CommandCode, args: &[u32]) -> CcdResult<()> {
        let reply = self.transport.command(BoardId::Timing, code, args)?;
        if reply == REPLY_DONE {
            Ok(())
        } else {
            warn!(
                command = %code,
                reply = %format!("0x{reply:08X}"),
                "controller rejected command"
            );
            Err(CcdError::CommandRejected {
                command: code.mnemonic().to_string(),
                reply,
            })
        }
    }

    /// The shared quantize-and-transmit step behind every duration
    /// applicator.
    fn apply_clocked_duration(&mut self, code: CommandCode, duration_us: f64) -> CcdResult<()> {
        let clock = ClockCode::quantize(duration_us);
        debug!(command = %code, duration_us, clock = %clock, "applying quantized interval");
        self.transmit(code, &[clock.word()])
    }

    /// Set the dual-slope integrator gain and speed.
    ///
    /// Normally invoked through
    /// [`apply_integral_time_and_gain`](Self::apply_integral_time_and_gain),
    /// which keeps the speed consistent with the integration time.
    ///
    /// # Errors
    ///
    /// Returns an error on a transport failure or a non-DON reply.
    pub fn apply_gain_and_speed(&mut self, gain: Gain, speed: IntegratorSpeed) -> CcdResult<()> {
        debug!(%gain, %speed, "applying integrator gain and speed");
        self.transmit(
            CommandCode::SetGainAndSpeed,
            &[gain.wire(), speed.wire()],
        )
    }

    /// Set the integration time, selecting and applying the matching
    /// integrator speed and gain first.
    ///
    /// The speed is fast for integration times under 4.5 us, slow
    /// otherwise, and is stored on the controller for later reference.
    ///
    /// The gain/speed and integration-time writes are not transactional:
    /// if the second write fails (or the first does, in which case the
    /// second is never attempted) the hardware is left with one half
    /// applied. The returned error is whichever half failed.
    ///
    /// # Errors
    ///
    /// Returns an error on a transport failure or a non-DON reply to
    /// either write.
    pub fn apply_integral_time_and_gain(
        &mut self,
        integral_time_us: f64,
        gain: Gain,
    ) -> CcdResult<()> {
        let clock = ClockCode::quantize(integral_time_us);
        self.integrator_speed = IntegratorSpeed::for_integration_time(integral_time_us);
        info!(
            integral_time_us,
            %gain,
            speed = %self.integrator_speed,
            clock = %clock,
            "applying integration time and gain"
        );

        self.apply_gain_and_speed(gain, self.integrator_speed)?;
        self.transmit(CommandCode::SetIntegralTime, &[clock.word()])
    }

    /// Set the settling wait before the pedestal integration.
    ///
    /// # Errors
    ///
    /// Returns an error on a transport failure or a non-DON reply.
    pub fn apply_pedestal_wait(&mut self, wait_us: f64) -> CcdResult<()> {
        self.apply_clocked_duration(CommandCode::SetPedestalWait, wait_us)
    }

    /// Set the settling wait before the signal integration.
    ///
    /// # Errors
    ///
    /// Returns an error on a transport failure or a non-DON reply.
    pub fn apply_signal_wait(&mut self, wait_us: f64) -> CcdResult<()> {
        self.apply_clocked_duration(CommandCode::SetSignalWait, wait_us)
    }

    /// Set the dump gate pulse width.
    ///
    /// # Errors
    ///
    /// Returns an error on a transport failure or a non-DON reply.
    pub fn apply_dump_gate_width(&mut self, width_us: f64) -> CcdResult<()> {
        self.apply_clocked_duration(CommandCode::SetDumpGateWidth, width_us)
    }

    /// Set the output gate pulse width.
    ///
    /// # Errors
    ///
    /// Returns an error on a transport failure or a non-DON reply.
    pub fn apply_output_gate_width(&mut self, width_us: f64) -> CcdResult<()> {
        self.apply_clocked_duration(CommandCode::SetOutputGateWidth, width_us)
    }

    /// Set the reset gate pulse width used during skipping readout.
    ///
    /// # Errors
    ///
    /// Returns an error on a transport failure or a non-DON reply.
    pub fn apply_skipping_reset_gate_width(&mut self, width_us: f64) -> CcdResult<()> {
        self.apply_clocked_duration(CommandCode::SetResetGateWidth, width_us)
    }

    /// Set the summing well pulse width.
    ///
    /// # Errors
    ///
    /// Returns an error on a transport failure or a non-DON reply.
    pub fn apply_summing_well_width(&mut self, width_us: f64) -> CcdResult<()> {
        self.apply_clocked_duration(CommandCode::SetSummingWellWidth, width_us)
    }

    /// Apply a full timing parameter set in a fixed order, integration
    /// time and gain first, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured gain is not one of 1, 2, 5, 10,
    /// or if any individual applicator fails; later parameters are not
    /// attempted after a failure.
    pub fn apply_timing_config(&mut self, timing: &TimingConfig) -> CcdResult<()> {
        let gain = Gain::try_from(timing.gain).map_err(|e| CcdError::InvalidGain(e.0))?;

        self.apply_integral_time_and_gain(timing.integral_time, gain)?;
        self.apply_pedestal_wait(timing.pedestal_wait)?;
        self.apply_signal_wait(timing.signal_wait)?;
        self.apply_dump_gate_width(timing.dump_gate_width)?;
        self.apply_output_gate_width(timing.output_gate_width)?;
        self.apply_skipping_reset_gate_width(timing.reset_gate_width)?;
        self.apply_summing_well_width(timing.summing_well_width)?;

        info!("timing parameter set applied");
        Ok(())
    }
}
