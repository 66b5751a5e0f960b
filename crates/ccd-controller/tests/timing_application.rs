//! Integration tests exercising the applicators through the public API
//! with a simulated transport.

use ccd_common::CcdError;
use ccd_controller::CcdController;
use ccd_timing::{Gain, IntegratorSpeed};
use ccd_transport::{BoardId, CommandCode, SimulatedTransport, REPLY_DONE};

#[test]
fn applies_integration_time_then_dependent_parameters() {
    let mut ctl = CcdController::new(SimulatedTransport::new());

    ctl.apply_integral_time_and_gain(10.0, Gain::X5).unwrap();
    ctl.apply_pedestal_wait(0.5).unwrap();
    ctl.apply_summing_well_width(1.0).unwrap();

    assert_eq!(ctl.integrator_speed(), IntegratorSpeed::Slow);

    let requests = ctl.transport().requests();
    assert_eq!(requests.len(), 4);
    assert_eq!(requests[0].code, CommandCode::SetGainAndSpeed);
    assert_eq!(requests[0].args, vec![5, 0]);
    assert_eq!(requests[1].code, CommandCode::SetIntegralTime);
    assert_eq!(requests[1].args, vec![0x009F_0000]);
    assert!(requests.iter().all(|r| r.board == BoardId::Timing));
}

#[test]
fn surfaces_raw_reply_on_rejection() {
    let mut transport = SimulatedTransport::new();
    transport.push_reply(REPLY_DONE);
    transport.push_reply(0xDEAD);
    let mut ctl = CcdController::new(transport);

    let err = ctl.apply_integral_time_and_gain(10.0, Gain::X5).unwrap_err();
    match err {
        CcdError::CommandRejected { command, reply } => {
            assert_eq!(command, "CIT");
            assert_eq!(reply, 0xDEAD);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn speed_state_tracks_the_latest_integration_time() {
    let mut ctl = CcdController::new(SimulatedTransport::new());

    ctl.apply_integral_time_and_gain(2.0, Gain::X1).unwrap();
    assert_eq!(ctl.integrator_speed(), IntegratorSpeed::Fast);

    ctl.apply_integral_time_and_gain(20.0, Gain::X1).unwrap();
    assert_eq!(ctl.integrator_speed(), IntegratorSpeed::Slow);

    // The speed travels with every gain/speed command.
    let transport = ctl.into_transport();
    let gain_speed_args: Vec<&Vec<u32>> = transport
        .requests()
        .iter()
        .filter(|r| r.code == CommandCode::SetGainAndSpeed)
        .map(|r| &r.args)
        .collect();
    assert_eq!(gain_speed_args, vec![&vec![1, 1], &vec![1, 0]]);
}
