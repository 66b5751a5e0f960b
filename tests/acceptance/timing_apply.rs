//! Config-file-to-transport acceptance path.

use ccd_common::ControllerConfig;
use ccd_controller::CcdController;
use ccd_transport::{BoardId, CommandCode, SimulatedTransport};
use std::io::Write;

const BENCH_CONFIG: &str = r#"
[timing]
integral_time = 10.0
gain = 5
pedestal_wait = 0.32
signal_wait = 0.04
dump_gate_width = 4.0
output_gate_width = 4.04
reset_gate_width = 0.52
summing_well_width = 1.0

[transport]
kind = "simulated"
command_timeout = "1s"
"#;

#[test]
fn config_file_drives_the_expected_command_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("bench.toml");
    let mut file = std::fs::File::create(&config_path).unwrap();
    file.write_all(BENCH_CONFIG.as_bytes()).unwrap();

    let config = ControllerConfig::from_file(&config_path).unwrap();
    let mut controller = CcdController::new(SimulatedTransport::new());
    controller.apply_timing_config(&config.timing).unwrap();

    // (code, argument words): gain/speed first, then the quantized
    // intervals. 10 us is slow (speed 0) and coarse (31 steps); 4 us sits
    // exactly on the regime boundary and encodes as 100 fine steps.
    let expected: Vec<(CommandCode, Vec<u32>)> = vec![
        (CommandCode::SetGainAndSpeed, vec![5, 0]),
        (CommandCode::SetIntegralTime, vec![0x009F_0000]),
        (CommandCode::SetPedestalWait, vec![0x0081_0000]),
        (CommandCode::SetSignalWait, vec![0x0001_0000]),
        (CommandCode::SetDumpGateWidth, vec![0x0064_0000]),
        (CommandCode::SetOutputGateWidth, vec![0x008C_0000]),
        (CommandCode::SetResetGateWidth, vec![0x000D_0000]),
        (CommandCode::SetSummingWellWidth, vec![0x0019_0000]),
    ];

    let seen: Vec<(CommandCode, Vec<u32>)> = controller
        .transport()
        .requests()
        .iter()
        .map(|r| (r.code, r.args.clone()))
        .collect();
    assert_eq!(seen, expected);
    assert!(controller
        .transport()
        .requests()
        .iter()
        .all(|r| r.board == BoardId::Timing));
}

#[test]
fn reapplying_the_same_config_issues_identical_requests() {
    let config = ControllerConfig::from_toml(BENCH_CONFIG).unwrap();

    let mut first = CcdController::new(SimulatedTransport::new());
    first.apply_timing_config(&config.timing).unwrap();
    let mut second = CcdController::new(SimulatedTransport::new());
    second.apply_timing_config(&config.timing).unwrap();

    assert_eq!(
        first.transport().requests(),
        second.transport().requests()
    );
}
