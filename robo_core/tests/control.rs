use std::time::UNIX_EPOCH;

use robo_core::{
    ArmBuilder, ArmController, ArmError, ArmState, BuildError, CalibrationTable, StartupHold,
};
use robo_hardware::{BusWrite, SimBusHandle, SimulatedBus};
use rstest::rstest;

fn left_arm() -> (ArmController<SimulatedBus>, SimBusHandle) {
    let bus = SimulatedBus::new(8);
    let h = bus.handle();
    let arm = ArmBuilder::new()
        .with_bus(bus)
        .with_calibration(CalibrationTable::left_arm())
        .build()
        .expect("default arm builds");
    (arm, h)
}

#[test]
fn startup_disables_torque_then_holds_wrist() {
    let (mut arm, h) = left_arm();
    let outcome = arm.startup();
    assert!(outcome.is_clean());
    assert_eq!(arm.state(), ArmState::Idle);

    let writes = h.writes();
    for ch in 0..8u8 {
        assert_eq!(writes[usize::from(ch)], BusWrite::Torque { channel: ch, enabled: false });
    }
    assert_eq!(
        &writes[8..],
        &[
            BusWrite::Torque { channel: 4, enabled: true },
            BusWrite::Speed { channel: 4, speed: 100 },
            BusWrite::Target { channel: 4, ticks: 2050 },
        ]
    );
    assert_eq!(h.position_ticks(4), Some(2050));
    assert!(arm.commanded()[4].torque_enabled);
    assert!(!arm.commanded()[0].torque_enabled);
}

#[test]
fn zero_command_moves_every_joint_to_its_offset() {
    let (mut arm, h) = left_arm();
    arm.startup();
    let outcome = arm.apply_command(&[0.0; 7]).unwrap();
    assert!(outcome.is_clean());
    assert_eq!(arm.state(), ArmState::Tracking);
    let offsets = [1530, 2107, 2048, 2102, 2048, 2068, 1924];
    for (ch, &zero) in offsets.iter().enumerate() {
        assert_eq!(h.target_ticks(ch as u8), Some(zero));
        assert_eq!(arm.commanded()[ch].target_ticks, zero);
        assert_eq!(arm.commanded()[ch].speed, 100);
    }
    // the gripper channel is not part of the arm command
    assert_eq!(h.torque_enabled(7), Some(false));
}

#[test]
fn command_writes_torques_then_speeds_then_targets() {
    let (mut arm, h) = left_arm();
    h.clear_writes();
    arm.apply_command(&[0.1; 7]).unwrap();
    let writes = h.writes();
    assert_eq!(writes.len(), 21);
    assert!(writes[..7].iter().all(|w| matches!(w, BusWrite::Torque { enabled: true, .. })));
    assert!(writes[7..14].iter().all(|w| matches!(w, BusWrite::Speed { speed: 100, .. })));
    assert!(writes[14..].iter().all(|w| matches!(w, BusWrite::Target { .. })));
}

#[rstest]
#[case(vec![0.0; 6])]
#[case(vec![0.0; 8])]
#[case(vec![])]
#[case(vec![0.0, 0.0, f64::NAN, 0.0, 0.0, 0.0, 0.0])]
#[case(vec![f64::INFINITY, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])]
#[case(vec![0.0, 0.0, 0.0, 1e12, 0.0, 0.0, 0.0])]
fn malformed_command_changes_nothing(#[case] angles: Vec<f64>) {
    let (mut arm, h) = left_arm();
    arm.startup();
    arm.apply_command(&[0.2; 7]).unwrap();
    let before = arm.commanded().to_vec();
    h.clear_writes();

    let err = arm.apply_command(&angles).unwrap_err();
    assert!(matches!(err, ArmError::MalformedCommand(_)));
    assert_eq!(arm.commanded(), &before[..]);
    assert_eq!(arm.state(), ArmState::Tracking);
    assert!(h.writes().is_empty());
}

#[test]
fn write_failure_on_one_channel_does_not_abort_the_batch() {
    let (mut arm, h) = left_arm();
    h.fail_writes(3);
    let outcome = arm.apply_command(&[0.0; 7]).unwrap();
    assert_eq!(outcome.failures.len(), 3);
    assert!(outcome.failures.iter().all(|f| matches!(
        f,
        ArmError::BusWriteFailed { channel: 3, .. }
    )));
    assert_eq!(h.target_ticks(6), Some(1924));
    assert_eq!(arm.state(), ArmState::Tracking);
}

#[test]
fn poll_reports_radians_and_gripper() {
    let (mut arm, h) = left_arm();
    arm.apply_command(&[0.5, -0.5, 0.25, 0.0, 0.0, 1.0, -1.0]).unwrap();
    h.set_position(7, 1400);
    let cycle = arm.poll(UNIX_EPOCH);
    assert!(!cycle.is_degraded());
    assert_eq!(cycle.joint_state.names.len(), 7);
    assert_eq!(cycle.joint_state.names[0], "la_1_joint");
    assert_eq!(cycle.joint_state.positions, cycle.current_pose);
    let tol = 0.5 * arm.calibration().joints()[0].radians_per_tick() + 1e-12;
    for (got, want) in cycle.current_pose.iter().zip([0.5, -0.5, 0.25, 0.0, 0.0, 1.0, -1.0]) {
        assert!((got - want).abs() <= tol, "{got} vs {want}");
    }
    assert_eq!(cycle.current_gripper, Some(0.0));
}

#[test]
fn failed_read_substitutes_last_known_value() {
    let (mut arm, h) = left_arm();
    arm.apply_command(&[0.3; 7]).unwrap();
    let good = arm.poll(UNIX_EPOCH);

    h.fail_reads(2);
    h.set_position(2, 0);
    h.set_position(1, 2107);
    let cycle = arm.poll(UNIX_EPOCH);
    assert_eq!(cycle.degraded, vec![2]);
    assert_eq!(cycle.current_pose.len(), 7);
    assert_eq!(cycle.current_pose[2], good.current_pose[2]);
    assert_eq!(cycle.current_pose[1], 0.0);
}

#[test]
fn read_failure_before_any_success_publishes_zero_offset() {
    let (mut arm, h) = left_arm();
    h.fail_reads(0);
    let cycle = arm.poll(UNIX_EPOCH);
    assert_eq!(cycle.degraded, vec![0]);
    assert_eq!(cycle.current_pose[0], 0.0);
}

#[test]
fn shutdown_disables_torque_everywhere() {
    let (mut arm, h) = left_arm();
    arm.startup();
    arm.apply_command(&[0.0; 7]).unwrap();
    let outcome = arm.shutdown();
    assert!(outcome.is_clean());
    for ch in 0..8u8 {
        assert_eq!(h.torque_enabled(ch), Some(false));
    }
    assert!(arm.commanded().iter().all(|c| !c.torque_enabled));
}

#[test]
fn builder_rejects_hold_outside_table() {
    let err = ArmBuilder::new()
        .with_bus(SimulatedBus::new(8))
        .with_calibration(CalibrationTable::left_arm())
        .with_startup_hold(Some(StartupHold { joint: 7, target_ticks: 0 }))
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        BuildError::Arm(ArmError::OutOfRangeJoint { joint: 7, channels: 7 })
    );
}

#[rstest]
#[case(0, 10, 7)]
#[case(100, 0, 7)]
#[case(100, 10, 3)]
fn builder_rejects_invalid_cfg(#[case] speed: u32, #[case] hz: u32, #[case] names: usize) {
    let err = ArmBuilder::new()
        .with_bus(SimulatedBus::new(8))
        .with_calibration(CalibrationTable::left_arm())
        .with_speed(speed)
        .with_publish_hz(hz)
        .with_joint_names(robo_core::config::default_joint_names(names))
        .build()
        .unwrap_err();
    assert!(matches!(err, BuildError::InvalidConfig(_)));
}
