use robo_hardware::{BusWrite, SimulatedBus};
use robo_traits::ActuatorBus;
use rstest::rstest;

#[rstest]
#[case(&[1530, 2107, 2048])]
#[case(&[0])]
fn with_positions_seeds_every_channel(#[case] positions: &[i32]) {
    let mut bus = SimulatedBus::with_positions(positions);
    for (id, &p) in positions.iter().enumerate() {
        assert_eq!(bus.read_current_ticks(id as u8).unwrap(), p);
    }
    assert!(bus.read_current_ticks(positions.len() as u8).is_err());
}

#[test]
fn write_log_preserves_order_and_skips_failures() {
    let mut bus = SimulatedBus::new(2);
    let h = bus.handle();
    h.fail_writes(1);
    bus.set_torque_enabled(0, true).unwrap();
    assert!(bus.set_torque_enabled(1, true).is_err());
    bus.set_speed(0, 100).unwrap();
    bus.set_target_ticks(0, 3000).unwrap();
    assert_eq!(
        h.writes(),
        vec![
            BusWrite::Torque { channel: 0, enabled: true },
            BusWrite::Speed { channel: 0, speed: 100 },
            BusWrite::Target { channel: 0, ticks: 3000 },
        ]
    );
    assert_eq!(h.position_ticks(0), Some(3000));
    assert_eq!(h.torque_enabled(1), Some(false));
}

#[test]
fn backdriven_servo_reports_new_position() {
    let mut bus = SimulatedBus::new(1);
    bus.handle().set_position(0, 1234);
    assert_eq!(bus.read_current_ticks(0).unwrap(), 1234);
}
