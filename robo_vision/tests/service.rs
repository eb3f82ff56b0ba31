use std::sync::Arc;
use std::time::Duration;

use robo_hardware::util::wait_until_with_timeout;
use robo_hardware::{SimulatedThermalCamera, synthetic_hot_spot, uniform_frame};
use robo_traits::GrayFrame;
use robo_traits::clock::{ManualClock, MonotonicClock};
use robo_vision::{BearingResponse, BearingService, FramePump};

fn service(mirror: bool) -> BearingService {
    let mut cfg = robo_config::Config::default();
    cfg.thermal.mirror = mirror;
    BearingService::from_config(&cfg).unwrap()
}

#[test]
fn no_frame_yet_is_no_detection() {
    assert_eq!(service(true).estimate_now(), BearingResponse::NoDetection);
}

#[test]
fn uses_the_most_recent_frame() {
    let svc = service(false);
    svc.on_frame(synthetic_hot_spot(330, 256, (65.0, 128.0), 40.0, 20, 230))
        .unwrap();
    let left = svc.estimate_now().radians().expect("bearing");
    assert!(left > 0.0);

    svc.on_frame(synthetic_hot_spot(330, 256, (265.0, 128.0), 40.0, 20, 230))
        .unwrap();
    let right = svc.estimate_now().radians().expect("bearing");
    assert!(right < 0.0);

    svc.on_frame(uniform_frame(330, 256, 0)).unwrap();
    assert_eq!(svc.estimate_now(), BearingResponse::NoDetection);
    assert_eq!(svc.frames_received(), 3);
}

#[test]
fn mirroring_flips_the_sign() {
    let frame = synthetic_hot_spot(330, 256, (65.0, 128.0), 40.0, 20, 230);
    let plain = service(false);
    let mirrored = service(true);
    plain.on_frame(frame.clone()).unwrap();
    mirrored.on_frame(frame).unwrap();
    let a = plain.estimate_now().radians().unwrap();
    let b = mirrored.estimate_now().radians().unwrap();
    assert!(a > 0.0 && b < 0.0);
}

#[test]
fn malformed_frame_keeps_previous_one() {
    let svc = service(false);
    svc.on_frame(synthetic_hot_spot(330, 256, (65.0, 128.0), 40.0, 20, 230))
        .unwrap();
    let bad = GrayFrame {
        width: 10,
        height: 10,
        pixels: vec![0; 3],
    };
    assert!(svc.on_frame(bad).is_err());
    assert!(matches!(svc.estimate_now(), BearingResponse::Bearing(_)));
}

#[test]
fn pump_feeds_the_service() {
    let svc = Arc::new(service(false));
    let cam = SimulatedThermalCamera::new([
        uniform_frame(330, 256, 0),
        synthetic_hot_spot(330, 256, (165.0, 200.0), 40.0, 20, 230),
    ]);
    let pump = FramePump::spawn(cam, svc.clone(), 200, MonotonicClock::new());
    wait_until_with_timeout(
        || svc.frames_received() == 2,
        Duration::from_secs(2),
        Duration::from_millis(1),
    )
    .expect("both frames delivered");
    pump.stop();
    let b = svc.estimate_now().radians().expect("bearing");
    assert!(b.abs() < 0.02, "{b}");
}

#[test]
fn pump_from_config_paces_at_capture_rate() {
    let mut cfg = robo_config::Config::default();
    cfg.thermal.mirror = false;
    cfg.thermal.capture_hz = 4;
    let svc = Arc::new(BearingService::from_config(&cfg).unwrap());
    let cam = SimulatedThermalCamera::new([uniform_frame(330, 256, 0), uniform_frame(330, 256, 0)]);
    let clock = ManualClock::new();
    let pump = FramePump::from_config(cam, svc.clone(), &cfg.thermal, clock.clone());
    wait_until_with_timeout(
        || svc.frames_received() == 2,
        Duration::from_secs(2),
        Duration::from_millis(1),
    )
    .expect("both frames delivered");
    pump.stop();
    let elapsed = clock.elapsed().as_millis();
    // one capture per 250 ms tick of virtual time
    assert!(elapsed >= 250, "{elapsed}");
    assert_eq!(elapsed % 250, 0, "{elapsed}");
}

#[test]
fn frames_are_stored_while_estimating() {
    let svc = Arc::new(service(false));
    svc.on_frame(synthetic_hot_spot(330, 256, (65.0, 128.0), 40.0, 20, 230))
        .unwrap();
    let estimator = {
        let svc = svc.clone();
        std::thread::spawn(move || {
            (0..3)
                .map(|_| svc.estimate_now().radians().is_some())
                .collect::<Vec<_>>()
        })
    };
    for _ in 0..20 {
        svc.on_frame(synthetic_hot_spot(330, 256, (65.0, 128.0), 40.0, 20, 230))
            .unwrap();
    }
    let detected = estimator.join().expect("estimator thread");
    assert!(detected.iter().all(|d| *d));
    assert_eq!(svc.frames_received(), 21);
}
