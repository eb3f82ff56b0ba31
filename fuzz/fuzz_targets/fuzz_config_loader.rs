#![no_main]
use libfuzzer_sys::fuzz_target;
use robo_core::CalibrationTable;

fuzz_target!(|data: &str| {
    // Parsing and validation must never panic; errors are fine.
    let Ok(cfg) = robo_config::load_toml(data) else {
        return;
    };
    if cfg.validate().is_err() {
        return;
    }
    // A validated table always converts, and ticks survive a round trip.
    let table = CalibrationTable::try_from(&cfg.calibration).expect("validated calibration converts");
    for (id, j) in table.channels().enumerate() {
        for ticks in [0, j.zero_offset_ticks, 4095] {
            let rad = table.to_radians(id, ticks).expect("id in range");
            if rad.abs() < 1e6 {
                assert_eq!(table.to_ticks(id, rad).expect("id in range"), ticks);
            }
        }
    }
});
