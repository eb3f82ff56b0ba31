#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and calibration parsing for the arm and thermal camera.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//!   Every section is optional; defaults describe the calibrated left arm
//!   and the thermal camera as mounted.
//! - Calibration CSV loader enforces headers and a contiguous joint table.
use serde::Deserialize;

/// Ticks per radian of a 12-bit servo (4095 ticks per turn).
pub const DEFAULT_TICKS_PER_RADIAN: f64 = 4095.0 / std::f64::consts::TAU;

const MAX_CHANNELS: usize = 254;

fn default_ticks_per_radian() -> f64 {
    DEFAULT_TICKS_PER_RADIAN
}

/// One calibrated channel.
///
/// ```toml
/// [[calibration.joints]]
/// zero_offset_ticks = 1530
/// sign = -1
/// ```
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct JointCalRow {
    pub zero_offset_ticks: i32,
    /// +1 or -1
    pub sign: i8,
    #[serde(default = "default_ticks_per_radian")]
    pub ticks_per_radian: f64,
}

impl JointCalRow {
    pub const fn new(zero_offset_ticks: i32, sign: i8) -> Self {
        Self {
            zero_offset_ticks,
            sign,
            ticks_per_radian: DEFAULT_TICKS_PER_RADIAN,
        }
    }
}

/// Calibration table for the arm channels plus an optional gripper.
///
/// An explicit `joints` list describes a different arm, so it never inherits
/// the default gripper row; list `[calibration.gripper]` alongside it when the
/// arm has one.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(from = "RawCalibrationCfg")]
pub struct CalibrationCfg {
    pub joints: Vec<JointCalRow>,
    pub gripper: Option<JointCalRow>,
}

#[derive(Deserialize)]
struct RawCalibrationCfg {
    joints: Option<Vec<JointCalRow>>,
    gripper: Option<JointCalRow>,
}

impl From<RawCalibrationCfg> for CalibrationCfg {
    fn from(raw: RawCalibrationCfg) -> Self {
        match raw.joints {
            Some(joints) => Self {
                joints,
                gripper: raw.gripper,
            },
            None => {
                let mut cfg = Self::default();
                if raw.gripper.is_some() {
                    cfg.gripper = raw.gripper;
                }
                cfg
            }
        }
    }
}

impl Default for CalibrationCfg {
    fn default() -> Self {
        Self {
            joints: vec![
                JointCalRow::new(1530, -1),
                JointCalRow::new(2107, 1),
                JointCalRow::new(2048, -1),
                JointCalRow::new(2102, 1),
                JointCalRow::new(2048, -1),
                JointCalRow::new(2068, 1),
                JointCalRow::new(1924, -1),
            ],
            gripper: Some(JointCalRow::new(1400, 1)),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct BusCfg {
    /// Serial device of the servo chain
    pub port: String,
    pub baud: u32,
}

impl Default for BusCfg {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB1".to_string(),
            baud: 57_600,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct StartupHoldCfg {
    pub enabled: bool,
    pub joint: usize,
    pub target_ticks: i32,
}

impl Default for StartupHoldCfg {
    fn default() -> Self {
        Self {
            enabled: true,
            joint: 4,
            target_ticks: 2050,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ArmSection {
    /// Read-back/publish rate
    pub publish_hz: u32,
    /// Speed register written with every target
    pub speed: u32,
    /// Published joint names; empty means `la_1_joint`..`la_N_joint`
    pub joint_names: Vec<String>,
    pub startup_hold: StartupHoldCfg,
}

impl Default for ArmSection {
    fn default() -> Self {
        Self {
            publish_hz: 10,
            speed: 100,
            joint_names: Vec::new(),
            startup_hold: StartupHoldCfg::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ThermalCfg {
    /// Inclusive intensity band kept by the mask
    pub min_threshold: u8,
    pub max_threshold: u8,
    /// Accepted region area window (exclusive), in pixels
    pub min_area: u32,
    pub max_area: u32,
    /// CLAHE contrast clip limit
    pub clahe_clip_limit: f32,
    /// CLAHE tile grid, [columns, rows]
    pub clahe_tile_grid: [u32; 2],
    /// Gaussian kernel size in pixels (odd)
    pub blur_kernel: u32,
    /// Flip incoming frames horizontally
    pub mirror: bool,
    /// Frame polling rate of the capture pump
    pub capture_hz: u32,
}

impl Default for ThermalCfg {
    fn default() -> Self {
        Self {
            min_threshold: 140,
            max_threshold: 255,
            min_area: 1000,
            max_area: 50_000,
            clahe_clip_limit: 2.0,
            clahe_tile_grid: [3, 3],
            blur_kernel: 21,
            mirror: true,
            capture_hz: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct BoresightCfg {
    /// Optical origin in pixel coordinates
    pub origin: [f64; 2],
    /// A point along the zero-bearing direction; reference vector = point - origin
    pub boresight_point: [f64; 2],
}

impl Default for BoresightCfg {
    fn default() -> Self {
        Self {
            origin: [165.0, 0.0],
            boresight_point: [165.0, 128.0],
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub bus: BusCfg,
    pub arm: ArmSection,
    pub calibration: CalibrationCfg,
    pub thermal: ThermalCfg,
    pub boresight: BoresightCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    /// Joint names to publish, falling back to `la_<n>_joint`.
    pub fn joint_names(&self) -> Vec<String> {
        if self.arm.joint_names.is_empty() {
            (1..=self.calibration.joints.len())
                .map(|i| format!("la_{i}_joint"))
                .collect()
        } else {
            self.arm.joint_names.clone()
        }
    }

    pub fn validate(&self) -> eyre::Result<()> {
        // Bus
        if self.bus.port.trim().is_empty() {
            eyre::bail!("bus.port must not be empty");
        }
        if self.bus.baud == 0 {
            eyre::bail!("bus.baud must be > 0");
        }

        // Arm
        if self.arm.publish_hz == 0 {
            eyre::bail!("arm.publish_hz must be > 0");
        }
        if self.arm.publish_hz > 1000 {
            eyre::bail!("arm.publish_hz is unreasonably large (>1000)");
        }
        if self.arm.speed == 0 {
            eyre::bail!("arm.speed must be > 0");
        }
        let n = self.calibration.joints.len();
        if !self.arm.joint_names.is_empty() && self.arm.joint_names.len() != n {
            eyre::bail!(
                "arm.joint_names has {} entries but calibration has {} joints",
                self.arm.joint_names.len(),
                n
            );
        }
        if self.arm.startup_hold.enabled && self.arm.startup_hold.joint >= n {
            eyre::bail!(
                "arm.startup_hold.joint {} is outside the calibration table (0..{})",
                self.arm.startup_hold.joint,
                n
            );
        }

        // Calibration
        self.calibration.validate()?;

        // Thermal
        let t = &self.thermal;
        if t.min_threshold > t.max_threshold {
            eyre::bail!("thermal.min_threshold must be <= thermal.max_threshold");
        }
        if t.min_area >= t.max_area {
            eyre::bail!("thermal.min_area must be < thermal.max_area");
        }
        if !(t.clahe_clip_limit.is_finite() && t.clahe_clip_limit > 0.0) {
            eyre::bail!("thermal.clahe_clip_limit must be > 0");
        }
        if t.clahe_tile_grid.contains(&0) {
            eyre::bail!("thermal.clahe_tile_grid entries must be >= 1");
        }
        if t.blur_kernel == 0 || t.blur_kernel % 2 == 0 {
            eyre::bail!("thermal.blur_kernel must be odd and >= 1");
        }
        if t.capture_hz == 0 {
            eyre::bail!("thermal.capture_hz must be > 0");
        }

        // Boresight
        let b = &self.boresight;
        if b.origin.iter().chain(&b.boresight_point).any(|v| !v.is_finite()) {
            eyre::bail!("boresight coordinates must be finite");
        }
        if b.origin == b.boresight_point {
            eyre::bail!("boresight.boresight_point must differ from boresight.origin");
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {r:?}");
        }

        Ok(())
    }
}

impl CalibrationCfg {
    pub fn validate(&self) -> eyre::Result<()> {
        if self.joints.is_empty() {
            eyre::bail!("calibration.joints must not be empty");
        }
        let channels = self.joints.len() + usize::from(self.gripper.is_some());
        if channels > MAX_CHANNELS {
            eyre::bail!("calibration has {channels} channels; the bus addresses at most {MAX_CHANNELS}");
        }
        for (id, row) in self.joints.iter().chain(self.gripper.iter()).enumerate() {
            if row.sign != 1 && row.sign != -1 {
                eyre::bail!("calibration channel {id}: sign must be +1 or -1, got {}", row.sign);
            }
            if !(row.ticks_per_radian.is_finite() && row.ticks_per_radian > 0.0) {
                eyre::bail!(
                    "calibration channel {id}: ticks_per_radian must be finite and > 0, got {}",
                    row.ticks_per_radian
                );
            }
        }
        Ok(())
    }

    /// Assemble a table from CSV rows. Joint ids must cover `0..n` exactly
    /// once; at most one `gripper` row is allowed.
    pub fn from_rows(rows: Vec<CalibrationCsvRow>) -> eyre::Result<Self> {
        let mut joints: Vec<Option<JointCalRow>> = Vec::new();
        let mut gripper = None;
        for (idx, row) in rows.into_iter().enumerate() {
            let line = idx + 2;
            let cal = JointCalRow {
                zero_offset_ticks: row.zero_offset_ticks,
                sign: row.sign,
                ticks_per_radian: row.ticks_per_radian,
            };
            let key = row.joint.trim();
            if key.eq_ignore_ascii_case("gripper") {
                if gripper.replace(cal).is_some() {
                    eyre::bail!("calibration CSV line {line}: duplicate gripper row");
                }
                continue;
            }
            let id: usize = key.parse().map_err(|_| {
                eyre::eyre!("calibration CSV line {line}: joint must be an id or 'gripper', got {key:?}")
            })?;
            if id >= MAX_CHANNELS {
                eyre::bail!("calibration CSV line {line}: joint id {id} out of range");
            }
            if joints.len() <= id {
                joints.resize(id + 1, None);
            }
            if joints[id].replace(cal).is_some() {
                eyre::bail!("calibration CSV line {line}: duplicate joint id {id}");
            }
        }
        let joints = joints
            .into_iter()
            .enumerate()
            .map(|(id, j)| j.ok_or_else(|| eyre::eyre!("calibration CSV is missing joint id {id}")))
            .collect::<eyre::Result<Vec<_>>>()?;
        let cfg = Self { joints, gripper };
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Calibration CSV schema.
///
/// Expected headers:
/// joint,zero_offset_ticks,sign,ticks_per_radian
///
/// Example:
/// joint,zero_offset_ticks,sign,ticks_per_radian
/// 0,1530,-1,651.74
/// gripper,1400,1,651.74
#[derive(Debug, Deserialize, Clone)]
pub struct CalibrationCsvRow {
    pub joint: String,
    pub zero_offset_ticks: i32,
    pub sign: i8,
    pub ticks_per_radian: f64,
}

pub fn load_calibration_csv(path: &std::path::Path) -> eyre::Result<CalibrationCfg> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open calibration CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["joint", "zero_offset_ticks", "sign", "ticks_per_radian"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "calibration CSV must have headers 'joint,zero_offset_ticks,sign,ticks_per_radian', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<CalibrationCsvRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }

    CalibrationCfg::from_rows(rows)
}
