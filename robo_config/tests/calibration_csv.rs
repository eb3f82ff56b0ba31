use std::fs::File;
use std::io::Write;

use robo_config::{
    CalibrationCfg, CalibrationCsvRow, DEFAULT_TICKS_PER_RADIAN, load_calibration_csv,
};
use rstest::rstest;
use tempfile::tempdir;

fn row(joint: &str, zero: i32, sign: i8) -> CalibrationCsvRow {
    CalibrationCsvRow {
        joint: joint.to_string(),
        zero_offset_ticks: zero,
        sign,
        ticks_per_radian: DEFAULT_TICKS_PER_RADIAN,
    }
}

fn write_csv(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("calibration.csv");
    let mut f = File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    (dir, path)
}

#[rstest]
fn from_rows_accepts_unordered_ids_and_gripper() {
    let rows = vec![row("1", 2107, 1), row("gripper", 1400, 1), row("0", 1530, -1)];
    let c = CalibrationCfg::from_rows(rows).unwrap();
    assert_eq!(c.joints.len(), 2);
    assert_eq!(c.joints[0].zero_offset_ticks, 1530);
    assert_eq!(c.joints[1].zero_offset_ticks, 2107);
    assert_eq!(c.gripper.map(|g| g.zero_offset_ticks), Some(1400));
}

#[rstest]
fn from_rows_rejects_gap_in_joint_ids() {
    let rows = vec![row("0", 1530, -1), row("2", 2048, -1)];
    let err = CalibrationCfg::from_rows(rows).expect_err("missing id 1");
    assert!(format!("{err}").contains("missing joint id 1"));
}

#[rstest]
#[case(vec![row("0", 1, 1), row("0", 2, 1)], "duplicate joint id 0")]
#[case(vec![row("0", 1, 1), row("gripper", 2, 1), row("GRIPPER", 3, 1)], "duplicate gripper")]
#[case(vec![row("elbow", 1, 1)], "joint must be an id or 'gripper'")]
#[case(vec![row("0", 1, 0)], "sign must be +1 or -1")]
#[case(vec![row("gripper", 1, 1)], "must not be empty")]
#[case(vec![], "must not be empty")]
fn from_rows_rejects_bad_tables(#[case] rows: Vec<CalibrationCsvRow>, #[case] needle: &str) {
    let err = CalibrationCfg::from_rows(rows).expect_err("should fail");
    let msg = format!("{err}");
    assert!(msg.contains(needle), "expected {needle:?} in {msg:?}");
}

#[rstest]
fn load_csv_happy_path_with_whitespace() {
    let (_dir, path) = write_csv(
        "joint,zero_offset_ticks,sign,ticks_per_radian\n\
         0, 1530, -1, 651.74\n\
         1, 2107, 1, 651.74\n\
         gripper, 1400, 1, 651.74\n",
    );
    let c = load_calibration_csv(&path).unwrap();
    assert_eq!(c.joints.len(), 2);
    assert_eq!(c.joints[0].sign, -1);
    assert!((c.joints[1].ticks_per_radian - 651.74).abs() < 1e-9);
    assert!(c.gripper.is_some());
}

#[rstest]
fn load_csv_rejects_wrong_headers() {
    let (_dir, path) = write_csv("id,offset,sign,scale\n0,1530,-1,651.74\n");
    let err = load_calibration_csv(&path).expect_err("headers must match");
    assert!(format!("{err}").contains("must have headers"));
}

#[rstest]
fn load_csv_reports_bad_row_line() {
    let (_dir, path) = write_csv(
        "joint,zero_offset_ticks,sign,ticks_per_radian\n\
         0,1530,-1,651.74\n\
         1,not-a-number,1,651.74\n",
    );
    let err = load_calibration_csv(&path).expect_err("row 3 is malformed");
    assert!(format!("{err}").contains("invalid CSV row 3"));
}

#[rstest]
fn load_csv_missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    let err = load_calibration_csv(&dir.path().join("nope.csv")).expect_err("missing file");
    assert!(format!("{err}").contains("open calibration CSV"));
}
