use image::{GrayImage, Luma};
use robo_hardware::{synthetic_hot_spot, uniform_frame};
use robo_vision::frame::to_gray_image;
use robo_vision::{Centroid, SegmentCfg, Segmenter};
use rstest::rstest;

const W: u32 = 330;
const H: u32 = 256;

fn segmenter() -> Segmenter {
    Segmenter::new(SegmentCfg::default()).unwrap()
}

fn disc(cx: f64, cy: f64, radius: f64) -> GrayImage {
    to_gray_image(synthetic_hot_spot(W, H, (cx, cy), radius, 20, 230), false).unwrap()
}

#[test]
fn all_black_frame_has_no_detection() {
    let img = to_gray_image(uniform_frame(W, H, 0), false).unwrap();
    assert_eq!(segmenter().segment(&img), None);
}

#[rstest]
#[case(165.0, 128.0)]
#[case(80.0, 90.0)]
#[case(250.0, 170.0)]
fn single_disc_centroid_within_one_pixel(#[case] cx: f64, #[case] cy: f64) {
    // radius 40 -> about 5000 px
    let c = segmenter().segment(&disc(cx, cy, 40.0)).expect("disc detected");
    assert!((f64::from(c.x) - cx).abs() <= 1.0, "x {} vs {cx}", c.x);
    assert!((f64::from(c.y) - cy).abs() <= 1.0, "y {} vs {cy}", c.y);
}

#[test]
fn detected_area_is_close_to_disc_area() {
    let r = segmenter().detect(&disc(165.0, 128.0, 40.0)).expect("disc detected");
    let expected = std::f64::consts::PI * 40.0 * 40.0;
    assert!((r.area as f64 - expected).abs() / expected < 0.15, "area {}", r.area);
}

#[test]
fn speck_below_min_area_is_rejected() {
    assert_eq!(segmenter().segment(&disc(165.0, 128.0, 8.0)), None);
}

#[test]
fn full_frame_hot_field_is_rejected() {
    let img = to_gray_image(uniform_frame(W, H, 250), false).unwrap();
    let s = Segmenter::new(SegmentCfg {
        // keep the whole frame in band regardless of equalization
        min_threshold: 0,
        ..SegmentCfg::default()
    })
    .unwrap();
    assert_eq!(s.segment(&img), None);
}

#[test]
fn larger_of_two_targets_wins() {
    let mut img = disc(90.0, 128.0, 30.0);
    let big = disc(240.0, 128.0, 45.0);
    for (x, y, p) in big.enumerate_pixels() {
        if p[0] > 100 {
            img.put_pixel(x, y, Luma([p[0]]));
        }
    }
    let c = segmenter().segment(&img).expect("detected");
    assert!((c.x - 240).abs() <= 1);
}

#[test]
fn mirrored_capture_moves_centroid_across() {
    let frame = synthetic_hot_spot(W, H, (60.0, 128.0), 40.0, 20, 230);
    let c = segmenter()
        .segment(&to_gray_image(frame, true).unwrap())
        .expect("detected");
    // x -> W - 1 - x
    assert!((c.x - 269).abs() <= 1, "{c:?}");
    assert_ne!(c, Centroid { x: 60, y: 128 });
}
