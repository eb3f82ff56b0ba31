//! Band thresholding and 8-connected region extraction.
use image::{GrayImage, Luma};

/// Integer pixel position of a region's center of mass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Centroid {
    pub x: i32,
    pub y: i32,
}

/// One connected blob of mask pixels with its raw moments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Zeroth moment: pixel count.
    pub area: u64,
    pub m10: u64,
    pub m01: u64,
    /// First pixel reached in raster order.
    pub seed: (u32, u32),
}

impl Region {
    /// `m10 / m00`, `m01 / m00`, truncated toward zero. `None` for an empty region.
    pub fn centroid(&self) -> Option<Centroid> {
        if self.area == 0 {
            return None;
        }
        Some(Centroid {
            x: i32::try_from(self.m10 / self.area).ok()?,
            y: i32::try_from(self.m01 / self.area).ok()?,
        })
    }
}

/// 255 where `min <= p <= max`, 0 elsewhere.
pub fn band_mask(img: &GrayImage, min: u8, max: u8) -> GrayImage {
    let mut out = GrayImage::new(img.width(), img.height());
    for (o, p) in out.pixels_mut().zip(img.pixels()) {
        if (min..=max).contains(&p[0]) {
            *o = Luma([255]);
        }
    }
    out
}

/// All 8-connected regions of non-zero pixels, in raster order of their
/// first pixel.
pub fn label_regions(mask: &GrayImage) -> Vec<Region> {
    let (w, h) = mask.dimensions();
    let (wu, hu) = (w as usize, h as usize);
    let src = mask.as_raw();
    let mut seen = vec![false; src.len()];
    let mut stack = Vec::new();
    let mut regions = Vec::new();

    for start in 0..src.len() {
        if src[start] == 0 || seen[start] {
            continue;
        }
        seen[start] = true;
        stack.push(start);
        let mut r = Region {
            area: 0,
            m10: 0,
            m01: 0,
            seed: ((start % wu) as u32, (start / wu) as u32),
        };
        while let Some(i) = stack.pop() {
            let (x, y) = (i % wu, i / wu);
            r.area += 1;
            r.m10 += x as u64;
            r.m01 += y as u64;
            for ny in y.saturating_sub(1)..=(y + 1).min(hu - 1) {
                for nx in x.saturating_sub(1)..=(x + 1).min(wu - 1) {
                    let j = ny * wu + nx;
                    if src[j] != 0 && !seen[j] {
                        seen[j] = true;
                        stack.push(j);
                    }
                }
            }
        }
        regions.push(r);
    }
    regions
}

/// Largest region by area; ties go to the region found first.
pub fn largest(regions: &[Region]) -> Option<&Region> {
    regions
        .iter()
        .fold(None, |best: Option<&Region>, r| match best {
            Some(b) if b.area >= r.area => Some(b),
            _ => Some(r),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from(rows: &[&str]) -> GrayImage {
        let h = rows.len() as u32;
        let w = rows[0].len() as u32;
        GrayImage::from_fn(w, h, |x, y| {
            let c = rows[y as usize].as_bytes()[x as usize];
            Luma([if c == b'#' { 255 } else { 0 }])
        })
    }

    #[test]
    fn band_is_inclusive_at_both_ends() {
        let img = GrayImage::from_raw(5, 1, vec![139, 140, 200, 255, 10]).unwrap();
        let m = band_mask(&img, 140, 200);
        assert_eq!(m.into_raw(), vec![0, 255, 255, 0, 0]);
    }

    #[test]
    fn diagonal_pixels_are_connected() {
        let m = mask_from(&["#...", ".#..", "..#.", "...."]);
        let r = label_regions(&m);
        assert_eq!(r.len(), 1);
        assert_eq!(r[0].area, 3);
        assert_eq!(r[0].centroid(), Some(Centroid { x: 1, y: 1 }));
    }

    #[test]
    fn separate_blobs_in_raster_order() {
        let m = mask_from(&["##..#", "##..#", ".....", "###.."]);
        let r = label_regions(&m);
        let areas: Vec<u64> = r.iter().map(|r| r.area).collect();
        assert_eq!(areas, vec![4, 2, 3]);
        assert_eq!(r[1].seed, (4, 0));
    }

    #[test]
    fn area_counts_pixels_and_skips_holes() {
        // 4x4 ring: 12 set pixels around a 2x2 hole
        let m = mask_from(&["####", "#..#", "#..#", "####"]);
        let r = label_regions(&m);
        assert_eq!(r.len(), 1);
        assert_eq!(r[0].area, 12);
    }

    #[test]
    fn centroid_truncates() {
        // pixels at x = 0 and 1 -> 0.5 -> 0
        let m = mask_from(&["##"]);
        assert_eq!(label_regions(&m)[0].centroid(), Some(Centroid { x: 0, y: 0 }));
    }

    #[test]
    fn largest_prefers_first_on_ties() {
        let m = mask_from(&["##.##", ".....", "###.."]);
        let r = label_regions(&m);
        let best = largest(&r).unwrap();
        assert_eq!(best.area, 3);
        let tie = mask_from(&["##.##"]);
        let r = label_regions(&tie);
        assert_eq!(largest(&r).unwrap().seed, (0, 0));
        assert!(largest(&[]).is_none());
    }
}
