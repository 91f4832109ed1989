// ============================================================================
// REGION EXTRACTION — crop, feather, and place each selection on its own canvas
// ============================================================================

use image::{Rgba, RgbaImage, imageops};
use rayon::prelude::*;

use super::selection::{PixelRect, SelectionSet};

/// Copy the pixels under `rect` into a new image of exactly that size.
///
/// `rect` must fit inside `source`.
pub fn crop_region(source: &RgbaImage, rect: PixelRect) -> RgbaImage {
    debug_assert!(rect.fits(source.width(), source.height()));
    imageops::crop_imm(source, rect.x1, rect.y1, rect.width(), rect.height()).to_image()
}

/// Fade alpha linearly toward the four borders of `region`.
///
/// A pixel at Chebyshev-style edge distance `d < feather_px` gets
/// `a * d / feather_px` (floored), so the outermost ring is fully transparent
/// and alpha is untouched from `d == feather_px` inward. Fully transparent
/// pixels stay transparent. `feather_px == 0` returns an unchanged copy.
pub fn feather_edges(region: &RgbaImage, feather_px: u32) -> RgbaImage {
    let w = region.width() as usize;
    let h = region.height() as usize;
    if feather_px == 0 || w == 0 || h == 0 {
        return region.clone();
    }

    let src_raw = region.as_raw();
    let mut dst_raw = src_raw.clone();
    let stride = w * 4;
    let f = feather_px as usize;

    dst_raw
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row_out)| {
            let dist_v = y.min(h - 1 - y);
            feather_row(row_out, w, f, dist_v);
        });

    RgbaImage::from_raw(w as u32, h as u32, dst_raw).unwrap_or_else(|| region.clone())
}

#[inline]
fn feather_row(row: &mut [u8], w: usize, f: usize, dist_v: usize) {
    for x in 0..w {
        let a = row[x * 4 + 3] as usize;
        if a == 0 {
            continue;
        }
        let d = x.min(w - 1 - x).min(dist_v);
        if d < f {
            row[x * 4 + 3] = (a * d / f) as u8;
        }
    }
}

/// Build one part canvas: a fully transparent image the size of `source`
/// with the feathered crop of `rect` written back at its original offset.
///
/// The crop replaces canvas pixels outright (no blending), so feathered
/// alpha is preserved exactly.
pub fn compose_part(source: &RgbaImage, rect: PixelRect, feather_px: u32) -> RgbaImage {
    let cropped = crop_region(source, rect);
    let feathered = feather_edges(&cropped, feather_px);
    let mut canvas = RgbaImage::from_pixel(source.width(), source.height(), Rgba([0, 0, 0, 0]));
    imageops::replace(&mut canvas, &feathered, rect.x1 as i64, rect.y1 as i64);
    canvas
}

/// One part canvas per selection, in selection order.
pub fn compose_parts(source: &RgbaImage, selections: &SelectionSet, feather_px: u32) -> Vec<RgbaImage> {
    selections
        .as_slice()
        .par_iter()
        .map(|&rect| compose_part(source, rect, feather_px))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| Rgba([(x * 10) as u8, (y * 10) as u8, 7, 255]))
    }

    #[test]
    fn crop_copies_exact_pixels() {
        let src = gradient(10, 8);
        let rect = PixelRect::new(2, 3, 7, 5).unwrap();
        let out = crop_region(&src, rect);
        assert_eq!(out.dimensions(), (5, 2));
        for y in 0..2 {
            for x in 0..5 {
                assert_eq!(out.get_pixel(x, y), src.get_pixel(x + 2, y + 3));
            }
        }
    }

    #[test]
    fn crop_of_single_pixel() {
        let src = gradient(4, 4);
        let out = crop_region(&src, PixelRect::new(3, 3, 4, 4).unwrap());
        assert_eq!(out.dimensions(), (1, 1));
        assert_eq!(out.get_pixel(0, 0), src.get_pixel(3, 3));
    }

    #[test]
    fn feather_5x5_ramp() {
        let src = RgbaImage::from_pixel(5, 5, Rgba([9, 9, 9, 255]));
        let out = feather_edges(&src, 2);
        assert_eq!(out.get_pixel(0, 0)[3], 0);
        assert_eq!(out.get_pixel(1, 1)[3], 127);
        assert_eq!(out.get_pixel(1, 2)[3], 127);
        assert_eq!(out.get_pixel(2, 2)[3], 255);
        assert_eq!(out.get_pixel(4, 2)[3], 0);
        // Colour channels are untouched.
        assert_eq!(&out.get_pixel(0, 0).0[..3], &[9, 9, 9]);
    }

    #[test]
    fn feather_zero_is_identity() {
        let src = gradient(6, 3);
        assert_eq!(feather_edges(&src, 0), src);
    }

    #[test]
    fn feather_never_reinflates_transparent_pixels() {
        let mut src = RgbaImage::from_pixel(9, 9, Rgba([200, 10, 10, 255]));
        src.put_pixel(4, 4, Rgba([1, 2, 3, 0]));
        src.put_pixel(0, 4, Rgba([1, 2, 3, 0]));
        for f in [0, 1, 2, 3, 10] {
            let out = feather_edges(&src, f);
            assert_eq!(out.get_pixel(4, 4)[3], 0);
            assert_eq!(out.get_pixel(0, 4)[3], 0);
        }
    }

    #[test]
    fn feather_is_monotone_toward_interior() {
        let src = RgbaImage::from_pixel(21, 21, Rgba([0, 0, 0, 255]));
        let f = 6;
        let out = feather_edges(&src, f);
        let mut prev = 0u8;
        for d in 0..=f {
            let a = out.get_pixel(d, 10)[3];
            assert!(a >= prev);
            prev = a;
        }
        assert_eq!(out.get_pixel(f, 10)[3], 255);
    }

    #[test]
    fn feather_scales_partial_alpha() {
        let src = RgbaImage::from_pixel(7, 7, Rgba([0, 0, 0, 100]));
        let out = feather_edges(&src, 3);
        // d = 1: 100 * 1 / 3 = 33
        assert_eq!(out.get_pixel(1, 3)[3], 33);
        assert_eq!(out.get_pixel(3, 3)[3], 100);
    }

    #[test]
    fn part_is_transparent_outside_rect() {
        let src = gradient(12, 12);
        let rect = PixelRect::new(3, 4, 10, 11).unwrap();
        let part = compose_part(&src, rect, 2);
        assert_eq!(part.dimensions(), src.dimensions());
        for (x, y, p) in part.enumerate_pixels() {
            if !rect.contains(x, y) {
                assert_eq!(p.0, [0, 0, 0, 0]);
            }
        }
        // Interior keeps colour and full alpha.
        assert_eq!(part.get_pixel(6, 7), src.get_pixel(6, 7));
        // Rect border is feathered out.
        assert_eq!(part.get_pixel(3, 7)[3], 0);
    }

    #[test]
    fn parts_follow_selection_order() {
        let src = gradient(10, 10);
        let a = PixelRect::new(0, 0, 5, 5).unwrap();
        let b = PixelRect::new(5, 5, 10, 10).unwrap();
        let set: SelectionSet = [b, a].into_iter().collect();
        let parts = compose_parts(&src, &set, 0);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], compose_part(&src, b, 0));
        assert_eq!(parts[1], compose_part(&src, a, 0));
    }
}
