// ============================================================================
// Inpainting — carve selections out and diffuse surrounding colour inward
// ============================================================================
//
// Each pass reads a frozen snapshot and writes a fresh buffer; the two are
// swapped between passes. A hole pixel is only filled from neighbours that
// were already opaque in the snapshot, so the filled region grows by exactly
// one ring per pass.

use image::{Rgba, RgbaImage};
use rayon::prelude::*;

use super::selection::PixelRect;

/// Result of a diffusion run.
#[derive(Clone, Debug)]
pub struct InpaintOutcome {
    pub image: RgbaImage,
    /// Pixels still at alpha 0 after the last pass. Non-zero means the
    /// iteration count was too small for the widest hole.
    pub remaining_holes: usize,
    /// Passes that actually changed something.
    pub passes_run: usize,
}

impl InpaintOutcome {
    pub fn is_complete(&self) -> bool {
        self.remaining_holes == 0
    }
}

/// Copy `source` with every pixel of every rect set to `(0, 0, 0, 0)`.
///
/// Overlapping rects are harmless. Rects are clipped to the image.
pub fn carve_holes(source: &RgbaImage, rects: &[PixelRect]) -> RgbaImage {
    let mut out = source.clone();
    let (w, h) = out.dimensions();
    for r in rects {
        for y in r.y1..r.y2.min(h) {
            for x in r.x1..r.x2.min(w) {
                out.put_pixel(x, y, Rgba([0, 0, 0, 0]));
            }
        }
    }
    out
}

/// One diffusion pass over `read`.
///
/// Every alpha-0 pixel with at least one 8-connected neighbour whose alpha
/// is non-zero in `read` becomes the floored mean of those neighbours' RGB,
/// at alpha 255. Everything else is copied through. Returns the new buffer
/// and the number of pixels filled.
pub fn diffuse_pass(read: &RgbaImage) -> (RgbaImage, usize) {
    let w = read.width() as usize;
    let h = read.height() as usize;
    if w == 0 || h == 0 {
        return (read.clone(), 0);
    }

    let src_raw = read.as_raw();
    let mut dst_raw = src_raw.clone();
    let stride = w * 4;

    let filled: usize = dst_raw
        .par_chunks_mut(stride)
        .enumerate()
        .map(|(y, row_out)| {
            let mut count = 0usize;
            for x in 0..w {
                let pi = x * 4;
                if src_raw[y * stride + pi + 3] != 0 {
                    continue;
                }
                if let Some(rgb) = neighbour_mean(src_raw, w, h, x, y) {
                    row_out[pi..pi + 4].copy_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
                    count += 1;
                }
            }
            count
        })
        .sum();

    // Dimensions are unchanged, so from_raw cannot fail here.
    let out = RgbaImage::from_raw(w as u32, h as u32, dst_raw).unwrap_or_else(|| read.clone());
    (out, filled)
}

/// Floored mean RGB of the opaque 8-neighbours of `(x, y)`, if any.
#[inline]
fn neighbour_mean(raw: &[u8], w: usize, h: usize, x: usize, y: usize) -> Option<[u8; 3]> {
    let mut sum = [0u32; 3];
    let mut n = 0u32;
    let y_lo = y.saturating_sub(1);
    let y_hi = (y + 1).min(h - 1);
    let x_lo = x.saturating_sub(1);
    let x_hi = (x + 1).min(w - 1);
    for ny in y_lo..=y_hi {
        for nx in x_lo..=x_hi {
            if nx == x && ny == y {
                continue;
            }
            let i = (ny * w + nx) * 4;
            if raw[i + 3] == 0 {
                continue;
            }
            sum[0] += raw[i] as u32;
            sum[1] += raw[i + 1] as u32;
            sum[2] += raw[i + 2] as u32;
            n += 1;
        }
    }
    if n == 0 {
        return None;
    }
    Some([(sum[0] / n) as u8, (sum[1] / n) as u8, (sum[2] / n) as u8])
}

/// Run up to `iterations` diffusion passes over the alpha-0 pixels of `image`.
///
/// Stops early once a pass fills nothing, since every later pass would be
/// an identity copy; the returned image is the same as the full run.
pub fn fill_holes(image: RgbaImage, iterations: usize) -> InpaintOutcome {
    let mut current = image;
    let mut passes_run = 0;
    for _ in 0..iterations {
        let (next, filled) = diffuse_pass(&current);
        if filled == 0 {
            break;
        }
        // Previous snapshot is dropped here; at most two buffers are alive.
        current = next;
        passes_run += 1;
    }
    let remaining_holes = count_transparent(&current);
    InpaintOutcome {
        image: current,
        remaining_holes,
        passes_run,
    }
}

/// Carve `rects` out of `source` and reconstruct the background by diffusion.
pub fn inpaint_diffusion(source: &RgbaImage, rects: &[PixelRect], iterations: usize) -> InpaintOutcome {
    let carved = carve_holes(source, rects);
    let outcome = fill_holes(carved, iterations);
    if !outcome.is_complete() {
        crate::log_warn!(
            "Inpaint left {} transparent pixels after {} passes; raise the iteration count",
            outcome.remaining_holes,
            iterations
        );
    }
    outcome
}

pub fn count_transparent(image: &RgbaImage) -> usize {
    image.as_raw().par_chunks_exact(4).filter(|p| p[3] == 0).count()
}
