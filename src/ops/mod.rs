// ============================================================================
// OPS MODULE — raster core for splitting an image into parts + background
// ============================================================================
//
//   selection.rs — display drag → source-pixel rect, ordered selection set
//   extract.rs   — crop, edge feathering, part canvas composition
//   inpaint.rs   — hole carving and double-buffered colour diffusion
// ============================================================================

pub mod extract;
pub mod inpaint;
pub mod selection;

use image::RgbaImage;

use crate::io::SliceError;
pub use inpaint::InpaintOutcome;
pub use selection::{DisplayBox, DisplayPoint, DragGesture, PixelRect, SelectionSet};

/// Width in pixels of the alpha ramp applied to every part's border.
pub const DEFAULT_FEATHER_PX: u32 = 2;

/// Diffusion passes used to rebuild the background behind the parts.
pub const DEFAULT_INPAINT_ITERATIONS: usize = 15;

/// Tunables for one slicing run. Passed explicitly; nothing is global.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SliceSettings {
    pub feather_px: u32,
    pub inpaint_iterations: usize,
}

impl Default for SliceSettings {
    fn default() -> Self {
        Self {
            feather_px: DEFAULT_FEATHER_PX,
            inpaint_iterations: DEFAULT_INPAINT_ITERATIONS,
        }
    }
}

/// Everything one run produces. The caller owns it outright.
#[derive(Clone, Debug)]
pub struct SliceOutput {
    /// One canvas per selection, in selection order.
    pub parts: Vec<RgbaImage>,
    /// Source with every selection removed and diffusion-filled.
    pub residual: InpaintOutcome,
}

/// Split `source` into one feathered part per selection plus the
/// reconstructed background.
///
/// Every rect must fit inside `source`; an empty selection set is refused.
pub fn slice_image(
    source: &RgbaImage,
    selections: &SelectionSet,
    settings: &SliceSettings,
) -> Result<SliceOutput, SliceError> {
    if selections.is_empty() {
        return Err(SliceError::NoSelections);
    }
    let (w, h) = source.dimensions();
    if let Some(bad) = selections.iter().find(|r| !r.fits(w, h)) {
        return Err(SliceError::InvalidRect { rect: *bad, width: w, height: h });
    }

    crate::log_info!(
        "Slicing {}x{} image: {} selection(s), feather {}px, {} inpaint passes",
        w,
        h,
        selections.len(),
        settings.feather_px,
        settings.inpaint_iterations
    );

    let parts = extract::compose_parts(source, selections, settings.feather_px);
    let residual = inpaint::inpaint_diffusion(source, selections.as_slice(), settings.inpaint_iterations);

    Ok(SliceOutput { parts, residual })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn defaults() {
        let s = SliceSettings::default();
        assert_eq!(s.feather_px, 2);
        assert_eq!(s.inpaint_iterations, 15);
    }

    #[test]
    fn empty_selection_is_refused() {
        let src = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]));
        let err = slice_image(&src, &SelectionSet::new(), &SliceSettings::default()).unwrap_err();
        assert!(matches!(err, SliceError::NoSelections));
    }

    #[test]
    fn out_of_bounds_rect_is_refused() {
        let src = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]));
        let set: SelectionSet = [PixelRect::new(0, 0, 5, 2).unwrap()].into_iter().collect();
        let err = slice_image(&src, &set, &SliceSettings::default()).unwrap_err();
        assert!(matches!(err, SliceError::InvalidRect { .. }));
    }

    #[test]
    fn one_part_per_selection_plus_residual() {
        let src = RgbaImage::from_pixel(12, 12, Rgba([30, 60, 90, 255]));
        let r = PixelRect::new(2, 2, 6, 6).unwrap();
        let set: SelectionSet = [r, r, PixelRect::new(7, 1, 11, 11).unwrap()].into_iter().collect();
        let out = slice_image(&src, &set, &SliceSettings::default()).unwrap();
        assert_eq!(out.parts.len(), 3);
        assert_eq!(out.parts[0], out.parts[1]);
        assert!(out.residual.is_complete());
        assert!(out.residual.image.pixels().all(|p| *p == Rgba([30, 60, 90, 255])));
    }
}
