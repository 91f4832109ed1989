use image::codecs::png::PngEncoder;
use image::{ImageEncoder, ImageError, RgbaImage};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::ops::{PixelRect, SliceOutput};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug)]
pub enum SliceError {
    Io(std::io::Error),
    Image(ImageError),
    /// Slicing was requested with nothing selected.
    NoSelections,
    /// A rectangle does not fit inside the loaded image.
    InvalidRect { rect: PixelRect, width: u32, height: u32 },
}

impl std::fmt::Display for SliceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SliceError::Io(e) => write!(f, "IO error: {}", e),
            SliceError::Image(e) => write!(f, "image error: {}", e),
            SliceError::NoSelections => write!(f, "no areas selected"),
            SliceError::InvalidRect { rect, width, height } => {
                write!(f, "rectangle {} lies outside the {}x{} image", rect, width, height)
            }
        }
    }
}

impl std::error::Error for SliceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SliceError::Io(e) => Some(e),
            SliceError::Image(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SliceError {
    fn from(e: std::io::Error) -> Self {
        SliceError::Io(e)
    }
}

impl From<ImageError> for SliceError {
    fn from(e: ImageError) -> Self {
        SliceError::Image(e)
    }
}

// ============================================================================
// LOAD / SAVE
// ============================================================================

/// Decode any format the `image` crate understands into RGBA8.
pub fn load_rgba(path: &Path) -> Result<RgbaImage, SliceError> {
    Ok(image::open(path)?.to_rgba8())
}

/// Write `image` as a PNG (alpha preserved).
pub fn encode_png(image: &RgbaImage, path: &Path) -> Result<(), SliceError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    PngEncoder::new(&mut writer).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ColorType::Rgba8,
    )?;
    Ok(())
}

// ============================================================================
// OUTPUT NAMING
// ============================================================================

/// File stem used to name outputs; falls back to `"image"`.
pub fn base_name(input: &Path) -> String {
    input
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("image")
        .to_string()
}

/// `index` is 0-based; file names are 1-based.
pub fn part_file_name(base: &str, index: usize) -> String {
    format!("{}_part_{}.png", base, index + 1)
}

pub fn residual_file_name(base: &str) -> String {
    format!("{}_unselected.png", base)
}

/// Timestamped sibling folder of the input:
/// `<input dir>/<base>_parts_<YYYYMMDD_HHMMSS>_feathered`.
pub fn default_output_dir(input: &Path) -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    output_dir_with_stamp(input, &timestamp)
}

fn output_dir_with_stamp(input: &Path, stamp: &str) -> PathBuf {
    let parent = input.parent().unwrap_or(Path::new("."));
    parent.join(format!("{}_parts_{}_feathered", base_name(input), stamp))
}

/// Create `dir` and write every part followed by the residual.
/// Returns the written paths in that order.
pub fn write_slice_output(output: &SliceOutput, dir: &Path, base: &str) -> Result<Vec<PathBuf>, SliceError> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(output.parts.len() + 1);

    for (i, part) in output.parts.iter().enumerate() {
        let path = dir.join(part_file_name(base, i));
        encode_png(part, &path)?;
        crate::log_info!("Saved: {}", path.display());
        written.push(path);
    }

    let path = dir.join(residual_file_name(base));
    encode_png(&output.residual.image, &path)?;
    crate::log_info!("Saved: {}", path.display());
    written.push(path);

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{SelectionSet, SliceSettings, slice_image};
    use image::Rgba;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("partslicer_io_{}_{}", tag, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn file_names_are_one_based() {
        assert_eq!(part_file_name("cat", 0), "cat_part_1.png");
        assert_eq!(part_file_name("cat", 9), "cat_part_10.png");
        assert_eq!(residual_file_name("cat"), "cat_unselected.png");
    }

    #[test]
    fn base_name_strips_extension() {
        assert_eq!(base_name(Path::new("/tmp/holiday.photo.jpg")), "holiday.photo");
        assert_eq!(base_name(Path::new("")), "image");
    }

    #[test]
    fn output_dir_sits_next_to_input() {
        let dir = output_dir_with_stamp(Path::new("/pics/cat.png"), "20240102_030405");
        assert_eq!(dir, PathBuf::from("/pics/cat_parts_20240102_030405_feathered"));
    }

    #[test]
    fn default_output_dir_has_timestamp_shape() {
        let dir = default_output_dir(Path::new("shots/cat.png"));
        let name = dir.file_name().unwrap().to_str().unwrap();
        let stamp = name.strip_prefix("cat_parts_").unwrap().strip_suffix("_feathered").unwrap();
        assert_eq!(stamp.len(), 15);
        assert_eq!(stamp.as_bytes()[8], b'_');
    }

    #[test]
    fn writes_and_reloads_all_artifacts() {
        let dir = scratch_dir("roundtrip");
        let src = RgbaImage::from_fn(8, 6, |x, y| Rgba([x as u8 * 20, y as u8 * 30, 5, 255]));
        let set: SelectionSet = [PixelRect::new(1, 1, 5, 4).unwrap(), PixelRect::new(4, 2, 8, 6).unwrap()]
            .into_iter()
            .collect();
        let out = slice_image(&src, &set, &SliceSettings::default()).unwrap();

        let written = write_slice_output(&out, &dir, "src").unwrap();
        assert_eq!(written.len(), 3);
        assert!(written[0].ends_with("src_part_1.png"));
        assert!(written[1].ends_with("src_part_2.png"));
        assert!(written[2].ends_with("src_unselected.png"));

        assert_eq!(load_rgba(&written[1]).unwrap(), out.parts[1]);
        assert_eq!(load_rgba(&written[2]).unwrap(), out.residual.image);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_input_is_an_image_error() {
        let err = load_rgba(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, SliceError::Image(_) | SliceError::Io(_)));
    }
}
