//! PartSlicer — cut selected rectangles out of a raster into their own
//! feathered canvases and rebuild the background they leave behind.
//!
//! ```no_run
//! use partslicer::ops::{PixelRect, SelectionSet, SliceSettings, slice_image};
//!
//! # fn demo() -> Result<(), partslicer::io::SliceError> {
//! let source = partslicer::io::load_rgba(std::path::Path::new("photo.png"))?;
//! let mut selections = SelectionSet::new();
//! selections.push(PixelRect::new(10, 10, 80, 60).unwrap());
//! let out = slice_image(&source, &selections, &SliceSettings::default())?;
//! assert_eq!(out.parts.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod logger;
pub mod cli;
pub mod io;
pub mod ops;
