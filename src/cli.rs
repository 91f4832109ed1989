// ============================================================================
// PartSlicer CLI — split one image into feathered parts + a filled background
// ============================================================================
//
// Usage examples:
//   partslicer -i photo.png --rect 10,10,120,80 --rect 200,40,260,300
//   partslicer -i photo.png --display-box 10,10,810,610 --drag 40,40,300,220
//   partslicer -i photo.png --rect 0,0,64,64 --feather 4 --iterations 40 -o out/
//
// Selections are given either as source-pixel rects, or as drag gestures in
// the coordinate space of a scaled display box (mapped back to source pixels
// with outward rounding). Both kinds may be mixed; rects come first, then
// drags, each in the order given.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::io::{self, SliceError};
use crate::ops::selection::map_drag_to_rect;
use crate::ops::{
    DEFAULT_FEATHER_PX, DEFAULT_INPAINT_ITERATIONS, DisplayBox, DragGesture, PixelRect,
    SelectionSet, SliceSettings, slice_image,
};

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// Split an image into feathered cut-outs and an inpainted background.
#[derive(Parser, Debug)]
#[command(
    name = "partslicer",
    about = "Cut selected areas out of an image and rebuild what is left",
    long_about = "Each selected area is saved as its own PNG the size of the source,\n\
                  transparent except for the area (with softened edges). The rest of\n\
                  the image is saved with the areas removed and filled in from the\n\
                  surrounding colours.\n\n\
                  Example:\n  \
                  partslicer -i photo.png --rect 10,10,120,80 --rect 200,40,260,300"
)]
pub struct CliArgs {
    /// Source image (any format the image decoder supports).
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Area to cut out, in source pixels: x1,y1,x2,y2 (x2/y2 exclusive). Repeatable.
    #[arg(short, long = "rect", value_name = "X1,Y1,X2,Y2", allow_hyphen_values = true)]
    pub rects: Vec<PixelRect>,

    /// Where the image was shown on screen: x0,y0,x1,y1. Required with --drag.
    #[arg(long, value_name = "X0,Y0,X1,Y1", allow_hyphen_values = true)]
    pub display_box: Option<DisplayBox>,

    /// Drag gesture in display coordinates: start_x,start_y,end_x,end_y. Repeatable.
    #[arg(short, long = "drag", value_name = "SX,SY,EX,EY", allow_hyphen_values = true, requires = "display_box")]
    pub drags: Vec<DragGesture>,

    /// Width of the transparent ramp on every part's border (0 disables).
    #[arg(short, long, default_value_t = DEFAULT_FEATHER_PX, value_name = "PX")]
    pub feather: u32,

    /// Colour diffusion passes used to fill the background.
    /// Holes wider than twice this value may stay partly transparent.
    #[arg(short = 'n', long, default_value_t = DEFAULT_INPAINT_ITERATIONS, value_name = "N")]
    pub iterations: usize,

    /// Output directory. Defaults to `<input>_parts_<timestamp>_feathered`
    /// next to the input file.
    #[arg(short, long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Print per-selection and timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    pub fn settings(&self) -> SliceSettings {
        SliceSettings {
            feather_px: self.feather,
            inpaint_iterations: self.iterations,
        }
    }
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run one slicing job and return an OS exit code.
pub fn run(args: CliArgs) -> ExitCode {
    let start = Instant::now();
    match run_inner(&args) {
        Ok(written) => {
            println!("All images saved successfully in: {}", written.0.display());
            if args.verbose {
                for p in &written.1 {
                    println!("  → {}", p.display());
                }
                println!("done in {:.0}ms", start.elapsed().as_secs_f64() * 1000.0);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            crate::log_err!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_inner(args: &CliArgs) -> Result<(PathBuf, Vec<PathBuf>), SliceError> {
    let source = io::load_rgba(&args.input)?;
    let (w, h) = source.dimensions();
    crate::log_info!("Loaded {} ({}x{})", args.input.display(), w, h);
    if args.verbose {
        println!("{} ({}x{})", args.input.display(), w, h);
    }

    let selections = collect_selections(args, (w, h))?;

    let output = slice_image(&source, &selections, &args.settings())?;
    if !output.residual.is_complete() {
        eprintln!(
            "warning: {} background pixels are still transparent after {} passes; \
             try a larger --iterations",
            output.residual.remaining_holes, args.iterations
        );
    }

    let dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| io::default_output_dir(&args.input));
    let written = io::write_slice_output(&output, &dir, &io::base_name(&args.input))?;
    Ok((dir, written))
}

/// Validate raw rects and map drags into one ordered selection set.
///
/// A drag that maps to less than one pixel is reported and skipped; it never
/// aborts the run. A raw rect outside the image is an error.
fn collect_selections(args: &CliArgs, size: (u32, u32)) -> Result<SelectionSet, SliceError> {
    let (w, h) = size;
    let mut selections = SelectionSet::new();

    for rect in &args.rects {
        if !rect.fits(w, h) {
            return Err(SliceError::InvalidRect { rect: *rect, width: w, height: h });
        }
        selections.push(*rect);
    }

    if let Some(display) = &args.display_box {
        for (i, drag) in args.drags.iter().enumerate() {
            match map_drag_to_rect(display, drag.start, drag.end, size) {
                Some(rect) => {
                    if args.verbose {
                        println!("  drag {} → {}", i + 1, rect);
                    }
                    selections.push(rect);
                }
                None => {
                    crate::log_warn!("Drag {} rejected: selection too small", i + 1);
                    eprintln!("warning: drag {} is too small, please drag a larger area (skipped)", i + 1);
                }
            }
        }
    }

    if selections.is_empty() {
        return Err(SliceError::NoSelections);
    }
    Ok(selections)
}
