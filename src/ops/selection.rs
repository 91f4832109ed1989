// ============================================================================
// SELECTIONS — display-space drags → source-pixel rectangles
// ============================================================================
//
// The displayed image is usually a scaled thumbnail of the source raster.
// A drag gesture arrives in display coordinates (possibly outside the shown
// image) and is mapped back to a half-open pixel rectangle in the source.
// ============================================================================

use std::fmt;
use std::str::FromStr;

/// Bounding box of the displayed image, in display coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl DisplayBox {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Clamp a raw point into the box, independently on each axis.
    fn clamp(&self, p: DisplayPoint) -> DisplayPoint {
        DisplayPoint {
            x: p.x.max(self.x0).min(self.x1),
            y: p.y.max(self.y0).min(self.y1),
        }
    }
}

/// A raw pointer position in display coordinates (unclamped).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayPoint {
    pub x: f64,
    pub y: f64,
}

impl DisplayPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Rectangle in source-pixel coordinates. `x2`/`y2` are exclusive.
///
/// Invariant: `x1 < x2` and `y1 < y2`, so every rect covers at least 1×1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl PixelRect {
    /// Build a rect, or `None` if it would be empty.
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Option<Self> {
        if x2 > x1 && y2 > y1 {
            Some(Self { x1, y1, x2, y2 })
        } else {
            None
        }
    }

    /// Build a rect that must also fit inside a `width`×`height` raster.
    pub fn checked(x1: u32, y1: u32, x2: u32, y2: u32, width: u32, height: u32) -> Option<Self> {
        Self::new(x1, y1, x2, y2).filter(|r| r.fits(width, height))
    }

    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    pub fn fits(&self, width: u32, height: u32) -> bool {
        self.x2 <= width && self.y2 <= height
    }

    #[inline]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x1 && x < self.x2 && y >= self.y1 && y < self.y2
    }
}

impl fmt::Display for PixelRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})-({},{})", self.x1, self.y1, self.x2, self.y2)
    }
}

/// Parses `x1,y1,x2,y2`. Emptiness is rejected here; bounds are checked
/// later against the loaded raster.
impl FromStr for PixelRect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v = parse_quad::<u32>(s)?;
        PixelRect::new(v[0], v[1], v[2], v[3])
            .ok_or_else(|| format!("rectangle '{}' is empty (need x1<x2 and y1<y2)", s))
    }
}

impl FromStr for DisplayBox {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v = parse_quad::<f64>(s)?;
        Ok(DisplayBox::new(v[0], v[1], v[2], v[3]))
    }
}

/// A drag gesture: start and end points, `sx,sy,ex,ey`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragGesture {
    pub start: DisplayPoint,
    pub end: DisplayPoint,
}

impl FromStr for DragGesture {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v = parse_quad::<f64>(s)?;
        Ok(DragGesture {
            start: DisplayPoint::new(v[0], v[1]),
            end: DisplayPoint::new(v[2], v[3]),
        })
    }
}

fn parse_quad<T: FromStr>(s: &str) -> Result<[T; 4], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        return Err(format!("expected 4 comma-separated values, got '{}'", s));
    }
    let mut out: Vec<T> = Vec::with_capacity(4);
    for p in parts {
        out.push(p.parse::<T>().map_err(|_| format!("invalid number '{}' in '{}'", p, s))?);
    }
    out.try_into().map_err(|_| format!("expected 4 values in '{}'", s))
}

/// Map a display-space drag onto the source raster.
///
/// Both points are clamped into `display`, normalised to top-left /
/// bottom-right, scaled by `source / display` and rounded *outward*
/// (floor the top-left, ceil the bottom-right) so a partially covered edge
/// pixel is never lost. Returns `None` when the mapped rect is thinner than
/// one pixel on either axis, or when the display box has no extent.
pub fn map_drag_to_rect(
    display: &DisplayBox,
    start: DisplayPoint,
    end: DisplayPoint,
    source_size: (u32, u32),
) -> Option<PixelRect> {
    let (src_w, src_h) = source_size;
    let disp_w = display.width();
    let disp_h = display.height();
    if disp_w <= 0.0 || disp_h <= 0.0 || src_w == 0 || src_h == 0 {
        return None;
    }

    let a = display.clamp(start);
    let b = display.clamp(end);

    let rx1 = a.x.min(b.x) - display.x0;
    let ry1 = a.y.min(b.y) - display.y0;
    let rx2 = a.x.max(b.x) - display.x0;
    let ry2 = a.y.max(b.y) - display.y0;

    let scale_x = src_w as f64 / disp_w;
    let scale_y = src_h as f64 / disp_h;

    // Clamp in f64 before casting so out-of-range values never wrap.
    let x1 = (rx1 * scale_x).floor().max(0.0) as u32;
    let y1 = (ry1 * scale_y).floor().max(0.0) as u32;
    let x2 = (rx2 * scale_x).ceil().min(src_w as f64).max(0.0) as u32;
    let y2 = (ry2 * scale_y).ceil().min(src_h as f64).max(0.0) as u32;

    PixelRect::new(x1, y1, x2, y2)
}

// ============================================================================
// SelectionSet
// ============================================================================

/// Confirmed rectangles in confirmation order.
///
/// Duplicates and overlaps are kept; order only drives output numbering.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionSet {
    rects: Vec<PixelRect>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, rect: PixelRect) {
        self.rects.push(rect);
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn clear(&mut self) {
        self.rects.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PixelRect> {
        self.rects.iter()
    }

    pub fn as_slice(&self) -> &[PixelRect] {
        &self.rects
    }
}

impl FromIterator<PixelRect> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = PixelRect>>(iter: I) -> Self {
        Self { rects: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a SelectionSet {
    type Item = &'a PixelRect;
    type IntoIter = std::slice::Iter<'a, PixelRect>;

    fn into_iter(self) -> Self::IntoIter {
        self.rects.iter()
    }
}
