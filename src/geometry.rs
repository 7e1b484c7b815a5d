//! Plain geometry and colour types plus the pure helpers the canvas uses:
//! arc and rounded-rectangle polygons, pixel to NDC mapping and texture
//! clipping fractions.
//!
//! Pixel space is y-up: `Rect::y` is the bottom edge and `Rect::top()` the
//! top edge, matching the host viewport convention.

use std::f32::consts::{FRAC_PI_2, PI};
use std::ops::{Add, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Point = Point::new(0.0, 0.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Point::new(x, y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub const fn zero() -> Self {
        Self::new(0.0, 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
            a: 1.0,
        }
    }

    /// Same colour with a different alpha.
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Build a rect from its `[x1, y1, x2, y2]` corners.
    pub fn from_corners(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    /// `[x1, y1, x2, y2]`.
    pub fn corners(&self) -> [f32; 4] {
        [self.x, self.y, self.right(), self.top()]
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.top()
            && self.top() > other.y
    }

    /// Overlapping area of two rects, or `None` when they do not overlap.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        Some(Rect::from_corners(
            self.x.max(other.x),
            self.y.max(other.y),
            self.right().min(other.right()),
            self.top().min(other.top()),
        ))
    }

    /// Smallest rect containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_corners(
            self.x.min(other.x),
            self.y.min(other.y),
            self.right().max(other.right()),
            self.top().max(other.top()),
        )
    }

    /// Half-open containment: the near edges are inside, the far edges are not.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.top()
    }

    /// Open containment: a point on any edge is outside.
    pub fn contains_strict(&self, x: f32, y: f32) -> bool {
        x > self.x && x < self.right() && y > self.y && y < self.top()
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.top() <= self.top()
    }
}

/// Which corners of a rectangle get rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Corners {
    pub bottom_left: bool,
    pub top_left: bool,
    pub top_right: bool,
    pub bottom_right: bool,
}

impl Corners {
    pub const ALL: Corners = Corners {
        bottom_left: true,
        top_left: true,
        top_right: true,
        bottom_right: true,
    };

    pub const NONE: Corners = Corners {
        bottom_left: false,
        top_left: false,
        top_right: false,
        bottom_right: false,
    };
}

impl Default for Corners {
    fn default() -> Self {
        Self::ALL
    }
}

/// Points along a circular arc.
///
/// `start_angle` and `arc_angle` are in radians; a negative `arc_angle`
/// walks clockwise. Both end points are included, so `segments` is the
/// number of returned points.
pub fn arc_points(
    center: Point,
    radius: f32,
    start_angle: f32,
    arc_angle: f32,
    segments: usize,
) -> Vec<Point> {
    match segments {
        0 => Vec::new(),
        1 => vec![Point::new(
            center.x + radius * start_angle.cos(),
            center.y + radius * start_angle.sin(),
        )],
        n => {
            let step = arc_angle / (n - 1) as f32;
            (0..n)
                .map(|i| {
                    let angle = start_angle + step * i as f32;
                    Point::new(
                        center.x + radius * angle.cos(),
                        center.y + radius * angle.sin(),
                    )
                })
                .collect()
        }
    }
}

/// Closed polygon outlining `rect` with rounded corners.
///
/// Points run clockwise starting at the bottom-left corner. A corner that is
/// disabled (or a zero radius) contributes its single rectangle corner, so
/// `Corners::NONE` yields exactly the four rectangle corners. The radius is
/// clamped to half of the smaller side.
pub fn rounded_rect_points(
    rect: Rect,
    radius: f32,
    segments: usize,
    corners: Corners,
) -> Vec<Point> {
    let [x1, y1, x2, y2] = rect.corners();
    let r = radius.min(rect.width.min(rect.height) / 2.0).max(0.0);
    let round = r > 0.0 && segments > 1;

    let mut points = Vec::with_capacity(4 * segments.max(1));
    let mut corner = |enabled: bool, cx: f32, cy: f32, start: f32, sharp: Point| {
        if enabled && round {
            points.extend(arc_points(Point::new(cx, cy), r, start, -FRAC_PI_2, segments));
        } else {
            points.push(sharp);
        }
    };

    corner(
        corners.bottom_left,
        x1 + r,
        y1 + r,
        3.0 * FRAC_PI_2,
        Point::new(x1, y1),
    );
    corner(corners.top_left, x1 + r, y2 - r, PI, Point::new(x1, y2));
    corner(corners.top_right, x2 - r, y2 - r, FRAC_PI_2, Point::new(x2, y2));
    corner(corners.bottom_right, x2 - r, y1 + r, 0.0, Point::new(x2, y1));

    points
}

/// Map a pixel coordinate into `[-1, 1]` relative to the span `[min, max]`.
///
/// The value is clamped to the span first, so geometry outside the span
/// collapses onto its edge.
pub fn pixel_to_ndc(value: f32, min: f32, max: f32) -> f32 {
    let half = (max - min) / 2.0;
    if half <= 0.0 {
        return 0.0;
    }
    let center = min + half;
    (value.clamp(min, max) - center) / half
}

/// Texture coordinates `(near, far)` along one axis for a span starting at
/// `start` with length `extent`, cropped to `[min, max]`.
///
/// A span fully inside yields `(0.0, 1.0)`. Each end that overflows the
/// container is pulled inward by the overflowing fraction of `extent`, so the
/// visible part of the texture is cropped instead of squeezed.
pub fn texcoord_span(start: f32, extent: f32, min: f32, max: f32) -> (f32, f32) {
    if extent <= 0.0 {
        return (0.0, 1.0);
    }
    let end = start + extent;
    let near = if start < min {
        (min - start) / extent
    } else {
        0.0
    };
    let far = if end > max {
        1.0 - (end - max) / extent
    } else {
        1.0
    };
    (near.clamp(0.0, 1.0), far.clamp(0.0, 1.0))
}
