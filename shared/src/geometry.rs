//! Geometry module - the day/night wave and the past/future split
//!
//! All coordinates are surface coordinates: origin at the top-left corner,
//! y growing downward. The surface spans 23 hour-widths, so one day is
//! `24 * width / 23` wide and the wave runs for two full days from a point
//! left of the surface.

/// Half-spans at or below this are drawn as straight lines
pub const GEOMETRY_EPSILON: f64 = 1e-6;

/// Number of hour-widths across the surface
pub const HOURS_ACROSS: f32 = 23.0;

/// Minimum area for a partition region to be emitted
const MIN_REGION_AREA: f32 = 1e-3;

/// A point in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Which half of the day a wave segment covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span {
    /// Sunset to sunrise, bulging below the midline
    Night,
    /// Sunrise to sunset, bulging above the midline
    Day,
}

/// One quadratic segment of the wave, in absolute coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveSegment {
    pub span: Span,
    pub control: Point,
    pub end: Point,
}

/// The closed wave used to clip the widget into day and night lobes
#[derive(Debug, Clone, PartialEq)]
pub struct ClipCurve {
    start: Point,
    segments: [CurveSegment; 4],
}

impl ClipCurve {
    pub fn start(&self) -> Point {
        self.start
    }

    pub fn segments(&self) -> &[CurveSegment; 4] {
        &self.segments
    }

    /// Start point of segment `index`
    pub fn segment_start(&self, index: usize) -> Point {
        if index == 0 {
            self.start
        } else {
            self.segments[index - 1].end
        }
    }

    /// Evaluate segment `index` at `t` in [0, 1]
    pub fn point_on(&self, index: usize, t: f32) -> Point {
        let p0 = self.segment_start(index);
        let CurveSegment { control, end, .. } = self.segments[index];
        let u = 1.0 - t;
        Point::new(
            u * u * p0.x + 2.0 * u * t * control.x + t * t * end.x,
            u * u * p0.y + 2.0 * u * t * control.y + t * t * end.y,
        )
    }

    /// Sample the whole curve, `samples_per_segment` points per segment plus the start
    pub fn flatten(&self, samples_per_segment: usize) -> Vec<Point> {
        let n = samples_per_segment.max(1);
        let mut points = Vec::with_capacity(1 + n * self.segments.len());
        points.push(self.start);
        for index in 0..self.segments.len() {
            for step in 1..=n {
                points.push(self.point_on(index, step as f32 / n as f32));
            }
        }
        points
    }

    /// Sample a single lobe: segment `index` closed by its chord
    fn lobe(&self, index: usize, samples: usize) -> Vec<Point> {
        let n = samples.max(1);
        (0..=n)
            .map(|step| self.point_on(index, step as f32 / n as f32))
            .collect()
    }
}

/// Axis-aligned rectangle in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl FillRect {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f32 {
        (self.right - self.left).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.bottom - self.top).max(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }
}

/// Colour role of a partition region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    /// Elapsed time with the sun above the horizon
    Sunrise,
    /// Elapsed time with the sun below the horizon
    Sunset,
    /// Hours not yet reached today
    Future,
}

/// A filled polygon produced by [`DayGeometry::partition`]
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub fill: Fill,
    pub points: Vec<Point>,
}

impl Region {
    pub fn area(&self) -> f32 {
        polygon_area(&self.points)
    }
}

/// Shapes for one frame of the widget
#[derive(Debug, Clone, PartialEq)]
pub struct DayGeometry {
    width: f32,
    height: f32,
    split_x: f32,
    curve: ClipCurve,
    past: FillRect,
    future: FillRect,
}

impl DayGeometry {
    /// Derive the frame's shapes from boundary fractions and the current hour
    pub fn compute(day_start: f64, day_end: f64, width: f32, height: f32, hour_of_day: u32) -> Self {
        let width = sanitize_extent(width);
        let height = sanitize_extent(height);

        let scale_x = width / HOURS_ACROSS;
        let scale_y = height / 2.0;
        let day_length = 24.0 * scale_x;

        let day_half = (day_end - day_start) / 2.0;
        let night_half = (1.0 - day_end + day_start) / 2.0;

        // Each lobe's bulge grows with how much longer its half is than the other
        let (night_bulge, day_bulge) = if day_half <= GEOMETRY_EPSILON || night_half <= GEOMETRY_EPSILON {
            (0.0, 0.0)
        } else {
            (
                ((night_half / day_half + 1.0) / 2.0) as f32,
                ((day_half / night_half + 1.0) / 2.0) as f32,
            )
        };

        let night_width = night_half as f32 * day_length;
        let day_width = day_half as f32 * day_length;

        let start = Point::new(
            (day_start - (1.0 - day_end + day_start)) as f32 * day_length,
            scale_y,
        );

        let mut cursor = start;
        let segments = [Span::Night, Span::Day, Span::Night, Span::Day].map(|span| {
            let (half, dy) = match span {
                Span::Night => (night_width, scale_y * night_bulge),
                Span::Day => (day_width, -scale_y * day_bulge),
            };
            let segment = CurveSegment {
                span,
                control: cursor.offset(half, dy),
                end: cursor.offset(half * 2.0, 0.0),
            };
            cursor = segment.end;
            segment
        });

        let split_x = hour_of_day.min(23) as f32 * scale_x;

        Self {
            width,
            height,
            split_x,
            curve: ClipCurve { start, segments },
            past: FillRect::new(0.0, 0.0, split_x, height),
            future: FillRect::new(split_x, 0.0, width, height),
        }
    }

    pub fn curve(&self) -> &ClipCurve {
        &self.curve
    }

    /// Everything left of the current hour
    pub fn past_rect(&self) -> FillRect {
        self.past
    }

    /// Everything right of the current hour
    pub fn future_rect(&self) -> FillRect {
        self.future
    }

    /// Upper half of the past rectangle
    pub fn sunrise_rect(&self) -> FillRect {
        FillRect::new(self.past.left, self.past.top, self.past.right, self.midline())
    }

    /// Lower half of the past rectangle
    pub fn sunset_rect(&self) -> FillRect {
        FillRect::new(self.past.left, self.midline(), self.past.right, self.past.bottom)
    }

    /// X coordinate separating past from future
    pub fn split_x(&self) -> f32 {
        self.split_x
    }

    pub fn midline(&self) -> f32 {
        self.height / 2.0
    }

    /// Intersect the wave's lobes with the fill rectangles.
    ///
    /// This is the curve clip applied to the three rectangles, materialised
    /// as polygons for renderers that cannot clip to a path.
    pub fn partition(&self, samples_per_segment: usize) -> Vec<Region> {
        let fills = [
            (Fill::Sunrise, self.sunrise_rect()),
            (Fill::Sunset, self.sunset_rect()),
            (Fill::Future, self.future),
        ];

        let mut regions = Vec::new();
        for index in 0..self.curve.segments.len() {
            let lobe = self.curve.lobe(index, samples_per_segment);
            if polygon_area(&lobe) <= MIN_REGION_AREA {
                continue;
            }

            for (fill, rect) in fills {
                if rect.is_empty() {
                    continue;
                }
                let points = clip_to_rect(&lobe, rect);
                if polygon_area(&points) > MIN_REGION_AREA {
                    regions.push(Region { fill, points });
                }
            }
        }
        regions
    }
}

fn sanitize_extent(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// Absolute polygon area by the shoelace formula
fn polygon_area(points: &[Point]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        twice += a.x * b.y - b.x * a.y;
    }
    (twice / 2.0).abs()
}

#[derive(Clone, Copy)]
enum Edge {
    Left(f32),
    Right(f32),
    Top(f32),
    Bottom(f32),
}

impl Edge {
    fn inside(self, p: Point) -> bool {
        match self {
            Edge::Left(x) => p.x >= x,
            Edge::Right(x) => p.x <= x,
            Edge::Top(y) => p.y >= y,
            Edge::Bottom(y) => p.y <= y,
        }
    }

    fn intersect(self, a: Point, b: Point) -> Point {
        match self {
            Edge::Left(x) | Edge::Right(x) => {
                let t = (x - a.x) / (b.x - a.x);
                Point::new(x, a.y + t * (b.y - a.y))
            }
            Edge::Top(y) | Edge::Bottom(y) => {
                let t = (y - a.y) / (b.y - a.y);
                Point::new(a.x + t * (b.x - a.x), y)
            }
        }
    }
}

/// Sutherland-Hodgman clip of a polygon against a rectangle
fn clip_to_rect(polygon: &[Point], rect: FillRect) -> Vec<Point> {
    let edges = [
        Edge::Left(rect.left),
        Edge::Right(rect.right),
        Edge::Top(rect.top),
        Edge::Bottom(rect.bottom),
    ];

    let mut output = polygon.to_vec();
    for edge in edges {
        if output.is_empty() {
            break;
        }
        let input = std::mem::take(&mut output);
        let mut previous = input[input.len() - 1];
        for &current in &input {
            match (edge.inside(current), edge.inside(previous)) {
                (true, true) => output.push(current),
                (true, false) => {
                    output.push(edge.intersect(previous, current));
                    output.push(current);
                }
                (false, true) => output.push(edge.intersect(previous, current)),
                (false, false) => {}
            }
            previous = current;
        }
    }
    output
}
