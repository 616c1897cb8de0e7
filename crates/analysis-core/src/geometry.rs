//! Geometry and statistics helpers.
//!
//! - Segment intersection by Cramer's rule
//! - Square 2D Gaussian kernel
//! - Pearson correlation

use serde::{Deserialize, Serialize};

/// A point in display pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Nearest whole pixel.
    pub fn to_pixel(&self) -> (i64, i64) {
        (self.x.round() as i64, self.y.round() as i64)
    }
}

/// A straight path segment between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn from_coords(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    /// Line coefficients `(a, b, c)` of `a*x + b*y = c`.
    fn line_coefficients(&self) -> (f64, f64, f64) {
        let (p, q) = (self.start, self.end);
        let a = p.y - q.y;
        let b = q.x - p.x;
        let c = -(p.x * q.y - q.x * p.y);
        (a, b, c)
    }

    /// Whether `point` lies strictly inside this segment's x and y ranges.
    fn strictly_spans(&self, point: Point) -> bool {
        let (x0, x1) = min_max(self.start.x, self.end.x);
        let (y0, y1) = min_max(self.start.y, self.end.y);
        x0 < point.x && point.x < x1 && y0 < point.y && point.y < y1
    }
}

fn min_max(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Crossing point of two segments, or `None`.
///
/// The lines through both segments are solved with Cramer's rule. Parallel
/// or coincident lines (zero determinant) never intersect. A crossing only
/// counts when it lies strictly inside the x and y ranges of both segments,
/// so touching at a shared endpoint is not a crossing, and neither is any
/// crossing involving a perfectly horizontal or vertical segment.
pub fn segment_intersection(first: &Segment, second: &Segment) -> Option<Point> {
    let (a1, b1, c1) = first.line_coefficients();
    let (a2, b2, c2) = second.line_coefficients();

    let det = a1 * b2 - b1 * a2;
    if det == 0.0 {
        return None;
    }
    let det_x = c1 * b2 - b1 * c2;
    let det_y = a1 * c2 - c1 * a2;
    let point = Point::new(det_x / det, det_y / det);

    (first.strictly_spans(point) && second.strictly_spans(point)).then_some(point)
}

/// A square 2D Gaussian, peak value 1 at the centre cell.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianKernel {
    size: usize,
    sd: f64,
    values: Vec<f64>,
}

impl GaussianKernel {
    /// Build a `size` × `size` kernel with standard deviation `sd` on both
    /// axes. The centre cell is at index `size / 2`. A non-positive `sd`
    /// yields a single unit spike at the centre.
    pub fn new(size: usize, sd: f64) -> Self {
        let centre = (size / 2) as f64;
        let mut values = vec![0.0; size * size];

        if sd > 0.0 {
            let denom = 2.0 * sd * sd;
            for j in 0..size {
                let dy = j as f64 - centre;
                for i in 0..size {
                    let dx = i as f64 - centre;
                    values[j * size + i] = (-(dx * dx / denom + dy * dy / denom)).exp();
                }
            }
        } else if size > 0 {
            let c = size / 2;
            values[c * size + c] = 1.0;
        }

        Self { size, sd, values }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn sd(&self) -> f64 {
        self.sd
    }

    /// Value at column `i`, row `j`.
    pub fn at(&self, i: usize, j: usize) -> f64 {
        self.values[j * self.size + i]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Sum of every kernel cell.
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }
}

/// Pearson correlation coefficient of two equally long samples.
///
/// Returns `None` for fewer than two pairs, mismatched lengths or zero
/// variance in either sample. The result is clamped to `[-1, 1]`.
pub fn pearson_r(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len();
    if n < 2 || n != y.len() {
        return None;
    }

    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let mut num = 0.0;
    let mut ss_x = 0.0;
    let mut ss_y = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        num += dx * dy;
        ss_x += dx * dx;
        ss_y += dy * dy;
    }

    let den = (ss_x * ss_y).sqrt();
    if den == 0.0 || !den.is_finite() {
        return None;
    }
    Some((num / den).clamp(-1.0, 1.0))
}

/// Arithmetic mean, `None` for an empty sample.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}
