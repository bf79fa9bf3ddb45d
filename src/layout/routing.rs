//! Orthogonal post-processing of raw edge polylines: snapping onto axis-aligned segments
//! and trimming endpoints to the boundary of the source/target boxes.

use super::geometry::{Point, Rect};

const EPS: f64 = 1e-6;

/// Axis along which ranks advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Vertical,
    Horizontal,
}

/// Centre/half-extent description of a box an edge starts or ends at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeBox {
    pub center: Point,
    pub half_width: f64,
    pub half_height: f64,
}

impl ShapeBox {
    pub fn new(center: Point, half_width: f64, half_height: f64) -> Self {
        Self {
            center,
            half_width: half_width.abs(),
            half_height: half_height.abs(),
        }
    }

    pub fn from_rect(rect: &Rect) -> Self {
        Self::new(rect.center(), rect.width / 2.0, rect.height / 2.0)
    }

    pub fn left(&self) -> f64 {
        self.center.x - self.half_width
    }

    pub fn right(&self) -> f64 {
        self.center.x + self.half_width
    }

    pub fn top(&self) -> f64 {
        self.center.y - self.half_height
    }

    pub fn bottom(&self) -> f64 {
        self.center.y + self.half_height
    }

    pub fn has_area(&self) -> bool {
        self.half_width > EPS && self.half_height > EPS
    }

    /// Inside or on the boundary.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left() - EPS
            && point.x <= self.right() + EPS
            && point.y >= self.top() - EPS
            && point.y <= self.bottom() + EPS
    }

    pub fn on_boundary(&self, point: Point) -> bool {
        if !self.contains(point) {
            return false;
        }
        (point.x - self.left()).abs() <= 1e-4
            || (point.x - self.right()).abs() <= 1e-4
            || (point.y - self.top()).abs() <= 1e-4
            || (point.y - self.bottom()).abs() <= 1e-4
    }

    /// Where the segment `inside -> outside` leaves the box.
    fn exit_point(&self, inside: Point, outside: Point) -> Point {
        let dx = outside.x - inside.x;
        let dy = outside.y - inside.y;
        let tx = if dx > EPS {
            (self.right() - inside.x) / dx
        } else if dx < -EPS {
            (self.left() - inside.x) / dx
        } else {
            f64::INFINITY
        };
        let ty = if dy > EPS {
            (self.bottom() - inside.y) / dy
        } else if dy < -EPS {
            (self.top() - inside.y) / dy
        } else {
            f64::INFINITY
        };
        let t = tx.min(ty).clamp(0.0, 1.0);
        Point::new(inside.x + dx * t, inside.y + dy * t)
    }
}

fn is_axis_aligned(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() <= EPS || (a.y - b.y).abs() <= EPS
}

/// Insert one bend into every diagonal segment. Segments move along the primary axis first,
/// except the final segment of a multi-segment path, which moves across first so the path
/// arrives along the primary axis. Endpoints are preserved.
pub fn snap_orthogonal(points: &[Point], axis: Axis) -> Vec<Point> {
    if points.len() < 2 {
        return points.to_vec();
    }
    let last_segment = points.len() - 2;
    let mut out = Vec::with_capacity(points.len() * 2);
    out.push(points[0]);
    for (idx, pair) in points.windows(2).enumerate() {
        let (a, b) = (pair[0], pair[1]);
        if !is_axis_aligned(a, b) {
            let primary_first = idx != last_segment || last_segment == 0;
            let bend = match (axis, primary_first) {
                (Axis::Vertical, true) | (Axis::Horizontal, false) => Point::new(a.x, b.y),
                (Axis::Vertical, false) | (Axis::Horizontal, true) => Point::new(b.x, a.y),
            };
            out.push(bend);
        }
        out.push(b);
    }
    out
}

/// Move the first point to where the path leaves `source` and the last point to where it
/// enters `target`. An endpoint is left alone when its shape is `None`, has no area, or
/// does not contain that endpoint.
pub fn clip_to_shapes(
    points: &[Point],
    source: Option<&ShapeBox>,
    target: Option<&ShapeBox>,
) -> Vec<Point> {
    let mut out = points.to_vec();
    if let Some(shape) = source {
        out = clip_start(&out, shape);
    }
    if let Some(shape) = target {
        out.reverse();
        out = clip_start(&out, shape);
        out.reverse();
    }
    out
}

fn clip_start(points: &[Point], shape: &ShapeBox) -> Vec<Point> {
    if points.len() < 2 || !shape.has_area() || !shape.contains(points[0]) {
        return points.to_vec();
    }
    let Some(first_outside) = points.iter().position(|p| !shape.contains(*p)) else {
        return points.to_vec();
    };
    let exit = shape.exit_point(points[first_outside - 1], points[first_outside]);
    let mut out = Vec::with_capacity(points.len() - first_outside + 1);
    out.push(exit);
    out.extend_from_slice(&points[first_outside..]);
    out
}

/// Drop repeated points and interior points that continue a straight run.
pub fn compress_path(points: &[Point]) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let mut deduped: Vec<Point> = Vec::with_capacity(points.len());
    for point in points {
        if deduped.last().is_some_and(|prev| prev.approx_eq(*point)) {
            continue;
        }
        deduped.push(*point);
    }
    if deduped.len() == 1 {
        deduped.push(*points.last().unwrap_or(&deduped[0]));
        return deduped;
    }

    let mut out: Vec<Point> = Vec::with_capacity(deduped.len());
    out.push(deduped[0]);
    for idx in 1..deduped.len() - 1 {
        let prev = out[out.len() - 1];
        let curr = deduped[idx];
        let next = deduped[idx + 1];
        let dx1 = curr.x - prev.x;
        let dy1 = curr.y - prev.y;
        let dx2 = next.x - curr.x;
        let dy2 = next.y - curr.y;
        let straight_vertical = dx1.abs() <= EPS && dx2.abs() <= EPS && dy1 * dy2 > 0.0;
        let straight_horizontal = dy1.abs() <= EPS && dy2.abs() <= EPS && dx1 * dx2 > 0.0;
        if straight_vertical || straight_horizontal {
            continue;
        }
        out.push(curr);
    }
    out.push(deduped[deduped.len() - 1]);
    out
}

pub fn is_orthogonal(points: &[Point]) -> bool {
    points.windows(2).all(|pair| is_axis_aligned(pair[0], pair[1]))
}

pub fn path_length(points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|pair| (pair[1].x - pair[0].x).hypot(pair[1].y - pair[0].y))
        .sum()
}

pub fn path_bend_count(points: &[Point]) -> usize {
    if points.len() < 3 {
        return 0;
    }
    let mut bends = 0usize;
    for idx in 1..points.len() - 1 {
        let p0 = points[idx - 1];
        let p1 = points[idx];
        let p2 = points[idx + 1];
        let dx1 = p1.x - p0.x;
        let dy1 = p1.y - p0.y;
        let dx2 = p2.x - p1.x;
        let dy2 = p2.y - p1.y;
        if (dx1.abs() <= EPS && dy1.abs() <= EPS) || (dx2.abs() <= EPS && dy2.abs() <= EPS) {
            continue;
        }
        let cross = dx1 * dy2 - dy1 * dx2;
        if cross.abs() > EPS {
            bends += 1;
        }
    }
    bends
}

/// Midpoint of the longest interior segment (the longest segment overall for short paths).
pub fn label_anchor_from_points(points: &[Point]) -> Option<Point> {
    if points.len() < 2 {
        return None;
    }
    let segment_count = points.len() - 1;
    let (start_idx, end_idx) = if segment_count >= 3 {
        (1, segment_count - 1)
    } else {
        (0, segment_count)
    };
    let segment_len = |idx: usize| {
        let (p1, p2) = (points[idx], points[idx + 1]);
        (p2.x - p1.x).hypot(p2.y - p1.y)
    };
    let mut best: Option<(usize, f64)> = None;
    for idx in start_idx..end_idx {
        let len = segment_len(idx);
        if best.is_none_or(|(_, best_len)| len > best_len) {
            best = Some((idx, len));
        }
    }
    let idx = best.map(|(idx, _)| idx).unwrap_or(0);
    let (p1, p2) = (points[idx], points[idx + 1]);
    Some(Point::new((p1.x + p2.x) / 2.0, (p1.y + p2.y) / 2.0))
}

/// Loop leaving the bottom of the node and re-entering on its right side.
pub fn self_loop_path(node: &Rect, pad: f64) -> Vec<Point> {
    let cx = node.x + node.width / 2.0;
    let cy = node.y + node.height / 2.0;
    vec![
        Point::new(cx, node.bottom()),
        Point::new(cx, node.bottom() + pad),
        Point::new(node.right() + pad, node.bottom() + pad),
        Point::new(node.right() + pad, cy),
        Point::new(node.right(), cy),
    ]
}
