//! Distance, delay and angle between fixes, clusters and query points
//!
//! All coordinates share the linear unit of the projected CRS (meters by
//! convention); all times are seconds.

use super::fix::Fix;

/// Added to the denominator of each quadrant's arctangent so that points
/// lying exactly on an axis do not divide by zero
pub const AXIS_EPSILON: f64 = 0.001;

/// Point is a planar coordinate, `x` east and `y` north
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// Anything with a planar location
pub trait Position {
    fn position(&self) -> Point;
}

impl Position for Point {
    fn position(&self) -> Point {
        *self
    }
}

impl<T: Position + ?Sized> Position for &T {
    fn position(&self) -> Point {
        (**self).position()
    }
}

impl Position for Fix {
    fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Closed time interval `[start, end]` in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSpan {
    pub start: i64,
    pub end: i64,
}

impl TimeSpan {
    pub fn instant(time: i64) -> Self {
        TimeSpan {
            start: time,
            end: time,
        }
    }

    pub fn contains(&self, time: i64) -> bool {
        self.start <= time && time <= self.end
    }

    pub fn elapsed(&self) -> i64 {
        self.end - self.start
    }
}

/// Axis-aligned extent of a set of points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    /// Returns `None` for an empty input
    pub fn of<I, P>(items: I) -> Option<Bounds>
    where
        I: IntoIterator<Item = P>,
        P: Position,
    {
        let mut items = items.into_iter();
        let first = items.next()?.position();
        let mut bounds = Bounds {
            min: first,
            max: first,
        };
        for item in items {
            let p = item.position();
            bounds.min.x = bounds.min.x.min(p.x);
            bounds.min.y = bounds.min.y.min(p.y);
            bounds.max.x = bounds.max.x.max(p.x);
            bounds.max.y = bounds.max.y.max(p.y);
        }
        Some(bounds)
    }

    pub fn spread_x(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn spread_y(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Mid-point of the extent
    pub fn center(&self) -> Point {
        Point::new(
            self.min.x + self.spread_x() / 2.0,
            self.min.y + self.spread_y() / 2.0,
        )
    }
}

/// Calculates Euclidean distance between two located items
pub fn distance(a: &impl Position, b: &impl Position) -> f64 {
    let a = a.position();
    let b = b.position();
    (a.x - b.x).hypot(a.y - b.y)
}

/// Absolute time difference between two instants
pub fn delay_point_to_point(a: i64, b: i64) -> i64 {
    (a - b).abs()
}

/// Time from an instant to a cluster's span
///
/// Zero inside `[start, end]`, otherwise the gap to the nearer endpoint.
pub fn delay_point_to_cluster(time: i64, span: &TimeSpan) -> i64 {
    if time < span.start {
        span.start - time
    } else if time > span.end {
        time - span.end
    } else {
        0
    }
}

/// Gap between two clusters, measured from the `earlier` one to the `later` one
///
/// This is not symmetric: it is zero whenever `later` starts before
/// `earlier` ends, so callers must pass the chronologically later cluster
/// first. Debug builds assert that ordering.
pub fn delay_cluster_to_cluster(later: &TimeSpan, earlier: &TimeSpan) -> i64 {
    debug_assert!(
        later.start >= earlier.start,
        "delay_cluster_to_cluster called with clusters out of chronological order"
    );
    (later.start - earlier.end).max(0)
}

/// Calculates the bearing and distance of `point` as seen from `center`
///
/// # Returns
///
/// `(angle, distance)` where `angle` is in degrees in `[0, 360)`, clockwise
/// from north. Each quadrant uses a plain arctangent with [`AXIS_EPSILON`]
/// added to the denominator, so angles carry a small deterministic bias.
pub fn angle_and_distance(point: &impl Position, center: &impl Position) -> (f64, f64) {
    let p = point.position();
    let c = center.position();
    let distance = distance(&p, &c);

    //        0
    //     q4 | q1
    // 270 ---+--- 90
    //     q3 | q2
    //       180
    let angle = if p.x >= c.x && p.y >= c.y {
        let (dx, dy) = (p.x - c.x, p.y - c.y);
        (dx / (dy + AXIS_EPSILON)).atan().to_degrees()
    } else if p.x >= c.x {
        let (dx, dy) = (p.x - c.x, c.y - p.y);
        90.0 + (dy / (dx + AXIS_EPSILON)).atan().to_degrees()
    } else if p.y <= c.y {
        let (dx, dy) = (c.x - p.x, c.y - p.y);
        180.0 + (dx / (dy + AXIS_EPSILON)).atan().to_degrees()
    } else {
        let (dx, dy) = (c.x - p.x, p.y - c.y);
        270.0 + (dy / (dx + AXIS_EPSILON)).atan().to_degrees()
    };

    (angle, distance)
}

/// Unweighted sum of two normalized ratios; lower means closer
///
/// A zero limit makes any non-zero value infinitely far.
pub fn closeness(distance: f64, radius: f64, delay: i64, time_cutoff: i64) -> f64 {
    ratio(distance, radius) + ratio(delay as f64, time_cutoff as f64)
}

fn ratio(value: f64, limit: f64) -> f64 {
    if limit > 0.0 {
        value / limit
    } else if value == 0.0 {
        0.0
    } else {
        f64::INFINITY
    }
}
