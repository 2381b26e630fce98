use std::ops::{Add, Mul, Sub};

// Point
//------------------------------------------------------------------------------

// Continuous pixel coordinates, pixel (i, j) covers [i, i + 1) x [j, j + 1)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dist(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn cross(self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    // Pixel containing the point
    pub fn pixel(self) -> (i32, i32) {
        (self.x.floor() as i32, self.y.floor() as i32)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Self::Output {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Self::Output {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Self::Output {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

// Axis
//------------------------------------------------------------------------------

// Unit step of a scan direction
pub trait Axis {
    const DX: i32;
    const DY: i32;

    fn step(p: (i32, i32), n: i32) -> (i32, i32) {
        (p.0 + Self::DX * n, p.1 + Self::DY * n)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct X;

#[derive(Debug, Clone, Copy)]
pub struct Y;

// Towards bottom right
#[derive(Debug, Clone, Copy)]
pub struct Diagonal;

// Towards top right
#[derive(Debug, Clone, Copy)]
pub struct AntiDiagonal;

impl Axis for X {
    const DX: i32 = 1;
    const DY: i32 = 0;
}

impl Axis for Y {
    const DX: i32 = 0;
    const DY: i32 = 1;
}

impl Axis for Diagonal {
    const DX: i32 = 1;
    const DY: i32 = 1;
}

impl Axis for AntiDiagonal {
    const DX: i32 = 1;
    const DY: i32 = -1;
}

// Bresenham line
//------------------------------------------------------------------------------

// Pixels between two end points, both inclusive
#[derive(Debug, Clone)]
pub struct BresenhamLine {
    cur: (i32, i32),
    end: (i32, i32),
    dx: i32,
    dy: i32,
    sx: i32,
    sy: i32,
    err: i32,
    done: bool,
}

impl BresenhamLine {
    pub fn new(start: (i32, i32), end: (i32, i32)) -> Self {
        let dx = (end.0 - start.0).abs();
        let dy = -(end.1 - start.1).abs();
        let sx = if start.0 < end.0 { 1 } else { -1 };
        let sy = if start.1 < end.1 { 1 } else { -1 };
        Self { cur: start, end, dx, dy, sx, sy, err: dx + dy, done: false }
    }
}

impl Iterator for BresenhamLine {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let res = self.cur;
        if self.cur == self.end {
            self.done = true;
            return Some(res);
        }

        let e2 = 2 * self.err;
        if e2 >= self.dy {
            self.err += self.dy;
            self.cur.0 += self.sx;
        }
        if e2 <= self.dx {
            self.err += self.dx;
            self.cur.1 += self.sy;
        }
        Some(res)
    }
}

#[cfg(test)]
mod geometry_tests {
    use super::{AntiDiagonal, Axis, BresenhamLine, Diagonal, Point};

    #[test]
    fn test_bresenham_horizontal() {
        let pts: Vec<_> = BresenhamLine::new((2, 5), (6, 5)).collect();
        assert_eq!(pts, [(2, 5), (3, 5), (4, 5), (5, 5), (6, 5)]);
    }

    #[test]
    fn test_bresenham_steep_reverse() {
        let pts: Vec<_> = BresenhamLine::new((3, 4), (2, 0)).collect();
        assert_eq!(pts.len(), 5);
        assert_eq!(pts[0], (3, 4));
        assert_eq!(pts[4], (2, 0));
        assert!(pts.windows(2).all(|w| w[1].1 == w[0].1 - 1));
    }

    #[test]
    fn test_bresenham_single_point() {
        let pts: Vec<_> = BresenhamLine::new((7, 7), (7, 7)).collect();
        assert_eq!(pts, [(7, 7)]);
    }

    #[test]
    fn test_axis_step() {
        assert_eq!(Diagonal::step((1, 1), 2), (3, 3));
        assert_eq!(AntiDiagonal::step((1, 1), -1), (0, 2));
    }

    #[test]
    fn test_point_ops() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(4.0, 6.0);
        assert_eq!(a.dist(b), 5.0);
        assert_eq!((b - a) * 2.0, Point::new(6.0, 8.0));
        assert_eq!(Point::new(1.0, 0.0).cross(Point::new(0.0, 1.0)), 1.0);
        assert_eq!(Point::new(-0.5, 3.9).pixel(), (-1, 3));
    }
}
