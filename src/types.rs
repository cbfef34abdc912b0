use serde::{Deserialize, Serialize};

/// A 2D point in image pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point) -> f32 {
        distance(*self, *other)
    }
}

/// Euclidean distance between two points: `sqrt((x1-x2)^2 + (y1-y2)^2)`.
pub fn distance(a: Point, b: Point) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

impl std::ops::Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign for Point {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f32> for Point {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// Face rectangle reported by a detector: top-left corner, width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Y coordinate of the top edge. The forehead guideline sits on it.
    pub fn top(&self) -> f32 {
        self.y
    }

    /// Map a point from box-relative [0,1] coordinates into image coordinates.
    pub fn denormalize_point(&self, p: Point) -> Point {
        Point::new(self.x + p.x * self.width, self.y + p.y * self.height)
    }
}

/// Landmark points in the order produced by a shape predictor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub points: Vec<Point>,
}

impl Shape {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn zeros(n: usize) -> Self {
        Self {
            points: vec![Point::zero(); n],
        }
    }

    pub fn num_landmarks(&self) -> usize {
        self.points.len()
    }

    /// Build a shape from interleaved `[x0, y0, x1, y1, ...]` values.
    pub fn from_interleaved(values: &[f32]) -> Self {
        debug_assert!(values.len() % 2 == 0);
        Self {
            points: values
                .chunks_exact(2)
                .map(|c| Point::new(c[0], c[1]))
                .collect(),
        }
    }

    /// Add another shape's per-landmark offsets to this one.
    pub fn add_delta(&mut self, delta: &Shape) {
        debug_assert_eq!(self.points.len(), delta.points.len());
        for (p, d) in self.points.iter_mut().zip(&delta.points) {
            *p += *d;
        }
    }
}

impl std::ops::Index<usize> for Shape {
    type Output = Point;

    fn index(&self, idx: usize) -> &Self::Output {
        &self.points[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 4.0),
            Point::new(-12.5, 7.25),
            Point::new(640.0, 480.0),
            Point::new(101.5, -33.0),
        ]
    }

    #[test]
    fn distance_known_value() {
        assert_eq!(distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let points = sample_points();
        for a in &points {
            for b in &points {
                assert_eq!(distance(*a, *b), distance(*b, *a));
            }
        }
    }

    #[test]
    fn distance_to_self_is_zero() {
        for p in sample_points() {
            assert_eq!(distance(p, p), 0.0);
        }
        assert!(distance(Point::new(1.0, 1.0), Point::new(1.0, 1.5)) > 0.0);
    }

    #[test]
    fn distance_triangle_inequality() {
        let points = sample_points();
        for a in &points {
            for b in &points {
                for c in &points {
                    let direct = distance(*a, *c);
                    let via = distance(*a, *b) + distance(*b, *c);
                    assert!(direct <= via + 1e-3, "{a:?} {b:?} {c:?}");
                }
            }
        }
    }

    #[test]
    fn point_arithmetic() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a + b, Point::new(4.0, 6.0));
        assert_eq!(b - a, Point::new(2.0, 2.0));
        assert_eq!(a * 2.0, Point::new(2.0, 4.0));
    }

    #[test]
    fn bounding_box_denormalize() {
        let bbox = BoundingBox::new(100.0, 50.0, 200.0, 100.0);
        assert_eq!(bbox.top(), 50.0);
        assert_eq!(
            bbox.denormalize_point(Point::new(0.5, 0.5)),
            Point::new(200.0, 100.0)
        );
    }

    #[test]
    fn shape_from_interleaved_and_delta() {
        let mut shape = Shape::from_interleaved(&[0.0, 0.0, 1.0, 1.0]);
        assert_eq!(shape.num_landmarks(), 2);

        shape.add_delta(&Shape::from_interleaved(&[0.1, 0.2, 0.3, 0.4]));
        assert!((shape[0].x - 0.1).abs() < 1e-6);
        assert!((shape[1].y - 1.4).abs() < 1e-6);
    }
}
