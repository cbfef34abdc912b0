//! Pixel access and shape-indexed feature sampling for the shape predictor.

use serde::{Deserialize, Serialize};

use crate::types::{BoundingBox, Point, Shape};

/// Grayscale pixel lookup used by the predictor.
pub trait ImageAccess {
    /// Intensity at (x, y), or 0 outside the image.
    fn get_pixel(&self, x: i32, y: i32) -> u8;

    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

impl ImageAccess for image::GrayImage {
    fn get_pixel(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x >= self.width() as i32 || y >= self.height() as i32 {
            return 0;
        }
        image::GrayImage::get_pixel(self, x as u32, y as u32).0[0]
    }

    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }
}

/// Rotation plus uniform scale, `[[a, -b], [b, a]]`. Translation is not kept
/// because feature offsets are relative to an anchor landmark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityTransform2D {
    pub a: f32,
    pub b: f32,
}

impl SimilarityTransform2D {
    pub const IDENTITY: Self = Self { a: 1.0, b: 0.0 };

    pub fn apply(&self, p: Point) -> Point {
        Point::new(self.a * p.x - self.b * p.y, self.b * p.x + self.a * p.y)
    }

    pub fn scale(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }
}

/// Least-squares similarity transform mapping `from` onto `to`.
///
/// Both shapes must have the same number of points. Returns the identity when
/// `from` has no spread.
pub fn find_similarity_transform(from: &Shape, to: &Shape) -> SimilarityTransform2D {
    debug_assert_eq!(from.num_landmarks(), to.num_landmarks());

    let n = from.num_landmarks().min(to.num_landmarks());
    if n == 0 {
        return SimilarityTransform2D::IDENTITY;
    }

    let mean = |shape: &Shape| {
        let sum = shape.points[..n]
            .iter()
            .fold(Point::zero(), |acc, p| acc + *p);
        sum * (1.0 / n as f32)
    };
    let from_mean = mean(from);
    let to_mean = mean(to);

    let mut dot = 0.0f32;
    let mut cross = 0.0f32;
    let mut spread = 0.0f32;
    for (f, t) in from.points[..n].iter().zip(&to.points[..n]) {
        let f = *f - from_mean;
        let t = *t - to_mean;
        dot += f.x * t.x + f.y * t.y;
        cross += f.x * t.y - f.y * t.x;
        spread += f.x * f.x + f.y * f.y;
    }

    if spread <= f32::EPSILON {
        return SimilarityTransform2D::IDENTITY;
    }

    SimilarityTransform2D {
        a: dot / spread,
        b: cross / spread,
    }
}

/// One entry of a cascade stage's feature pool: a pixel located relative to
/// a landmark of the current shape estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeaturePoint {
    pub anchor: u16,
    /// Offset from the anchor in face-box-normalized units, before the
    /// similarity transform is applied.
    pub offset: Point,
}

/// Sample the intensity of every pool feature for the current shape estimate.
///
/// `shape` is in face-box-normalized coordinates; `tform` maps the mean shape
/// onto it so offsets follow the face's rotation and scale. Samples use the
/// nearest pixel; pixels outside the image read as 0.
pub fn sample_features<I: ImageAccess>(
    image: &I,
    face_box: &BoundingBox,
    shape: &Shape,
    tform: &SimilarityTransform2D,
    pool: &[FeaturePoint],
    values: &mut Vec<f32>,
) {
    values.clear();
    values.extend(pool.iter().map(|feature| {
        let normalized = shape[feature.anchor as usize] + tform.apply(feature.offset);
        let p = face_box.denormalize_point(normalized);
        image.get_pixel(p.x.round() as i32, p.y.round() as i32) as f32
    }));
}
