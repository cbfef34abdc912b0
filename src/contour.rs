//! Jawline landmarks and the per-face landmark record handed to the analysis.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{BoundingBox, Point, Shape};

/// Number of points on the iBUG jawline (landmarks 0-16).
pub const CHIN_POINTS: usize = 17;

/// Temple-side jawline point on the image-left side.
pub const LEFT_TEMPLE: usize = 2;
/// Jaw corner on the image-left side.
pub const LEFT_JAW: usize = 4;
/// Bottom of the chin.
pub const CHIN_TIP: usize = 8;
/// Jaw corner on the image-right side.
pub const RIGHT_JAW: usize = 12;
/// Temple-side jawline point on the image-right side.
pub const RIGHT_TEMPLE: usize = 14;

/// The 17 jawline landmarks, ordered from one side of the face to the other.
///
/// Only inputs with at least [`CHIN_POINTS`] points are accepted; extra points
/// (e.g. the rest of a 68-point shape) are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct ChinContour {
    points: [Point; CHIN_POINTS],
}

impl ChinContour {
    pub fn new(points: &[Point]) -> Result<Self> {
        if points.len() < CHIN_POINTS {
            return Err(Error::MalformedLandmarks {
                expected: CHIN_POINTS,
                actual: points.len(),
            });
        }

        let mut contour = [Point::zero(); CHIN_POINTS];
        contour.copy_from_slice(&points[..CHIN_POINTS]);
        Ok(Self { points: contour })
    }

    /// Take the jawline from a full predictor shape.
    pub fn from_shape(shape: &Shape) -> Result<Self> {
        Self::new(&shape.points)
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn left_temple(&self) -> Point {
        self.points[LEFT_TEMPLE]
    }

    pub fn right_temple(&self) -> Point {
        self.points[RIGHT_TEMPLE]
    }

    pub fn left_jaw(&self) -> Point {
        self.points[LEFT_JAW]
    }

    pub fn right_jaw(&self) -> Point {
        self.points[RIGHT_JAW]
    }

    pub fn chin_tip(&self) -> Point {
        self.points[CHIN_TIP]
    }
}

impl TryFrom<Vec<Point>> for ChinContour {
    type Error = Error;

    fn try_from(points: Vec<Point>) -> Result<Self> {
        Self::new(&points)
    }
}

impl From<ChinContour> for Vec<Point> {
    fn from(contour: ChinContour) -> Self {
        contour.points.to_vec()
    }
}

impl std::ops::Index<usize> for ChinContour {
    type Output = Point;

    fn index(&self, idx: usize) -> &Self::Output {
        &self.points[idx]
    }
}

/// Everything the face-shape analysis needs from a landmark provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceLandmarks {
    /// Detected face rectangle. Only its top edge is used.
    pub face_box: BoundingBox,
    pub chin: ChinContour,
}

impl FaceLandmarks {
    pub fn new(face_box: BoundingBox, chin: ChinContour) -> Self {
        Self { face_box, chin }
    }

    pub fn forehead_y(&self) -> f32 {
        self.face_box.top()
    }

    /// Read landmarks previously written with [`FaceLandmarks::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jawline(n: usize) -> Vec<Point> {
        (0..n).map(|i| Point::new(i as f32 * 10.0, i as f32)).collect()
    }

    #[test]
    fn rejects_short_contour() {
        let err = ChinContour::new(&jawline(15)).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedLandmarks {
                expected: 17,
                actual: 15
            }
        ));
    }

    #[test]
    fn keeps_first_17_of_full_shape() {
        let shape = Shape::new(jawline(68));
        let contour = ChinContour::from_shape(&shape).unwrap();

        assert_eq!(contour.points().len(), CHIN_POINTS);
        assert_eq!(contour[16], Point::new(160.0, 16.0));
        assert_eq!(contour.chin_tip(), Point::new(80.0, 8.0));
        assert_eq!(contour.left_temple(), Point::new(20.0, 2.0));
        assert_eq!(contour.right_jaw(), Point::new(120.0, 12.0));
    }

    #[test]
    fn json_rejects_short_chin() {
        let json = r#"{"face_box":{"x":0,"y":0,"width":10,"height":10},"chin":[{"x":1,"y":2}]}"#;
        assert!(serde_json::from_str::<FaceLandmarks>(json).is_err());
    }

    #[test]
    fn save_and_load_landmarks() {
        let landmarks = FaceLandmarks::new(
            BoundingBox::new(10.0, 20.0, 100.0, 120.0),
            ChinContour::new(&jawline(17)).unwrap(),
        );

        let path = std::env::temp_dir().join("face_shape_landmarks_test.json");
        landmarks.save(&path).unwrap();
        let loaded = FaceLandmarks::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, landmarks);
        assert_eq!(loaded.forehead_y(), 20.0);
    }
}
