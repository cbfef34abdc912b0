//! Guideline extraction: the four measured facial dimensions.

use serde::{Deserialize, Serialize};

use crate::contour::{ChinContour, FaceLandmarks};
use crate::types::{distance, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuidelineKind {
    Forehead,
    FaceLength,
    Ear,
    Jaw,
}

impl GuidelineKind {
    pub const ALL: [GuidelineKind; 4] = [
        GuidelineKind::Forehead,
        GuidelineKind::FaceLength,
        GuidelineKind::Ear,
        GuidelineKind::Jaw,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            GuidelineKind::Forehead => "forehead",
            GuidelineKind::FaceLength => "face length",
            GuidelineKind::Ear => "ear",
            GuidelineKind::Jaw => "jaw",
        }
    }
}

impl std::fmt::Display for GuidelineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A named line segment between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Guideline {
    pub kind: GuidelineKind,
    pub start: Point,
    pub end: Point,
}

impl Guideline {
    pub fn new(kind: GuidelineKind, start: Point, end: Point) -> Self {
        Self { kind, start, end }
    }

    pub fn length(&self) -> f32 {
        distance(self.start, self.end)
    }
}

/// The four guidelines of one face.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Guidelines {
    pub forehead: Guideline,
    pub face_length: Guideline,
    pub ear: Guideline,
    pub jaw: Guideline,
}

impl Guidelines {
    /// Place the guidelines on a jawline.
    ///
    /// The forehead line spans the temple x positions at `forehead_y`; the
    /// face-length line drops vertically from `forehead_y` to the chin tip.
    /// Ear and jaw lines join raw landmarks.
    pub fn extract(chin: &ChinContour, forehead_y: f32) -> Self {
        let left_temple = chin.left_temple();
        let right_temple = chin.right_temple();
        let chin_tip = chin.chin_tip();

        Self {
            forehead: Guideline::new(
                GuidelineKind::Forehead,
                Point::new(left_temple.x, forehead_y),
                Point::new(right_temple.x, forehead_y),
            ),
            face_length: Guideline::new(
                GuidelineKind::FaceLength,
                Point::new(chin_tip.x, forehead_y),
                chin_tip,
            ),
            ear: Guideline::new(GuidelineKind::Ear, left_temple, right_temple),
            jaw: Guideline::new(GuidelineKind::Jaw, chin.left_jaw(), chin.right_jaw()),
        }
    }

    pub fn from_landmarks(landmarks: &FaceLandmarks) -> Self {
        Self::extract(&landmarks.chin, landmarks.forehead_y())
    }

    pub fn get(&self, kind: GuidelineKind) -> &Guideline {
        match kind {
            GuidelineKind::Forehead => &self.forehead,
            GuidelineKind::FaceLength => &self.face_length,
            GuidelineKind::Ear => &self.ear,
            GuidelineKind::Jaw => &self.jaw,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Guideline> {
        GuidelineKind::ALL.into_iter().map(move |kind| self.get(kind))
    }

    pub fn lengths(&self) -> GuidelineLengths {
        GuidelineLengths {
            forehead: self.forehead.length(),
            face_length: self.face_length.length(),
            ear: self.ear.length(),
            jaw: self.jaw.length(),
        }
    }
}

/// Measured lengths of the four guidelines, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuidelineLengths {
    pub forehead: f32,
    pub face_length: f32,
    pub ear: f32,
    pub jaw: f32,
}

impl GuidelineLengths {
    pub fn new(forehead: f32, face_length: f32, ear: f32, jaw: f32) -> Self {
        Self {
            forehead,
            face_length,
            ear,
            jaw,
        }
    }

    /// Widest of the three horizontal guidelines.
    pub fn face_width(&self) -> f32 {
        self.forehead.max(self.ear).max(self.jaw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Jawline where only the indices the guidelines read carry distinct values.
    fn contour() -> ChinContour {
        let mut points = vec![Point::new(-1.0, -1.0); 17];
        points[2] = Point::new(10.0, 100.0);
        points[14] = Point::new(130.0, 104.0);
        points[4] = Point::new(25.0, 160.0);
        points[12] = Point::new(115.0, 160.0);
        points[8] = Point::new(70.0, 220.0);
        ChinContour::new(&points).unwrap()
    }

    #[test]
    fn endpoints_follow_landmarks() {
        let g = Guidelines::extract(&contour(), 40.0);

        assert_eq!(g.forehead.start, Point::new(10.0, 40.0));
        assert_eq!(g.forehead.end, Point::new(130.0, 40.0));
        assert_eq!(g.face_length.start, Point::new(70.0, 40.0));
        assert_eq!(g.face_length.end, Point::new(70.0, 220.0));
        assert_eq!(g.ear.start, Point::new(10.0, 100.0));
        assert_eq!(g.ear.end, Point::new(130.0, 104.0));
        assert_eq!(g.jaw.start, Point::new(25.0, 160.0));
        assert_eq!(g.jaw.end, Point::new(115.0, 160.0));
    }

    #[test]
    fn lengths_of_extracted_guidelines() {
        let lengths = Guidelines::extract(&contour(), 40.0).lengths();

        assert_eq!(lengths.forehead, 120.0);
        assert_eq!(lengths.face_length, 180.0);
        assert!((lengths.ear - (120.0f32 * 120.0 + 16.0).sqrt()).abs() < 1e-4);
        assert_eq!(lengths.jaw, 90.0);
        assert_eq!(lengths.face_width(), lengths.ear);
    }

    #[test]
    fn iter_yields_all_kinds_in_order() {
        let g = Guidelines::extract(&contour(), 40.0);
        let kinds: Vec<_> = g.iter().map(|line| line.kind).collect();
        assert_eq!(kinds, GuidelineKind::ALL);
    }
}
