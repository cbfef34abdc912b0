//! Landmarks in, face shape out.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::{classify, width_to_length_ratio, Classification, ClassifierConfig};
use crate::contour::FaceLandmarks;
use crate::error::Result;
use crate::guideline::{GuidelineLengths, Guidelines};

/// Receives each intermediate result of [`analyze`], in pipeline order.
///
/// Presentation (debug output, UI updates) lives behind this trait so the
/// geometry and decision rules stay free of side effects.
pub trait Reporter {
    fn guidelines(&mut self, _guidelines: &Guidelines) {}

    fn lengths(&mut self, _lengths: &GuidelineLengths) {}

    fn classification(&mut self, _classification: &Classification) {}
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl Reporter for NoopReporter {}

/// Logs every stage at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn guidelines(&mut self, guidelines: &Guidelines) {
        for line in guidelines.iter() {
            debug!(
                guideline = %line.kind,
                start = ?(line.start.x, line.start.y),
                end = ?(line.end.x, line.end.y),
                "guideline placed"
            );
        }
    }

    fn lengths(&mut self, lengths: &GuidelineLengths) {
        debug!(
            forehead = lengths.forehead,
            face_length = lengths.face_length,
            ear = lengths.ear,
            jaw = lengths.jaw,
            face_width = lengths.face_width(),
            "guideline lengths"
        );
    }

    fn classification(&mut self, classification: &Classification) {
        debug!(
            primary = ?classification.primary,
            secondary = ?classification.secondary,
            "face classified"
        );
    }
}

/// Measurements and labels for one face.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub guidelines: Guidelines,
    pub lengths: GuidelineLengths,
    /// Widest of forehead, ear and jaw.
    pub face_width: f32,
    /// `face_width / face_length`.
    pub width_to_length: f32,
    pub classification: Classification,
}

/// Extract guidelines, measure them and classify the face.
pub fn analyze<R: Reporter + ?Sized>(
    landmarks: &FaceLandmarks,
    config: &ClassifierConfig,
    reporter: &mut R,
) -> Result<Analysis> {
    let guidelines = Guidelines::from_landmarks(landmarks);
    reporter.guidelines(&guidelines);

    let lengths = guidelines.lengths();
    reporter.lengths(&lengths);

    let classification = classify(&lengths, config)?;
    reporter.classification(&classification);

    let face_width = lengths.face_width();
    Ok(Analysis {
        guidelines,
        lengths,
        face_width,
        width_to_length: width_to_length_ratio(face_width, lengths.face_length)?,
        classification,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{PrimaryShape, SecondaryShape};
    use crate::contour::ChinContour;
    use crate::error::Error;
    use crate::types::{BoundingBox, Point};

    #[derive(Default)]
    struct Recorder {
        events: Vec<&'static str>,
    }

    impl Reporter for Recorder {
        fn guidelines(&mut self, _: &Guidelines) {
            self.events.push("guidelines");
        }

        fn lengths(&mut self, _: &GuidelineLengths) {
            self.events.push("lengths");
        }

        fn classification(&mut self, _: &Classification) {
            self.events.push("classification");
        }
    }

    /// Forehead 100, ear 100, jaw 60, face length 160.
    fn landmarks(forehead_y: f32, chin_y: f32) -> FaceLandmarks {
        let mut points = vec![Point::zero(); 17];
        points[2] = Point::new(0.0, 80.0);
        points[14] = Point::new(100.0, 80.0);
        points[4] = Point::new(20.0, 130.0);
        points[12] = Point::new(80.0, 130.0);
        points[8] = Point::new(50.0, chin_y);
        FaceLandmarks::new(
            BoundingBox::new(0.0, forehead_y, 100.0, 160.0),
            ChinContour::new(&points).unwrap(),
        )
    }

    #[test]
    fn reports_stages_in_order() {
        let mut recorder = Recorder::default();
        analyze(&landmarks(10.0, 170.0), &ClassifierConfig::default(), &mut recorder).unwrap();
        assert_eq!(recorder.events, ["guidelines", "lengths", "classification"]);
    }

    #[test]
    fn analysis_of_long_oval_face() {
        let analysis =
            analyze(&landmarks(10.0, 170.0), &ClassifierConfig::default(), &mut NoopReporter)
                .unwrap();

        assert_eq!(analysis.lengths.face_length, 160.0);
        assert_eq!(analysis.face_width, 100.0);
        assert!((analysis.width_to_length - 0.625).abs() < 1e-6);
        assert_eq!(analysis.classification.primary, Some(PrimaryShape::Oval));
        assert_eq!(analysis.classification.secondary, Some(SecondaryShape::Oblong));
    }

    #[test]
    fn chin_on_forehead_line_is_degenerate() {
        let mut recorder = Recorder::default();
        let err = analyze(&landmarks(50.0, 50.0), &ClassifierConfig::default(), &mut recorder)
            .unwrap_err();

        assert!(matches!(err, Error::DegenerateGeometry(_)));
        assert_eq!(recorder.events, ["guidelines", "lengths"]);
    }
}
