//! Sources of face landmarks.

use std::path::Path;

use image::{DynamicImage, GrayImage};
use rustface::{Detector, ImageData};
use tracing::{debug, info};

use crate::config::DetectorConfig;
use crate::contour::{ChinContour, FaceLandmarks};
use crate::error::{Error, Result};
use crate::model::ShapePredictor;
use crate::types::BoundingBox;

/// Supplies the face box and jawline for the first face in an image.
pub trait LandmarkProvider {
    /// Bounding box of the first detected face.
    fn face_bounding_box(&mut self, image: &DynamicImage) -> Result<BoundingBox>;

    /// Jawline of the first detected face.
    fn chin_contour(&mut self, image: &DynamicImage) -> Result<ChinContour>;

    /// Both at once. Providers that can share work between the two should
    /// override this.
    fn locate(&mut self, image: &DynamicImage) -> Result<FaceLandmarks> {
        let face_box = self.face_bounding_box(image)?;
        let chin = self.chin_contour(image)?;
        Ok(FaceLandmarks::new(face_box, chin))
    }
}

/// rustface detection followed by the regression-tree shape predictor.
pub struct DlibProvider {
    detector: Box<dyn Detector>,
    predictor: ShapePredictor,
}

impl DlibProvider {
    pub fn new(detector: Box<dyn Detector>, predictor: ShapePredictor) -> Self {
        Self {
            detector,
            predictor,
        }
    }

    /// Load the SeetaFace detector model and a landmark model
    /// (see [`ShapePredictor::open`]).
    pub fn open<P, Q>(detector_path: P, landmarks_path: Q, config: &DetectorConfig) -> Result<Self>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let detector_path = detector_path.as_ref();
        let detector_str = detector_path
            .to_str()
            .ok_or_else(|| Error::Detector(format!("invalid detector path {detector_path:?}")))?;
        let mut detector = rustface::create_detector(detector_str).map_err(|e| {
            Error::Detector(format!(
                "failed to load {}: {}",
                detector_path.display(),
                e
            ))
        })?;
        config.apply(detector.as_mut());
        info!(path = %detector_path.display(), "face detector loaded");

        let predictor = ShapePredictor::open(landmarks_path)?;
        Ok(Self::new(detector, predictor))
    }

    pub fn predictor(&self) -> &ShapePredictor {
        &self.predictor
    }

    fn first_face(&mut self, gray: &GrayImage) -> Result<BoundingBox> {
        let (width, height) = gray.dimensions();
        let faces = self
            .detector
            .detect(&ImageData::new(gray.as_raw(), width, height));
        debug!(count = faces.len(), "faces detected");

        let face = faces.first().ok_or(Error::NoFaceDetected)?;
        let bbox = face.bbox();
        Ok(BoundingBox::new(
            bbox.x() as f32,
            bbox.y() as f32,
            bbox.width() as f32,
            bbox.height() as f32,
        ))
    }
}

impl LandmarkProvider for DlibProvider {
    fn face_bounding_box(&mut self, image: &DynamicImage) -> Result<BoundingBox> {
        self.first_face(&image.to_luma8())
    }

    fn chin_contour(&mut self, image: &DynamicImage) -> Result<ChinContour> {
        Ok(self.locate(image)?.chin)
    }

    fn locate(&mut self, image: &DynamicImage) -> Result<FaceLandmarks> {
        let gray = image.to_luma8();
        let face_box = self.first_face(&gray)?;
        let shape = self.predictor.predict(&gray, &face_box);
        let chin = ChinContour::from_shape(&shape)?;
        Ok(FaceLandmarks::new(face_box, chin))
    }
}

/// Landmarks produced earlier, or by an external tool, replayed from JSON.
/// The image is ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedLandmarks {
    landmarks: FaceLandmarks,
}

impl RecordedLandmarks {
    pub fn new(landmarks: FaceLandmarks) -> Self {
        Self { landmarks }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(FaceLandmarks::load(path)?))
    }
}

impl LandmarkProvider for RecordedLandmarks {
    fn face_bounding_box(&mut self, _image: &DynamicImage) -> Result<BoundingBox> {
        Ok(self.landmarks.face_box)
    }

    fn chin_contour(&mut self, _image: &DynamicImage) -> Result<ChinContour> {
        Ok(self.landmarks.chin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    #[test]
    fn recorded_landmarks_are_replayed() {
        let points: Vec<_> = (0..17).map(|i| Point::new(i as f32, 2.0 * i as f32)).collect();
        let landmarks = FaceLandmarks::new(
            BoundingBox::new(5.0, 6.0, 70.0, 80.0),
            ChinContour::new(&points).unwrap(),
        );
        let mut provider = RecordedLandmarks::new(landmarks);
        let image = DynamicImage::new_luma8(1, 1);

        assert_eq!(provider.face_bounding_box(&image).unwrap().y, 6.0);
        assert_eq!(provider.chin_contour(&image).unwrap()[8], Point::new(8.0, 16.0));
        assert_eq!(provider.locate(&image).unwrap(), landmarks);
    }
}
