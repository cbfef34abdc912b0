//! # face-shape
//!
//! Classify a face as oval, square, diamond, oblong or round from the
//! distances between a few jawline landmarks.
//!
//! ## Pipeline
//!
//! 1. A [`LandmarkProvider`] finds the first face: its bounding box and the
//!    17-point jawline ([`ChinContour`]). [`DlibProvider`] does this with
//!    rustface detection and a pure Rust port of dlib's regression-tree shape
//!    predictor; [`RecordedLandmarks`] replays landmarks from JSON.
//! 2. [`Guidelines::extract`] places four segments on the face:
//!    - forehead: temple x positions (jawline 2 and 14) at the top of the face box
//!    - face length: from the top of the face box straight down to the chin (8)
//!    - ear: jawline 2 to 14
//!    - jaw: jawline 4 to 12
//! 3. [`classify`] turns their lengths into a primary trait (oval, square,
//!    diamond) and a secondary trait (oblong, round), each optional.
//!
//! [`analyze`] runs steps 2 and 3 and reports every stage to a [`Reporter`].
//!
//! ## Quick Start
//!
//! ```rust
//! use face_shape::{
//!     analyze, BoundingBox, ChinContour, ClassifierConfig, FaceLandmarks, FaceShape,
//!     NoopReporter, Point,
//! };
//!
//! // Jawline from any landmark source (17 points, iBUG order).
//! let mut jaw = vec![Point::zero(); 17];
//! jaw[2] = Point::new(0.0, 80.0);
//! jaw[14] = Point::new(100.0, 80.0);
//! jaw[4] = Point::new(20.0, 130.0);
//! jaw[12] = Point::new(80.0, 130.0);
//! jaw[8] = Point::new(50.0, 170.0);
//!
//! let landmarks = FaceLandmarks::new(
//!     BoundingBox::new(0.0, 10.0, 100.0, 160.0),
//!     ChinContour::new(&jaw).unwrap(),
//! );
//!
//! let analysis = analyze(&landmarks, &ClassifierConfig::default(), &mut NoopReporter).unwrap();
//! assert_eq!(analysis.classification.labels(), vec![FaceShape::Oval, FaceShape::Oblong]);
//! ```
//!
//! ## From an image
//!
//! ```ignore
//! use face_shape::{analyze, AnalyzerConfig, DlibProvider, LandmarkProvider, TracingReporter};
//!
//! let config = AnalyzerConfig::default();
//! let mut provider = DlibProvider::open(
//!     "seeta_fd_frontal_v1.0.bin",
//!     "shape_predictor_68_face_landmarks.dat.bz2",
//!     &config.detector,
//! )?;
//! let image = image::open("face.jpg")?;
//! let landmarks = provider.locate(&image)?;
//! let analysis = analyze(&landmarks, &config.classifier, &mut TracingReporter)?;
//! ```

mod analysis;
mod classify;
mod config;
mod contour;
pub mod dlib;
mod error;
mod features;
mod guideline;
mod model;
mod overlay;
mod provider;
mod tree;
mod types;

pub use analysis::{analyze, Analysis, NoopReporter, Reporter, TracingReporter};
pub use classify::{
    classify, primary_shape, secondary_shape, width_to_length_ratio, Classification,
    ClassifierConfig, FaceShape, PrimaryShape, SecondaryShape,
};
pub use config::{AnalyzerConfig, DetectorConfig};
pub use contour::{ChinContour, FaceLandmarks, CHIN_POINTS};
pub use error::{Error, Result};
pub use features::{find_similarity_transform, FeaturePoint, ImageAccess, SimilarityTransform2D};
pub use guideline::{Guideline, GuidelineKind, GuidelineLengths, Guidelines};
pub use model::ShapePredictor;
pub use overlay::{draw_guidelines, render_overlay, OverlayStyle};
pub use provider::{DlibProvider, LandmarkProvider, RecordedLandmarks};
pub use tree::{CascadeStage, RegressionTree, Split};
pub use types::{distance, BoundingBox, Point, Shape};
