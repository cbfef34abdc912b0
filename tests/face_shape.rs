//! End-to-end classification through the public API.

use face_shape::{
    analyze, classify, BoundingBox, ChinContour, ClassifierConfig, Error, FaceLandmarks,
    FaceShape, GuidelineLengths, LandmarkProvider, NoopReporter, Point, PrimaryShape,
    RecordedLandmarks, SecondaryShape,
};
use image::DynamicImage;

/// Landmarks with the face box top at y = 0 and only the guideline points set.
fn landmarks(temples: (Point, Point), jaw: (Point, Point), chin: Point) -> FaceLandmarks {
    let mut points = vec![Point::zero(); 17];
    points[2] = temples.0;
    points[14] = temples.1;
    points[4] = jaw.0;
    points[12] = jaw.1;
    points[8] = chin;
    FaceLandmarks::new(
        BoundingBox::new(0.0, 0.0, 200.0, 200.0),
        ChinContour::new(&points).unwrap(),
    )
}

fn labels(landmarks: &FaceLandmarks) -> Vec<FaceShape> {
    analyze(landmarks, &ClassifierConfig::default(), &mut NoopReporter)
        .unwrap()
        .classification
        .labels()
}

#[test]
fn long_face_with_narrow_jaw_is_oval_and_oblong() {
    let face = landmarks(
        (Point::new(40.0, 90.0), Point::new(160.0, 90.0)),
        (Point::new(70.0, 160.0), Point::new(130.0, 160.0)),
        Point::new(100.0, 200.0),
    );
    // forehead 120, ear 120, jaw 60, length 200 -> ratio 0.6
    assert_eq!(labels(&face), vec![FaceShape::Oval, FaceShape::Oblong]);
}

#[test]
fn wide_jaw_short_face_is_square_and_round() {
    let face = landmarks(
        (Point::new(20.0, 100.0), Point::new(120.0, 100.0)),
        (Point::new(10.0, 150.0), Point::new(130.0, 150.0)),
        Point::new(70.0, 120.0),
    );
    // forehead 100, ear 100, jaw 120, length 120 -> ratio 1.0
    assert_eq!(labels(&face), vec![FaceShape::Square, FaceShape::Round]);
}

#[test]
fn dead_zone_face_gets_only_primary() {
    let face = landmarks(
        (Point::new(50.0, 100.0), Point::new(135.0, 100.0)),
        (Point::new(70.0, 150.0), Point::new(120.0, 150.0)),
        Point::new(90.0, 100.0),
    );
    // forehead 85, ear 85, jaw 50, length 100 -> ratio 0.85
    let analysis = analyze(&face, &ClassifierConfig::default(), &mut NoopReporter).unwrap();
    assert_eq!(analysis.classification.primary, Some(PrimaryShape::Oval));
    assert_eq!(analysis.classification.secondary, None);
    assert!((analysis.width_to_length - 0.85).abs() < 1e-6);
}

#[test]
fn boundary_scenarios_from_lengths() {
    let config = ClassifierConfig::default();
    let cases = [
        // forehead, length, ear, jaw
        ((100.0, 200.0, 100.0, 50.0), Some(PrimaryShape::Oval)),
        ((100.0, 200.0, 95.0, 90.0), Some(PrimaryShape::Square)),
        ((150.0, 200.0, 145.0, 100.0), Some(PrimaryShape::Diamond)),
    ];
    for ((forehead, length, ear, jaw), expected) in cases {
        let lengths = GuidelineLengths::new(forehead, length, ear, jaw);
        assert_eq!(classify(&lengths, &config).unwrap().primary, expected);
    }

    let secondary = |width: f32| {
        classify(&GuidelineLengths::new(width, 100.0, width, width), &config)
            .unwrap()
            .secondary
    };
    assert_eq!(secondary(80.0), Some(SecondaryShape::Oblong));
    assert_eq!(secondary(91.0), Some(SecondaryShape::Round));
    assert_eq!(secondary(85.0), None);
}

#[test]
fn chin_level_with_forehead_is_rejected() {
    let face = landmarks(
        (Point::new(40.0, 90.0), Point::new(160.0, 90.0)),
        (Point::new(70.0, 160.0), Point::new(130.0, 160.0)),
        Point::new(100.0, 0.0),
    );
    let err = analyze(&face, &ClassifierConfig::default(), &mut NoopReporter).unwrap_err();
    assert!(matches!(err, Error::DegenerateGeometry(_)));
}

#[test]
fn recorded_landmarks_file_drives_the_pipeline() {
    let json = r#"{
        "face_box": {"x": 30.0, "y": 10.0, "width": 140.0, "height": 190.0},
        "chin": [
            {"x": 30, "y": 60}, {"x": 32, "y": 80}, {"x": 40, "y": 100},
            {"x": 45, "y": 120}, {"x": 70, "y": 170}, {"x": 80, "y": 180},
            {"x": 90, "y": 190}, {"x": 95, "y": 195}, {"x": 100, "y": 210},
            {"x": 105, "y": 195}, {"x": 110, "y": 190}, {"x": 120, "y": 180},
            {"x": 130, "y": 170}, {"x": 155, "y": 120}, {"x": 160, "y": 100},
            {"x": 168, "y": 80}, {"x": 170, "y": 60}
        ]
    }"#;
    let path = std::env::temp_dir().join("face_shape_recorded_landmarks_it.json");
    std::fs::write(&path, json).unwrap();
    let mut provider = RecordedLandmarks::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let face = provider.locate(&DynamicImage::new_rgb8(200, 220)).unwrap();
    assert_eq!(face.forehead_y(), 10.0);

    // forehead 120 at y = 10, ear 120, jaw 60, length 200 -> oval, ratio 0.6
    assert_eq!(labels(&face), vec![FaceShape::Oval, FaceShape::Oblong]);
}

#[test]
fn short_recorded_contour_is_malformed() {
    let points = vec![Point::new(1.0, 1.0); 12];
    let err = ChinContour::new(&points).unwrap_err();
    assert!(matches!(
        err,
        Error::MalformedLandmarks {
            expected: 17,
            actual: 12
        }
    ));
}
