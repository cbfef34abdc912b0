use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rustface::Detector;
use serde::{Deserialize, Serialize};

use crate::classify::ClassifierConfig;
use crate::error::Result;

/// Settings for the rustface (SeetaFace) face detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Smallest face edge, in pixels, the detector looks for.
    pub min_face_size: u32,
    pub score_thresh: f64,
    pub pyramid_scale_factor: f32,
    /// Sliding window step, same in both directions.
    pub slide_window_step: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_face_size: 20,
            score_thresh: 2.0,
            pyramid_scale_factor: 0.8,
            slide_window_step: 4,
        }
    }
}

impl DetectorConfig {
    pub fn apply(&self, detector: &mut dyn Detector) {
        detector.set_min_face_size(self.min_face_size);
        detector.set_score_thresh(self.score_thresh);
        detector.set_pyramid_scale_factor(self.pyramid_scale_factor);
        detector.set_slide_window_step(self.slide_window_step, self.slide_window_step);
    }
}

/// Everything tunable in a run. Missing JSON fields take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub classifier: ClassifierConfig,
    pub detector: DetectorConfig,
}

impl AnalyzerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}
