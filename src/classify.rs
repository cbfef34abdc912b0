//! Face shape decision rules.
//!
//! Two independent traits are derived from the guideline lengths:
//!
//! - **Primary** (first matching rule wins):
//!   1. oval: `forehead <= ear` and `ear > jaw`
//!   2. square: forehead and ear both within `tolerance` of the jaw
//!   3. diamond: forehead and ear both at least `tolerance` wider than the jaw
//! - **Secondary**, from `face_width / face_length` where `face_width` is the
//!   widest of forehead, ear and jaw:
//!   - oblong: ratio `<= oblong_max_ratio`
//!   - round: ratio `>= round_min_ratio`
//!
//! Ratios strictly between the two thresholds get no secondary label. Either
//! trait may be absent.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::guideline::GuidelineLengths;

/// Thresholds for the decision rules. Lengths and tolerance share pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Largest length difference still treated as "equal".
    pub tolerance: f32,
    /// Width/length ratio at or below which a face is oblong.
    pub oblong_max_ratio: f32,
    /// Width/length ratio at or above which a face is round.
    pub round_min_ratio: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            tolerance: 40.0,
            oblong_max_ratio: 0.8,
            round_min_ratio: 0.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimaryShape {
    Oval,
    Square,
    Diamond,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecondaryShape {
    Oblong,
    Round,
}

/// Any face shape label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaceShape {
    Oval,
    Square,
    Diamond,
    Oblong,
    Round,
}

impl FaceShape {
    pub fn name(&self) -> &'static str {
        match self {
            FaceShape::Oval => "oval",
            FaceShape::Square => "square",
            FaceShape::Diamond => "diamond",
            FaceShape::Oblong => "oblong",
            FaceShape::Round => "round",
        }
    }
}

impl std::fmt::Display for FaceShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl From<PrimaryShape> for FaceShape {
    fn from(shape: PrimaryShape) -> Self {
        match shape {
            PrimaryShape::Oval => FaceShape::Oval,
            PrimaryShape::Square => FaceShape::Square,
            PrimaryShape::Diamond => FaceShape::Diamond,
        }
    }
}

impl From<SecondaryShape> for FaceShape {
    fn from(shape: SecondaryShape) -> Self {
        match shape {
            SecondaryShape::Oblong => FaceShape::Oblong,
            SecondaryShape::Round => FaceShape::Round,
        }
    }
}

/// Result of the decision rules: up to one label per trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Classification {
    pub primary: Option<PrimaryShape>,
    pub secondary: Option<SecondaryShape>,
}

impl Classification {
    /// Labels in primary, secondary order. Empty when no rule matched.
    pub fn labels(&self) -> Vec<FaceShape> {
        self.primary
            .map(FaceShape::from)
            .into_iter()
            .chain(self.secondary.map(FaceShape::from))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.secondary.is_none()
    }
}

/// Primary trait from forehead, ear and jaw widths.
pub fn primary_shape(forehead: f32, ear: f32, jaw: f32, tolerance: f32) -> Option<PrimaryShape> {
    if forehead <= ear && ear > jaw {
        Some(PrimaryShape::Oval)
    } else if (forehead - jaw).abs() <= tolerance && (ear - jaw).abs() <= tolerance {
        Some(PrimaryShape::Square)
    } else if forehead - jaw >= tolerance && ear - jaw >= tolerance {
        Some(PrimaryShape::Diamond)
    } else {
        None
    }
}

/// Secondary trait from the width/length ratio.
pub fn secondary_shape(
    face_width: f32,
    face_length: f32,
    config: &ClassifierConfig,
) -> Result<Option<SecondaryShape>> {
    let ratio = width_to_length_ratio(face_width, face_length)?;

    Ok(if ratio <= config.oblong_max_ratio {
        Some(SecondaryShape::Oblong)
    } else if ratio >= config.round_min_ratio {
        Some(SecondaryShape::Round)
    } else {
        None
    })
}

/// `face_width / face_length`, rejecting zero or non-finite lengths.
pub fn width_to_length_ratio(face_width: f32, face_length: f32) -> Result<f32> {
    if !(face_length.is_finite() && face_length > 0.0) {
        return Err(Error::DegenerateGeometry(format!(
            "face length must be positive, got {face_length}"
        )));
    }

    let ratio = face_width / face_length;
    if !ratio.is_finite() {
        return Err(Error::DegenerateGeometry(format!(
            "width/length ratio is not finite (width {face_width}, length {face_length})"
        )));
    }
    Ok(ratio)
}

/// Apply both rule sets to the measured lengths.
pub fn classify(lengths: &GuidelineLengths, config: &ClassifierConfig) -> Result<Classification> {
    let primary = primary_shape(lengths.forehead, lengths.ear, lengths.jaw, config.tolerance);
    let secondary = secondary_shape(lengths.face_width(), lengths.face_length, config)?;

    Ok(Classification { primary, secondary })
}
