//! Reader for dlib's serialized `shape_predictor` (`.dat`, optionally `.bz2`).
//!
//! The 68-point iBUG model, whose first 17 landmarks are the jawline, comes
//! from the dlib-models repository:
//!
//! ```bash
//! git clone --depth 1 https://github.com/davisking/dlib-models.git
//! ```
//!
//! Layout, in order: format version (1), mean shape as a column matrix, the
//! forests (`vec<vec<tree>>`), the per-stage anchor landmark indices and the
//! per-stage feature offsets.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use bzip2::read::BzDecoder;
use tracing::debug;

use crate::error::{Error, Result};
use crate::features::FeaturePoint;
use crate::model::ShapePredictor;
use crate::tree::{CascadeStage, RegressionTree, Split};
use crate::types::{Point, Shape};

/// Decoder for dlib's primitive encodings.
///
/// Integers: one control byte (bit 7 = negative, low nibble = byte count)
/// followed by the magnitude in little-endian. Floats: an integer mantissa
/// and an integer exponent, `value = mantissa * 2^exponent`.
struct Decoder<R> {
    inner: R,
}

impl<R: Read> Decoder<R> {
    fn new(inner: R) -> Self {
        Self { inner }
    }

    fn byte(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.inner.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn int(&mut self) -> Result<i64> {
        let control = self.byte()?;
        let len = (control & 0x0F) as usize;
        if len > 8 {
            return Err(Error::InvalidModel(format!(
                "integer of {len} bytes is not supported"
            )));
        }

        let mut magnitude = 0u64;
        for shift in 0..len {
            magnitude |= (self.byte()? as u64) << (8 * shift);
        }

        let value = i64::try_from(magnitude)
            .map_err(|_| Error::InvalidModel(format!("integer magnitude {magnitude} out of range")))?;
        Ok(if control & 0x80 != 0 { -value } else { value })
    }

    /// An integer stored negated, as dlib does for matrix dimensions.
    fn negated_int(&mut self) -> Result<i64> {
        let value = self.int()?;
        value
            .checked_neg()
            .ok_or_else(|| Error::InvalidModel(format!("dimension {value} out of range")))
    }

    fn size(&mut self) -> Result<usize> {
        let value = self.int()?;
        usize::try_from(value)
            .map_err(|_| Error::InvalidModel(format!("negative size {value}")))
    }

    fn float(&mut self) -> Result<f32> {
        let mantissa = self.int()?;
        let exponent = self.int()?;
        if mantissa == 0 {
            return Ok(0.0);
        }
        Ok((mantissa as f64 * 2f64.powi(exponent as i32)) as f32)
    }

    /// A column vector of `rows` floats, stored with negated dimensions.
    fn column(&mut self) -> Result<Vec<f32>> {
        let rows = self.negated_int()?;
        let cols = self.negated_int()?;
        if rows < 0 || cols != 1 {
            return Err(Error::InvalidModel(format!(
                "expected a column vector, got {rows}x{cols}"
            )));
        }
        (0..rows).map(|_| self.float()).collect()
    }

    /// A column vector of interleaved x/y values as a shape.
    fn shape(&mut self) -> Result<Shape> {
        let values = self.column()?;
        if values.len() % 2 != 0 {
            return Err(Error::InvalidModel(format!(
                "shape vector has odd length {}",
                values.len()
            )));
        }
        Ok(Shape::from_interleaved(&values))
    }

    fn tree(&mut self, num_landmarks: usize) -> Result<RegressionTree> {
        let num_splits = self.size()?;
        let splits = (0..num_splits)
            .map(|_| {
                Ok(Split {
                    idx1: self.index()?,
                    idx2: self.index()?,
                    threshold: self.float()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let num_leaves = self.size()?;
        let leaves = (0..num_leaves)
            .map(|_| {
                let leaf = self.shape()?;
                if leaf.num_landmarks() != num_landmarks {
                    return Err(Error::InvalidModel(format!(
                        "leaf has {} landmarks, expected {}",
                        leaf.num_landmarks(),
                        num_landmarks
                    )));
                }
                Ok(leaf)
            })
            .collect::<Result<Vec<_>>>()?;

        RegressionTree::new(splits, leaves)
    }

    fn index(&mut self) -> Result<u32> {
        let value = self.size()?;
        u32::try_from(value).map_err(|_| Error::InvalidModel(format!("index {value} too large")))
    }
}

/// Load a dlib shape predictor. Files ending in `.bz2` are decompressed.
pub fn load_dlib_model<P: AsRef<Path>>(path: P) -> Result<ShapePredictor> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);

    if path.extension().is_some_and(|ext| ext == "bz2") {
        load_dlib_model_from_reader(BzDecoder::new(reader))
    } else {
        load_dlib_model_from_reader(reader)
    }
}

/// Parse an uncompressed dlib shape predictor stream.
pub fn load_dlib_model_from_reader<R: Read>(reader: R) -> Result<ShapePredictor> {
    let mut d = Decoder::new(reader);

    let version = d.int()?;
    if version != 1 {
        return Err(Error::InvalidModel(format!(
            "unsupported shape_predictor version {version}"
        )));
    }

    let mean_shape = d.shape()?;
    let num_landmarks = mean_shape.num_landmarks();

    let num_stages = d.size()?;
    let mut forests = Vec::new();
    for _ in 0..num_stages {
        let num_trees = d.size()?;
        let forest = (0..num_trees)
            .map(|_| d.tree(num_landmarks))
            .collect::<Result<Vec<_>>>()?;
        forests.push(forest);
    }

    let anchors = (0..d.size()?)
        .map(|_| {
            (0..d.size()?)
                .map(|_| {
                    let anchor = d.size()?;
                    u16::try_from(anchor).map_err(|_| {
                        Error::InvalidModel(format!("anchor index {anchor} too large"))
                    })
                })
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    let offsets = (0..d.size()?)
        .map(|_| {
            (0..d.size()?)
                .map(|_| Ok(Point::new(d.float()?, d.float()?)))
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    if anchors.len() != num_stages || offsets.len() != num_stages {
        return Err(Error::InvalidModel(format!(
            "{} stages but {} anchor sets and {} offset sets",
            num_stages,
            anchors.len(),
            offsets.len()
        )));
    }

    let stages = forests
        .into_iter()
        .zip(anchors.into_iter().zip(offsets))
        .enumerate()
        .map(|(i, (forest, (anchors, offsets)))| {
            if anchors.len() != offsets.len() {
                return Err(Error::InvalidModel(format!(
                    "stage {}: {} anchors but {} offsets",
                    i,
                    anchors.len(),
                    offsets.len()
                )));
            }
            let pool = anchors
                .into_iter()
                .zip(offsets)
                .map(|(anchor, offset)| FeaturePoint { anchor, offset })
                .collect();
            CascadeStage::new(pool, forest)
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(
        landmarks = num_landmarks,
        stages = stages.len(),
        "parsed dlib shape predictor"
    );
    ShapePredictor::new(mean_shape, stages)
}
