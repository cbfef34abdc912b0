use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dlib::load_dlib_model;
use crate::error::{Error, Result};
use crate::features::{find_similarity_transform, sample_features, FeaturePoint, ImageAccess};
use crate::tree::{CascadeStage, RegressionTree, Split};
use crate::types::{BoundingBox, Shape};

/// Ensemble-of-regression-trees facial landmark predictor
/// (Kazemi & Sullivan, "One Millisecond Face Alignment", 2014).
///
/// Starting from the mean shape placed in the face box, each cascade stage
/// samples its pixel features around the current estimate and adds the
/// leaves its forest selects.
#[derive(Debug, Clone, Serialize)]
pub struct ShapePredictor {
    /// Mean shape in face-box-normalized coordinates.
    mean_shape: Shape,
    stages: Vec<CascadeStage>,
}

impl ShapePredictor {
    pub fn new(mean_shape: Shape, stages: Vec<CascadeStage>) -> Result<Self> {
        let n = mean_shape.num_landmarks();
        if n == 0 {
            return Err(Error::InvalidModel("mean shape has no landmarks".into()));
        }

        for (i, stage) in stages.iter().enumerate() {
            if let Some(feature) = stage.pool.iter().find(|f| f.anchor as usize >= n) {
                return Err(Error::InvalidModel(format!(
                    "stage {} anchors a feature on landmark {} of {}",
                    i, feature.anchor, n
                )));
            }

            let mut leaves = stage.forest.iter().flat_map(|tree| tree.leaves());
            if let Some(leaf) = leaves.find(|leaf| leaf.num_landmarks() != n) {
                return Err(Error::InvalidModel(format!(
                    "stage {} has a leaf with {} landmarks, expected {}",
                    i,
                    leaf.num_landmarks(),
                    n
                )));
            }
        }

        Ok(Self { mean_shape, stages })
    }

    /// Load either a dlib `.dat`/`.dat.bz2` model or a `.bin` cache written by
    /// [`ShapePredictor::save`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let model = if path.extension().is_some_and(|ext| ext == "bin") {
            Self::load(path)?
        } else {
            load_dlib_model(path)?
        };

        info!(
            path = %path.display(),
            landmarks = model.num_landmarks(),
            stages = model.num_cascade_stages(),
            "landmark model loaded"
        );
        Ok(model)
    }

    /// Read a bincode model cache.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let cached: CachedModel = bincode::deserialize_from(reader)?;
        Self::try_from(cached)
    }

    /// Write the model as a bincode cache, much faster to load than dlib's format.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    pub fn num_landmarks(&self) -> usize {
        self.mean_shape.num_landmarks()
    }

    pub fn num_cascade_stages(&self) -> usize {
        self.stages.len()
    }

    /// Predict landmarks, in image coordinates, for the face inside `face_box`.
    pub fn predict<I: ImageAccess>(&self, image: &I, face_box: &BoundingBox) -> Shape {
        let mut current = self.mean_shape.clone();
        let mut values = Vec::new();

        for stage in &self.stages {
            let tform = find_similarity_transform(&self.mean_shape, &current);
            sample_features(image, face_box, &current, &tform, &stage.pool, &mut values);
            stage.refine(&values, &mut current);
        }

        Shape::new(
            current
                .points
                .iter()
                .map(|p| face_box.denormalize_point(*p))
                .collect(),
        )
    }
}

// Cache layout, field for field the same as the serialized `ShapePredictor`.
// Loading goes through these so the constructors validate the model again.
#[derive(Deserialize)]
struct CachedModel {
    mean_shape: Shape,
    stages: Vec<CachedStage>,
}

#[derive(Deserialize)]
struct CachedStage {
    pool: Vec<FeaturePoint>,
    forest: Vec<CachedTree>,
}

#[derive(Deserialize)]
struct CachedTree {
    splits: Vec<Split>,
    leaves: Vec<Shape>,
}

impl TryFrom<CachedModel> for ShapePredictor {
    type Error = Error;

    fn try_from(cached: CachedModel) -> Result<Self> {
        let stages = cached
            .stages
            .into_iter()
            .map(|stage| {
                let forest = stage
                    .forest
                    .into_iter()
                    .map(|tree| RegressionTree::new(tree.splits, tree.leaves))
                    .collect::<Result<Vec<_>>>()?;
                CascadeStage::new(stage.pool, forest)
            })
            .collect::<Result<Vec<_>>>()?;
        ShapePredictor::new(cached.mean_shape, stages)
    }
}
