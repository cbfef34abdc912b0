use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Model cache error: {0}")]
    Deserialization(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Face detector error: {0}")]
    Detector(String),

    #[error("No face detected in image")]
    NoFaceDetected,

    #[error("Malformed landmark input: expected at least {expected} chin points, got {actual}")]
    MalformedLandmarks { expected: usize, actual: usize },

    #[error("Degenerate face geometry: {0}")]
    DegenerateGeometry(String),
}

pub type Result<T> = std::result::Result<T, Error>;
