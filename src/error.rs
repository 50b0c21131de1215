//! Error types for scene construction and rendering

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TracerError>;

/// Errors that can occur while building a scene or rendering it
#[derive(Error, Debug)]
pub enum TracerError {
    /// A direction or normal of zero length was normalized
    #[error("Cannot normalize a zero-length vector")]
    ZeroVector,

    /// The camera's up and forward vectors are not orthogonal
    #[error("Camera up and forward vectors have to be orthogonal")]
    NotOrthogonal,

    /// Illegal combination of polygon vertices
    #[error("Degenerate polygon: {0}")]
    DegeneratePolygon(String),

    /// Rendering was requested before a required camera parameter was set
    #[error("Renderer resource not set: {0}")]
    MissingResource(&'static str),

    /// The scene description is structurally valid but semantically wrong
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}
