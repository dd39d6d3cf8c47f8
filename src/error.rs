use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading or running the three attribute models.
///
/// Any of these is fatal for the inference engine: the engine either serves
/// all three predictions or none, so there is no degraded partial-model mode.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model artifact not found: {}", .0.display())]
    ArtifactMissing(PathBuf),

    #[error("inference session error: {0}")]
    Session(#[from] ort::Error),

    #[error("{model} model produced unusable output: {detail}")]
    Output { model: &'static str, detail: String },
}

/// Errors from the face detection stage.
///
/// A frame with no detectable face is not an error. It is reported as a
/// typed absence by the detector contract.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("cascade model artifact not found: {}", .0.display())]
    CascadeModelMissing(PathBuf),

    #[error("failed to load cascade model: {0}")]
    CascadeModel(String),

    #[error(transparent)]
    Neural(#[from] ModelError),
}

/// Errors from the overlay renderer's font resource.
///
/// Fatal for the renderer only. The still-image path never renders overlays
/// and must not be affected by a missing font.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("overlay font not found: {}", .0.display())]
    FontMissing(PathBuf),

    #[error("overlay font could not be parsed: {}", .0.display())]
    FontInvalid(PathBuf),
}

/// Errors from the live capture source.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capture device {index} unavailable: {reason}")]
    DeviceUnavailable { index: u32, reason: String },

    #[error("frame read failed: {0}")]
    ReadFailed(String),
}

/// Errors surfaced by the still-image analysis pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The supplied bytes do not decode to a raster image.
    #[error("invalid image: {0}")]
    InvalidImage(#[from] image::ImageError),

    #[error(transparent)]
    Detect(#[from] DetectError),

    #[error(transparent)]
    Model(#[from] ModelError),
}
