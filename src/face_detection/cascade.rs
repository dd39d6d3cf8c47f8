use std::fs;
use std::io::Cursor;

use image::{imageops, RgbImage};
use rustface::{FaceInfo, ImageData, Model};
use tracing::debug;

use crate::annotations::{FaceBox, FaceDetection};
use crate::config::CascadeConfig;
use crate::error::DetectError;
use crate::face_detection::{DetectionOutcome, WorkingFrame};

/// Classical cascade face detector (SeetaFace engine via `rustface`).
///
/// Detection runs over a full resolution grayscale conversion of the input
/// frame, so reported coordinates are in the input frame's pixel space. When
/// the cascade finds several faces the first one in its own scan order is
/// kept, with no re-ranking.
pub struct CascadeDetector {
    model: Model,
    config: CascadeConfig,
}

impl std::fmt::Debug for CascadeDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // `rustface::Model` does not implement `Debug`.
        f.debug_struct("CascadeDetector")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CascadeDetector {
    /// Loads the cascade model binary from the configured path.
    pub fn new(config: &CascadeConfig) -> Result<Self, DetectError> {
        if !config.model.exists() {
            return Err(DetectError::CascadeModelMissing(config.model.clone()));
        }
        let bytes = fs::read(&config.model)
            .map_err(|error| DetectError::CascadeModel(error.to_string()))?;
        let model = rustface::read_model(Cursor::new(bytes))
            .map_err(|error| DetectError::CascadeModel(error.to_string()))?;
        Ok(CascadeDetector {
            model,
            config: config.clone(),
        })
    }

    pub fn detect(&self, frame: &RgbImage) -> Result<DetectionOutcome, DetectError> {
        let gray = imageops::grayscale(frame);
        let (width, height) = gray.dimensions();

        // The detector mutates itself while scanning, so each pass builds a
        // fresh one from the shared model.
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(self.config.min_face_size);
        detector.set_score_thresh(self.config.score_threshold);
        detector.set_pyramid_scale_factor(self.config.pyramid_scale_factor);
        detector.set_slide_window_step(
            self.config.slide_window_step,
            self.config.slide_window_step,
        );

        let faces = detector.detect(&ImageData::new(gray.as_raw(), width, height));
        debug!(candidates = faces.len(), "cascade detection pass");

        let face = faces.first().and_then(|face| clamp_hit(face, width, height));
        Ok(DetectionOutcome {
            frame: WorkingFrame::Gray(gray),
            face,
        })
    }
}

fn clamp_hit(face: &FaceInfo, width: u32, height: u32) -> Option<FaceDetection> {
    let bbox = face.bbox();
    let clamped = FaceBox::from_pixels(
        bbox.x() as i64,
        bbox.y() as i64,
        bbox.width() as i64,
        bbox.height() as i64,
        width,
        height,
    )?;
    Some(FaceDetection::new(clamped, face.score() as f32))
}
