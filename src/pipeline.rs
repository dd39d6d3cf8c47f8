use std::sync::Arc;

use image::RgbImage;
use tracing::{debug, warn};

use crate::annotations::{AttributePrediction, FaceDetection};
use crate::config::Config;
use crate::error::PipelineError;
use crate::face_detection::FaceDetector;
use crate::image_utils::{decode_frame, face_input_tensor};
use crate::inference::AttributeEngine;
use crate::render::OverlayRenderer;
use crate::stream::FrameAnnotator;

/// The outcome of analyzing one frame.
///
/// A frame without a detectable face is a normal outcome, reported as
/// [`Analysis::NoFace`] rather than an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Analysis {
    Face {
        detection: FaceDetection,
        prediction: AttributePrediction,
    },
    NoFace,
}

/// The detect, normalize, infer path over one frame.
///
/// The detector is owned per pipeline; the attribute engine is the shared
/// process-wide instance.
#[derive(Debug)]
pub struct Pipeline {
    detector: FaceDetector,
    engine: Arc<AttributeEngine>,
}

impl Pipeline {
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        let detector = FaceDetector::from_config(config)?;
        let engine = AttributeEngine::shared(&config.models, &config.inference)?;
        Ok(Pipeline { detector, engine })
    }

    /// Analyzes encoded image bytes.
    ///
    /// Bytes that do not decode to an image are rejected here, before any
    /// model runs.
    pub fn analyze_bytes(&self, bytes: &[u8]) -> Result<Analysis, PipelineError> {
        let frame = decode_frame(bytes)?;
        self.analyze(&frame)
    }

    /// Analyzes one decoded frame.
    pub fn analyze(&self, frame: &RgbImage) -> Result<Analysis, PipelineError> {
        let outcome = self.detector.detect(frame)?;
        let Some(detection) = outcome.face else {
            return Ok(Analysis::NoFace);
        };
        let face = outcome.frame.crop_gray(&detection.bbox);
        let raw = self.engine.infer(&face_input_tensor(&face))?;
        let prediction = AttributePrediction::from_raw(&raw);
        debug!(
            gender = %prediction.gender,
            emotion = %prediction.emotion,
            age = %prediction.age_range,
            "face analyzed"
        );
        Ok(Analysis::Face {
            detection,
            prediction,
        })
    }

    /// Annotates one frame for the live stream.
    ///
    /// The canvas is the detector's working frame, so the output may be
    /// smaller than the input when the neural backend capped it. Frames
    /// without a face come back as the bare canvas.
    pub fn annotate(
        &self,
        frame: &RgbImage,
        renderer: &OverlayRenderer,
    ) -> Result<RgbImage, PipelineError> {
        let outcome = self.detector.detect(frame)?;
        let canvas = outcome.frame.canvas(frame);
        let Some(detection) = outcome.face else {
            return Ok(canvas);
        };
        let face = outcome.frame.crop_gray(&detection.bbox);
        let raw = self.engine.infer(&face_input_tensor(&face))?;
        let prediction = AttributePrediction::from_raw(&raw);
        Ok(renderer.render(&canvas, &prediction, &detection.bbox))
    }
}

/// The annotator the live stream runs: pipeline plus overlay renderer.
///
/// Per-frame pipeline errors degrade to an unannotated passthrough of the
/// input frame; only capture failures end a stream.
pub struct LiveAnnotator {
    pipeline: Pipeline,
    renderer: OverlayRenderer,
}

impl LiveAnnotator {
    pub fn new(pipeline: Pipeline, renderer: OverlayRenderer) -> Self {
        LiveAnnotator { pipeline, renderer }
    }
}

impl FrameAnnotator for LiveAnnotator {
    fn annotate(&self, frame: &RgbImage) -> RgbImage {
        match self.pipeline.annotate(frame, &self.renderer) {
            Ok(annotated) => annotated,
            Err(error) => {
                warn!(%error, "frame annotation failed, passing the frame through");
                frame.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DetectError;
    use image::{ImageFormat, Rgb};
    use std::io::Cursor;
    use std::path::PathBuf;

    #[test]
    fn undecodable_bytes_map_to_the_invalid_image_error() {
        let error: PipelineError = decode_frame(b"junk bytes").unwrap_err().into();
        assert!(matches!(error, PipelineError::InvalidImage(_)));
    }

    #[test]
    fn construction_fails_without_detector_artifacts() {
        let mut config = Config::default();
        config.detector.cascade.model = PathBuf::from("models/missing-cascade.bin");
        let error = Pipeline::from_config(&config).unwrap_err();
        assert!(matches!(
            error,
            PipelineError::Detect(DetectError::CascadeModelMissing(_))
        ));
    }

    #[test]
    #[ignore] // Only run if model files are downloaded
    fn blank_image_bytes_analyze_to_no_face() {
        let config = Config::default();
        let pipeline = Pipeline::from_config(&config).unwrap();

        let frame = RgbImage::from_pixel(200, 200, Rgb([140, 140, 140]));
        let mut bytes = Vec::new();
        frame
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();

        assert_eq!(pipeline.analyze_bytes(&bytes).unwrap(), Analysis::NoFace);
    }
}
