use image::imageops::{self, FilterType};
use image::RgbImage;
use ndarray::{Array4, ArrayD};
use tracing::debug;

use crate::annotations::{FaceBox, FaceDetection};
use crate::config::NeuralConfig;
use crate::error::{DetectError, ModelError};
use crate::face_detection::{DetectionOutcome, WorkingFrame};
use crate::image_utils::cap_longest_side;
use crate::inference::OrtInferenceSession;

const MODEL_WIDTH: u32 = 320;
const MODEL_HEIGHT: u32 = 240;
const PIXEL_MEAN: f32 = 127.0_f32;
const PIXEL_SCALE: f32 = 128.0_f32;
const FOREGROUND: usize = 1;
const SCORES_OUTPUT: &str = "scores";
const BOXES_OUTPUT: &str = "boxes";

/// Single-shot neural face detector (Ultraface via ONNX Runtime).
///
/// The input frame is size-capped before detection and every coordinate is
/// reported in the capped frame's pixel space. The model sees a fixed 320x240
/// view of the frame and emits unordered per-candidate foreground scores and
/// relative corner boxes; the highest scoring candidate at or above the
/// configured minimum confidence is kept.
#[derive(Debug)]
pub struct UltrafaceDetector {
    session: OrtInferenceSession,
    config: NeuralConfig,
}

impl UltrafaceDetector {
    pub fn new(config: &NeuralConfig, intra_threads: usize) -> Result<Self, DetectError> {
        let session = OrtInferenceSession::from_file("ultraface", &config.model, intra_threads)?;
        session.require_outputs(&[SCORES_OUTPUT, BOXES_OUTPUT])?;
        Ok(UltrafaceDetector {
            session,
            config: config.clone(),
        })
    }

    pub fn detect(&self, frame: &RgbImage) -> Result<DetectionOutcome, DetectError> {
        let capped = cap_longest_side(frame, self.config.downscale_cap);
        let (width, height) = capped.dimensions();

        let (scores, boxes) =
            self.session
                .run_pair(model_input(&capped), SCORES_OUTPUT, BOXES_OUTPUT)?;
        let face = best_candidate(&scores, &boxes, self.config.min_confidence, width, height)?;
        debug!(found = face.is_some(), width, height, "neural detection pass");

        Ok(DetectionOutcome {
            frame: WorkingFrame::Rgb(capped),
            face,
        })
    }
}

/// Packs a frame into the model's input tensor.
///
/// The frame is resized to the model's fixed 320x240 view with bilinear
/// interpolation, then normalized to roughly `[-1,1]`. The array encodes
/// (image, channel, row, column).
fn model_input(frame: &RgbImage) -> Array4<f32> {
    let resized = imageops::resize(frame, MODEL_WIDTH, MODEL_HEIGHT, FilterType::Triangle);
    Array4::from_shape_fn(
        (1, 3, MODEL_HEIGHT as usize, MODEL_WIDTH as usize),
        |(_, channel, y, x)| {
            let pixel = resized.get_pixel(x as u32, y as u32);
            (pixel.0[channel] as f32 - PIXEL_MEAN) / PIXEL_SCALE
        },
    )
}

/// Picks the strongest candidate from the model's raw outputs.
///
/// `scores` has shape (1, N, 2) holding background/foreground probabilities,
/// `boxes` has shape (1, N, 4) holding relative corner coordinates. Ties on
/// the foreground score keep the earliest candidate. Candidates whose box
/// degenerates after clamping are dropped.
fn best_candidate(
    scores: &ArrayD<f32>,
    boxes: &ArrayD<f32>,
    min_confidence: f32,
    width: u32,
    height: u32,
) -> Result<Option<FaceDetection>, DetectError> {
    let score_shape = scores.shape();
    let box_shape = boxes.shape();
    let well_formed = score_shape.len() == 3
        && box_shape.len() == 3
        && score_shape[2] == 2
        && box_shape[2] == 4
        && score_shape[1] == box_shape[1];
    if !well_formed {
        return Err(DetectError::Neural(ModelError::Output {
            model: "ultraface",
            detail: format!("unexpected output shapes {score_shape:?} and {box_shape:?}"),
        }));
    }

    let mut best: Option<(usize, f32)> = None;
    for index in 0..score_shape[1] {
        let score = scores[[0, index, FOREGROUND]];
        if score < min_confidence {
            continue;
        }
        if best.map_or(true, |(_, strongest)| score > strongest) {
            best = Some((index, score));
        }
    }

    Ok(best.and_then(|(index, score)| {
        let bbox = FaceBox::from_relative_corners(
            boxes[[0, index, 0]],
            boxes[[0, index, 1]],
            boxes[[0, index, 2]],
            boxes[[0, index, 3]],
            width,
            height,
        )?;
        Some(FaceDetection::new(bbox, score))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use image::Rgb;
    use std::path::PathBuf;

    fn scores(rows: &[[f32; 2]]) -> ArrayD<f32> {
        let flat: Vec<f32> = rows.iter().flatten().copied().collect();
        ArrayD::from_shape_vec(vec![1, rows.len(), 2], flat).unwrap()
    }

    fn boxes(rows: &[[f32; 4]]) -> ArrayD<f32> {
        let flat: Vec<f32> = rows.iter().flatten().copied().collect();
        ArrayD::from_shape_vec(vec![1, rows.len(), 4], flat).unwrap()
    }

    #[test]
    fn input_tensor_is_normalized_channel_first() {
        let frame = RgbImage::from_pixel(64, 64, Rgb([255, 127, 0]));
        let input = model_input(&frame);
        assert_eq!(input.shape(), &[1, 3, 240, 320]);
        assert_eq!(input[[0, 0, 120, 160]], 1.0_f32);
        assert_eq!(input[[0, 1, 120, 160]], 0.0_f32);
        assert_eq!(input[[0, 2, 120, 160]], -0.9921875_f32);
    }

    #[test]
    fn best_candidate_keeps_the_highest_score() {
        let scores = scores(&[[0.4, 0.6], [0.1, 0.9], [0.2, 0.8]]);
        let boxes = boxes(&[
            [0.0, 0.0, 0.2, 0.2],
            [0.25, 0.25, 0.75, 0.75],
            [0.5, 0.5, 0.9, 0.9],
        ]);
        let face = best_candidate(&scores, &boxes, 0.5, 100, 100)
            .unwrap()
            .unwrap();
        assert_eq!(face.confidence, 0.9);
        assert_eq!(face.bbox.x(), 25);
        assert_eq!(face.bbox.width(), 50);
    }

    #[test]
    fn candidates_below_the_minimum_are_ignored() {
        let scores = scores(&[[0.6, 0.4], [0.55, 0.45]]);
        let boxes = boxes(&[[0.0, 0.0, 0.5, 0.5], [0.0, 0.0, 0.5, 0.5]]);
        let face = best_candidate(&scores, &boxes, 0.5, 100, 100).unwrap();
        assert!(face.is_none());
    }

    #[test]
    fn exact_minimum_confidence_is_kept() {
        let scores = scores(&[[0.5, 0.5]]);
        let boxes = boxes(&[[0.1, 0.1, 0.4, 0.4]]);
        let face = best_candidate(&scores, &boxes, 0.5, 100, 100).unwrap();
        assert!(face.is_some());
    }

    #[test]
    fn score_ties_keep_the_earliest_candidate() {
        let scores = scores(&[[0.2, 0.8], [0.2, 0.8]]);
        let boxes = boxes(&[[0.0, 0.0, 0.3, 0.3], [0.5, 0.5, 0.9, 0.9]]);
        let face = best_candidate(&scores, &boxes, 0.5, 100, 100)
            .unwrap()
            .unwrap();
        assert_eq!(face.bbox.x(), 0);
    }

    #[test]
    fn malformed_output_shapes_are_an_error() {
        let scores = ArrayD::from_shape_vec(vec![1, 2], vec![0.5, 0.5]).unwrap();
        let boxes = boxes(&[[0.0, 0.0, 0.5, 0.5]]);
        assert!(best_candidate(&scores, &boxes, 0.5, 100, 100).is_err());
    }

    #[test]
    fn missing_model_is_reported_before_any_inference() {
        let mut config = Config::default().detector.neural;
        config.model = PathBuf::from("models/no-ultraface-here.onnx");
        let error = UltrafaceDetector::new(&config, 1).unwrap_err();
        assert!(matches!(
            error,
            DetectError::Neural(ModelError::ArtifactMissing(_))
        ));
    }

    #[test]
    #[ignore] // Only run if model files are downloaded
    fn blank_frame_detects_no_face_and_caps_the_working_frame() {
        let config = Config::default();
        let detector = UltrafaceDetector::new(&config.detector.neural, 1).unwrap();
        let frame = RgbImage::from_pixel(1024, 512, Rgb([127, 127, 127]));

        let outcome = detector.detect(&frame).unwrap();
        assert!(outcome.face.is_none());
        assert_eq!(outcome.frame.dimensions(), (256, 128));
        assert!(matches!(outcome.frame, WorkingFrame::Rgb(_)));
    }
}
