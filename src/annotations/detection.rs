use crate::annotations::face_box::FaceBox;

/// A detection is what is produced as output from a face detection backend.
///
/// A detection is a bounding box combined with a confidence score: a value that
/// encodes the detector's belief that the box contains a face. The scale of the
/// score depends on the backend; cascade detectors report an unbounded quality
/// score while single-shot neural detectors report a probability in `[0,1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceDetection {
    pub bbox: FaceBox,
    pub confidence: f32,
}

impl FaceDetection {
    pub fn new(bbox: FaceBox, confidence: f32) -> Self {
        FaceDetection { bbox, confidence }
    }
}
