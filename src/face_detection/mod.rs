//! Face detection backends and the frame space their boxes live in.

pub mod cascade;
pub mod ultraface;

pub use cascade::CascadeDetector;
pub use ultraface::UltrafaceDetector;

use image::{imageops, GrayImage, RgbImage};

use crate::annotations::{FaceBox, FaceDetection};
use crate::config::{Config, DetectorBackend};
use crate::error::DetectError;

/// The frame a detection's coordinates refer to.
///
/// The cascade backend scans a full resolution grayscale conversion of the
/// input, the neural backend a size-capped RGB copy. Face crops and overlay
/// drawing happen in this space; boxes are never rescaled back to the input
/// frame.
pub enum WorkingFrame {
    Gray(GrayImage),
    Rgb(RgbImage),
}

impl WorkingFrame {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            WorkingFrame::Gray(gray) => gray.dimensions(),
            WorkingFrame::Rgb(rgb) => rgb.dimensions(),
        }
    }

    /// Crops the frame to a box and returns the crop in grayscale.
    pub fn crop_gray(&self, bbox: &FaceBox) -> GrayImage {
        match self {
            WorkingFrame::Gray(gray) => {
                imageops::crop_imm(gray, bbox.x(), bbox.y(), bbox.width(), bbox.height()).to_image()
            }
            WorkingFrame::Rgb(rgb) => {
                let crop =
                    imageops::crop_imm(rgb, bbox.x(), bbox.y(), bbox.width(), bbox.height())
                        .to_image();
                imageops::grayscale(&crop)
            }
        }
    }

    /// An RGB canvas in this frame's coordinate space.
    ///
    /// The grayscale working frame shares its coordinate space with the input
    /// frame, so the input itself serves as the canvas there.
    pub fn canvas(&self, input: &RgbImage) -> RgbImage {
        match self {
            WorkingFrame::Gray(_) => input.clone(),
            WorkingFrame::Rgb(rgb) => rgb.clone(),
        }
    }
}

/// What one detection pass produces: the working frame plus at most one face.
pub struct DetectionOutcome {
    pub frame: WorkingFrame,
    pub face: Option<FaceDetection>,
}

/// A face detector selected by configuration.
#[derive(Debug)]
pub enum FaceDetector {
    Cascade(CascadeDetector),
    Neural(UltrafaceDetector),
}

impl FaceDetector {
    pub fn from_config(config: &Config) -> Result<Self, DetectError> {
        match config.detector.backend {
            DetectorBackend::Cascade => Ok(FaceDetector::Cascade(CascadeDetector::new(
                &config.detector.cascade,
            )?)),
            DetectorBackend::Neural => Ok(FaceDetector::Neural(UltrafaceDetector::new(
                &config.detector.neural,
                config.inference.intra_threads,
            )?)),
        }
    }

    /// Runs detection on one frame.
    ///
    /// Finding no face is a normal outcome, not an error; errors are reserved
    /// for backend resource and run failures.
    pub fn detect(&self, frame: &RgbImage) -> Result<DetectionOutcome, DetectError> {
        match self {
            FaceDetector::Cascade(detector) => detector.detect(frame),
            FaceDetector::Neural(detector) => detector.detect(frame),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    #[test]
    fn crop_gray_from_gray_frame_is_a_plain_crop() {
        let mut gray = GrayImage::from_pixel(10, 10, Luma([0]));
        gray.put_pixel(4, 5, Luma([200]));
        let frame = WorkingFrame::Gray(gray);

        let bbox = FaceBox::from_pixels(3, 4, 4, 4, 10, 10).unwrap();
        let crop = frame.crop_gray(&bbox);
        assert_eq!(crop.dimensions(), (4, 4));
        assert_eq!(crop.get_pixel(1, 1), &Luma([200]));
        assert_eq!(crop.get_pixel(0, 0), &Luma([0]));
    }

    #[test]
    fn crop_gray_from_rgb_frame_converts_to_luma() {
        let rgb = RgbImage::from_pixel(8, 8, Rgb([255, 255, 255]));
        let frame = WorkingFrame::Rgb(rgb);

        let bbox = FaceBox::from_pixels(0, 0, 8, 8, 8, 8).unwrap();
        let crop = frame.crop_gray(&bbox);
        assert_eq!(crop.dimensions(), (8, 8));
        assert_eq!(crop.get_pixel(3, 3), &Luma([255]));
    }

    #[test]
    fn canvas_uses_the_input_for_gray_working_frames() {
        let input = RgbImage::from_pixel(6, 4, Rgb([9, 8, 7]));
        let gray_frame = WorkingFrame::Gray(imageops::grayscale(&input));
        assert_eq!(gray_frame.canvas(&input), input);

        let capped = RgbImage::from_pixel(3, 2, Rgb([1, 2, 3]));
        let rgb_frame = WorkingFrame::Rgb(capped.clone());
        assert_eq!(rgb_frame.canvas(&input), capped);
    }
}
