use std::fs;

use ab_glyph::{FontVec, PxScale};
use image::{imageops, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use crate::annotations::{AttributePrediction, FaceBox};
use crate::annotations::report::format_percent;
use crate::config::OverlayConfig;
use crate::error::RenderError;

const TEXT_SCALE: f32 = 24.0_f32;
const PATCH_PADDING: i64 = 4;
const LINE_GAP: i64 = 2;
const PATCH_BLUR_SIGMA: f32 = 20.0_f32;
const TEXT_COLOR: Rgb<u8> = Rgb([255_u8, 255, 255]);
const BOX_OUTLINE: Rgb<u8> = Rgb([0_u8, 255, 0]);

/// Draws prediction text and a face outline onto frames.
///
/// Each text line sits on its own background patch: the text extent is
/// padded, clamped to the frame, and Gaussian blurred in place before the
/// line is drawn over it, so the text stays readable on busy frames. The
/// emotion line is colored per emotion class and carries the class emoji,
/// which is why the configured font must cover pictographic glyphs.
pub struct OverlayRenderer {
    font: FontVec,
}

impl OverlayRenderer {
    /// Loads the overlay font from the configured path.
    ///
    /// A missing or unparseable font is fatal here and only here; the
    /// still-image path never constructs a renderer.
    pub fn new(config: &OverlayConfig) -> Result<Self, RenderError> {
        if !config.font.exists() {
            return Err(RenderError::FontMissing(config.font.clone()));
        }
        let bytes =
            fs::read(&config.font).map_err(|_| RenderError::FontMissing(config.font.clone()))?;
        let font = FontVec::try_from_vec(bytes)
            .map_err(|_| RenderError::FontInvalid(config.font.clone()))?;
        Ok(OverlayRenderer { font })
    }

    /// Returns a copy of the frame with the prediction drawn next to the box.
    ///
    /// The box must be in the frame's own coordinate space. The input frame
    /// is never mutated.
    pub fn render(
        &self,
        frame: &RgbImage,
        prediction: &AttributePrediction,
        bbox: &FaceBox,
    ) -> RgbImage {
        let mut canvas = frame.clone();
        let (frame_width, frame_height) = canvas.dimensions();

        draw_hollow_rect_mut(
            &mut canvas,
            Rect::at(bbox.x() as i32, bbox.y() as i32).of_size(bbox.width(), bbox.height()),
            BOX_OUTLINE,
        );

        let lines = [
            (
                format!(
                    "{} {} {}",
                    prediction.emotion.glyph(),
                    prediction.emotion,
                    format_percent(prediction.emotion_confidence)
                ),
                prediction.emotion.color(),
            ),
            (
                format!(
                    "{} {}",
                    prediction.gender,
                    format_percent(prediction.gender_confidence)
                ),
                TEXT_COLOR,
            ),
            (format!("Age: {}", prediction.age_range), TEXT_COLOR),
        ];

        let scale = PxScale::from(TEXT_SCALE);
        let measured: Vec<(&String, Rgb<u8>, u32, u32)> = lines
            .iter()
            .map(|(text, color)| {
                let (width, height) = text_size(scale, &self.font, text);
                (text, *color, width, height)
            })
            .collect();
        let stack_height: i64 = measured
            .iter()
            .map(|(_, _, _, height)| *height as i64 + 2 * PATCH_PADDING + LINE_GAP)
            .sum();

        // Lines stack upward from the top edge of the face box; patches that
        // overflow the frame are clamped rather than skipped.
        let mut patch_top = bbox.y() as i64 - stack_height;
        for (text, color, width, height) in measured {
            let text_x = bbox.x() as i64;
            let text_y = patch_top + PATCH_PADDING;
            if let Some(patch) =
                padded_patch(text_x, text_y, width, height, frame_width, frame_height)
            {
                blur_region(&mut canvas, &patch, PATCH_BLUR_SIGMA);
                draw_text_mut(
                    &mut canvas,
                    color,
                    patch.x() as i32 + PATCH_PADDING as i32,
                    patch.y() as i32 + PATCH_PADDING as i32,
                    scale,
                    &self.font,
                    text,
                );
            }
            patch_top += height as i64 + 2 * PATCH_PADDING + LINE_GAP;
        }

        canvas
    }
}

/// Pads a text extent into the background rectangle drawn behind it.
///
/// Returns `None` when the padded rectangle falls entirely outside the
/// frame.
fn padded_patch(
    text_x: i64,
    text_y: i64,
    text_width: u32,
    text_height: u32,
    frame_width: u32,
    frame_height: u32,
) -> Option<FaceBox> {
    FaceBox::from_pixels(
        text_x - PATCH_PADDING,
        text_y - PATCH_PADDING,
        text_width as i64 + 2 * PATCH_PADDING,
        text_height as i64 + 2 * PATCH_PADDING,
        frame_width,
        frame_height,
    )
}

/// Gaussian blurs one rectangular region of the canvas in place.
fn blur_region(canvas: &mut RgbImage, region: &FaceBox, sigma: f32) {
    let patch = imageops::crop_imm(
        canvas,
        region.x(),
        region.y(),
        region.width(),
        region.height(),
    )
    .to_image();
    let blurred = imageops::blur(&patch, sigma);
    imageops::replace(canvas, &blurred, region.x() as i64, region.y() as i64);
}
