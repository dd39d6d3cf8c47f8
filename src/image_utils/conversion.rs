use image::{imageops, GrayImage, RgbImage};
use ndarray::Array4;

/// Side length of the square face crop the attribute models consume.
pub const FACE_INPUT_SIZE: u32 = 128;

/// Downscales a frame so its longest side is at most `cap` pixels.
///
/// Aspect ratio is preserved, with the shorter side truncated toward zero,
/// and pixels are combined by area averaging. Frames already within the cap
/// are returned unchanged.
pub fn cap_longest_side(frame: &RgbImage, cap: u32) -> RgbImage {
    let (width, height) = frame.dimensions();
    if width.max(height) <= cap {
        return frame.clone();
    }
    let (new_width, new_height) = if width >= height {
        let scaled = (height as f32 * cap as f32 / width as f32) as u32;
        (cap, scaled.max(1))
    } else {
        let scaled = (width as f32 * cap as f32 / height as f32) as u32;
        (scaled.max(1), cap)
    };
    imageops::thumbnail(frame, new_width, new_height)
}

/// Converts a cropped grayscale face into the attribute models' input tensor.
///
/// The face is resized to 128x128 by area averaging and intensities are
/// scaled into `[0,1]`. The resulting array has shape (1, 128, 128, 1),
/// encoding (image, row, column, channel).
pub fn face_input_tensor(face: &GrayImage) -> Array4<f32> {
    let resized = imageops::thumbnail(face, FACE_INPUT_SIZE, FACE_INPUT_SIZE);
    let mut tensor = Array4::zeros((1, FACE_INPUT_SIZE as usize, FACE_INPUT_SIZE as usize, 1));
    for (x, y, pixel) in resized.enumerate_pixels() {
        tensor[[0, y as usize, x as usize, 0]] = pixel.0[0] as f32 / 255.0_f32;
    }
    tensor
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    fn flat_rgb(width: u32, height: u32, value: u8) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([value, value, value]))
    }

    #[test]
    fn cap_leaves_small_frames_untouched() {
        let frame = flat_rgb(100, 50, 40);
        let capped = cap_longest_side(&frame, 256);
        assert_eq!(capped, frame);
    }

    #[test]
    fn cap_scales_landscape_frames_by_width() {
        let capped = cap_longest_side(&flat_rgb(512, 256, 40), 256);
        assert_eq!(capped.dimensions(), (256, 128));
    }

    #[test]
    fn cap_scales_portrait_frames_by_height() {
        let capped = cap_longest_side(&flat_rgb(256, 512, 40), 256);
        assert_eq!(capped.dimensions(), (128, 256));
    }

    #[test]
    fn cap_truncates_the_scaled_side() {
        // 200 * 256 / 300 = 170.67, which truncates to 170.
        let capped = cap_longest_side(&flat_rgb(300, 200, 40), 256);
        assert_eq!(capped.dimensions(), (256, 170));
    }

    #[test]
    fn cap_averages_pixel_areas() {
        let mut frame = RgbImage::new(512, 512);
        for (x, _, pixel) in frame.enumerate_pixels_mut() {
            *pixel = if x < 256 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) };
        }
        let capped = cap_longest_side(&frame, 256);
        // Every 2x2 source block lies entirely within one half, so the
        // averaged output keeps the hard edge at the midline.
        assert_eq!(capped.get_pixel(127, 100), &Rgb([0, 0, 0]));
        assert_eq!(capped.get_pixel(128, 100), &Rgb([255, 255, 255]));
    }

    #[test]
    fn face_tensor_has_single_channel_layout() {
        let face = GrayImage::from_pixel(256, 256, Luma([255]));
        let tensor = face_input_tensor(&face);
        assert_eq!(tensor.shape(), &[1, 128, 128, 1]);
        assert_eq!(tensor[[0, 0, 0, 0]], 1.0_f32);
        assert_eq!(tensor[[0, 127, 127, 0]], 1.0_f32);
    }

    #[test]
    fn face_tensor_scales_intensities_into_unit_range() {
        let face = GrayImage::from_pixel(128, 128, Luma([51]));
        let tensor = face_input_tensor(&face);
        assert_eq!(tensor[[0, 64, 64, 0]], 0.2_f32);
    }

    #[test]
    fn face_tensor_preserves_spatial_structure() {
        let mut face = GrayImage::from_pixel(256, 256, Luma([0]));
        for y in 0..256 {
            for x in 128..256 {
                face.put_pixel(x, y, Luma([255]));
            }
        }
        let tensor = face_input_tensor(&face);
        assert_eq!(tensor[[0, 60, 10, 0]], 0.0_f32);
        assert_eq!(tensor[[0, 60, 120, 0]], 1.0_f32);
    }
}
