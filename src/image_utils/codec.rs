use image::codecs::jpeg::JpegEncoder;
use image::{ImageResult, RgbImage};

/// JPEG quality used for annotated stream parts.
const STREAM_JPEG_QUALITY: u8 = 75;

/// Decodes an encoded image into an RGB frame.
///
/// The container format is sniffed from the bytes, so any format the `image`
/// crate understands is accepted. Grayscale and alpha images are converted
/// to RGB. Undecodable bytes surface the decoder's error unchanged.
pub fn decode_frame(bytes: &[u8]) -> ImageResult<RgbImage> {
    Ok(image::load_from_memory(bytes)?.to_rgb8())
}

/// Encodes a frame as JPEG for the annotated stream.
pub fn encode_jpeg(frame: &RgbImage) -> ImageResult<Vec<u8>> {
    let mut bytes = Vec::new();
    frame.write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, STREAM_JPEG_QUALITY))?;
    Ok(bytes)
}
