use image::RgbImage;

use crate::error::CaptureError;

/// A pull-based supplier of RGB frames.
///
/// The stream generator takes its source by value and owns it exclusively.
/// A source that fails a read is considered gone; the generator never
/// retries it.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<RgbImage, CaptureError>;
}

/// A frame source backed by a capture device (`nokhwa`).
#[cfg(feature = "camera")]
pub struct CameraSource {
    camera: nokhwa::Camera,
}

#[cfg(feature = "camera")]
impl CameraSource {
    /// Opens the capture device at the configured index and starts its
    /// stream.
    pub fn open(config: &crate::config::StreamConfig) -> Result<Self, CaptureError> {
        use nokhwa::pixel_format::RgbFormat;
        use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};

        let unavailable = |error: nokhwa::NokhwaError| CaptureError::DeviceUnavailable {
            index: config.device_index,
            reason: error.to_string(),
        };
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution);
        let mut camera = nokhwa::Camera::new(CameraIndex::Index(config.device_index), requested)
            .map_err(unavailable)?;
        camera.open_stream().map_err(unavailable)?;
        tracing::info!(device = config.device_index, "capture device opened");
        Ok(CameraSource { camera })
    }
}

#[cfg(feature = "camera")]
impl FrameSource for CameraSource {
    fn next_frame(&mut self) -> Result<RgbImage, CaptureError> {
        use nokhwa::pixel_format::RgbFormat;

        let buffer = self
            .camera
            .frame()
            .map_err(|error| CaptureError::ReadFailed(error.to_string()))?;
        buffer
            .decode_image::<RgbFormat>()
            .map_err(|error| CaptureError::ReadFailed(error.to_string()))
    }
}
