//! The annotated MJPEG frame stream and its capture sources.

pub mod mjpeg;
pub mod source;

pub use mjpeg::{multipart_part, AnnotatedStream, FrameAnnotator, StreamState};
#[cfg(feature = "camera")]
pub use source::CameraSource;
pub use source::FrameSource;
