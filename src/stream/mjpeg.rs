use image::RgbImage;
use tracing::warn;

use crate::image_utils::encode_jpeg;
use crate::stream::source::FrameSource;

/// Turns a raw frame into the frame that gets streamed.
///
/// The live pipeline implements this; keeping it as a seam lets the stream
/// machinery run against scripted annotators in tests.
pub trait FrameAnnotator {
    fn annotate(&self, frame: &RgbImage) -> RgbImage;
}

/// Lifecycle of an annotated stream.
///
/// `Closed` is terminal: it is entered the moment one frame read fails and
/// the stream never produces a part again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Active,
    Closed,
}

/// An infinite, pull-based sequence of annotated JPEG parts.
///
/// Each pull reads one frame from the source, annotates it, JPEG-encodes it
/// and wraps it in the multipart delimiter a replace-on-arrival transport
/// expects. The stream owns its source exclusively and serves one consumer.
pub struct AnnotatedStream<S, A> {
    source: S,
    annotator: A,
    state: StreamState,
}

impl<S: FrameSource, A: FrameAnnotator> AnnotatedStream<S, A> {
    pub fn new(source: S, annotator: A) -> Self {
        AnnotatedStream {
            source,
            annotator,
            state: StreamState::Active,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }
}

impl<S: FrameSource, A: FrameAnnotator> Iterator for AnnotatedStream<S, A> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Vec<u8>> {
        loop {
            if self.state == StreamState::Closed {
                return None;
            }
            let frame = match self.source.next_frame() {
                Ok(frame) => frame,
                Err(error) => {
                    warn!(%error, "frame read failed, closing stream");
                    self.state = StreamState::Closed;
                    return None;
                }
            };
            let annotated = self.annotator.annotate(&frame);
            match encode_jpeg(&annotated) {
                Ok(jpeg) => return Some(multipart_part(&jpeg)),
                Err(error) => warn!(%error, "frame encode failed, skipping frame"),
            }
        }
    }
}

/// Wraps one encoded JPEG in the stream's multipart framing.
pub fn multipart_part(jpeg: &[u8]) -> Vec<u8> {
    let mut part = Vec::with_capacity(jpeg.len() + 64);
    part.extend_from_slice(b"--frame\r\nContent-Type: image/jpeg\r\n\r\n");
    part.extend_from_slice(jpeg);
    part.extend_from_slice(b"\r\n");
    part
}
