//! Facial attribute inference pipeline.
//!
//! Finds a face in a still image or video frame and predicts an age range,
//! gender, and emotion for it. The live path annotates frames with the
//! predictions and serves them as a multipart JPEG stream.

pub mod annotations;
pub mod config;
pub mod error;
pub mod face_detection;
pub mod image_utils;
pub mod inference;
pub mod pipeline;
pub mod render;
pub mod stream;

pub use config::Config;
pub use pipeline::{Analysis, Pipeline};
