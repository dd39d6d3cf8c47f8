//! ONNX Runtime session handling and the attribute inference engine.

pub mod engine;
pub mod session;

pub use engine::AttributeEngine;
pub use session::OrtInferenceSession;
