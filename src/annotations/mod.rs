//! Data types describing what was found in a frame.
//!
//! A detector produces a [`FaceDetection`], the attribute models produce a
//! [`RawPrediction`], interpretation turns that into an
//! [`AttributePrediction`], and reporting renders it as a
//! [`PredictionReport`].

pub mod attributes;
pub mod detection;
pub mod face_box;
pub mod report;

pub use attributes::{AgeRange, AttributePrediction, Emotion, Gender, RawPrediction};
pub use detection::FaceDetection;
pub use face_box::FaceBox;
pub use report::PredictionReport;
