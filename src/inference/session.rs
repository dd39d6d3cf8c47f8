use std::path::Path;
use std::sync::Mutex;

use ndarray::{Array4, ArrayD};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;

use crate::error::ModelError;

/// An onnxruntime inference session.
///
/// Every model in the pipeline is a thin wrapper around one of these. The
/// session owns the loaded graph and runs it on CPU; running mutates session
/// state, so the handle lives behind a mutex and the run methods take
/// `&self`. The model's input name is resolved from session metadata at load
/// time rather than hardcoded per model file.
#[derive(Debug)]
pub struct OrtInferenceSession {
    label: &'static str,
    session: Mutex<Session>,
    input_name: String,
}

impl OrtInferenceSession {
    /// Loads a model from disk and prepares it for CPU inference.
    ///
    /// The path is checked before onnxruntime touches it so a missing
    /// artifact reports as [`ModelError::ArtifactMissing`] instead of an
    /// opaque session error. `label` names the model in errors.
    pub fn from_file(
        label: &'static str,
        model_path: &Path,
        intra_threads: usize,
    ) -> Result<Self, ModelError> {
        if !model_path.exists() {
            return Err(ModelError::ArtifactMissing(model_path.to_path_buf()));
        }
        let session = Session::builder()?
            .with_execution_providers([CPUExecutionProvider::default().build()])?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(intra_threads)?
            .commit_from_file(model_path)?;
        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| ModelError::Output {
                model: label,
                detail: "model declares no inputs".to_string(),
            })?;
        Ok(OrtInferenceSession {
            label,
            session: Mutex::new(session),
            input_name,
        })
    }

    /// Checks that the loaded graph exposes every named output.
    ///
    /// Run this once after loading when later code will select outputs by
    /// name, so a mismatched model file fails at startup.
    pub fn require_outputs(&self, names: &[&str]) -> Result<(), ModelError> {
        let session = self.session.lock().unwrap();
        for name in names {
            if !session.outputs.iter().any(|output| output.name == *name) {
                return Err(ModelError::Output {
                    model: self.label,
                    detail: format!("model does not expose an output named {name:?}"),
                });
            }
        }
        Ok(())
    }

    /// Runs the model on one input tensor and returns its first output.
    pub fn run_single(&self, input: Array4<f32>) -> Result<ArrayD<f32>, ModelError> {
        let mut session = self.session.lock().unwrap();
        let outputs = session.run(ort::inputs![
            self.input_name.as_str() => Value::from_array(input)?
        ])?;
        Ok(outputs[0].try_extract_array::<f32>()?.to_owned())
    }

    /// Runs the model and returns the two outputs selected by name.
    ///
    /// The caller must have validated the names with [`require_outputs`]
    /// beforehand.
    ///
    /// [`require_outputs`]: OrtInferenceSession::require_outputs
    pub fn run_pair(
        &self,
        input: Array4<f32>,
        first: &str,
        second: &str,
    ) -> Result<(ArrayD<f32>, ArrayD<f32>), ModelError> {
        let mut session = self.session.lock().unwrap();
        let outputs = session.run(ort::inputs![
            self.input_name.as_str() => Value::from_array(input)?
        ])?;
        let first = outputs[first].try_extract_array::<f32>()?.to_owned();
        let second = outputs[second].try_extract_array::<f32>()?.to_owned();
        Ok((first, second))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_artifact_is_reported_before_session_creation() {
        let path = PathBuf::from("models/definitely-not-here.onnx");
        let error = OrtInferenceSession::from_file("gender", &path, 1).unwrap_err();
        match error {
            ModelError::ArtifactMissing(missing) => assert_eq!(missing, path),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
