use std::sync::{Arc, Mutex};

use ndarray::{Array4, ArrayD};
use tracing::info;

use crate::annotations::{Emotion, RawPrediction};
use crate::config::{InferenceConfig, ModelsConfig};
use crate::error::ModelError;
use crate::inference::session::OrtInferenceSession;

static SHARED_ENGINE: Mutex<Option<Arc<AttributeEngine>>> = Mutex::new(None);

/// The three attribute models, loaded once and run together per face.
///
/// Gender and age each produce a single scalar, emotion a five-class
/// probability vector. All three consume the same normalized face tensor
/// and are independent of one another. Loading fails if any one artifact
/// is missing or unusable; there is no partial mode.
#[derive(Debug)]
pub struct AttributeEngine {
    gender: OrtInferenceSession,
    age: OrtInferenceSession,
    emotion: OrtInferenceSession,
}

impl AttributeEngine {
    pub fn new(models: &ModelsConfig, inference: &InferenceConfig) -> Result<Self, ModelError> {
        let threads = inference.intra_threads;
        let gender = OrtInferenceSession::from_file("gender", &models.gender, threads)?;
        let age = OrtInferenceSession::from_file("age", &models.age, threads)?;
        let emotion = OrtInferenceSession::from_file("emotion", &models.emotion, threads)?;
        info!(
            gender = %models.gender.display(),
            age = %models.age.display(),
            emotion = %models.emotion.display(),
            "attribute models loaded"
        );
        Ok(AttributeEngine { gender, age, emotion })
    }

    /// Returns the process-wide engine, loading the models on first use.
    ///
    /// The first successful caller's configuration wins; later calls reuse
    /// the already loaded sessions regardless of the configuration they
    /// pass. A failed load caches nothing, so a later call may retry.
    pub fn shared(
        models: &ModelsConfig,
        inference: &InferenceConfig,
    ) -> Result<Arc<Self>, ModelError> {
        let mut guard = SHARED_ENGINE.lock().unwrap();
        if let Some(engine) = guard.as_ref() {
            return Ok(Arc::clone(engine));
        }
        let engine = Arc::new(AttributeEngine::new(models, inference)?);
        *guard = Some(Arc::clone(&engine));
        Ok(engine)
    }

    /// Runs all three models on one normalized face tensor.
    ///
    /// The tensor is the normalizer's (1, 128, 128, 1) output; the three
    /// inferences are independent and see identical input.
    pub fn infer(&self, tensor: &Array4<f32>) -> Result<RawPrediction, ModelError> {
        let gender = scalar_output("gender", self.gender.run_single(tensor.clone())?)?;
        let age = scalar_output("age", self.age.run_single(tensor.clone())?)?;
        let emotion = emotion_output(self.emotion.run_single(tensor.clone())?)?;
        Ok(RawPrediction { gender, age, emotion })
    }
}

fn scalar_output(model: &'static str, output: ArrayD<f32>) -> Result<f32, ModelError> {
    output.iter().next().copied().ok_or_else(|| ModelError::Output {
        model,
        detail: "empty output tensor".to_string(),
    })
}

fn emotion_output(output: ArrayD<f32>) -> Result<[f32; 5], ModelError> {
    let flat: Vec<f32> = output.iter().copied().collect();
    if flat.len() != Emotion::ALL.len() {
        return Err(ModelError::Output {
            model: "emotion",
            detail: format!(
                "expected {} class probabilities, got {}",
                Emotion::ALL.len(),
                flat.len()
            ),
        });
    }
    let mut probabilities = [0.0_f32; 5];
    probabilities.copy_from_slice(&flat);
    Ok(probabilities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::path::PathBuf;

    fn output(values: &[f32]) -> ArrayD<f32> {
        ArrayD::from_shape_vec(vec![1, values.len()], values.to_vec()).unwrap()
    }

    #[test]
    fn scalar_output_takes_the_first_element() {
        assert_eq!(scalar_output("gender", output(&[0.83])).unwrap(), 0.83);
        assert_eq!(scalar_output("age", output(&[41.2, 0.0])).unwrap(), 41.2);
    }

    #[test]
    fn scalar_output_rejects_empty_tensors() {
        let error = scalar_output("gender", output(&[])).unwrap_err();
        assert!(matches!(error, ModelError::Output { model: "gender", .. }));
    }

    #[test]
    fn emotion_output_requires_exactly_five_classes() {
        let probabilities = emotion_output(output(&[0.1, 0.2, 0.3, 0.2, 0.2])).unwrap();
        assert_eq!(probabilities, [0.1, 0.2, 0.3, 0.2, 0.2]);
        assert!(emotion_output(output(&[0.5, 0.5])).is_err());
        assert!(emotion_output(output(&[0.2; 6])).is_err());
    }

    #[test]
    fn engine_refuses_to_load_with_a_missing_artifact() {
        let mut config = Config::default();
        config.models.age = PathBuf::from("models/absent.onnx");
        config.models.gender = PathBuf::from("models/also-absent.onnx");
        config.models.emotion = PathBuf::from("models/equally-absent.onnx");
        let error = AttributeEngine::new(&config.models, &config.inference).unwrap_err();
        assert!(matches!(error, ModelError::ArtifactMissing(_)));
    }

    #[test]
    #[ignore] // Only run if model files are downloaded
    fn engine_inference_is_deterministic() {
        let config = Config::default();
        let engine = AttributeEngine::new(&config.models, &config.inference).unwrap();
        let tensor = Array4::from_elem((1, 128, 128, 1), 0.5_f32);
        let first = engine.infer(&tensor).unwrap();
        let second = engine.infer(&tensor).unwrap();
        assert_eq!(first, second);
        assert!(first.gender >= 0.0 && first.gender <= 1.0);
        let total: f32 = first.emotion.iter().sum();
        assert!((total - 1.0).abs() < 1e-3);
    }

    #[test]
    #[ignore] // Only run if model files are downloaded
    fn shared_engine_is_loaded_once() {
        let config = Config::default();
        let first = AttributeEngine::shared(&config.models, &config.inference).unwrap();
        let second = AttributeEngine::shared(&config.models, &config.inference).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
