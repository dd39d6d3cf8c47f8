//! Pipeline configuration.
//!
//! Loaded from a TOML file; callers fall back to built-in defaults when the
//! file is missing or invalid.

use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub detector: DetectorConfig,
    pub models: ModelsConfig,
    pub inference: InferenceConfig,
    pub overlay: OverlayConfig,
    pub stream: StreamConfig,
}

/// Which detection backend the pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorBackend {
    Cascade,
    Neural,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetectorConfig {
    pub backend: DetectorBackend,
    pub cascade: CascadeConfig,
    pub neural: NeuralConfig,
}

/// Knobs for the classical cascade backend.
///
/// These are the SeetaFace cascade's native sensitivity controls: the pyramid
/// scale factor governs how many scales get scanned, the score threshold how
/// strict acceptance is, and the minimum face size the smallest detectable
/// region in pixels.
#[derive(Debug, Clone, Deserialize)]
pub struct CascadeConfig {
    pub model: PathBuf,
    pub min_face_size: u32,
    pub score_threshold: f64,
    pub pyramid_scale_factor: f32,
    pub slide_window_step: u32,
}

/// Knobs for the neural single-shot backend.
#[derive(Debug, Clone, Deserialize)]
pub struct NeuralConfig {
    pub model: PathBuf,
    /// Minimum foreground probability for a candidate box.
    pub min_confidence: f32,
    /// Frames are downscaled so their longest side does not exceed this
    /// before detection; boxes stay in the downscaled coordinate space.
    pub downscale_cap: u32,
}

/// Artifact paths for the three attribute classifiers.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    pub gender: PathBuf,
    pub age: PathBuf,
    pub emotion: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InferenceConfig {
    pub intra_threads: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OverlayConfig {
    /// Font used for overlay text. Must cover both the label text and the
    /// emotion emoji glyphs; a missing or unparseable font is a fatal error
    /// for the renderer.
    pub font: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    pub device_index: u32,
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn default_path() -> &'static str {
        "config.toml"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            detector: DetectorConfig {
                backend: DetectorBackend::Cascade,
                cascade: CascadeConfig {
                    model: PathBuf::from("models/seeta_fd_frontal_v1.0.bin"),
                    min_face_size: 20,
                    score_threshold: 2.0,
                    pyramid_scale_factor: 0.8,
                    slide_window_step: 4,
                },
                neural: NeuralConfig {
                    model: PathBuf::from("models/version-RFB-320.onnx"),
                    min_confidence: 0.5,
                    downscale_cap: 256,
                },
            },
            models: ModelsConfig {
                gender: PathBuf::from("models/gender.onnx"),
                age: PathBuf::from("models/age.onnx"),
                emotion: PathBuf::from("models/emotion.onnx"),
            },
            inference: InferenceConfig { intra_threads: 4 },
            overlay: OverlayConfig {
                font: PathBuf::from("assets/Symbola.ttf"),
            },
            stream: StreamConfig { device_index: 0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_detection_contract() {
        let config = Config::default();
        assert_eq!(config.detector.backend, DetectorBackend::Cascade);
        assert_eq!(config.detector.neural.min_confidence, 0.5);
        assert_eq!(config.detector.neural.downscale_cap, 256);
        assert_eq!(config.detector.cascade.min_face_size, 20);
        assert_eq!(config.stream.device_index, 0);
    }

    #[test]
    fn parses_full_toml() {
        let raw = r#"
            [detector]
            backend = "neural"

            [detector.cascade]
            model = "artifacts/cascade.bin"
            min_face_size = 40
            score_threshold = 3.5
            pyramid_scale_factor = 0.7
            slide_window_step = 2

            [detector.neural]
            model = "artifacts/ultraface.onnx"
            min_confidence = 0.6
            downscale_cap = 320

            [models]
            gender = "artifacts/gender.onnx"
            age = "artifacts/age.onnx"
            emotion = "artifacts/emotion.onnx"

            [inference]
            intra_threads = 2

            [overlay]
            font = "fonts/emoji.ttf"

            [stream]
            device_index = 1
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.detector.backend, DetectorBackend::Neural);
        assert_eq!(config.detector.neural.min_confidence, 0.6);
        assert_eq!(config.detector.cascade.min_face_size, 40);
        assert_eq!(config.models.age, PathBuf::from("artifacts/age.onnx"));
        assert_eq!(config.inference.intra_threads, 2);
        assert_eq!(config.overlay.font, PathBuf::from("fonts/emoji.ttf"));
        assert_eq!(config.stream.device_index, 1);
    }
}
