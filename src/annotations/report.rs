use serde::Serialize;

use crate::annotations::attributes::AttributePrediction;

/// Formats a confidence in `[0,1]` as a percentage with two decimals.
pub fn format_percent(value: f32) -> String {
    format!("{:.2}%", value * 100.0)
}

/// The sentence reported alongside the gender class.
pub fn gender_sentence(confidence: f32) -> String {
    format!(
        "I am {} confident in the accuracy of the gender prediction.",
        format_percent(confidence)
    )
}

/// The sentence reported alongside the age range.
pub fn age_sentence(confidence: f32) -> String {
    format!(
        "My confidence in the age prediction is approximately {}.",
        format_percent(confidence)
    )
}

/// The sentence reported alongside the emotion class.
pub fn emotion_sentence(confidence: f32) -> String {
    format!(
        "I am {} confident in this emotion prediction.",
        format_percent(confidence)
    )
}

/// A prediction rendered into the strings clients receive.
///
/// Every field is already formatted: the classes as capitalized labels, the
/// age range as a dashed pair, and each confidence as a full sentence. The
/// struct serializes to the flat JSON object the still-image entry point
/// returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictionReport {
    pub gender: String,
    pub gender_confidence: String,
    pub age_range: String,
    pub age_confidence: String,
    pub emotion: String,
    pub emotion_confidence: String,
}

impl From<&AttributePrediction> for PredictionReport {
    fn from(prediction: &AttributePrediction) -> Self {
        PredictionReport {
            gender: prediction.gender.to_string(),
            gender_confidence: gender_sentence(prediction.gender_confidence),
            age_range: prediction.age_range.to_string(),
            age_confidence: age_sentence(prediction.age_confidence),
            emotion: prediction.emotion.to_string(),
            emotion_confidence: emotion_sentence(prediction.emotion_confidence),
        }
    }
}
