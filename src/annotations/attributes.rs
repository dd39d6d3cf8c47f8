use std::fmt;

use image::Rgb;

/// The gender classes the gender model can assign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Maps the gender model's scalar output to a class.
    ///
    /// The model emits a single value in `[0,1]` where high values indicate
    /// female. The threshold is strict: exactly 0.7 still classifies as male.
    pub fn from_value(value: f32) -> Self {
        if value > 0.7 {
            Gender::Female
        } else {
            Gender::Male
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The emotion classes the emotion model can assign.
///
/// The discriminant order matches the emotion model's output vector, so
/// index 0 of the probability vector is `Angry` and index 4 is `Surprised`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emotion {
    Angry,
    Happy,
    Neutral,
    Sad,
    Surprised,
}

impl Emotion {
    /// All classes in model output order.
    pub const ALL: [Emotion; 5] = [
        Emotion::Angry,
        Emotion::Happy,
        Emotion::Neutral,
        Emotion::Sad,
        Emotion::Surprised,
    ];

    /// Picks the winning class from a probability vector.
    ///
    /// Ties resolve to the lowest index, so an all-equal vector yields
    /// `Angry`. Returns the class together with its probability.
    pub fn argmax(probabilities: &[f32; 5]) -> (Emotion, f32) {
        let mut best = 0;
        for (index, probability) in probabilities.iter().enumerate().skip(1) {
            if *probability > probabilities[best] {
                best = index;
            }
        }
        (Emotion::ALL[best], probabilities[best])
    }

    pub fn from_index(index: usize) -> Option<Emotion> {
        Emotion::ALL.get(index).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Angry => "Angry",
            Emotion::Happy => "Happy",
            Emotion::Neutral => "Neutral",
            Emotion::Sad => "Sad",
            Emotion::Surprised => "Surprised",
        }
    }

    /// The emoji drawn next to the emotion label in annotated frames.
    pub fn glyph(&self) -> &'static str {
        match self {
            Emotion::Angry => "\u{1F620}",
            Emotion::Happy => "\u{1F60A}",
            Emotion::Neutral => "\u{1F610}",
            Emotion::Sad => "\u{1F622}",
            Emotion::Surprised => "\u{1F632}",
        }
    }

    /// The overlay color associated with the emotion.
    pub fn color(&self) -> Rgb<u8> {
        match self {
            Emotion::Angry => Rgb([220_u8, 60, 50]),
            Emotion::Happy => Rgb([80_u8, 200, 120]),
            Emotion::Neutral => Rgb([200_u8, 200, 200]),
            Emotion::Sad => Rgb([90_u8, 140, 230]),
            Emotion::Surprised => Rgb([240_u8, 170, 50]),
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The raw outputs of the three attribute models for one face.
///
/// `gender` is the model's scalar in `[0,1]`, `age` is an estimate in years,
/// and `emotion` is a probability vector in model output order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPrediction {
    pub gender: f32,
    pub age: f32,
    pub emotion: [f32; 5],
}

/// An inclusive range of ages in whole years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeRange {
    pub lower: u32,
    pub upper: u32,
}

impl fmt::Display for AgeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.lower, self.upper)
    }
}

/// The interpreted attributes for one face, with a confidence per attribute.
///
/// All confidences are in `[0,1]`. The age model's point estimate is widened
/// into a range whose half-width grows with the estimate, so the range for a
/// forty year old is wider in years than the range for a child even though
/// the relative confidence is higher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttributePrediction {
    pub gender: Gender,
    pub gender_confidence: f32,
    pub age_range: AgeRange,
    pub age_confidence: f32,
    pub emotion: Emotion,
    pub emotion_confidence: f32,
}

impl AttributePrediction {
    /// Interprets raw model outputs into presentable attributes.
    pub fn from_raw(raw: &RawPrediction) -> Self {
        let gender = Gender::from_value(raw.gender);
        let gender_confidence = raw.gender.max(1.0 - raw.gender);

        // Age estimates below one year are treated as one year old.
        let age = raw.age.max(1.0);
        let range_width = (0.05_f32 * age).floor().max(2.0);
        let lower = (age - range_width).floor().max(1.0) as u32;
        let upper = (age + range_width).floor() as u32;
        let age_confidence = (1.0 - range_width / age).clamp(0.0, 1.0);

        let (emotion, emotion_confidence) = Emotion::argmax(&raw.emotion);

        AttributePrediction {
            gender,
            gender_confidence,
            age_range: AgeRange { lower, upper },
            age_confidence,
            emotion,
            emotion_confidence,
        }
    }
}
