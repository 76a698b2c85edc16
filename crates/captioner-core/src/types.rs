//! Core data types returned by the vision service and rendered by the driver.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A confidence score bounded to `[0.0, 1.0]`.
///
/// Values outside the range are clamped on construction; NaN becomes 0.0.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Confidence(f64);

impl Confidence {
    /// Create a confidence value, clamping into `[0.0, 1.0]`.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            Self(0.0)
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    /// The raw score as reported by the service.
    pub fn value(self) -> f64 {
        self.0
    }

    /// The score rounded to 2 decimal places, half away from zero.
    ///
    /// `0.8675` → `0.87`, `0.805` → `0.81`.
    pub fn rounded(self) -> f64 {
        (self.0 * 100.0).round() / 100.0
    }
}

impl From<f64> for Confidence {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Confidence> for f64 {
    fn from(value: Confidence) -> Self {
        value.0
    }
}

/// Displays the rounded score with the shortest representation (`0.8`, `0.87`).
impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rounded())
    }
}

/// A single caption candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    /// Natural-language description of the image
    pub text: String,

    /// Service certainty in this caption
    pub confidence: Confidence,
}

impl Caption {
    pub fn new(text: impl Into<String>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            confidence: Confidence::new(confidence),
        }
    }
}

/// The result of describing one image.
///
/// Captions keep the order the service returned them in. An empty caption
/// list is a valid outcome, not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageDescription {
    /// Caption candidates, best first
    pub captions: Vec<Caption>,

    /// Keywords the service associated with the image
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Service-side request identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    /// Model version that produced the captions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

impl ImageDescription {
    pub fn from_captions(captions: Vec<Caption>) -> Self {
        Self {
            captions,
            ..Self::default()
        }
    }

    pub fn has_captions(&self) -> bool {
        !self.captions.is_empty()
    }
}

/// Machine-readable output record for one image (JSONL output).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionRecord {
    /// Just the filename portion
    pub file_name: String,

    /// Path to the source file as discovered
    pub file_path: PathBuf,

    /// Captions with confidence rounded to 2 decimals
    pub captions: Vec<RoundedCaption>,
}

/// Caption with a display-rounded confidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundedCaption {
    pub text: String,
    pub confidence: f64,
}

impl CaptionRecord {
    pub fn new(file_name: &str, file_path: PathBuf, description: &ImageDescription) -> Self {
        Self {
            file_name: file_name.to_string(),
            file_path,
            captions: description
                .captions
                .iter()
                .map(|c| RoundedCaption {
                    text: c.text.clone(),
                    confidence: c.confidence.rounded(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_rounds_up() {
        assert_eq!(Confidence::new(0.8675).rounded(), 0.87);
        assert_eq!(Confidence::new(0.8675).to_string(), "0.87");
    }

    #[test]
    fn test_confidence_half_rounds_away_from_zero() {
        assert_eq!(Confidence::new(0.805).rounded(), 0.81);
        assert_eq!(Confidence::new(0.805).to_string(), "0.81");
    }

    #[test]
    fn test_confidence_display_drops_trailing_zero() {
        assert_eq!(Confidence::new(0.8).to_string(), "0.8");
        assert_eq!(Confidence::new(0.799).to_string(), "0.8");
        assert_eq!(Confidence::new(1.0).to_string(), "1");
    }

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(Confidence::new(1.7).value(), 1.0);
        assert_eq!(Confidence::new(-0.2).value(), 0.0);
        assert_eq!(Confidence::new(f64::NAN).value(), 0.0);
    }

    #[test]
    fn test_confidence_deserialize_clamps() {
        let caption: Caption =
            serde_json::from_str(r#"{"text":"a cat","confidence":1.5}"#).unwrap();
        assert_eq!(caption.confidence.value(), 1.0);
    }

    #[test]
    fn test_caption_record_rounds_confidence() {
        let description = ImageDescription::from_captions(vec![
            Caption::new("a cat on a chair", 0.9123),
            Caption::new("a dog nearby", 0.5549),
        ]);
        let record = CaptionRecord::new("cat.jpg", PathBuf::from("images/cat.jpg"), &description);
        assert_eq!(record.captions[0].confidence, 0.91);
        assert_eq!(record.captions[1].confidence, 0.55);
        assert_eq!(record.captions[1].text, "a dog nearby");
    }

    #[test]
    fn test_empty_description_has_no_captions() {
        assert!(!ImageDescription::default().has_captions());
    }
}
