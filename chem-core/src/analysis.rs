//! Analysis requests, results and outcomes.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::level::CurriculumLevel;
use crate::still::StillImage;

/// Identifier attached to each dispatched analysis, used for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Create a new unique request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated analysis request: at least one of image or text is present.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    id: RequestId,
    image: Option<StillImage>,
    text: Option<String>,
    level: CurriculumLevel,
}

impl AnalysisRequest {
    /// Build a request from the student's drawing and/or typed name.
    ///
    /// Whitespace-only text counts as absent, as does an empty image.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if neither an image nor text is given,
    /// and [`CoreError::UnsupportedImage`] if the image is not PNG or JPEG.
    pub fn new(
        image: Option<StillImage>,
        text: Option<&str>,
        level: CurriculumLevel,
    ) -> CoreResult<Self> {
        let text = text
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(ToString::to_string);
        let image = image.filter(|i| !i.is_empty());

        if image.is_none() && text.is_none() {
            return Err(CoreError::Validation(
                "draw a structure or type a compound name".to_string(),
            ));
        }
        if image.as_ref().is_some_and(|i| !i.format().is_supported()) {
            return Err(CoreError::UnsupportedImage);
        }

        Ok(Self {
            id: RequestId::new(),
            image,
            text,
            level,
        })
    }

    /// Request identifier.
    #[must_use]
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// The drawing, if any.
    #[must_use]
    pub fn image(&self) -> Option<&StillImage> {
        self.image.as_ref()
    }

    /// The typed query, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Curriculum level the explanation targets.
    #[must_use]
    pub fn level(&self) -> CurriculumLevel {
        self.level
    }
}

/// Structured explanation of a compound.
///
/// Created atomically from one backend response and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Common name.
    pub name: String,
    /// IUPAC name.
    pub iupac_name: String,
    /// Molecular formula.
    pub molecular_formula: String,
    /// Short overview.
    pub summary: String,
    /// Key properties, in order.
    pub key_points: Vec<String>,
    /// Characteristic reactions or uses, in order.
    #[serde(rename = "reactions_or_uses")]
    pub reactions_or_uses: Vec<String>,
    /// Where the compound sits in the selected curriculum.
    pub curriculum_context: String,
    /// Everyday analogy.
    pub analogy: String,
    /// Optional fun facts. Missing or `null` reads as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub fun_facts: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// User-facing classification of a failed analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum ErrorCategory {
    /// No drawing and no text.
    Validation,
    /// Missing or invalid credential.
    Auth,
    /// Credential lacks access to the model or region.
    AccessDenied,
    /// Backend overloaded or quota exhausted.
    RateLimited,
    /// Transport failure.
    Network,
    /// Input rejected by safety filtering.
    ContentPolicy,
    /// Response body was not the declared JSON.
    MalformedResponse,
    /// Anything else, with the backend message verbatim.
    Unknown(String),
}

impl ErrorCategory {
    /// Human-readable message shown in the error banner.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation => {
                "Please draw a structure or type a compound name first.".to_string()
            }
            Self::Auth => "The API key is missing or invalid. Check your configuration.".to_string(),
            Self::AccessDenied => {
                "This API key does not have access to the model in your region.".to_string()
            }
            Self::RateLimited => {
                "The service is busy right now. Please wait a moment and try again.".to_string()
            }
            Self::Network => {
                "Could not reach the analysis service. Check your connection.".to_string()
            }
            Self::ContentPolicy => {
                "The request was blocked by content safety filters. Try a different input."
                    .to_string()
            }
            Self::MalformedResponse => {
                "The service returned an unexpected response. Please try again.".to_string()
            }
            Self::Unknown(message) => message.clone(),
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user_message())
    }
}

impl From<&CoreError> for ErrorCategory {
    fn from(err: &CoreError) -> Self {
        match err {
            CoreError::Validation(_) => Self::Validation,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// State of the most recent analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AnalysisOutcome {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A request is in flight.
    Pending,
    /// The last request succeeded.
    Succeeded(Arc<AnalysisResult>),
    /// The last request failed.
    Failed(ErrorCategory),
}

impl AnalysisOutcome {
    /// Whether a request is in flight.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// The successful result, if any.
    #[must_use]
    pub fn result(&self) -> Option<&Arc<AnalysisResult>> {
        match self {
            Self::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    /// The failure category, if any.
    #[must_use]
    pub fn error(&self) -> Option<&ErrorCategory> {
        match self {
            Self::Failed(category) => Some(category),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> serde_json::Value {
        serde_json::json!({
            "name": "Benzene",
            "iupacName": "Benzene",
            "molecularFormula": "C6H6",
            "summary": "An aromatic hydrocarbon.",
            "keyPoints": ["Planar ring", "Delocalised electrons"],
            "reactions_or_uses": ["Nitration", "Solvent"],
            "curriculumContext": "Aromatic compounds unit.",
            "analogy": "Like a ring of dancers holding hands.",
            "funFacts": ["Kekule dreamt of a snake."]
        })
    }

    #[test]
    fn test_request_requires_input() {
        for level in CurriculumLevel::ALL {
            let err = AnalysisRequest::new(None, None, level).unwrap_err();
            assert!(matches!(err, CoreError::Validation(_)));
        }
    }

    #[test]
    fn test_request_whitespace_text_is_absent() {
        let err = AnalysisRequest::new(None, Some("   "), CurriculumLevel::Board).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_request_trims_text() {
        let req = AnalysisRequest::new(None, Some("  Benzene \n"), CurriculumLevel::Foundation)
            .expect("valid");
        assert_eq!(req.text(), Some("Benzene"));
        assert!(req.image().is_none());
        assert_eq!(req.level(), CurriculumLevel::Foundation);
    }

    #[test]
    fn test_result_wire_names() {
        let result: AnalysisResult = serde_json::from_value(sample_json()).expect("parse");
        assert_eq!(result.molecular_formula, "C6H6");
        assert_eq!(result.reactions_or_uses, vec!["Nitration", "Solvent"]);

        let back = serde_json::to_value(&result).expect("serialize");
        assert_eq!(back, sample_json());
    }

    #[test]
    fn test_result_fun_facts_optional() {
        let mut json = sample_json();
        json.as_object_mut().expect("object").remove("funFacts");
        let result: AnalysisResult = serde_json::from_value(json).expect("parse");
        assert!(result.fun_facts.is_empty());
    }

    #[test]
    fn test_result_null_fun_facts_is_empty() {
        let mut json = sample_json();
        json["funFacts"] = serde_json::Value::Null;
        let result: AnalysisResult = serde_json::from_value(json).expect("parse");
        assert!(result.fun_facts.is_empty());
    }

    #[test]
    fn test_request_rejects_unsupported_image() {
        let gif = StillImage::from_bytes(b"GIF89a\x01\x00\x01\x00".to_vec());
        let err = AnalysisRequest::new(Some(gif), Some("Water"), CurriculumLevel::Board)
            .unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedImage));
        assert!(matches!(ErrorCategory::from(&err), ErrorCategory::Unknown(_)));

        let png = StillImage::from_bytes(vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
        let req = AnalysisRequest::new(Some(png), None, CurriculumLevel::Board).expect("valid");
        assert!(req.image().is_some());
    }

    #[test]
    fn test_result_missing_required_field_rejected() {
        let mut json = sample_json();
        json.as_object_mut().expect("object").remove("analogy");
        assert!(serde_json::from_value::<AnalysisResult>(json).is_err());
    }

    #[test]
    fn test_result_ignores_web_sources() {
        let mut json = sample_json();
        json["webSources"] = serde_json::json!([{"uri": "https://example.org"}]);
        assert!(serde_json::from_value::<AnalysisResult>(json).is_ok());
    }

    #[test]
    fn test_unknown_category_passes_message_through() {
        let category = ErrorCategory::Unknown("model exploded".to_string());
        assert_eq!(category.user_message(), "model exploded");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn any_level() -> impl Strategy<Value = CurriculumLevel> {
            prop::sample::select(CurriculumLevel::ALL.to_vec())
        }

        proptest! {
            #[test]
            fn prop_blank_input_always_invalid(blank in "[ \t\n]{0,12}", level in any_level()) {
                let err = AnalysisRequest::new(None, Some(&blank), level).unwrap_err();
                prop_assert!(matches!(err, CoreError::Validation(_)));
            }

            #[test]
            fn prop_text_is_trimmed(
                name in "[A-Za-z][A-Za-z0-9 ()-]{0,30}[A-Za-z0-9)]",
                pad in "[ \t]{0,4}",
                level in any_level(),
            ) {
                let raw = format!("{pad}{name}{pad}");
                let req = AnalysisRequest::new(None, Some(&raw), level).expect("valid");
                prop_assert_eq!(req.text(), Some(name.as_str()));
                prop_assert_eq!(req.level(), level);
            }
        }
    }
}
