//! Wire types for the suggestion backend.
//!
//! Field names match the backend's JSON exactly.

use serde::{Deserialize, Serialize};

use crate::style::{Style, Tone};

/// Body of `POST /suggest`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub chat: String,
}

/// Success body of `POST /suggest`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalysisResponse {
    pub tone: Tone,
    pub suggestions: Suggestions,
    pub preferences: Preferences,
}

/// One suggestion per style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestions {
    pub polite: String,
    pub funny: String,
    pub straightforward: String,
}

impl Suggestions {
    pub fn get(&self, style: Style) -> &str {
        match style {
            Style::Polite => &self.polite,
            Style::Funny => &self.funny,
            Style::Straightforward => &self.straightforward,
        }
    }
}

/// Server-side preference weight per style.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    pub polite: f64,
    pub funny: f64,
    pub straightforward: f64,
}

impl Preferences {
    pub fn get(&self, style: Style) -> f64 {
        match style {
            Style::Polite => self.polite,
            Style::Funny => self.funny,
            Style::Straightforward => self.straightforward,
        }
    }

    /// Weight rendered with one decimal place, e.g. `2` -> `"2.0"`.
    pub fn display(&self, style: Style) -> String {
        format_weight(self.get(style))
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            polite: 1.0,
            funny: 1.0,
            straightforward: 1.0,
        }
    }
}

pub fn format_weight(value: f64) -> String {
    format!("{:.1}", value)
}

/// Body of `POST /feedback`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub chosen_style: Style,
    pub good: bool,
}

/// Success body of `POST /feedback`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedbackResponse {
    pub preferences: Preferences,
}

/// FastAPI-style error envelope; `detail` is not guaranteed.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_request_wire_format() {
        let req = FeedbackRequest {
            chosen_style: Style::Straightforward,
            good: false,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"chosen_style": "straightforward", "good": false})
        );
    }

    #[test]
    fn test_analysis_response_parses_backend_body() {
        let body = r#"{
            "tone": "positive",
            "suggestions": {
                "polite": "感谢你的分享！我也很高兴听到这个！",
                "funny": "哈哈，我也很高兴听到这个！ 😂",
                "straightforward": "我也很高兴听到这个！"
            },
            "preferences": {"polite": 1.0, "funny": 2, "straightforward": 1.5}
        }"#;
        let resp: AnalysisResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.tone, Tone::Positive);
        assert_eq!(resp.suggestions.get(Style::Funny), "哈哈，我也很高兴听到这个！ 😂");
        assert_eq!(resp.preferences.display(Style::Funny), "2.0");
        assert_eq!(resp.preferences.display(Style::Straightforward), "1.5");
    }

    #[test]
    fn test_analysis_response_missing_field_fails() {
        let body = r#"{"tone": "neutral", "preferences": {"polite": 1, "funny": 1, "straightforward": 1}}"#;
        assert!(serde_json::from_str::<AnalysisResponse>(body).is_err());
    }

    #[test]
    fn test_format_weight_one_decimal() {
        assert_eq!(format_weight(2.0), "2.0");
        assert_eq!(format_weight(2.333), "2.3");
        assert_eq!(format_weight(3.0), "3.0");
        assert_eq!(format_weight(10.0), "10.0");
    }
}
