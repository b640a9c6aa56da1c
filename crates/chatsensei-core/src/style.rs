use serde::{Deserialize, Serialize};

/// Reply style the backend generates a suggestion for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Polite,
    Funny,
    Straightforward,
}

impl Style {
    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Polite => "polite",
            Style::Funny => "funny",
            Style::Straightforward => "straightforward",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "polite" => Some(Style::Polite),
            "funny" => Some(Style::Funny),
            "straightforward" => Some(Style::Straightforward),
            _ => None,
        }
    }

    /// Card order: polite, funny, straightforward.
    pub fn all() -> [Style; 3] {
        [Style::Polite, Style::Funny, Style::Straightforward]
    }

    pub fn index(&self) -> usize {
        match self {
            Style::Polite => 0,
            Style::Funny => 1,
            Style::Straightforward => 2,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Style::Polite => "礼貌风格",
            Style::Funny => "幽默风格",
            Style::Straightforward => "直接风格",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Style::Polite => "🎩",
            Style::Funny => "😄",
            Style::Straightforward => "💬",
        }
    }

    /// Card header, e.g. `🎩 礼貌风格`
    pub fn heading(&self) -> String {
        format!("{} {}", self.emoji(), self.display_name())
    }
}

/// Tone the backend detected in the chat.
///
/// The backend may grow new tone keys; anything outside the known set is kept
/// as [`Tone::Other`] and displayed verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tone {
    Question,
    Positive,
    Negative,
    Neutral,
    Other(String),
}

impl Tone {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "question" => Tone::Question,
            "positive" => Tone::Positive,
            "negative" => Tone::Negative,
            "neutral" => Tone::Neutral,
            other => Tone::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Tone::Question => "question",
            Tone::Positive => "positive",
            Tone::Negative => "negative",
            Tone::Neutral => "neutral",
            Tone::Other(raw) => raw,
        }
    }

    /// Friendly label with icon, or the raw key for unknown tones.
    pub fn label(&self) -> &str {
        match self {
            Tone::Question => "❓ 疑问",
            Tone::Positive => "😊 积极",
            Tone::Negative => "😔 消极",
            Tone::Neutral => "😐 中性",
            Tone::Other(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Tone::Other(_))
    }

    pub fn badge_text(&self) -> String {
        format!("检测语气: {}", self.label())
    }

    pub fn class_name(&self) -> String {
        format!("tone-badge tone-{}", self.as_str())
    }
}

impl Serialize for Tone {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Tone {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Tone::parse(&raw))
    }
}
