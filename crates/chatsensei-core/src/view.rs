//! UI-agnostic view model
//!
//! Everything the user can see lives here: the input field, the analyze
//! button, the error line, the results region with its suggestion cards and
//! the weight displays. Front ends draw from a [`View`] and never mutate it
//! directly; all mutation goes through the controller.

use crate::api::{format_weight, Preferences};
use crate::style::{Style, Tone};

pub const ANALYZE_LABEL: &str = "🔍 分析 & 生成建议";
pub const ANALYZE_BUSY_LABEL: &str = "⏳ 分析中...";
pub const USE_BUTTON_LABEL: &str = "使用 👍";
pub const BAD_BUTTON_LABEL: &str = "不好 👎";

/// The trigger control of the analyze flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeButton {
    pub disabled: bool,
    pub label: &'static str,
    pub aria_busy: bool,
}

impl AnalyzeButton {
    fn set_loading(&mut self, loading: bool) {
        self.disabled = loading;
        self.label = if loading { ANALYZE_BUSY_LABEL } else { ANALYZE_LABEL };
        self.aria_busy = loading;
    }
}

impl Default for AnalyzeButton {
    fn default() -> Self {
        Self {
            disabled: false,
            label: ANALYZE_LABEL,
            aria_busy: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorRegion {
    pub message: String,
    pub visible: bool,
}

/// Region last scrolled into view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Results,
    Error,
}

/// Visual outcome of a submitted feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackMark {
    Good,
    Bad,
}

impl FeedbackMark {
    pub fn from_good(good: bool) -> Self {
        if good {
            FeedbackMark::Good
        } else {
            FeedbackMark::Bad
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            FeedbackMark::Good => "feedback-good",
            FeedbackMark::Bad => "feedback-bad",
        }
    }

    pub fn note(&self) -> &'static str {
        match self {
            FeedbackMark::Good => "✓ 已记录你的偏好",
            FeedbackMark::Bad => "✓ 已记录反馈",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionCard {
    pub style: Style,
    pub heading: String,
    pub text: String,
    /// Both footer buttons share this flag.
    pub controls_enabled: bool,
    pub mark: Option<FeedbackMark>,
    pub notes: Vec<&'static str>,
}

impl SuggestionCard {
    pub fn new(style: Style, text: &str) -> Self {
        Self {
            style,
            heading: style.heading(),
            text: text.to_string(),
            controls_enabled: true,
            mark: None,
            notes: Vec::new(),
        }
    }

    pub fn is_submitted(&self) -> bool {
        self.mark.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Results {
    pub visible: bool,
    pub tone: Option<Tone>,
    pub cards: Vec<SuggestionCard>,
    /// Bumped each time the cards are regenerated.
    pub generation: u64,
}

impl Results {
    pub fn card(&self, style: Style) -> Option<&SuggestionCard> {
        self.cards.iter().find(|c| c.style == style)
    }

    pub(crate) fn card_mut(&mut self, style: Style) -> Option<&mut SuggestionCard> {
        self.cards.iter_mut().find(|c| c.style == style)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub input: String,
    pub analyze_button: AnalyzeButton,
    pub error: ErrorRegion,
    pub results: Results,
    /// Weight displays in card order.
    pub weights: [String; 3],
    pub scroll_target: Option<Region>,
}

impl View {
    pub fn new() -> Self {
        let initial = Preferences::default();
        Self {
            input: String::new(),
            analyze_button: AnalyzeButton::default(),
            error: ErrorRegion::default(),
            results: Results::default(),
            weights: Style::all().map(|s| initial.display(s)),
            scroll_target: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.analyze_button.disabled
    }

    pub fn weight(&self, style: Style) -> &str {
        &self.weights[style.index()]
    }

    pub(crate) fn set_loading(&mut self, loading: bool) {
        self.analyze_button.set_loading(loading);
    }

    pub(crate) fn show_error(&mut self, message: String) {
        self.error.message = message;
        self.error.visible = true;
        self.scroll_target = Some(Region::Error);
    }

    pub(crate) fn hide_error(&mut self) {
        self.error.visible = false;
    }

    pub(crate) fn update_weights(&mut self, preferences: &Preferences) {
        for style in Style::all() {
            self.weights[style.index()] = format_weight(preferences.get(style));
        }
    }
}

impl Default for View {
    fn default() -> Self {
        Self::new()
    }
}
