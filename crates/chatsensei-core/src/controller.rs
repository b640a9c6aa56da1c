//! The chat assistant controller.
//!
//! User actions arrive as [`Command`]s. Each flow is split into a synchronous
//! `begin_*` step, which updates the [`View`] and hands back the [`Request`]
//! to send, and a `finish_*` step that applies the [`Completion`]. Front ends
//! that must stay responsive send requests on a background task and feed the
//! completion back through [`ChatAssistant::apply`]; the async
//! [`ChatAssistant::analyze`] and [`ChatAssistant::submit_feedback`] run both
//! steps inline.

use std::sync::Arc;

use crate::api::{AnalysisRequest, AnalysisResponse, Backend, FeedbackRequest, FeedbackResponse};
use crate::error::{ClientError, Result};
use crate::style::Style;
use crate::view::{FeedbackMark, Region, SuggestionCard, View};

/// A user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Analyze,
    SubmitFeedback { style: Style, good: bool },
}

/// Identifies one rendered card. Cards from an older generation are gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardRef {
    pub generation: u64,
    pub style: Style,
}

/// A request that passed its guards and is ready to send.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Suggest(AnalysisRequest),
    Feedback {
        card: CardRef,
        request: FeedbackRequest,
    },
}

impl Request {
    pub async fn send(self, backend: &dyn Backend) -> Completion {
        match self {
            Request::Suggest(request) => Completion::Analyzed(backend.suggest(&request).await),
            Request::Feedback { card, request } => {
                let result = backend.feedback(&request).await;
                Completion::FeedbackSent {
                    card,
                    good: request.good,
                    result,
                }
            }
        }
    }
}

/// Result of a sent request, to be applied to the view.
#[derive(Debug, Clone)]
pub enum Completion {
    Analyzed(Result<AnalysisResponse>),
    FeedbackSent {
        card: CardRef,
        good: bool,
        result: Result<FeedbackResponse>,
    },
}

pub struct ChatAssistant {
    view: View,
    backend: Arc<dyn Backend>,
}

impl ChatAssistant {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            view: View::new(),
            backend,
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn backend(&self) -> Arc<dyn Backend> {
        Arc::clone(&self.backend)
    }

    /// The input field is the one part of the view the user edits directly.
    pub fn input_mut(&mut self) -> &mut String {
        &mut self.view.input
    }

    pub fn set_input(&mut self, text: &str) {
        self.view.input = text.to_string();
    }

    /// Run the synchronous half of a command. `None` means nothing needs to
    /// be sent, either because a guard rejected it or validation failed.
    pub fn dispatch(&mut self, command: Command) -> Option<Request> {
        match command {
            Command::Analyze => self.begin_analyze().map(Request::Suggest),
            Command::SubmitFeedback { style, good } => self
                .begin_feedback(style, good)
                .map(|(card, request)| Request::Feedback { card, request }),
        }
    }

    pub fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::Analyzed(result) => self.finish_analyze(result),
            Completion::FeedbackSent { card, good, result } => {
                self.finish_feedback(card, good, result)
            }
        }
    }

    pub fn begin_analyze(&mut self) -> Option<AnalysisRequest> {
        // The button is disabled while a request is in flight
        if self.view.is_loading() {
            tracing::debug!("analyze ignored, request already in flight");
            return None;
        }

        let chat = self.view.input.trim();
        if chat.is_empty() {
            tracing::info!("analyze rejected, empty input");
            self.view.show_error(ClientError::Validation.to_string());
            return None;
        }
        let request = AnalysisRequest {
            chat: chat.to_string(),
        };

        self.view.hide_error();
        self.view.set_loading(true);
        tracing::info!(chars = request.chat.chars().count(), "analyzing chat");
        Some(request)
    }

    pub fn finish_analyze(&mut self, result: Result<AnalysisResponse>) {
        match result {
            Ok(response) => self.render_results(response),
            Err(err) => {
                tracing::warn!(error = %err, "analyze failed");
                self.view.show_error(format!("错误: {}", err));
            }
        }
        self.view.set_loading(false);
    }

    fn render_results(&mut self, response: AnalysisResponse) {
        let results = &mut self.view.results;
        results.generation += 1;
        results.cards = Style::all()
            .iter()
            .map(|&style| SuggestionCard::new(style, response.suggestions.get(style)))
            .collect();
        tracing::info!(
            tone = response.tone.as_str(),
            generation = results.generation,
            "rendered suggestions"
        );
        results.tone = Some(response.tone);
        results.visible = true;

        self.view.update_weights(&response.preferences);
        self.view.scroll_target = Some(Region::Results);
    }

    pub fn begin_feedback(&mut self, style: Style, good: bool) -> Option<(CardRef, FeedbackRequest)> {
        let generation = self.view.results.generation;
        let card = self.view.results.card_mut(style)?;
        if !card.controls_enabled {
            return None;
        }
        card.controls_enabled = false;

        tracing::info!(style = style.as_str(), good, "submitting feedback");
        Some((
            CardRef { generation, style },
            FeedbackRequest {
                chosen_style: style,
                good,
            },
        ))
    }

    pub fn finish_feedback(&mut self, card: CardRef, good: bool, result: Result<FeedbackResponse>) {
        let current = card.generation == self.view.results.generation;
        if !current {
            tracing::debug!(
                style = card.style.as_str(),
                generation = card.generation,
                "feedback completed for a card that is no longer shown"
            );
        }

        match result {
            Ok(response) => {
                self.view.update_weights(&response.preferences);
                if let Some(target) = self.current_card(card, current) {
                    let mark = FeedbackMark::from_good(good);
                    target.mark = Some(mark);
                    target.notes.push(mark.note());
                }
            }
            Err(err) => {
                tracing::warn!(style = card.style.as_str(), error = %err, "feedback failed");
                self.view.show_error(format!("反馈提交失败: {}", err));
                if let Some(target) = self.current_card(card, current) {
                    target.controls_enabled = true;
                }
            }
        }
    }

    fn current_card(&mut self, card: CardRef, current: bool) -> Option<&mut SuggestionCard> {
        if current {
            self.view.results.card_mut(card.style)
        } else {
            None
        }
    }

    /// Validate, send and render in one go. Errors are shown in the view and
    /// also returned so one-shot callers can report them.
    pub async fn analyze(&mut self) -> Result<()> {
        let Some(request) = self.begin_analyze() else {
            return if self.view.is_loading() {
                Ok(())
            } else {
                Err(ClientError::Validation)
            };
        };

        let result = self.backend.suggest(&request).await;
        let outcome = result.as_ref().map(|_| ()).map_err(Clone::clone);
        self.finish_analyze(result);
        outcome
    }

    /// Send feedback for the card of `style` in the current results. Does
    /// nothing if that card is missing or already submitted.
    pub async fn submit_feedback(&mut self, style: Style, good: bool) -> Result<()> {
        let Some((card, request)) = self.begin_feedback(style, good) else {
            return Ok(());
        };

        let result = self.backend.feedback(&request).await;
        let outcome = result.as_ref().map(|_| ()).map_err(Clone::clone);
        self.finish_feedback(card, good, result);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Preferences, Suggestions};
    use crate::style::Tone;
    use crate::view::ANALYZE_LABEL;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// In-memory backend that records calls and replays canned results.
    #[derive(Default)]
    struct FakeBackend {
        suggest_calls: Mutex<Vec<AnalysisRequest>>,
        feedback_calls: Mutex<Vec<FeedbackRequest>>,
        suggest_result: Mutex<Option<Result<AnalysisResponse>>>,
        feedback_result: Mutex<Option<Result<FeedbackResponse>>>,
    }

    impl FakeBackend {
        fn with_suggest(result: Result<AnalysisResponse>) -> Self {
            let backend = Self::default();
            *backend.suggest_result.lock().unwrap() = Some(result);
            backend
        }

        fn set_feedback(&self, result: Result<FeedbackResponse>) {
            *self.feedback_result.lock().unwrap() = Some(result);
        }

        fn suggest_count(&self) -> usize {
            self.suggest_calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Backend for FakeBackend {
        async fn suggest(&self, request: &AnalysisRequest) -> Result<AnalysisResponse> {
            self.suggest_calls.lock().unwrap().push(request.clone());
            self.suggest_result
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Err(ClientError::Request("no canned response".to_string())))
        }

        async fn feedback(&self, request: &FeedbackRequest) -> Result<FeedbackResponse> {
            self.feedback_calls.lock().unwrap().push(request.clone());
            self.feedback_result
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Err(ClientError::Request("no canned response".to_string())))
        }
    }

    fn response(tone: &str) -> AnalysisResponse {
        AnalysisResponse {
            tone: Tone::parse(tone),
            suggestions: Suggestions {
                polite: "感谢你的分享！我明白了。".to_string(),
                funny: "哈哈，我明白了。 😂".to_string(),
                straightforward: "我明白了。".to_string(),
            },
            preferences: Preferences {
                polite: 2.0,
                funny: 1.0,
                straightforward: 1.5,
            },
        }
    }

    fn assistant(backend: FakeBackend) -> (ChatAssistant, Arc<FakeBackend>) {
        let backend = Arc::new(backend);
        let assistant = ChatAssistant::new(backend.clone());
        (assistant, backend)
    }

    #[tokio::test]
    async fn test_empty_input_never_calls_backend() {
        let (mut assistant, backend) = assistant(FakeBackend::with_suggest(Ok(response("neutral"))));

        for input in ["", "   ", "\n\t "] {
            assistant.set_input(input);
            let err = assistant.analyze().await.unwrap_err();
            assert_eq!(err, ClientError::Validation);
            assert!(assistant.view().error.visible);
            assert_eq!(assistant.view().error.message, "请先输入聊天内容！");
            assert!(!assistant.view().is_loading());
        }
        assert_eq!(backend.suggest_count(), 0);
    }

    #[tokio::test]
    async fn test_analyze_renders_three_cards_in_order() {
        let (mut assistant, backend) = assistant(FakeBackend::with_suggest(Ok(response("question"))));
        assistant.set_input("  明天有空吗？ ");

        assistant.analyze().await.unwrap();

        let view = assistant.view();
        let styles: Vec<Style> = view.results.cards.iter().map(|c| c.style).collect();
        assert_eq!(styles, vec![Style::Polite, Style::Funny, Style::Straightforward]);
        assert_eq!(view.results.cards[0].text, "感谢你的分享！我明白了。");
        assert_eq!(view.results.cards[1].text, "哈哈，我明白了。 😂");
        assert_eq!(view.results.cards[2].text, "我明白了。");
        assert_eq!(view.results.cards[0].heading, "🎩 礼貌风格");
        assert!(view.results.visible);
        assert_eq!(view.scroll_target, Some(Region::Results));
        assert_eq!(view.weights, ["2.0", "1.0", "1.5"]);

        let calls = backend.suggest_calls.lock().unwrap();
        assert_eq!(calls[0].chat, "明天有空吗？");
    }

    #[tokio::test]
    async fn test_tone_badge_known_and_unknown() {
        for (raw, expected) in [
            ("question", "检测语气: ❓ 疑问"),
            ("positive", "检测语气: 😊 积极"),
            ("negative", "检测语气: 😔 消极"),
            ("neutral", "检测语气: 😐 中性"),
            ("sarcastic", "检测语气: sarcastic"),
        ] {
            let (mut assistant, _) = assistant(FakeBackend::with_suggest(Ok(response(raw))));
            assistant.set_input("hello");
            assistant.analyze().await.unwrap();
            let tone = assistant.view().results.tone.clone().unwrap();
            assert_eq!(tone.badge_text(), expected);
            assert_eq!(tone.class_name(), format!("tone-badge tone-{}", raw));
        }
    }

    #[tokio::test]
    async fn test_loading_cleared_on_success_and_failure() {
        let (mut assistant, _) = assistant(FakeBackend::with_suggest(Ok(response("neutral"))));
        assistant.set_input("hi");
        let request = assistant.begin_analyze().unwrap();
        assert_eq!(request.chat, "hi");
        assert!(assistant.view().is_loading());
        assert!(assistant.view().analyze_button.aria_busy);
        assistant.finish_analyze(Ok(response("neutral")));
        assert!(!assistant.view().is_loading());
        assert_eq!(assistant.view().analyze_button.label, ANALYZE_LABEL);

        assistant.begin_analyze().unwrap();
        assistant.finish_analyze(Err(ClientError::Request("boom".to_string())));
        assert!(!assistant.view().is_loading());
        assert_eq!(assistant.view().analyze_button.label, ANALYZE_LABEL);
    }

    #[tokio::test]
    async fn test_analyze_ignored_while_loading() {
        let (mut assistant, _) = assistant(FakeBackend::default());
        assistant.set_input("hi");
        assert!(assistant.dispatch(Command::Analyze).is_some());
        assert!(assistant.dispatch(Command::Analyze).is_none());
    }

    #[tokio::test]
    async fn test_server_error_detail_is_prefixed() {
        let (mut assistant, _) = assistant(FakeBackend::with_suggest(Err(ClientError::Request(
            "server overloaded".to_string(),
        ))));
        assistant.set_input("hi");

        assert!(assistant.analyze().await.is_err());

        let view = assistant.view();
        assert!(view.error.visible);
        assert_eq!(view.error.message, "错误: server overloaded");
        assert_eq!(view.scroll_target, Some(Region::Error));
        assert!(!view.is_loading());
    }

    #[tokio::test]
    async fn test_failed_analyze_keeps_previous_results() {
        let (mut assistant, backend) = assistant(FakeBackend::with_suggest(Ok(response("positive"))));
        assistant.set_input("great news");
        assistant.analyze().await.unwrap();

        *backend.suggest_result.lock().unwrap() = Some(Err(ClientError::Request("down".to_string())));
        assistant.analyze().await.unwrap_err();

        let view = assistant.view();
        assert_eq!(view.results.cards.len(), 3);
        assert_eq!(view.results.tone, Some(Tone::Positive));
    }

    #[tokio::test]
    async fn test_next_analyze_clears_error() {
        let (mut assistant, _) = assistant(FakeBackend::with_suggest(Ok(response("neutral"))));
        assistant.analyze().await.unwrap_err();
        assert!(assistant.view().error.visible);

        assistant.set_input("ok");
        assistant.analyze().await.unwrap();
        assert!(!assistant.view().error.visible);
    }

    #[tokio::test]
    async fn test_feedback_success_marks_card_once() {
        let (mut assistant, backend) = assistant(FakeBackend::with_suggest(Ok(response("neutral"))));
        backend.set_feedback(Ok(FeedbackResponse {
            preferences: Preferences {
                polite: 3.0,
                funny: 1.0,
                straightforward: 1.5,
            },
        }));
        assistant.set_input("hi");
        assistant.analyze().await.unwrap();

        let (card, request) = assistant.begin_feedback(Style::Polite, true).unwrap();
        assert_eq!(request.chosen_style, Style::Polite);
        assert!(request.good);
        let polite = assistant.view().results.card(Style::Polite).unwrap();
        assert!(!polite.controls_enabled);

        // Second click on the same card is impossible
        assert!(assistant.dispatch(Command::SubmitFeedback { style: Style::Polite, good: false }).is_none());

        let completion = Request::Feedback { card, request }.send(backend.as_ref()).await;
        assistant.apply(completion);

        let view = assistant.view();
        let polite = view.results.card(Style::Polite).unwrap();
        assert_eq!(polite.mark, Some(FeedbackMark::Good));
        assert_eq!(polite.mark.unwrap().class_name(), "feedback-good");
        assert_eq!(polite.notes, vec!["✓ 已记录你的偏好"]);
        assert!(!polite.controls_enabled);
        assert_eq!(view.weights, ["3.0", "1.0", "1.5"]);
        assert_eq!(backend.feedback_calls.lock().unwrap().len(), 1);

        // Other cards untouched
        let funny = view.results.card(Style::Funny).unwrap();
        assert!(funny.controls_enabled);
        assert!(funny.notes.is_empty());
    }

    #[tokio::test]
    async fn test_bad_feedback_note() {
        let (mut assistant, backend) = assistant(FakeBackend::with_suggest(Ok(response("neutral"))));
        backend.set_feedback(Ok(FeedbackResponse {
            preferences: Preferences::default(),
        }));
        assistant.set_input("hi");
        assistant.analyze().await.unwrap();

        assistant.submit_feedback(Style::Funny, false).await.unwrap();

        let funny = assistant.view().results.card(Style::Funny).unwrap();
        assert_eq!(funny.mark, Some(FeedbackMark::Bad));
        assert_eq!(funny.notes, vec!["✓ 已记录反馈"]);
        let calls = backend.feedback_calls.lock().unwrap();
        assert_eq!(calls[0], FeedbackRequest { chosen_style: Style::Funny, good: false });
    }

    #[tokio::test]
    async fn test_feedback_failure_reenables_card() {
        let (mut assistant, backend) = assistant(FakeBackend::with_suggest(Ok(response("neutral"))));
        backend.set_feedback(Err(ClientError::Request("反馈提交失败".to_string())));
        assistant.set_input("hi");
        assistant.analyze().await.unwrap();

        assert!(assistant.submit_feedback(Style::Straightforward, true).await.is_err());

        let view = assistant.view();
        let card = view.results.card(Style::Straightforward).unwrap();
        assert!(card.controls_enabled);
        assert!(card.mark.is_none());
        assert!(card.notes.is_empty());
        assert_eq!(view.error.message, "反馈提交失败: 反馈提交失败");
        assert_eq!(view.weights, ["2.0", "1.0", "1.5"]);
    }

    #[tokio::test]
    async fn test_stale_feedback_only_updates_weights() {
        let (mut assistant, _) = assistant(FakeBackend::with_suggest(Ok(response("neutral"))));
        assistant.set_input("hi");
        assistant.analyze().await.unwrap();

        let (card, _) = assistant.begin_feedback(Style::Polite, true).unwrap();
        assistant.analyze().await.unwrap();

        assistant.finish_feedback(
            card,
            true,
            Ok(FeedbackResponse {
                preferences: Preferences {
                    polite: 5.0,
                    funny: 1.0,
                    straightforward: 1.0,
                },
            }),
        );

        let view = assistant.view();
        let polite = view.results.card(Style::Polite).unwrap();
        assert!(polite.controls_enabled);
        assert!(polite.mark.is_none());
        assert_eq!(view.weight(Style::Polite), "5.0");
    }

    #[tokio::test]
    async fn test_feedback_without_results_is_noop() {
        let (mut assistant, backend) = assistant(FakeBackend::default());
        assistant.submit_feedback(Style::Polite, true).await.unwrap();
        assert!(backend.feedback_calls.lock().unwrap().is_empty());
    }
}
