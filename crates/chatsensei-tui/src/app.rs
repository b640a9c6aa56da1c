use ratatui::layout::Rect;
use chatsensei_core::{ChatAssistant, Completion, Region, Style, SuggestionCard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Input,
    Cards,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,
    pub assistant: ChatAssistant,

    // Input state
    pub input_cursor: usize,

    // Results state
    pub selected_card: usize,
    pub results_scroll: u16,
    pub results_area: Option<Rect>,

    // Transient status line (e.g. clipboard confirmation)
    pub status: Option<String>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl App {
    pub fn new(assistant: ChatAssistant) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            focus: FocusPane::Input,
            assistant,

            input_cursor: 0,

            selected_card: 0,
            results_scroll: 0,
            results_area: None,

            status: None,

            animation_frame: 0,
        }
    }

    pub fn input(&self) -> &str {
        &self.assistant.view().input
    }

    pub fn selected_style(&self) -> Style {
        Style::all()[self.selected_card.min(2)]
    }

    pub fn selected_card(&self) -> Option<&SuggestionCard> {
        self.assistant.view().results.card(self.selected_style())
    }

    pub fn has_cards(&self) -> bool {
        !self.assistant.view().results.cards.is_empty()
    }

    pub fn card_nav_down(&mut self) {
        self.selected_card = (self.selected_card + 1).min(Style::all().len() - 1);
    }

    pub fn card_nav_up(&mut self) {
        self.selected_card = self.selected_card.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.results_scroll = self.results_scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.results_scroll = self.results_scroll.saturating_sub(1);
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.assistant.view().is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Apply a finished request and follow the view's scroll target
    pub fn on_completion(&mut self, completion: Completion) {
        let analyzed = matches!(completion, Completion::Analyzed(_));
        self.assistant.apply(completion);

        if analyzed && self.assistant.view().scroll_target == Some(Region::Results) {
            self.results_scroll = 0;
            self.selected_card = 0;
            self.focus = FocusPane::Cards;
        }
    }

    // Input editing

    pub fn insert_char(&mut self, c: char) {
        let cursor = self.input_cursor;
        let input = self.assistant.input_mut();
        let byte_pos = char_to_byte_index(input, cursor);
        input.insert(byte_pos, c);
        self.input_cursor += 1;
    }

    pub fn delete_back(&mut self) {
        if self.input_cursor > 0 {
            self.input_cursor -= 1;
            let cursor = self.input_cursor;
            let input = self.assistant.input_mut();
            let byte_pos = char_to_byte_index(input, cursor);
            input.remove(byte_pos);
        }
    }

    pub fn delete_forward(&mut self) {
        let cursor = self.input_cursor;
        let input = self.assistant.input_mut();
        if cursor < input.chars().count() {
            let byte_pos = char_to_byte_index(input, cursor);
            input.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.input_cursor = self.input_cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.input().chars().count();
        self.input_cursor = (self.input_cursor + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.input_cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.input_cursor = self.input().chars().count();
    }

    pub fn clear_input(&mut self) {
        self.assistant.input_mut().clear();
        self.input_cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatsensei_core::SuggestClient;
    use std::sync::Arc;

    fn app() -> App {
        let backend = Arc::new(SuggestClient::new("http://127.0.0.1:8000"));
        App::new(ChatAssistant::new(backend))
    }

    #[test]
    fn test_char_to_byte_index_multibyte() {
        assert_eq!(char_to_byte_index("你好a", 0), 0);
        assert_eq!(char_to_byte_index("你好a", 1), 3);
        assert_eq!(char_to_byte_index("你好a", 2), 6);
        assert_eq!(char_to_byte_index("你好a", 9), 7);
    }

    #[test]
    fn test_edit_chinese_input() {
        let mut app = app();
        for c in "谢谢你".chars() {
            app.insert_char(c);
        }
        app.cursor_left();
        app.insert_char('们');
        assert_eq!(app.input(), "谢谢们你");

        app.delete_back();
        assert_eq!(app.input(), "谢谢你");

        app.cursor_home();
        app.delete_forward();
        assert_eq!(app.input(), "谢你");

        app.cursor_end();
        assert_eq!(app.input_cursor, 2);
        app.cursor_right();
        assert_eq!(app.input_cursor, 2);
    }

    #[test]
    fn test_card_navigation_clamped() {
        let mut app = app();
        app.card_nav_up();
        assert_eq!(app.selected_style(), Style::Polite);
        app.card_nav_down();
        app.card_nav_down();
        app.card_nav_down();
        assert_eq!(app.selected_style(), Style::Straightforward);
    }

    #[test]
    fn test_clear_input_resets_cursor() {
        let mut app = app();
        app.insert_char('h');
        app.insert_char('i');
        app.clear_input();
        assert_eq!(app.input(), "");
        assert_eq!(app.input_cursor, 0);
    }
}
