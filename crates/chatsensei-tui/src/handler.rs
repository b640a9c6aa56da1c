use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;
use chatsensei_core::{Command, Request};
use crate::app::{App, FocusPane, InputMode};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent, tx: &UnboundedSender<AppEvent>) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key, tx),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {
            // Reflowed cards can leave the old offset past the end
            app.results_scroll = 0;
        }
        AppEvent::Tick => {
            app.tick_animation();
        }
        AppEvent::Completed(completion) => app.on_completion(completion),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent, tx: &UnboundedSender<AppEvent>) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key, tx),
        InputMode::Editing => handle_editing_mode(app, key, tx),
    }
}

/// Run a command through the controller and send whatever request it
/// produced on a background task. Returns whether a request went out.
fn dispatch(app: &mut App, command: Command, tx: &UnboundedSender<AppEvent>) -> bool {
    let Some(request) = app.assistant.dispatch(command) else {
        return false;
    };
    spawn_request(app, request, tx);
    true
}

fn spawn_request(app: &App, request: Request, tx: &UnboundedSender<AppEvent>) {
    let backend = app.assistant.backend();
    let tx = tx.clone();
    tokio::spawn(async move {
        let completion = request.send(backend.as_ref()).await;
        // Receiver is gone only when the UI has shut down
        let _ = tx.send(AppEvent::Completed(completion));
    });
}

fn handle_normal_mode(app: &mut App, key: KeyEvent, tx: &UnboundedSender<AppEvent>) {
    app.status = None;

    match key.code {
        // Quit
        KeyCode::Char('q') => app.should_quit = true,

        // Edit chat input
        KeyCode::Char('i') | KeyCode::Char('/') => {
            app.input_mode = InputMode::Editing;
            app.focus = FocusPane::Input;
        }

        // Analyze
        KeyCode::Enter | KeyCode::Char('a') => {
            dispatch(app, Command::Analyze, tx);
        }

        // Tab to switch focus
        KeyCode::Tab => {
            app.focus = match app.focus {
                FocusPane::Input if app.has_cards() => FocusPane::Cards,
                _ => FocusPane::Input,
            };
        }

        // Card navigation
        KeyCode::Char('j') | KeyCode::Down => {
            if app.focus == FocusPane::Cards {
                app.card_nav_down();
            } else {
                app.scroll_down();
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if app.focus == FocusPane::Cards {
                app.card_nav_up();
            } else {
                app.scroll_up();
            }
        }

        // Half-page scroll
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.results_scroll = app.results_scroll.saturating_add(5);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.results_scroll = app.results_scroll.saturating_sub(5);
        }

        // Feedback on the selected card
        KeyCode::Char('g') | KeyCode::Char('y') => {
            let style = app.selected_style();
            if dispatch(app, Command::SubmitFeedback { style, good: true }, tx) {
                // "Use" puts the reply on the clipboard
                if let Some(card) = app.selected_card() {
                    copy_to_clipboard(card.text.clone());
                    app.status = Some("已复制到剪贴板".to_string());
                }
            }
        }
        KeyCode::Char('b') | KeyCode::Char('n') => {
            let style = app.selected_style();
            dispatch(app, Command::SubmitFeedback { style, good: false }, tx);
        }

        // Copy without feedback
        KeyCode::Char('c') => {
            if let Some(card) = app.selected_card() {
                copy_to_clipboard(card.text.clone());
                app.status = Some("已复制到剪贴板".to_string());
            }
        }

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent, tx: &UnboundedSender<AppEvent>) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        // Alt+Enter keeps multi-line transcripts possible
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => {
            app.insert_char('\n');
        }
        KeyCode::Enter => {
            if dispatch(app, Command::Analyze, tx) {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.clear_input();
        }
        KeyCode::Backspace => app.delete_back(),
        KeyCode::Delete => app.delete_forward(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::Char(c) => app.insert_char(c),
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_results = app
        .results_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);
    if !in_results {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            for _ in 0..3 {
                app.scroll_down();
            }
        }
        MouseEventKind::ScrollUp => {
            for _ in 0..3 {
                app.scroll_up();
            }
        }
        _ => {}
    }
}

/// Hand `text` to the first clipboard tool that starts. The tool runs on the
/// blocking pool so a slow `xclip` never stalls the event loop.
fn copy_to_clipboard(text: String) {
    tokio::task::spawn_blocking(move || {
        use std::io::Write;
        use std::process::{Command, Stdio};

        for (program, args) in [
            ("pbcopy", &[][..]),
            ("wl-copy", &[][..]),
            ("xclip", &["-selection", "clipboard"][..]),
        ] {
            if let Ok(mut child) = Command::new(program)
                .args(args)
                .stdin(Stdio::piped())
                .spawn()
            {
                if let Some(mut stdin) = child.stdin.take() {
                    let _ = stdin.write_all(text.as_bytes());
                }
                let _ = child.wait();
                return;
            }
        }
        tracing::debug!("no clipboard tool available");
    });
}
