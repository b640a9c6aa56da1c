use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use chatsensei_core::{FeedbackMark, Style as ReplyStyle, SuggestionCard, Tone, View};
use chatsensei_core::view::{BAD_BUTTON_LABEL, USE_BUTTON_LABEL};
use unicode_width::UnicodeWidthChar;
use crate::app::{App, FocusPane, InputMode};

/// Badge colour for a detected tone
fn tone_color(tone: &Tone) -> Color {
    match tone {
        Tone::Question => Color::Blue,
        Tone::Positive => Color::Green,
        Tone::Negative => Color::Red,
        Tone::Neutral => Color::Gray,
        Tone::Other(_) => Color::Magenta,
    }
}

fn mark_color(mark: Option<FeedbackMark>) -> Color {
    match mark {
        Some(FeedbackMark::Good) => Color::Green,
        Some(FeedbackMark::Bad) => Color::Red,
        None => Color::White,
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    let error_height = if app.assistant.view().error.visible { 1 } else { 0 };
    let [input_area, button_area, error_area, results_area] = Layout::vertical([
        Constraint::Length(6),
        Constraint::Length(1),
        Constraint::Length(error_height),
        Constraint::Min(0),
    ])
    .areas(body_area);

    render_input(app, frame, input_area);
    render_button(app, frame, button_area);
    if error_height > 0 {
        render_error(app.assistant.view(), frame, error_area);
    }
    render_results(app, frame, results_area);

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let view = app.assistant.view();
    let mut spans = vec![
        Span::styled(" ChatSensei Lite ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("  "),
    ];

    // Preference weights, always from the latest server response
    for style in ReplyStyle::all() {
        spans.push(Span::raw(format!("{} ", style.emoji())));
        spans.push(Span::styled(
            view.weight(style).to_string(),
            Style::default().fg(Color::Yellow),
        ));
        spans.push(Span::raw("  "));
    }

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_style = if editing {
        Style::default().fg(Color::Yellow)
    } else if app.focus == FocusPane::Input {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(" 聊天内容 ");

    let input = app.input();
    let content = if input.is_empty() && !editing {
        Text::from(Line::from(Span::styled(
            "粘贴收到的聊天消息…",
            Style::default().fg(Color::DarkGray),
        )))
    } else {
        Text::from(input.to_string())
    };

    let paragraph = Paragraph::new(content).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);

    if editing {
        let before: String = input.chars().take(app.input_cursor).collect();
        let (col, row) = cursor_offset(&before, area.width.saturating_sub(2));
        let max_row = area.height.saturating_sub(2);
        frame.set_cursor_position((
            area.x + 1 + col,
            area.y + 1 + row.min(max_row.saturating_sub(1)),
        ));
    }
}

/// Cell position just after `text` when wrapped at `width` columns, the way
/// the input paragraph lays it out. Returns `(col, row)`.
fn cursor_offset(text: &str, width: u16) -> (u16, u16) {
    if width == 0 {
        return (0, 0);
    }

    let mut row: u16 = 0;
    let mut col: u16 = 0;
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            row += 1;
            col = 0;
        }
        for c in line.chars() {
            let w = c.width().unwrap_or(0) as u16;
            // A glyph that does not fit starts the next row
            if col + w > width {
                row += 1;
                col = 0;
            }
            col += w;
        }
    }

    if col >= width {
        (0, row + 1)
    } else {
        (col, row)
    }
}

fn render_button(app: &App, frame: &mut Frame, area: Rect) {
    let button = &app.assistant.view().analyze_button;
    let label = if button.aria_busy {
        let dots = ".".repeat(app.animation_frame as usize + 1);
        format!(" {}{} ", button.label.trim_end_matches('.'), dots)
    } else {
        format!(" {} ", button.label)
    };

    let style = if button.disabled {
        Style::default().fg(Color::DarkGray).bg(Color::Black)
    } else {
        Style::default().fg(Color::Black).bg(Color::Cyan).bold()
    };

    let mut spans = vec![Span::styled(label, style)];
    if let Some(status) = &app.status {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(status.clone(), Style::default().fg(Color::Green)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_error(view: &View, frame: &mut Frame, area: Rect) {
    let line = Line::from(Span::styled(
        view.error.message.clone(),
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

fn render_results(app: &mut App, frame: &mut Frame, area: Rect) {
    app.results_area = Some(area);
    let view = app.assistant.view();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if app.focus == FocusPane::Cards {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        })
        .title(" 建议回复 ");

    if !view.results.visible {
        let hint = Paragraph::new(Line::from(Span::styled(
            "输入聊天内容后按 Enter 分析",
            Style::default().fg(Color::DarkGray),
        )))
        .block(block);
        frame.render_widget(hint, area);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();

    if let Some(tone) = &view.results.tone {
        lines.push(Line::from(Span::styled(
            format!(" {} ", tone.badge_text()),
            Style::default().fg(Color::Black).bg(tone_color(tone)),
        )));
        lines.push(Line::default());
    }

    for (idx, card) in view.results.cards.iter().enumerate() {
        let selected = app.focus == FocusPane::Cards && idx == app.selected_card;
        lines.extend(card_lines(card, selected));
        lines.push(Line::default());
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.results_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn card_lines(card: &SuggestionCard, selected: bool) -> Vec<Line<'static>> {
    let marker = if selected { "▶ " } else { "  " };
    let heading_style = Style::default()
        .fg(mark_color(card.mark))
        .add_modifier(Modifier::BOLD);
    let heading_style = if selected {
        heading_style.add_modifier(Modifier::REVERSED)
    } else {
        heading_style
    };

    let mut lines = vec![Line::from(vec![
        Span::raw(marker),
        Span::styled(card.heading.clone(), heading_style),
    ])];

    for text_line in card.text.lines() {
        lines.push(Line::from(format!("    {}", text_line)));
    }

    let button_style = if card.controls_enabled {
        Style::default().fg(Color::White).bg(Color::Blue)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let mut footer = vec![
        Span::raw("    "),
        Span::styled(format!("[g] {}", USE_BUTTON_LABEL), button_style),
        Span::raw(" "),
        Span::styled(format!("[b] {}", BAD_BUTTON_LABEL), button_style),
    ];
    for note in &card.notes {
        footer.push(Span::raw("  "));
        footer.push(Span::styled(
            note.to_string(),
            Style::default().fg(mark_color(card.mark)).add_modifier(Modifier::ITALIC),
        ));
    }
    lines.push(Line::from(footer));
    lines
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " EDIT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    match app.input_mode {
        InputMode::Editing => hints.extend(vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" analyze ", label_style),
            Span::styled(" Alt+Enter ", key_style),
            Span::styled(" newline ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" done ", label_style),
        ]),
        InputMode::Normal => {
            hints.extend(vec![
                Span::styled(" i ", key_style),
                Span::styled(" edit ", label_style),
                Span::styled(" Enter ", key_style),
                Span::styled(" analyze ", label_style),
            ]);
            if app.has_cards() {
                hints.extend(vec![
                    Span::styled(" Tab ", key_style),
                    Span::styled(" focus ", label_style),
                    Span::styled(" j/k ", key_style),
                    Span::styled(" card ", label_style),
                    Span::styled(" g ", key_style),
                    Span::styled(" use ", label_style),
                    Span::styled(" b ", key_style),
                    Span::styled(" bad ", label_style),
                    Span::styled(" c ", key_style),
                    Span::styled(" copy ", label_style),
                ]);
            }
            hints.extend(vec![
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ]);
        }
    }

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}
