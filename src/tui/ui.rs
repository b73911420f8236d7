use crate::miniapp::models::{MAX_COUNT, MIN_COUNT};
use crate::miniapp::session::StatusKind;
use crate::miniapp::shortcuts::{EMPTY_HINT, display_safe};
use crate::tui::app::{App, Haptic, Modal};
use crate::tui::focus::Field;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap},
};

const LABEL_WIDTH: usize = 13;
const SLIDER_WIDTH: usize = 30;

pub fn draw(frame: &mut Frame, app: &App) {
    let button_visible = app.is_available(Field::MainButton);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),                                     // Header
            Constraint::Length(8),                                     // Form
            Constraint::Min(7),                                        // Shortcuts
            Constraint::Length(4),                                     // Status
            Constraint::Length(if button_visible { 3 } else { 0 }),    // Main button
            Constraint::Length(3),                                     // Footer
        ])
        .split(frame.size());

    draw_header(frame, chunks[0], app);
    draw_form(frame, chunks[1], app);
    draw_shortcuts(frame, chunks[2], app);
    draw_status(frame, chunks[3], app);
    if button_visible {
        draw_main_button(frame, chunks[4], app);
    }
    draw_footer(frame, chunks[5], app);

    if app.help_mode {
        draw_help_window(frame);
    }
    if let Some(modal) = &app.modal {
        draw_modal(frame, app, modal);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let user = match app.form.user_id() {
        Some(id) => format!("user {}", id),
        None => "anonymous".to_string(),
    };
    let header = Paragraph::new(format!("Copy VK posts to Telegram ({})", user))
        .block(Block::default().borders(Borders::ALL).title("postcopy"))
        .style(Style::default().fg(app.theme.accent));

    frame.render_widget(header, area);
}

fn field_style(app: &App, field: Field) -> Style {
    let editing = app.edit.as_ref().is_some_and(|edit| edit.field == field);
    if editing {
        Style::default()
            .bg(Color::Blue)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else if app.focus.field == field {
        Style::default()
            .fg(app.theme.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.text)
    }
}

fn field_value(app: &App, field: Field) -> String {
    if let Some(edit) = app.edit.as_ref().filter(|edit| edit.field == field) {
        let (before_cursor, after_cursor) = edit.split_at_cursor();
        return format!("{}█{}", before_cursor, after_cursor);
    }
    if let Some(date_field) = field.date() {
        return format!("◂ {} ▸", app.form.date(date_field).format("%Y-%m-%d"));
    }
    match field {
        Field::CountSlider => slider_bar(app.form.count_range()),
        _ => display_safe(&app.field_text(field)),
    }
}

fn slider_bar(value: u32) -> String {
    let span = (MAX_COUNT - MIN_COUNT) as usize;
    let filled = (value - MIN_COUNT) as usize * SLIDER_WIDTH / span;
    format!(
        "{}{} {}",
        "━".repeat(filled),
        "─".repeat(SLIDER_WIDTH - filled),
        value
    )
}

fn field_line(app: &App, field: Field) -> Line<'static> {
    let marker = if app.focus.field == field { "›" } else { " " };
    let label = format!("{} {:<width$}", marker, field.label(), width = LABEL_WIDTH);
    Line::from(vec![
        Span::styled(label, Style::default().fg(app.theme.hint)),
        Span::styled(field_value(app, field), field_style(app, field)),
    ])
}

fn draw_form(frame: &mut Frame, area: Rect, app: &App) {
    let lines: Vec<Line> = [
        Field::GroupId,
        Field::StartDate,
        Field::EndDate,
        Field::Count,
        Field::CountSlider,
        Field::TargetChat,
    ]
    .into_iter()
    .map(|field| field_line(app, field))
    .collect();

    let form = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Copy"));
    frame.render_widget(form, area);
}

fn draw_shortcuts(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::ALL).title("Shortcuts");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Name
            Constraint::Length(1), // Id
            Constraint::Length(1), // Save
            Constraint::Min(0),    // List or hint
        ])
        .split(inner);

    frame.render_widget(Paragraph::new(field_line(app, Field::ShortcutName)), chunks[0]);
    frame.render_widget(Paragraph::new(field_line(app, Field::ShortcutId)), chunks[1]);

    let save_marker = if app.focus.field == Field::SaveShortcut { "›" } else { " " };
    let save = Paragraph::new(Line::from(vec![
        Span::raw(format!("{} {:<width$}", save_marker, "", width = LABEL_WIDTH)),
        Span::styled("[ Save shortcut ]", field_style(app, Field::SaveShortcut)),
    ]));
    frame.render_widget(save, chunks[2]);

    let view = app.shortcuts.view();
    if !view.list_visible() {
        let hint = Paragraph::new(EMPTY_HINT)
            .style(Style::default().fg(app.theme.hint))
            .wrap(Wrap { trim: true });
        frame.render_widget(hint, chunks[3]);
        return;
    }

    let items: Vec<ListItem> = view
        .rows
        .iter()
        .map(|shortcut| {
            ListItem::new(Line::from(vec![
                Span::styled(display_safe(&shortcut.name), Style::default().fg(app.theme.text)),
                Span::styled(
                    format!("  {}", display_safe(&shortcut.id)),
                    Style::default().fg(app.theme.hint),
                ),
            ]))
        })
        .collect();

    let focused = app.focus.field == Field::ShortcutList;
    let list = List::new(items).highlight_style(if focused {
        Style::default()
            .bg(app.theme.accent)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    });

    let mut list_state = ListState::default();
    if focused {
        list_state.select(Some(app.focus.shortcut_index));
    }
    frame.render_stateful_widget(list, chunks[3], &mut list_state);
}

fn draw_status(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::ALL).title("Status");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    let Some(status) = app.session.status() else {
        let idle = Paragraph::new("Fill in the form and start copying.")
            .style(Style::default().fg(app.theme.hint));
        frame.render_widget(idle, chunks[0]);
        return;
    };

    let color = match status.kind {
        StatusKind::Working => app.theme.accent,
        StatusKind::Done => app.theme.success,
        StatusKind::Failed => app.theme.error,
    };
    let line = Paragraph::new(format!("{} {}", status.glyph, status.text))
        .style(Style::default().fg(color));
    frame.render_widget(line, chunks[0]);

    if let Some(progress) = app.session.progress() {
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(app.theme.accent))
            .percent(progress.percent())
            .label(progress.label());
        frame.render_widget(gauge, chunks[1]);
    }
}

fn draw_main_button(frame: &mut Frame, area: Rect, app: &App) {
    let button = app.session.main_button();
    let mut style = Style::default()
        .bg(app.theme.accent)
        .fg(Color::Black)
        .add_modifier(Modifier::BOLD);
    if app.focus.field == Field::MainButton {
        style = style.add_modifier(Modifier::REVERSED);
    }

    let paragraph = Paragraph::new(button.text)
        .alignment(Alignment::Center)
        .style(style)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, app: &App) {
    let hints = if app.edit.is_some() {
        "EDIT MODE | Enter: confirm | Esc: cancel | ←→: cursor | Ctrl+W: delete word"
    } else {
        "↑↓/Tab: move | Enter: edit/select | ←→ PgUp/PgDn: adjust | d: delete | Ctrl+S: start | ?: help | q: quit"
    };

    let mut spans = Vec::new();
    if let Some(haptic) = app.haptic {
        let (glyph, color) = match haptic {
            Haptic::Light => ("•", app.theme.accent),
            Haptic::Success => ("✓", app.theme.success),
            Haptic::Warning => ("!", app.theme.error),
        };
        spans.push(Span::styled(
            format!("{} ", glyph),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    }
    spans.push(Span::raw(hints));

    let footer = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Yellow));

    frame.render_widget(footer, area);
}

fn draw_modal(frame: &mut Frame, app: &App, modal: &Modal) {
    let (title, text, hint, color) = match modal {
        Modal::Alert(message) => (" Notice ", message.clone(), "Enter: OK", app.theme.error),
        Modal::Confirm(pending) => (" Confirm ", pending.prompt(), "y: Yes | n: No", app.theme.accent),
    };

    let paragraph = Paragraph::new(vec![
        Line::from(display_safe(&text)),
        Line::from(""),
        Line::from(Span::styled(hint, Style::default().fg(app.theme.hint))),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(Style::default().fg(color)),
    )
    .style(Style::default().fg(app.theme.text))
    .wrap(Wrap { trim: true });

    let area = centered_rect(60, 25, frame.size());
    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn draw_help_window(frame: &mut Frame) {
    let help_text = vec![
        "postcopy - Keyboard Commands",
        "",
        "NAVIGATION:",
        "  ↑↓ / Tab / Shift+Tab   Move between fields",
        "  Enter                  Edit field, pick shortcut, press button",
        "",
        "DATES AND COUNT:",
        "  ←→                     One day / one post",
        "  PgUp / PgDn            One month / ten posts",
        "  t                      Set date to today",
        "",
        "SHORTCUTS:",
        "  Enter on a saved entry Fill the community field",
        "  d / Delete             Delete the highlighted entry",
        "",
        "OTHER:",
        "  Ctrl+S                 Press the main button",
        "  ?                      Show this help (press ? or Esc to close)",
        "  q / Ctrl+C             Quit application",
    ];

    let help_paragraph = Paragraph::new(help_text.join("\n"))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help - Keyboard Commands ")
                .style(Style::default().fg(Color::Yellow)),
        )
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: false });

    let area = centered_rect(80, 70, frame.size());

    frame.render_widget(Clear, area);
    frame.render_widget(help_paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::MemoryChannel;
    use crate::miniapp::form::FormController;
    use crate::miniapp::shortcuts::ShortcutStore;
    use crate::miniapp::storage::MemoryStorage;
    use crate::tui::theme::Theme;
    use ratatui::{Terminal, backend::TestBackend};

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    fn test_app() -> (App, MemoryChannel) {
        let channel = MemoryChannel::default();
        let form = FormController::new(None, None);
        let shortcuts = ShortcutStore::load(Box::new(MemoryStorage::new()));
        let app = App::new(form, shortcuts, Box::new(channel.clone()), Theme::default());
        (app, channel)
    }

    #[test]
    fn test_slider_bar_bounds() {
        assert!(slider_bar(MIN_COUNT).starts_with("─"));
        assert!(slider_bar(MAX_COUNT).ends_with("━ 100"));
    }

    #[test]
    fn test_idle_screen_shows_hint_and_button() {
        let (app, _) = test_app();
        let screen = render(&app);
        assert!(screen.contains("No saved communities yet"));
        assert!(screen.contains("Start copying"));
    }

    #[test]
    fn test_processing_hides_button_and_shows_progress() {
        let (mut app, channel) = test_app();
        app.form.group_id = "durov".to_string();
        app.press_main_button();
        channel.push_inbound(r#"{"type":"progress","current":3,"total":10}"#);
        app.drain_host_messages();

        let screen = render(&app);
        assert!(!screen.contains("Start copying"));
        assert!(screen.contains("3/10"));
    }

    #[test]
    fn test_shortcut_list_replaces_hint() {
        let (mut app, _) = test_app();
        app.shortcuts.add("Durov channel", "durov").unwrap();

        let screen = render(&app);
        assert!(screen.contains("Durov channel"));
        assert!(!screen.contains("No saved communities yet"));
    }
}
