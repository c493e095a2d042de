//! Shared UI components (status bar, notice line, modal helpers).
//!
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::keymap::KeyAction;
use crate::app::{AppState, BOOK_FORM_FIELDS, InputMode, Screen, Theme, book_form_value};
use crate::catalog::BookForm;
use crate::notice::NoticeKind;

/// Render the bottom status bar with mode and counts.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let mode = match (app.screen, app.input_mode) {
        (Screen::Login, _) => "LOGIN",
        (Screen::Signup, _) => "SIGNUP",
        (_, InputMode::Normal) => "NORMAL",
        (_, InputMode::Search) => "SEARCH",
        (_, InputMode::Modal) => "MODAL",
    };
    let checked_out = app.books_all.iter().filter(|b| !b.available).count();
    let mut msg = format!(
        "mode: {mode}  books:{}/{}  checked out:{checked_out}  rows/page:{}",
        app.books.len(),
        app.books_all.len(),
        app.rows_per_page,
    );
    if app.is_admin() {
        msg.push_str(&format!("  users:{}", app.users_all.len()));
    }
    let p = Paragraph::new(msg).style(Style::default().fg(app.theme.status_fg).bg(app.theme.status_bg));
    f.render_widget(p, area);
}

/// One-line flash message under the header.
pub fn render_notice(f: &mut Frame, area: Rect, app: &AppState) {
    let Some(notice) = app.notice.as_ref() else {
        return;
    };
    let color = match notice.kind {
        NoticeKind::Success => app.theme.success,
        NoticeKind::Danger => app.theme.danger,
    };
    let p = Paragraph::new(notice.message.clone()).style(Style::default().fg(color).add_modifier(Modifier::BOLD));
    f.render_widget(p, area);
}

/// Selected rows are bold and highlighted; `dim` greys out the rest.
pub fn row_style(theme: &Theme, selected: bool, dim: bool) -> Style {
    match (selected, dim) {
        (true, _) => Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD),
        (false, true) => Style::default().fg(theme.muted),
        (false, false) => Style::default().fg(theme.text),
    }
}

pub fn panel(title: impl Into<String>, theme: &Theme) -> Block<'static> {
    Block::default().title(title.into()).borders(Borders::ALL).border_style(Style::default().fg(theme.border))
}

/// First index of the page holding `selected`.
pub fn page_start(selected: usize, rows_per_page: usize) -> usize {
    (selected / rows_per_page.max(1)) * rows_per_page.max(1)
}

/// Compute a rectangle centered within `area` with a maximum size.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render a generic informational modal dialog.
pub fn render_info_modal(f: &mut Frame, area: Rect, app: &AppState, message: &str) {
    let max_w = area.width.saturating_sub(6).max(30);
    let min_w = 40u16.min(max_w);
    let approx_lines = (message.len() as u16 / (min_w.saturating_sub(4).max(10))).max(1);
    let max_h = area.height.saturating_sub(6).max(5);
    let height = (approx_lines + 4).min(max_h).max(5);
    let rect = centered_rect(min_w, height, area);
    let p = Paragraph::new(message.to_string()).wrap(Wrap { trim: false }).block(
        Block::default().title("Info").borders(Borders::ALL).border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

fn key_line(label: &str, keys: String) -> Line<'static> {
    Line::from(vec![
        Span::raw(format!("{label}: ")),
        Span::styled(keys, Style::default().add_modifier(Modifier::ITALIC)),
    ])
}

/// Help modal. Catalog keys are read from the active keymap.
pub fn render_help_modal(f: &mut Frame, area: Rect, app: &AppState, scroll: u16) {
    let width = 72u16.min(area.width.saturating_sub(4)).max(40);
    let height = 22u16.min(area.height.saturating_sub(4)).max(10);
    let rect = centered_rect(width, height, area);

    let keys = |a: KeyAction| app.keymap.keys_for(a).join(" / ");
    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled("Catalog", Style::default().add_modifier(Modifier::BOLD))),
        key_line("Move", format!("{} | {}", keys(KeyAction::MoveUp), keys(KeyAction::MoveDown))),
        key_line("Page", format!("{} | {}", keys(KeyAction::PageUp), keys(KeyAction::PageDown))),
        key_line("Search (Enter applies, Esc clears)", keys(KeyAction::StartSearch)),
        key_line("Add book", keys(KeyAction::NewBook)),
        key_line("Edit book", keys(KeyAction::EditSelection)),
        key_line("Delete book / user", keys(KeyAction::DeleteSelection)),
        key_line("Check out / return", keys(KeyAction::ToggleLoan)),
    ];
    if app.is_admin() {
        lines.push(key_line("Switch Books / Users", keys(KeyAction::SwitchTab)));
    }
    lines.extend([
        key_line("Log out", keys(KeyAction::Logout)),
        key_line("Quit", keys(KeyAction::Quit)),
        Line::raw(""),
        Line::from(Span::styled("Forms", Style::default().add_modifier(Modifier::BOLD))),
        key_line("Next / previous field", "Tab / Up / Down".to_string()),
        key_line("Submit", "Enter".to_string()),
        key_line("Cancel", "Esc".to_string()),
        Line::raw(""),
        key_line("Close help", "Esc / Enter".to_string()),
    ]);

    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).scroll((scroll, 0)).block(
        Block::default().title("Help").borders(Borders::ALL).border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Yes/No confirmation. `selected` 0 is Yes.
pub fn render_confirm_modal(f: &mut Frame, area: Rect, app: &AppState, question: &str, selected: usize) {
    let width = (question.len() as u16 + 6).clamp(30, area.width.saturating_sub(4).max(30));
    let rect = centered_rect(width, 6, area);
    let option = |label: &'static str, idx: usize| {
        if idx == selected {
            Span::styled(
                format!("[{label}]"),
                Style::default().fg(app.theme.highlight_fg).bg(app.theme.highlight_bg).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::raw(format!(" {label} "))
        }
    };
    let lines = vec![
        Line::raw(question.to_string()),
        Line::raw(""),
        Line::from(vec![option("Yes", 0), Span::raw("   "), option("No", 1)]),
    ];
    let p = Paragraph::new(lines).block(
        Block::default().title("Confirm").borders(Borders::ALL).border_style(Style::default().fg(app.theme.danger)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Add-book form. Title, category and author are required.
pub fn render_book_form_modal(f: &mut Frame, area: Rect, app: &AppState, form: &BookForm, focus: usize) {
    let rect = centered_rect(64, (BOOK_FORM_FIELDS.len() + 5) as u16, area);
    let mut lines: Vec<Line> = BOOK_FORM_FIELDS
        .iter()
        .enumerate()
        .map(|(idx, label)| {
            let required = if idx < 3 { "*" } else { " " };
            let text = format!("{:<13}{}", format!("{label}{required}"), book_form_value(form, idx));
            if idx == focus {
                Line::styled(format!("▶ {text}"), Style::default().fg(app.theme.highlight_fg))
            } else {
                Line::styled(format!("  {text}"), Style::default().fg(app.theme.text))
            }
        })
        .collect();
    lines.push(Line::raw(""));
    lines.push(Line::styled("Enter: add  Tab: next field  Esc: cancel", Style::default().fg(app.theme.muted)));
    let p = Paragraph::new(lines).block(
        Block::default().title("Add book").borders(Borders::ALL).border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
