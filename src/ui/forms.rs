//! Login and signup screens.
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::{AppState, Theme};
use crate::model::Role;
use crate::ui::components::centered_rect;
use crate::validate::Field;

fn masked(s: &str) -> String {
    "*".repeat(s.chars().count())
}

fn field_line(theme: &Theme, focused: bool, label: &str, value: String) -> Line<'static> {
    let marker = if focused { "▶ " } else { "  " };
    let style = if focused { Style::default().fg(theme.highlight_fg) } else { Style::default().fg(theme.text) };
    Line::styled(format!("{marker}{label:<18}{value}"), style)
}

pub fn render_login(f: &mut Frame, area: Rect, app: &AppState) {
    let rect = centered_rect(60, 11, area);
    let form = &app.login;
    let role = |r: Role| {
        let label = r.as_str();
        if form.role == r {
            Span::styled(format!("({label})"), Style::default().add_modifier(Modifier::BOLD))
        } else {
            Span::raw(format!(" {label} "))
        }
    };
    let marker = if form.focus == 0 { "▶ " } else { "  " };
    let mut lines = vec![
        Line::from(vec![Span::raw(format!("{marker}{:<18}", "Log in as")), role(Role::User), Span::raw(" "), role(Role::Admin)]),
        field_line(&app.theme, form.focus == 1, "Username", form.username.clone()),
        field_line(&app.theme, form.focus == 2, "Password", masked(&form.password)),
        Line::raw(""),
    ];
    if let Some(err) = form.error.as_ref() {
        lines.push(Line::styled(err.clone(), Style::default().fg(app.theme.danger)));
    }
    lines.push(Line::styled("Enter: log in  Ctrl+S: create an account", Style::default().fg(app.theme.muted)));

    let p = Paragraph::new(lines).block(
        Block::default()
            .title("Log in")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Signup form. Each field shows the reason from the latest validation pass.
pub fn render_signup(f: &mut Frame, area: Rect, app: &AppState) {
    let rect = centered_rect(76, 18, area);
    let state = &app.signup;
    let mut lines: Vec<Line> = Vec::new();
    for (idx, field) in Field::ALL.into_iter().enumerate() {
        let raw = state.form.value(field);
        let shown = match field {
            Field::Password | Field::ConfirmPassword => masked(raw),
            _ => raw.to_string(),
        };
        lines.push(field_line(&app.theme, state.focus == idx, field.label(), shown));
        let reason = state.report.as_ref().and_then(|r| r.get(field));
        lines.push(match reason {
            Some(r) => Line::styled(format!("    {}", r.message()), Style::default().fg(app.theme.danger)),
            None => Line::raw(""),
        });
    }
    let toggle = if state.form.is_admin { "[x]" } else { "[ ]" };
    lines.push(field_line(&app.theme, state.focus == Field::ALL.len(), "Admin account", toggle.to_string()));
    lines.push(Line::raw(""));
    lines.push(Line::styled("Enter: sign up  Space: toggle admin  Esc: back", Style::default().fg(app.theme.muted)));

    let p = Paragraph::new(lines).block(
        Block::default()
            .title("Sign up")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
