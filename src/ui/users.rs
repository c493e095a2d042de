use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Paragraph, Row, Table};

use crate::app::AppState;
use crate::ui::components::{page_start, panel, row_style};

/// Admin user-management table. Admin accounts are not listed.
pub fn render_users_table(f: &mut Frame, area: Rect, app: &mut AppState) {
    let visible = area.height.saturating_sub(3) as usize;
    if visible > 0 {
        app.rows_per_page = visible;
    }
    let start = page_start(app.selected_user_index, app.rows_per_page);
    let theme = app.theme;

    let rows: Vec<Row> = app
        .users
        .iter()
        .enumerate()
        .skip(start)
        .take(app.rows_per_page)
        .map(|(pos, u)| {
            Row::new([
                (pos + 1).to_string(),
                u.username.clone(),
                u.full_name.clone(),
                u.email.clone(),
            ])
            .style(row_style(&theme, pos == app.selected_user_index, false))
        })
        .collect();

    let table = Table::new(
        rows,
        [Constraint::Length(4), Constraint::Percentage(25), Constraint::Percentage(30), Constraint::Percentage(45)],
    )
    .header(Row::new(["#", "Username", "Full name", "Email"]).style(Style::default().fg(theme.title).add_modifier(Modifier::BOLD)))
    .block(panel(format!("Users ({})", app.users.len()), &theme))
    .column_spacing(1);
    f.render_widget(table, area);
}

pub fn render_user_details(f: &mut Frame, area: Rect, app: &AppState) {
    let text = match app.users.get(app.selected_user_index) {
        Some(u) => format!("Username: {}\nFull name: {}\nEmail: {}\n\nd / Delete: remove this user", u.username, u.full_name, u.email),
        None => "No registered users.".to_string(),
    };
    let p = Paragraph::new(text).style(Style::default().fg(app.theme.text)).block(panel("Details", &app.theme));
    f.render_widget(p, area);
}
