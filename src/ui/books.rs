use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Cell, Clear, Paragraph, Row, Table, Wrap};

use crate::app::AppState;
use crate::render::{COLUMNS, RowEditor, render};
use crate::ui::components::{centered_rect, page_start, panel, row_style};

pub fn render_books_table(f: &mut Frame, area: Rect, app: &mut AppState) {
    let body_height = area.height.saturating_sub(3) as usize;
    if body_height > 0 { app.rows_per_page = body_height; }

    let start = page_start(app.selected_book_index, app.rows_per_page);
    let selected = app.selected_book_index;
    let theme = app.theme;

    let rows = render(&app.books).skip(start).take(app.rows_per_page).map(|r| {
        let style = row_style(&theme, r.position == selected, !r.available);
        let [title, category, author, _] = r.cells;
        let status = if r.available { "yes" } else { "out" };
        Row::new(vec![Cell::from(title), Cell::from(category), Cell::from(author), Cell::from(status)]).style(style)
    });

    let widths = [Constraint::Percentage(40), Constraint::Percentage(20), Constraint::Percentage(28), Constraint::Length(6)];
    let header = Row::new(vec![COLUMNS[0], COLUMNS[1], COLUMNS[2], "Avail"])
        .style(Style::default().fg(theme.title).add_modifier(Modifier::BOLD));

    let title = if app.search_query.is_empty() { "Books".to_string() } else { format!("Books (filter: {})", app.search_query) };
    let table = Table::new(rows, widths)
        .header(header)
        .block(panel(title, &theme))
        .column_spacing(1);

    f.render_widget(table, area);
}

pub fn render_book_details(f: &mut Frame, area: Rect, app: &AppState) {
    let text = match app.books.get(app.selected_book_index) {
        Some(b) => format!(
            "Title: {}\nCategory: {}\nAuthor: {}\nDescription: {}\nImage: {}\nAvailable: {}",
            b.title,
            b.category,
            b.author,
            b.description.as_deref().unwrap_or("-"),
            b.image.as_deref().unwrap_or("-"),
            if b.available { "yes" } else { "checked out" },
        ),
        None => "No books yet. Press n to add one.".to_string(),
    };
    let p = Paragraph::new(text).wrap(Wrap { trim: false }).style(Style::default().fg(app.theme.text)).block(panel("Details", &app.theme));
    f.render_widget(p, area);
}

/// Row editor shown as a modal: one line per editable cell.
pub fn render_edit_modal(f: &mut Frame, area: Rect, app: &AppState, editor: &RowEditor) {
    let rect = centered_rect(64, 10, area);
    let mut body = String::new();
    for (idx, (label, value)) in COLUMNS.iter().zip(editor.cells.iter()).enumerate() {
        let marker = if idx == editor.focus { "▶" } else { " " };
        body.push_str(&format!("{marker} {label:<12} {value}\n"));
    }
    body.push_str("\nEnter: save  Tab: next cell  Esc: cancel");
    let p = Paragraph::new(body).block(panel("Edit book", &app.theme));
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
