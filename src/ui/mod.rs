pub mod books;
pub mod components;
pub mod forms;
pub mod users;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{ActiveTab, AppState, InputMode, ModalState, Screen};

pub fn render(f: &mut Frame, app: &mut AppState) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1), Constraint::Min(5), Constraint::Length(1)].as_ref())
        .split(f.area());

    render_header(f, root[0], app);
    components::render_notice(f, root[1], app);

    match app.screen {
        Screen::Login => forms::render_login(f, root[2], app),
        Screen::Signup => forms::render_signup(f, root[2], app),
        Screen::Catalog => {
            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(65), Constraint::Percentage(35)].as_ref())
                .split(root[2]);
            match app.active_tab {
                ActiveTab::Books => {
                    books::render_books_table(f, body[0], app);
                    books::render_book_details(f, body[1], app);
                }
                ActiveTab::Users => {
                    users::render_users_table(f, body[0], app);
                    users::render_user_details(f, body[1], app);
                }
            }
        }
    }

    components::render_status_bar(f, root[3], app);

    if app.modal.is_some() {
        let area = f.area();
        render_modal(f, area, app);
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &AppState) {
    let who = app
        .session
        .as_ref()
        .map(|s| format!("{} ({})", s.username, s.role.as_str()))
        .unwrap_or_else(|| "not signed in".to_string());
    let line = match app.screen {
        Screen::Login => format!("{who}  | Tab: next field; Space: toggle role; Enter: log in; Ctrl+S: sign up; Esc: quit"),
        Screen::Signup => format!("{who}  | Tab: next field; Space: toggle admin; Enter: sign up; Esc: back"),
        Screen::Catalog => {
            let tabs = match (app.active_tab, app.is_admin()) {
                (ActiveTab::Books, true) => "[Books]  Users",
                (ActiveTab::Users, true) => "Books  [Users]",
                _ => "[Books]",
            };
            let prompt = match app.input_mode {
                InputMode::Search => format!("  Search: {}", app.search_query),
                _ => String::new(),
            };
            format!(
                "{who}  {tabs}{prompt}  books:{}  | /: search; n: new; e: edit; d: delete; c: check out/return; ?: help; q: quit",
                app.books.len()
            )
        }
    };
    let p = Paragraph::new(line)
        .block(
            Block::default()
                .title("library-catalog")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .style(Style::default().fg(app.theme.header_fg).bg(app.theme.header_bg));
    f.render_widget(p, area);
}

fn render_modal(f: &mut Frame, area: Rect, app: &AppState) {
    if let Some(state) = app.modal.as_ref() {
        match state {
            ModalState::AddBook { form, focus } => components::render_book_form_modal(f, area, app, form, *focus),
            ModalState::EditBook { editor } => books::render_edit_modal(f, area, app, editor),
            ModalState::DeleteBookConfirm { title, selected, .. } => {
                components::render_confirm_modal(f, area, app, &format!("Delete book '{title}'?"), *selected)
            }
            ModalState::DeleteUserConfirm { username, selected, .. } => {
                components::render_confirm_modal(f, area, app, &format!("Delete user '{username}'?"), *selected)
            }
            ModalState::Help { scroll } => components::render_help_modal(f, area, app, *scroll),
            ModalState::Info { message } => components::render_info_modal(f, area, app, message),
        }
    }
}
