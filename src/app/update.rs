use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::time::{Duration, Instant};

use crate::app::keymap::KeyAction;
use crate::app::{
    ActiveTab, AppState, BOOK_FORM_FIELDS, InputMode, LoginForm, ModalState, Screen, SignupState,
    book_form_value_mut,
};
use crate::catalog::{BookForm, Destination};
use crate::error::CatalogError;
use crate::notice::{Notice, dismiss_expired};
use crate::render::{RowEditor, render, save_row};
use crate::search::apply_search;
use crate::ui;
use crate::validate::{Field, validate_signup};

/// Whether the event loop should keep going after a key.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    tracing::info!("event loop started");
    loop {
        dismiss_expired(&mut app.notice, Instant::now());
        terminal.draw(|f| {
            ui::render(f, app);
        })?;

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && handle_key(app, key) == Flow::Quit
        {
            break;
        }
    }
    tracing::info!(uptime_secs = app.started_at.elapsed().as_secs(), "event loop finished");
    Ok(())
}

/// Dispatch one key press according to the current screen and mode.
pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Flow {
    match app.screen {
        Screen::Login => handle_login_key(app, key),
        Screen::Signup => {
            handle_signup_key(app, key);
            Flow::Continue
        }
        Screen::Catalog => match app.input_mode {
            InputMode::Normal => handle_normal_key(app, key),
            InputMode::Search => {
                handle_search_key(app, key.code);
                Flow::Continue
            }
            InputMode::Modal => {
                handle_modal_key(app, key.code);
                Flow::Continue
            }
        },
    }
}

fn navigate(app: &mut AppState, dest: Destination) {
    app.modal = None;
    app.input_mode = InputMode::Normal;
    match dest {
        Destination::Login => app.screen = Screen::Login,
        Destination::UserHome => {
            app.screen = Screen::Catalog;
            app.active_tab = ActiveTab::Books;
        }
        Destination::AdminHome => {
            app.screen = Screen::Catalog;
            app.active_tab = ActiveTab::Users;
        }
    }
    tracing::debug!(to = dest.name(), "navigate");
}

fn handle_login_key(app: &mut AppState, key: KeyEvent) -> Flow {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('s') {
            app.signup = SignupState::default();
            app.screen = Screen::Signup;
        }
        return Flow::Continue;
    }
    let form = &mut app.login;
    match key.code {
        KeyCode::Esc => return Flow::Quit,
        KeyCode::Tab | KeyCode::Down => form.focus = (form.focus + 1) % 3,
        KeyCode::BackTab | KeyCode::Up => form.focus = (form.focus + 2) % 3,
        KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') if form.focus == 0 => {
            form.role = form.role.toggle();
        }
        KeyCode::Char(c) if form.focus == 1 => form.username.push(c),
        KeyCode::Char(c) if form.focus == 2 => form.password.push(c),
        KeyCode::Backspace if form.focus == 1 => {
            form.username.pop();
        }
        KeyCode::Backspace if form.focus == 2 => {
            form.password.pop();
        }
        KeyCode::Enter => submit_login(app),
        _ => {}
    }
    Flow::Continue
}

fn submit_login(app: &mut AppState) {
    let (role, username, password) = (
        app.login.role,
        app.login.username.clone(),
        app.login.password.clone(),
    );
    match app.catalog.login(role, &username, &password) {
        Ok(session) => {
            let dest = session.destination;
            app.notice = Some(Notice::success(format!(
                "Login as {} successful!",
                session.role.as_str()
            )));
            app.session = Some(session);
            app.login = LoginForm::default();
            app.search_query.clear();
            app.refresh();
            navigate(app, dest);
        }
        Err(e) => {
            app.login.password.clear();
            app.login.error = Some(e.to_string());
        }
    }
}

fn handle_signup_key(app: &mut AppState, key: KeyEvent) {
    let state = &mut app.signup;
    let on_text = state.focus < Field::ALL.len();
    match key.code {
        KeyCode::Esc => {
            app.screen = Screen::Login;
            return;
        }
        KeyCode::Tab | KeyCode::Down => state.focus = (state.focus + 1) % 6,
        KeyCode::BackTab | KeyCode::Up => state.focus = (state.focus + 5) % 6,
        KeyCode::Char(' ') if !on_text => state.form.is_admin = !state.form.is_admin,
        KeyCode::Char(c) if on_text => state.form.value_mut(Field::ALL[state.focus]).push(c),
        KeyCode::Backspace if on_text => {
            state.form.value_mut(Field::ALL[state.focus]).pop();
        }
        KeyCode::Enter => {
            submit_signup(app);
            return;
        }
        _ => return,
    }
    // After a failed submit, every edit re-runs the full validation pass.
    if state.report.is_some() {
        state.report = Some(validate_signup(&state.form));
    }
}

fn submit_signup(app: &mut AppState) {
    let form = app.signup.form.clone();
    match app.catalog.submit_signup(&form) {
        Ok(outcome) => {
            app.login = LoginForm {
                role: outcome.user.role(),
                username: outcome.user.username.clone(),
                focus: 2,
                ..LoginForm::default()
            };
            app.signup = SignupState::default();
            app.notice = Some(Notice::success("Signup successful, please log in"));
            app.refresh();
            navigate(app, outcome.redirect);
        }
        Err(CatalogError::ValidationFailed(report)) => {
            if let Some((field, _)) = report.errors().next() {
                app.signup.focus = field as usize;
            }
            app.signup.report = Some(report);
        }
        Err(e) => app.notice = Some(Notice::danger(e.to_string())),
    }
}

fn handle_normal_key(app: &mut AppState, key: KeyEvent) -> Flow {
    let Some(action) = app.keymap.resolve(&key) else {
        return Flow::Continue;
    };
    match action {
        KeyAction::Quit => return Flow::Quit,
        KeyAction::Ignore => {}
        KeyAction::OpenHelp => open_modal(app, ModalState::Help { scroll: 0 }),
        KeyAction::StartSearch => {
            app.search_query.clear();
            app.input_mode = InputMode::Search;
        }
        KeyAction::NewBook => {
            if app.active_tab == ActiveTab::Books {
                open_modal(
                    app,
                    ModalState::AddBook {
                        form: BookForm::default(),
                        focus: 0,
                    },
                );
            }
        }
        KeyAction::EditSelection => {
            if app.active_tab == ActiveTab::Books
                && let Some(book) = app.books.get(app.selected_book_index)
                && let Some(editor) = RowEditor::edit_row(render(&app.books), book.id)
            {
                open_modal(app, ModalState::EditBook { editor });
            }
        }
        KeyAction::DeleteSelection => match app.active_tab {
            ActiveTab::Books => {
                if let Some(book) = app.books.get(app.selected_book_index) {
                    let modal = ModalState::DeleteBookConfirm {
                        id: book.id,
                        title: book.title.clone(),
                        selected: 1,
                    };
                    open_modal(app, modal);
                }
            }
            ActiveTab::Users => {
                if let Some(user) = app.users.get(app.selected_user_index) {
                    let modal = ModalState::DeleteUserConfirm {
                        id: user.id,
                        username: user.username.clone(),
                        selected: 1,
                    };
                    open_modal(app, modal);
                }
            }
        },
        KeyAction::ToggleLoan => toggle_loan(app),
        KeyAction::SwitchTab => {
            if app.is_admin() {
                app.active_tab = match app.active_tab {
                    ActiveTab::Books => ActiveTab::Users,
                    ActiveTab::Users => ActiveTab::Books,
                };
            }
        }
        KeyAction::Logout => {
            if let Some(s) = app.session.take() {
                tracing::info!(username = %s.username, "logged out");
            }
            app.login = LoginForm::default();
            app.search_query.clear();
            apply_search(app);
            navigate(app, Destination::Login);
        }
        KeyAction::MoveUp => move_selection(app, -1),
        KeyAction::MoveDown => move_selection(app, 1),
        KeyAction::PageUp => move_selection(app, -(app.rows_per_page.max(1) as isize)),
        KeyAction::PageDown => move_selection(app, app.rows_per_page.max(1) as isize),
    }
    Flow::Continue
}

fn move_selection(app: &mut AppState, delta: isize) {
    let (len, idx) = match app.active_tab {
        ActiveTab::Books => (app.books.len(), &mut app.selected_book_index),
        ActiveTab::Users => (app.users.len(), &mut app.selected_user_index),
    };
    let max = len.saturating_sub(1) as isize;
    *idx = (*idx as isize + delta).clamp(0, max) as usize;
}

fn toggle_loan(app: &mut AppState) {
    if app.active_tab != ActiveTab::Books {
        return;
    }
    let Some(book) = app.books.get(app.selected_book_index) else {
        return;
    };
    let id = book.id;
    let result = if book.available {
        app.catalog.check_out(id)
    } else {
        app.catalog.return_book(id)
    };
    app.notice = Some(match result {
        Ok(outcome) => Notice::success(outcome.message()),
        Err(e) => Notice::danger(e.to_string()),
    });
    app.refresh();
}

fn handle_search_key(app: &mut AppState, code: KeyCode) {
    match code {
        KeyCode::Enter => {
            apply_search(app);
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Esc => {
            app.search_query.clear();
            apply_search(app);
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            app.search_query.pop();
        }
        KeyCode::Char(c) => app.search_query.push(c),
        _ => {}
    }
}

fn open_modal(app: &mut AppState, modal: ModalState) {
    app.modal = Some(modal);
    app.input_mode = InputMode::Modal;
}

fn handle_modal_key(app: &mut AppState, code: KeyCode) {
    let Some(modal) = app.modal.take() else {
        app.input_mode = InputMode::Normal;
        return;
    };
    let next = step_modal(app, modal, code);
    if next.is_none() {
        app.input_mode = InputMode::Normal;
    }
    app.modal = next;
}

/// Apply `code` to `modal`; `None` closes it.
fn step_modal(app: &mut AppState, modal: ModalState, code: KeyCode) -> Option<ModalState> {
    match modal {
        ModalState::AddBook { mut form, mut focus } => {
            let n = BOOK_FORM_FIELDS.len();
            match code {
                KeyCode::Esc => return None,
                KeyCode::Tab | KeyCode::Down => focus = (focus + 1) % n,
                KeyCode::BackTab | KeyCode::Up => focus = (focus + n - 1) % n,
                KeyCode::Char(c) => book_form_value_mut(&mut form, focus).push(c),
                KeyCode::Backspace => {
                    book_form_value_mut(&mut form, focus).pop();
                }
                KeyCode::Enter => match app.catalog.submit_book_form(&form) {
                    Ok(_) => {
                        app.notice = Some(Notice::success("Book Added"));
                        app.refresh();
                        app.selected_book_index = app.books.len().saturating_sub(1);
                        return None;
                    }
                    Err(CatalogError::MissingField(_)) => {
                        app.notice = Some(Notice::danger("Please fill in all fields"));
                    }
                    Err(e) => app.notice = Some(Notice::danger(e.to_string())),
                },
                _ => {}
            }
            Some(ModalState::AddBook { form, focus })
        }
        ModalState::EditBook { mut editor } => {
            match code {
                KeyCode::Esc => return None,
                KeyCode::Tab | KeyCode::Down => editor.focus_next(),
                KeyCode::BackTab | KeyCode::Up => editor.focus_prev(),
                KeyCode::Char(c) => editor.push(c),
                KeyCode::Backspace => editor.pop(),
                KeyCode::Enter => {
                    let result = save_row(&mut app.catalog, &editor);
                    let done = match result {
                        Ok(_) => {
                            app.notice = Some(Notice::success("Book Updated"));
                            true
                        }
                        Err(CatalogError::MissingField(_)) => {
                            app.notice = Some(Notice::danger("Please fill in all fields"));
                            false
                        }
                        Err(e) => {
                            app.notice = Some(Notice::danger(e.to_string()));
                            true
                        }
                    };
                    if done {
                        app.refresh();
                        return None;
                    }
                }
                _ => {}
            }
            Some(ModalState::EditBook { editor })
        }
        ModalState::DeleteBookConfirm { id, title, mut selected } => {
            match code {
                KeyCode::Esc => return None,
                KeyCode::Left | KeyCode::Right | KeyCode::Tab => selected = 1 - selected,
                KeyCode::Enter => {
                    if selected == 0 {
                        app.notice = Some(match app.catalog.remove_book(id) {
                            Ok(()) => Notice::success("Book Removed"),
                            Err(e) => Notice::danger(e.to_string()),
                        });
                        app.refresh();
                    }
                    return None;
                }
                _ => {}
            }
            Some(ModalState::DeleteBookConfirm { id, title, selected })
        }
        ModalState::DeleteUserConfirm { id, username, mut selected } => {
            match code {
                KeyCode::Esc => return None,
                KeyCode::Left | KeyCode::Right | KeyCode::Tab => selected = 1 - selected,
                KeyCode::Enter => {
                    if selected == 0 {
                        app.notice = Some(match app.catalog.delete_user(id) {
                            Ok(()) => Notice::success(format!("User {username} Removed")),
                            Err(e) => Notice::danger(e.to_string()),
                        });
                        app.refresh();
                    }
                    return None;
                }
                _ => {}
            }
            Some(ModalState::DeleteUserConfirm { id, username, selected })
        }
        ModalState::Help { scroll } => match code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => None,
            KeyCode::Up | KeyCode::Char('k') => Some(ModalState::Help {
                scroll: scroll.saturating_sub(1),
            }),
            KeyCode::Down | KeyCode::Char('j') => Some(ModalState::Help {
                scroll: scroll.saturating_add(1),
            }),
            _ => Some(ModalState::Help { scroll }),
        },
        ModalState::Info { message } => match code {
            KeyCode::Esc | KeyCode::Enter => None,
            _ => Some(ModalState::Info { message }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;
    use crate::validate::{Reason, SignupForm};

    fn press(app: &mut AppState, code: KeyCode) -> Flow {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(app: &mut AppState, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn with_accounts() -> AppState {
        let mut app = AppState::in_memory();
        for (username, is_admin) in [("root", true), ("alice", false)] {
            app.catalog
                .submit_signup(&SignupForm {
                    full_name: "Test Person".into(),
                    username: username.into(),
                    email: format!("{username}@example.com"),
                    password: "Secret1!".into(),
                    confirm_password: "Secret1!".into(),
                    is_admin,
                })
                .unwrap();
        }
        app.refresh();
        app
    }

    fn login(app: &mut AppState, role: Role, username: &str) {
        app.login.role = role;
        app.login.focus = 1;
        type_str(app, username);
        press(app, KeyCode::Tab);
        type_str(app, "Secret1!");
        press(app, KeyCode::Enter);
    }

    #[test]
    fn admin_login_lands_on_users_tab() {
        let mut app = with_accounts();
        login(&mut app, Role::Admin, "root");
        assert_eq!(app.screen, Screen::Catalog);
        assert_eq!(app.active_tab, ActiveTab::Users);
        assert!(app.is_admin());
        assert_eq!(app.users.len(), 1);
    }

    #[test]
    fn wrong_role_keeps_login_screen_with_error() {
        let mut app = with_accounts();
        login(&mut app, Role::User, "root");
        assert_eq!(app.screen, Screen::Login);
        assert!(app.login.error.is_some());
        assert!(app.login.password.is_empty());
    }

    #[test]
    fn signup_flow_reports_then_clears_errors() {
        let mut app = AppState::in_memory();
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        assert_eq!(app.screen, Screen::Signup);
        type_str(&mut app, "Ada");
        press(&mut app, KeyCode::Enter);
        let report = app.signup.report.clone().unwrap();
        assert_eq!(report.get(Field::FullName), Some(Reason::EnterFirstAndLastName));
        assert_eq!(app.signup.focus, 0);

        type_str(&mut app, " Lovelace");
        assert_eq!(app.signup.report.as_ref().unwrap().get(Field::FullName), None);
        for (value, _) in [("ada", 1), ("ada@example.com", 2), ("Abcdef1!", 3), ("Abcdef1!", 4)] {
            press(&mut app, KeyCode::Tab);
            type_str(&mut app, value);
        }
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::Login);
        assert_eq!(app.login.username, "ada");
        assert_eq!(app.catalog.users().unwrap().len(), 1);
    }

    #[test]
    fn add_book_requires_fields_then_succeeds() {
        let mut app = with_accounts();
        login(&mut app, Role::User, "alice");
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.input_mode, InputMode::Modal);
        type_str(&mut app, "Dune");
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.modal, Some(ModalState::AddBook { .. })));
        assert_eq!(app.notice.as_ref().unwrap().message, "Please fill in all fields");

        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "SF");
        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "Herbert");
        press(&mut app, KeyCode::Enter);
        assert!(app.modal.is_none());
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.books.len(), 1);
        assert_eq!(app.notice.as_ref().unwrap().message, "Book Added");
    }

    #[test]
    fn edit_delete_and_loan_on_selected_book() {
        let mut app = with_accounts();
        login(&mut app, Role::User, "alice");
        for (t, a) in [("Emma", "Austen"), ("Dune", "Herbert")] {
            app.catalog
                .submit_book_form(&BookForm {
                    title: t.into(),
                    category: "fiction".into(),
                    author: a.into(),
                    ..Default::default()
                })
                .unwrap();
        }
        app.refresh();

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('e'));
        type_str(&mut app, " Messiah");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.books[1].title, "Dune Messiah");

        press(&mut app, KeyCode::Char('c'));
        assert!(!app.books[1].available);
        press(&mut app, KeyCode::Char('c'));
        assert!(app.books[1].available);

        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.books.len(), 1);
        assert_eq!(app.books[0].title, "Dune Messiah");
    }

    #[test]
    fn admin_deletes_user_from_filtered_view() {
        let mut app = with_accounts();
        login(&mut app, Role::Admin, "root");
        press(&mut app, KeyCode::Delete);
        assert!(matches!(app.modal, Some(ModalState::DeleteUserConfirm { .. })));
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Enter);
        let names: Vec<String> = app.catalog.users().unwrap().into_iter().map(|u| u.username).collect();
        assert_eq!(names, vec!["root"]);
        assert!(app.users.is_empty());
    }

    #[test]
    fn users_tab_is_admin_only_and_logout_returns_to_login() {
        let mut app = with_accounts();
        login(&mut app, Role::User, "alice");
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.active_tab, ActiveTab::Books);
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL));
        assert_eq!(app.screen, Screen::Login);
        assert!(app.session.is_none());
        assert_eq!(press(&mut app, KeyCode::Esc), Flow::Quit);
    }

    #[test]
    fn search_mode_filters_on_enter() {
        let mut app = with_accounts();
        login(&mut app, Role::User, "alice");
        for t in ["Emma", "Dune"] {
            app.catalog
                .submit_book_form(&BookForm {
                    title: t.into(),
                    category: "fiction".into(),
                    author: "Someone".into(),
                    ..Default::default()
                })
                .unwrap();
        }
        app.refresh();
        press(&mut app, KeyCode::Char('/'));
        type_str(&mut app, "du");
        assert_eq!(app.books.len(), 2);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.books.len(), 1);
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.books.len(), 2);
    }
}
