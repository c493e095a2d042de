//! Application state types and entry glue.
//!
//! Defines enums and structs that model the TUI state, helpers to construct
//! it over any key-value backend, and the event loop (re-exported as `run`).
//!
pub mod keymap;
pub mod update;

use ratatui::style::Color;
use std::path::Path;
use std::time::Instant;

use crate::catalog::{BookForm, Catalog, Session, UserRow};
use crate::model::{BookRecord, RecordId, Role};
use crate::notice::Notice;
use crate::render::RowEditor;
use crate::store::KeyValueStore;
use crate::validate::{SignupForm, SignupReport};

pub type Backend = Box<dyn KeyValueStore>;

/// Which page the user is on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    Login,
    Signup,
    Catalog,
}

/// Tabs of the catalog screen. `Users` is only reachable by admins.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ActiveTab {
    Books,
    Users,
}

/// Current input mode for key handling on the catalog screen.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Modal,
}

/// Color palette for theming the TUI.
#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub text: Color,
    pub muted: Color,
    pub title: Color,
    pub border: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub success: Color,
    pub danger: Color,
}

const THEME_KEYS: [&str; 12] = [
    "text",
    "muted",
    "title",
    "border",
    "header_bg",
    "header_fg",
    "status_bg",
    "status_fg",
    "highlight_fg",
    "highlight_bg",
    "success",
    "danger",
];

impl Theme {
    /// Dark default theme.
    pub fn dark() -> Self {
        Self {
            text: Color::Gray,
            muted: Color::DarkGray,
            title: Color::Cyan,
            border: Color::Gray,
            header_bg: Color::Black,
            header_fg: Color::Cyan,
            status_bg: Color::DarkGray,
            status_fg: Color::Black,
            highlight_fg: Color::Yellow,
            highlight_bg: Color::Reset,
            success: Color::Green,
            danger: Color::Red,
        }
    }

    /// Catppuccin Mocha theme defaults.
    pub fn mocha() -> Self {
        // Palette reference: https://github.com/catppuccin/catppuccin
        Self {
            text: Color::Rgb(0xcd, 0xd6, 0xf4),         // text
            muted: Color::Rgb(0x7f, 0x84, 0x9c),        // overlay1
            title: Color::Rgb(0xcb, 0xa6, 0xf7),        // mauve
            border: Color::Rgb(0x58, 0x5b, 0x70),       // surface2
            header_bg: Color::Rgb(0x31, 0x32, 0x44),    // surface0
            header_fg: Color::Rgb(0xb4, 0xbe, 0xfe),    // lavender
            status_bg: Color::Rgb(0x45, 0x47, 0x5a),    // surface1
            status_fg: Color::Rgb(0xcd, 0xd6, 0xf4),    // text
            highlight_fg: Color::Rgb(0xf9, 0xe2, 0xaf), // yellow
            highlight_bg: Color::Rgb(0x45, 0x47, 0x5a), // surface1
            success: Color::Rgb(0xa6, 0xe3, 0xa1),      // green
            danger: Color::Rgb(0xf3, 0x8b, 0xa8),       // red
        }
    }

    fn slot(&mut self, key: &str) -> Option<&mut Color> {
        Some(match key {
            "text" => &mut self.text,
            "muted" => &mut self.muted,
            "title" => &mut self.title,
            "border" => &mut self.border,
            "header_bg" => &mut self.header_bg,
            "header_fg" => &mut self.header_fg,
            "status_bg" => &mut self.status_bg,
            "status_fg" => &mut self.status_fg,
            "highlight_fg" => &mut self.highlight_fg,
            "highlight_bg" => &mut self.highlight_bg,
            "success" => &mut self.success,
            "danger" => &mut self.danger,
            _ => return None,
        })
    }

    /// Load theme from a simple key=value file. Unknown or missing keys fall back to `mocha`.
    pub fn from_file(path: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let mut theme = Self::mocha();

        for raw_line in contents.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else {
                continue;
            };
            if let (Some(color), Some(slot)) = (Self::parse_color(val), theme.slot(key.trim())) {
                *slot = color;
            }
        }

        Some(theme)
    }

    /// Parse a color from hex ("#RRGGBB" or "RRGGBB") or "reset".
    fn parse_color(s: &str) -> Option<Color> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "reset" {
            return Some(Color::Reset);
        }
        let hex = lower.strip_prefix('#').unwrap_or(&lower);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        Some(Color::Rgb(byte(0)?, byte(2)?, byte(4)?))
    }

    fn color_to_str(c: Color) -> String {
        match c {
            Color::Rgb(r, g, b) => format!("#{:02X}{:02X}{:02X}", r, g, b),
            Color::Reset => "reset".to_string(),
            // Named colors get a best-effort hex approximation
            Color::Black => "#000000".to_string(),
            Color::Red => "#FF0000".to_string(),
            Color::Green => "#00FF00".to_string(),
            Color::Yellow => "#FFFF00".to_string(),
            Color::Cyan => "#00FFFF".to_string(),
            Color::Gray => "#B3B3B3".to_string(),
            Color::DarkGray => "#4D4D4D".to_string(),
            Color::White => "#FFFFFF".to_string(),
            other => format!("{:?}", other),
        }
    }

    /// Persist the theme to a config file in key=value format.
    pub fn write_file(&self, path: &Path) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# library-catalog theme configuration\n");
        buf.push_str("# Colors: hex as #RRGGBB or RRGGBB, or 'reset'\n\n");
        let mut copy = *self;
        for key in THEME_KEYS {
            if let Some(c) = copy.slot(key) {
                let _ = writeln!(&mut buf, "{} = {}", key, Self::color_to_str(*c));
            }
        }
        std::fs::write(path, buf)
    }

    /// Load the theme at `path`, writing the default there first if it is missing.
    pub fn load_or_init(path: &Path) -> Self {
        if path.exists() {
            return Self::from_file(path).unwrap_or_else(Self::mocha);
        }
        let t = Self::mocha();
        if let Err(e) = t.write_file(path) {
            tracing::warn!(path = %path.display(), error = %e, "could not write default theme");
        }
        t
    }
}

/// Login form: role selector plus credentials.
#[derive(Clone, Debug)]
pub struct LoginForm {
    pub role: Role,
    pub username: String,
    pub password: String,
    /// 0 = role, 1 = username, 2 = password.
    pub focus: usize,
    pub error: Option<String>,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self {
            role: Role::User,
            username: String::new(),
            password: String::new(),
            focus: 1,
            error: None,
        }
    }
}

/// Signup form plus the error slots from the last validation pass.
#[derive(Clone, Debug, Default)]
pub struct SignupState {
    pub form: SignupForm,
    /// 0..=4 are the text fields, 5 is the admin toggle.
    pub focus: usize,
    pub report: Option<SignupReport>,
}

/// Labels of the add-book form, in focus order.
pub const BOOK_FORM_FIELDS: [&str; 5] = ["Title", "Category", "Author", "Description", "Image"];

pub fn book_form_value(form: &BookForm, index: usize) -> &str {
    match index {
        0 => &form.title,
        1 => &form.category,
        2 => &form.author,
        3 => &form.description,
        _ => &form.image,
    }
}

pub fn book_form_value_mut(form: &mut BookForm, index: usize) -> &mut String {
    match index {
        0 => &mut form.title,
        1 => &mut form.category,
        2 => &mut form.author,
        3 => &mut form.description,
        _ => &mut form.image,
    }
}

/// Modal dialogs on the catalog screen.
#[derive(Clone, Debug)]
pub enum ModalState {
    AddBook {
        form: BookForm,
        focus: usize,
    },
    EditBook {
        editor: RowEditor,
    },
    DeleteBookConfirm {
        id: RecordId,
        title: String,
        selected: usize,
    },
    DeleteUserConfirm {
        id: RecordId,
        username: String,
        selected: usize,
    },
    Help {
        scroll: u16,
    },
    Info {
        message: String,
    },
}

pub struct AppState {
    pub started_at: Instant,
    pub catalog: Catalog<Backend>,
    pub screen: Screen,
    pub session: Option<Session>,
    pub active_tab: ActiveTab,
    pub books_all: Vec<BookRecord>,
    pub books: Vec<BookRecord>,
    pub users_all: Vec<UserRow>,
    pub users: Vec<UserRow>,
    pub selected_book_index: usize,
    pub selected_user_index: usize,
    pub rows_per_page: usize,
    pub input_mode: InputMode,
    pub search_query: String,
    pub theme: Theme,
    pub keymap: keymap::Keymap,
    pub modal: Option<ModalState>,
    pub notice: Option<Notice>,
    pub login: LoginForm,
    pub signup: SignupState,
}

impl AppState {
    /// Build the state over `backend`. Collections that fail to load are
    /// shown as empty with a warning notice.
    pub fn new(backend: Backend, theme: Theme, keymap: keymap::Keymap) -> Self {
        let (catalog, warnings) = Catalog::open(backend);
        let mut app = Self {
            started_at: Instant::now(),
            catalog,
            screen: Screen::Login,
            session: None,
            active_tab: ActiveTab::Books,
            books_all: Vec::new(),
            books: Vec::new(),
            users_all: Vec::new(),
            users: Vec::new(),
            selected_book_index: 0,
            selected_user_index: 0,
            rows_per_page: 10,
            input_mode: InputMode::Normal,
            search_query: String::new(),
            theme,
            keymap,
            modal: None,
            notice: None,
            login: LoginForm::default(),
            signup: SignupState::default(),
        };
        app.refresh();
        if let Some(w) = warnings.first() {
            app.notice = Some(Notice::danger(w.to_string()));
        }
        app
    }

    /// State over an in-memory backend with default theme and keys.
    pub fn in_memory() -> Self {
        Self::new(
            Box::new(crate::store::MemoryStore::new()),
            Theme::dark(),
            keymap::Keymap::default(),
        )
    }

    pub fn is_admin(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.role.is_admin())
    }

    /// Re-read both collections from the store and re-apply the search.
    pub fn refresh(&mut self) {
        let (books, book_warning) = self.catalog.store().load_or_empty::<BookRecord>();
        self.books_all = books;
        self.users_all = match self.catalog.user_rows() {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(error = %e, "treating users as empty");
                self.notice = Some(Notice::danger(e.to_string()));
                Vec::new()
            }
        };
        if let Some(w) = book_warning {
            self.notice = Some(Notice::danger(w.to_string()));
        }
        crate::search::apply_search(self);
    }
}

/// Re-export the application event loop entry function.
pub use update::run_app as run;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_parse_color_accepts_hex_and_reset() {
        assert_eq!(Theme::parse_color("#102030"), Some(Color::Rgb(0x10, 0x20, 0x30)));
        assert_eq!(Theme::parse_color("A0B0C0"), Some(Color::Rgb(0xa0, 0xb0, 0xc0)));
        assert_eq!(Theme::parse_color("Reset"), Some(Color::Reset));
        assert_eq!(Theme::parse_color("#12345"), None);
        assert_eq!(Theme::parse_color("zzzzzz"), None);
        assert_eq!(Theme::parse_color("a€bc"), None);
        assert_eq!(Theme::parse_color("+1+2+3"), None);
    }

    #[test]
    fn theme_file_with_non_ascii_value_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme.conf");
        std::fs::write(&path, "text = a€bc\ntitle = #102030\n").unwrap();
        let theme = Theme::load_or_init(&path);
        assert_eq!(theme.text, Theme::mocha().text);
        assert_eq!(theme.title, Color::Rgb(0x10, 0x20, 0x30));
    }

    #[test]
    fn new_state_starts_on_login_with_empty_lists() {
        let app = AppState::in_memory();
        assert_eq!(app.screen, Screen::Login);
        assert!(app.books.is_empty());
        assert!(app.notice.is_none());
        assert!(!app.is_admin());
    }

    #[test]
    fn corrupt_books_surface_a_notice() {
        let mut backend = crate::store::MemoryStore::new();
        backend.set("books", "[{broken".to_string()).unwrap();
        let app = AppState::new(Box::new(backend), Theme::dark(), keymap::Keymap::default());
        assert!(app.books_all.is_empty());
        let notice = app.notice.expect("warning notice");
        assert!(notice.message.contains("books"));
    }
}
