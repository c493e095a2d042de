// Integration tests for library-catalog

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use library_catalog::CatalogError;
use library_catalog::app::keymap::{KeyAction, Keymap};
use library_catalog::app::update::{Flow, handle_key};
use library_catalog::app::{AppState, Screen, Theme};
use library_catalog::catalog::{BookForm, Catalog, Destination};
use library_catalog::model::Role;
use library_catalog::store::{FileStore, MemoryStore};
use library_catalog::validate::SignupForm;

fn signup_form(username: &str, is_admin: bool) -> SignupForm {
    SignupForm {
        full_name: "Grace Hopper".into(),
        username: username.into(),
        email: format!("{username}@navy.mil"),
        password: "Secret1!".into(),
        confirm_password: "Secret1!".into(),
        is_admin,
    }
}

fn press(app: &mut AppState, code: KeyCode) -> Flow {
    handle_key(app, KeyEvent::new(code, KeyModifiers::NONE))
}

fn type_str(app: &mut AppState, s: &str) {
    for c in s.chars() {
        press(app, KeyCode::Char(c));
    }
}

// 1) Theme and keymap config roundtrip and init
#[test]
fn theme_and_keymap_load_or_init_create_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let theme_path = dir.path().join("theme.conf");
    let keys_path = dir.path().join("keybinds.conf");

    let t = Theme::load_or_init(&theme_path);
    assert!(theme_path.exists());
    let t2 = Theme::from_file(&theme_path).expect("read theme");
    assert_eq!(format!("{:?}", t.text), format!("{:?}", t2.text));
    assert_eq!(format!("{:?}", t.danger), format!("{:?}", t2.danger));

    let _ = Keymap::load_or_init(&keys_path);
    assert!(keys_path.exists());
    std::fs::write(&keys_path, "NewBook = a\nBogus = z\n").unwrap();
    let km = Keymap::load_or_init(&keys_path);
    let a = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
    assert_eq!(km.resolve(&a), Some(KeyAction::NewBook));
}

// 2) Data written through FileStore survives a reopen
#[test]
fn file_store_persists_books_and_users_across_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    {
        let (mut catalog, warnings) = Catalog::open(FileStore::new(dir.path()));
        assert!(warnings.is_empty());
        catalog
            .submit_book_form(&BookForm {
                title: "Dune".into(),
                category: "SF".into(),
                author: "Herbert".into(),
                ..Default::default()
            })
            .unwrap();
        catalog.submit_signup(&signup_form("grace", false)).unwrap();
    }
    let (catalog, warnings) = Catalog::open(FileStore::new(dir.path()));
    assert!(warnings.is_empty());
    let books = catalog.books().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "Dune");
    assert!(books[0].available);
    assert_eq!(catalog.login(Role::User, "grace", "Secret1!").unwrap().destination, Destination::UserHome);

    let raw = std::fs::read_to_string(dir.path().join("books.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(doc["version"], 1);
    assert_eq!(doc["records"][0]["title"], "Dune");
}

// 3) Signup grows users by one; login respects role
#[test]
fn signup_then_login_by_role() {
    let (mut catalog, _) = Catalog::open(MemoryStore::new());
    let before = catalog.users().unwrap().len();
    let outcome = catalog.submit_signup(&signup_form("root", true)).unwrap();
    assert_eq!(outcome.redirect, Destination::Login);
    let users = catalog.users().unwrap();
    assert_eq!(users.len(), before + 1);
    assert_eq!(users.last(), Some(&outcome.user));

    let admin = catalog.login(Role::Admin, "root", "Secret1!").unwrap();
    assert_eq!(admin.destination, Destination::AdminHome);

    catalog.submit_signup(&signup_form("plain", false)).unwrap();
    assert!(matches!(
        catalog.login(Role::Admin, "plain", "Secret1!"),
        Err(CatalogError::InvalidCredentials)
    ));
    // Admins are not listed in the management table.
    let rows = catalog.user_rows().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].username, "plain");
}

// 4) Invalid signup stores nothing
#[test]
fn invalid_signup_is_rejected_without_writing() {
    let (mut catalog, _) = Catalog::open(MemoryStore::new());
    let mut form = signup_form("grace", false);
    form.confirm_password = "Other1!x".into();
    assert!(matches!(catalog.submit_signup(&form), Err(CatalogError::ValidationFailed(_))));
    assert!(catalog.users().unwrap().is_empty());
}

// 5) Key-driven flow: signup, login, add a book, log out
#[test]
fn keyboard_flow_from_login_to_catalog() {
    let mut app = AppState::in_memory();
    app.catalog.submit_signup(&signup_form("reader", false)).unwrap();
    app.refresh();

    type_str(&mut app, "reader");
    press(&mut app, KeyCode::Tab);
    type_str(&mut app, "Secret1!");
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.screen, Screen::Catalog);
    assert!(!app.is_admin());

    press(&mut app, KeyCode::Char('n'));
    type_str(&mut app, "Emma");
    press(&mut app, KeyCode::Tab);
    type_str(&mut app, "Novel");
    press(&mut app, KeyCode::Tab);
    type_str(&mut app, "Austen");
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.books.len(), 1);
    assert_eq!(app.books[0].author, "Austen");
    assert_eq!(app.notice.as_ref().map(|n| n.message.as_str()), Some("Book Added"));

    handle_key(&mut app, KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL));
    assert_eq!(app.screen, Screen::Login);
    assert!(app.session.is_none());
    assert_eq!(press(&mut app, KeyCode::Esc), Flow::Quit);
}
