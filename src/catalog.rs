//! Form controller: turns form submissions into store operations.
//!
//! [`Catalog`] is the only component that talks to the [`RecordStore`]. It
//! validates input, builds records, implements signup and login, and resolves
//! view rows back to record ids before mutating anything.
//!
use crate::error::{CatalogError, Result};
use crate::model::{BookRecord, RecordId, Role, UserRecord};
use crate::store::{KeyValueStore, RecordStore};
use crate::validate::{SignupForm, validate_signup};

/// Where the caller should navigate after a workflow succeeds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Destination {
    Login,
    UserHome,
    AdminHome,
}

impl Destination {
    pub fn name(self) -> &'static str {
        match self {
            Destination::Login => "login",
            Destination::UserHome => "catalog",
            Destination::AdminHome => "admin",
        }
    }
}

/// Book form inputs. Title, category and author are required.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BookForm {
    pub title: String,
    pub category: String,
    pub author: String,
    pub description: String,
    pub image: String,
}

impl BookForm {
    pub fn from_record(book: &BookRecord) -> Self {
        Self {
            title: book.title.clone(),
            category: book.category.clone(),
            author: book.author.clone(),
            description: book.description.clone().unwrap_or_default(),
            image: book.image.clone().unwrap_or_default(),
        }
    }

    fn check_required(&self) -> Result<()> {
        for (name, value) in [
            ("title", &self.title),
            ("category", &self.category),
            ("author", &self.author),
        ] {
            if value.trim().is_empty() {
                return Err(CatalogError::MissingField(name));
            }
        }
        Ok(())
    }

    fn optional(value: &str) -> Option<String> {
        let t = value.trim();
        if t.is_empty() { None } else { Some(t.to_string()) }
    }

    /// Copy the form's values onto `book`, leaving its id and availability.
    fn apply_to(&self, book: &mut BookRecord) {
        book.title = self.title.trim().to_string();
        book.category = self.category.trim().to_string();
        book.author = self.author.trim().to_string();
        book.description = Self::optional(&self.description);
        book.image = Self::optional(&self.image);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignupOutcome {
    pub user: UserRecord,
    pub redirect: Destination,
}

/// A signed-in user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub user_id: RecordId,
    pub username: String,
    pub role: Role,
    pub destination: Destination,
}

/// A row of the admin user table: non-admin accounts only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRow {
    pub id: RecordId,
    pub full_name: String,
    pub username: String,
    pub email: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoanOutcome {
    CheckedOut,
    AlreadyCheckedOut,
    Returned,
    AlreadyAvailable,
}

impl LoanOutcome {
    pub fn message(self) -> &'static str {
        match self {
            LoanOutcome::CheckedOut => "Book checked out successfully.",
            LoanOutcome::AlreadyCheckedOut => "Book is not available for checkout.",
            LoanOutcome::Returned => "Book returned successfully.",
            LoanOutcome::AlreadyAvailable => "Book is already available.",
        }
    }
}

pub struct Catalog<S: KeyValueStore> {
    store: RecordStore<S>,
}

impl<S: KeyValueStore> Catalog<S> {
    /// Wrap `backend`, upgrading any legacy documents it holds. Returns the
    /// catalog and the warnings for collections that could not be read.
    pub fn open(backend: S) -> (Self, Vec<CatalogError>) {
        let mut store = RecordStore::new(backend);
        let mut warnings = Vec::new();
        if let Err(e) = store.migrate::<BookRecord>() {
            warnings.push(e);
        }
        if let Err(e) = store.migrate::<UserRecord>() {
            warnings.push(e);
        }
        for w in &warnings {
            tracing::warn!(error = %w, "stored collection unavailable");
        }
        (Self { store }, warnings)
    }

    pub fn store(&self) -> &RecordStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut RecordStore<S> {
        &mut self.store
    }

    // ----- books -----

    pub fn books(&self) -> Result<Vec<BookRecord>> {
        self.store.get_all()
    }

    pub fn submit_book_form(&mut self, form: &BookForm) -> Result<BookRecord> {
        form.check_required()?;
        let mut book = BookRecord {
            id: RecordId::new(),
            title: String::new(),
            category: String::new(),
            author: String::new(),
            description: None,
            image: None,
            available: true,
        };
        form.apply_to(&mut book);
        self.store.append(book.clone())?;
        tracing::info!(id = %book.id, title = %book.title, "book added");
        Ok(book)
    }

    pub fn update_book(&mut self, id: RecordId, form: &BookForm) -> Result<BookRecord> {
        form.check_required()?;
        let book = self.store.update(id, |b: &mut BookRecord| form.apply_to(b))?;
        tracing::info!(%id, title = %book.title, "book updated");
        Ok(book)
    }

    pub fn remove_book(&mut self, id: RecordId) -> Result<()> {
        let removed = self.store.remove_where(|b: &BookRecord| b.id == id)?;
        if removed == 0 {
            return Err(CatalogError::RecordNotFound(id));
        }
        tracing::info!(%id, "book removed");
        Ok(())
    }

    /// Case-insensitive substring match on title or author.
    pub fn search_books(&self, query: &str) -> Result<Vec<BookRecord>> {
        let books = self.books()?;
        Ok(filter_books(&books, query))
    }

    pub fn check_out(&mut self, id: RecordId) -> Result<LoanOutcome> {
        let mut outcome = LoanOutcome::AlreadyCheckedOut;
        self.store.update(id, |b: &mut BookRecord| {
            if b.available {
                b.available = false;
                outcome = LoanOutcome::CheckedOut;
            }
        })?;
        tracing::info!(%id, ?outcome, "check out");
        Ok(outcome)
    }

    pub fn return_book(&mut self, id: RecordId) -> Result<LoanOutcome> {
        let mut outcome = LoanOutcome::AlreadyAvailable;
        self.store.update(id, |b: &mut BookRecord| {
            if !b.available {
                b.available = true;
                outcome = LoanOutcome::Returned;
            }
        })?;
        tracing::info!(%id, ?outcome, "return");
        Ok(outcome)
    }

    // ----- users -----

    pub fn users(&self) -> Result<Vec<UserRecord>> {
        self.store.get_all()
    }

    /// Validate every field, then store the new account.
    pub fn submit_signup(&mut self, form: &SignupForm) -> Result<SignupOutcome> {
        let report = validate_signup(form);
        if !report.is_valid() {
            tracing::debug!(errors = report.errors().count(), "signup rejected");
            return Err(CatalogError::ValidationFailed(report));
        }
        let user = UserRecord {
            id: RecordId::new(),
            full_name: form.full_name.trim().to_string(),
            username: form.username.trim().to_string(),
            email: form.email.trim().to_string(),
            password: form.password.trim().to_string(),
            is_admin: form.is_admin,
        };
        self.store.append(user.clone())?;
        tracing::info!(id = %user.id, username = %user.username, admin = user.is_admin, "user signed up");
        Ok(SignupOutcome {
            user,
            redirect: Destination::Login,
        })
    }

    /// First user whose username, password and role all match wins.
    pub fn login(&self, role: Role, username: &str, password: &str) -> Result<Session> {
        let username = username.trim();
        let password = password.trim();
        let users = self.users()?;
        let found = users
            .iter()
            .find(|u| u.username == username && u.password == password && u.role() == role);
        match found {
            Some(u) => {
                tracing::info!(username, role = role.as_str(), "login succeeded");
                Ok(Session {
                    user_id: u.id,
                    username: u.username.clone(),
                    role,
                    destination: if role.is_admin() {
                        Destination::AdminHome
                    } else {
                        Destination::UserHome
                    },
                })
            }
            None => {
                tracing::warn!(username, role = role.as_str(), "login failed");
                Err(CatalogError::InvalidCredentials)
            }
        }
    }

    /// Non-admin accounts, in stored order, each carrying its id.
    pub fn user_rows(&self) -> Result<Vec<UserRow>> {
        Ok(self
            .users()?
            .into_iter()
            .filter(|u| !u.is_admin)
            .map(|u| UserRow {
                id: u.id,
                full_name: u.full_name,
                username: u.username,
                email: u.email,
            })
            .collect())
    }

    pub fn delete_user(&mut self, id: RecordId) -> Result<()> {
        let removed = self.store.remove_where(|u: &UserRecord| u.id == id)?;
        if removed == 0 {
            return Err(CatalogError::RecordNotFound(id));
        }
        tracing::info!(%id, "user deleted");
        Ok(())
    }

    /// Delete the user shown at `view_index` of [`user_rows`](Self::user_rows).
    pub fn delete_user_in_view(&mut self, view_index: usize) -> Result<UserRow> {
        let row = self
            .user_rows()?
            .into_iter()
            .nth(view_index)
            .ok_or(CatalogError::NoSuchRow(view_index))?;
        self.delete_user(row.id)?;
        Ok(row)
    }
}

pub fn filter_books(books: &[BookRecord], query: &str) -> Vec<BookRecord> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return books.to_vec();
    }
    books
        .iter()
        .filter(|b| b.title.to_lowercase().contains(&q) || b.author.to_lowercase().contains(&q))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::validate::{Field, Reason};

    fn catalog() -> Catalog<MemoryStore> {
        Catalog::open(MemoryStore::new()).0
    }

    fn book_form(title: &str, author: &str) -> BookForm {
        BookForm {
            title: title.into(),
            category: "fiction".into(),
            author: author.into(),
            ..Default::default()
        }
    }

    #[test]
    fn id_less_books_in_current_document_can_be_edited_and_removed() {
        let mut backend = MemoryStore::new();
        backend
            .set(
                "books",
                r#"{"version":1,"records":[{"title":"Emma","category":"classic","author":"Austen"},{"title":"Dune","category":"sf","author":"Herbert"}]}"#.to_string(),
            )
            .unwrap();
        let (mut c, warnings) = Catalog::open(backend);
        assert!(warnings.is_empty());
        let books = c.books().unwrap();
        assert_eq!(c.check_out(books[1].id).unwrap(), LoanOutcome::CheckedOut);
        c.remove_book(books[0].id).unwrap();
        let left = c.books().unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, books[1].id);
        assert!(!left[0].available);
    }

    fn signup(username: &str, password: &str, is_admin: bool) -> SignupForm {
        SignupForm {
            full_name: "Ada Lovelace".into(),
            username: username.into(),
            email: "ada@example.com".into(),
            password: password.into(),
            confirm_password: password.into(),
            is_admin,
        }
    }

    #[test]
    fn book_form_requires_title_category_author() {
        let mut c = catalog();
        let mut form = book_form("Dune", "  ");
        assert!(matches!(c.submit_book_form(&form), Err(CatalogError::MissingField("author"))));
        form.author = "Herbert".into();
        form.category = "".into();
        assert!(matches!(c.submit_book_form(&form), Err(CatalogError::MissingField("category"))));
        assert!(c.books().unwrap().is_empty());
    }

    #[test]
    fn book_form_trims_and_stores() {
        let mut c = catalog();
        let mut form = book_form("  Dune ", "Herbert");
        form.description = "   ".into();
        form.image = "dune.png".into();
        let book = c.submit_book_form(&form).unwrap();
        assert_eq!(book.title, "Dune");
        assert_eq!(book.description, None);
        assert_eq!(book.image.as_deref(), Some("dune.png"));
        assert_eq!(c.books().unwrap(), vec![book]);
    }

    #[test]
    fn remove_book_by_id_leaves_same_author_books() {
        let mut c = catalog();
        let a = c.submit_book_form(&book_form("Emma", "Austen")).unwrap();
        let b = c.submit_book_form(&book_form("Persuasion", "Austen")).unwrap();
        c.remove_book(a.id).unwrap();
        assert_eq!(c.books().unwrap(), vec![b]);
        assert!(matches!(c.remove_book(a.id), Err(CatalogError::RecordNotFound(_))));
    }

    #[test]
    fn search_matches_title_or_author() {
        let mut c = catalog();
        c.submit_book_form(&book_form("Emma", "Austen")).unwrap();
        c.submit_book_form(&book_form("Dune", "Herbert")).unwrap();
        let hits = c.search_books("HERB").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Dune");
        assert_eq!(c.search_books("em").unwrap().len(), 1);
        assert_eq!(c.search_books("").unwrap().len(), 2);
        assert!(c.search_books("tolkien").unwrap().is_empty());
    }

    #[test]
    fn checkout_and_return_cycle() {
        let mut c = catalog();
        let b = c.submit_book_form(&book_form("Emma", "Austen")).unwrap();
        assert_eq!(c.return_book(b.id).unwrap(), LoanOutcome::AlreadyAvailable);
        assert_eq!(c.check_out(b.id).unwrap(), LoanOutcome::CheckedOut);
        assert_eq!(c.check_out(b.id).unwrap(), LoanOutcome::AlreadyCheckedOut);
        assert!(!c.books().unwrap()[0].available);
        assert_eq!(c.return_book(b.id).unwrap(), LoanOutcome::Returned);
        assert!(matches!(c.check_out(RecordId::new()), Err(CatalogError::RecordNotFound(_))));
    }

    #[test]
    fn signup_stores_user_and_redirects_to_login() {
        let mut c = catalog();
        let outcome = c.submit_signup(&signup("ada", "Abcdef1!", false)).unwrap();
        assert_eq!(outcome.redirect, Destination::Login);
        let users = c.users().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0], outcome.user);
        assert_eq!(users[0].username, "ada");
        assert!(!users[0].is_admin);
    }

    #[test]
    fn invalid_signup_stores_nothing() {
        let mut c = catalog();
        let err = c.submit_signup(&signup("ada", "abcdefgh", false)).unwrap_err();
        match err {
            CatalogError::ValidationFailed(report) => {
                assert_eq!(report.get(Field::Password), Some(Reason::PasswordComplexity));
                assert_eq!(report.errors().count(), 1);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(c.users().unwrap().is_empty());
    }

    #[test]
    fn login_matches_role() {
        let mut c = catalog();
        c.submit_signup(&signup("root", "Secret1!", true)).unwrap();
        let session = c.login(Role::Admin, "root", "Secret1!").unwrap();
        assert_eq!(session.role, Role::Admin);
        assert_eq!(session.destination, Destination::AdminHome);
        assert!(matches!(
            c.login(Role::User, "root", "Secret1!"),
            Err(CatalogError::InvalidCredentials)
        ));
        assert!(matches!(
            c.login(Role::Admin, "root", "secret1!"),
            Err(CatalogError::InvalidCredentials)
        ));
    }

    #[test]
    fn delete_user_in_view_resolves_through_filtered_rows() {
        let mut c = catalog();
        c.submit_signup(&signup("admin_one", "Secret1!", true)).unwrap();
        c.submit_signup(&signup("alice", "Secret1!", false)).unwrap();
        c.submit_signup(&signup("bob", "Secret1!", false)).unwrap();

        // View index 0 is alice even though she is index 1 in the full list.
        let row = c.delete_user_in_view(0).unwrap();
        assert_eq!(row.username, "alice");
        let names: Vec<String> = c.users().unwrap().into_iter().map(|u| u.username).collect();
        assert_eq!(names, vec!["admin_one", "bob"]);
        assert!(matches!(c.delete_user_in_view(5), Err(CatalogError::NoSuchRow(5))));
    }
}
