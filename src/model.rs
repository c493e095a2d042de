//! Record types persisted by the catalog.
//!
//! Field names on the wire follow the stored JSON layout (`fullName`,
//! `isAdmin`), so documents written by older builds still decode.
//!
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

use crate::store::{Collection, Record};

/// Stable identifier assigned to a record when it is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Id for a stored record that was written without one. Derived from the
    /// collection key and position so repeated reads agree.
    pub fn derived(key: &str, position: usize) -> Self {
        let name = format!("library-catalog/{key}/{position}");
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()))
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn default_available() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: RecordId,
    pub title: String,
    pub category: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// `false` while the book is checked out.
    #[serde(default = "default_available")]
    pub available: bool,
}

impl Record for BookRecord {
    const COLLECTION: Collection = Collection::Books;

    fn id(&self) -> RecordId {
        self.id
    }
}

/// Account created by the signup form. The password is kept in plaintext.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: RecordId,
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl UserRecord {
    pub fn role(&self) -> Role {
        if self.is_admin { Role::Admin } else { Role::User }
    }
}

impl Record for UserRecord {
    const COLLECTION: Collection = Collection::Users;

    fn id(&self) -> RecordId {
        self.id
    }
}

/// Which login form a user signs in through.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn toggle(self) -> Self {
        match self {
            Role::User => Role::Admin,
            Role::Admin => Role::User,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_record_uses_camel_case_keys() {
        let user = UserRecord {
            id: RecordId::new(),
            full_name: "Ada Lovelace".into(),
            username: "ada".into(),
            email: "ada@example.com".into(),
            password: "Secret1!".into(),
            is_admin: true,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("\"fullName\":\"Ada Lovelace\""));
        assert!(json.contains("\"isAdmin\":true"));
    }

    #[test]
    fn book_without_availability_decodes_as_available() {
        let json = r#"{"id":"67e55044-10b1-426f-9247-bb680e5fe0c8","title":"Dune","category":"SF","author":"Herbert"}"#;
        let book: BookRecord = serde_json::from_str(json).unwrap();
        assert_eq!(book.title, "Dune");
        assert!(book.available);
        assert!(book.description.is_none());
    }

    #[test]
    fn derived_ids_are_stable_per_position() {
        assert_eq!(RecordId::derived("books", 3), RecordId::derived("books", 3));
        assert_ne!(RecordId::derived("books", 3), RecordId::derived("books", 4));
        assert_ne!(RecordId::derived("books", 0), RecordId::derived("users", 0));
    }

    #[test]
    fn role_parse_and_derivation() {
        assert_eq!(Role::parse("Admin"), Some(Role::Admin));
        assert_eq!(Role::parse(" user "), Some(Role::User));
        assert_eq!(Role::parse("root"), None);
        assert_eq!(Role::User.toggle(), Role::Admin);
    }
}
