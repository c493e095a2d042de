//! Library crate for library-catalog.
//!
//! This crate exposes the building blocks of the TUI:
//! - Persistent record store over a key-value backend (`store`)
//! - Record types (`model`) and form validation (`validate`)
//! - Form controller for books, signup and login (`catalog`)
//! - List rendering and the row editor (`render`)
//! - Application state, update loop and UI (`app`, `ui`)
//!
//! It is used by the `library-catalog` binary and by tests.
#![deny(rustdoc::broken_intra_doc_links)]

pub mod app;
pub mod catalog;
pub mod cli;
pub mod error;
pub mod model;
pub mod notice;
pub mod render;
pub mod search;
pub mod store;
pub mod ui;
pub mod validate;

/// Convenient error and result types shared across the crate.
pub use error::{CatalogError, Result};
