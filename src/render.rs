//! List renderer: book records projected into table rows, plus the in-place
//! row editor.
//!
//! Rows carry the record id, so an edit is saved against the record it came
//! from even if the rows were filtered or reordered after rendering.
//!
use std::iter::Enumerate;
use std::slice::Iter;

use crate::catalog::{BookForm, Catalog};
use crate::error::Result;
use crate::model::{BookRecord, RecordId};
use crate::store::KeyValueStore;

pub const COLUMNS: [&str; 4] = ["Title", "Category", "Author", "Description"];

/// View-model for one displayed book.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookRow {
    pub id: RecordId,
    /// Position in the rendered sequence.
    pub position: usize,
    pub cells: [String; 4],
    pub available: bool,
    image: Option<String>,
}

/// Lazy row sequence over a snapshot. Clone it to iterate again.
#[derive(Clone)]
pub struct Rows<'a> {
    inner: Enumerate<Iter<'a, BookRecord>>,
}

impl Iterator for Rows<'_> {
    type Item = BookRow;

    fn next(&mut self) -> Option<BookRow> {
        let (position, b) = self.inner.next()?;
        Some(BookRow {
            id: b.id,
            position,
            cells: [
                b.title.clone(),
                b.category.clone(),
                b.author.clone(),
                b.description.clone().unwrap_or_default(),
            ],
            available: b.available,
            image: b.image.clone(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Rows<'_> {}

pub fn render(records: &[BookRecord]) -> Rows<'_> {
    Rows {
        inner: records.iter().enumerate(),
    }
}

/// A row switched into edit mode: one text buffer per cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowEditor {
    pub id: RecordId,
    pub cells: [String; 4],
    pub focus: usize,
    image: Option<String>,
}

impl RowEditor {
    /// Start editing the row with `id`, seeded from its displayed cells.
    pub fn edit_row(mut rows: impl Iterator<Item = BookRow>, id: RecordId) -> Option<Self> {
        let row = rows.find(|r| r.id == id)?;
        Some(Self {
            id: row.id,
            cells: row.cells,
            focus: 0,
            image: row.image,
        })
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.cells.len();
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + self.cells.len() - 1) % self.cells.len();
    }

    pub fn push(&mut self, c: char) {
        self.cells[self.focus].push(c);
    }

    pub fn pop(&mut self) {
        self.cells[self.focus].pop();
    }

    pub fn to_form(&self) -> BookForm {
        let [title, category, author, description] = self.cells.clone();
        BookForm {
            title,
            category,
            author,
            description,
            image: self.image.clone().unwrap_or_default(),
        }
    }
}

/// Write the edited cells back to the record the row was rendered from.
pub fn save_row<S: KeyValueStore>(catalog: &mut Catalog<S>, editor: &RowEditor) -> Result<BookRecord> {
    catalog.update_book(editor.id, &editor.to_form())
}
