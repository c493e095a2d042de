//! Record store: versioned JSON collections over a key-value backend.
//!
//! Each [`Collection`] lives under one key of a [`KeyValueStore`] as a single
//! JSON document:
//!
//! ```text
//! { "version": 1, "records": [ {...}, {...} ] }
//! ```
//!
//! A bare JSON array is accepted as the legacy (version 0) layout. Every
//! mutation reads the whole collection, changes it and writes the whole
//! collection back; mutations take `&mut self`, so two of them can never
//! interleave.
//!
mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{CatalogError, Result};
use crate::model::RecordId;

/// Current on-disk schema version.
pub const SCHEMA_VERSION: u64 = 1;

/// Raw text storage addressed by key.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// The two independent persisted collections.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Collection {
    Books,
    Users,
}

impl Collection {
    pub fn key(self) -> &'static str {
        match self {
            Collection::Books => "books",
            Collection::Users => "users",
        }
    }
}

/// A record type that belongs to exactly one collection.
pub trait Record: Serialize + DeserializeOwned + Clone {
    const COLLECTION: Collection;

    fn id(&self) -> RecordId;
}

#[derive(Serialize)]
struct Document<'a, R> {
    version: u64,
    records: &'a [R],
}

pub struct RecordStore<S: KeyValueStore> {
    backend: S,
}

impl<S: KeyValueStore> RecordStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    /// Return every record of `R`'s collection in stored order.
    ///
    /// An absent key is an empty collection. Text that does not decode is
    /// reported as [`CatalogError::CorruptPersistedData`].
    pub fn get_all<R: Record>(&self) -> Result<Vec<R>> {
        let key = R::COLLECTION.key();
        match self.backend.get(key)? {
            None => Ok(Vec::new()),
            Some(text) => {
                let records = decode::<R>(key, &text)?.records;
                tracing::debug!(key, count = records.len(), "loaded collection");
                Ok(records)
            }
        }
    }

    /// Like [`get_all`](Self::get_all), but corrupt data yields an empty
    /// collection together with the error so the caller can warn about it.
    pub fn load_or_empty<R: Record>(&self) -> (Vec<R>, Option<CatalogError>) {
        match self.get_all::<R>() {
            Ok(records) => (records, None),
            Err(err) => {
                tracing::warn!(key = R::COLLECTION.key(), error = %err, "treating collection as empty");
                (Vec::new(), Some(err))
            }
        }
    }

    pub fn append<R: Record>(&mut self, record: R) -> Result<()> {
        let mut records = self.get_all::<R>()?;
        records.push(record);
        self.put_all(&records)
    }

    /// Remove every record matching `predicate` and return how many went.
    pub fn remove_where<R, F>(&mut self, mut predicate: F) -> Result<usize>
    where
        R: Record,
        F: FnMut(&R) -> bool,
    {
        let records = self.get_all::<R>()?;
        let before = records.len();
        let survivors: Vec<R> = records.into_iter().filter(|r| !predicate(r)).collect();
        let removed = before - survivors.len();
        if removed > 0 {
            self.put_all(&survivors)?;
        }
        Ok(removed)
    }

    /// Apply `change` to the record with `id` and persist the collection.
    pub fn update<R, F>(&mut self, id: RecordId, change: F) -> Result<R>
    where
        R: Record,
        F: FnOnce(&mut R),
    {
        let mut records = self.get_all::<R>()?;
        let slot = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or(CatalogError::RecordNotFound(id))?;
        change(slot);
        let updated = slot.clone();
        self.put_all(&records)?;
        Ok(updated)
    }

    /// Replace the record with `id` by `record`, keeping its position.
    pub fn replace<R: Record>(&mut self, id: RecordId, record: R) -> Result<()> {
        self.update::<R, _>(id, |slot| *slot = record).map(|_| ())
    }

    /// Rewrite a legacy or older-version document, or one holding records
    /// without ids, in the current layout. Corrupt data is left untouched.
    pub fn migrate<R: Record>(&mut self) -> Result<bool> {
        let key = R::COLLECTION.key();
        let Some(text) = self.backend.get(key)? else {
            return Ok(false);
        };
        let decoded = decode::<R>(key, &text)?;
        if decoded.version == SCHEMA_VERSION && decoded.ids_filled == 0 {
            return Ok(false);
        }
        tracing::info!(
            key,
            from = decoded.version,
            to = SCHEMA_VERSION,
            ids_filled = decoded.ids_filled,
            "upgrading stored collection"
        );
        let records = decoded.records;
        self.put_all(&records)?;
        Ok(true)
    }

    fn put_all<R: Record>(&mut self, records: &[R]) -> Result<()> {
        let key = R::COLLECTION.key();
        let doc = Document {
            version: SCHEMA_VERSION,
            records,
        };
        let text = serde_json::to_string(&doc).map_err(|e| CatalogError::corrupt(key, e))?;
        self.backend.set(key, text)?;
        tracing::debug!(key, count = records.len(), "stored collection");
        Ok(())
    }
}

struct Decoded<R> {
    version: u64,
    records: Vec<R>,
    /// Records that had no `id` and were given [`RecordId::derived`].
    ids_filled: usize,
}

/// Give every id-less record object its derived id.
fn fill_missing_ids(key: &str, records: &mut Value) -> usize {
    let Value::Array(items) = records else {
        return 0;
    };
    let mut filled = 0;
    for (position, item) in items.iter_mut().enumerate() {
        if let Value::Object(map) = item
            && map.get("id").is_none_or(Value::is_null)
        {
            map.insert("id".to_string(), Value::String(RecordId::derived(key, position).to_string()));
            filled += 1;
        }
    }
    filled
}

fn decode<R: Record>(key: &str, text: &str) -> Result<Decoded<R>> {
    let value: Value = serde_json::from_str(text).map_err(|e| CatalogError::corrupt(key, e))?;
    let (version, records) = match value {
        Value::Array(items) => (0, Value::Array(items)),
        Value::Object(mut map) => {
            let version = map
                .get("version")
                .and_then(Value::as_u64)
                .ok_or_else(|| CatalogError::corrupt(key, "missing schema version"))?;
            if version > SCHEMA_VERSION {
                return Err(CatalogError::corrupt(
                    key,
                    format!("unsupported schema version {version}"),
                ));
            }
            let records = map
                .remove("records")
                .ok_or_else(|| CatalogError::corrupt(key, "missing records"))?;
            (version, records)
        }
        _ => {
            return Err(CatalogError::corrupt(
                key,
                "expected an array or a versioned document",
            ));
        }
    };
    let mut records = records;
    let ids_filled = fill_missing_ids(key, &mut records);
    let records = serde_json::from_value(records).map_err(|e| CatalogError::corrupt(key, e))?;
    Ok(Decoded {
        version,
        records,
        ids_filled,
    })
}
