//! Book persistence.
//!
//! Records are keyed by a numeric id starting at 1. Writes are field-level so
//! the workflow can persist each field as soon as it is accepted.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

use super::{Book, Field};

/// Fields a book needs before it can be exported.
pub const UNFINISHED_FIELDS: [Field; 3] = [Field::Title, Field::Author, Field::Chapters];

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while reading or writing books.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record with the given id.
    #[error("No book {0} in database.")]
    NotFound(u64),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The database file is not valid JSON.
    #[error("Corrupt book database: {0}")]
    Json(#[from] serde_json::Error),
}

/// Keyed book records with field-level access.
pub trait BookStore {
    /// Add a book and return its id.
    fn insert(&mut self, book: Book) -> StoreResult<u64>;

    /// Get a single book.
    fn get(&self, id: u64) -> StoreResult<Option<Book>>;

    /// Every book, ordered by id.
    fn all(&self) -> StoreResult<Vec<(u64, Book)>>;

    /// Copy one field from `book` into the stored record.
    fn update_field(&mut self, id: u64, field: Field, book: &Book) -> StoreResult<()>;

    /// Remove a book. Returns whether it existed.
    fn delete(&mut self, id: u64) -> StoreResult<bool>;

    /// Remove one field from a stored book.
    fn delete_field(&mut self, id: u64, field: Field) -> StoreResult<()>;

    /// Books where any of `fields` is absent or an empty string.
    fn missing_any(&self, fields: &[Field]) -> StoreResult<Vec<(u64, Book)>> {
        Ok(self
            .all()?
            .into_iter()
            .filter(|(_, book)| fields.iter().any(|field| book.is_unset(*field)))
            .collect())
    }

    /// Books that cannot be exported yet.
    ///
    /// Only title, author and chapters are inspected.
    fn unfinished(&self) -> StoreResult<Vec<(u64, Book)>> {
        self.missing_any(&UNFINISHED_FIELDS)
    }
}

/// On-disk layout of the database file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BookTable {
    next_id: u64,
    #[serde(default)]
    books: BTreeMap<u64, Book>,
}

impl Default for BookTable {
    fn default() -> Self {
        Self { next_id: 1, books: BTreeMap::new() }
    }
}

impl BookTable {
    fn insert(&mut self, book: Book) -> u64 {
        let id = self.next_id;
        self.books.insert(id, book);
        self.next_id += 1;
        id
    }

    fn update_field(&mut self, id: u64, field: Field, book: &Book) -> StoreResult<()> {
        let stored = self.books.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        match book.get(field) {
            Some(value) => stored.set(field, value),
            None => stored.clear(field),
        }
        Ok(())
    }

    fn delete_field(&mut self, id: u64, field: Field) -> StoreResult<()> {
        self.books.get_mut(&id).ok_or(StoreError::NotFound(id))?.clear(field);
        Ok(())
    }

    fn all(&self) -> Vec<(u64, Book)> {
        self.books.iter().map(|(id, book)| (*id, book.clone())).collect()
    }
}

/// Book database kept in a single JSON file.
///
/// The whole table is rewritten after every mutation.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    table: BookTable,
}

impl JsonStore {
    /// Open the database at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let table = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BookTable::default()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            BookTable::default()
        };

        tracing::debug!(path = %path.display(), books = table.books.len(), "opened book database");
        Ok(Self { path, table })
    }

    /// Location of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the table to a temp file beside the database, then rename it
    /// over the old file. An interrupted save leaves the previous file intact.
    fn save(&self) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(&self.table)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(content.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl BookStore for JsonStore {
    fn insert(&mut self, book: Book) -> StoreResult<u64> {
        let id = self.table.insert(book);
        self.save()?;
        Ok(id)
    }

    fn get(&self, id: u64) -> StoreResult<Option<Book>> {
        Ok(self.table.books.get(&id).cloned())
    }

    fn all(&self) -> StoreResult<Vec<(u64, Book)>> {
        Ok(self.table.all())
    }

    fn update_field(&mut self, id: u64, field: Field, book: &Book) -> StoreResult<()> {
        self.table.update_field(id, field, book)?;
        tracing::debug!(id, %field, "saved field");
        self.save()
    }

    fn delete(&mut self, id: u64) -> StoreResult<bool> {
        let existed = self.table.books.remove(&id).is_some();
        if existed {
            self.save()?;
        }
        Ok(existed)
    }

    fn delete_field(&mut self, id: u64, field: Field) -> StoreResult<()> {
        self.table.delete_field(id, field)?;
        self.save()
    }
}

/// In-memory store, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: BookTable,
    writes: Vec<(u64, Field)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(id, field)` passed to [`BookStore::update_field`], in order.
    pub fn writes(&self) -> &[(u64, Field)] {
        &self.writes
    }
}

impl BookStore for MemoryStore {
    fn insert(&mut self, book: Book) -> StoreResult<u64> {
        Ok(self.table.insert(book))
    }

    fn get(&self, id: u64) -> StoreResult<Option<Book>> {
        Ok(self.table.books.get(&id).cloned())
    }

    fn all(&self) -> StoreResult<Vec<(u64, Book)>> {
        Ok(self.table.all())
    }

    fn update_field(&mut self, id: u64, field: Field, book: &Book) -> StoreResult<()> {
        self.table.update_field(id, field, book)?;
        self.writes.push((id, field));
        Ok(())
    }

    fn delete(&mut self, id: u64) -> StoreResult<bool> {
        Ok(self.table.books.remove(&id).is_some())
    }

    fn delete_field(&mut self, id: u64, field: Field) -> StoreResult<()> {
        self.table.delete_field(id, field)
    }
}
