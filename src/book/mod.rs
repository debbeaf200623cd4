//! Book data model, outline parsing, persistence and export.
//!
//! A [`Book`] is a record of optional named fields. A field that is absent
//! and a field holding an empty value are both "not yet produced"; the
//! workflow engine fills them in one at a time.

mod export;
mod outline;
mod store;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use export::{export_to_epub, export_to_text, ExportError, ExportResult};
pub use outline::{chapters_to_outline, outline_to_chapters};
pub use store::{BookStore, JsonStore, MemoryStore, StoreError, StoreResult, UNFINISHED_FIELDS};

/// Book category, which selects the order fields are produced in.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Nonfiction,
}

impl Category {
    /// Lowercase name as stored and accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nonfiction => "nonfiction",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, user-visible book attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Field {
    Topic,
    Title,
    Author,
    #[value(name = "num_chapters")]
    NumChapters,
    Outline,
    Chapters,
}

impl Field {
    /// Every field, in display order.
    pub const ALL: [Self; 6] =
        [Self::Topic, Self::Title, Self::Author, Self::NumChapters, Self::Outline, Self::Chapters];

    /// Field name as stored and used in prompt templates.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Topic => "topic",
            Self::Title => "title",
            Self::Author => "author",
            Self::NumChapters => "num_chapters",
            Self::Outline => "outline",
            Self::Chapters => "chapters",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| format!("unknown field: {s}"))
    }
}

/// One unit of the book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub header: String,
    #[serde(default)]
    pub sections: Vec<String>,
    /// Empty means the chapter has not been written yet.
    #[serde(default)]
    pub content: String,
}

impl Chapter {
    /// Create an unwritten chapter.
    pub fn new(header: impl Into<String>, sections: Vec<String>) -> Self {
        Self { header: header.into(), sections, content: String::new() }
    }

    /// Placeholder inserted by the chapter editor before the header is generated.
    pub fn placeholder() -> Self {
        Self::new("<new chapter>", vec!["<new sections>".to_string()])
    }

    pub fn is_written(&self) -> bool {
        !self.content.is_empty()
    }
}

/// A typed field value, used where a field is handled generically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(u32),
    Chapters(Vec<Chapter>),
}

/// The mutable record for one book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_chapters: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapters: Option<Vec<Chapter>>,
    #[serde(default)]
    pub category: Category,
}

impl Book {
    /// Create an empty book of the given category.
    pub fn new(category: Category) -> Self {
        Self { category, ..Self::default() }
    }

    /// Whether the field holds a produced value.
    ///
    /// Empty strings and empty chapter lists count as not produced.
    pub fn has(&self, field: Field) -> bool {
        match field {
            Field::NumChapters => self.num_chapters.is_some(),
            Field::Chapters => self.chapters.as_ref().is_some_and(|c| !c.is_empty()),
            _ => self.text(field).is_some_and(|t| !t.is_empty()),
        }
    }

    /// Whether the field is absent or an empty string.
    ///
    /// This is the narrower test used by store queries: an empty chapter
    /// list is still a value there.
    pub fn is_unset(&self, field: Field) -> bool {
        match field {
            Field::NumChapters => self.num_chapters.is_none(),
            Field::Chapters => self.chapters.is_none(),
            _ => self.text(field).map_or(true, str::is_empty),
        }
    }

    /// Current value of a text field. `None` for non-text fields.
    pub fn text(&self, field: Field) -> Option<&str> {
        match field {
            Field::Topic => self.topic.as_deref(),
            Field::Title => self.title.as_deref(),
            Field::Author => self.author.as_deref(),
            Field::Outline => self.outline.as_deref(),
            Field::NumChapters | Field::Chapters => None,
        }
    }

    /// Replace a text field. Ignored for non-text fields.
    pub fn set_text(&mut self, field: Field, value: Option<String>) {
        match field {
            Field::Topic => self.topic = value,
            Field::Title => self.title = value,
            Field::Author => self.author = value,
            Field::Outline => self.outline = value,
            Field::NumChapters | Field::Chapters => {
                tracing::warn!(%field, "attempted to store text in a non-text field");
            }
        }
    }

    /// Current value of any field.
    pub fn get(&self, field: Field) -> Option<FieldValue> {
        match field {
            Field::NumChapters => self.num_chapters.map(FieldValue::Number),
            Field::Chapters => self.chapters.clone().map(FieldValue::Chapters),
            _ => self.text(field).map(|t| FieldValue::Text(t.to_string())),
        }
    }

    /// Store a value into a field.
    ///
    /// A value whose type does not match the field is dropped.
    pub fn set(&mut self, field: Field, value: FieldValue) {
        match (field, value) {
            (Field::NumChapters, FieldValue::Number(n)) => self.num_chapters = Some(n),
            (Field::Chapters, FieldValue::Chapters(chapters)) => self.chapters = Some(chapters),
            (Field::NumChapters | Field::Chapters, value) => {
                tracing::warn!(%field, ?value, "ignoring value of the wrong type");
            }
            (_, FieldValue::Text(text)) => self.set_text(field, Some(text)),
            (_, value) => tracing::warn!(%field, ?value, "ignoring value of the wrong type"),
        }
    }

    /// Remove a field entirely.
    pub fn clear(&mut self, field: Field) {
        match field {
            Field::NumChapters => self.num_chapters = None,
            Field::Chapters => self.chapters = None,
            _ => self.set_text(field, None),
        }
    }

    /// Chapters list, or an empty slice when absent.
    pub fn chapter_list(&self) -> &[Chapter] {
        self.chapters.as_deref().unwrap_or(&[])
    }

    /// Variables available to prompt templates for book-level fields.
    pub fn prompt_vars(&self) -> HashMap<&'static str, String> {
        let mut vars = HashMap::new();
        for field in [Field::Topic, Field::Title, Field::Author, Field::Outline] {
            if let Some(text) = self.text(field) {
                vars.insert(field.as_str(), text.to_string());
            }
        }
        if let Some(n) = self.num_chapters {
            vars.insert(Field::NumChapters.as_str(), n.to_string());
        }
        vars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_not_produced() {
        let mut book = Book::default();
        assert!(!book.has(Field::Title));

        book.title = Some(String::new());
        assert!(!book.has(Field::Title));
        assert!(book.is_unset(Field::Title));

        book.title = Some("Deep Water".to_string());
        assert!(book.has(Field::Title));
        assert!(!book.is_unset(Field::Title));
    }

    #[test]
    fn test_empty_chapter_list() {
        let book = Book { chapters: Some(Vec::new()), ..Book::default() };
        assert!(!book.has(Field::Chapters));
        assert!(!book.is_unset(Field::Chapters));
    }

    #[test]
    fn test_set_rejects_mismatched_type() {
        let mut book = Book::default();
        book.set(Field::NumChapters, FieldValue::Text("seven".to_string()));
        assert_eq!(book.num_chapters, None);

        book.set(Field::NumChapters, FieldValue::Number(7));
        assert_eq!(book.num_chapters, Some(7));

        book.set(Field::Title, FieldValue::Number(3));
        assert_eq!(book.title, None);
    }

    #[test]
    fn test_field_round_trips_through_name() {
        for field in Field::ALL {
            assert_eq!(field.as_str().parse::<Field>().unwrap(), field);
        }
        assert!("outline_to_chapters".parse::<Field>().is_err());
    }

    #[test]
    fn test_book_serialization_skips_absent_fields() {
        let book = Book { title: Some("T".to_string()), ..Book::default() };
        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json, serde_json::json!({ "title": "T", "category": "nonfiction" }));
    }

    #[test]
    fn test_prompt_vars() {
        let book = Book {
            topic: Some("tides".to_string()),
            num_chapters: Some(4),
            ..Book::default()
        };
        let vars = book.prompt_vars();
        assert_eq!(vars.get("topic").map(String::as_str), Some("tides"));
        assert_eq!(vars.get("num_chapters").map(String::as_str), Some("4"));
        assert!(!vars.contains_key("title"));
    }
}
