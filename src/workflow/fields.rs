//! Field descriptor registry.
//!
//! Each descriptor names a step of the workflow and says how its value is
//! produced. Categories list the steps they run, in order.

use std::ops::RangeInclusive;

use crate::ai::PromptKind;
use crate::book::{outline_to_chapters, Book, Category, Field, FieldValue};
use crate::error::SessionResult;

use super::chapters::chapter_menu;
use super::session::Session;

/// Derives a field from the rest of the book without interaction.
pub type Transform = fn(&Book) -> Option<FieldValue>;

/// Runs one command of a nested editor.
pub type Submenu = fn(&mut Session<'_>) -> SessionResult<MenuSignal>;

/// What a submenu wants after one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuSignal {
    /// A command ran; save and show the menu again.
    Continue,
    /// The user left the menu.
    Cancel,
}

/// How a descriptor produces its value.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Free text, generated from a prompt template or edited by hand.
    Text { field: Field, prompt: PromptKind },
    /// An integer in an inclusive range, entered or picked at random.
    Bound {
        field: Field,
        range: RangeInclusive<u32>,
        /// Asked while there is no value.
        question: &'static str,
        /// Asked to confirm a value; `{n}` is replaced by the value.
        confirm: &'static str,
    },
    /// One-shot transform written to `target`.
    Recipe { transform: Transform, target: Field },
    /// A nested editor run until the user cancels it.
    Menu { field: Field, submenu: Submenu },
}

/// A named workflow step.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    /// The book field this step writes.
    pub fn target(&self) -> Field {
        match &self.kind {
            FieldKind::Text { field, .. }
            | FieldKind::Bound { field, .. }
            | FieldKind::Menu { field, .. } => *field,
            FieldKind::Recipe { target, .. } => *target,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            FieldKind::Text { .. } => "string",
            FieldKind::Bound { .. } => "bound",
            FieldKind::Recipe { .. } => "recipe",
            FieldKind::Menu { .. } => "menu",
        }
    }
}

/// Every known step.
pub static REGISTRY: [FieldDescriptor; 7] = [
    FieldDescriptor {
        name: "topic",
        kind: FieldKind::Text { field: Field::Topic, prompt: PromptKind::Topic },
    },
    FieldDescriptor {
        name: "title",
        kind: FieldKind::Text { field: Field::Title, prompt: PromptKind::Title },
    },
    FieldDescriptor {
        name: "author",
        kind: FieldKind::Text { field: Field::Author, prompt: PromptKind::Author },
    },
    FieldDescriptor {
        name: "num_chapters",
        kind: FieldKind::Bound {
            field: Field::NumChapters,
            range: 3..=20,
            question: "How many chapters?",
            confirm: "Generate outline with {n} chapters?",
        },
    },
    FieldDescriptor {
        name: "outline",
        kind: FieldKind::Text { field: Field::Outline, prompt: PromptKind::Outline },
    },
    FieldDescriptor {
        name: "outline_to_chapters",
        kind: FieldKind::Recipe { transform: chapters_from_outline, target: Field::Chapters },
    },
    FieldDescriptor {
        name: "chapters",
        kind: FieldKind::Menu { field: Field::Chapters, submenu: chapter_menu },
    },
];

/// Names accepted by `edit <id> <field>`.
pub const DESCRIPTOR_NAMES: [&str; 7] =
    ["topic", "title", "author", "num_chapters", "outline", "outline_to_chapters", "chapters"];

const NONFICTION_ORDER: [&str; 6] =
    ["title", "author", "num_chapters", "outline", "outline_to_chapters", "chapters"];

/// Look up a step by name.
pub fn descriptor(name: &str) -> Option<&'static FieldDescriptor> {
    REGISTRY.iter().find(|d| d.name == name)
}

/// Steps a category runs, in order. The topic is settled before these run.
pub fn field_order(category: Category) -> &'static [&'static str] {
    match category {
        Category::Nonfiction => &NONFICTION_ORDER,
    }
}

/// Structure the outline into chapters, unless chapters already exist.
fn chapters_from_outline(book: &Book) -> Option<FieldValue> {
    if book.has(Field::Chapters) {
        return None;
    }
    let outline = book.outline.as_deref().unwrap_or_default();
    Some(FieldValue::Chapters(outline_to_chapters(outline)))
}
