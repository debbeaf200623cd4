//! The state one command invocation works on.

use rand::RngCore;

use crate::ai::ContentGenerator;
use crate::book::{Book, BookStore, Field};
use crate::error::SessionResult;
use crate::prompt::{Console, TextEditor};

/// Collaborators that talk to the user or the outside world.
pub struct Interaction<'a> {
    pub console: &'a mut dyn Console,
    pub editor: &'a mut dyn TextEditor,
    pub generator: &'a mut dyn ContentGenerator,
    pub rng: &'a mut dyn RngCore,
}

impl<'a> Interaction<'a> {
    pub fn new(
        console: &'a mut dyn Console,
        editor: &'a mut dyn TextEditor,
        generator: &'a mut dyn ContentGenerator,
        rng: &'a mut dyn RngCore,
    ) -> Self {
        Self { console, editor, generator, rng }
    }
}

/// One book being worked on, plus the store it is saved to.
///
/// The book is edited in place; [`Session::save`] copies a single field back
/// to the store.
pub struct Session<'a> {
    pub book_id: u64,
    pub book: Book,
    pub io: Interaction<'a>,
    store: &'a mut dyn BookStore,
}

impl<'a> Session<'a> {
    pub fn new(
        book_id: u64,
        book: Book,
        store: &'a mut dyn BookStore,
        io: Interaction<'a>,
    ) -> Self {
        Self { book_id, book, io, store }
    }

    /// Persist the current value of one field.
    pub fn save(&mut self, field: Field) -> SessionResult<()> {
        self.store.update_field(self.book_id, field, &self.book)?;
        Ok(())
    }

    /// Give back the edited book.
    pub fn into_book(self) -> Book {
        self.book
    }
}
