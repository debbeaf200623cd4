//! Command implementations behind the CLI.
//!
//! The `App` struct owns the configuration and the book store. Each command
//! writes its messages through a [`Console`] so the same code runs against
//! the terminal and against scripted input.

use std::path::Path;

use crate::ai::{render, PromptKind};
use crate::book::{
    export_to_epub, export_to_text, Book, BookStore, Category, Field, JsonStore, StoreError,
};
use crate::core::Config;
use crate::error::SessionResult;
use crate::prompt::Console;
use crate::workflow::{
    descriptor, run_field, run_workflow, text_cycle, Interaction, Policy, Session,
};

/// Values given on the command line for a new book.
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub category: Category,
    pub topic: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub num_chapters: Option<u32>,
}

impl CreateOptions {
    fn into_book(self) -> Book {
        Book {
            topic: self.topic,
            title: self.title,
            author: self.author,
            num_chapters: self.num_chapters,
            ..Book::new(self.category)
        }
    }
}

/// Supported export formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    Epub,
    Txt,
}

/// Application state shared by all commands.
pub struct App {
    pub config: Config,
    store: Box<dyn BookStore>,
}

impl App {
    /// Open the configured book database.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let path = config.database_path()?;
        let store = JsonStore::open(path)?;
        tracing::debug!(path = %store.path().display(), "using book database");
        Ok(Self::with_store(config, Box::new(store)))
    }

    pub fn with_store(config: Config, store: Box<dyn BookStore>) -> Self {
        Self { config, store }
    }

    pub fn store(&self) -> &dyn BookStore {
        self.store.as_ref()
    }

    /// Create a book, settling the topic first, then confirm every field.
    pub fn create<'a>(
        &'a mut self,
        mut io: Interaction<'a>,
        options: CreateOptions,
    ) -> SessionResult<u64> {
        io.console.say("Creating a new book...");
        let mut book = options.into_book();

        let prompt = render(PromptKind::Topic, &book.prompt_vars());
        book.topic = text_cycle(&mut io, Field::Topic.as_str(), book.topic.take(), &prompt, false)?;

        io.console.say(&format!(
            "Creating new book with topic: {}...",
            book.topic.as_deref().unwrap_or_default()
        ));
        let book_id = self.store.insert(book)?;
        io.console.say(&format!("Book created with id {book_id}."));
        tracing::info!(book_id, "created book");

        let book = self.store.get(book_id)?.ok_or(StoreError::NotFound(book_id))?;
        let mut session = Session::new(book_id, book, self.store.as_mut(), io);
        run_workflow(&mut session, Policy::Confirm)?;
        Ok(book_id)
    }

    /// Resume a book, or edit a single step of it.
    pub fn edit<'a>(
        &'a mut self,
        io: Interaction<'a>,
        book_id: u64,
        field: Option<&str>,
    ) -> SessionResult<()> {
        io.console.say("Editing a saved book...");
        let Some(book) = self.store.get(book_id)? else {
            io.console.say(&StoreError::NotFound(book_id).to_string());
            return Ok(());
        };

        let step = match field {
            Some(name) => match descriptor(name) {
                Some(step) => Some(step),
                None => {
                    io.console.say(&format!("Unknown field {name}."));
                    return Ok(());
                }
            },
            None => None,
        };

        let mut session = Session::new(book_id, book, self.store.as_mut(), io);
        match step {
            Some(step) => run_field(&mut session, step),
            None => run_workflow(&mut session, Policy::Populate),
        }
    }

    /// List books that cannot be exported yet.
    pub fn list_unfinished(&self, console: &mut dyn Console) -> anyhow::Result<()> {
        console.say("Unfinished books:\n");
        list_id_and_topic(console, &self.store.unfinished()?);
        Ok(())
    }

    /// List every book by id and topic.
    pub fn list_all(&self, console: &mut dyn Console) -> anyhow::Result<()> {
        console.say("Listing all books...\n");
        list_id_and_topic(console, &self.store.all()?);
        Ok(())
    }

    /// Print every field of one book.
    pub fn list_one(&self, console: &mut dyn Console, book_id: u64) -> anyhow::Result<()> {
        let Some(book) = self.store.get(book_id)? else {
            console.say(&format!("book_id {book_id} not found"));
            return Ok(());
        };

        console.say(&format!("Listing book {book_id}..."));
        for field in Field::ALL {
            if let Some(value) = book.get(field) {
                console.say(&format!("\n{field}:\n{}", serde_json::to_string_pretty(&value)?));
            }
        }
        console.say(&format!("\ncategory:\n{}", book.category));
        Ok(())
    }

    /// Delete a whole book or one of its fields.
    pub fn delete(
        &mut self,
        console: &mut dyn Console,
        book_id: u64,
        field: Option<Field>,
    ) -> anyhow::Result<()> {
        match field {
            Some(field) => match self.store.delete_field(book_id, field) {
                Ok(()) => console.say(&format!("Deleted field {field} from book {book_id}.")),
                Err(StoreError::NotFound(_)) => {
                    console.say(&StoreError::NotFound(book_id).to_string());
                }
                Err(e) => return Err(e.into()),
            },
            None => {
                if self.store.delete(book_id)? {
                    console.say(&format!("Deleted book {book_id}."));
                } else {
                    console.say(&StoreError::NotFound(book_id).to_string());
                }
            }
        }
        Ok(())
    }

    /// Write a book's chapters to a file.
    pub fn export(
        &self,
        console: &mut dyn Console,
        book_id: u64,
        path: &Path,
        format: ExportFormat,
    ) -> anyhow::Result<()> {
        console.say("Exporting a saved book...");
        let Some(book) = self.store.get(book_id)? else {
            console.say(&StoreError::NotFound(book_id).to_string());
            return Ok(());
        };

        if !book.has(Field::Chapters) {
            console.say("Book does not have any saved chapters yet.");
            return Ok(());
        }

        match format {
            ExportFormat::Epub => export_to_epub(&book, path)?,
            ExportFormat::Txt => export_to_text(&book, path)?,
        }
        console.say(&format!("Book exported to {}.", path.display()));
        Ok(())
    }
}

fn list_id_and_topic(console: &mut dyn Console, books: &[(u64, Book)]) {
    if books.is_empty() {
        console.say("No books found.");
        return;
    }
    for (id, book) in books {
        console.say(&format!("id: {id}\ttopic: {}", book.topic.as_deref().unwrap_or_default()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ScriptedGenerator;
    use crate::book::{Chapter, MemoryStore};
    use crate::prompt::{ScriptedConsole, ScriptedEditor};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn app_with(books: Vec<Book>) -> App {
        let mut store = MemoryStore::new();
        for book in books {
            store.insert(book).unwrap();
        }
        App::with_store(Config::default(), Box::new(store))
    }

    fn finished() -> Book {
        Book {
            topic: Some("tides".to_string()),
            title: Some("Salt".to_string()),
            author: Some("Ann".to_string()),
            chapters: Some(vec![Chapter::new("I. Ebb", vec!["1. Low water".to_string()])]),
            ..Book::default()
        }
    }

    #[test]
    fn test_list_all_and_empty() {
        let mut console = ScriptedConsole::default();
        app_with(Vec::new()).list_all(&mut console).unwrap();
        assert_eq!(console.transcript(), &["Listing all books...\n", "No books found."]);

        let mut console = ScriptedConsole::default();
        app_with(vec![finished()]).list_all(&mut console).unwrap();
        assert_eq!(console.transcript()[1], "id: 1\ttopic: tides");
    }

    #[test]
    fn test_list_unfinished() {
        let unfinished = Book { topic: Some("reefs".to_string()), ..Book::default() };
        let mut console = ScriptedConsole::default();
        app_with(vec![finished(), unfinished]).list_unfinished(&mut console).unwrap();
        assert_eq!(console.transcript(), &["Unfinished books:\n", "id: 2\ttopic: reefs"]);
    }

    #[test]
    fn test_list_one_missing() {
        let mut console = ScriptedConsole::default();
        app_with(Vec::new()).list_one(&mut console, 4).unwrap();
        assert_eq!(console.transcript(), &["book_id 4 not found"]);
    }

    #[test]
    fn test_list_one_prints_present_fields() {
        let mut console = ScriptedConsole::default();
        app_with(vec![finished()]).list_one(&mut console, 1).unwrap();
        let shown = console.transcript().join("\n");
        assert!(shown.contains("\ntitle:\n\"Salt\""));
        assert!(shown.contains("\"header\": \"I. Ebb\""));
        assert!(!shown.contains("outline:"));
    }

    #[test]
    fn test_delete_field_and_book() {
        let mut app = app_with(vec![finished()]);
        let mut console = ScriptedConsole::default();

        app.delete(&mut console, 1, Some(Field::Author)).unwrap();
        assert!(app.store().get(1).unwrap().unwrap().author.is_none());

        app.delete(&mut console, 1, None).unwrap();
        app.delete(&mut console, 1, None).unwrap();
        assert_eq!(
            console.transcript(),
            &["Deleted field author from book 1.", "Deleted book 1.", "No book 1 in database."]
        );
    }

    #[test]
    fn test_export_requires_chapters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.txt");
        let mut console = ScriptedConsole::default();

        let app = app_with(vec![Book { title: Some("Draft".to_string()), ..Book::default() }]);
        app.export(&mut console, 1, &path, ExportFormat::Txt).unwrap();
        assert_eq!(console.transcript()[1], "Book does not have any saved chapters yet.");
        assert!(!path.exists());

        let app = app_with(vec![finished()]);
        app.export(&mut console, 1, &path, ExportFormat::Txt).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("Salt\n\nAnn\n\n\n\nI. Ebb"));
    }

    #[test]
    fn test_export_epub() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("salt.epub");
        let mut console = ScriptedConsole::default();

        app_with(vec![finished()]).export(&mut console, 1, &path, ExportFormat::Epub).unwrap();
        assert!(std::fs::read(&path).unwrap().starts_with(b"PK"));
        assert_eq!(console.transcript()[1], format!("Book exported to {}.", path.display()));
    }

    #[test]
    fn test_edit_missing_book() {
        let mut app = app_with(Vec::new());
        let mut console = ScriptedConsole::default();
        let mut editor = ScriptedEditor::default();
        let mut generator = ScriptedGenerator::default();
        let mut rng = StdRng::seed_from_u64(3);
        let io = Interaction::new(&mut console, &mut editor, &mut generator, &mut rng);

        app.edit(io, 9, None).unwrap();
        assert_eq!(console.transcript(), &["Editing a saved book...", "No book 9 in database."]);
    }

    #[test]
    fn test_edit_single_field() {
        let mut app = app_with(vec![finished()]);
        let mut console = ScriptedConsole::new(["g", "y"]);
        let mut editor = ScriptedEditor::default();
        let mut generator = ScriptedGenerator::new(["Brine"]);
        let mut rng = StdRng::seed_from_u64(3);
        let io = Interaction::new(&mut console, &mut editor, &mut generator, &mut rng);

        app.edit(io, 1, Some("title")).unwrap();
        assert_eq!(app.store().get(1).unwrap().unwrap().title.as_deref(), Some("Brine"));
    }

    #[test]
    fn test_create_saves_topic_before_quit() {
        let mut app = app_with(Vec::new());
        // accept the given topic, then quit at the title prompt
        let mut console = ScriptedConsole::new(["", "q"]);
        let mut editor = ScriptedEditor::default();
        let mut generator = ScriptedGenerator::default();
        let mut rng = StdRng::seed_from_u64(3);
        let io = Interaction::new(&mut console, &mut editor, &mut generator, &mut rng);

        let options =
            CreateOptions { topic: Some("estuaries".to_string()), ..CreateOptions::default() };
        let err = app.create(io, options).unwrap_err();
        assert!(err.is_quit());

        let books = app.store().all().unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].1.topic.as_deref(), Some("estuaries"));
        assert!(console.transcript().contains(&"Book created with id 1.".to_string()));
    }
}
