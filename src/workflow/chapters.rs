//! Chapter editor: a nested menu that edits the chapter list in place.

use crate::book::Chapter;
use crate::error::SessionResult;
use crate::prompt::{ask, choose, Console, InputMode, MenuOption, Options, Selection};

use super::fields::MenuSignal;
use super::generate::{update_chapter_part, ChapterPart};
use super::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    AddContent,
    EditOutline,
    Insert,
    Move,
    Delete,
    DeleteContent,
    Cancel,
}

const COMMANDS: [(&str, Command, &str); 6] = [
    (
        "Add/edit chapter content",
        Command::AddContent,
        "Select a chapter to add its content if it is marked unwritten, or edit its existing content",
    ),
    (
        "Edit chapter header and sections",
        Command::EditOutline,
        "Select a chapter to change its header and sections through generation or editing",
    ),
    (
        "Add new chapter",
        Command::Insert,
        "Select a spot to insert a new chapter, or add one to the end of the book",
    ),
    (
        "Move existing chapter",
        Command::Move,
        "Select a chapter to move it to another place in the book",
    ),
    (
        "Delete chapter",
        Command::Delete,
        "Select a chapter to delete it entirely (cannot undo once confirmed)",
    ),
    (
        "Delete chapter content",
        Command::DeleteContent,
        "Select a chapter to delete only its content, leaving the header and sections untouched",
    ),
];

const CANCEL_HELP: &str = "cancel the current task and return to the home menu";

/// Render the chapter list shown above the menu.
pub fn format_chapters(chapters: &[Chapter]) -> String {
    let mut text = String::from("\n");
    for (i, chapter) in chapters.iter().enumerate() {
        text.push_str(&format!("[{}] {}", i + 1, chapter.header));
        if !chapter.is_written() {
            text.push_str(" (unwritten)");
        }
        text.push('\n');
        for section in &chapter.sections {
            text.push_str(&format!("\t{section}\n"));
        }
    }
    text
}

fn menu_message() -> String {
    let list: Vec<String> =
        COMMANDS.iter().enumerate().map(|(i, (name, _, _))| format!("{}) {name}", i + 1)).collect();
    format!("{}\nSelect an option", list.join("\n"))
}

fn menu_options() -> Options<Command> {
    let mut entries: Vec<MenuOption<Command>> = COMMANDS
        .iter()
        .enumerate()
        .map(|(i, (_, command, help))| MenuOption::new((i + 1).to_string(), *command, *help))
        .collect();
    entries.push(MenuOption::new("c", Command::Cancel, CANCEL_HELP));
    Options::new(entries)
}

/// Show the chapter list, ask for one command and run it.
pub fn chapter_menu(session: &mut Session<'_>) -> SessionResult<MenuSignal> {
    session.io.console.say(&format_chapters(session.book.chapter_list()));

    let command = choose(session.io.console, &menu_message(), &menu_options(), "1")?;
    tracing::debug!(?command, "chapter command");

    match command {
        Command::AddContent => add_content(session)?,
        Command::EditOutline => edit_outline(session)?,
        Command::Insert => insert_chapter(session)?,
        Command::Move => move_chapter(session)?,
        Command::Delete => delete_chapter(session)?,
        Command::DeleteContent => delete_content(session)?,
        Command::Cancel => return Ok(MenuSignal::Cancel),
    }
    Ok(MenuSignal::Continue)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pick {
    Enter,
    Cancel,
}

/// What pressing enter means in an index prompt.
#[derive(Debug, Clone, Copy)]
enum OnEnter {
    /// Not allowed.
    Nothing,
    /// First chapter without content.
    NextUnwritten,
    /// One past the last chapter.
    End,
}

/// Ask for a chapter number in `[1, len]` and return its zero-based index.
///
/// `None` means the user cancelled.
fn select_index(
    console: &mut dyn Console,
    message: &str,
    chapters: &[Chapter],
    on_enter: OnEnter,
) -> SessionResult<Option<usize>> {
    if chapters.is_empty() {
        return Ok(match on_enter {
            OnEnter::End => Some(0),
            OnEnter::Nothing | OnEnter::NextUnwritten => {
                console.say("No chapters yet. Add one with \"Add new chapter\".");
                None
            }
        });
    }

    let mut entries = Vec::new();
    match on_enter {
        OnEnter::Nothing => {}
        OnEnter::NextUnwritten => {
            entries.push(MenuOption::new("", Pick::Enter, "select next unwritten chapter"))
        }
        OnEnter::End => entries.push(MenuOption::new("", Pick::Enter, "add to end")),
    }
    entries.push(MenuOption::new("c", Pick::Cancel, CANCEL_HELP));
    let options = Options::new(entries);

    let len = u32::try_from(chapters.len()).unwrap_or(u32::MAX);
    let mode = InputMode::Bounded(1..=len);

    loop {
        match ask(console, message, &options, &mode)? {
            Selection::Number(n) => return Ok(Some(n as usize - 1)),
            Selection::Action(Pick::Cancel) => return Ok(None),
            Selection::Action(Pick::Enter) => match on_enter {
                OnEnter::NextUnwritten => {
                    if let Some(index) = chapters.iter().position(|c| !c.is_written()) {
                        return Ok(Some(index));
                    }
                    console.say("Every chapter has content. Select a chapter by number.");
                }
                OnEnter::End => return Ok(Some(chapters.len())),
                OnEnter::Nothing => {}
            },
        }
    }
}

fn select_chapter(session: &mut Session<'_>, info: &str) -> SessionResult<Option<usize>> {
    select_index(
        session.io.console,
        &format!("Select a chapter to {info}"),
        session.book.chapter_list(),
        OnEnter::Nothing,
    )
}

fn select_destination(session: &mut Session<'_>) -> SessionResult<Option<usize>> {
    select_index(
        session.io.console,
        "Select chapter destination, or press <enter> to add to end",
        session.book.chapter_list(),
        OnEnter::End,
    )
}

fn chapters_mut<'b>(session: &'b mut Session<'_>) -> &'b mut Vec<Chapter> {
    session.book.chapters.get_or_insert_with(Vec::new)
}

fn add_content(session: &mut Session<'_>) -> SessionResult<()> {
    let selected = select_index(
        session.io.console,
        "Select a chapter to add/edit content, or press <enter> to select the next unwritten chapter",
        session.book.chapter_list(),
        OnEnter::NextUnwritten,
    )?;
    if let Some(index) = selected {
        update_chapter_part(session, index, ChapterPart::Content)?;
    }
    Ok(())
}

fn edit_outline(session: &mut Session<'_>) -> SessionResult<()> {
    if let Some(index) = select_chapter(session, "edit the header/sections")? {
        update_chapter_part(session, index, ChapterPart::Header)?;
        update_chapter_part(session, index, ChapterPart::Sections)?;
    }
    Ok(())
}

fn insert_chapter(session: &mut Session<'_>) -> SessionResult<()> {
    if let Some(index) = select_destination(session)? {
        let chapters = chapters_mut(session);
        let index = index.min(chapters.len());
        chapters.insert(index, Chapter::placeholder());
        update_chapter_part(session, index, ChapterPart::Header)?;
        update_chapter_part(session, index, ChapterPart::Sections)?;
    }
    Ok(())
}

fn move_chapter(session: &mut Session<'_>) -> SessionResult<()> {
    let Some(from) = select_chapter(session, "move")? else {
        return Ok(());
    };
    let Some(to) = select_destination(session)? else {
        return Ok(());
    };
    move_within(chapters_mut(session), from, to);
    Ok(())
}

/// Remove the chapter at `from` and insert it at `to`, counted after removal.
fn move_within(chapters: &mut Vec<Chapter>, from: usize, to: usize) {
    if from >= chapters.len() {
        return;
    }
    let chapter = chapters.remove(from);
    let to = to.min(chapters.len());
    chapters.insert(to, chapter);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Confirm {
    Yes,
    No,
}

fn confirm(session: &mut Session<'_>, message: &str) -> SessionResult<bool> {
    let options = Options::new(vec![
        MenuOption::new("y", Confirm::Yes, "confirm"),
        MenuOption::new("n", Confirm::No, "keep it"),
    ]);
    Ok(choose(session.io.console, message, &options, "n")? == Confirm::Yes)
}

fn delete_chapter(session: &mut Session<'_>) -> SessionResult<()> {
    if let Some(index) = select_chapter(session, "delete")? {
        if confirm(session, &format!("Confirm delete chapter {}?", index + 1))? {
            chapters_mut(session).remove(index);
        }
    }
    Ok(())
}

fn delete_content(session: &mut Session<'_>) -> SessionResult<()> {
    if let Some(index) = select_chapter(session, "delete content only")? {
        if confirm(session, &format!("Confirm delete content of chapter {}?", index + 1))? {
            if let Some(chapter) = chapters_mut(session).get_mut(index) {
                chapter.content.clear();
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ScriptedGenerator;
    use crate::book::{Book, BookStore, MemoryStore};
    use crate::prompt::{ScriptedConsole, ScriptedEditor};
    use crate::workflow::session::Interaction;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn chapter(header: &str, content: &str) -> Chapter {
        Chapter {
            header: header.to_string(),
            sections: vec![format!("1. {header} section")],
            content: content.to_string(),
        }
    }

    fn sample_book() -> Book {
        Book {
            topic: Some("lighthouses".to_string()),
            title: Some("Lamps".to_string()),
            author: Some("R. Keeper".to_string()),
            chapters: Some(vec![
                chapter("I. One", "written"),
                chapter("II. Two", ""),
                chapter("III. Three", ""),
            ]),
            ..Book::default()
        }
    }

    type Outcome = (MenuSignal, Book, ScriptedConsole, ScriptedGenerator);

    /// Run one chapter menu command against `sample_book()` and return the result.
    fn run(answers: &[&str], generator: ScriptedGenerator) -> Outcome {
        run_on(sample_book(), answers, generator)
    }

    fn run_on(start: Book, answers: &[&str], generator: ScriptedGenerator) -> Outcome {
        let mut console = ScriptedConsole::new(answers.iter().copied());
        let mut editor = ScriptedEditor::default();
        let mut generator = generator;
        let mut rng = StdRng::seed_from_u64(1);
        let mut store = MemoryStore::new();
        let id = store.insert(start.clone()).unwrap();

        let io = Interaction::new(&mut console, &mut editor, &mut generator, &mut rng);
        let mut session = Session::new(id, start, &mut store, io);
        let signal = chapter_menu(&mut session).unwrap();
        let book = session.into_book();
        (signal, book, console, generator)
    }

    fn headers(book: &Book) -> Vec<&str> {
        book.chapter_list().iter().map(|c| c.header.as_str()).collect()
    }

    #[test]
    fn test_format_chapters() {
        assert_eq!(
            format_chapters(sample_book().chapter_list()),
            "\n[1] I. One\n\t1. I. One section\n\
             [2] II. Two (unwritten)\n\t1. II. Two section\n\
             [3] III. Three (unwritten)\n\t1. III. Three section\n"
        );
    }

    #[test]
    fn test_menu_prompt() {
        let (signal, _, console, _) = run(&["c"], ScriptedGenerator::default());
        assert_eq!(signal, MenuSignal::Cancel);
        assert_eq!(
            console.prompts(),
            vec![
                "1) Add/edit chapter content\n2) Edit chapter header and sections\n\
                 3) Add new chapter\n4) Move existing chapter\n5) Delete chapter\n\
                 6) Delete chapter content\nSelect an option (1/2/3/4/5/6/c/?/q) (default 1): "
            ]
        );
    }

    #[test]
    fn test_enter_picks_next_unwritten_chapter() {
        // default command, next unwritten chapter, generate, accept
        let (signal, book, _, generator) =
            run(&["", "", "", "y"], ScriptedGenerator::new(["Chapter two text."]));

        assert_eq!(signal, MenuSignal::Continue);
        assert_eq!(book.chapter_list()[1].content, "Chapter two text.");
        let prompt = &generator.prompts()[0];
        assert!(prompt.contains("Write the full text of II. Two,"));
        assert!(prompt.contains("I. One\n1. I. One section\nII. Two\n"));
    }

    #[test]
    fn test_index_selection_cancel_returns_to_menu() {
        let (signal, book, _, _) = run(&["4", "c"], ScriptedGenerator::default());
        assert_eq!(signal, MenuSignal::Continue);
        assert_eq!(book, sample_book());
    }

    #[test]
    fn test_move_forward() {
        let (_, book, _, _) = run(&["4", "1", "3"], ScriptedGenerator::default());
        assert_eq!(headers(&book), vec!["II. Two", "III. Three", "I. One"]);
    }

    #[test]
    fn test_move_onto_itself() {
        let (_, book, _, _) = run(&["4", "2", "2"], ScriptedGenerator::default());
        assert_eq!(headers(&book), vec!["I. One", "II. Two", "III. Three"]);
    }

    #[test]
    fn test_move_to_end() {
        let (_, book, _, _) = run(&["4", "1", ""], ScriptedGenerator::default());
        assert_eq!(headers(&book), vec!["II. Two", "III. Three", "I. One"]);
    }

    #[test]
    fn test_move_within_semantics() {
        let mut chapters: Vec<Chapter> =
            ["a", "b", "c", "d"].iter().map(|h| Chapter::new(*h, Vec::new())).collect();
        move_within(&mut chapters, 0, 2);
        let order: Vec<&str> = chapters.iter().map(|c| c.header.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn test_delete_declined() {
        let (_, book, console, _) = run(&["5", "2", "n"], ScriptedGenerator::default());
        assert_eq!(book, sample_book());
        assert!(console.prompts().contains(&"Confirm delete chapter 2? (N/y/?/q): "));
    }

    #[test]
    fn test_delete_defaults_to_no() {
        let (_, book, _, _) = run(&["5", "2", ""], ScriptedGenerator::default());
        assert_eq!(book.chapter_list().len(), 3);
    }

    #[test]
    fn test_delete_confirmation_reprompts_on_garbage() {
        let (_, book, _, _) = run(&["5", "2", "sure", "y"], ScriptedGenerator::default());
        assert_eq!(headers(&book), vec!["I. One", "III. Three"]);
    }

    #[test]
    fn test_delete_content() {
        let (_, book, _, _) = run(&["6", "1", "y"], ScriptedGenerator::default());
        assert!(!book.chapter_list()[0].is_written());
        assert_eq!(book.chapter_list()[0].header, "I. One");
    }

    #[test]
    fn test_insert_new_chapter() {
        let generator = ScriptedGenerator::new(["II. Interlude", "1. Pause\n2. Breath"]);
        // command 3, destination 2, generate header, accept, generate sections, accept
        let (_, book, _, _) = run(&["3", "2", "g", "y", "g", "y"], generator);

        assert_eq!(headers(&book), vec!["I. One", "II. Interlude", "II. Two", "III. Three"]);
        assert_eq!(book.chapter_list()[1].sections, vec!["1. Pause", "2. Breath"]);
        assert!(!book.chapter_list()[1].is_written());
    }

    #[test]
    fn test_out_of_range_index_reprompts() {
        let (_, book, console, _) = run(&["5", "9", "0", "c"], ScriptedGenerator::default());
        assert_eq!(book.chapter_list().len(), 3);
        assert_eq!(console.prompts().len(), 4);
    }

    #[test]
    fn test_empty_list_has_nothing_to_select() {
        let empty = Book { chapters: Some(Vec::new()), ..sample_book() };
        for command in ["1", "2", "4", "5", "6"] {
            let (signal, book, console, _) =
                run_on(empty.clone(), &[command], ScriptedGenerator::default());
            assert_eq!(signal, MenuSignal::Continue);
            assert!(book.chapter_list().is_empty());
            assert_eq!(console.prompts().len(), 1, "command {command} asked for an index");
            assert!(console.transcript().iter().any(|line| line.starts_with("No chapters yet.")));
        }
    }

    #[test]
    fn test_insert_into_empty_list_skips_destination() {
        let empty = Book { chapters: Some(Vec::new()), ..sample_book() };
        let generator = ScriptedGenerator::new(["I. Beginning", "1. Spark"]);
        let (_, book, console, _) = run_on(empty, &["3", "g", "y", "g", "y"], generator);

        assert_eq!(headers(&book), vec!["I. Beginning"]);
        assert!(!console.prompts().iter().any(|p| p.contains("from 1 to 0")));
    }
}
