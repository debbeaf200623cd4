//! Generator dispatch: the generate/edit/accept cycle for each field kind.

use std::ops::RangeInclusive;

use rand::Rng;

use crate::ai::{render, PromptKind};
use crate::book::{chapters_to_outline, Chapter, Field, FieldValue};
use crate::error::SessionResult;
use crate::prompt::{ask, choose, InputMode, MenuOption, Options, Selection};

use super::fields::{FieldDescriptor, FieldKind, MenuSignal};
use super::session::{Interaction, Session};

/// Result of one turn of an accept loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<T> {
    /// Keep the current value and stop.
    Accept,
    /// A candidate value, or `None` when nothing was produced.
    Produced(Option<T>),
    /// Drop the current value and go again.
    Clear,
}

/// Run `step` until it accepts.
///
/// A produced value replaces the current one only when `keep` approves it.
pub fn until_accepted<T, S, K>(value: &mut Option<T>, mut step: S, keep: K) -> SessionResult<()>
where
    S: FnMut(Option<&T>) -> SessionResult<Step<T>>,
    K: Fn(&T) -> bool,
{
    loop {
        match step(value.as_ref())? {
            Step::Accept => return Ok(()),
            Step::Produced(Some(candidate)) if keep(&candidate) => *value = Some(candidate),
            Step::Produced(_) => {}
            Step::Clear => *value = None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextAction {
    Accept,
    Generate,
    Edit,
    Cancel,
}

const GENERATE_HELP: &str = "generate new content by sending a request to the AI";
const EDIT_HELP: &str = "edit content by opening a text editor";
const CANCEL_HELP: &str = "cancel the current task and return to the home menu";

fn text_options(has_value: bool, in_menu: bool) -> Options<TextAction> {
    let mut entries = Vec::new();
    if has_value {
        entries.push(MenuOption::new("y", TextAction::Accept, "accept the current content"));
    }
    entries.push(MenuOption::new("g", TextAction::Generate, GENERATE_HELP));
    entries.push(MenuOption::new("e", TextAction::Edit, EDIT_HELP));
    if in_menu {
        entries.push(MenuOption::new("c", TextAction::Cancel, CANCEL_HELP));
    }
    Options::new(entries)
}

/// Ask the generator for text, showing progress on the console.
fn generate_text(io: &mut Interaction<'_>, prompt: &str) -> Option<String> {
    io.console.say("Waiting for response...");
    match io.generator.generate(prompt) {
        Some(completion) => Some(completion.text),
        None => {
            io.console.say("No content was generated.");
            None
        }
    }
}

fn edit_text(io: &mut Interaction<'_>, current: Option<&str>) -> Option<String> {
    match io.editor.edit(current.unwrap_or_default()) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::warn!(error = %e, "editor failed");
            io.console.say(&format!("Editing failed: {e}"));
            None
        }
    }
}

/// Generate/edit/accept loop for a text value.
///
/// Returns the final value. `prompt` is the rendered generation prompt.
/// Inside a menu the user may also cancel, which keeps the current value.
pub fn text_cycle(
    io: &mut Interaction<'_>,
    label: &str,
    current: Option<String>,
    prompt: &str,
    in_menu: bool,
) -> SessionResult<Option<String>> {
    let mut value = current.filter(|v| !v.is_empty());
    until_accepted(
        &mut value,
        |current| {
            let (message, default) = match current {
                Some(text) => (format!("Use {label} \"{text}\"?"), "y"),
                None => (format!("Generate or edit {label}?"), "g"),
            };
            let options = text_options(current.is_some(), in_menu);
            Ok(match choose(io.console, &message, &options, default)? {
                TextAction::Accept | TextAction::Cancel => Step::Accept,
                TextAction::Generate => Step::Produced(generate_text(io, prompt)),
                TextAction::Edit => Step::Produced(edit_text(io, current.map(String::as_str))),
            })
        },
        |candidate: &String| !candidate.is_empty(),
    )?;
    Ok(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoundAction {
    Random,
    Accept,
    Reject,
}

/// Enter/confirm loop for a bounded integer.
pub fn bound_cycle(
    io: &mut Interaction<'_>,
    current: Option<u32>,
    range: &RangeInclusive<u32>,
    question: &str,
    confirm: &str,
) -> SessionResult<Option<u32>> {
    let pick = Options::new(vec![MenuOption::new(
        "g",
        BoundAction::Random,
        format!("generate a random number between {} and {}", range.start(), range.end()),
    )]);
    let yes_no = Options::new(vec![
        MenuOption::new("y", BoundAction::Accept, "accept the current value"),
        MenuOption::new("n", BoundAction::Reject, "reject the current value"),
    ]);

    let mut value = current;
    until_accepted(
        &mut value,
        |current| match current {
            None => Ok(match ask(io.console, question, &pick, &InputMode::Bounded(range.clone()))? {
                Selection::Number(n) => Step::Produced(Some(n)),
                Selection::Action(_) => Step::Produced(Some(io.rng.gen_range(range.clone()))),
            }),
            Some(n) => {
                let message = confirm.replace("{n}", &n.to_string());
                Ok(match choose(io.console, &message, &yes_no, "y")? {
                    BoundAction::Reject => Step::Clear,
                    _ => Step::Accept,
                })
            }
        },
        |n| range.contains(n),
    )?;
    Ok(value)
}

/// Run one workflow step on the session's book and persist the result.
pub fn run_field(session: &mut Session<'_>, descriptor: &FieldDescriptor) -> SessionResult<()> {
    tracing::debug!(field = descriptor.name, kind = descriptor.kind_name(), "running field");
    match &descriptor.kind {
        FieldKind::Text { field, prompt } => {
            let prompt = render(*prompt, &session.book.prompt_vars());
            let current = session.book.text(*field).map(str::to_string);
            let label = field.as_str();
            if let Some(value) = text_cycle(&mut session.io, label, current, &prompt, false)? {
                session.book.set_text(*field, Some(value));
            }
            session.save(*field)
        }
        FieldKind::Bound { field, range, question, confirm } => {
            let current = match session.book.get(*field) {
                Some(FieldValue::Number(n)) => Some(n),
                _ => None,
            };
            match bound_cycle(&mut session.io, current, range, question, confirm)? {
                Some(n) => session.book.set(*field, FieldValue::Number(n)),
                None => session.book.clear(*field),
            }
            session.save(*field)
        }
        FieldKind::Recipe { transform, target } => {
            if let Some(value) = transform(&session.book) {
                session.book.set(*target, value);
            }
            session.save(*target)
        }
        FieldKind::Menu { field, submenu } => {
            if !session.book.has(*field) {
                session.book.set(*field, FieldValue::Chapters(Vec::new()));
            }
            while submenu(session)? == MenuSignal::Continue {
                session.save(*field)?;
            }
            Ok(())
        }
    }
}

/// Which part of a chapter is being produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterPart {
    Header,
    Sections,
    Content,
}

impl ChapterPart {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Sections => "sections",
            Self::Content => "content",
        }
    }

    fn prompt_kind(&self) -> PromptKind {
        match self {
            Self::Header => PromptKind::Header,
            Self::Sections => PromptKind::Sections,
            Self::Content => PromptKind::Content,
        }
    }

    fn read(&self, chapter: &Chapter) -> String {
        match self {
            Self::Header => chapter.header.clone(),
            Self::Sections => chapter.sections.join("\n"),
            Self::Content => chapter.content.clone(),
        }
    }

    fn write(&self, chapter: &mut Chapter, value: String) {
        match self {
            Self::Header => chapter.header = value,
            Self::Sections => chapter.sections = value.split('\n').map(str::to_string).collect(),
            Self::Content => chapter.content = value,
        }
    }
}

/// Run the text cycle on one part of the chapter at `index`.
///
/// The prompt sees the book's topic, author and title, the current chapter
/// list as an outline, and the chapter's header as it was before the cycle.
pub fn update_chapter_part(
    session: &mut Session<'_>,
    index: usize,
    part: ChapterPart,
) -> SessionResult<()> {
    let Some(chapter) = session.book.chapter_list().get(index) else {
        tracing::warn!(index, "no chapter at index");
        return Ok(());
    };

    let mut vars = session.book.prompt_vars();
    vars.insert(Field::Outline.as_str(), chapters_to_outline(session.book.chapter_list()));
    vars.insert("chapter", chapter.header.clone());
    let prompt = render(part.prompt_kind(), &vars);
    let current = part.read(chapter);

    if let Some(value) = text_cycle(&mut session.io, part.label(), Some(current), &prompt, true)? {
        if let Some(chapter) = session.book.chapters.as_mut().and_then(|c| c.get_mut(index)) {
            part.write(chapter, value);
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
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Harness {
        console: ScriptedConsole,
        editor: ScriptedEditor,
        generator: ScriptedGenerator,
        rng: StdRng,
    }

    impl Harness {
        fn new(answers: &[&str], generator: ScriptedGenerator) -> Self {
            Self {
                console: ScriptedConsole::new(answers.iter().copied()),
                editor: ScriptedEditor::new(["edited by hand"]),
                generator,
                rng: StdRng::seed_from_u64(7),
            }
        }

        fn io(&mut self) -> Interaction<'_> {
            let Self { console, editor, generator, rng } = self;
            Interaction::new(console, editor, generator, rng)
        }
    }

    #[test]
    fn test_until_accepted_applies_steps_in_order() {
        let mut steps = vec![
            Step::Produced(Some(String::new())),
            Step::Produced(Some("kept".to_string())),
            Step::Produced(None),
            Step::Accept,
        ]
        .into_iter();
        let mut seen = Vec::new();
        let mut value = None;

        until_accepted(
            &mut value,
            |current: Option<&String>| {
                seen.push(current.cloned());
                Ok(steps.next().unwrap_or(Step::Accept))
            },
            |v: &String| !v.is_empty(),
        )
        .unwrap();

        assert_eq!(value.as_deref(), Some("kept"));
        assert_eq!(seen, vec![None, None, Some("kept".to_string()), Some("kept".to_string())]);
    }

    #[test]
    fn test_text_cycle_generate_then_accept() {
        let mut harness = Harness::new(&["", ""], ScriptedGenerator::new(["Salt Roads"]));
        let value = text_cycle(&mut harness.io(), "title", None, "PROMPT", false).unwrap();

        assert_eq!(value.as_deref(), Some("Salt Roads"));
        assert_eq!(harness.generator.prompts(), &["PROMPT"]);
        assert_eq!(
            harness.console.prompts(),
            vec!["Generate or edit title? (G/e/?/q): ", "Use title \"Salt Roads\"? (Y/g/e/?/q): "]
        );
    }

    #[test]
    fn test_text_cycle_failed_generation_keeps_value() {
        let mut harness = Harness::new(&["g", "y"], ScriptedGenerator::default());
        let value =
            text_cycle(&mut harness.io(), "author", Some("Ann".into()), "PROMPT", false).unwrap();

        assert_eq!(value.as_deref(), Some("Ann"));
        assert!(harness.console.transcript().iter().any(|l| l == "Waiting for response..."));
    }

    #[test]
    fn test_text_cycle_edit_seeds_editor() {
        let mut harness = Harness::new(&["e", "y"], ScriptedGenerator::default());
        let value =
            text_cycle(&mut harness.io(), "title", Some("Draft".into()), "PROMPT", false).unwrap();

        assert_eq!(value.as_deref(), Some("edited by hand"));
        assert_eq!(harness.editor.seen(), &["Draft"]);
    }

    #[test]
    fn test_text_cycle_cancel_inside_menu() {
        let mut harness = Harness::new(&["c"], ScriptedGenerator::default());
        let value = text_cycle(&mut harness.io(), "content", None, "PROMPT", true).unwrap();

        assert_eq!(value, None);
        assert_eq!(harness.console.prompts(), vec!["Generate or edit content? (G/e/c/?/q): "]);
    }

    #[test]
    fn test_text_cycle_quit() {
        let mut harness = Harness::new(&["q"], ScriptedGenerator::default());
        let err = text_cycle(&mut harness.io(), "title", None, "PROMPT", false).unwrap_err();
        assert!(err.is_quit());
    }

    #[test]
    fn test_bound_cycle_rejects_then_accepts() {
        let mut harness = Harness::new(&["2", "5", "n", "7", ""], ScriptedGenerator::default());
        let value = bound_cycle(
            &mut harness.io(),
            None,
            &(3..=20),
            "How many chapters?",
            "Generate outline with {n} chapters?",
        )
        .unwrap();

        assert_eq!(value, Some(7));
        assert_eq!(
            harness.console.prompts(),
            vec![
                "How many chapters? (enter a number from 3 to 20) (g/?/q): ",
                "How many chapters? (enter a number from 3 to 20) (g/?/q): ",
                "Generate outline with 5 chapters? (Y/n/?/q): ",
                "How many chapters? (enter a number from 3 to 20) (g/?/q): ",
                "Generate outline with 7 chapters? (Y/n/?/q): ",
            ]
        );
    }

    #[test]
    fn test_bound_cycle_random_stays_in_range() {
        let mut harness = Harness::new(&["g", "y"], ScriptedGenerator::default());
        let value = bound_cycle(&mut harness.io(), None, &(3..=20), "How many?", "Use {n}?")
            .unwrap()
            .unwrap();
        assert!((3..=20).contains(&value));
    }

    #[test]
    fn test_run_field_saves_text() {
        let mut harness = Harness::new(&["", ""], ScriptedGenerator::new(["The Long Shore"]));
        let mut store = MemoryStore::new();
        let book = Book { topic: Some("coastlines".to_string()), ..Book::default() };
        let id = store.insert(book.clone()).unwrap();

        let mut session = Session::new(id, book, &mut store, harness.io());
        run_field(&mut session, super::super::fields::descriptor("title").unwrap()).unwrap();
        drop(session);

        assert_eq!(store.get(id).unwrap().unwrap().title.as_deref(), Some("The Long Shore"));
        assert!(harness.generator.prompts()[0].contains("about coastlines"));
    }

    #[test]
    fn test_sections_are_joined_and_split() {
        let mut harness = Harness::new(&["e", "y"], ScriptedGenerator::default());
        harness.editor = ScriptedEditor::new(["1. One\n2. Two\n3. Three"]);
        let mut store = MemoryStore::new();
        let book = Book {
            chapters: Some(vec![Chapter::new("I. Start", vec!["1. A".into(), "2. B".into()])]),
            ..Book::default()
        };
        let id = store.insert(book.clone()).unwrap();

        let mut session = Session::new(id, book, &mut store, harness.io());
        update_chapter_part(&mut session, 0, ChapterPart::Sections).unwrap();
        let book = session.into_book();

        assert_eq!(book.chapter_list()[0].sections, vec!["1. One", "2. Two", "3. Three"]);
        assert_eq!(harness.editor.seen(), &["1. A\n2. B"]);
    }
}
