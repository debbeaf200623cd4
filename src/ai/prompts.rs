//! Prompt templates sent to the content generator.
//!
//! Templates reference book data as `{name}`. Names without a value render
//! as an empty string.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(\w+)\}").expect("placeholder pattern is valid"));

const OUTLINE_CONTEXT: &str = "You have the following outline for a book about {topic}, \
written by {author} with the title \"{title}\":\n\n{outline}\n\n";

/// Which template to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    Topic,
    Title,
    Author,
    Outline,
    Content,
    Header,
    Sections,
}

impl PromptKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Topic => "topic",
            Self::Title => "title",
            Self::Author => "author",
            Self::Outline => "outline",
            Self::Content => "content",
            Self::Header => "header",
            Self::Sections => "sections",
        }
    }

    /// The raw template text.
    pub fn template(&self) -> String {
        match self {
            Self::Topic => "Write a topic for a book. This topic is one sentence long. \
                Only return the topic, nothing else."
                .to_string(),
            Self::Title => "Write a title for a book about {topic}. \
                Only write the title, nothing else."
                .to_string(),
            Self::Author => "Write an author name for a book about {topic}. \
                Only write the author name, nothing else."
                .to_string(),
            Self::Outline => "Generate a chapter outline for a book titled {title}. \
                It is about {topic}. It has exactly {num_chapters} chapters. \
                The outline follows the format:\nI. Chapter\n1. Section\n\
                All chapters start with Roman numerals. All sections start with Arabic numerals. \
                Include a minimum of one section and a maximum of three sections per chapter, \
                your choice. Generate exactly {num_chapters} chapters, no more and no less."
                .to_string(),
            Self::Content => format!(
                "{OUTLINE_CONTEXT}Write the full text of {{chapter}}, expanding on all sections \
                in depth. Start right at the first words, don't include the chapter title."
            ),
            Self::Header => format!(
                "{OUTLINE_CONTEXT}Write a new chapter header to replace this chapter header: \
                {{chapter}}."
            ),
            Self::Sections => format!(
                "{OUTLINE_CONTEXT}Write section headers for this chapter header: {{chapter}}."
            ),
        }
    }
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fill a template with the given variables.
pub fn render(kind: PromptKind, vars: &HashMap<&str, String>) -> String {
    PLACEHOLDER
        .replace_all(&kind.template(), |caps: &regex::Captures| {
            vars.get(&caps[1]).cloned().unwrap_or_default()
        })
        .into_owned()
}
