//! Book export: epub and plain text.

use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use chrono::Datelike;
use epub_builder::{EpubBuilder, EpubContent, ReferenceType, ZipLibrary};
use thiserror::Error;

use super::Book;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors that can occur while writing an exported book.
#[derive(Debug, Error)]
pub enum ExportError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The epub archive could not be assembled.
    #[error("Failed to build epub: {0}")]
    Epub(String),
}

fn epub_error(e: impl fmt::Display) -> ExportError {
    ExportError::Epub(e.to_string())
}

const STYLESHEET: &str = "\
body { font-family: serif; line-height: 1.4; margin: 0 5%; }
h1.title { margin-top: 30%; text-align: center; }
h2.author { text-align: center; font-weight: normal; }
h2 { margin: 2em 0 1em; }
p { text-indent: 1.5em; margin: 0; }
p.copyright { text-indent: 0; margin-bottom: 1em; font-size: 0.8em; }
";

const RIGHTS_NOTICE: &str = "This book or any portion thereof may not be reproduced or used in \
any manner whatsoever without the express written permission of the publisher except for the \
use of brief quotations in a book review.";

/// Render a book as plain text: title, author, then each chapter's header
/// and content.
pub fn render_text(book: &Book) -> String {
    let mut text = String::new();
    text.push_str(book.title.as_deref().unwrap_or(""));
    text.push_str("\n\n");
    text.push_str(book.author.as_deref().unwrap_or(""));
    text.push_str("\n\n\n\n");

    for chapter in book.chapter_list() {
        text.push_str(&chapter.header);
        text.push_str("\n\n");
        text.push_str(&chapter.content);
        text.push_str("\n\n\n\n");
    }

    text
}

/// Write a book to `path` as plain text, creating parent directories.
pub fn export_to_text(book: &Book, path: &Path) -> ExportResult<()> {
    create_parent(path)?;
    fs::write(path, render_text(book))?;
    tracing::info!(path = %path.display(), "exported book as text");
    Ok(())
}

/// Write a book to `path` as an epub, creating parent directories.
pub fn export_to_epub(book: &Book, path: &Path) -> ExportResult<()> {
    create_parent(path)?;
    let file = File::create(path)?;
    write_epub(book, chrono::Local::now().year(), file)?;
    tracing::info!(path = %path.display(), "exported book as epub");
    Ok(())
}

/// Assemble the epub archive into `out`.
///
/// Pages in reading order: title, copyright, table of contents, then one
/// page per chapter.
fn write_epub<W: Write>(book: &Book, year: i32, out: W) -> ExportResult<()> {
    let title = book.title.as_deref().unwrap_or_default();
    let author = book.author.as_deref().unwrap_or_default();

    let title_page = xhtml_page(
        "Title",
        &format!(
            "<h1 class=\"title\">{}</h1>\n<h2 class=\"author\">{}</h2>\n",
            escape(title),
            escape(author)
        ),
    );
    let copyright = format!("Copyright © {year} by {author}. All rights reserved.");
    let copyright_page = xhtml_page(
        "Copyright",
        &format!(
            "<p class=\"copyright\">{}</p>\n<p class=\"copyright\">{}</p>\n",
            escape(&copyright),
            RIGHTS_NOTICE
        ),
    );

    let zip = ZipLibrary::new().map_err(epub_error)?;
    let mut builder = EpubBuilder::new(zip).map_err(epub_error)?;
    builder.metadata("title", title).map_err(epub_error)?;
    builder.metadata("author", author).map_err(epub_error)?;
    builder.metadata("lang", "en").map_err(epub_error)?;
    builder.metadata("generator", "autobook").map_err(epub_error)?;
    builder.stylesheet(STYLESHEET.as_bytes()).map_err(epub_error)?;

    builder
        .add_content(
            EpubContent::new("title.xhtml", title_page.as_bytes())
                .reftype(ReferenceType::TitlePage),
        )
        .map_err(epub_error)?;
    builder
        .add_content(
            EpubContent::new("copyright.xhtml", copyright_page.as_bytes())
                .reftype(ReferenceType::Copyright),
        )
        .map_err(epub_error)?;
    builder.inline_toc();

    for (n, chapter) in book.chapter_list().iter().enumerate() {
        let n = n + 1;
        let header =
            if chapter.header.is_empty() { format!("Chapter {n}") } else { chapter.header.clone() };
        let page = chapter_page(&header, &chapter.content);
        builder
            .add_content(
                EpubContent::new(format!("chapter_{n}.xhtml"), page.as_bytes())
                    .title(header)
                    .reftype(ReferenceType::Text),
            )
            .map_err(epub_error)?;
    }

    builder.generate(out).map_err(epub_error)?;
    Ok(())
}

/// A chapter page: the header, then one paragraph per non-blank line.
fn chapter_page(header: &str, content: &str) -> String {
    let mut body = format!("<h2>{}</h2>\n", escape(header));
    for line in content.lines().map(str::trim).filter(|line| !line.is_empty()) {
        body.push_str(&format!("<p>{}</p>\n", escape(line)));
    }
    xhtml_page(header, &body)
}

fn xhtml_page(title: &str, body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <html xmlns=\"http://www.w3.org/1999/xhtml\" xml:lang=\"en\">\n\
         <head>\n\
         <title>{}</title>\n\
         <link rel=\"stylesheet\" type=\"text/css\" href=\"stylesheet.css\"/>\n\
         </head>\n\
         <body>\n{body}</body>\n\
         </html>\n",
        escape(title)
    )
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn create_parent(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
