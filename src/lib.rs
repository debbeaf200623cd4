//! # Autobook
//!
//! Assemble long-form books from AI-generated and hand-edited content.
//!
//! A book is built one field at a time: topic, title, author, number of
//! chapters, outline, and finally the chapters themselves. Each field is
//! generated from a prompt, edited in `$EDITOR`, or accepted as is, and is
//! saved the moment it is accepted so a session can be quit and resumed.
//!
//! ## Quick Start
//!
//! ```bash
//! # Start a book
//! autobook create -o "tide pools"
//!
//! # Pick up where you left off
//! autobook edit 1
//!
//! # Write the finished chapters out
//! autobook export 1 book.epub
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::needless_lifetimes)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::use_self)]

pub mod ai;
pub mod app;
pub mod book;
pub mod core;
pub mod error;
pub mod prompt;
pub mod workflow;

// Re-export commonly used types
pub use app::{App, CreateOptions, ExportFormat};
pub use book::{Book, BookStore, Category, Chapter, Field, JsonStore, MemoryStore};
pub use core::Config;
pub use error::{SessionError, SessionResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
