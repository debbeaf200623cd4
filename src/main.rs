//! Autobook - assemble long-form books from AI-generated content.

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use rand::rngs::ThreadRng;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use autobook::ai::{BlockingGenerator, ContentGenerator, OfflineGenerator};
use autobook::prompt::{ExternalEditor, StdConsole};
use autobook::workflow::{Interaction, DESCRIPTOR_NAMES};
use autobook::{App, Category, Config, CreateOptions, ExportFormat, Field, SessionError};

/// Assemble long-form books from AI-generated and hand-edited content
#[derive(Parser)]
#[command(name = "autobook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new book
    Create {
        /// Book category (defaults to the configured category)
        #[arg(short, long, value_enum)]
        category: Option<Category>,

        /// Topic of the book
        #[arg(short = 'o', long)]
        topic: Option<String>,

        /// Number of chapters
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(3..=20))]
        num_chapters: Option<u32>,

        /// Author name
        #[arg(short, long)]
        author: Option<String>,

        /// Book title
        #[arg(short, long)]
        title: Option<String>,
    },

    /// List saved books, or every field of one book
    List {
        /// Book to show in full
        book_id: Option<u64>,
    },

    /// Resume a saved book, or edit one of its fields
    Edit {
        /// Book to edit (lists unfinished books when omitted)
        book_id: Option<u64>,

        /// Field to edit
        #[arg(value_parser = PossibleValuesParser::new(DESCRIPTOR_NAMES))]
        field: Option<String>,
    },

    /// Delete a book, or one field of it
    Delete {
        /// Book to delete from
        book_id: u64,

        /// Field to delete (the whole book when omitted)
        #[arg(value_enum)]
        field: Option<Field>,
    },

    /// Export a book's chapters to a file
    Export {
        /// Book to export
        book_id: u64,

        /// Output file
        path: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Epub)]
        format: ExportFormat,
    },

    /// Show configuration
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    // Setup logging
    let filter = if cli.verbose { EnvFilter::new("debug") } else { EnvFilter::new("warn") };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();

    let result = match cli.command {
        Commands::Config { path } => return cmd_config(path),
        Commands::Completions { shell } => {
            cmd_completions(shell);
            return Ok(());
        }
        command => run(command),
    };

    match result {
        Err(e) if e.downcast_ref::<SessionError>().is_some_and(SessionError::is_quit) => {
            println!("Quitting...");
            Ok(())
        }
        other => other,
    }
}

/// Run a book command against the configured database.
fn run(command: Commands) -> Result<()> {
    let config = Config::load()?;
    let mut app = App::new(config)?;
    let mut console = StdConsole::new();

    match command {
        Commands::Create { category, topic, num_chapters, author, title } => {
            let options = CreateOptions {
                category: category.unwrap_or(app.config.general.category),
                topic,
                title,
                author,
                num_chapters,
            };
            let mut tools = Tools::new(&app.config);
            app.create(tools.interaction(&mut console), options)?;
            Ok(())
        }
        Commands::Edit { book_id: None, .. } => app.list_unfinished(&mut console),
        Commands::Edit { book_id: Some(book_id), field } => {
            let mut tools = Tools::new(&app.config);
            app.edit(tools.interaction(&mut console), book_id, field.as_deref())?;
            Ok(())
        }
        Commands::List { book_id: Some(book_id) } => app.list_one(&mut console, book_id),
        Commands::List { book_id: None } => app.list_all(&mut console),
        Commands::Delete { book_id, field } => app.delete(&mut console, book_id, field),
        Commands::Export { book_id, path, format } => {
            app.export(&mut console, book_id, &path, format)
        }
        Commands::Config { .. } | Commands::Completions { .. } => Ok(()),
    }
}

/// Editor, generator and random source for an interactive command.
struct Tools {
    editor: ExternalEditor,
    generator: Box<dyn ContentGenerator>,
    rng: ThreadRng,
}

impl Tools {
    fn new(config: &Config) -> Self {
        let configured = BlockingGenerator::from_config(&config.ai);
        let generator: Box<dyn ContentGenerator> = match configured {
            Ok(generator) => {
                tracing::debug!(provider = generator.provider_name(), "content generation ready");
                Box::new(generator)
            }
            Err(e) => {
                tracing::debug!(error = %e, "content generation disabled");
                Box::new(OfflineGenerator::new(e.to_string()))
            }
        };

        Self {
            editor: ExternalEditor::new(config.editor_command()),
            generator,
            rng: rand::thread_rng(),
        }
    }

    fn interaction<'a>(&'a mut self, console: &'a mut StdConsole) -> Interaction<'a> {
        Interaction::new(console, &mut self.editor, self.generator.as_mut(), &mut self.rng)
    }
}

/// Generate shell completions.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "autobook", &mut io::stdout());
}

/// Show configuration.
fn cmd_config(show_path: bool) -> Result<()> {
    if show_path {
        if let Some(path) = Config::config_path() {
            println!("{}", path.display());
        }
        return Ok(());
    }

    let config = Config::load()?;
    let toml = toml::to_string_pretty(&config)?;
    println!("{toml}");

    Ok(())
}
