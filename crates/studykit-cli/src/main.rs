//! studykit CLI: turn a PDF into study material and study it in the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use studykit_core::model::{LearningMode, TestSubtype};

mod commands;

#[derive(Parser)]
#[command(
    name = "studykit",
    version,
    about = "Generate quizzes, flashcards, matching games and tests from a PDF"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the study state (overrides the config)
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter studykit.toml
    Init,

    /// Store a PDF (at most 5MB) as the current study document
    Upload {
        /// Path to the PDF
        pdf: PathBuf,
    },

    /// Forget the current document, or study progress
    Clear {
        /// Clear progress for every mode instead of the document
        #[arg(long, conflicts_with = "mode")]
        progress: bool,

        /// Clear progress for a single mode
        #[arg(long)]
        mode: Option<LearningMode>,
    },

    /// Generate study content from the document and save it as JSON
    Generate {
        /// quiz, flashcards, matching or test
        #[arg(long)]
        mode: LearningMode,

        /// Question type for tests: multiple_choice, true_false, short_answer, mixed
        #[arg(long)]
        test_type: Option<TestSubtype>,

        /// Use this PDF instead of the uploaded document
        #[arg(long)]
        pdf: Option<PathBuf>,

        /// Provider name from the config (default: config's default_provider)
        #[arg(long)]
        provider: Option<String>,

        /// Model id (default: config's default_model)
        #[arg(long)]
        model: Option<String>,

        /// Output file (default: <state>/content/<mode>-<timestamp>.json)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Check a content file against the shape of its mode
    Validate {
        /// quiz, flashcards, matching or test
        #[arg(long)]
        mode: LearningMode,

        /// Require every test item to be of this type
        #[arg(long)]
        test_type: Option<TestSubtype>,

        /// JSON content file (markdown fences are accepted)
        content: PathBuf,
    },

    /// Run an interactive study session
    Study {
        /// quiz, flashcards, matching or test
        #[arg(long)]
        mode: LearningMode,

        /// Question type for tests
        #[arg(long)]
        test_type: Option<TestSubtype>,

        /// Study this content file instead of generating from the document
        #[arg(long)]
        content: Option<PathBuf>,

        /// Generate from this PDF instead of the uploaded document
        #[arg(long, conflicts_with = "content")]
        pdf: Option<PathBuf>,

        /// Provider used when generating
        #[arg(long)]
        provider: Option<String>,

        /// Model used when generating
        #[arg(long)]
        model: Option<String>,

        /// Shuffle seed for the matching board
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show per-mode progress and last scores
    Progress,

    /// List available models
    ListModels {
        /// Filter to specific provider
        #[arg(long)]
        provider: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("studykit=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = commands::Context {
        config_path: cli.config,
        state_dir: cli.state,
    };

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Upload { pdf } => commands::upload::execute(&ctx, pdf),
        Commands::Clear { progress, mode } => commands::clear::execute(&ctx, progress, mode),
        Commands::Generate {
            mode,
            test_type,
            pdf,
            provider,
            model,
            output,
        } => {
            commands::generate::execute(&ctx, mode, test_type, pdf, provider, model, output).await
        }
        Commands::Validate {
            mode,
            test_type,
            content,
        } => commands::validate::execute(&ctx, mode, test_type, content),
        Commands::Study {
            mode,
            test_type,
            content,
            pdf,
            provider,
            model,
            seed,
        } => {
            let source = commands::study::Source { content, pdf };
            commands::study::execute(&ctx, mode, test_type, source, provider, model, seed).await
        }
        Commands::Progress => commands::progress::execute(&ctx),
        Commands::ListModels { provider } => commands::list_models::execute(&ctx, provider),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
