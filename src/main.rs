// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, Context};
use log::{info, warn, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::PathBuf;
use std::io::Write;
use std::time::{Duration, Instant};
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use colloquial::app_config::{Config, LogLevel};
use colloquial::database::models::VocabularyUpdate;
use colloquial::subtitle_processor::format_timestamp;
use colloquial::tagging::ParseOutcome;
use colloquial::Controller;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse the tags of a subtitle file, or of every subtitle file in a directory
    Parse {
        /// Subtitle file or directory
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },

    /// Write an auto-tagged copy of a subtitle file
    AutoTag {
        /// Subtitle file to tag
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output file (defaults to <name>.tagged.vtt next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Store a subtitle file as a transcript
    Import {
        /// Subtitle file to import
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Transcript title (defaults to the file name)
        #[arg(short, long)]
        title: Option<String>,

        /// Transcript language code (defaults to the configured language)
        #[arg(long)]
        language: Option<String>,
    },

    /// Auto-tag and parse a stored transcript
    Process {
        /// Transcript id
        id: i64,

        /// Replace the stored tags with the parsed ones
        #[arg(short, long)]
        save: bool,
    },

    /// Show the uniqueness score of every stored tag of a transcript
    Scores {
        /// Transcript id
        id: i64,
    },

    /// Print the tag summary of a transcript as JSON
    Summary {
        /// Transcript id
        id: i64,
    },

    /// List stored transcripts
    Transcripts,

    /// Inspect or edit the vocabulary
    Vocab {
        #[command(subcommand)]
        command: VocabCommands,
    },

    /// Generate shell completions for colloquial
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
enum VocabCommands {
    /// List vocabulary entries
    List {
        /// Only list entries of this tag type
        #[arg(short, long)]
        tag_type: Option<String>,
    },

    /// Update a vocabulary entry
    Set {
        /// Vocabulary entry id
        id: i64,

        /// Meaning of the term
        #[arg(short, long)]
        meaning: Option<String>,

        /// Whether auto-tagging may insert the term
        #[arg(short, long)]
        auto_tag: Option<bool>,
    },
}

/// Colloquial - tag proper nouns and colloquialisms in subtitle transcripts
#[derive(Parser, Debug)]
#[command(name = "colloquial")]
#[command(version)]
#[command(about = "Tag proper nouns and colloquialisms in subtitle transcripts")]
#[command(long_about = "Colloquial reads WebVTT/SRT transcripts marked up with <c.TYPE>value</c> tags,
auto-tags known vocabulary and stores every tagged occurrence with its time.

EXAMPLES:
    colloquial parse korero.vtt                 # Check the tags of a file
    colloquial parse /transcripts/              # Check every subtitle file in a directory
    colloquial auto-tag korero.vtt              # Write korero.tagged.vtt
    colloquial import korero.vtt -t \"Kōrero\"    # Store a transcript
    colloquial process 1 --save                 # Tag transcript 1 and store its tags
    colloquial scores 1                         # Uniqueness of each stored tag
    colloquial vocab set 4 --auto-tag false     # Stop auto-tagging entry 4
    colloquial completions bash > colloquial.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and emoji for a log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "❌ "),
            Level::Warn => ("1;33", "🚧 "),
            Level::Info => ("1;32", " "),
            Level::Debug => ("1;36", "🔍 "),
            Level::Trace => ("1;35", "📋 "),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (colour, emoji) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", colour, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set with set_max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "colloquial", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = Config::load_or_create(&cli.config_path)?;
    if let Some(log_level) = cli.log_level {
        config.log_level = log_level.into();
    }
    config.validate()
        .context("Configuration validation failed")?;
    log::set_max_level(config.log_level.into());

    let controller = Controller::with_config(config)?;
    let start_time = Instant::now();

    run_command(&controller, cli.command).await?;

    info!("Done in {}", format_duration(start_time.elapsed()));
    Ok(())
}

async fn run_command(controller: &Controller, command: Commands) -> Result<()> {
    match command {
        Commands::Parse { path } => {
            let reports = controller.parse_path(&path).await?;
            for report in &reports {
                println!("{}", report.path.display());
                print_outcome(&report.outcome);
            }
        }
        Commands::AutoTag { file, output } => {
            controller.auto_tag_file(&file, output.as_deref()).await?;
        }
        Commands::Import { file, title, language } => {
            let result = controller.import(&file, title.as_deref(), language.as_deref()).await?;
            if result.created {
                info!("Imported {} as transcript {}", file.display(), result.transcript.id);
            }
            println!("{}", result.transcript.id);
        }
        Commands::Process { id, save } => {
            let report = controller.process_transcript(id, save).await?;
            print_outcome(&report.outcome);
            match report.saved {
                Some(summary) => info!("{}", summary),
                None if save => warn!("Tags of {} were not saved", report.transcript),
                None => {}
            }
        }
        Commands::Scores { id } => {
            for scored in controller.scores(id).await? {
                println!(
                    "{}\t{}\t{}\t{:.4}",
                    format_timestamp(scored.tag.exact_ms),
                    scored.tag.vocabulary.tag_type,
                    scored.tag.vocabulary.display_value,
                    scored.uniqueness
                );
            }
        }
        Commands::Summary { id } => {
            println!("{}", controller.summary(id).await?.to_json()?);
        }
        Commands::Transcripts => {
            for transcript in controller.list_transcripts().await? {
                println!("{}\t{}\t{}", transcript.id, transcript.language, transcript);
            }
        }
        Commands::Vocab { command } => match command {
            VocabCommands::List { tag_type } => {
                for entry in controller.list_vocabulary(tag_type.as_deref()).await? {
                    println!(
                        "{}\t{}\t{}\t{}\t{}\t{}",
                        entry.id,
                        entry.tag_type,
                        entry.language,
                        entry.display_value,
                        if entry.allow_auto_tag { "auto" } else { "manual" },
                        entry.meaning
                    );
                }
            }
            VocabCommands::Set { id, meaning, auto_tag } => {
                let entry = controller
                    .update_vocabulary(id, VocabularyUpdate { meaning, allow_auto_tag: auto_tag })
                    .await?;
                info!("Updated {} '{}'", entry.tag_type, entry.display_value);
            }
        },
        // handled before the configuration is loaded
        Commands::Completions { .. } => {}
    }

    Ok(())
}

fn print_outcome(outcome: &ParseOutcome) {
    for occurrence in &outcome.occurrences {
        println!(
            "  {}\t{}\t{}",
            format_timestamp(occurrence.exact_ms),
            occurrence.vocabulary.tag_type,
            occurrence.vocabulary.display_value
        );
    }
    for error in &outcome.errors {
        println!("  ERROR {}", error);
    }
}

// @returns: Human readable duration
fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let millis = duration.subsec_millis();

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}.{:03}s", seconds, millis)
    }
}
