//! todoseq - task keyword extraction and state transitions

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::{ColoredString, Colorize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use todoseq::{KeywordGroup, LanguageRegistry, Settings, Task, TaskParser};

/// File extensions always read as prose documents.
const DOCUMENT_EXTENSIONS: &[&str] = &["md", "markdown", "txt", "org", "rst"];

#[derive(Parser)]
#[command(name = "todoseq")]
#[command(version)]
#[command(about = "Find task keywords in text and code, and step them through their lifecycle", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Settings file (JSON, or TOML with a .toml extension).
    /// Defaults to .todoseq.json or .todoseq.toml in the current directory.
    #[arg(short, long, global = true, env = "TODOSEQ_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tasks found in a file
    Extract {
        /// File to scan
        file: PathBuf,

        /// Treat the file as source code in this language
        #[arg(short, long)]
        language: Option<String>,

        /// Print tasks as JSON
        #[arg(long)]
        json: bool,

        /// Also scan fenced code blocks in documents
        #[arg(long)]
        include_code_blocks: bool,
    },

    /// Print the state that follows a keyword
    Next {
        /// Current state keyword (may be empty with --cycle)
        keyword: String,

        /// Cycle instead of advancing (completed states clear)
        #[arg(long)]
        cycle: bool,
    },

    /// Validate the settings and print a report
    Check,

    /// List the effective keywords by group
    Keywords,

    /// List the languages whose comments are recognised
    Languages,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "todoseq=debug,info"
    } else {
        "todoseq=info,warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Extract {
            file,
            language,
            json,
            include_code_blocks,
        } => {
            let mut settings = settings;
            settings.parser.include_code_blocks |= include_code_blocks;

            let registry = LanguageRegistry::builtin().context("Failed to load languages")?;
            let parser = TaskParser::new(
                settings.keyword_manager(),
                Arc::new(registry),
                settings.parser,
            )?;

            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;

            let language = language.or_else(|| code_language(&file, &parser));
            let tasks = match language {
                Some(language) => match parser.parse_code(&text, &language) {
                    Ok(tasks) => tasks,
                    Err(e) => {
                        eprintln!("{} {}", "Error:".red().bold(), e);
                        std::process::exit(1);
                    }
                },
                None => parser.parse_document(&text)?,
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else if tasks.is_empty() {
                println!("{} No tasks found in {}", "Note:".yellow(), file.display());
            } else {
                for task in &tasks {
                    print_task(task);
                }
            }
        }

        Commands::Next { keyword, cycle } => {
            let keywords = settings.keyword_manager();
            let transitions = settings.transition_manager(Arc::clone(&keywords));
            let current = keyword.trim().to_uppercase();

            if !current.is_empty() && !keywords.is_known_keyword(&current) {
                eprintln!(
                    "{} '{}' is not a known keyword; it never changes",
                    "Warning:".yellow().bold(),
                    current
                );
            }

            let next = if cycle {
                transitions.cycle_state(&current)
            } else {
                transitions.next_state(&current)
            };
            println!("{}", next);
        }

        Commands::Check => {
            let report = settings.validate();
            println!("{}", report.verbose_report());
            if !report.is_valid() {
                std::process::exit(report.exit_code());
            }
        }

        Commands::Keywords => {
            let keywords = settings.keyword_manager();
            for group in KeywordGroup::all() {
                println!(
                    "{:<10} {}",
                    format!("{}:", group).bold(),
                    keywords.keywords(*group).join(", ")
                );
            }
        }

        Commands::Languages => {
            let registry = LanguageRegistry::builtin().context("Failed to load languages")?;
            println!("{} {} languages", "Languages:".cyan(), registry.len());
            for language in registry.iter() {
                let aliases = if language.aliases().is_empty() {
                    String::new()
                } else {
                    format!(" ({})", language.aliases().join(", "))
                };
                let roles: Vec<&str> = language.fragments().iter().map(|f| f.role().label()).collect();
                println!(
                    "   {}{} {}",
                    language.name().bold(),
                    aliases,
                    roles.join(", ").dimmed()
                );
            }
        }
    }

    Ok(())
}

fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let settings = match path {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::load_from_dir(Path::new("."))
            .context("Failed to load settings from the current directory")?,
    };
    Ok(settings)
}

/// Registered language matching the file extension, unless the file is a
/// prose document.
fn code_language(file: &Path, parser: &TaskParser) -> Option<String> {
    let ext = file.extension()?.to_str()?.to_lowercase();
    if DOCUMENT_EXTENSIONS.contains(&ext.as_str()) {
        return None;
    }
    parser
        .languages()
        .get(&ext)
        .map(|language| language.name().to_string())
}

fn colored_state(task: &Task) -> ColoredString {
    let state = task.state.as_str();
    match task.group {
        KeywordGroup::Active => state.yellow().bold(),
        KeywordGroup::Inactive => state.blue().bold(),
        KeywordGroup::Waiting => state.magenta().bold(),
        KeywordGroup::Completed => state.green().bold(),
        KeywordGroup::Archived => state.dimmed(),
    }
}

fn print_task(task: &Task) {
    let mut line = format!("{:>5}: {}", task.line + 1, colored_state(task));
    if let Some(priority) = task.priority {
        line.push_str(&format!(" {}", priority.to_string().red()));
    }
    if !task.text.is_empty() {
        line.push(' ');
        line.push_str(&task.text);
    }
    if let Some(date) = task.scheduled {
        line.push_str(&format!(" {}", format!("scheduled {}", date).cyan()));
    }
    if let Some(date) = task.deadline {
        line.push_str(&format!(" {}", format!("deadline {}", date).red()));
    }
    if let Some(language) = &task.language {
        line.push_str(&format!(" {}", format!("[{}]", language).dimmed()));
    }
    println!("{}", line);
}
