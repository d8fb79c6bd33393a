mod commands;
mod config;
mod logging;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::Config;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Will questionnaire toolchain.
#[derive(Parser)]
#[command(name = "willsuite", version, about = "Will questionnaire toolchain")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Path to a willsuite.toml configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a clause template against a set of answers
    Render {
        /// Template text, e.g. "I appoint {{field:executorsSection}}."
        template: Option<String>,
        /// Read the template from a file instead
        #[arg(long, conflicts_with = "template")]
        template_file: Option<PathBuf>,
        /// Path to the answers JSON file
        #[arg(long)]
        answers: PathBuf,
    },

    /// Report visibility, completion and progress for a set of answers
    Eval {
        /// Path to the form document
        form: PathBuf,
        /// Path to the answers JSON file
        #[arg(long)]
        answers: PathBuf,
    },

    /// Render the will clauses for a set of answers
    Clauses {
        /// Path to the form document
        form: PathBuf,
        /// Path to the answers JSON file
        #[arg(long)]
        answers: PathBuf,
        /// Omit clauses that still contain an unresolved {{...}} token
        #[arg(long)]
        drop_unresolved: bool,
    },

    /// Run static checks on a form document
    Check {
        /// Path to the form document
        form: PathBuf,
    },

    /// Validate a form document against the form JSON Schema
    Validate {
        /// Path to the form document
        form: PathBuf,
    },

    /// Merge several partial form documents into one
    Merge {
        /// Form documents, merged left to right
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Write the merged document here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print the initial answers for a form document
    Init {
        /// Path to the form document
        form: PathBuf,
    },

    /// List the people in a set of answers and the name autofill options
    People {
        /// Path to the answers JSON file
        #[arg(long)]
        answers: PathBuf,
    },

    /// Save, load, list and delete answer drafts
    Draft {
        /// Draft directory (overrides [drafts] dir from the config)
        #[arg(long, global = true)]
        dir: Option<PathBuf>,
        #[command(subcommand)]
        command: DraftCommands,
    },
}

#[derive(Subcommand)]
pub(crate) enum DraftCommands {
    /// Save answers under a draft id
    Save {
        id: String,
        /// Path to the answers JSON file
        #[arg(long)]
        answers: PathBuf,
        /// Only overwrite the draft if its etag still matches
        #[arg(long)]
        etag: Option<String>,
    },
    /// Print a stored draft
    Load { id: String },
    /// List stored drafts
    List,
    /// Delete a stored draft
    Delete { id: String },
}

fn main() {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(msg) => {
            report_error(&msg, cli.output, cli.quiet);
            process::exit(1);
        }
    };
    if let Err(msg) = logging::init(&config.logging) {
        report_error(&msg, cli.output, cli.quiet);
        process::exit(1);
    }
    tracing::debug!(command = command_name(&cli.command), "starting");

    match cli.command {
        Commands::Render {
            template,
            template_file,
            answers,
        } => {
            commands::render::cmd_render(
                template.as_deref(),
                template_file.as_deref(),
                &answers,
                cli.output,
                cli.quiet,
            );
        }
        Commands::Eval { form, answers } => {
            commands::eval::cmd_eval(&form, &answers, cli.output, cli.quiet);
        }
        Commands::Clauses {
            form,
            answers,
            drop_unresolved,
        } => {
            let drop = drop_unresolved || config.clauses.drop_unresolved;
            commands::clauses::cmd_clauses(&form, &answers, drop, cli.output, cli.quiet);
        }
        Commands::Check { form } => {
            commands::check::cmd_check(&form, cli.output, cli.quiet);
        }
        Commands::Validate { form } => {
            commands::validate::cmd_validate(&form, cli.output, cli.quiet);
        }
        Commands::Merge { inputs, out } => {
            commands::merge::cmd_merge(&inputs, out.as_deref(), cli.output, cli.quiet);
        }
        Commands::Init { form } => {
            commands::init::cmd_init(&form, cli.output, cli.quiet);
        }
        Commands::People { answers } => {
            commands::people::cmd_people(&answers, cli.output, cli.quiet);
        }
        Commands::Draft { dir, command } => {
            let dir = dir.unwrap_or_else(|| config.drafts.dir.clone());
            commands::draft::cmd_draft(command, &dir, cli.output, cli.quiet);
        }
    }
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Render { .. } => "render",
        Commands::Eval { .. } => "eval",
        Commands::Clauses { .. } => "clauses",
        Commands::Check { .. } => "check",
        Commands::Validate { .. } => "validate",
        Commands::Merge { .. } => "merge",
        Commands::Init { .. } => "init",
        Commands::People { .. } => "people",
        Commands::Draft { .. } => "draft",
    }
}

/// Report an error message respecting output format and quiet mode.
pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}

/// Read and parse a JSON file, exiting with status 1 on failure.
pub(crate) fn read_json_or_exit(
    path: &Path,
    what: &str,
    output: OutputFormat,
    quiet: bool,
) -> serde_json::Value {
    let text = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("error reading {} file '{}': {}", what, path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };
    match serde_json::from_str(&text) {
        Ok(v) => v,
        Err(e) => {
            let msg = format!("error: invalid JSON in {}: {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}

/// Print a JSON value to stdout, pretty.
pub(crate) fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("serialization error: {}", e))
    );
}
