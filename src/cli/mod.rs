//! Command-line interface.
//!
//! Without a subcommand the binary serves the HTTP API. The `file` and
//! `query` subcommands run one operation through the same file gate and
//! model backend the server uses and print its JSON result to stdout;
//! `interactive` opens a prompt for browsing allowed directories and asking
//! about selected files.

pub mod interactive;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{Value, json};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use crate::core::{Config, Error, Result};
use crate::domains::files::FileGate;
use crate::domains::files::routes::{DirectoriesResponse, ListResponse};
use crate::domains::llm::routes::ModelsResponse;
use crate::domains::llm::{GenerationBackend, OllamaClient, answer_with_files};

pub use interactive::Session;

/// Notes AI server - notes backend with gated file context for a local model.
#[derive(Parser, Debug)]
#[command(name = "notes-ai-server")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve the HTTP API
    Serve,

    /// List allowed directories or files, read a file, or list models
    File {
        /// Operation to run
        #[arg(value_enum)]
        command: FileCommand,

        /// File or directory path
        #[arg(long)]
        path: Option<String>,
    },

    /// Ask the local model a question about one or more files
    Query {
        /// Question to ask
        #[arg(long)]
        query: String,

        /// File paths to include as context
        #[arg(long, num_args = 1.., required = true)]
        files: Vec<String>,

        /// Model to use (defaults to the configured model)
        #[arg(long)]
        model: Option<String>,
    },

    /// Browse allowed directories and ask about selected files
    Interactive,
}

/// Operations of the `file` subcommand.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCommand {
    /// List a directory, or the allowed directories when no path is given
    List,
    /// Read a file
    Read,
    /// List the models of the local model server
    Models,
}

/// Run a one-shot command against the file gate and model backend.
pub async fn run_file_command(
    gate: &FileGate,
    generator: &dyn GenerationBackend,
    command: FileCommand,
    path: Option<String>,
) -> Result<Value> {
    let path = path.filter(|p| !p.trim().is_empty());

    match (command, path) {
        (FileCommand::List, None) => Ok(json!(DirectoriesResponse {
            directories: gate.allowed_directories().to_vec(),
        })),
        (FileCommand::List, Some(path)) => {
            let items = gate.list_directory(Path::new(&path)).await?;
            Ok(json!(ListResponse { path, items }))
        }
        (FileCommand::Read, None) => Err(Error::bad_request("File path is required")),
        (FileCommand::Read, Some(path)) => {
            let file = gate.read_file(Path::new(&path)).await?;
            Ok(json!(file))
        }
        (FileCommand::Models, _) => {
            let models = generator.list_models().await?;
            Ok(json!(ModelsResponse { models }))
        }
    }
}

/// Run a non-serving command and print its result.
///
/// Results and errors are printed as pretty JSON on stdout; an error also
/// yields a failing exit code. Logs stay on stderr. `serve` is not a
/// one-shot command and is rejected here; the binary handles it.
pub async fn run(command: Commands, config: &Config) -> ExitCode {
    let gate = FileGate::new(config.files.clone());
    let generator: Arc<dyn GenerationBackend> = Arc::new(OllamaClient::from_config(&config.ollama));

    let result = match command {
        Commands::Serve => Err(Error::bad_request("serve is not a one-shot command")),
        Commands::File { command, path } => {
            run_file_command(&gate, &*generator, command, path).await
        }
        Commands::Query {
            query,
            files,
            model,
        } => answer_with_files(&gate, &*generator, query, &files, model)
            .await
            .map(|answer| json!(answer)),
        Commands::Interactive => {
            return match interactive::run(gate, generator).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    print_json(&json!(e.into_body()));
                    ExitCode::FAILURE
                }
            };
        }
    };

    match result {
        Ok(value) => {
            print_json(&value);
            ExitCode::SUCCESS
        }
        Err(e) => {
            print_json(&json!(e.into_body()));
            ExitCode::FAILURE
        }
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(_) => println!("{}", value),
    }
}
