//! Interactive prompt over the file gate.
//!
//! Keeps a current directory, a list of selected files and a model name
//! between commands. Every file operation still goes through [`FileGate`],
//! so the prompt can never see more than the HTTP API can.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::core::{Error, Result};
use crate::domains::files::FileGate;
use crate::domains::llm::{GenerationBackend, answer_with_files};

const HELP: &str = "Commands:
  ls [path]        - List directory contents (defaults to current path)
  cd <path>        - Change current directory
  pwd              - Show current directory
  cat <file>       - Show file contents
  select <file>    - Add file to selected files
  unselect <file>  - Remove file from selected files
  selected         - Show selected files
  clear            - Clear selected files
  ask <query>      - Ask a question about selected files
  model <name>     - Change the model
  models           - List available models
  help             - Show this help
  exit             - Exit the program";

/// What the prompt should do after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    /// Print the text and read the next command.
    Continue(String),
    /// Leave the prompt.
    Exit,
}

/// State of one interactive session.
pub struct Session {
    gate: FileGate,
    generator: Arc<dyn GenerationBackend>,
    current_dir: PathBuf,
    selected: Vec<String>,
    model: String,
}

impl Session {
    /// Start in the first allowed directory, or the home directory when
    /// none is configured.
    pub fn new(gate: FileGate, generator: Arc<dyn GenerationBackend>, model: String) -> Self {
        let current_dir = gate
            .allowed_directories()
            .first()
            .cloned()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("/"));

        Self {
            gate,
            generator,
            current_dir,
            selected: Vec::new(),
            model,
        }
    }

    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run one command line.
    pub async fn execute(&mut self, line: &str) -> Step {
        let line = line.trim();
        let (cmd, arg) = match line.split_once(char::is_whitespace) {
            Some((cmd, arg)) => (cmd.to_lowercase(), arg.trim()),
            None => (line.to_lowercase(), ""),
        };

        let output = match cmd.as_str() {
            "" => String::new(),
            "exit" | "quit" => return Step::Exit,
            "help" => HELP.to_string(),
            "ls" => self.list(arg).await,
            "cd" => self.change_dir(arg).await,
            "pwd" => format!("Current directory: {}", self.current_dir.display()),
            "cat" => self.show(arg).await,
            "select" => self.select(arg).await,
            "unselect" => self.unselect(arg),
            "selected" => self.show_selected(),
            "clear" => {
                self.selected.clear();
                "Cleared selected files".to_string()
            }
            "ask" => self.ask(arg).await,
            "model" if arg.is_empty() => format!("Current model: {}", self.model),
            "model" => {
                self.model = arg.to_string();
                format!("Changed model to {}", self.model)
            }
            "models" => self.models().await,
            other => format!("Unknown command: {}. Type 'help' for available commands.", other),
        };

        Step::Continue(output)
    }

    /// Join a relative argument onto the current directory.
    fn resolve(&self, arg: &str) -> PathBuf {
        let path = Path::new(arg);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.current_dir.join(path)
        }
    }

    async fn list(&self, arg: &str) -> String {
        let dir = if arg.is_empty() {
            self.current_dir.clone()
        } else {
            self.resolve(arg)
        };

        let mut entries = match self.gate.list_directory(&dir).await {
            Ok(entries) => entries,
            Err(e) => return format!("Error: {}", e),
        };
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        let mut out = format!("Contents of {}:", dir.display());
        for entry in entries {
            if entry.is_directory {
                let _ = write!(out, "\n  {}/", entry.name);
            } else {
                match entry.size {
                    Some(size) => {
                        let _ = write!(out, "\n  {} ({} bytes)", entry.name, size);
                    }
                    None => {
                        let _ = write!(out, "\n  {}", entry.name);
                    }
                }
            }
        }
        out
    }

    async fn change_dir(&mut self, arg: &str) -> String {
        if arg.is_empty() {
            return "Error: Path is required for cd".to_string();
        }

        let path = match self.gate.authorize(&self.resolve(arg)) {
            Ok(path) => path,
            Err(_) => return format!("Error: Access to {} is not allowed", arg),
        };

        match fs::metadata(&path).await {
            Err(_) => format!("Error: Path {} does not exist", path.display()),
            Ok(meta) if !meta.is_dir() => format!("Error: {} is not a directory", path.display()),
            Ok(_) => {
                self.current_dir = path;
                format!("Changed directory to {}", self.current_dir.display())
            }
        }
    }

    async fn show(&self, arg: &str) -> String {
        if arg.is_empty() {
            return "Error: File path is required".to_string();
        }

        match self.gate.read_file(&self.resolve(arg)).await {
            Ok(file) => format!("--- {} ---\n{}\n---", file.path.display(), file.content),
            Err(e) => format!("Error: {}", e),
        }
    }

    async fn select(&mut self, arg: &str) -> String {
        if arg.is_empty() {
            return "Error: File path is required".to_string();
        }

        let path = self.resolve(arg);
        if self.gate.authorize(&path).is_err() {
            return format!("Error: Access to {} is not allowed", path.display());
        }

        match fs::metadata(&path).await {
            Err(_) => return format!("Error: File {} does not exist", path.display()),
            Ok(meta) if !meta.is_file() => return format!("Error: {} is not a file", path.display()),
            Ok(_) => {}
        }

        let path = path.to_string_lossy().into_owned();
        if self.selected.contains(&path) {
            format!("File {} is already selected", path)
        } else {
            let reply = format!("Added {} to selected files", path);
            self.selected.push(path);
            reply
        }
    }

    fn unselect(&mut self, arg: &str) -> String {
        if arg.is_empty() {
            return "Error: File path is required".to_string();
        }

        let path = self.resolve(arg).to_string_lossy().into_owned();
        match self.selected.iter().position(|p| *p == path) {
            Some(index) => {
                self.selected.remove(index);
                format!("Removed {} from selected files", path)
            }
            None => format!("File {} is not in selected files", path),
        }
    }

    fn show_selected(&self) -> String {
        if self.selected.is_empty() {
            return "No files selected".to_string();
        }

        let mut out = "Selected files:".to_string();
        for (i, path) in self.selected.iter().enumerate() {
            let _ = write!(out, "\n{}. {}", i + 1, path);
        }
        out
    }

    async fn ask(&self, query: &str) -> String {
        if query.is_empty() {
            return "Error: Query is required".to_string();
        }
        if self.selected.is_empty() {
            return "Error: No files selected. Use 'select <file>' to select files.".to_string();
        }

        debug!("Asking {} about {} file(s)", self.model, self.selected.len());

        let result = answer_with_files(
            &self.gate,
            &*self.generator,
            query.to_string(),
            &self.selected,
            Some(self.model.clone()),
        )
        .await;

        match result {
            Ok(answer) => {
                let mut out = String::new();
                for failure in answer.file_errors.iter().flatten() {
                    let _ = writeln!(out, "Skipped {}: {}", failure.path, failure.error);
                }
                let _ = write!(out, "--- Response ---\n{}\n---", answer.response);
                out
            }
            Err(Error::NoReadableFiles(failures)) => {
                let mut out = "Error: None of the selected files could be read".to_string();
                for failure in failures {
                    let _ = write!(out, "\n  {}: {}", failure.path, failure.error);
                }
                out
            }
            Err(e) => format!("Error: {}", e),
        }
    }

    async fn models(&self) -> String {
        match self.generator.list_models().await {
            Ok(models) => {
                let mut out = "Available models:".to_string();
                for model in models {
                    let _ = write!(out, "\n  {}", model.name);
                }
                out
            }
            Err(e) => format!("Error listing models: {}", e),
        }
    }
}

/// Run the prompt on stdin until `exit` or end of input.
///
/// The starting model is the first one the backend lists, falling back to
/// its default when the listing fails or is empty.
pub async fn run(gate: FileGate, generator: Arc<dyn GenerationBackend>) -> Result<()> {
    let directories: Vec<String> = gate
        .allowed_directories()
        .iter()
        .map(|d| d.display().to_string())
        .collect();
    println!("Notes file access - interactive mode");
    println!("Allowed directories: {}", directories.join(", "));

    let model = match generator.list_models().await {
        Ok(models) if !models.is_empty() => {
            let names: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
            println!("Available models: {}", names.join(", "));
            models[0].name.clone()
        }
        Ok(_) => generator.default_model().to_string(),
        Err(e) => {
            println!("Could not retrieve models ({}), using default", e);
            generator.default_model().to_string()
        }
    };
    println!("Using model: {}", model);
    println!("Type 'exit' to quit, 'help' for commands");

    let mut session = Session::new(gate, generator, model);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("\n> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match session.execute(&line).await {
            Step::Exit => break,
            Step::Continue(output) if output.is_empty() => {}
            Step::Continue(output) => println!("{}", output),
        }
    }

    Ok(())
}
