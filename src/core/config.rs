//! Configuration management for the notes server.
//!
//! This module provides a centralized configuration structure populated from
//! environment variables (optionally via a `.env` file) on top of defaults.
//! Everything here is read once at startup and never mutated afterwards.

use super::security::normalize_extension;
use super::transport::HttpConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// Default ceiling for files read through the file access gate (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Extensions readable through the file access gate unless overridden.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[
    ".txt", ".md", ".json", ".js", ".jsx", ".ts", ".tsx", ".html", ".css", ".csv", ".yml",
    ".yaml", ".xml", ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx",
];

/// Main configuration structure for the notes server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// HTTP listener configuration.
    pub http: HttpConfig,

    /// Note database and upload locations.
    pub storage: StorageConfig,

    /// Filesystem access policy for the model file-context feature.
    pub files: FileAccessConfig,

    /// Local language-model server.
    pub ollama: OllamaConfig,

    /// Cloud chat-completion API used by AI search.
    pub completion: CompletionConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
}

/// Storage locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database file holding the notes table.
    pub database_path: PathBuf,

    /// Directory uploaded files are written to before import.
    pub upload_dir: PathBuf,
}

/// Access policy applied to every directory listing and file read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileAccessConfig {
    /// Absolute directories clients may list and read below.
    pub allowed_directories: Vec<PathBuf>,

    /// Lowercase extensions with leading dot (".md").
    pub allowed_extensions: Vec<String>,

    /// Largest file, in bytes, that may be read.
    pub max_file_size: u64,

    /// Whether symlinks inside an allowed directory may point outside it.
    /// If false, targets are resolved and re-checked against the allow-list.
    pub allow_symlinks: bool,
}

/// Local language-model server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Base API URL, e.g. `http://localhost:11434/api`.
    pub base_url: String,

    /// Model used when a request does not name one.
    pub default_model: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

/// Cloud chat-completion configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,

    /// Bearer token. AI search is unavailable without one.
    pub api_key: Option<String>,

    /// Model name sent with each request.
    pub model: String,

    /// Upper bound on generated tokens.
    pub max_tokens: u32,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data/notes.db"),
            upload_dir: PathBuf::from("data/uploads"),
        }
    }
}

impl Default for FileAccessConfig {
    fn default() -> Self {
        let allowed_directories = dirs::home_dir()
            .map(|home| vec![home.join("Documents"), home.join("Desktop")])
            .unwrap_or_default();

        Self {
            allowed_directories,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allow_symlinks: true,
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434/api".to_string(),
            default_model: "llama2".to_string(),
            timeout_secs: 300,
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4".to_string(),
            max_tokens: 500,
            timeout_secs: 60,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            with_timestamps: true,
        }
    }
}

impl LoggingConfig {
    /// Read `NOTES_LOG_LEVEL` and `NOTES_LOG_TIMESTAMPS`.
    ///
    /// Separate from [`Config::from_env`] so logging can be up before the
    /// rest of the configuration is parsed.
    pub fn from_env() -> Self {
        let mut logging = Self::default();

        if let Ok(level) = std::env::var("NOTES_LOG_LEVEL") {
            logging.level = level;
        }

        if let Some(with_timestamps) = env_flag("NOTES_LOG_TIMESTAMPS") {
            logging.with_timestamps = with_timestamps;
        }

        logging
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "notes-ai-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig::default(),
            http: HttpConfig::default(),
            storage: StorageConfig::default(),
            files: FileAccessConfig::default(),
            ollama: OllamaConfig::default(),
            completion: CompletionConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Server variables are prefixed with `NOTES_`, for example
    /// `NOTES_HTTP_PORT` or `NOTES_ALLOWED_DIRS`. The conventional `PORT`,
    /// `OLLAMA_API_URL` and `OPENAI_API_KEY` names are honoured as fallbacks.
    /// A `.env` file is not read here; the binary loads it before calling.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(name) = std::env::var("NOTES_SERVER_NAME") {
            config.server.name = name;
        }

        config.logging = LoggingConfig::from_env();

        config.http = HttpConfig::from_env();

        if let Ok(path) = std::env::var("NOTES_DATABASE_PATH") {
            config.storage.database_path = PathBuf::from(path);
        }

        if let Ok(path) = std::env::var("NOTES_UPLOAD_DIR") {
            config.storage.upload_dir = PathBuf::from(path);
        }

        config.files = FileAccessConfig::from_env();

        if let Some(url) = env_any(&["NOTES_OLLAMA_URL", "OLLAMA_API_URL"]) {
            config.ollama.base_url = url;
        }

        if let Ok(model) = std::env::var("NOTES_OLLAMA_MODEL") {
            config.ollama.default_model = model;
        }

        if let Some(timeout) = env_parse("NOTES_OLLAMA_TIMEOUT_SECS") {
            config.ollama.timeout_secs = timeout;
        }

        if let Some(api_key) = env_any(&["NOTES_OPENAI_API_KEY", "OPENAI_API_KEY"]) {
            config.completion.api_key = Some(api_key);
        }

        if let Ok(url) = std::env::var("NOTES_OPENAI_BASE_URL") {
            config.completion.base_url = url;
        }

        if let Ok(model) = std::env::var("NOTES_OPENAI_MODEL") {
            config.completion.model = model;
        }

        if let Some(max_tokens) = env_parse("NOTES_OPENAI_MAX_TOKENS") {
            config.completion.max_tokens = max_tokens;
        }

        config
    }
}

impl FileAccessConfig {
    /// Load the file access policy from environment variables.
    ///
    /// `NOTES_ALLOWED_DIRS` is a platform path list (`:`-separated on Unix);
    /// `~` is expanded and relative entries are anchored at the current
    /// directory. `NOTES_ALLOWED_EXTENSIONS` is comma-separated.
    pub fn from_env() -> Self {
        let mut files = Self::default();

        if let Some(raw) = std::env::var_os("NOTES_ALLOWED_DIRS") {
            files.allowed_directories = std::env::split_paths(&raw)
                .filter(|dir| !dir.as_os_str().is_empty())
                .map(|dir| absolutize(&expand_home(&dir)))
                .collect();
        }

        if let Ok(raw) = std::env::var("NOTES_ALLOWED_EXTENSIONS") {
            files.allowed_extensions = raw
                .split(',')
                .map(normalize_extension)
                .filter(|ext| !ext.is_empty())
                .collect();
        }

        if let Some(max) = env_parse("NOTES_MAX_FILE_SIZE") {
            files.max_file_size = max;
        }

        if let Some(allow_symlinks) = env_flag("NOTES_ALLOW_SYMLINKS") {
            files.allow_symlinks = allow_symlinks;
        }

        if files.allowed_directories.is_empty() {
            warn!("No allowed directories configured - file access is disabled");
        } else {
            info!(
                "File access limited to {:?} ({} extensions, max {} bytes)",
                files.allowed_directories,
                files.allowed_extensions.len(),
                files.max_file_size
            );
        }

        files
    }
}

/// Reads the first set variable among `keys`.
fn env_any(keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
}

/// Parses a variable, warning and ignoring it when malformed.
pub(crate) fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid value for {}: {:?}", key, raw);
            None
        }
    }
}

/// Reads a boolean flag; anything but `false`/`0` counts as true.
pub(crate) fn env_flag(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .map(|v| v.to_lowercase() != "false" && v != "0")
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(e) => {
            warn!("Cannot resolve relative allowed directory {:?}: {}", path, e);
            path.to_path_buf()
        }
    }
}
