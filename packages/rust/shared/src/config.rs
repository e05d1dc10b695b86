//! Application configuration for boardcorpus.
//!
//! User config lives at `~/.boardcorpus/boardcorpus.toml`.
//! CLI flags override config file values, which override defaults.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{BoardCorpusError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "boardcorpus.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".boardcorpus";

/// Public Trello REST API root.
pub const TRELLO_API_BASE: &str = "https://api.trello.com/1";

// ---------------------------------------------------------------------------
// Config structs (matching boardcorpus.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Trello connection settings.
    #[serde(default)]
    pub trello: TrelloConfig,

    /// Corpus build settings.
    #[serde(default)]
    pub corpus: CorpusConfig,
}

/// `[trello]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrelloConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Name of the env var holding the API token.
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// REST API root.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TrelloConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            token_env: default_token_env(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_key_env() -> String {
    "API_KEY".into()
}
fn default_token_env() -> String {
    "TOKEN".into()
}
fn default_base_url() -> String {
    TRELLO_API_BASE.into()
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[corpus]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Exact (case-sensitive) name of the board to flatten.
    #[serde(default = "default_board_name")]
    pub board_name: String,

    /// Path of the flat-text artifact.
    #[serde(default = "default_output_path")]
    pub output_path: String,

    /// Which cards the board listing returns.
    #[serde(default)]
    pub card_filter: CardFilter,

    /// How each card's parent list is resolved.
    #[serde(default)]
    pub list_lookup: LookupStrategy,

    /// How each card's members are resolved.
    #[serde(default)]
    pub member_lookup: LookupStrategy,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            board_name: default_board_name(),
            output_path: default_output_path(),
            card_filter: CardFilter::default(),
            list_lookup: LookupStrategy::default(),
            member_lookup: LookupStrategy::default(),
        }
    }
}

fn default_board_name() -> String {
    "Smith Street Enterprises".into()
}
fn default_output_path() -> String {
    "output.txt".into()
}

/// Card filter passed to the board's card listing.
///
/// `Open` matches what the listing returns when no filter is given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardFilter {
    #[default]
    Open,
    Closed,
    All,
}

impl CardFilter {
    /// Path segment used by `GET /boards/{id}/cards/{filter}`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::All => "all",
        }
    }
}

impl fmt::Display for CardFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CardFilter {
    type Err = BoardCorpusError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "all" => Ok(Self::All),
            other => Err(BoardCorpusError::config(format!(
                "unknown card filter '{other}': expected 'open', 'closed' or 'all'"
            ))),
        }
    }
}

/// Resolution strategy for per-card references.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LookupStrategy {
    /// One service call per card.
    #[default]
    PerCard,
    /// One service call per board, resolved locally per card.
    BoardCache,
}

impl fmt::Display for LookupStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PerCard => f.write_str("per-card"),
            Self::BoardCache => f.write_str("board-cache"),
        }
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Trello API key + token pair, read from the environment.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Read the API key and token from the env vars named in `[trello]`.
pub fn load_credentials(config: &TrelloConfig) -> Result<Credentials> {
    Ok(Credentials {
        api_key: read_secret(&config.api_key_env, "API key")?,
        token: read_secret(&config.token_env, "API token")?,
    })
}

fn read_secret(var_name: &str, what: &str) -> Result<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(BoardCorpusError::config(format!(
            "Trello {what} not found. Set the {var_name} environment variable.\n\
             Generate a key and token at https://trello.com/power-ups/admin"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.boardcorpus/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| BoardCorpusError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.boardcorpus/boardcorpus.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| BoardCorpusError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        BoardCorpusError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    validate_config(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| BoardCorpusError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    write_default_config(&path)?;
    Ok(path)
}

/// Write the default config to `path`, creating parent directories.
pub fn write_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| BoardCorpusError::io(parent, e))?;
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| BoardCorpusError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| BoardCorpusError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(())
}

/// Reject configs that cannot drive a run.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    Url::parse(&config.trello.base_url).map_err(|e| {
        BoardCorpusError::config(format!(
            "invalid trello.base_url '{}': {e}",
            config.trello.base_url
        ))
    })?;

    if config.trello.timeout_secs == 0 {
        return Err(BoardCorpusError::config("trello.timeout_secs must be positive"));
    }

    if config.corpus.board_name.is_empty() {
        return Err(BoardCorpusError::config("corpus.board_name must not be empty"));
    }

    if config.corpus.output_path.is_empty() {
        return Err(BoardCorpusError::config("corpus.output_path must not be empty"));
    }

    Ok(())
}
