//! Shared types, error model, and configuration for boardcorpus.
//!
//! This crate is the foundation depended on by all other boardcorpus crates.
//! It provides:
//! - [`BoardCorpusError`]: the unified error type
//! - Domain types ([`Board`], [`Card`], [`Checklist`], [`NormalizedRecord`], [`Corpus`])
//! - Configuration ([`AppConfig`], [`Credentials`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CardFilter, CorpusConfig, Credentials, LookupStrategy, TRELLO_API_BASE,
    TrelloConfig, config_dir, config_file_path, init_config, load_config, load_config_from,
    load_credentials, validate_config, write_default_config,
};
pub use error::{BoardCorpusError, Result};
pub use types::{
    Board, CheckItem, Checklist, Comment, Card, Corpus, ItemState, Member, NormalizedRecord,
    RecordMetadata, TrelloList,
};
