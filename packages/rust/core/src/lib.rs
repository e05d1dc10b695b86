//! Corpus building for boardcorpus.
//!
//! Ties the board service, HTML stripping and the artifact writer together
//! into the end-to-end `build_board_corpus` workflow.

pub mod corpus;
pub mod normalizer;
pub mod pipeline;
pub mod writer;

#[cfg(test)]
mod testing;

pub use corpus::{build_corpus, select_board};
pub use normalizer::{normalize_card, render_card};
pub use pipeline::{BuildOptions, PipelineReport, ProgressReporter, SilentProgress, build_board_corpus};
pub use writer::{WriteReport, format_record, quote_str, render_corpus, write_corpus};
