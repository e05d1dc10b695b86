//! End-to-end `build` pipeline: boards → select → cards → normalize → write.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, instrument};

use boardcorpus_shared::{Board, CardFilter, CorpusConfig, LookupStrategy, Result};
use boardcorpus_trello::{BoardService, ListResolver, MemberResolver};

use crate::corpus::{build_corpus, select_board};
use crate::writer::{WriteReport, write_corpus};

/// Options for one `build_board_corpus` run.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Exact name of the board to export.
    pub board_name: String,
    /// Artifact destination.
    pub output_path: PathBuf,
    pub card_filter: CardFilter,
    pub list_lookup: LookupStrategy,
    pub member_lookup: LookupStrategy,
}

impl From<&CorpusConfig> for BuildOptions {
    fn from(config: &CorpusConfig) -> Self {
        Self {
            board_name: config.board_name.clone(),
            output_path: PathBuf::from(&config.output_path),
            card_filter: config.card_filter,
            list_lookup: config.list_lookup,
            member_lookup: config.member_lookup,
        }
    }
}

/// Result of a successful run.
#[derive(Debug)]
pub struct PipelineReport {
    /// The board that was exported.
    pub board: Board,
    /// Number of records in the artifact.
    pub record_count: usize,
    pub artifact: WriteReport,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each card is normalized.
    fn card_normalized(&self, title: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, report: &PipelineReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn card_normalized(&self, _title: &str, _current: usize, _total: usize) {}
    fn done(&self, _report: &PipelineReport) {}
}

/// Run the full `build` pipeline.
///
/// 1. List boards and select the configured one
/// 2. Prepare list and member lookups
/// 3. Normalize every card into the corpus
/// 4. Write the artifact
///
/// Nothing is written unless every card normalizes, so a failed run leaves
/// any previous artifact untouched.
#[instrument(skip_all, fields(board = %options.board_name, out = %options.output_path.display()))]
pub async fn build_board_corpus<S: BoardService>(
    service: &S,
    options: &BuildOptions,
    progress: &dyn ProgressReporter,
) -> Result<PipelineReport> {
    let start = Instant::now();
    info!(filter = %options.card_filter, "starting build pipeline");

    // --- Phase 1: Board selection ---
    progress.phase("Finding board");
    let boards = service.list_boards().await?;
    let board = select_board(&boards, &options.board_name)?.clone();
    info!(board_id = %board.id, "board selected");

    // --- Phase 2: Lookups ---
    progress.phase("Preparing lookups");
    let lists = ListResolver::for_strategy(service, &board, options.list_lookup).await?;
    let members = MemberResolver::for_strategy(service, &board, options.member_lookup).await?;

    // --- Phase 3: Normalize cards ---
    progress.phase("Normalizing cards");
    let corpus = build_corpus(
        service,
        &board,
        &lists,
        &members,
        options.card_filter,
        progress,
    )
    .await?;

    // --- Phase 4: Write artifact ---
    progress.phase("Writing corpus");
    let artifact = write_corpus(&corpus, &options.output_path)?;

    let report = PipelineReport {
        board,
        record_count: corpus.len(),
        artifact,
        elapsed: start.elapsed(),
    };

    info!(
        board = %report.board.name,
        records = report.record_count,
        bytes = report.artifact.size_bytes,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "build pipeline complete"
    );

    progress.done(&report);
    Ok(report)
}
