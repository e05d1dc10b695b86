//! Board selection and corpus assembly.

use tracing::{debug, info, instrument};

use boardcorpus_shared::{Board, BoardCorpusError, CardFilter, Corpus, Result};
use boardcorpus_trello::{BoardService, ListLookup, MemberLookup};

use crate::normalizer::normalize_card;
use crate::pipeline::ProgressReporter;

/// Pick the board whose name equals `name` exactly.
///
/// Matching is case-sensitive and the first match wins when names repeat.
pub fn select_board<'a>(boards: &'a [Board], name: &str) -> Result<&'a Board> {
    boards.iter().find(|b| b.name == name).ok_or_else(|| {
        BoardCorpusError::not_found(format!(
            "board '{name}' not found among {} accessible boards",
            boards.len()
        ))
    })
}

/// List the board's cards and normalize each one, in listing order.
///
/// The first card that fails to normalize aborts the build.
#[instrument(skip_all, fields(board = %board.name, filter = %filter))]
pub async fn build_corpus<S, L, M>(
    service: &S,
    board: &Board,
    lists: &L,
    members: &M,
    filter: CardFilter,
    progress: &dyn ProgressReporter,
) -> Result<Corpus>
where
    S: BoardService,
    L: ListLookup,
    M: MemberLookup,
{
    let cards = service.list_cards(board, filter).await?;
    let total = cards.len();
    debug!(total, "cards listed");

    let mut corpus = Corpus::new(board.name.clone());
    for (i, card) in cards.iter().enumerate() {
        let record = normalize_card(card, board, lists, members).await?;
        progress.card_normalized(&card.title, i + 1, total);
        corpus.push(record);
    }

    info!(records = corpus.len(), "corpus built");
    Ok(corpus)
}
