//! List and member resolution for cards.
//!
//! The normalizer resolves each card's parent list and members through the
//! [`ListLookup`] and [`MemberLookup`] capabilities. Two strategies exist for
//! each:
//!
//! - **per-card**: one service call per card (`GET /lists/{id}`,
//!   `GET /cards/{id}/members`);
//! - **board cache**: one call per board up front, then local resolution.
//!
//! [`ListResolver`] and [`MemberResolver`] pick a strategy at runtime from
//! [`LookupStrategy`].

use std::collections::HashMap;
use std::future::Future;

use tracing::{debug, warn};

use boardcorpus_shared::{
    Board, BoardCorpusError, Card, LookupStrategy, Member, Result, TrelloList,
};

use crate::client::BoardService;

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Resolves a card's parent list.
pub trait ListLookup {
    /// Fails with a lookup error when the card's list id does not resolve.
    fn resolve_list(&self, board: &Board, card: &Card) -> impl Future<Output = Result<TrelloList>>;
}

/// Resolves the members assigned to a card.
pub trait MemberLookup {
    fn card_members(&self, card: &Card) -> impl Future<Output = Result<Vec<Member>>>;
}

// ---------------------------------------------------------------------------
// Lists
// ---------------------------------------------------------------------------

/// Per-card list resolution through the service.
pub struct DirectListLookup<'a, S> {
    service: &'a S,
}

impl<'a, S: BoardService> DirectListLookup<'a, S> {
    pub fn new(service: &'a S) -> Self {
        Self { service }
    }
}

impl<S: BoardService> ListLookup for DirectListLookup<'_, S> {
    async fn resolve_list(&self, board: &Board, card: &Card) -> Result<TrelloList> {
        self.service.get_list(board, &card.list_id).await
    }
}

/// List resolution from a one-shot listing of every list on the board.
#[derive(Debug, Clone, Default)]
pub struct CachedListLookup {
    lists: HashMap<String, TrelloList>,
}

impl CachedListLookup {
    /// Fetch every list on `board` once.
    pub async fn load<S: BoardService>(service: &S, board: &Board) -> Result<Self> {
        let lists = service.list_board_lists(board).await?;
        debug!(board = %board.name, count = lists.len(), "cached board lists");
        Ok(Self::from_lists(lists))
    }

    pub fn from_lists(lists: impl IntoIterator<Item = TrelloList>) -> Self {
        Self {
            lists: lists.into_iter().map(|l| (l.id.clone(), l)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

impl ListLookup for CachedListLookup {
    async fn resolve_list(&self, board: &Board, card: &Card) -> Result<TrelloList> {
        self.lists.get(&card.list_id).cloned().ok_or_else(|| {
            BoardCorpusError::lookup(format!(
                "list '{}' not found on board '{}'",
                card.list_id, board.name
            ))
        })
    }
}

/// Runtime-selected list strategy.
pub enum ListResolver<'a, S> {
    Direct(DirectListLookup<'a, S>),
    Cached(CachedListLookup),
}

impl<'a, S: BoardService> ListResolver<'a, S> {
    /// Build the resolver for `strategy`, prefetching when it caches.
    pub async fn for_strategy(service: &'a S, board: &Board, strategy: LookupStrategy) -> Result<Self> {
        Ok(match strategy {
            LookupStrategy::PerCard => Self::Direct(DirectListLookup::new(service)),
            LookupStrategy::BoardCache => Self::Cached(CachedListLookup::load(service, board).await?),
        })
    }
}

impl<S: BoardService> ListLookup for ListResolver<'_, S> {
    async fn resolve_list(&self, board: &Board, card: &Card) -> Result<TrelloList> {
        match self {
            Self::Direct(lookup) => lookup.resolve_list(board, card).await,
            Self::Cached(lookup) => lookup.resolve_list(board, card).await,
        }
    }
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

/// Per-card member resolution through the service.
pub struct DirectMemberLookup<'a, S> {
    service: &'a S,
}

impl<'a, S: BoardService> DirectMemberLookup<'a, S> {
    pub fn new(service: &'a S) -> Self {
        Self { service }
    }
}

impl<S: BoardService> MemberLookup for DirectMemberLookup<'_, S> {
    async fn card_members(&self, card: &Card) -> Result<Vec<Member>> {
        self.service.get_card_members(&card.id).await
    }
}

/// Member resolution from the board's member listing, keyed by the card's
/// member ids.
///
/// A card can reference someone who has since left the board; those cards
/// fall back to a per-card call so the result matches the direct lookup.
pub struct CachedMemberLookup<'a, S> {
    service: &'a S,
    members: HashMap<String, Member>,
}

impl<'a, S: BoardService> CachedMemberLookup<'a, S> {
    /// Fetch every member of `board` once.
    pub async fn load(service: &'a S, board: &Board) -> Result<Self> {
        let members = service.list_board_members(board).await?;
        debug!(board = %board.name, count = members.len(), "cached board members");
        Ok(Self::from_members(service, members))
    }

    pub fn from_members(service: &'a S, members: impl IntoIterator<Item = Member>) -> Self {
        Self {
            service,
            members: members.into_iter().map(|m| (m.id.clone(), m)).collect(),
        }
    }
}

impl<S: BoardService> MemberLookup for CachedMemberLookup<'_, S> {
    async fn card_members(&self, card: &Card) -> Result<Vec<Member>> {
        let resolved: Option<Vec<Member>> = card
            .member_ids
            .iter()
            .map(|id| self.members.get(id).cloned())
            .collect();

        match resolved {
            Some(members) => Ok(members),
            None => {
                warn!(card_id = %card.id, "card references a non-board member, fetching directly");
                self.service.get_card_members(&card.id).await
            }
        }
    }
}

/// Runtime-selected member strategy.
pub enum MemberResolver<'a, S> {
    Direct(DirectMemberLookup<'a, S>),
    Cached(CachedMemberLookup<'a, S>),
}

impl<'a, S: BoardService> MemberResolver<'a, S> {
    /// Build the resolver for `strategy`, prefetching when it caches.
    pub async fn for_strategy(service: &'a S, board: &Board, strategy: LookupStrategy) -> Result<Self> {
        Ok(match strategy {
            LookupStrategy::PerCard => Self::Direct(DirectMemberLookup::new(service)),
            LookupStrategy::BoardCache => {
                Self::Cached(CachedMemberLookup::load(service, board).await?)
            }
        })
    }
}

impl<S: BoardService> MemberLookup for MemberResolver<'_, S> {
    async fn card_members(&self, card: &Card) -> Result<Vec<Member>> {
        match self {
            Self::Direct(lookup) => lookup.card_members(card).await,
            Self::Cached(lookup) => lookup.card_members(card).await,
        }
    }
}
