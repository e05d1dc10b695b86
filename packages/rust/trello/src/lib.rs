//! Trello board service client and card reference lookups.
//!
//! This crate provides:
//! - [`BoardService`]: the board operations the corpus pipeline needs
//! - [`TrelloClient`]: the authenticated REST implementation
//! - [`lookup`]: per-card and board-cached list/member resolution

pub mod client;
pub mod lookup;
mod wire;

pub use client::{BoardService, TrelloClient};
pub use lookup::{
    CachedListLookup, CachedMemberLookup, DirectListLookup, DirectMemberLookup, ListLookup,
    ListResolver, MemberLookup, MemberResolver,
};
