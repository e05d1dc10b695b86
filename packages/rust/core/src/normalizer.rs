//! Card normalization: one card → one plain-text record.
//!
//! The record text lists, in this order and each on its own line:
//!
//! ```text
//! Title: <title>                 (only when the title is non-empty)
//! Description: <stripped desc>   (only when the trimmed description is non-empty)
//! List: <list name>
//! Members: <name>, <name>, ...
//! Checklist: <name>              (per checklist that has items)
//! <item>:<state>
//! Comments: <comment>\n<comment>...
//! ```

use tracing::{debug, instrument};

use boardcorpus_html::{strip_and_join, strip_html};
use boardcorpus_shared::{Board, Card, NormalizedRecord, RecordMetadata, Result};
use boardcorpus_trello::{ListLookup, MemberLookup};

/// Resolve a card's list and members, then render its record.
///
/// The list is resolved before the members; either failure aborts with the
/// lookup's error.
#[instrument(skip_all, fields(card_id = %card.id))]
pub async fn normalize_card<L, M>(
    card: &Card,
    board: &Board,
    lists: &L,
    members: &M,
) -> Result<NormalizedRecord>
where
    L: ListLookup,
    M: MemberLookup,
{
    let list = lists.resolve_list(board, card).await?;
    let member_names: Vec<String> = members
        .card_members(card)
        .await?
        .into_iter()
        .map(|m| m.full_name)
        .collect();

    let record = render_card(card, &list.name, &member_names);
    debug!(text_len = record.text.len(), "card normalized");

    Ok(record)
}

/// Render a card whose list and members are already resolved.
pub fn render_card(card: &Card, list_name: &str, member_names: &[String]) -> NormalizedRecord {
    let mut text = String::new();

    if !card.title.is_empty() {
        text.push_str(&format!("Title: {}\n", card.title));
    }

    if !card.description.trim().is_empty() {
        text.push_str(&format!("Description: {}\n", strip_html(&card.description)));
    }

    text.push_str(&format!("List: {list_name}\n"));
    text.push_str(&format!("Members: {}\n", member_names.join(", ")));

    for checklist in card.checklists.iter().filter(|c| !c.items.is_empty()) {
        let items = checklist
            .items
            .iter()
            .map(|item| format!("{}:{}", item.name, item.state))
            .collect::<Vec<_>>()
            .join("\n");
        text.push_str(&format!("Checklist: {}\n{items}\n", checklist.name));
    }

    let comments = strip_and_join(card.comments.iter().map(|c| c.text.as_str()), "\n");
    text.push_str(&format!("Comments: {comments}\n"));

    NormalizedRecord {
        text,
        metadata: RecordMetadata {
            title: card.title.clone(),
            id: card.id.clone(),
            url: card.url.clone(),
        },
    }
}
