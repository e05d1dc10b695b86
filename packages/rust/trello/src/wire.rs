//! JSON shapes returned by the Trello REST API and their conversion into
//! the ordered domain types.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use boardcorpus_shared::{
    Board, BoardCorpusError, Card, CheckItem, Checklist, Comment, ItemState, Member, Result,
    TrelloList,
};

/// Action type carried by card comments.
const COMMENT_ACTION: &str = "commentCard";

#[derive(Debug, Deserialize)]
pub(crate) struct BoardJson {
    id: String,
    name: String,
    #[serde(default)]
    closed: bool,
    #[serde(default)]
    url: String,
}

impl From<BoardJson> for Board {
    fn from(raw: BoardJson) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            closed: raw.closed,
            url: raw.url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListJson {
    id: String,
    name: String,
}

impl From<ListJson> for TrelloList {
    fn from(raw: ListJson) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MemberJson {
    id: String,
    #[serde(default)]
    full_name: String,
}

impl From<MemberJson> for Member {
    fn from(raw: MemberJson) -> Self {
        Self {
            id: raw.id,
            full_name: raw.full_name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CheckItemJson {
    name: String,
    state: String,
    #[serde(default)]
    pos: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChecklistJson {
    name: String,
    #[serde(default)]
    pos: f64,
    #[serde(default)]
    check_items: Vec<CheckItemJson>,
}

#[derive(Debug, Default, Deserialize)]
struct ActionDataJson {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ActionJson {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    date: Option<DateTime<Utc>>,
    #[serde(default)]
    data: ActionDataJson,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CardJson {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    desc: String,
    id_list: String,
    #[serde(default)]
    id_members: Vec<String>,
    #[serde(default)]
    closed: bool,
    #[serde(default)]
    url: String,
    #[serde(default)]
    checklists: Vec<ChecklistJson>,
    #[serde(default)]
    actions: Vec<ActionJson>,
}

impl TryFrom<CardJson> for Card {
    type Error = BoardCorpusError;

    fn try_from(raw: CardJson) -> Result<Self> {
        let mut raw_checklists = raw.checklists;
        raw_checklists.sort_by(|a, b| a.pos.total_cmp(&b.pos));

        let mut checklists = Vec::with_capacity(raw_checklists.len());
        for checklist in raw_checklists {
            let mut raw_items = checklist.check_items;
            raw_items.sort_by(|a, b| a.pos.total_cmp(&b.pos));

            let items = raw_items
                .into_iter()
                .map(|item| -> Result<CheckItem> {
                    let state: ItemState = item.state.parse().map_err(|_| {
                        BoardCorpusError::parse(format!(
                            "card {}: unknown checklist item state '{}'",
                            raw.id, item.state
                        ))
                    })?;
                    Ok(CheckItem {
                        name: item.name,
                        state,
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            checklists.push(Checklist {
                name: checklist.name,
                items,
            });
        }

        // The service lists actions newest first; comments read oldest first.
        let mut comments: Vec<Comment> = raw
            .actions
            .into_iter()
            .filter(|action| action.kind == COMMENT_ACTION)
            .map(|action| Comment {
                text: action.data.text.unwrap_or_default(),
                created_at: action.date,
            })
            .collect();
        comments.sort_by_key(|comment| comment.created_at);

        Ok(Self {
            id: raw.id,
            title: raw.name,
            description: raw.desc,
            list_id: raw.id_list,
            member_ids: raw.id_members,
            closed: raw.closed,
            url: raw.url,
            checklists,
            comments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> String {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures/json")
            .join(name);
        std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
    }

    fn card_json(json: &str) -> Result<Card> {
        let raw: CardJson = serde_json::from_str(json).expect("valid card json");
        Card::try_from(raw)
    }

    #[test]
    fn card_fixture_decodes() {
        let raw: Vec<CardJson> =
            serde_json::from_str(&fixture("cards.fixture.json")).expect("deserialize fixture");
        let cards = raw
            .into_iter()
            .map(Card::try_from)
            .collect::<Result<Vec<_>>>()
            .expect("convert fixture");

        assert_eq!(cards.len(), 3);
        let review = &cards[0];
        assert_eq!(review.title, "Design Review");
        assert_eq!(review.list_id, "list-backlog");
        assert_eq!(review.checklists.len(), 2);
        assert_eq!(review.checklists[0].items[0].state, ItemState::Complete);
        assert_eq!(review.comments.len(), 1);
    }

    #[test]
    fn checklists_and_items_follow_position() {
        let card = card_json(
            r#"{
                "id": "c1", "idList": "l1",
                "checklists": [
                    {"name": "Second", "pos": 32768, "checkItems": []},
                    {"name": "First", "pos": 16384, "checkItems": [
                        {"name": "b", "state": "incomplete", "pos": 200},
                        {"name": "a", "state": "complete", "pos": 100}
                    ]}
                ]
            }"#,
        )
        .unwrap();

        let names: Vec<&str> = card.checklists.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["First", "Second"]);
        let items: Vec<&str> = card.checklists[0].items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(items, ["a", "b"]);
    }

    #[test]
    fn comments_are_oldest_first_and_other_actions_dropped() {
        let card = card_json(
            r#"{
                "id": "c1", "idList": "l1",
                "actions": [
                    {"type": "commentCard", "date": "2024-03-02T09:00:00.000Z", "data": {"text": "newer"}},
                    {"type": "updateCard", "date": "2024-03-01T12:00:00.000Z", "data": {}},
                    {"type": "commentCard", "date": "2024-03-01T09:00:00.000Z", "data": {"text": "older"}}
                ]
            }"#,
        )
        .unwrap();

        let texts: Vec<&str> = card.comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["older", "newer"]);
    }

    #[test]
    fn unknown_item_state_is_a_parse_error() {
        let err = card_json(
            r#"{
                "id": "c9", "idList": "l1",
                "checklists": [{"name": "x", "checkItems": [{"name": "y", "state": "done"}]}]
            }"#,
        )
        .unwrap_err();

        assert!(matches!(err, BoardCorpusError::Parse { .. }));
        assert!(err.to_string().contains("c9"));
    }
}
