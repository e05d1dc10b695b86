//! In-memory board service shared by the core unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use boardcorpus_shared::{
    Board, BoardCorpusError, Card, CardFilter, CheckItem, Checklist, Comment, ItemState, Member,
    Result, TrelloList,
};
use boardcorpus_trello::BoardService;

pub(crate) fn test_board() -> Board {
    Board {
        id: "board-sse".into(),
        name: "Smith Street Enterprises".into(),
        closed: false,
        url: "https://trello.com/b/sse".into(),
    }
}

pub(crate) fn design_review_card() -> Card {
    Card {
        id: "card-design-review".into(),
        title: "Design Review".into(),
        description: "<p>Review <b>UI</b></p>".into(),
        list_id: "list-backlog".into(),
        member_ids: vec!["member-ann".into()],
        closed: false,
        url: "https://trello.com/c/aB12cD34/1-design-review".into(),
        checklists: vec![
            Checklist {
                name: "Tasks".into(),
                items: vec![CheckItem {
                    name: "Wireframes".into(),
                    state: ItemState::Complete,
                }],
            },
            Checklist {
                name: "Later".into(),
                items: vec![],
            },
        ],
        comments: vec![Comment {
            text: "<i>Looks good</i>".into(),
            created_at: None,
        }],
    }
}

pub(crate) fn plain_card(id: &str, title: &str, list_id: &str) -> Card {
    Card {
        id: id.into(),
        title: title.into(),
        list_id: list_id.into(),
        url: format!("https://trello.com/c/{id}"),
        ..Card::default()
    }
}

/// Serves one board with fixed lists and members, recording every call.
pub(crate) struct FakeService {
    pub boards: Vec<Board>,
    pub cards: Vec<Card>,
    pub lists: HashMap<String, String>,
    pub members: HashMap<String, String>,
    pub fail_members: bool,
    calls: Mutex<Vec<String>>,
}

impl FakeService {
    pub fn with_cards(cards: Vec<Card>) -> Self {
        Self {
            boards: vec![test_board()],
            cards,
            lists: [("list-backlog", "Backlog"), ("list-doing", "Doing")]
                .into_iter()
                .map(|(id, name)| (id.to_string(), name.to_string()))
                .collect(),
            members: [("member-ann", "Ann Lee"), ("member-raj", "Raj Patel")]
                .into_iter()
                .map(|(id, name)| (id.to_string(), name.to_string()))
                .collect(),
            fail_members: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_members(mut self) -> Self {
        self.fail_members = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == name).count()
    }

    fn record(&self, name: &str) {
        self.calls.lock().unwrap().push(name.to_string());
    }

    fn member(&self, id: &str) -> Option<Member> {
        self.members.get(id).map(|name| Member {
            id: id.to_string(),
            full_name: name.clone(),
        })
    }
}

impl BoardService for FakeService {
    async fn list_boards(&self) -> Result<Vec<Board>> {
        self.record("list_boards");
        Ok(self.boards.clone())
    }

    async fn list_cards(&self, _board: &Board, filter: CardFilter) -> Result<Vec<Card>> {
        self.record("list_cards");
        Ok(self
            .cards
            .iter()
            .filter(|c| match filter {
                CardFilter::Open => !c.closed,
                CardFilter::Closed => c.closed,
                CardFilter::All => true,
            })
            .cloned()
            .collect())
    }

    async fn get_list(&self, board: &Board, list_id: &str) -> Result<TrelloList> {
        self.record("get_list");
        self.lists
            .get(list_id)
            .map(|name| TrelloList {
                id: list_id.to_string(),
                name: name.clone(),
            })
            .ok_or_else(|| {
                BoardCorpusError::lookup(format!(
                    "list '{list_id}' not found on board '{}'",
                    board.name
                ))
            })
    }

    async fn get_card_members(&self, card_id: &str) -> Result<Vec<Member>> {
        self.record("get_card_members");
        if self.fail_members {
            return Err(BoardCorpusError::RemoteService(
                "GET /cards/members: HTTP 503 Service Unavailable".into(),
            ));
        }
        let card = self.cards.iter().find(|c| c.id == card_id);
        Ok(card
            .map(|c| c.member_ids.iter().filter_map(|id| self.member(id)).collect())
            .unwrap_or_default())
    }

    async fn list_board_lists(&self, _board: &Board) -> Result<Vec<TrelloList>> {
        self.record("list_board_lists");
        Ok(self
            .lists
            .iter()
            .map(|(id, name)| TrelloList {
                id: id.clone(),
                name: name.clone(),
            })
            .collect())
    }

    async fn list_board_members(&self, _board: &Board) -> Result<Vec<Member>> {
        self.record("list_board_members");
        Ok(self.members.keys().filter_map(|id| self.member(id)).collect())
    }
}
