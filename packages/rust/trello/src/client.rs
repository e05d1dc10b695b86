//! Authenticated Trello REST client.
//!
//! Every call is a single `GET` with the API key and token passed as query
//! parameters. Calls are never retried; failures surface as
//! [`BoardCorpusError::RemoteService`] (transport or non-success status),
//! [`BoardCorpusError::Lookup`] (unknown list id) or
//! [`BoardCorpusError::Parse`] (undecodable body).

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use boardcorpus_shared::{
    Board, BoardCorpusError, Card, CardFilter, Credentials, Member, Result, TrelloConfig,
    TrelloList,
};

use crate::wire::{BoardJson, CardJson, ListJson, MemberJson};

/// User-Agent string for API requests.
const USER_AGENT: &str = concat!("boardcorpus/", env!("CARGO_PKG_VERSION"));

/// Card fields requested from the board listing.
const CARD_FIELDS: &str = "name,desc,idList,idMembers,closed,url";

// ---------------------------------------------------------------------------
// BoardService
// ---------------------------------------------------------------------------

/// The board-management operations the corpus pipeline depends on.
///
/// [`TrelloClient`] is the production implementation; tests substitute
/// in-memory services.
pub trait BoardService {
    /// All boards visible to the authenticated account.
    fn list_boards(&self) -> impl Future<Output = Result<Vec<Board>>>;

    /// Cards on `board` matching `filter`, in the service's listing order,
    /// with checklists and comments attached.
    fn list_cards(
        &self,
        board: &Board,
        filter: CardFilter,
    ) -> impl Future<Output = Result<Vec<Card>>>;

    /// Resolve one list by id. Unknown ids fail with a lookup error.
    fn get_list(&self, board: &Board, list_id: &str) -> impl Future<Output = Result<TrelloList>>;

    /// Members assigned to one card.
    fn get_card_members(&self, card_id: &str) -> impl Future<Output = Result<Vec<Member>>>;

    /// Every list on `board`, open or closed.
    fn list_board_lists(&self, board: &Board) -> impl Future<Output = Result<Vec<TrelloList>>>;

    /// Every member of `board`.
    fn list_board_members(&self, board: &Board) -> impl Future<Output = Result<Vec<Member>>>;
}

// ---------------------------------------------------------------------------
// TrelloClient
// ---------------------------------------------------------------------------

/// HTTP implementation of [`BoardService`] against the Trello REST API.
pub struct TrelloClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl TrelloClient {
    /// Create a client for the API root in `config`.
    pub fn new(config: &TrelloConfig, credentials: Credentials) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                BoardCorpusError::RemoteService(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// Send an authenticated `GET` and return the response regardless of status.
    async fn send(&self, path: &str, query: &[(&str, &str)]) -> Result<Response> {
        debug!(path, "GET");

        self.client
            .get(format!("{}{path}", self.base_url))
            .query(&[
                ("key", self.credentials.api_key.as_str()),
                ("token", self.credentials.token.as_str()),
            ])
            .query(query)
            .send()
            .await
            // The request URL carries the credentials; keep it out of the message.
            .map_err(|e| BoardCorpusError::RemoteService(format!("GET {path}: {}", e.without_url())))
    }

    /// `GET` a JSON resource, failing on any non-success status.
    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let response = self.send(path, query).await?;
        let status = response.status();

        if !status.is_success() {
            return Err(BoardCorpusError::RemoteService(format!(
                "GET {path}: HTTP {status}"
            )));
        }

        decode(path, response).await
    }
}

impl BoardService for TrelloClient {
    #[instrument(skip_all)]
    async fn list_boards(&self) -> Result<Vec<Board>> {
        let boards: Vec<BoardJson> = self
            .get_json("/members/me/boards", &[("fields", "name,closed,url")])
            .await?;

        debug!(count = boards.len(), "listed boards");
        Ok(boards.into_iter().map(Board::from).collect())
    }

    #[instrument(skip_all, fields(board = %board.name, filter = %filter))]
    async fn list_cards(&self, board: &Board, filter: CardFilter) -> Result<Vec<Card>> {
        let path = format!("/boards/{}/cards/{}", board.id, filter.as_str());
        let cards: Vec<CardJson> = self
            .get_json(
                &path,
                &[
                    ("fields", CARD_FIELDS),
                    ("checklists", "all"),
                    ("actions", "commentCard"),
                ],
            )
            .await?;

        debug!(count = cards.len(), "listed cards");
        cards.into_iter().map(Card::try_from).collect()
    }

    #[instrument(skip_all, fields(board = %board.name, list_id = %list_id))]
    async fn get_list(&self, board: &Board, list_id: &str) -> Result<TrelloList> {
        let path = format!("/lists/{list_id}");
        let response = self.send(&path, &[("fields", "name")]).await?;
        let status = response.status();

        // Unknown ids come back as 404, malformed ones as 400.
        if status == StatusCode::NOT_FOUND || status == StatusCode::BAD_REQUEST {
            return Err(BoardCorpusError::lookup(format!(
                "list '{list_id}' not found on board '{}'",
                board.name
            )));
        }
        if !status.is_success() {
            return Err(BoardCorpusError::RemoteService(format!(
                "GET {path}: HTTP {status}"
            )));
        }

        let list: ListJson = decode(&path, response).await?;
        Ok(list.into())
    }

    #[instrument(skip_all, fields(card_id = %card_id))]
    async fn get_card_members(&self, card_id: &str) -> Result<Vec<Member>> {
        let members: Vec<MemberJson> = self
            .get_json(&format!("/cards/{card_id}/members"), &[("fields", "fullName")])
            .await?;

        Ok(members.into_iter().map(Member::from).collect())
    }

    #[instrument(skip_all, fields(board = %board.name))]
    async fn list_board_lists(&self, board: &Board) -> Result<Vec<TrelloList>> {
        let lists: Vec<ListJson> = self
            .get_json(&format!("/boards/{}/lists/all", board.id), &[("fields", "name")])
            .await?;

        debug!(count = lists.len(), "listed board lists");
        Ok(lists.into_iter().map(TrelloList::from).collect())
    }

    #[instrument(skip_all, fields(board = %board.name))]
    async fn list_board_members(&self, board: &Board) -> Result<Vec<Member>> {
        let members: Vec<MemberJson> = self
            .get_json(&format!("/boards/{}/members", board.id), &[("fields", "fullName")])
            .await?;

        debug!(count = members.len(), "listed board members");
        Ok(members.into_iter().map(Member::from).collect())
    }
}

/// Read a response body and decode it as JSON.
async fn decode<T: DeserializeOwned>(path: &str, response: Response) -> Result<T> {
    let body = response
        .text()
        .await
        .map_err(|e| BoardCorpusError::RemoteService(format!("GET {path}: body read failed: {e}")))?;

    serde_json::from_str(&body)
        .map_err(|e| BoardCorpusError::parse(format!("GET {path}: invalid JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> TrelloClient {
        let config = TrelloConfig {
            base_url: server.uri(),
            timeout_secs: 5,
            ..TrelloConfig::default()
        };
        let credentials = Credentials {
            api_key: "test-key".into(),
            token: "test-token".into(),
        };
        TrelloClient::new(&config, credentials).unwrap()
    }

    fn board() -> Board {
        Board {
            id: "board-1".into(),
            name: "Smith Street Enterprises".into(),
            closed: false,
            url: String::new(),
        }
    }

    #[tokio::test]
    async fn list_boards_sends_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/members/me/boards"))
            .and(query_param("key", "test-key"))
            .and(query_param("token", "test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"id":"board-1","name":"Smith Street Enterprises","closed":false,"url":"https://trello.com/b/x"},
                    {"id":"board-2","name":"Personal","closed":true}]"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let boards = client_for(&server).list_boards().await.unwrap();
        assert_eq!(boards.len(), 2);
        assert_eq!(boards[0].name, "Smith Street Enterprises");
        assert!(boards[1].closed);
    }

    #[tokio::test]
    async fn list_cards_uses_filter_and_decodes_fixture() {
        let server = MockServer::start().await;
        let fixture = std::fs::read_to_string(
            std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
                .join("../../../fixtures/json/cards.fixture.json"),
        )
        .unwrap();

        Mock::given(method("GET"))
            .and(path("/boards/board-1/cards/all"))
            .and(query_param("checklists", "all"))
            .and(query_param("actions", "commentCard"))
            .respond_with(ResponseTemplate::new(200).set_body_string(fixture))
            .mount(&server)
            .await;

        let cards = client_for(&server)
            .list_cards(&board(), CardFilter::All)
            .await
            .unwrap();

        let ids: Vec<&str> = cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["card-design-review", "card-kickoff", "card-invoices"]);
        // Comments arrive newest first and are reordered oldest first.
        assert_eq!(cards[2].comments[0].text, "Globex sent");
    }

    #[tokio::test]
    async fn get_list_resolves_name() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/lists/list-backlog"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"id":"list-backlog","name":"Backlog"}"#),
            )
            .mount(&server)
            .await;

        let list = client_for(&server)
            .get_list(&board(), "list-backlog")
            .await
            .unwrap();
        assert_eq!(list.name, "Backlog");
    }

    #[tokio::test]
    async fn get_list_maps_missing_list_to_lookup_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/lists/gone"))
            .respond_with(ResponseTemplate::new(404).set_body_string("The requested resource was not found."))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_list(&board(), "gone")
            .await
            .unwrap_err();
        assert!(matches!(err, BoardCorpusError::Lookup { .. }), "got {err}");
    }

    #[tokio::test]
    async fn server_errors_are_remote_service_errors() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/cards/card-1/members"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_card_members("card-1")
            .await
            .unwrap_err();
        assert!(matches!(err, BoardCorpusError::RemoteService(_)));
        assert!(err.to_string().contains("503"));
        assert!(!err.to_string().contains("test-token"));
    }

    #[tokio::test]
    async fn unreachable_service_is_remote_service_error() {
        let config = TrelloConfig {
            // Port 9 (discard) on loopback is not expected to accept HTTP.
            base_url: "http://127.0.0.1:9".into(),
            timeout_secs: 2,
            ..TrelloConfig::default()
        };
        let credentials = Credentials {
            api_key: "test-key".into(),
            token: "test-token".into(),
        };
        let client = TrelloClient::new(&config, credentials).unwrap();

        let err = client.list_boards().await.unwrap_err();
        assert!(matches!(err, BoardCorpusError::RemoteService(_)));
        assert!(!err.to_string().contains("test-token"));
    }

    #[tokio::test]
    async fn invalid_json_is_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/boards/board-1/members"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .list_board_members(&board())
            .await
            .unwrap_err();
        assert!(matches!(err, BoardCorpusError::Parse { .. }));
    }

    #[tokio::test]
    async fn card_members_decode_full_names() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/cards/card-1/members"))
            .and(query_param("fields", "fullName"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"id":"member-ann","fullName":"Ann Lee"},{"id":"member-raj","fullName":"Raj Patel"}]"#,
            ))
            .mount(&server)
            .await;

        let members = client_for(&server).get_card_members("card-1").await.unwrap();
        let names: Vec<&str> = members.iter().map(|m| m.full_name.as_str()).collect();
        assert_eq!(names, ["Ann Lee", "Raj Patel"]);
    }
}
