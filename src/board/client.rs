//! Board API client — one GraphQL mutation to create items, one query to list
//! columns.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::columns::ColumnValues;
use crate::config::BoardConfig;
use crate::error::BoardError;

const CREATE_ITEM_MUTATION: &str = r#"
mutation CreateItem($boardId: ID!, $itemName: String!, $columnValues: JSON!) {
    create_item(board_id: $boardId, item_name: $itemName, column_values: $columnValues) {
        id
        name
    }
}
"#;

const BOARD_COLUMNS_QUERY: &str = r#"
query GetBoard($boardId: ID!) {
    boards(ids: [$boardId]) {
        columns {
            id
            title
            type
        }
    }
}
"#;

/// An item created on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedItem {
    pub id: String,
    pub name: String,
}

/// A column definition as reported by the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardColumn {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub column_type: String,
}

/// Operations the relay needs from the remote board.
#[async_trait]
pub trait BoardApi: Send + Sync {
    /// Board items are created on.
    fn board_id(&self) -> u64;

    /// Create one item with the given name and column values.
    async fn create_item(
        &self,
        name: &str,
        columns: &ColumnValues,
    ) -> Result<CreatedItem, BoardError>;

    /// List the board's columns. Failures are logged and yield `None`.
    async fn list_columns(&self) -> Option<Vec<BoardColumn>>;
}

// ── GraphQL wire types ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a, V> {
    query: &'a str,
    variables: V,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateItemVariables<'a> {
    board_id: u64,
    item_name: &'a str,
    /// The API takes column values as a JSON-encoded string, not an object.
    column_values: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BoardVariables {
    board_id: u64,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct CreateItemData {
    create_item: CreatedItem,
}

#[derive(Debug, Deserialize)]
struct BoardsData {
    boards: Vec<BoardColumns>,
}

#[derive(Debug, Deserialize)]
struct BoardColumns {
    columns: Vec<BoardColumn>,
}

impl<T> GraphQlResponse<T> {
    /// Unwrap the envelope: the first GraphQL error wins, then a top-level
    /// `error_message`, then missing data.
    fn into_data(self) -> Result<T, BoardError> {
        if let Some(first) = self.errors.and_then(|errs| errs.into_iter().next()) {
            return Err(BoardError::Api(first.message));
        }
        if let Some(message) = self.error_message {
            return Err(BoardError::Api(message));
        }
        self.data
            .ok_or_else(|| BoardError::InvalidResponse("response has no data".to_string()))
    }
}

// ── Client ──────────────────────────────────────────────────────────────

/// reqwest-backed client for the board's GraphQL endpoint.
pub struct BoardClient {
    client: reqwest::Client,
    api_url: String,
    api_token: SecretString,
    board_id: u64,
}

impl BoardClient {
    pub fn new(config: &BoardConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_token: config.api_token.clone(),
            board_id: config.board_id,
        }
    }

    async fn execute<V, T>(&self, query: &str, variables: V) -> Result<T, BoardError>
    where
        V: Serialize + Send,
        T: DeserializeOwned + Send,
    {
        let resp = self
            .client
            .post(&self.api_url)
            .header(reqwest::header::AUTHORIZATION, self.api_token.expose_secret())
            .json(&GraphQlRequest { query, variables })
            .send()
            .await
            .map_err(|e| BoardError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| BoardError::Transport(e.to_string()))?;

        match serde_json::from_str::<GraphQlResponse<T>>(&body) {
            Ok(envelope) => envelope.into_data(),
            Err(_) if !status.is_success() => Err(BoardError::Api(format!(
                "Request failed with status code {}",
                status.as_u16()
            ))),
            Err(e) => Err(BoardError::InvalidResponse(e.to_string())),
        }
    }
}

#[async_trait]
impl BoardApi for BoardClient {
    fn board_id(&self) -> u64 {
        self.board_id
    }

    async fn create_item(
        &self,
        name: &str,
        columns: &ColumnValues,
    ) -> Result<CreatedItem, BoardError> {
        let variables = CreateItemVariables {
            board_id: self.board_id,
            item_name: name,
            column_values: columns.to_json_string()?,
        };
        debug!(item_name = name, column_values = %variables.column_values, "Creating board item");

        let data: CreateItemData = self
            .execute(CREATE_ITEM_MUTATION, variables)
            .await
            .inspect_err(|e| warn!(error = %e, item_name = name, "Board create_item failed"))?;

        info!(item_id = %data.create_item.id, item_name = %data.create_item.name, "Board item created");
        Ok(data.create_item)
    }

    async fn list_columns(&self) -> Option<Vec<BoardColumn>> {
        let variables = BoardVariables {
            board_id: self.board_id,
        };
        match self
            .execute::<_, BoardsData>(BOARD_COLUMNS_QUERY, variables)
            .await
        {
            Ok(data) => match data.boards.into_iter().next() {
                Some(board) => Some(board.columns),
                None => {
                    warn!(board_id = self.board_id, "Board not found when listing columns");
                    None
                }
            },
            Err(e) => {
                warn!(error = %e, board_id = self.board_id, "Error fetching board columns");
                None
            }
        }
    }
}
