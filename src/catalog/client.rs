use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("upstream response missing data")]
    MissingData,
}

#[derive(Serialize)]
struct GraphQLRequest<'a, V: Serialize> {
    query: &'a str,
    variables: V,
}

#[derive(Deserialize)]
struct GraphQLResponse {
    data: Option<Value>,
}

const TRENDING_QUERY: &str = r#"
    query {
        Page(page: 1, perPage: 25) {
            media(type: ANIME, sort: START_DATE_DESC) {
                id
                title { romaji english native }
                coverImage { large medium }
                description
                genres
                episodes
                averageScore
                startDate { year month day }
            }
        }
    }
"#;

const POPULAR_QUERY: &str = r#"
    query {
        Page(page: 1, perPage: 25) {
            media(type: ANIME, sort: TRENDING_DESC) {
                id
                title { romaji english native }
                coverImage { large medium }
                description
                genres
                episodes
                averageScore
            }
        }
    }
"#;

const SEARCH_QUERY: &str = r#"
    query ($search: String) {
        Page(page: 1, perPage: 10) {
            media(search: $search, type: ANIME) {
                id
                title { romaji english native }
                coverImage { large medium }
                description
                genres
                episodes
                averageScore
            }
        }
    }
"#;

const DETAIL_QUERY: &str = r#"
    query ($id: Int) {
        Media(id: $id, type: ANIME) {
            id
            title { romaji english native }
            coverImage { large medium }
            description
            genres
            episodes
            averageScore
        }
    }
"#;

/// Thin client for the AniList GraphQL catalog. Responses are relayed as raw
/// JSON after unwrapping the GraphQL envelope; no local schema is enforced.
#[derive(Clone)]
pub struct CatalogClient {
    http: Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let http = Client::builder().user_agent("animeboxd/0.1").build()?;
        Ok(Self {
            http,
            base_url: base_url.to_string(),
        })
    }

    async fn post<V: Serialize>(&self, query: &str, variables: V) -> Result<Value, CatalogError> {
        let body = GraphQLRequest { query, variables };
        let response: GraphQLResponse = self
            .http
            .post(&self.base_url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(url = %self.base_url, "catalog query ok");
        response.data.ok_or(CatalogError::MissingData)
    }

    /// Recent releases, newest start date first.
    pub async fn trending(&self) -> Result<Vec<Value>, CatalogError> {
        page_media(self.post(TRENDING_QUERY, Value::Null).await?)
    }

    /// Currently trending titles.
    pub async fn popular(&self) -> Result<Vec<Value>, CatalogError> {
        page_media(self.post(POPULAR_QUERY, Value::Null).await?)
    }

    pub async fn search(&self, term: &str) -> Result<Vec<Value>, CatalogError> {
        let data = self
            .post(SEARCH_QUERY, serde_json::json!({ "search": term }))
            .await?;
        page_media(data)
    }

    /// Single title by AniList id; `None` when the id is unknown upstream.
    /// AniList ids are 32-bit (`$id: Int` in the query).
    pub async fn detail(&self, id: i32) -> Result<Option<Value>, CatalogError> {
        let data = self.post(DETAIL_QUERY, serde_json::json!({ "id": id })).await?;
        Ok(media(data))
    }
}

fn page_media(mut data: Value) -> Result<Vec<Value>, CatalogError> {
    match data.pointer_mut("/Page/media").map(Value::take) {
        Some(Value::Array(items)) => Ok(items),
        _ => Err(CatalogError::MissingData),
    }
}

fn media(mut data: Value) -> Option<Value> {
    match data.pointer_mut("/Media").map(Value::take) {
        None | Some(Value::Null) => None,
        Some(m) => Some(m),
    }
}
