use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{IndexError, IndexResult};
use crate::{NameQuery, SearchIndex};

/// Connection settings for a Weaviate instance.
#[derive(Clone)]
pub struct WeaviateSettings {
    /// Bare host (`cluster.weaviate.cloud`) or a full `http(s)://` base URL.
    pub host: String,
    pub api_key: String,
    /// Scheme applied to a bare host.
    pub scheme: String,
    /// Per-request timeout. `None` leaves requests unbounded.
    pub timeout: Option<Duration>,
}

impl WeaviateSettings {
    pub fn new(host: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            api_key: api_key.into(),
            scheme: "https".to_string(),
            timeout: None,
        }
    }

    pub fn base_url(&self) -> String {
        let host = self.host.trim().trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("{}://{}", self.scheme, host)
        }
    }
}

impl fmt::Debug for WeaviateSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeaviateSettings")
            .field("host", &self.host)
            .field("api_key", &"<redacted>")
            .field("scheme", &self.scheme)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Weaviate GraphQL client authenticated with an API key.
#[derive(Clone)]
pub struct WeaviateClient {
    client: Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_additional")]
    additional: Additional,
}

#[derive(Debug, Deserialize)]
struct Additional {
    id: String,
}

impl WeaviateClient {
    pub fn new(settings: &WeaviateSettings) -> IndexResult<Self> {
        if settings.host.trim().is_empty() {
            return Err(IndexError::InvalidConfig("Weaviate host is empty".to_string()));
        }
        if settings.api_key.trim().is_empty() {
            return Err(IndexError::InvalidConfig("Weaviate API key is empty".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {}", settings.api_key.trim()))
            .map_err(|_| IndexError::InvalidConfig("Weaviate API key is not a valid header value".to_string()))?;
        headers.insert(AUTHORIZATION, bearer);

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/v1/graphql", settings.base_url()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SearchIndex for WeaviateClient {
    async fn find_ids_by_name(&self, query: &NameQuery<'_>) -> IndexResult<Vec<String>> {
        let graphql = build_get_query(query)?;
        debug!("Weaviate query: {}", graphql);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "query": graphql }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(IndexError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response.json().await?;
        parse_get_ids(payload, query.class_name)
    }
}

/// Builds the `Get` query for an exact-equality lookup returning only
/// object ids.
pub fn build_get_query(query: &NameQuery<'_>) -> IndexResult<String> {
    if !is_graphql_name(query.class_name) {
        return Err(IndexError::InvalidQuery(format!(
            "'{}' is not a valid class name",
            query.class_name
        )));
    }
    if !is_graphql_name(query.field) {
        return Err(IndexError::InvalidQuery(format!(
            "'{}' is not a valid property name",
            query.field
        )));
    }
    if query.limit == 0 {
        return Err(IndexError::InvalidQuery("limit must be at least 1".to_string()));
    }

    // GraphQL string literals share JSON's escaping rules
    let value = serde_json::to_string(query.value)?;
    Ok(format!(
        "{{ Get {{ {class}(where: {{path: [\"{field}\"], operator: Equal, valueString: {value}}}, limit: {limit}) {{ _additional {{ id }} }} }} }}",
        class = query.class_name,
        field = query.field,
        value = value,
        limit = query.limit,
    ))
}

/// Extracts `data.Get.<class>[]._additional.id` from a GraphQL response body.
pub fn parse_get_ids(payload: Value, class_name: &str) -> IndexResult<Vec<String>> {
    let response: GraphqlResponse = serde_json::from_value(payload)
        .map_err(|e| IndexError::MalformedResponse(e.to_string()))?;

    if !response.errors.is_empty() {
        let messages: Vec<String> = response.errors.into_iter().map(|e| e.message).collect();
        return Err(IndexError::Graphql(messages.join("; ")));
    }

    let hits = response
        .data
        .as_ref()
        .and_then(|data| data.get("Get"))
        .and_then(|get| get.get(class_name))
        .filter(|hits| !hits.is_null())
        .cloned()
        .ok_or_else(|| {
            IndexError::MalformedResponse(format!("response has no data.Get.{}", class_name))
        })?;

    let hits: Vec<Hit> = serde_json::from_value(hits)
        .map_err(|e| IndexError::MalformedResponse(format!("unexpected hit shape: {}", e)))?;
    Ok(hits.into_iter().map(|hit| hit.additional.id).collect())
}

fn is_graphql_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}
