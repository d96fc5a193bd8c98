//! HTTP vector database backend.
//!
//! Speaks the common managed-index REST shape: `POST /vectors/upsert` with
//! `{namespace, vectors}` and `POST /query` with `{namespace, vector, topK}`.
//! Chunk text rides inside each vector's metadata under the `"text"` key.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use lessonloom_core::{Error, IndexedRecord, Result, ScoredRecord};

use crate::backend::VectorBackend;

const API_KEY_HEADER: &str = "Api-Key";

/// Client for a remote vector index identified by base URL + index name.
pub struct HttpVectorIndex {
    client: reqwest::Client,
    base_url: String,
    index_name: String,
}

impl HttpVectorIndex {
    pub fn new(
        base_url: &str,
        index_name: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self> {
        if index_name.trim().is_empty() {
            return Err(Error::Config("missing vector index name".into()));
        }
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if !api_key.trim().is_empty() {
            headers.insert(
                API_KEY_HEADER,
                HeaderValue::from_str(api_key.trim())
                    .map_err(|_| Error::Config("invalid vector index API key".into()))?,
            );
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Http(format!("failed to build vector index HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            index_name: index_name.to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/indexes/{}/{path}", self.base_url, self.index_name)
    }

    async fn post<Req: Serialize, Resp: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &Req,
    ) -> Result<Resp> {
        let response = self
            .client
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Provider(format!("vector index request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(Error::Provider(format!(
                "vector index request failed ({status}): {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Provider(format!("malformed vector index response: {e}")))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireVector {
    id: String,
    values: Vec<f32>,
    metadata: serde_json::Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpsertRequest {
    namespace: String,
    vectors: Vec<WireVector>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    upserted_count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    namespace: String,
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    matches: Vec<WireMatch>,
}

#[derive(Deserialize)]
struct WireMatch {
    id: String,
    score: f32,
    #[serde(default)]
    metadata: Option<serde_json::Value>,
}

/// Fold the record's text into wire metadata under `"text"`.
fn wire_metadata(record: &IndexedRecord) -> serde_json::Value {
    let mut map = match &record.metadata {
        Some(serde_json::Value::Object(m)) => m.clone(),
        _ => serde_json::Map::new(),
    };
    map.insert("text".to_string(), record.text.clone().into());
    serde_json::Value::Object(map)
}

/// Pull the chunk text back out of wire metadata.
fn split_metadata(metadata: Option<serde_json::Value>) -> (String, Option<serde_json::Value>) {
    match metadata {
        Some(serde_json::Value::Object(mut map)) => {
            let text = match map.remove("text") {
                Some(serde_json::Value::String(s)) => s,
                _ => String::new(),
            };
            if map.is_empty() {
                (text, None)
            } else {
                (text, Some(serde_json::Value::Object(map)))
            }
        }
        other => (String::new(), other),
    }
}

#[async_trait]
impl VectorBackend for HttpVectorIndex {
    async fn upsert(&self, namespace: &str, records: &[IndexedRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        let request = UpsertRequest {
            namespace: namespace.to_string(),
            vectors: records
                .iter()
                .map(|r| WireVector {
                    id: r.id.clone(),
                    values: r.vector.clone(),
                    metadata: wire_metadata(r),
                })
                .collect(),
        };
        let response: UpsertResponse = self.post("vectors/upsert", &request).await?;
        if response.upserted_count != records.len() {
            return Err(Error::Provider(format!(
                "vector index acknowledged {} of {} records",
                response.upserted_count,
                records.len()
            )));
        }
        Ok(response.upserted_count)
    }

    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredRecord>> {
        let request = QueryRequest {
            namespace: namespace.to_string(),
            vector,
            top_k,
            include_metadata: true,
        };
        let response: QueryResponse = self.post("query", &request).await?;
        Ok(response
            .matches
            .into_iter()
            .map(|m| {
                let (text, metadata) = split_metadata(m.metadata);
                ScoredRecord {
                    id: m.id,
                    score: m.score,
                    text,
                    metadata,
                }
            })
            .collect())
    }
}
