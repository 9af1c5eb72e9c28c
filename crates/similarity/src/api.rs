use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use serde_json::{json, Value};

use crate::{Embedder, EmbedderConfig, SimilarityError};

/// Embedder backed by a remote model server speaking JSON over HTTP.
///
/// * `POST {api_url}/encode/text` with `{"texts": [..]}`
/// * `POST {api_url}/encode/image` with `{"image": "<base64>"}`
///
/// Responses may be `{"embeddings": [[..]]}`, `{"embedding": [..]}`,
/// an OpenAI-style `{"data": [{"embedding": [..]}]}`, or a bare array.
#[derive(Debug, Clone)]
pub struct ApiEmbedder {
    client: reqwest::Client,
    base_url: String,
    auth_header: Option<String>,
    model_name: String,
}

impl ApiEmbedder {
    pub fn new(cfg: &EmbedderConfig) -> Result<Self, SimilarityError> {
        let base_url = cfg
            .api_url
            .as_deref()
            .ok_or_else(|| SimilarityError::InvalidConfig("api_url is required for api mode".into()))?
            .trim_end_matches('/')
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
            .pool_max_idle_per_host(32)
            .build()
            .map_err(|e| SimilarityError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            auth_header: cfg.api_auth_header.clone(),
            model_name: cfg.model_name.clone(),
        })
    }

    async fn post(&self, path: &str, payload: Value) -> Result<Value, SimilarityError> {
        let url = format!("{}/{path}", self.base_url);
        let mut request = self.client.post(&url).json(&payload);
        if let Some(header) = self.auth_header.as_deref() {
            request = request.header("Authorization", header);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SimilarityError::Upstream(format!("HTTP error {status}: {body}")));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SimilarityError::Upstream(format!("invalid JSON response: {e}")))
    }
}

#[async_trait]
impl Embedder for ApiEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn encode_image(&self, image: &[u8]) -> Result<Vec<f32>, SimilarityError> {
        if image.is_empty() {
            return Err(SimilarityError::InvalidInput("image bytes are empty".into()));
        }
        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        let response = self
            .post("encode/image", json!({ "image": encoded, "model": self.model_name }))
            .await?;
        parse_embeddings_from_value(response)?
            .into_iter()
            .next()
            .ok_or_else(|| SimilarityError::Upstream("API response did not contain an embedding".into()))
    }

    async fn encode_text(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, SimilarityError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let response = self
            .post("encode/text", json!({ "texts": texts, "model": self.model_name }))
            .await?;
        let vectors = parse_embeddings_from_value(response)?;
        if vectors.len() != texts.len() {
            return Err(SimilarityError::Upstream(format!(
                "API returned {} embeddings for {} prompts",
                vectors.len(),
                texts.len()
            )));
        }
        Ok(vectors)
    }
}

fn map_transport_error(err: reqwest::Error) -> SimilarityError {
    if err.is_timeout() {
        SimilarityError::Timeout(err.to_string())
    } else {
        SimilarityError::Upstream(format!("HTTP request failed: {err}"))
    }
}

fn parse_embeddings_from_value(value: Value) -> Result<Vec<Vec<f32>>, SimilarityError> {
    match value {
        Value::Object(mut map) => {
            if let Some(embeddings) = map.remove("embeddings") {
                return parse_embedding_collection(embeddings);
            }
            if let Some(embedding) = map.remove("embedding") {
                return parse_embedding_vector(embedding).map(|v| vec![v]);
            }
            if let Some(Value::Array(items)) = map.remove("data") {
                return items
                    .into_iter()
                    .map(|item| match item {
                        Value::Object(mut obj) => obj
                            .remove("embedding")
                            .ok_or_else(|| {
                                SimilarityError::Upstream(
                                    "missing `embedding` field in data item".into(),
                                )
                            })
                            .and_then(parse_embedding_vector),
                        _ => Err(SimilarityError::Upstream(
                            "unexpected entry inside `data` array".into(),
                        )),
                    })
                    .collect();
            }
            Err(SimilarityError::Upstream("unsupported API response shape".into()))
        }
        other => parse_embedding_collection(other),
    }
}

fn parse_embedding_collection(value: Value) -> Result<Vec<Vec<f32>>, SimilarityError> {
    match value {
        Value::Array(items) => {
            if items.is_empty() {
                Ok(Vec::new())
            } else if items.iter().all(|item| matches!(item, Value::Array(_))) {
                items.into_iter().map(parse_embedding_vector).collect()
            } else {
                parse_embedding_vector(Value::Array(items)).map(|vec| vec![vec])
            }
        }
        other => parse_embedding_vector(other).map(|vec| vec![vec]),
    }
}

fn parse_embedding_vector(value: Value) -> Result<Vec<f32>, SimilarityError> {
    match value {
        Value::Array(values) => values
            .into_iter()
            .map(|entry| match entry {
                Value::Number(num) => num
                    .as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| SimilarityError::Upstream("non-finite embedding value".into())),
                other => Err(SimilarityError::Upstream(format!(
                    "embedding entries must be numbers, got {other:?}"
                ))),
            })
            .collect(),
        other => Err(SimilarityError::Upstream(format!(
            "embedding vector must be an array, got {other:?}"
        ))),
    }
}
