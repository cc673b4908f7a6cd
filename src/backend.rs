//! Client for the retrieval backend: search, related-item lookup and chat.
//!
//! The backend is opaque to the graph session. Its papers are turned into
//! unvalidated `ItemRecord`s; missing fields are reported at ingestion.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::config::AppConfig;
use crate::models::{ItemRecord, Message};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaperMetadata {
    pub title: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Paper {
    pub paper_id: Option<String>,
    pub metadata: Option<PaperMetadata>,
    pub similarity: Option<f64>,
}

impl From<Paper> for ItemRecord {
    fn from(paper: Paper) -> Self {
        let metadata = paper.metadata.unwrap_or_default();
        ItemRecord {
            item_id: paper.paper_id,
            title: metadata.title,
            summary: metadata.summary,
            relevance: paper.similarity,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperContext {
    pub title: String,
    #[serde(default)]
    pub relevant_sections: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub paper_context: Option<PaperContext>,
}

#[async_trait]
pub trait RetrievalBackend: Send + Sync {
    /// Ranked items for a free-text query.
    async fn search(&self, query: &str) -> Result<Vec<ItemRecord>>;

    /// Items related to `item_id`, optionally steered by a transcript.
    async fn related(&self, item_id: &str, context: Option<&str>) -> Result<Vec<ItemRecord>>;

    /// One assistant reply about `item_id`, given the prior transcript.
    async fn chat(&self, item_id: &str, message: &str, history: &[Message]) -> Result<ChatReply>;

    async fn health(&self) -> Result<serde_json::Value>;
}

/// HTTP implementation talking JSON to the retrieval service.
#[derive(Debug, Clone)]
pub struct RetrievalClient {
    client: reqwest::Client,
    base_url: Url,
}

impl RetrievalClient {
    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(cfg.retrieval_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: cfg.retrieval_api_url.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T> {
        let url = self.endpoint(path);
        debug!("POST {url}");
        let response = self.client.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("Retrieval backend error {status} on {path}: {body_text}");
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl RetrievalBackend for RetrievalClient {
    async fn search(&self, query: &str) -> Result<Vec<ItemRecord>> {
        let query = non_empty(query, "query")?;
        let papers: Vec<Paper> = self.post("api/search", json!({ "query": query })).await?;
        Ok(papers.into_iter().map(ItemRecord::from).collect())
    }

    async fn related(&self, item_id: &str, context: Option<&str>) -> Result<Vec<ItemRecord>> {
        let papers: Vec<Paper> = self
            .post(
                "api/search_paper",
                json!({ "paper_id": item_id, "conversation": context }),
            )
            .await?;
        Ok(papers.into_iter().map(ItemRecord::from).collect())
    }

    async fn chat(&self, item_id: &str, message: &str, history: &[Message]) -> Result<ChatReply> {
        let message = non_empty(message, "message")?;
        self.post(
            "api/chat",
            json!({
                "paper_id": item_id,
                "message": message,
                "conversation_history": wire_history(history),
            }),
        )
        .await
    }

    async fn health(&self) -> Result<serde_json::Value> {
        let response = self.client.get(self.endpoint("health")).send().await?;
        let status = response.status();
        if !status.is_success() {
            bail!("Retrieval backend health check failed: {status}");
        }
        Ok(response.json().await?)
    }
}

fn non_empty<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("{field} cannot be empty"));
    }
    Ok(trimmed)
}

fn wire_history(history: &[Message]) -> Vec<WireMessage<'_>> {
    history
        .iter()
        .map(|m| WireMessage {
            role: m.speaker.as_str(),
            content: &m.text,
        })
        .collect()
}
