use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::identity::StorageKey;
use crate::types::ContentDocument;

/// Durable keyed store for content documents. Backends only move payload
/// strings; encoding and the fail-soft read policy live in the provided methods.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn read_payload(&self, key: &str) -> Result<Option<String>>;
    async fn write_payload(&self, key: &str, payload: &str) -> Result<()>;
    async fn remove_payload(&self, key: &str) -> Result<()>;

    /// `None` for a missing, unreadable or undecodable entry; callers treat
    /// all three as "no prior data".
    async fn load(&self, key: &StorageKey) -> Option<ContentDocument> {
        let payload = match self.read_payload(key.as_str()).await {
            Ok(Some(p)) => p,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "content read failed, treating as empty");
                return None;
            }
        };
        match serde_json::from_str::<ContentDocument>(&payload) {
            Ok(doc) => Some(doc),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "stored content is not a valid document, treating as empty");
                None
            }
        }
    }

    /// Last write wins; the full document shape is always written.
    async fn save(&self, key: &StorageKey, doc: &ContentDocument) -> Result<()> {
        let payload = serde_json::to_string(doc).context("serializing content document")?;
        self.write_payload(key.as_str(), &payload)
            .await
            .with_context(|| format!("writing content for {key}"))
    }

    async fn clear(&self, key: &StorageKey) -> Result<()> {
        self.remove_payload(key.as_str()).await
    }
}

/// In-process store for embedders without a database.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn read_payload(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn write_payload(&self, key: &str, payload: &str) -> Result<()> {
        self.entries.write().await.insert(key.to_string(), payload.to_string());
        Ok(())
    }

    async fn remove_payload(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
