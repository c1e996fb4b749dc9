use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::AnyPool;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRow {
    pub key: String,
    pub payload: String,
    pub updated_at: String,
}

pub async fn get_document_payload(pool: &AnyPool, key: &str) -> Result<Option<String>> {
    let row = sqlx::query_scalar::<_, String>("SELECT payload FROM content_documents WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn upsert_document(pool: &AnyPool, key: &str, payload: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO content_documents(key, payload) VALUES(?, ?)\n         ON CONFLICT(key) DO UPDATE SET payload=excluded.payload, updated_at=CURRENT_TIMESTAMP",
    )
    .bind(key)
    .bind(payload)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete_document(pool: &AnyPool, key: &str) -> Result<u64> {
    let res = sqlx::query("DELETE FROM content_documents WHERE key = ?")
        .bind(key)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn list_documents(pool: &AnyPool) -> Result<Vec<DocumentRow>> {
    let rows: Vec<(String, String, String)> =
        sqlx::query_as("SELECT key, payload, updated_at FROM content_documents ORDER BY key")
            .fetch_all(pool)
            .await?;
    Ok(rows
        .into_iter()
        .map(|(key, payload, updated_at)| DocumentRow { key, payload, updated_at })
        .collect())
}
