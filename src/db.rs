use anyhow::{Context, Result};
use directories::ProjectDirs;
use sqlx::{any::AnyConnectOptions, AnyPool, ConnectOptions, migrate::Migrator};
use sqlx::any::AnyPoolOptions;
use std::{path::PathBuf, str::FromStr};
use std::sync::Once;

use crate::dao;
use crate::storage::ContentStore;

// Ensure drivers are installed exactly once for sqlx::any
static INSTALL_DRIVERS: Once = Once::new();

// Embed SQL migrations from the migrations/ directory
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Clone)]
pub struct Database {
    pool: AnyPool,
}

impl Database {
    // Create a connection pool. If database_url is None, use a SQLite file
    // in the user's data directory.
    pub async fn connect(database_url: Option<&str>) -> Result<Self> {
        INSTALL_DRIVERS.call_once(sqlx::any::install_default_drivers);

        let url = match database_url {
            Some(u) if !u.trim().is_empty() => u.to_string(),
            _ => default_sqlite_url()?,
        };

        let opts = AnyConnectOptions::from_str(&url)
            .with_context(|| format!("invalid database URL: {url}"))?;
        // Quiet by default; callers can enable SQLX_LOG if they want
        let opts = opts.disable_statement_logging();

        let pool = AnyPoolOptions::new()
            .max_connections(4)
            .connect_with(opts)
            .await
            .with_context(|| format!("failed to connect to database: {url}"))?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await.context("running migrations")
    }

    pub fn pool(&self) -> &AnyPool { &self.pool }

    /// Stored identity keys with their last write time.
    pub async fn list_keys(&self) -> Result<Vec<(String, String)>> {
        Ok(dao::list_documents(&self.pool)
            .await?
            .into_iter()
            .map(|row| (row.key, row.updated_at))
            .collect())
    }
}

#[async_trait::async_trait]
impl ContentStore for Database {
    async fn read_payload(&self, key: &str) -> Result<Option<String>> {
        dao::get_document_payload(&self.pool, key).await
    }

    async fn write_payload(&self, key: &str, payload: &str) -> Result<()> {
        dao::upsert_document(&self.pool, key, payload).await
    }

    async fn remove_payload(&self, key: &str) -> Result<()> {
        let removed = dao::delete_document(&self.pool, key).await?;
        tracing::debug!(key, removed, "cleared content document");
        Ok(())
    }
}

pub(crate) fn sqlite_url_for(path: &std::path::Path) -> String {
    // Encode spaces in the path for a valid sqlite URL
    let mut path_str = path.to_string_lossy().to_string();
    if path_str.contains(' ') { path_str = path_str.replace(' ', "%20"); }
    format!("sqlite://{path_str}?mode=rwc")
}

fn default_sqlite_url() -> Result<String> {
    let proj = ProjectDirs::from("dev", "showcase", "showcase")
        .context("unable to determine data directory for default sqlite path")?;
    let mut path: PathBuf = proj.data_dir().to_path_buf();
    std::fs::create_dir_all(&path).with_context(|| format!("creating data dir: {}", path.display()))?;
    path.push("showcase.db");
    Ok(sqlite_url_for(&path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{AuthState, StorageKey};
    use crate::types::{ContentDocument, SpotlightItem};
    use tempfile::tempdir;

    async fn open(dir: &tempfile::TempDir) -> Database {
        let url = sqlite_url_for(&dir.path().join("test.db"));
        let db = Database::connect(Some(&url)).await.unwrap();
        db.run_migrations().await.unwrap();
        db
    }

    #[tokio::test]
    async fn save_and_load_document() {
        let dir = tempdir().unwrap();
        let db = open(&dir).await;
        let key = StorageKey::for_identity(&AuthState::signed_in("0xabc"));

        let mut doc = ContentDocument::default();
        doc.profile.name = "Ada".into();
        doc.spotlight_items.push(SpotlightItem { title: "Loom".into(), ..Default::default() });
        db.save(&key, &doc).await.unwrap();

        assert_eq!(db.load(&key).await, Some(doc));
        assert_eq!(db.list_keys().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn last_write_wins() {
        let dir = tempdir().unwrap();
        let db = open(&dir).await;
        let key = StorageKey::anonymous();

        let mut doc = ContentDocument::default();
        doc.profile.bio = "first".into();
        db.save(&key, &doc).await.unwrap();
        doc.profile.bio = "second".into();
        db.save(&key, &doc).await.unwrap();

        assert_eq!(db.load(&key).await.unwrap().profile.bio, "second");
    }

    #[tokio::test]
    async fn missing_and_cleared_keys_load_as_none() {
        let dir = tempdir().unwrap();
        let db = open(&dir).await;
        let key = StorageKey::anonymous();
        assert!(db.load(&key).await.is_none());

        db.save(&key, &ContentDocument::default()).await.unwrap();
        db.clear(&key).await.unwrap();
        assert!(db.load(&key).await.is_none());
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let dir = tempdir().unwrap();
        let db = open(&dir).await;
        db.run_migrations().await.unwrap();
    }
}
