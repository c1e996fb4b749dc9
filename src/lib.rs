pub mod autosave;
pub mod config;
pub mod crop;
pub mod dao;
pub mod db;
pub mod embed;
pub mod identity;
pub mod normalize;
pub mod placeholder;
pub mod platform;
pub mod reconcile;
pub mod session;
pub mod storage;
pub mod types;

// --- Library API for embedding ---

/// Convenience re-exports for embedders.
pub mod prelude {
    pub use crate::autosave::{AutosaveController, PendingPolicy, SaveStatus};
    pub use crate::config::{Environment, ShowcaseConfig};
    pub use crate::crop::{CropError, CropRect, ScaleFactors};
    pub use crate::identity::{AuthProvider, AuthState, StorageKey};
    pub use crate::normalize::{normalize, resolve, Resolved};
    pub use crate::platform::{classify, PlatformTag, ShopPlatform};
    pub use crate::reconcile::{CollectionKind, CollectionState, CollectionView};
    pub use crate::session::{EditorSession, ImageTarget, MediaEdit};
    pub use crate::storage::{ContentStore, MemoryStore};
    pub use crate::types::{ContentDocument, ItemId, MediaItem, Profile, Section, ShopItem, SocialLink, SpotlightItem, Sticker};
    pub use crate::Showcase;
}

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ShowcaseConfig;
use crate::db::Database;
use crate::identity::{AuthProvider, AuthState, StorageKey};
use crate::placeholder::{example_profile, Placeholders};
use crate::reconcile::{CollectionKind, Reconciler};
use crate::session::EditorSession;
use crate::storage::{ContentStore, MemoryStore};
use crate::types::ContentDocument;

/// Library entry point. Owns the content store and hands out editing sessions.
pub struct Showcase {
    store: Arc<dyn ContentStore>,
    db: Option<Database>,
    autosave_idle: Duration,
    crop_quality: u8,
}

impl Showcase {
    /// Open the configured SQLite database and (optionally) run migrations.
    pub async fn connect(config: &ShowcaseConfig, run_migrations: bool) -> Result<Self> {
        let db = Database::connect(config.database_url.as_deref()).await?;
        if run_migrations { db.run_migrations().await?; }
        Ok(Self { store: Arc::new(db.clone()), db: Some(db), autosave_idle: config.autosave_idle(), crop_quality: config.crop_quality })
    }

    /// Use an arbitrary store, e.g. [`MemoryStore`] when nothing should touch disk.
    pub fn with_store(store: Arc<dyn ContentStore>, config: &ShowcaseConfig) -> Self {
        Self { store, db: None, autosave_idle: config.autosave_idle(), crop_quality: config.crop_quality }
    }

    pub fn in_memory(config: &ShowcaseConfig) -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), config)
    }

    pub fn database(&self) -> Option<&Database> { self.db.as_ref() }
    pub fn store(&self) -> Arc<dyn ContentStore> { self.store.clone() }

    pub async fn open_session(&self, auth: &AuthState) -> EditorSession {
        EditorSession::open(self.store.clone(), StorageKey::for_identity(auth), self.autosave_idle)
            .await
            .with_crop_quality(self.crop_quality)
    }

    pub async fn open_session_for(&self, provider: &dyn AuthProvider) -> EditorSession {
        self.open_session(&AuthState::from_provider(provider)).await
    }

    /// Stored document for an identity, `None` if there is none (or it is unreadable).
    pub async fn load_document(&self, auth: &AuthState) -> Option<ContentDocument> {
        self.store.load(&StorageKey::for_identity(auth)).await
    }

    /// What a visitor would see: the stored document with example entries
    /// standing in for empty collections, or the example profile when nothing
    /// is stored.
    pub async fn resolved_document(&self, auth: &AuthState) -> ContentDocument {
        let doc = self.load_document(auth).await.unwrap_or_else(|| ContentDocument { profile: example_profile(), ..Default::default() });
        let examples = Placeholders::default();
        ContentDocument {
            spotlight_items: visible(CollectionKind::Spotlight, &doc.spotlight_items, &examples.spotlight),
            media_items: visible(CollectionKind::Media, &doc.media_items, &examples.media),
            shop_items: visible(CollectionKind::Shop, &doc.shop_items, &examples.shop),
            ..doc
        }
    }

    pub async fn clear(&self, auth: &AuthState) -> Result<()> {
        self.store.clear(&StorageKey::for_identity(auth)).await
    }
}

fn visible<T: Clone>(kind: CollectionKind, items: &[T], examples: &[T]) -> Vec<T> {
    Reconciler::on_load(kind, Some(items)).view(items, examples).entries().to_vec()
}
