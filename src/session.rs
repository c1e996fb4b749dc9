//! An editing session over one identity's content document.
//!
//! The session holds the working copy, the per-collection placeholder state
//! and the autosave controller. Every mutation goes through here so that the
//! snapshot handed to autosave is taken at edit time.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;

use crate::autosave::{AutosaveController, PendingPolicy, SaveStatus};
use crate::crop::{crop_to_data_url, CropError, CropRect, ScaleFactors, DEFAULT_QUALITY};
use crate::identity::{AuthProvider, StorageKey};
use crate::placeholder::{example_profile, Placeholders};
use crate::platform::PlatformTag;
use crate::reconcile::{CollectionKind, CollectionState, CollectionView, Reconciler};
use crate::storage::ContentStore;
use crate::types::{ContentDocument, ItemId, MediaItem, Profile, Section, ShopItem, SocialLink, SpotlightItem, Sticker};

/// Result of pasting text into a media item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEdit {
    Resolved(PlatformTag),
    /// Not a recognized platform; the item was left as it was.
    Unrecognized,
    /// No editable item at that index.
    Missing,
}

/// Field that can hold an uploaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageTarget {
    Profile,
    Sticker,
    Spotlight(usize),
    Shop(usize),
}

pub struct EditorSession {
    key: StorageKey,
    doc: ContentDocument,
    spotlight: Reconciler,
    media: Reconciler,
    shop: Reconciler,
    examples: Placeholders,
    autosave: AutosaveController,
    crop_quality: u8,
}

impl EditorSession {
    /// Load the document for `key` (or start from the example profile) and
    /// decide each collection's initial state.
    pub async fn open(store: Arc<dyn ContentStore>, key: StorageKey, idle: Duration) -> Self {
        let loaded = store.load(&key).await;
        let spotlight = Reconciler::on_load(CollectionKind::Spotlight, loaded.as_ref().map(|d| d.spotlight_items.as_slice()));
        let media = Reconciler::on_load(CollectionKind::Media, loaded.as_ref().map(|d| d.media_items.as_slice()));
        let shop = Reconciler::on_load(CollectionKind::Shop, loaded.as_ref().map(|d| d.shop_items.as_slice()));
        let doc = loaded.unwrap_or_else(|| ContentDocument { profile: example_profile(), ..Default::default() });
        tracing::debug!(key = %key, spotlight = ?spotlight.state(), media = ?media.state(), shop = ?shop.state(), "editor session opened");

        let autosave = AutosaveController::spawn(store, key.clone(), idle);
        Self { key, doc, spotlight, media, shop, examples: Placeholders::default(), autosave, crop_quality: DEFAULT_QUALITY }
    }

    /// JPEG quality for [`EditorSession::set_cropped_image`], clamped to 1..=100.
    pub fn with_crop_quality(mut self, quality: u8) -> Self {
        self.crop_quality = quality.clamp(1, 100);
        self
    }

    pub fn key(&self) -> &StorageKey { &self.key }
    pub fn document(&self) -> &ContentDocument { &self.doc }
    pub fn save_status(&self) -> watch::Receiver<SaveStatus> { self.autosave.status() }

    pub fn state(&self, kind: CollectionKind) -> CollectionState {
        match kind {
            CollectionKind::Spotlight => self.spotlight.state(),
            CollectionKind::Media => self.media.state(),
            CollectionKind::Shop => self.shop.state(),
        }
    }

    pub fn spotlight_view(&self) -> CollectionView<'_, SpotlightItem> { self.spotlight.view(&self.doc.spotlight_items, &self.examples.spotlight) }
    pub fn media_view(&self) -> CollectionView<'_, MediaItem> { self.media.view(&self.doc.media_items, &self.examples.media) }
    pub fn shop_view(&self) -> CollectionView<'_, ShopItem> { self.shop.view(&self.doc.shop_items, &self.examples.shop) }

    fn touch(&self) { self.autosave.schedule(&self.doc); }

    // --- profile & sticker ---

    pub fn update_profile(&mut self, edit: impl FnOnce(&mut Profile)) {
        edit(&mut self.doc.profile);
        self.touch();
    }

    pub fn set_section_visible(&mut self, section: Section, visible: bool) {
        self.update_profile(|p| p.section_visibility.set(section, visible));
    }

    pub fn add_social_link(&mut self, platform: impl Into<String>, url: impl Into<String>) -> usize {
        self.doc.profile.social_links.push(SocialLink { platform: platform.into(), url: url.into() });
        self.touch();
        self.doc.profile.social_links.len() - 1
    }

    pub fn update_social_link(&mut self, index: usize, edit: impl FnOnce(&mut SocialLink)) -> bool {
        let Some(link) = self.doc.profile.social_links.get_mut(index) else { return false };
        edit(link);
        self.touch();
        true
    }

    pub fn remove_social_link(&mut self, index: usize) -> bool {
        if index >= self.doc.profile.social_links.len() { return false; }
        self.doc.profile.social_links.remove(index);
        self.touch();
        true
    }

    pub fn update_sticker(&mut self, edit: impl FnOnce(&mut Sticker)) {
        edit(&mut self.doc.sticker);
        self.touch();
    }

    // --- spotlight ---

    pub fn add_spotlight_item(&mut self, item: SpotlightItem) -> ItemId {
        let id = item.id.clone();
        self.spotlight.add(&mut self.doc.spotlight_items, item);
        self.touch();
        id
    }

    pub fn update_spotlight_item(&mut self, index: usize, edit: impl FnOnce(&mut SpotlightItem)) -> bool {
        let Some(item) = self.spotlight.entry_mut(&mut self.doc.spotlight_items, index) else { return false };
        edit(item);
        self.touch();
        true
    }

    pub fn remove_spotlight_item(&mut self, index: usize) -> bool {
        let removed = self.spotlight.remove(&mut self.doc.spotlight_items, index).is_some();
        if removed { self.touch(); }
        removed
    }

    // --- shop ---

    pub fn add_shop_item(&mut self, item: ShopItem) -> ItemId {
        let id = item.id.clone();
        self.shop.add(&mut self.doc.shop_items, item);
        self.touch();
        id
    }

    /// Edit a shop item; a changed store URL re-derives the platform through
    /// [`ShopItem::set_store_url`].
    pub fn update_shop_item(&mut self, index: usize, edit: impl FnOnce(&mut ShopItem)) -> bool {
        let Some(item) = self.shop.entry_mut(&mut self.doc.shop_items, index) else { return false };
        edit(item);
        self.touch();
        true
    }

    pub fn remove_shop_item(&mut self, index: usize) -> bool {
        let removed = self.shop.remove(&mut self.doc.shop_items, index).is_some();
        if removed { self.touch(); }
        removed
    }

    // --- media ---

    /// Add an empty media slot for the user to paste into.
    pub fn add_media_item(&mut self) -> usize {
        let index = self.media.add(&mut self.doc.media_items, MediaItem::default());
        self.touch();
        index
    }

    /// Classify and normalize pasted text into the item at `index`. On an
    /// unrecognized paste nothing changes and nothing is scheduled.
    pub fn set_media_input(&mut self, index: usize, raw: &str) -> MediaEdit {
        let Some(item) = self.media.entry_mut(&mut self.doc.media_items, index) else { return MediaEdit::Missing };
        match item.apply_input(raw) {
            Some(tag) => {
                self.touch();
                MediaEdit::Resolved(tag)
            }
            None => MediaEdit::Unrecognized,
        }
    }

    pub fn set_media_title(&mut self, index: usize, title: Option<String>) -> bool {
        let Some(item) = self.media.entry_mut(&mut self.doc.media_items, index) else { return false };
        item.title = title;
        self.touch();
        true
    }

    pub fn remove_media_item(&mut self, index: usize) -> bool {
        let removed = self.media.remove(&mut self.doc.media_items, index).is_some();
        if removed { self.touch(); }
        removed
    }

    // --- images ---

    /// Store an already-encoded data URL into one image field only.
    pub fn set_image(&mut self, target: ImageTarget, data_url: String) -> bool {
        let slot = match target {
            ImageTarget::Profile => Some(&mut self.doc.profile.image),
            ImageTarget::Sticker => Some(&mut self.doc.sticker.image),
            ImageTarget::Spotlight(i) => self.spotlight.entry_mut(&mut self.doc.spotlight_items, i).map(|s| &mut s.image),
            ImageTarget::Shop(i) => self.shop.entry_mut(&mut self.doc.shop_items, i).map(|s| &mut s.image),
        };
        let Some(slot) = slot else { return false };
        *slot = data_url;
        self.touch();
        true
    }

    /// Crop `source` and store the result. On failure the previous image is kept.
    pub fn set_cropped_image(&mut self, target: ImageTarget, source: &[u8], rect: CropRect, scale: ScaleFactors) -> Result<bool, CropError> {
        let url = crop_to_data_url(source, rect, scale, self.crop_quality)?;
        Ok(self.set_image(target, url))
    }

    // --- persistence ---

    /// Explicit save: write the current document now.
    pub async fn save(&self) -> Result<()> {
        self.autosave.schedule(&self.doc);
        self.autosave.flush().await.map(|_| ())
    }

    /// Drop pending unsaved edits from the write queue (the working copy is kept).
    pub fn discard_pending(&self) { self.autosave.cancel(); }

    /// End the session, writing anything still pending.
    pub async fn close(self) -> Result<()> {
        tracing::debug!(key = %self.key, "closing editor session");
        self.autosave.shutdown(PendingPolicy::Flush).await
    }

    /// Flush, then sign out through the provider.
    pub async fn disconnect(self, provider: &dyn AuthProvider) -> Result<()> {
        let flushed = self.close().await;
        provider.disconnect_wallet().await?;
        flushed
    }
}
