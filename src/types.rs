use serde::{Deserialize, Serialize};

use crate::normalize::{normalize, resolve, Resolved};
use crate::platform::{PlatformTag, ShopPlatform};

/// Identifier of a spotlight or shop entry. Older documents carry numeric
/// ids, new entries get a random string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(i64),
    Text(String),
}

impl ItemId {
    pub fn generate() -> Self { ItemId::Text(uuid::Uuid::new_v4().to_string()) }
}

impl Default for ItemId {
    fn default() -> Self { ItemId::generate() }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemId::Number(n) => write!(f, "{n}"),
            ItemId::Text(s) => f.write_str(s),
        }
    }
}

/// An embedded track, playlist or video. `id` and `kind` only change
/// together, through the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaItem {
    id: String,
    #[serde(rename = "type")]
    kind: PlatformTag,
    raw_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl MediaItem {
    pub fn from_resolved(resolved: Resolved) -> Self {
        MediaItem { id: resolved.id, kind: resolved.tag, raw_url: resolved.raw_url, title: None }
    }

    /// Build an item from a known platform and input; used for built-in content.
    pub(crate) fn with_tag(tag: PlatformTag, raw: &str, title: &str) -> Self {
        MediaItem { id: normalize(raw, tag), kind: tag, raw_url: raw.to_string(), title: Some(title.to_string()) }
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn kind(&self) -> PlatformTag { self.kind }
    pub fn raw_url(&self) -> &str { &self.raw_url }

    /// Re-resolve from pasted text. Returns the new tag, or `None` (item
    /// untouched) when the input is not a recognized platform.
    pub fn apply_input(&mut self, raw: &str) -> Option<PlatformTag> {
        let resolved = resolve(raw)?;
        let tag = resolved.tag;
        self.id = resolved.id;
        self.kind = resolved.tag;
        self.raw_url = resolved.raw_url;
        Some(tag)
    }

    /// The URL an iframe renderer loads for this item.
    pub fn embed_src(&self) -> Option<String> {
        if self.id.is_empty() { return None; }
        match self.kind {
            PlatformTag::Unknown => None,
            PlatformTag::Youtube => Some(format!("https://www.youtube.com/embed/{}", self.id)),
            _ => Some(self.id.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpotlightItem {
    pub id: ItemId,
    pub title: String,
    pub description: String,
    pub image: String,
    pub link: String,
}

impl Default for SpotlightItem {
    fn default() -> Self {
        SpotlightItem { id: ItemId::generate(), title: String::new(), description: String::new(), image: String::new(), link: String::new() }
    }
}

/// A storefront link. `platform` follows `store_url` and cannot be set on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ShopItemRecord")]
pub struct ShopItem {
    pub id: ItemId,
    pub title: String,
    store_url: String,
    pub image: String,
    platform: ShopPlatform,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ShopItem {
    pub fn new(title: impl Into<String>, store_url: impl Into<String>, image: impl Into<String>) -> Self {
        let store_url = store_url.into();
        ShopItem {
            id: ItemId::generate(),
            title: title.into(),
            platform: ShopPlatform::from_store_url(&store_url),
            store_url,
            image: image.into(),
            description: None,
        }
    }

    pub fn store_url(&self) -> &str { &self.store_url }
    pub fn platform(&self) -> ShopPlatform { self.platform }

    pub fn set_store_url(&mut self, store_url: impl Into<String>) {
        self.store_url = store_url.into();
        self.platform = ShopPlatform::from_store_url(&self.store_url);
    }
}

impl Default for ShopItem {
    fn default() -> Self { ShopItem::new("", "", "") }
}

/// On-disk shape of a shop item; the stored platform is ignored and re-derived.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct ShopItemRecord {
    id: Option<ItemId>,
    title: String,
    store_url: String,
    image: String,
    description: Option<String>,
}

impl From<ShopItemRecord> for ShopItem {
    fn from(r: ShopItemRecord) -> Self {
        let mut item = ShopItem::new(r.title, r.store_url, r.image);
        if let Some(id) = r.id { item.id = id; }
        item.description = r.description;
        item
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SocialLink {
    pub platform: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionVisibility {
    pub projects: bool,
    pub media: bool,
    pub shop: bool,
}

impl Default for SectionVisibility {
    fn default() -> Self { SectionVisibility { projects: true, media: true, shop: true } }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Projects,
    Media,
    Shop,
}

impl SectionVisibility {
    pub fn set(&mut self, section: Section, visible: bool) {
        match section {
            Section::Projects => self.projects = visible,
            Section::Media => self.media = visible,
            Section::Shop => self.shop = visible,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub name: String,
    pub title: String,
    pub bio: String,
    pub image: String,
    pub social_links: Vec<SocialLink>,
    pub section_visibility: SectionVisibility,
    pub spotlight_description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Sticker {
    pub enabled: bool,
    pub image: String,
}

/// Everything a user edits, persisted as one unit. Every field defaults on
/// read so documents written by older layouts still load.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentDocument {
    pub profile: Profile,
    pub media_items: Vec<MediaItem>,
    pub spotlight_items: Vec<SpotlightItem>,
    pub shop_items: Vec<ShopItem>,
    pub sticker: Sticker,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_gets_defaults() {
        let doc: ContentDocument = serde_json::from_str(r#"{"profile":{"name":"Ada"}}"#).unwrap();
        assert_eq!(doc.profile.name, "Ada");
        assert!(doc.profile.section_visibility.projects && doc.profile.section_visibility.shop);
        assert!(doc.media_items.is_empty() && doc.spotlight_items.is_empty() && doc.shop_items.is_empty());
        assert!(!doc.sticker.enabled);
    }

    #[test]
    fn writes_full_camel_case_shape() {
        let value = serde_json::to_value(ContentDocument::default()).unwrap();
        for field in ["profile", "mediaItems", "spotlightItems", "shopItems", "sticker"] {
            assert!(value.get(field).is_some(), "missing {field}");
        }
        assert!(value["profile"].get("sectionVisibility").is_some());
        assert!(value["profile"].get("spotlightDescription").is_some());
    }

    #[test]
    fn shop_platform_is_rederived_on_read() {
        let json = r#"{"id": 7, "title": "Prints", "storeUrl": "https://www.etsy.com/shop/x", "image": "", "platform": "gumroad"}"#;
        let item: ShopItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, ItemId::Number(7));
        assert_eq!(item.platform(), ShopPlatform::Etsy);
    }

    #[test]
    fn shop_platform_follows_store_url() {
        let mut item = ShopItem::new("Zine", "https://someone.gumroad.com/l/zine", "");
        assert_eq!(item.platform(), ShopPlatform::Gumroad);
        item.set_store_url("https://example.org");
        assert_eq!(item.platform(), ShopPlatform::Other);
    }

    #[test]
    fn media_item_unknown_input_leaves_item_alone() {
        let mut item = MediaItem::with_tag(PlatformTag::Youtube, "https://youtu.be/dQw4w9WgXcQ", "Video");
        let before = item.clone();
        assert_eq!(item.apply_input("garbage not a url"), None);
        assert_eq!(item, before);
    }

    #[test]
    fn media_item_serializes_type_and_raw_url() {
        let item = MediaItem::with_tag(PlatformTag::Youtube, "https://youtu.be/dQw4w9WgXcQ", "Video");
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["type"], "youtube");
        assert_eq!(value["id"], "dQw4w9WgXcQ");
        assert_eq!(value["rawUrl"], "https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(item.embed_src().as_deref(), Some("https://www.youtube.com/embed/dQw4w9WgXcQ"));
    }

    #[test]
    fn item_ids_accept_numbers_and_strings() {
        let items: Vec<SpotlightItem> = serde_json::from_str(r#"[{"id": 1712345678901}, {"id": "abc"}]"#).unwrap();
        assert_eq!(items[0].id, ItemId::Number(1712345678901));
        assert_eq!(items[1].id, ItemId::Text("abc".into()));
    }
}
