//! Built-in example content shown until a user adds their own entries.

use crate::platform::PlatformTag;
use crate::types::{ItemId, MediaItem, Profile, SectionVisibility, ShopItem, SocialLink, SpotlightItem};

/// Starting profile for an identity with no stored document.
pub fn example_profile() -> Profile {
    Profile {
        name: "Your Name".to_string(),
        title: "Artist & Creator".to_string(),
        bio: "Tell visitors who you are and what you make. Click any field to edit it.".to_string(),
        image: String::new(),
        social_links: vec![
            SocialLink { platform: "instagram".to_string(), url: "https://instagram.com/".to_string() },
            SocialLink { platform: "x".to_string(), url: "https://x.com/".to_string() },
        ],
        section_visibility: SectionVisibility::default(),
        spotlight_description: "A few things I'm proud of.".to_string(),
    }
}

pub fn example_spotlight() -> Vec<SpotlightItem> {
    vec![
        SpotlightItem {
            id: ItemId::Number(1),
            title: "First Project".to_string(),
            description: "A short description of a project you want to highlight.".to_string(),
            image: String::new(),
            link: "https://example.com/project-one".to_string(),
        },
        SpotlightItem {
            id: ItemId::Number(2),
            title: "Second Project".to_string(),
            description: "Add an image, a title and a link for each spotlight entry.".to_string(),
            image: String::new(),
            link: "https://example.com/project-two".to_string(),
        },
        SpotlightItem {
            id: ItemId::Number(3),
            title: "Third Project".to_string(),
            description: "Example entries disappear as soon as you add your own.".to_string(),
            image: String::new(),
            link: "https://example.com/project-three".to_string(),
        },
    ]
}

pub fn example_media() -> Vec<MediaItem> {
    vec![
        MediaItem::with_tag(PlatformTag::Youtube, "https://www.youtube.com/watch?v=dQw4w9WgXcQ", "Example video"),
        MediaItem::with_tag(PlatformTag::Spotify, "https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC", "Example track"),
        MediaItem::with_tag(PlatformTag::SoundcloudPlaylist, "https://soundcloud.com/example/sets/example-set", "Example playlist"),
    ]
}

pub fn example_shop() -> Vec<ShopItem> {
    let mut items = vec![
        ShopItem::new("Limited Print", "https://example.myshopify.com/products/print", ""),
        ShopItem::new("Handmade Goods", "https://www.etsy.com/shop/example", ""),
        ShopItem::new("Digital Zine", "https://example.gumroad.com/l/zine", ""),
    ];
    for (n, item) in items.iter_mut().enumerate() {
        item.id = ItemId::Number(n as i64 + 1);
    }
    items
}

/// Example entries for all three collections, built once per session.
#[derive(Debug, Clone)]
pub struct Placeholders {
    pub spotlight: Vec<SpotlightItem>,
    pub media: Vec<MediaItem>,
    pub shop: Vec<ShopItem>,
}

impl Default for Placeholders {
    fn default() -> Self {
        Placeholders { spotlight: example_spotlight(), media: example_media(), shop: example_shop() }
    }
}
