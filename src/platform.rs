use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::embed::clean_input;

/// Source service of an embedded media item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlatformTag {
    Youtube,
    Soundcloud,
    SoundcloudPlaylist,
    Spotify,
    SpotifyPlaylist,
    AppleMusicAlbum,
    AppleMusicPlaylist,
    AppleMusicStation,
    Mixcloud,
    InstagramReel,
    Tiktok,
    #[default]
    #[serde(other)]
    Unknown,
}

impl PlatformTag {
    pub const ALL: [PlatformTag; 12] = [
        PlatformTag::Youtube,
        PlatformTag::Soundcloud,
        PlatformTag::SoundcloudPlaylist,
        PlatformTag::Spotify,
        PlatformTag::SpotifyPlaylist,
        PlatformTag::AppleMusicAlbum,
        PlatformTag::AppleMusicPlaylist,
        PlatformTag::AppleMusicStation,
        PlatformTag::Mixcloud,
        PlatformTag::InstagramReel,
        PlatformTag::Tiktok,
        PlatformTag::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformTag::Youtube => "youtube",
            PlatformTag::Soundcloud => "soundcloud",
            PlatformTag::SoundcloudPlaylist => "soundcloud-playlist",
            PlatformTag::Spotify => "spotify",
            PlatformTag::SpotifyPlaylist => "spotify-playlist",
            PlatformTag::AppleMusicAlbum => "apple-music-album",
            PlatformTag::AppleMusicPlaylist => "apple-music-playlist",
            PlatformTag::AppleMusicStation => "apple-music-station",
            PlatformTag::Mixcloud => "mixcloud",
            PlatformTag::InstagramReel => "instagram-reel",
            PlatformTag::Tiktok => "tiktok",
            PlatformTag::Unknown => "unknown",
        }
    }

    pub fn is_known(&self) -> bool { !matches!(self, PlatformTag::Unknown) }

    /// Apple Music path segment (`album`, `playlist`, `station`) for the Apple tags.
    pub(crate) fn apple_kind(&self) -> Option<&'static str> {
        match self {
            PlatformTag::AppleMusicAlbum => Some("album"),
            PlatformTag::AppleMusicPlaylist => Some("playlist"),
            PlatformTag::AppleMusicStation => Some("station"),
            _ => None,
        }
    }
}

impl fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for PlatformTag {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        PlatformTag::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| anyhow!("unknown platform tag `{}`", s))
    }
}

/// Storefront a shop item links to. Always derived from the store URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShopPlatform {
    Shopify,
    Etsy,
    Gumroad,
    Bigcartel,
    #[default]
    #[serde(other)]
    Other,
}

impl ShopPlatform {
    pub fn from_store_url(store_url: &str) -> ShopPlatform {
        match_table(&match_subject(store_url.trim()), SHOP_RULES).unwrap_or(ShopPlatform::Other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShopPlatform::Shopify => "shopify",
            ShopPlatform::Etsy => "etsy",
            ShopPlatform::Gumroad => "gumroad",
            ShopPlatform::Bigcartel => "bigcartel",
            ShopPlatform::Other => "other",
        }
    }
}

/// One row of a domain table: `tag` matches when any of `hosts` occurs in
/// the input and, if `paths` is non-empty, any of `paths` occurs as well.
#[derive(Debug, Clone, Copy)]
pub struct Rule<T: 'static> {
    pub tag: T,
    pub hosts: &'static [&'static str],
    pub paths: &'static [&'static str],
}

/// First matching rule wins, so more specific rows go first.
/// `input` is expected to be lowercased already.
pub fn match_table<T: Copy + 'static>(input: &str, table: &[Rule<T>]) -> Option<T> {
    table
        .iter()
        .find(|rule| {
            rule.hosts.iter().any(|h| input.contains(h))
                && (rule.paths.is_empty() || rule.paths.iter().any(|p| input.contains(p)))
        })
        .map(|rule| rule.tag)
}

pub const MEDIA_RULES: &[Rule<PlatformTag>] = &[
    Rule { tag: PlatformTag::SoundcloudPlaylist, hosts: &["soundcloud.com"], paths: &["/sets/", "%2fsets%2f", "/playlists/", "%2fplaylists%2f"] },
    Rule { tag: PlatformTag::Soundcloud, hosts: &["soundcloud.com"], paths: &[] },
    Rule { tag: PlatformTag::SpotifyPlaylist, hosts: &["open.spotify.com", "spotify:"], paths: &["/playlist/", ":playlist:"] },
    Rule { tag: PlatformTag::Spotify, hosts: &["open.spotify.com", "spotify:"], paths: &["/track/", ":track:"] },
    Rule { tag: PlatformTag::AppleMusicAlbum, hosts: &["music.apple.com"], paths: &["/album/"] },
    Rule { tag: PlatformTag::AppleMusicPlaylist, hosts: &["music.apple.com"], paths: &["/playlist/"] },
    Rule { tag: PlatformTag::AppleMusicStation, hosts: &["music.apple.com"], paths: &["/station/"] },
    Rule { tag: PlatformTag::Youtube, hosts: &["youtube.com", "youtu.be", "youtube-nocookie.com"], paths: &[] },
    Rule { tag: PlatformTag::Mixcloud, hosts: &["mixcloud.com"], paths: &[] },
    Rule { tag: PlatformTag::InstagramReel, hosts: &["instagram.com"], paths: &["/reel/", "/reels/"] },
    Rule { tag: PlatformTag::Tiktok, hosts: &["tiktok.com"], paths: &[] },
];

pub const SHOP_RULES: &[Rule<ShopPlatform>] = &[
    Rule { tag: ShopPlatform::Shopify, hosts: &["myshopify.com", "shopify.com", "shop.app"], paths: &[] },
    Rule { tag: ShopPlatform::Etsy, hosts: &["etsy.com", "etsy.me"], paths: &[] },
    Rule { tag: ShopPlatform::Gumroad, hosts: &["gumroad.com", "gum.co"], paths: &[] },
    Rule { tag: ShopPlatform::Bigcartel, hosts: &["bigcartel.com"], paths: &[] },
];

/// Player widgets carry the real target in their query string.
const WIDGET_HOSTS: &[&str] = &["w.soundcloud.com"];

/// Lowercased text the rule tables run against. For a URL with a host this is
/// host plus path, so a query like `?in=artist/sets/x` cannot change the
/// platform; widget hosts keep their query. Anything else (`spotify:` URIs,
/// scheme-less paste) is matched whole.
pub fn match_subject(cleaned: &str) -> String {
    let subject = match Url::parse(cleaned) {
        Ok(url) => match url.host_str() {
            Some(host) if WIDGET_HOSTS.iter().any(|w| host.eq_ignore_ascii_case(w)) => {
                format!("{host}{}?{}", url.path(), url.query().unwrap_or(""))
            }
            Some(host) => format!("{host}{}", url.path()),
            None => cleaned.to_string(),
        },
        Err(_) => cleaned.to_string(),
    };
    subject.to_ascii_lowercase()
}

/// Classify pasted media text. Total and deterministic: anything that does
/// not match a known platform is `Unknown`.
pub fn classify(input: &str) -> PlatformTag {
    let cleaned = clean_input(input);
    if cleaned.is_empty() { return PlatformTag::Unknown; }
    match_table(&match_subject(&cleaned), MEDIA_RULES).unwrap_or(PlatformTag::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn youtube_forms() {
        for input in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://m.youtube.com/v/dQw4w9WgXcQ",
            "<iframe src=\"https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ\"></iframe>",
        ] {
            assert_eq!(classify(input), PlatformTag::Youtube, "{input}");
        }
    }

    #[test]
    fn soundcloud_track_vs_playlist() {
        assert_eq!(classify("https://soundcloud.com/artist/some-track"), PlatformTag::Soundcloud);
        assert_eq!(classify("https://soundcloud.com/artist/sets/some-set"), PlatformTag::SoundcloudPlaylist);
        let widget = r#"<iframe src="https://w.soundcloud.com/player/?url=https%3A//api.soundcloud.com/playlists/42"></iframe>"#;
        assert_eq!(classify(widget), PlatformTag::SoundcloudPlaylist);
        let encoded = "https://w.soundcloud.com/player/?url=https%3A%2F%2Fsoundcloud.com%2Fartist%2Fsets%2Fthe-set";
        assert_eq!(classify(encoded), PlatformTag::SoundcloudPlaylist);
    }

    #[test]
    fn track_played_from_a_set_is_a_track() {
        let input = "https://soundcloud.com/artist/track-name?in=artist/sets/the-set";
        assert_eq!(classify(input), PlatformTag::Soundcloud);
        assert_eq!(
            crate::normalize::normalize(input, classify(input)),
            "https://w.soundcloud.com/player/?url=https%3A%2F%2Fsoundcloud.com%2Fartist%2Ftrack-name"
        );
    }

    #[test]
    fn query_strings_do_not_pick_the_platform() {
        assert_eq!(classify("https://www.youtube.com/watch?v=dQw4w9WgXcQ&ref=soundcloud.com/a/sets/b"), PlatformTag::Youtube);
        assert_eq!(classify("https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC?context=/playlist/37i9dQZF1DXcBWIGoYBM5M"), PlatformTag::Spotify);
        assert_eq!(classify("https://music.apple.com/us/album/name/123?from=/playlist/x"), PlatformTag::AppleMusicAlbum);
        assert_eq!(classify("https://example.com/blog?embed=youtube.com/watch"), PlatformTag::Unknown);
        assert_eq!(ShopPlatform::from_store_url("https://example.com/store?ref=etsy.com"), ShopPlatform::Other);
    }

    #[test]
    fn iframe_without_src_is_unknown() {
        assert_eq!(classify(r#"<iframe title="youtube.com clip"></iframe>"#), PlatformTag::Unknown);
    }

    #[test]
    fn spotify_track_vs_playlist() {
        assert_eq!(classify("https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC"), PlatformTag::Spotify);
        assert_eq!(classify("https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M"), PlatformTag::SpotifyPlaylist);
        assert_eq!(classify("spotify:track:4uLU6hMCjMI75M1A2tKUQC"), PlatformTag::Spotify);
        assert_eq!(classify("https://open.spotify.com/album/1DFixLWuPkv3KT3TnV35m3"), PlatformTag::Unknown);
    }

    #[test]
    fn apple_music_kinds() {
        assert_eq!(classify("https://music.apple.com/us/album/name/1234567890"), PlatformTag::AppleMusicAlbum);
        assert_eq!(classify("https://music.apple.com/us/playlist/chill/pl.u-abc"), PlatformTag::AppleMusicPlaylist);
        assert_eq!(classify("hhttps://music.apple.com/us/station/radio/ra.978194965"), PlatformTag::AppleMusicStation);
    }

    #[test]
    fn other_platforms() {
        assert_eq!(classify("https://www.mixcloud.com/dj/mix-name/"), PlatformTag::Mixcloud);
        assert_eq!(classify("https://www.instagram.com/reel/Cabc123/"), PlatformTag::InstagramReel);
        assert_eq!(classify("https://www.instagram.com/p/Cabc123/"), PlatformTag::Unknown);
        assert_eq!(classify("https://www.tiktok.com/@user/video/7212345678901234567"), PlatformTag::Tiktok);
    }

    #[test]
    fn garbage_is_unknown() {
        assert_eq!(classify("garbage not a url"), PlatformTag::Unknown);
        assert_eq!(classify(""), PlatformTag::Unknown);
        assert_eq!(classify("   "), PlatformTag::Unknown);
    }

    #[test]
    fn shop_platform_from_url() {
        assert_eq!(ShopPlatform::from_store_url("https://my-store.myshopify.com/products/x"), ShopPlatform::Shopify);
        assert_eq!(ShopPlatform::from_store_url("https://www.etsy.com/shop/Maker"), ShopPlatform::Etsy);
        assert_eq!(ShopPlatform::from_store_url("https://someone.gumroad.com/l/zine"), ShopPlatform::Gumroad);
        assert_eq!(ShopPlatform::from_store_url("https://band.bigcartel.com"), ShopPlatform::Bigcartel);
        assert_eq!(ShopPlatform::from_store_url("https://example.com/store"), ShopPlatform::Other);
        assert_eq!(ShopPlatform::from_store_url(""), ShopPlatform::Other);
    }

    #[test]
    fn tag_names_round_trip_through_from_str() {
        for tag in PlatformTag::ALL {
            assert_eq!(tag.as_str().parse::<PlatformTag>().unwrap(), tag);
        }
        assert!("vimeo".parse::<PlatformTag>().is_err());
        assert_eq!(serde_json::to_string(&PlatformTag::SoundcloudPlaylist).unwrap(), "\"soundcloud-playlist\"");
        assert_eq!(serde_json::from_str::<PlatformTag>("\"vimeo\"").unwrap(), PlatformTag::Unknown);
    }
}
