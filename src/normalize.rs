//! Rewrites pasted media input into the reference a renderer embeds directly.
//!
//! Stored conventions, one per platform:
//!
//! | tag                         | stored `id`                                              |
//! |-----------------------------|----------------------------------------------------------|
//! | youtube                     | bare 11-character video id                               |
//! | soundcloud(-playlist)       | `https://w.soundcloud.com/player/?url=...` widget URL     |
//! | spotify(-playlist)          | `https://open.spotify.com/embed/{track,playlist}/<id>`   |
//! | apple-music-*               | `https://embed.music.apple.com/<country>/<kind>/<id>`    |
//! | mixcloud                    | `https://www.mixcloud.com/widget/iframe/?feed=...`       |
//! | instagram-reel              | `https://www.instagram.com/reel/<code>/embed`            |
//! | tiktok                      | `https://www.tiktok.com/embed/v2/<id>`                   |
//!
//! Every function here is total: input that does not fit the platform's
//! pattern comes back unchanged.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::{form_urlencoded, Url};

use crate::embed::{clean_input, iframe_src, is_iframe};
use crate::platform::{classify, PlatformTag};

/// Outcome of resolving pasted text: what the media item should store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolved {
    pub tag: PlatformTag,
    pub id: String,
    pub raw_url: String,
}

/// Classify then normalize. `None` when the platform is not recognized, in
/// which case callers must leave the existing item alone.
pub fn resolve(raw: &str) -> Option<Resolved> {
    let tag = classify(raw);
    if !tag.is_known() {
        tracing::debug!(input = raw, "unrecognized media input");
        return None;
    }
    Some(Resolved { tag, id: normalize(raw, tag), raw_url: raw.to_string() })
}

pub fn normalize(raw: &str, tag: PlatformTag) -> String {
    let out = match tag {
        PlatformTag::Youtube => youtube(raw),
        PlatformTag::Soundcloud | PlatformTag::SoundcloudPlaylist => soundcloud(raw, tag),
        PlatformTag::Spotify | PlatformTag::SpotifyPlaylist => spotify(raw, tag),
        PlatformTag::AppleMusicAlbum | PlatformTag::AppleMusicPlaylist | PlatformTag::AppleMusicStation => apple_music(raw, tag),
        PlatformTag::Mixcloud => mixcloud(raw),
        PlatformTag::InstagramReel => instagram_reel(raw),
        PlatformTag::Tiktok => tiktok(raw),
        PlatformTag::Unknown => None,
    };
    match out {
        Some(reference) => reference,
        None => {
            if tag.is_known() {
                tracing::warn!(platform = %tag, input = raw, "normalization miss, keeping input as-is");
            }
            raw.to_string()
        }
    }
}

// Ids are captured only when followed by a non-id char, so 12+ char runs are rejected.
static YOUTUBE_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:watch\?(?:[^#]*?&)?v=|youtu\.be/|embed/|/v/|shorts/)([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)").expect("youtube regex")
});
static SPOTIFY_TRACK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(?:/track/|:track:)([A-Za-z0-9]+)").expect("spotify track regex"));
static SPOTIFY_PLAYLIST_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(?:/playlist/|:playlist:)([A-Za-z0-9]+)").expect("spotify playlist regex"));
// music.apple.com/<country>/<kind>/[<name>/]<id>
static APPLE_MUSIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)music\.apple\.com/([^/?#]+)/(album|playlist|station)/(?:([^/?#]+)/)?([^/?#]+)").expect("apple music regex")
});
static APPLE_TRACK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[?&#]i=(\d+)").expect("apple track regex"));
static INSTAGRAM_REEL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)/reels?/([A-Za-z0-9_-]+)").expect("instagram regex"));
static TIKTOK_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)/(?:video|embed/v2|embed)/(\d+)").expect("tiktok regex"));

/// First capture group of `re` in `s`.
fn capture<'a>(re: &Regex, s: &'a str) -> Option<&'a str> {
    re.captures(s).and_then(|c| c.get(1)).map(|m| m.as_str())
}

fn youtube(raw: &str) -> Option<String> {
    let cleaned = clean_input(raw);
    capture(&YOUTUBE_ID_RE, &cleaned).map(str::to_string)
}

fn soundcloud(raw: &str, tag: PlatformTag) -> Option<String> {
    if is_iframe(raw) {
        return iframe_src(raw);
    }
    let cleaned = clean_input(raw);
    if cleaned.to_ascii_lowercase().contains("w.soundcloud.com/player") {
        return Some(cleaned);
    }

    let url = Url::parse(&cleaned).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();
    if host != "soundcloud.com" && !host.ends_with(".soundcloud.com") { return None; }
    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    let is_set = segments.get(1).is_some_and(|s| s.eq_ignore_ascii_case("sets"));
    let shape_ok = match tag {
        PlatformTag::SoundcloudPlaylist => is_set && segments.len() >= 3,
        _ => !is_set && segments.len() >= 2,
    };
    if !shape_ok { return None; }

    let canonical = format!("https://soundcloud.com/{}", segments.join("/"));
    let encoded: String = form_urlencoded::byte_serialize(canonical.as_bytes()).collect();
    Some(format!("https://w.soundcloud.com/player/?url={encoded}"))
}

fn spotify(raw: &str, tag: PlatformTag) -> Option<String> {
    let cleaned = clean_input(raw);
    let (kind, re) = match tag {
        PlatformTag::SpotifyPlaylist => ("playlist", &*SPOTIFY_PLAYLIST_RE),
        _ => ("track", &*SPOTIFY_TRACK_RE),
    };
    let id = capture(re, &cleaned)?;
    Some(format!("https://open.spotify.com/embed/{kind}/{id}"))
}

fn apple_music(raw: &str, tag: PlatformTag) -> Option<String> {
    let kind = tag.apple_kind()?;
    let cleaned = clean_input(raw);
    let caps = APPLE_MUSIC_RE.captures(&cleaned)?;
    if !caps[2].eq_ignore_ascii_case(kind) { return None; }
    let country = &caps[1];
    // the optional name segment can swallow the id when there is no name
    let id = [caps.get(4), caps.get(3)]
        .into_iter()
        .flatten()
        .map(|m| m.as_str())
        .find(|segment| looks_like_apple_id(kind, segment))?;

    let mut out = format!("https://embed.music.apple.com/{country}/{kind}/{id}");
    // a song inside an album is addressed with ?i=<track id>
    let rest = &cleaned[caps.get(0).map_or(cleaned.len(), |m| m.end())..];
    if let Some(track) = capture(&APPLE_TRACK_RE, rest) {
        out.push_str("?i=");
        out.push_str(track);
    }
    Some(out)
}

fn looks_like_apple_id(kind: &str, segment: &str) -> bool {
    match kind {
        "album" => !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit()),
        "playlist" => segment.starts_with("pl."),
        "station" => segment.starts_with("ra."),
        _ => false,
    }
}

fn mixcloud(raw: &str) -> Option<String> {
    let cleaned = clean_input(raw);
    if cleaned.to_ascii_lowercase().contains("mixcloud.com/widget/iframe") {
        return Some(cleaned);
    }
    let url = Url::parse(&cleaned).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();
    if host != "mixcloud.com" && !host.ends_with(".mixcloud.com") { return None; }
    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    if segments.len() < 2 { return None; }

    let feed = format!("/{}/{}/", segments[0], segments[1]);
    let encoded: String = form_urlencoded::byte_serialize(feed.as_bytes()).collect();
    Some(format!("https://www.mixcloud.com/widget/iframe/?hide_cover=1&feed={encoded}"))
}

fn instagram_reel(raw: &str) -> Option<String> {
    let cleaned = clean_input(raw);
    let code = capture(&INSTAGRAM_REEL_RE, &cleaned)?;
    Some(format!("https://www.instagram.com/reel/{code}/embed"))
}

fn tiktok(raw: &str) -> Option<String> {
    let cleaned = clean_input(raw);
    let id = capture(&TIKTOK_ID_RE, &cleaned)?;
    Some(format!("https://www.tiktok.com/embed/v2/{id}"))
}
