//! Cleanup of user-pasted media input before classification and normalization.
//!
//! Pasted text is often an `<iframe>` snippet copied from a platform's share
//! dialog, or a URL with junk in front of it (`hhttps://...`, `@https://...`).
//! Everything downstream works on the cleaned form.

use once_cell::sync::Lazy;
use regex::Regex;

// `\s` before `src` keeps `data-src=` and friends from matching.
static IFRAME_SRC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<iframe\b[^>]*?\ssrc\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#).expect("iframe src regex")
});
static IFRAME_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<iframe\b").expect("iframe tag regex"));
static SCHEME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)https?://").expect("scheme regex"));

/// Pull the `src` attribute out of an iframe snippet. Returns `None` if the
/// input has no iframe tag or the tag has no usable `src`.
pub fn iframe_src(input: &str) -> Option<String> {
    let caps = IFRAME_SRC_RE.captures(input)?;
    let raw = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3))?.as_str();
    let src = raw.trim().replace("&amp;", "&");
    if src.is_empty() { None } else { Some(src) }
}

/// True if the input looks like an iframe snippet rather than a URL.
pub fn is_iframe(input: &str) -> bool {
    IFRAME_TAG_RE.is_match(input)
}

/// Strip paste artifacts in front of a URL: duplicated scheme letters,
/// a leading `@`, surrounding whitespace. Input without a scheme is only
/// trimmed and de-`@`ed.
pub fn strip_stray_prefix(input: &str) -> &str {
    let trimmed = input.trim();
    match SCHEME_RE.find(trimmed) {
        Some(m) => &trimmed[m.start()..],
        None => trimmed.trim_start_matches('@').trim_start(),
    }
}

/// The text the classifier and normalizers actually look at: the iframe
/// `src` when there is one, otherwise the input minus stray prefix junk.
/// An iframe without a usable `src` cleans to the empty string.
pub fn clean_input(input: &str) -> String {
    match iframe_src(input) {
        Some(src) => strip_stray_prefix(&src).to_string(),
        None if is_iframe(input) => String::new(),
        None => strip_stray_prefix(input).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_double_quoted_src() {
        let snippet = r#"<iframe width="100%" height="166" scrolling="no" frameborder="no" src="https://w.soundcloud.com/player/?url=https%3A//api.soundcloud.com/tracks/123&amp;color=%23ff5500"></iframe>"#;
        assert_eq!(
            iframe_src(snippet).as_deref(),
            Some("https://w.soundcloud.com/player/?url=https%3A//api.soundcloud.com/tracks/123&color=%23ff5500")
        );
    }

    #[test]
    fn extracts_single_quoted_and_unquoted_src() {
        assert_eq!(iframe_src("<IFRAME SRC='https://a.example/x'></IFRAME>").as_deref(), Some("https://a.example/x"));
        assert_eq!(iframe_src("<iframe src=https://a.example/y width=10>").as_deref(), Some("https://a.example/y"));
    }

    #[test]
    fn ignores_data_src_attribute() {
        let snippet = r#"<iframe data-src="https://wrong.example" src="https://right.example"></iframe>"#;
        assert_eq!(iframe_src(snippet).as_deref(), Some("https://right.example"));
    }

    #[test]
    fn iframe_without_src_is_none() {
        assert_eq!(iframe_src("<iframe width=\"1\"></iframe>"), None);
        assert_eq!(iframe_src("<iframe src=\"\"></iframe>"), None);
        assert_eq!(iframe_src("https://youtu.be/dQw4w9WgXcQ"), None);
    }

    #[test]
    fn strips_paste_artifacts() {
        assert_eq!(strip_stray_prefix("hhttps://music.apple.com/us"), "https://music.apple.com/us");
        assert_eq!(strip_stray_prefix("@https://music.apple.com/us"), "https://music.apple.com/us");
        assert_eq!(strip_stray_prefix("  @spotify:track:abc "), "spotify:track:abc");
        assert_eq!(strip_stray_prefix("garbage not a url"), "garbage not a url");
    }

    #[test]
    fn unterminated_quote_does_not_panic() {
        assert_eq!(iframe_src("<iframe src=\"https://a.example"), None);
        assert_eq!(clean_input("<iframe src=\"é"), "");
    }

    #[test]
    fn iframe_without_src_cleans_to_nothing() {
        assert_eq!(clean_input(r#"<iframe title="youtube.com clip"></iframe>"#), "");
        assert_eq!(clean_input("<iframe data-src=\"https://youtu.be/dQw4w9WgXcQ\">"), "");
    }

    #[test]
    fn src_spanning_lines_and_mixed_case() {
        let snippet = "<IFrame\n  width=\"560\"\n  Src = \"https://www.youtube.com/embed/dQw4w9WgXcQ\"\n></IFrame>";
        assert!(is_iframe(snippet));
        assert_eq!(iframe_src(snippet).as_deref(), Some("https://www.youtube.com/embed/dQw4w9WgXcQ"));
    }
}
