//! Embed URL classification and inline-storable image data.

use std::sync::OnceLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;

use crate::model::{Embed, Provider};

/// Known video-hosting URL shapes. The first capture group is the resource id.
fn embed_patterns() -> &'static [(Provider, Regex)] {
    static PATTERNS: OnceLock<Vec<(Provider, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (
                Provider::YouTube,
                r"^https?://(?:www\.|m\.)?youtube\.com/watch\?(?:[^#]*&)?v=([A-Za-z0-9_-]+)",
            ),
            (Provider::YouTube, r"^https?://youtu\.be/([A-Za-z0-9_-]+)"),
            (
                Provider::YouTube,
                r"^https?://(?:www\.)?youtube(?:-nocookie)?\.com/(?:embed|shorts)/([A-Za-z0-9_-]+)",
            ),
            (
                Provider::Vimeo,
                r"^https?://(?:www\.|player\.)?vimeo\.com/(?:video/)?(\d+)",
            ),
            (
                Provider::Loom,
                r"^https?://(?:www\.)?loom\.com/(?:share|embed)/([A-Za-z0-9]+)",
            ),
        ]
        .into_iter()
        .map(|(provider, pattern)| {
            (provider, Regex::new(pattern).expect("Invalid embed regex"))
        })
        .collect()
    })
}

/// Builds an embed for `url`: a provider player when the URL matches a known
/// video shape, otherwise a generic link card. Never fails.
pub fn classify_embed(url: &str) -> Embed {
    let url = url.trim();
    for (provider, pattern) in embed_patterns() {
        if let Some(id) = pattern.captures(url).and_then(|caps| caps.get(1)) {
            return Embed::Video {
                provider: *provider,
                resource_id: id.as_str().to_string(),
            };
        }
    }
    Embed::Link {
        url: url.to_string(),
    }
}

/// A `data:` URI holding `bytes` base64-encoded.
pub fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Mime type guessed from a file name's extension.
pub fn guess_mime(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}
