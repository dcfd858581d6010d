//! Site conventions: asset CDN signature, generic titles, download labels, pin paths.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Hostname of the asset CDN that serves pin content.
pub const CDN_DOMAIN: &str = "pinimg.com";

/// Localized verbs meaning "download", matched as whole words.
static DOWNLOAD_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:download|baixar|descargar|télécharger|herunterladen|scarica)\b").unwrap()
});

static GENERIC_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:(?:home|inicio|início|página inicial|accueil|startseite)\s*[-–—|:·]\s*)?pinterest(?:\s*[-–—|:·]?\s*(?:home|inicio|início|página inicial|accueil|startseite))?\s*$",
    )
    .unwrap()
});

/// Profile pictures, board covers and other non-pin chrome served from the CDN.
static PROFILE_OR_BOARD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)/(?:user|users|avatars?|boards?|custom_covers|\d+x\d+_RS)/").unwrap()
});

static PIN_PATH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/pin/(\d+)").unwrap());

static ASSET_HASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/([0-9a-fA-F]{8,})\.[A-Za-z0-9]{2,5}$").unwrap());

pub fn is_download_label(text: &str) -> bool {
    DOWNLOAD_LABEL.is_match(text)
}

/// True for the bare brand name, optionally combined with a localized "home" word.
pub fn is_generic_title(title: &str) -> bool {
    GENERIC_TITLE.is_match(title)
}

pub fn is_cdn_url(url: &Url) -> bool {
    match url.host_str() {
        Some(host) => {
            let host = host.to_ascii_lowercase();
            host == CDN_DOMAIN || host.ends_with(".pinimg.com")
        }
        None => false,
    }
}

pub fn is_profile_or_board_url(url: &Url) -> bool {
    PROFILE_OR_BOARD.is_match(url.path())
}

/// Numeric pin identifier from a `/pin/<digits>` path.
pub fn pin_id_from_path(path: &str) -> Option<&str> {
    PIN_PATH
        .captures(path)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Hex asset hash immediately preceding the file extension, e.g. `ef123456` in
/// `/originals/ab/cd/ef123456.jpg`.
pub fn asset_hash_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    ASSET_HASH
        .captures(parsed.path())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
}
