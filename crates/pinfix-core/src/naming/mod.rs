//! Filename derivation for saved images.
//!
//! Turns resolved page metadata into a legal, descriptive destination such as
//! `Pinterest/Chocolate Cake Recipe.jpg`.

mod extension;
mod sanitize;

pub use extension::extension_from_url;
pub use sanitize::sanitize_base_name;

use crate::config::NamingConfig;
use crate::page::site::{asset_hash_from_url, is_generic_title};
use crate::protocol::ResolvedMetadataMessage;
use crate::saver::{CollisionPolicy, SaveRequest};

/// One pending save: where the bytes come from and the names to try, best first.
/// The last candidate is always the configured fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadIntent {
    pub source_url: String,
    pub candidate_names: Vec<String>,
    pub extension: String,
    subfolder: String,
    max_base_len: usize,
}

impl DownloadIntent {
    /// Candidates in priority order: title (unless generic), alt text, page
    /// identifier, image-derived identifier, fallback name.
    pub fn from_message(message: &ResolvedMetadataMessage, cfg: &NamingConfig) -> Self {
        let title = if is_generic_title(&message.title) {
            tracing::debug!(title = %message.title, "skipping generic title");
            ""
        } else {
            message.title.as_str()
        };
        let derived_id = if message.derived_id.is_empty() {
            asset_hash_from_url(&message.image_url).unwrap_or_default()
        } else {
            message.derived_id.clone()
        };

        let candidate_names = [
            title,
            message.image_alt.as_str(),
            message.external_id.as_str(),
            derived_id.as_str(),
            cfg.fallback_name.as_str(),
        ]
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

        let extension = extension_from_url(&message.image_url)
            .unwrap_or_else(|| cfg.fallback_extension.clone());

        Self {
            source_url: message.image_url.clone(),
            candidate_names,
            extension,
            subfolder: cfg.subfolder.clone(),
            max_base_len: cfg.max_base_len,
        }
    }

    /// First candidate that survives sanitization.
    pub fn base_name(&self) -> String {
        self.candidate_names
            .iter()
            .map(|name| sanitize_base_name(name, self.max_base_len))
            .find(|name| !name.is_empty())
            .unwrap_or_else(|| "image".to_string())
    }

    /// Destination relative to the download root, always `/`-separated.
    pub fn destination(&self) -> String {
        let file = format!("{}.{}", self.base_name(), self.extension);
        let subfolder = self.subfolder.trim_matches('/');
        if subfolder.is_empty() {
            file
        } else {
            format!("{}/{}", subfolder, file)
        }
    }

    pub fn save_request(&self) -> SaveRequest {
        SaveRequest {
            source_url: self.source_url.clone(),
            destination: self.destination(),
            collision_policy: CollisionPolicy::Uniquify,
        }
    }
}

/// Destination for a message under the given naming rules.
pub fn derive_destination(message: &ResolvedMetadataMessage, cfg: &NamingConfig) -> String {
    DownloadIntent::from_message(message, cfg).destination()
}
