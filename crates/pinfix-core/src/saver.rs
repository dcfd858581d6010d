//! Privileged saver: turns resolved metadata into a named file on disk.
//!
//! Two entry points: push messages from the page context (`DOWNLOAD_IMAGE`) and
//! direct image actions, which pull `{title, pinId}` from the page context when one
//! is reachable and otherwise save with what the action itself carries.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::clock::SharedClock;
use crate::config::{NamingConfig, PinfixConfig};
use crate::error::SaveError;
use crate::naming::DownloadIntent;
use crate::page::site::asset_hash_from_url;
use crate::protocol::{pull_pin_meta, Message, PageLink, PinMetaReply, ResolvedMetadataMessage};

/// What the save primitive does when the destination already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Keep the existing file and pick a disambiguated name for the new one.
    Uniquify,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub source_url: String,
    /// Relative to the primitive's download root, `/`-separated.
    pub destination: String,
    pub collision_policy: CollisionPolicy,
}

/// Host primitive that fetches `source_url` and writes it under `destination`.
/// Returns the path actually written.
#[async_trait]
pub trait SavePrimitive: Send + Sync {
    async fn save(&self, request: &SaveRequest) -> Result<PathBuf, SaveError>;
}

#[async_trait]
impl<P: SavePrimitive + ?Sized> SavePrimitive for Arc<P> {
    async fn save(&self, request: &SaveRequest) -> Result<PathBuf, SaveError> {
        (**self).save(request).await
    }
}

pub struct Saver<P> {
    primitive: P,
    naming: NamingConfig,
    clock: SharedClock,
    dedupe_window: Duration,
    last_request: Mutex<Option<(SaveRequest, Instant)>>,
}

impl<P: SavePrimitive> Saver<P> {
    pub fn new(primitive: P, config: &PinfixConfig, clock: SharedClock) -> Self {
        Self {
            primitive,
            naming: config.naming.clone(),
            clock,
            dedupe_window: config.dedupe_window(),
            last_request: Mutex::new(None),
        }
    }

    /// True (and recorded) when `request` repeats the previous one within the dedupe window.
    fn is_duplicate(&self, request: &SaveRequest) -> bool {
        let now = self.clock.now();
        let mut last = self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let duplicate = last.as_ref().is_some_and(|(previous, at)| {
            previous == request && now.saturating_duration_since(*at) < self.dedupe_window
        });
        if !duplicate {
            *last = Some((request.clone(), now));
        }
        duplicate
    }

    /// Drops the dedupe record for a request that did not complete, so a retry goes through.
    fn forget(&self, request: &SaveRequest) {
        let mut last = self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if last.as_ref().is_some_and(|(previous, _)| previous == request) {
            *last = None;
        }
    }

    /// Saves one resolved image. `Ok(None)` when there is nothing to save or the
    /// request duplicates one just made.
    pub async fn save_resolved(
        &self,
        message: &ResolvedMetadataMessage,
    ) -> Result<Option<PathBuf>, SaveError> {
        if message.image_url.trim().is_empty() {
            tracing::debug!("download request without an image url; skipping");
            return Ok(None);
        }

        let intent = DownloadIntent::from_message(message, &self.naming);
        let request = intent.save_request();
        if self.is_duplicate(&request) {
            tracing::debug!(destination = %request.destination, "duplicate download request dropped");
            return Ok(None);
        }

        match self.primitive.save(&request).await {
            Ok(path) => {
                tracing::info!(url = %request.source_url, path = %path.display(), "image saved");
                Ok(Some(path))
            }
            Err(e) => {
                tracing::warn!(url = %request.source_url, destination = %request.destination, "save failed: {}", e);
                self.forget(&request);
                Err(e)
            }
        }
    }

    /// Listener for page-context pushes. Anything but `DOWNLOAD_IMAGE` is ignored;
    /// failures are logged and swallowed.
    pub async fn handle_message(&self, payload: &Value) -> Option<PathBuf> {
        match Message::from_json(payload)? {
            Message::DownloadImage(message) => self.save_resolved(&message).await.ok().flatten(),
            Message::GetPinMeta => None,
        }
    }

    /// Direct action on an image (context menu). Metadata is pulled from the page
    /// context when reachable; otherwise only the image URL and fallbacks are used.
    pub async fn save_image_action(
        &self,
        image_url: &str,
        page: Option<&dyn PageLink>,
    ) -> Result<Option<PathBuf>, SaveError> {
        if image_url.trim().is_empty() {
            return Ok(None);
        }

        let meta = match page {
            Some(link) => pull_pin_meta(link).await.unwrap_or_else(|e| {
                tracing::debug!("page metadata unavailable: {}", e);
                PinMetaReply::default()
            }),
            None => PinMetaReply::default(),
        };

        let message = ResolvedMetadataMessage {
            image_url: image_url.to_string(),
            title: meta.title,
            image_alt: String::new(),
            external_id: meta.pin_id,
            derived_id: asset_hash_from_url(image_url).unwrap_or_default(),
        };
        self.save_resolved(&message).await
    }
}

/// Consumes push messages until every page context has hung up. Returns the paths
/// actually written, after any uniquify.
pub async fn run_saver<P: SavePrimitive>(
    saver: Arc<Saver<P>>,
    mut inbox: UnboundedReceiver<Value>,
) -> Vec<PathBuf> {
    let mut saved = Vec::new();
    while let Some(payload) = inbox.recv().await {
        saved.extend(saver.handle_message(&payload).await);
    }
    saved
}
