//! The page-side agent: owns the resolver cache and the debounce state for one page
//! context, reacts to clicks (push) and answers metadata requests (pull).

use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;

use super::PageSnapshot;
use crate::clock::SharedClock;
use crate::config::PinfixConfig;
use crate::intercept::{ClickEvent, ClickInterceptor, Interception};
use crate::protocol::{Message, ResolvedMetadataMessage};
use crate::resolver::MetadataResolver;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Not a download click; native behavior proceeds.
    Ignored,
    /// Swallowed by the debounce window; native behavior proceeds.
    Debounced,
    /// Native download suppressed but no image could be resolved, so nothing is saved.
    Suppressed,
    /// Native download suppressed and the metadata pushed to the saver.
    Dispatched(ResolvedMetadataMessage),
}

pub struct PageAgent {
    resolver: MetadataResolver,
    interceptor: ClickInterceptor,
    outbox: UnboundedSender<Value>,
}

impl PageAgent {
    pub fn new(config: &PinfixConfig, clock: SharedClock, outbox: UnboundedSender<Value>) -> Self {
        Self {
            resolver: MetadataResolver::new(config.resolver.clone(), clock.clone()),
            interceptor: ClickInterceptor::new(config.debounce(), clock),
            outbox,
        }
    }

    pub fn resolver(&self) -> &MetadataResolver {
        &self.resolver
    }

    /// Capture-phase click handler. Suppression happens before resolution, so a page
    /// without a resolvable image still never falls back to its own unnamed download.
    pub fn on_click(&mut self, page: &PageSnapshot, event: &mut ClickEvent<'_>) -> ClickOutcome {
        match self.interceptor.intercept(event) {
            Interception::Ignored => return ClickOutcome::Ignored,
            Interception::Debounced => return ClickOutcome::Debounced,
            Interception::Intercepted => {}
        }

        let Some(message) = self.resolver.resolve(page).to_message() else {
            tracing::debug!(page = page.page_key(), "download intercepted but no image found");
            return ClickOutcome::Suppressed;
        };

        tracing::info!(
            image = %message.image_url,
            title = %message.title,
            pin = %message.external_id,
            "dispatching download"
        );
        match Message::DownloadImage(message.clone()).to_json() {
            Ok(payload) => {
                if self.outbox.send(payload).is_err() {
                    tracing::debug!("saver context is gone; dropping download");
                }
            }
            Err(e) => tracing::warn!("encode DOWNLOAD_IMAGE: {}", e),
        }
        ClickOutcome::Dispatched(message)
    }

    /// Message listener. Answers `GET_PIN_META` from the cached resolution path;
    /// anything else gets no reply.
    pub fn on_message(&mut self, page: &PageSnapshot, payload: &Value) -> Option<Value> {
        match Message::from_json(payload)? {
            Message::GetPinMeta => {
                let reply = self.resolver.resolve(page).pin_meta();
                serde_json::to_value(reply)
                    .map_err(|e| tracing::warn!("encode pin meta: {}", e))
                    .ok()
            }
            Message::DownloadImage(_) => None,
        }
    }
}
