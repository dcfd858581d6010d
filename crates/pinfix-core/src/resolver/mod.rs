//! Page metadata resolution with a short-lived cache.
//!
//! Each field is produced by an ordered chain of extractors (pure functions of the
//! page snapshot); the first extractor that yields a value wins. Results are cached
//! per page key and re-scanned when the key changes or the cache outlives its TTL,
//! since pages replace content in place without navigating.

mod image;
mod title;

pub use image::{ImageCandidate, ResolutionConfidence};

use serde::Serialize;
use std::time::Instant;

use crate::clock::SharedClock;
use crate::config::ResolverConfig;
use crate::page::site::{asset_hash_from_url, pin_id_from_path};
use crate::page::PageSnapshot;
use crate::protocol::{PinMetaReply, ResolvedMetadataMessage};

/// A candidate extractor: one heuristic over the page snapshot.
pub(crate) type Extractor<T> = fn(&PageSnapshot, &ResolverConfig) -> Option<T>;

/// Best available metadata for one page key. Rebuilt as a whole on every scan.
#[derive(Debug, Clone, Serialize)]
pub struct PageMetadata {
    pub page_key: String,
    /// Empty means unknown.
    pub title: String,
    pub external_id: String,
    pub image_url: Option<String>,
    pub image_alt: String,
    pub confidence: ResolutionConfidence,
    #[serde(skip)]
    pub resolved_at: Instant,
}

impl PageMetadata {
    /// Hex asset hash of the resolved image, or empty.
    pub fn derived_id(&self) -> String {
        self.image_url
            .as_deref()
            .and_then(asset_hash_from_url)
            .unwrap_or_default()
    }

    /// Push payload for the saver; `None` when no image was found.
    pub fn to_message(&self) -> Option<ResolvedMetadataMessage> {
        let image_url = self.image_url.clone()?;
        Some(ResolvedMetadataMessage {
            image_url,
            title: self.title.clone(),
            image_alt: self.image_alt.clone(),
            external_id: self.external_id.clone(),
            derived_id: self.derived_id(),
        })
    }

    pub fn pin_meta(&self) -> PinMetaReply {
        PinMetaReply {
            title: self.title.clone(),
            pin_id: self.external_id.clone(),
        }
    }
}

pub struct MetadataResolver {
    config: ResolverConfig,
    clock: SharedClock,
    cache: Option<PageMetadata>,
    scans: u64,
}

impl MetadataResolver {
    pub fn new(config: ResolverConfig, clock: SharedClock) -> Self {
        Self {
            config,
            clock,
            cache: None,
            scans: 0,
        }
    }

    /// Cached metadata for `page`, re-scanning when the page key changed or the TTL expired.
    pub fn resolve(&mut self, page: &PageSnapshot) -> &PageMetadata {
        let now = self.clock.now();
        let ttl = self.config.cache_ttl();
        let fresh = self.cache.as_ref().is_some_and(|cached| {
            cached.page_key == page.page_key()
                && now.saturating_duration_since(cached.resolved_at) < ttl
        });
        if !fresh {
            self.cache = None;
        }

        let config = &self.config;
        let scans = &mut self.scans;
        self.cache.get_or_insert_with(|| {
            *scans += 1;
            scan(page, config, now)
        })
    }

    /// Number of full document scans performed so far.
    pub fn scan_count(&self) -> u64 {
        self.scans
    }

    #[cfg(test)]
    fn invalidate(&mut self) {
        self.cache = None;
    }
}

fn first_match<K, T>(
    page: &PageSnapshot,
    cfg: &ResolverConfig,
    chain: &[(K, Extractor<T>)],
) -> Option<(T, usize)> {
    chain
        .iter()
        .enumerate()
        .find_map(|(i, (_, extract))| extract(page, cfg).map(|value| (value, i)))
}

fn scan(page: &PageSnapshot, cfg: &ResolverConfig, now: Instant) -> PageMetadata {
    let title = match first_match(page, cfg, title::TITLE_EXTRACTORS) {
        Some((found, i)) => {
            tracing::debug!(source = title::TITLE_EXTRACTORS[i].0, "title resolved");
            found
        }
        None => {
            tracing::debug!(page = page.page_key(), "no title found");
            String::new()
        }
    };

    let external_id = pin_id_from_path(page.location().path())
        .unwrap_or_default()
        .to_string();

    let (image_url, image_alt, confidence) =
        match first_match(page, cfg, image::IMAGE_EXTRACTORS) {
            Some((candidate, i)) => {
                let confidence = image::IMAGE_EXTRACTORS[i].0;
                if confidence.is_low() {
                    tracing::debug!(
                        confidence = "low",
                        source = ?confidence,
                        url = %candidate.url,
                        "image resolved without the detail view"
                    );
                }
                (Some(candidate.url.to_string()), candidate.alt, confidence)
            }
            None => {
                tracing::debug!(page = page.page_key(), "no image found");
                (None, String::new(), ResolutionConfidence::None)
            }
        };

    PageMetadata {
        page_key: page.page_key().to_string(),
        title,
        external_id,
        image_url,
        image_alt,
        confidence,
        resolved_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::sync::Arc;
    use std::time::Duration;

    const PIN_PAGE: &str = r#"<html><head>
        <meta property="og:image" content="https://i.pinimg.com/originals/11/22/aabbccdd.png">
      </head><body>
        <div data-test-id="pin-closeup">
          <h1>Chocolate Cake Recipe</h1>
          <div data-test-id="pin-closeup-image">
            <img src="https://i.pinimg.com/originals/ab/cd/ef123456.jpg" alt="Cake slice">
          </div>
        </div>
      </body></html>"#;

    fn resolver(clock: &ManualClock) -> MetadataResolver {
        MetadataResolver::new(ResolverConfig::default(), Arc::new(clock.clone()))
    }

    #[test]
    fn resolves_detail_view() {
        let clock = ManualClock::new();
        let page = PageSnapshot::parse("https://www.pinterest.com/pin/987654321/", PIN_PAGE).unwrap();
        let mut r = resolver(&clock);
        let meta = r.resolve(&page).clone();
        assert_eq!(meta.title, "Chocolate Cake Recipe");
        assert_eq!(meta.external_id, "987654321");
        assert_eq!(
            meta.image_url.as_deref(),
            Some("https://i.pinimg.com/originals/ab/cd/ef123456.jpg")
        );
        assert_eq!(meta.image_alt, "Cake slice");
        assert_eq!(meta.confidence, ResolutionConfidence::Detail);
        assert_eq!(meta.derived_id(), "ef123456");
    }

    #[test]
    fn creator_avatar_never_names_the_download() {
        let clock = ManualClock::new();
        let page = PageSnapshot::parse(
            "https://www.pinterest.com/pin/555/",
            r#"<div data-test-id="pin-closeup">
                 <img src="https://i.pinimg.com/75x75_RS/aa/bb/avatar.jpg" alt="Jane Doe" width="32" height="32">
                 <h1>Lemon Tart Recipe</h1>
                 <img src="https://i.pinimg.com/736x/ab/cd/ef123456.jpg" alt="tart" width="736" height="900">
               </div>"#,
        )
        .unwrap();
        let mut r = resolver(&clock);
        let meta = r.resolve(&page);
        assert_eq!(
            meta.image_url.as_deref(),
            Some("https://i.pinimg.com/736x/ab/cd/ef123456.jpg")
        );
        assert_eq!(meta.image_alt, "tart");
        assert_eq!(meta.confidence, ResolutionConfidence::Detail);
    }

    #[test]
    fn falls_back_to_preview_declaration() {
        let clock = ManualClock::new();
        let page = PageSnapshot::parse(
            "https://www.pinterest.com/search/pins/?q=cake",
            r#"<meta property="og:image" content="https://i.pinimg.com/originals/11/22/aabbccdd.png">"#,
        )
        .unwrap();
        let mut r = resolver(&clock);
        let meta = r.resolve(&page);
        assert_eq!(meta.confidence, ResolutionConfidence::PagePreview);
        assert_eq!(meta.external_id, "");
        assert_eq!(meta.image_alt, "");
        assert_eq!(meta.title, "");
    }

    #[test]
    fn miss_yields_empty_fields_and_no_message() {
        let clock = ManualClock::new();
        let page = PageSnapshot::parse("https://www.pinterest.com/", "<h1>Pinterest</h1>").unwrap();
        let mut r = resolver(&clock);
        let meta = r.resolve(&page);
        assert!(meta.image_url.is_none());
        assert_eq!(meta.confidence, ResolutionConfidence::None);
        assert!(meta.to_message().is_none());
        assert_eq!(meta.title, "");
    }

    #[test]
    fn cache_holds_within_ttl_even_if_document_changed() {
        let clock = ManualClock::new();
        let url = "https://www.pinterest.com/pin/1/";
        let before = PageSnapshot::parse(url, "<h1>Old Title</h1>").unwrap();
        let after = PageSnapshot::parse(url, "<h1>New Title</h1>").unwrap();
        let mut r = resolver(&clock);

        assert_eq!(r.resolve(&before).title, "Old Title");
        clock.advance(Duration::from_millis(400));
        assert_eq!(r.resolve(&after).title, "Old Title");
        assert_eq!(r.scan_count(), 1);

        clock.advance(Duration::from_millis(700));
        assert_eq!(r.resolve(&after).title, "New Title");
        assert_eq!(r.scan_count(), 2);
    }

    #[test]
    fn cache_never_crosses_page_keys() {
        let clock = ManualClock::new();
        let a = PageSnapshot::parse("https://www.pinterest.com/pin/1/", "<h1>First Pin</h1>").unwrap();
        let b = PageSnapshot::parse("https://www.pinterest.com/pin/2/", "<h1>Second Pin</h1>").unwrap();
        let mut r = resolver(&clock);
        assert_eq!(r.resolve(&a).external_id, "1");
        let meta = r.resolve(&b);
        assert_eq!(meta.external_id, "2");
        assert_eq!(meta.title, "Second Pin");
        assert_eq!(meta.page_key, "https://www.pinterest.com/pin/2/");
    }

    #[test]
    fn invalidate_forces_rescan() {
        let clock = ManualClock::new();
        let page = PageSnapshot::parse("https://www.pinterest.com/pin/1/", "<h1>Title Here</h1>").unwrap();
        let mut r = resolver(&clock);
        r.resolve(&page);
        r.invalidate();
        r.resolve(&page);
        assert_eq!(r.scan_count(), 2);
    }
}
