//! Image extractors: detail view, bounded feed scan, page preview declaration.

use scraper::{ElementRef, Selector};
use serde::Serialize;
use url::Url;

use super::Extractor;
use crate::config::ResolverConfig;
use crate::page::site::{is_cdn_url, is_profile_or_board_url};
use crate::page::PageSnapshot;

/// Enlarged/detail image containers, in decreasing specificity.
const DETAIL_IMAGE_SELECTORS: &[&str] = &[
    r#"[data-test-id="pin-closeup-image"] img"#,
    r#"img[data-test-id="pin-closeup-image"]"#,
    r#"[data-test-id="closeup-image"] img"#,
    r#"[data-test-id="visual-content-container"] img"#,
    r#"[data-test-id="pin-closeup"] img"#,
];

/// Which extractor produced the image. Anything but `Detail` is a low-confidence pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionConfidence {
    Detail,
    FeedScan,
    PagePreview,
    None,
}

impl ResolutionConfidence {
    pub fn is_low(self) -> bool {
        matches!(self, ResolutionConfidence::FeedScan | ResolutionConfidence::PagePreview)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    pub url: Url,
    pub alt: String,
}

pub(super) const IMAGE_EXTRACTORS: &[(ResolutionConfidence, Extractor<ImageCandidate>)] = &[
    (ResolutionConfidence::Detail, detail_image),
    (ResolutionConfidence::FeedScan, scanned_image),
    (ResolutionConfidence::PagePreview, preview_image),
];

/// `src` of an `img`, resolved against the page, if it points at the asset CDN.
fn cdn_source(page: &PageSnapshot, img: ElementRef<'_>) -> Option<Url> {
    let src = img.value().attr("src")?;
    page.resolve_url(src).filter(is_cdn_url)
}

fn alt_text(img: ElementRef<'_>) -> String {
    img.value().attr("alt").map(str::trim).unwrap_or_default().to_string()
}

/// Rendered size recorded on the element; unparseable or missing reads as 0.
fn dimension(img: ElementRef<'_>, attr: &str) -> u32 {
    img.value()
        .attr(attr)
        .map(|raw| {
            raw.trim()
                .chars()
                .take_while(char::is_ascii_digit)
                .collect::<String>()
        })
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0)
}

/// Avatars and board covers never qualify; neither does an image whose recorded size
/// is below the threshold. A missing size is unknown, not small.
fn is_content_image(img: ElementRef<'_>, url: &Url, cfg: &ResolverConfig) -> bool {
    let too_small = |attr: &str| (1..cfg.min_image_px).contains(&dimension(img, attr));
    !is_profile_or_board_url(url) && !too_small("width") && !too_small("height")
}

pub(super) fn detail_image(page: &PageSnapshot, cfg: &ResolverConfig) -> Option<ImageCandidate> {
    DETAIL_IMAGE_SELECTORS.iter().find_map(|css| {
        let selector = Selector::parse(css).ok()?;
        page.document().select(&selector).find_map(|img| {
            cdn_source(page, img)
                .filter(|url| is_content_image(img, url, cfg))
                .map(|url| ImageCandidate {
                    url,
                    alt: alt_text(img),
                })
        })
    })
}

/// Largest acceptable CDN image among the first `scan_budget` on the page.
pub(super) fn scanned_image(page: &PageSnapshot, cfg: &ResolverConfig) -> Option<ImageCandidate> {
    let selector = Selector::parse("img[src]").ok()?;
    let mut best: Option<(u64, ImageCandidate)> = None;

    let cdn_images = page
        .document()
        .select(&selector)
        .filter_map(|img| cdn_source(page, img).map(|url| (img, url)))
        .take(cfg.scan_budget);

    for (img, url) in cdn_images {
        let (width, height) = (dimension(img, "width"), dimension(img, "height"));
        if width < cfg.min_image_px || height < cfg.min_image_px {
            continue;
        }
        if is_profile_or_board_url(&url) {
            continue;
        }
        let area = u64::from(width) * u64::from(height);
        if best.as_ref().map_or(true, |(best_area, _)| area > *best_area) {
            best = Some((
                area,
                ImageCandidate {
                    url,
                    alt: alt_text(img),
                },
            ));
        }
    }

    best.map(|(_, candidate)| candidate)
}

pub(super) fn preview_image(page: &PageSnapshot, _cfg: &ResolverConfig) -> Option<ImageCandidate> {
    page.meta_property("og:image")
        .and_then(|content| page.resolve_url(content))
        .filter(is_cdn_url)
        .map(|url| ImageCandidate {
            url,
            alt: String::new(),
        })
}
