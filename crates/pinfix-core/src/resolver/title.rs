//! Title extractors, most reliable first.

use scraper::Selector;

use super::Extractor;
use crate::config::ResolverConfig;
use crate::page::site::is_generic_title;
use crate::page::{compact_ws, text_content, PageSnapshot};

/// Closeup/detail view title containers, in decreasing specificity.
const DETAIL_TITLE_SELECTORS: &[&str] = &[
    r#"[data-test-id="pin-title"] h1"#,
    r#"[data-test-id="pinTitle"] h1"#,
    r#"[data-test-id="closeup-title"] h1"#,
    r#"[data-test-id="pin-closeup"] h1"#,
    r#"[data-test-id="closeup-body"] h1"#,
    r#"[data-test-id="pin-title"]"#,
    "main h1",
];

const HEADINGS: &str = "h1, h2, h3";

pub(super) const TITLE_EXTRACTORS: &[(&str, Extractor<String>)] = &[
    ("detail", detail_title),
    ("heading", heading_title),
    ("og:title", declared_title),
    ("document", document_title),
];

/// Non-empty, not a brand placeholder, and within the configured length bounds.
fn acceptable(text: &str, cfg: &ResolverConfig) -> bool {
    let len = text.chars().count();
    len >= cfg.min_title_len.max(1) && len <= cfg.max_title_len && !is_generic_title(text)
}

fn first_acceptable(page: &PageSnapshot, css: &str, cfg: &ResolverConfig) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    page.document()
        .select(&selector)
        .map(text_content)
        .find(|text| acceptable(text, cfg))
}

pub(super) fn detail_title(page: &PageSnapshot, cfg: &ResolverConfig) -> Option<String> {
    DETAIL_TITLE_SELECTORS
        .iter()
        .find_map(|css| first_acceptable(page, css, cfg))
}

pub(super) fn heading_title(page: &PageSnapshot, cfg: &ResolverConfig) -> Option<String> {
    first_acceptable(page, HEADINGS, cfg)
}

pub(super) fn declared_title(page: &PageSnapshot, cfg: &ResolverConfig) -> Option<String> {
    page.meta_property("og:title")
        .map(compact_ws)
        .filter(|text| acceptable(text, cfg))
}

/// The document `<title>`, last resort before the caller's own fallbacks.
pub(super) fn document_title(page: &PageSnapshot, cfg: &ResolverConfig) -> Option<String> {
    first_acceptable(page, "head > title", cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(html: &str) -> PageSnapshot {
        PageSnapshot::parse("https://www.pinterest.com/pin/42/", html).unwrap()
    }

    #[test]
    fn detail_selector_wins_over_headings() {
        let p = page(
            r#"<h1>Trending now</h1>
               <div data-test-id="pin-closeup"><h1>  Chocolate
                  Cake Recipe </h1></div>"#,
        );
        let cfg = ResolverConfig::default();
        assert_eq!(detail_title(&p, &cfg).as_deref(), Some("Chocolate Cake Recipe"));
    }

    #[test]
    fn generic_detail_title_is_skipped() {
        let p = page(r#"<main><h1>Pinterest</h1><h1>Garden Ideas</h1></main>"#);
        let cfg = ResolverConfig::default();
        assert_eq!(detail_title(&p, &cfg).as_deref(), Some("Garden Ideas"));
    }

    #[test]
    fn heading_scan_uses_document_order_and_length_bounds() {
        let p = page(r#"<h3>x</h3><h2>Pinterest - Home</h2><h3>Knitting Patterns</h3><h1>Later</h1>"#);
        let cfg = ResolverConfig::default();
        assert_eq!(detail_title(&p, &cfg), None);
        assert_eq!(heading_title(&p, &cfg).as_deref(), Some("Knitting Patterns"));
    }

    #[test]
    fn overlong_titles_are_rejected() {
        let long = "a".repeat(300);
        let p = page(&format!("<h1>{long}</h1>"));
        let cfg = ResolverConfig::default();
        assert_eq!(heading_title(&p, &cfg), None);
    }

    #[test]
    fn declared_title_is_filtered_like_the_rest() {
        let cfg = ResolverConfig::default();
        let generic = page(r#"<meta property="og:title" content="Pinterest">"#);
        let real = page(r#"<meta property="og:title" content="Lemon Tart">"#);
        assert_eq!(declared_title(&generic, &cfg), None);
        assert_eq!(declared_title(&real, &cfg).as_deref(), Some("Lemon Tart"));
    }

    #[test]
    fn document_title_is_the_last_resort() {
        let cfg = ResolverConfig::default();
        let titled = page("<html><head><title> Lemon Tart\n Recipe </title></head><body></body></html>");
        let branded = page("<html><head><title>Pinterest</title></head><body></body></html>");
        assert_eq!(heading_title(&titled, &cfg), None);
        assert_eq!(declared_title(&titled, &cfg), None);
        assert_eq!(document_title(&titled, &cfg).as_deref(), Some("Lemon Tart Recipe"));
        assert_eq!(document_title(&branded, &cfg), None);
    }
}
