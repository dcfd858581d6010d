//! Page context: document snapshots, site conventions, the page agent and its thread.
//!
//! A [`PageSnapshot`] is the serialized document of the rendered page plus the
//! location it was captured at. The capturing host records each image's rendered
//! size in its `width`/`height` attributes; the resolver reads sizes from there.

mod agent;
mod context;
pub mod site;

pub use agent::{ClickOutcome, PageAgent};
pub use context::{spawn_page_context, PageHandle};

use scraper::{ElementRef, Html, Selector};
use url::Url;

pub struct PageSnapshot {
    location: Url,
    document: Html,
}

impl PageSnapshot {
    pub fn parse(location: &str, html: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            location: Url::parse(location)?,
            document: Html::parse_document(html),
        })
    }

    pub fn location(&self) -> &Url {
        &self.location
    }

    /// Identity of the current navigation; scopes cached metadata.
    pub fn page_key(&self) -> &str {
        self.location.as_str()
    }

    pub fn document(&self) -> &Html {
        &self.document
    }

    /// True when the snapshot belongs to the site the page agent is injected into.
    pub fn is_on_site(&self) -> bool {
        match self.location.host_str() {
            Some(host) => {
                let host = host.to_ascii_lowercase();
                host == "pinterest.com" || host.ends_with(".pinterest.com") || is_regional(&host)
            }
            None => false,
        }
    }

    /// First element matching a CSS selector; `None` for no match or an invalid selector.
    pub fn find(&self, css: &str) -> Option<ElementRef<'_>> {
        let selector = Selector::parse(css).ok()?;
        self.document.select(&selector).next()
    }

    /// `content` of `<meta property="...">`, trimmed; `None` when absent or empty.
    pub fn meta_property(&self, property: &str) -> Option<&str> {
        let selector = Selector::parse("meta[property]").ok()?;
        self.document
            .select(&selector)
            .find(|m| m.value().attr("property") == Some(property))
            .and_then(|m| m.value().attr("content"))
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Resolve a possibly relative `src` against the page location.
    pub fn resolve_url(&self, raw: &str) -> Option<Url> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        self.location.join(raw).ok()
    }
}

/// Country-code storefronts such as `br.pinterest.com` or `pinterest.co.uk`.
fn is_regional(host: &str) -> bool {
    host.starts_with("pinterest.") || host.contains(".pinterest.")
}

/// Element text with whitespace runs collapsed to single spaces.
pub(crate) fn text_content(elem: ElementRef<'_>) -> String {
    compact_ws(&elem.text().collect::<String>())
}

pub(crate) fn compact_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
