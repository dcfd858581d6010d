//! Resolve command: run the metadata heuristics over a saved page.

use anyhow::{Context, Result};
use pinfix_core::clock;
use pinfix_core::config::PinfixConfig;
use pinfix_core::page::PageSnapshot;
use pinfix_core::resolver::MetadataResolver;

use super::PageArgs;

/// Print the resolved metadata of the page as JSON.
pub fn run_resolve(cfg: &PinfixConfig, page: &PageArgs) -> Result<()> {
    let html = page.read_html()?;
    let snapshot = PageSnapshot::parse(&page.url, &html)
        .with_context(|| format!("invalid page URL: {}", page.url))?;
    if !snapshot.is_on_site() {
        tracing::debug!(url = %page.url, "resolving an off-site page");
    }

    let mut resolver = MetadataResolver::new(cfg.resolver.clone(), clock::system());
    let metadata = resolver.resolve(&snapshot);
    println!("{}", serde_json::to_string_pretty(metadata)?);
    Ok(())
}
