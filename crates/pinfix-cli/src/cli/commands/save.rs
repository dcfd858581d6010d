//! Save command: click an element of a saved page and save what the click dispatches.

use anyhow::{Context, Result};
use pinfix_core::clock;
use pinfix_core::config::PinfixConfig;
use pinfix_core::page::{spawn_page_context, ClickOutcome};
use pinfix_core::saver::{run_saver, Saver};
use pinfix_core::storage::FsSavePrimitive;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::PageArgs;

/// Load the page into a page context, click `selector`, and wait for the saver to drain.
pub async fn run_save(cfg: &PinfixConfig, page: &PageArgs, selector: &str, root: &Path) -> Result<()> {
    let html = page.read_html()?;
    let clock = clock::system();

    let (outbox, inbox) = mpsc::unbounded_channel();
    let handle = spawn_page_context(cfg, Arc::clone(&clock), outbox)
        .context("failed to start page context")?;
    let saver = Arc::new(Saver::new(FsSavePrimitive::new(root), cfg, clock));
    let worker = tokio::spawn(run_saver(Arc::clone(&saver), inbox));

    handle.load(&page.url, &html).await?;
    let outcome = handle.click(selector).await?;
    // Closing the page context ends the saver once queued messages are handled.
    drop(handle);
    let saved = worker.await.context("saver task failed")?;

    println!("{}", save_report(outcome, selector, &saved)?);
    Ok(())
}

/// What a click led to, naming each file as it was actually written (after uniquify).
pub fn save_report(outcome: Option<ClickOutcome>, selector: &str, saved: &[PathBuf]) -> Result<String> {
    let report = match outcome {
        None => format!("nothing clicked: page is off-site or '{}' matched nothing", selector),
        Some(ClickOutcome::Ignored) => format!("'{}' is not a download control", selector),
        Some(ClickOutcome::Debounced) => "click debounced".to_string(),
        Some(ClickOutcome::Suppressed) => "download suppressed: no image found on the page".to_string(),
        Some(ClickOutcome::Dispatched(message)) => {
            if saved.is_empty() {
                anyhow::bail!("failed to save {} (see log)", message.image_url);
            }
            saved
                .iter()
                .map(|path| format!("saved {}", path.display()))
                .collect::<Vec<_>>()
                .join("\n")
        }
    };
    Ok(report)
}
