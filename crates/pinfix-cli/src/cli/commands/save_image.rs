//! Save-image command: the direct image action, with metadata pulled from a page.

use anyhow::{Context, Result};
use pinfix_core::clock;
use pinfix_core::config::PinfixConfig;
use pinfix_core::page::{spawn_page_context, PageHandle};
use pinfix_core::protocol::PageLink;
use pinfix_core::saver::Saver;
use pinfix_core::storage::FsSavePrimitive;
use std::path::Path;
use tokio::sync::mpsc;

use super::PageArgs;

/// Save `image_url` under `root`, printing the path written.
pub async fn run_save_image(
    cfg: &PinfixConfig,
    image_url: &str,
    page: Option<&PageArgs>,
    root: &Path,
) -> Result<()> {
    let clock = clock::system();
    // Push messages are not expected on this path; the receiver only keeps the channel open.
    let (outbox, _inbox) = mpsc::unbounded_channel();

    let handle: Option<PageHandle> = match page {
        Some(page) => {
            let html = page.read_html()?;
            let handle = spawn_page_context(cfg, clock.clone(), outbox)
                .context("failed to start page context")?;
            handle.load(&page.url, &html).await?;
            Some(handle)
        }
        None => None,
    };

    let saver = Saver::new(FsSavePrimitive::new(root), cfg, clock);
    let link = handle.as_ref().map(|h| h as &dyn PageLink);
    match saver.save_image_action(image_url, link).await? {
        Some(path) => println!("{}", path.display()),
        None => println!("nothing saved"),
    }
    Ok(())
}
