//! CLI command handlers. Each command is in its own file.

mod name;
mod resolve;
mod save;
mod save_image;

pub use name::{run_name, NameArgs};
pub use resolve::run_resolve;
pub use save::{run_save, save_report};
pub use save_image::run_save_image;

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

/// A captured page: its serialized document and the URL it was captured at.
#[derive(Debug, Clone, Args)]
pub struct PageArgs {
    /// HTML file holding the rendered page.
    pub html: PathBuf,

    /// URL the page was captured at.
    #[arg(long, value_name = "URL")]
    pub url: String,
}

impl PageArgs {
    pub fn read_html(&self) -> Result<String> {
        std::fs::read_to_string(&self.html)
            .with_context(|| format!("failed to read page: {}", self.html.display()))
    }
}
