//! CLI for pinfix: resolve pin pages, preview filenames, and save images.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pinfix_core::config;
use std::path::PathBuf;

use commands::{run_name, run_resolve, run_save, run_save_image, NameArgs, PageArgs};

/// Top-level CLI for pinfix.
#[derive(Debug, Parser)]
#[command(name = "pinfix")]
#[command(about = "pinfix: save Pinterest images under their pin titles", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Resolve title, pin id and image of a saved page; prints JSON.
    Resolve {
        #[command(flatten)]
        page: PageArgs,
    },

    /// Print the destination an image would be saved to.
    Name {
        #[command(flatten)]
        args: NameArgs,
    },

    /// Click an element of a saved page and save whatever the click dispatches.
    Save {
        #[command(flatten)]
        page: PageArgs,

        /// CSS selector of the element to click.
        #[arg(long, default_value = "button", value_name = "CSS")]
        click: String,

        /// Download root (default: config `download_dir`, else the current directory).
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },

    /// Save an image directly, pulling pin metadata from a page when one is given.
    SaveImage {
        /// Image URL.
        image_url: String,

        /// Page the image was found on (HTML file plus its URL).
        #[arg(long, value_name = "FILE", requires = "page_url")]
        html: Option<PathBuf>,

        /// URL the page was captured at.
        #[arg(long, value_name = "URL", requires = "html")]
        page_url: Option<String>,

        /// Download root (default: config `download_dir`, else the current directory).
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Resolve { page } => run_resolve(&cfg, &page)?,
            CliCommand::Name { args } => run_name(&cfg, &args),
            CliCommand::Save { page, click, dir } => {
                let root = download_root(&cfg, dir)?;
                run_save(&cfg, &page, &click, &root).await?;
            }
            CliCommand::SaveImage {
                image_url,
                html,
                page_url,
                dir,
            } => {
                let root = download_root(&cfg, dir)?;
                let page = html
                    .zip(page_url)
                    .map(|(html, url)| PageArgs { html, url });
                run_save_image(&cfg, &image_url, page.as_ref(), &root).await?;
            }
        }

        Ok(())
    }
}

fn download_root(cfg: &config::PinfixConfig, dir: Option<PathBuf>) -> Result<PathBuf> {
    match dir.or_else(|| cfg.download_dir.clone()) {
        Some(dir) => Ok(dir),
        None => Ok(std::env::current_dir()?),
    }
}

#[cfg(test)]
mod tests;
