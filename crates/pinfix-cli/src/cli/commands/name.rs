//! Name command: preview the destination for a set of metadata.

use clap::Args;
use pinfix_core::config::PinfixConfig;
use pinfix_core::naming::derive_destination;
use pinfix_core::protocol::ResolvedMetadataMessage;

#[derive(Debug, Clone, Args)]
pub struct NameArgs {
    /// Image URL (supplies the extension and the image-derived id).
    pub image_url: String,

    /// Pin title.
    #[arg(long)]
    pub title: Option<String>,

    /// Image alt text.
    #[arg(long)]
    pub alt: Option<String>,

    /// Pin id.
    #[arg(long)]
    pub pin_id: Option<String>,
}

/// Print the destination relative to the download root.
pub fn run_name(cfg: &PinfixConfig, args: &NameArgs) {
    let message = ResolvedMetadataMessage {
        image_url: args.image_url.clone(),
        title: args.title.clone().unwrap_or_default(),
        image_alt: args.alt.clone().unwrap_or_default(),
        external_id: args.pin_id.clone().unwrap_or_default(),
        derived_id: String::new(),
    };
    println!("{}", derive_destination(&message, &cfg.naming));
}
