#![allow(dead_code)]

pub mod image_server;

/// A pin detail page whose image lives at `image_url`.
pub fn pin_page(title: &str, image_url: &str) -> String {
    format!(
        r#"<html><head><meta property="og:title" content="{title} | Pinterest"></head><body>
        <div data-test-id="pin-closeup">
          <div data-test-id="pin-title"><h1>{title}</h1></div>
          <div data-test-id="pin-closeup-image">
            <img src="{image_url}" alt="photo" width="736" height="1104">
          </div>
          <button id="dl" aria-label="Download image"><span>Download</span></button>
        </div>
        <div><div><div><div><div><div><button id="share">Share</button></div></div></div></div></div></div>
      </body></html>"#
    )
}
