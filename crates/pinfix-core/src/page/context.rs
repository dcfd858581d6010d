//! Page context: a dedicated thread that owns the current snapshot and the page agent.
//!
//! Nothing but strings and JSON values cross into or out of the thread; the parsed
//! document never leaves it. The privileged side talks to it through [`PageHandle`].

use async_trait::async_trait;
use serde_json::Value;
use std::thread;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

use super::{ClickOutcome, PageAgent, PageSnapshot};
use crate::clock::SharedClock;
use crate::config::PinfixConfig;
use crate::error::LinkError;
use crate::intercept::ClickEvent;
use crate::protocol::{Message, PageLink};

enum PageCommand {
    Load {
        location: String,
        html: String,
        reply: oneshot::Sender<Result<(), LinkError>>,
    },
    Click {
        selector: String,
        reply: oneshot::Sender<Option<ClickOutcome>>,
    },
    Message {
        payload: Value,
        reply: oneshot::Sender<Value>,
    },
}

/// Cloneable handle to a running page context. The thread exits once every handle is dropped.
#[derive(Clone)]
pub struct PageHandle {
    tx: mpsc::UnboundedSender<PageCommand>,
    pull_timeout: Duration,
}

/// Starts a page context. Push messages from clicks are sent to `outbox`.
pub fn spawn_page_context(
    config: &PinfixConfig,
    clock: SharedClock,
    outbox: mpsc::UnboundedSender<Value>,
) -> std::io::Result<PageHandle> {
    let (tx, rx) = mpsc::unbounded_channel();
    let agent = PageAgent::new(config, clock, outbox);
    thread::Builder::new()
        .name("page-context".to_string())
        .spawn(move || run(agent, rx))?;
    Ok(PageHandle {
        tx,
        pull_timeout: config.pull_timeout(),
    })
}

fn run(mut agent: PageAgent, mut rx: mpsc::UnboundedReceiver<PageCommand>) {
    let mut page: Option<PageSnapshot> = None;

    while let Some(command) = rx.blocking_recv() {
        match command {
            PageCommand::Load {
                location,
                html,
                reply,
            } => {
                let result = PageSnapshot::parse(&location, &html)
                    .map(|snapshot| {
                        tracing::debug!(page = snapshot.page_key(), "page loaded");
                        page = Some(snapshot);
                    })
                    .map_err(|e| LinkError::InvalidPage(format!("{location}: {e}")));
                let _ = reply.send(result);
            }
            PageCommand::Click { selector, reply } => {
                let outcome = page
                    .as_ref()
                    .filter(|p| p.is_on_site())
                    .and_then(|p| {
                        let target = p.find(&selector)?;
                        let mut event = ClickEvent::new(target);
                        Some(agent.on_click(p, &mut event))
                    });
                let _ = reply.send(outcome);
            }
            PageCommand::Message { payload, reply } => {
                // Off-site pages have no agent injected: dropping `reply` reads as "no listener".
                let answer = page
                    .as_ref()
                    .filter(|p| p.is_on_site())
                    .and_then(|p| agent.on_message(p, &payload));
                if let Some(answer) = answer {
                    let _ = reply.send(answer);
                }
            }
        }
    }
    tracing::debug!("page context closed");
}

impl PageHandle {
    /// Replaces the current document (navigation or in-place content swap).
    pub async fn load(&self, location: &str, html: &str) -> Result<(), LinkError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(PageCommand::Load {
                location: location.to_string(),
                html: html.to_string(),
                reply,
            })
            .map_err(|_| LinkError::NoListener)?;
        rx.await.map_err(|_| LinkError::NoListener)?
    }

    /// Clicks the first element matching `selector`. `None` when there is no page, the
    /// page is off-site, or nothing matches.
    pub async fn click(&self, selector: &str) -> Result<Option<ClickOutcome>, LinkError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(PageCommand::Click {
                selector: selector.to_string(),
                reply,
            })
            .map_err(|_| LinkError::NoListener)?;
        rx.await.map_err(|_| LinkError::NoListener)
    }
}

#[async_trait]
impl PageLink for PageHandle {
    async fn request(&self, message: &Message) -> Result<Value, LinkError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(PageCommand::Message {
                payload: message.to_json()?,
                reply,
            })
            .map_err(|_| LinkError::NoListener)?;
        match tokio::time::timeout(self.pull_timeout, rx).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(_)) => Err(LinkError::NoListener),
            Err(_) => Err(LinkError::Timeout(self.pull_timeout)),
        }
    }
}
