//! Messages exchanged between the page context and the privileged saver.
//!
//! Every payload crosses the boundary as JSON, internally tagged by `type`:
//! - `DOWNLOAD_IMAGE` (push, page → saver, fire-and-forget)
//! - `GET_PIN_META` (pull, saver → page), answered with [`PinMetaReply`]

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::LinkError;

/// Missing and `null` fields both read as empty strings.
fn lenient<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Metadata for one save action. Consumed once by the saver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedMetadataMessage {
    #[serde(default, deserialize_with = "lenient")]
    pub image_url: String,
    #[serde(default, deserialize_with = "lenient")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient")]
    pub image_alt: String,
    #[serde(rename = "pinId", alias = "externalId", default, deserialize_with = "lenient")]
    pub external_id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub derived_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinMetaReply {
    #[serde(default, deserialize_with = "lenient")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient")]
    pub pin_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    DownloadImage(ResolvedMetadataMessage),
    GetPinMeta,
}

impl Message {
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Decode a payload; unknown or malformed messages are `None` and must be ignored.
    pub fn from_json(payload: &Value) -> Option<Message> {
        match Message::deserialize(payload) {
            Ok(message) => Some(message),
            Err(e) => {
                tracing::debug!("ignoring message: {}", e);
                None
            }
        }
    }
}

/// Request/response channel into the page context, as seen from the privileged side.
#[async_trait]
pub trait PageLink: Send + Sync {
    async fn request(&self, message: &Message) -> Result<Value, LinkError>;
}

/// Pull `{title, pinId}` from the page context.
pub async fn pull_pin_meta(link: &dyn PageLink) -> Result<PinMetaReply, LinkError> {
    let reply = link.request(&Message::GetPinMeta).await?;
    Ok(serde_json::from_value(reply)?)
}
