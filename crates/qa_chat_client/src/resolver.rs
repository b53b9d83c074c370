//! Chat reply resolution. Backend failures are masked with a canned reply
//! that echoes the user's text; the result records whether that happened.

use rand::seq::SliceRandom;
use std::sync::Arc;
use tracing::warn;

use crate::client::{ChatTransport, ClientError};

/// Where a reply came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplySource {
    Remote,
    /// Generated locally because the chat call failed with `reason`.
    Fallback { reason: String },
}

/// Reply text plus its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub text: String,
    pub source: ReplySource,
}

impl Resolution {
    pub fn is_degraded(&self) -> bool {
        matches!(self.source, ReplySource::Fallback { .. })
    }
}

/// All five canned replies for `text`, in template order.
pub fn fallback_replies(text: &str) -> [String; 5] {
    [
        format!("I understand you're asking about: {}", text),
        format!("That's an interesting question about {}", text),
        format!("Let me think about {}", text),
        format!("Thanks for asking about {}", text),
        format!("I'd be happy to help with {}", text),
    ]
}

/// One canned reply chosen uniformly at random.
pub fn fallback_reply(text: &str) -> String {
    let replies = fallback_replies(text);
    let mut rng = rand::thread_rng();
    replies
        .choose(&mut rng)
        .cloned()
        .unwrap_or_else(|| replies[0].clone())
}

/// Issues exactly one chat request per call; no retry.
#[derive(Clone)]
pub struct ResponseResolver {
    transport: Arc<dyn ChatTransport>,
}

impl ResponseResolver {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self { transport }
    }

    /// Never fails: any error becomes a [`ReplySource::Fallback`] reply.
    pub async fn resolve(&self, text: &str) -> Resolution {
        match self.try_resolve(text).await {
            Ok(resolution) => resolution,
            Err(e) => {
                warn!(error = %e, "chat request failed; answering with fallback reply");
                Resolution {
                    text: fallback_reply(text),
                    source: ReplySource::Fallback {
                        reason: e.to_string(),
                    },
                }
            }
        }
    }

    /// Same request without masking.
    pub async fn try_resolve(&self, text: &str) -> Result<Resolution, ClientError> {
        let reply = self.transport.send_chat(text).await?;
        Ok(Resolution {
            text: reply.text,
            source: ReplySource::Remote,
        })
    }
}
