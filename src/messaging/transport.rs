//! Controller-side delivery of requests to the page context.

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use tracing::debug;

use super::agent::PageAgent;
use super::protocol::{Request, Response};
use crate::error::{DeliveryError, Result};

/// Trait for sending a request to the page context and awaiting its reply.
///
/// Every failure to reach the page, or to understand its answer, is a
/// [`DeliveryError`]. An absent question is a successful
/// `Response::TempData(None)`, never an error.
#[async_trait]
pub trait PageTransport: Send + Sync {
    /// Delivers `request` and returns the decoded reply.
    async fn send(&self, request: Request) -> Result<Response>;
}

/// In-process transport to a [`PageAgent`].
///
/// Holds the agent weakly, the way a message port outlives the tab it
/// pointed at: once the agent is dropped, sends fail with
/// [`DeliveryError::Unreachable`]. Requests and replies go through their
/// JSON wire form.
#[derive(Debug, Clone)]
pub struct LocalTransport {
    agent: Weak<PageAgent>,
}

impl LocalTransport {
    /// Connects to `agent`.
    pub fn new(agent: &Arc<PageAgent>) -> Self {
        Self {
            agent: Arc::downgrade(agent),
        }
    }

    /// Returns true while the agent is alive.
    pub fn is_connected(&self) -> bool {
        self.agent.strong_count() > 0
    }
}

#[async_trait]
impl PageTransport for LocalTransport {
    async fn send(&self, request: Request) -> Result<Response> {
        let agent = self
            .agent
            .upgrade()
            .ok_or_else(|| DeliveryError::unreachable("page agent has been dropped"))?;

        let json = request.to_json()?;
        let reply = agent.handle_json(&json)?;
        debug!(action = request.action(), reply_len = reply.len(), "Reply received");

        Ok(request.decode_reply(&reply)?)
    }
}
