//! Scripted transport for testing provider clients without network access.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use storybook_error::{ProviderError, ProviderErrorKind};
use storybook_models::{ProviderTransport, UpstreamRequest, UpstreamResponse};

/// A single scripted reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Respond with a status and JSON body
    Respond(u16, Value),
    /// Fail before any response arrives
    Fail(String),
}

/// Transport that replays scripted replies and records every request.
///
/// Once the script is exhausted the last reply repeats.
pub struct MockTransport {
    replies: Mutex<VecDeque<MockReply>>,
    last: Mutex<Option<MockReply>>,
    requests: Mutex<Vec<UpstreamRequest>>,
}

impl MockTransport {
    /// Transport that replays `replies` in order.
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Transport that always answers 200 with `body`.
    pub fn ok(body: Value) -> Self {
        Self::new(vec![MockReply::Respond(200, body)])
    }

    /// Number of requests sent.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Every request sent, in order.
    pub fn requests(&self) -> Vec<UpstreamRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProviderTransport for MockTransport {
    async fn post_json(&self, request: UpstreamRequest) -> Result<UpstreamResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);

        let next = self.replies.lock().unwrap().pop_front();
        let reply = match next {
            Some(reply) => {
                *self.last.lock().unwrap() = Some(reply.clone());
                reply
            }
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .unwrap_or(MockReply::Fail("no scripted reply".to_string())),
        };

        match reply {
            MockReply::Respond(status, body) => Ok(UpstreamResponse::new(status, body)),
            MockReply::Fail(message) => Err(ProviderError::new(ProviderErrorKind::Network(message))),
        }
    }
}
