//! Shared fetch state machine
//!
//! Every pagination style goes through the same cycle: send the request, check
//! for a rate limit, maybe sleep and retry once, hand back the envelope. Errors
//! never escape; they move the cursor to [`CursorState::Exhausted`].

use super::types::IterationRequest;
use crate::config::PaginationPolicy;
use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::{ResponseEnvelope, StringMap};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Lifecycle of a walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// More pages may follow
    Active,
    /// Terminal; every further fetch is a no-op
    Exhausted,
}

/// Result of one fetch
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The API answered with a body
    Envelope(ResponseEnvelope),
    /// The walk is over
    Exhausted,
}

/// Drives requests for one iterator
pub struct PaginationCursor<T> {
    transport: T,
    request: IterationRequest,
    policy: PaginationPolicy,
    state: CursorState,
    requests_sent: usize,
}

impl<T: Transport> PaginationCursor<T> {
    /// Create a cursor over a base request
    pub fn new(transport: T, request: IterationRequest, policy: PaginationPolicy) -> Self {
        Self {
            transport,
            request,
            policy,
            state: CursorState::Active,
            requests_sent: 0,
        }
    }

    /// The immutable base request
    pub fn request(&self) -> &IterationRequest {
        &self.request
    }

    /// The policy this cursor runs under
    pub fn policy(&self) -> PaginationPolicy {
        self.policy
    }

    /// Current state
    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Whether the walk is over
    pub fn is_exhausted(&self) -> bool {
        self.state == CursorState::Exhausted
    }

    /// Number of HTTP requests issued, retries included
    pub fn requests_sent(&self) -> usize {
        self.requests_sent
    }

    /// Base arguments with `position` layered on top
    pub fn merged_params(&self, position: impl FnOnce(&mut StringMap)) -> StringMap {
        let mut params = self.request.args().clone();
        position(&mut params);
        params
    }

    /// Fetch one page worth of response.
    ///
    /// A rate limit with a reset time, under a sleeping policy, is slept off
    /// (`retry_after + 1` seconds) and retried exactly once. Anything else
    /// that fails exhausts the cursor.
    pub async fn fetch(&mut self, params: &StringMap) -> FetchOutcome {
        if self.is_exhausted() {
            return FetchOutcome::Exhausted;
        }

        let result = match self.send(params).await {
            Err(err) => match err.retry_after() {
                Some(after) if self.policy.sleep_on_rate_limit => {
                    let secs = after.saturating_add(1);
                    warn!(
                        "Rate limited on {}, sleeping {}s before retrying",
                        self.request.slug(),
                        secs
                    );
                    tokio::time::sleep(Duration::from_secs(secs)).await;
                    self.send(params).await
                }
                _ => Err(err),
            },
            ok => ok,
        };

        match result {
            Ok(envelope) => FetchOutcome::Envelope(envelope),
            Err(err) => {
                self.fail(&err);
                FetchOutcome::Exhausted
            }
        }
    }

    /// Mark the walk as finished
    pub fn exhaust(&mut self) {
        self.state = CursorState::Exhausted;
    }

    fn fail(&mut self, err: &ApiError) {
        if err.is_rate_limited() {
            warn!(
                "Stopping walk over {}: {} (sleep_on_rate_limit={})",
                self.request.slug(),
                err,
                self.policy.sleep_on_rate_limit
            );
        } else {
            error!("Stopping walk over {}: {}", self.request.slug(), err);
        }
        self.exhaust();
    }

    async fn send(&mut self, params: &StringMap) -> Result<ResponseEnvelope, ApiError> {
        if self.policy.debug {
            debug!("GET {} {:?}", self.request.slug(), params);
        }
        self.requests_sent += 1;
        self.transport.get(self.request.slug(), params).await
    }
}

impl<T> std::fmt::Debug for PaginationCursor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginationCursor")
            .field("request", &self.request)
            .field("policy", &self.policy)
            .field("state", &self.state)
            .field("requests_sent", &self.requests_sent)
            .finish_non_exhaustive()
    }
}
