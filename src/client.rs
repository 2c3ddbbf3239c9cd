//! API client facade
//!
//! [`ApiClient`] owns a transport and a resolved [`PaginationPolicy`], and
//! hands out one iterator per walk.

use crate::config::{ClientConfig, ExecutionContext, PaginationPolicy};
use crate::error::Result;
use crate::http::HttpTransport;
use crate::pagination::{
    CursorIdIterator, DescendingIdIterator, IterationRequest, PageStrategy, Paginator,
    SearchResultIterator,
};
use crate::transport::Transport;
use crate::types::StringMap;
use std::sync::Arc;
use tracing::info;

/// Endpoint used by [`ApiClient::search`]
pub const SEARCH_SLUG: &str = "search/tweets";

/// Endpoint used by [`ApiClient::followers`]
pub const FOLLOWERS_SLUG: &str = "followers/ids";

/// Endpoint used by [`ApiClient::friends`]
pub const FRIENDS_SLUG: &str = "friends/ids";

/// Entry point for paginated reads
#[derive(Debug, Clone)]
pub struct ApiClient<T> {
    transport: T,
    policy: PaginationPolicy,
}

impl ApiClient<Arc<HttpTransport>> {
    /// Build an HTTP-backed client from config
    pub fn from_config(config: ClientConfig, context: ExecutionContext) -> Result<Self> {
        let policy = PaginationPolicy::resolve(&config, context);
        info!(
            "Client for {} (context={:?}, sleep_on_rate_limit={})",
            config.base_url, context, policy.sleep_on_rate_limit
        );
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(Arc::new(transport), policy))
    }
}

impl<T: Transport + Clone> ApiClient<T> {
    /// Wrap an existing transport
    pub fn new(transport: T, policy: PaginationPolicy) -> Self {
        Self { transport, policy }
    }

    /// The policy every iterator from this client runs under
    pub fn policy(&self) -> PaginationPolicy {
        self.policy
    }

    /// The underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Walk a timeline endpoint from newest to oldest
    pub fn timeline<I, K, V>(&self, slug: &str, args: I) -> Result<DescendingIdIterator<T>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Ok(self.paginator(IterationRequest::new(slug, args)?))
    }

    /// Walk search results for `query`; `query` replaces any `q` in `args`
    pub fn search<I, K, V>(&self, query: &str, args: I) -> Result<SearchResultIterator<T>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut args = collect_args(args);
        args.insert("q".to_string(), query.to_string());
        Ok(self.paginator(IterationRequest::new(SEARCH_SLUG, args)?))
    }

    /// Walk the follower ID list
    pub fn followers<I, K, V>(&self, args: I) -> Result<CursorIdIterator<T>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Ok(self.paginator(IterationRequest::new(FOLLOWERS_SLUG, args)?))
    }

    /// Walk the friend (following) ID list
    pub fn friends<I, K, V>(&self, args: I) -> Result<CursorIdIterator<T>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Ok(self.paginator(IterationRequest::new(FRIENDS_SLUG, args)?))
    }

    fn paginator<S: PageStrategy>(&self, request: IterationRequest) -> Paginator<S, T> {
        Paginator::new(self.transport.clone(), request, self.policy)
    }
}

fn collect_args<I, K, V>(args: I) -> StringMap
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    args.into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
