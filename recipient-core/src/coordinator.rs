//! Runs domain lookups on the tokio runtime and marshals results back to the field's owner.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::DomainName;
use crate::field::ResolutionTicket;
use crate::resolver::{DomainResolver, ResolutionError};
use crate::types::Ticker;

/// A finished lookup, still carrying the ticket it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionReply {
    pub ticket: ResolutionTicket,
    pub result: Result<String, ResolutionError>,
}

/// Resolve one name, turning an elapsed `timeout` into [`ResolutionError::Timeout`].
pub async fn resolve_with_timeout(
    resolver: &dyn DomainResolver,
    domain: &DomainName,
    ticker: &Ticker,
    timeout: Duration,
) -> Result<String, ResolutionError> {
    match tokio::time::timeout(timeout, resolver.resolve(domain, ticker)).await {
        Ok(result) => result,
        Err(_) => Err(ResolutionError::Timeout {
            ms: timeout.as_millis() as u64,
        }),
    }
}

/// Keeps at most one lookup in flight; a newer ticket aborts the older lookup.
pub struct ResolutionCoordinator {
    resolver: Arc<dyn DomainResolver>,
    timeout: Duration,
    replies: UnboundedSender<ResolutionReply>,
    in_flight: Option<JoinHandle<()>>,
}

impl ResolutionCoordinator {
    pub fn new(
        resolver: Arc<dyn DomainResolver>,
        timeout: Duration,
    ) -> (Self, UnboundedReceiver<ResolutionReply>) {
        let (replies, receiver) = mpsc::unbounded_channel();
        let coordinator = Self {
            resolver,
            timeout,
            replies,
            in_flight: None,
        };
        (coordinator, receiver)
    }

    pub fn resolver_name(&self) -> &str {
        self.resolver.name()
    }

    /// Start resolving `ticket`. Must be called from within a tokio runtime.
    pub fn submit(&mut self, ticket: ResolutionTicket) {
        self.cancel();

        let resolver = Arc::clone(&self.resolver);
        let replies = self.replies.clone();
        let timeout = self.timeout;
        debug!(
            generation = ticket.generation,
            domain = %ticket.domain,
            provider = resolver.name(),
            "submitting domain resolution"
        );

        self.in_flight = Some(tokio::spawn(async move {
            let result =
                resolve_with_timeout(resolver.as_ref(), &ticket.domain, &ticket.ticker, timeout)
                    .await;
            match &result {
                Ok(_) => info!(generation = ticket.generation, domain = %ticket.domain, "domain resolved"),
                Err(err) => warn!(
                    generation = ticket.generation,
                    domain = %ticket.domain,
                    error = %err,
                    "domain resolution failed"
                ),
            }
            if replies.send(ResolutionReply { ticket, result }).is_err() {
                debug!("resolution reply receiver dropped");
            }
        }));
    }

    /// Abort the in-flight lookup, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            if !handle.is_finished() {
                debug!("aborting superseded domain resolution");
            }
            handle.abort();
        }
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight
            .as_ref()
            .map_or(true, |handle| handle.is_finished())
    }
}

impl Drop for ResolutionCoordinator {
    fn drop(&mut self) {
        self.cancel();
    }
}
