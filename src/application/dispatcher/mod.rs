//! Rate-limited request dispatcher for outbound provider calls.
//!
//! Every call to an external data provider goes through [`Dispatcher::submit`]
//! under the name of the service it targets. Each service has a
//! [`ServiceRule`] bounding how many requests may start inside a sliding
//! window; requests beyond that budget wait in a priority-ordered list.
//!
//! # Rate-limit signals
//!
//! An operation reports upstream throttling by returning
//! [`Attempt::RetryAfter`]. The dispatcher sleeps for the requested delay and
//! re-admits the same logical request, keeping its original place in the
//! ordering but consuming a fresh budget slot. Any error from the operation
//! propagates unchanged.
//!
//! # Thread Safety
//!
//! The rule table is fixed at construction. Per-service admission state sits
//! behind its own [`parking_lot::Mutex`], so submitters to different services
//! never contend and no lock is held across an await point. The dispatcher is
//! cheap to clone and meant to be created once per process and shared.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use lendscore::application::dispatcher::{Attempt, Dispatcher, RuleTable, ServiceRule};
//! use lendscore::domain::{RequestId, ServiceName};
//!
//! # async fn run() -> lendscore::error::Result<()> {
//! let rules = RuleTable::new().with(
//!     "coingecko",
//!     ServiceRule::try_new(10, Duration::from_secs(1), 1)?,
//! );
//! let dispatcher = Dispatcher::new(rules);
//!
//! let price = dispatcher
//!     .submit(&ServiceName::new("coingecko"), RequestId::new(), || async {
//!         Ok(Attempt::Done(42.0_f64))
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod queue;
mod rule;
mod state;

pub use rule::{RuleTable, ServiceRule, MAX_WINDOW};

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{sleep, Instant};
use tracing::{info, warn};

use crate::domain::{RequestId, ServiceName};
use crate::error::{ConfigError, Result};

use queue::Ticket;
use state::ServiceState;

/// Outcome of one execution of a dispatched operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt<T> {
    /// The operation completed.
    Done(T),
    /// The provider throttled the call; run it again after this delay.
    RetryAfter(Duration),
}

/// Point-in-time view of one service's admission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceSnapshot {
    /// Requests admitted inside the current window.
    pub in_window: usize,
    /// Requests waiting for budget.
    pub waiting: usize,
}

struct Inner {
    services: HashMap<ServiceName, Mutex<ServiceState>>,
    sequence: AtomicU64,
}

/// Process-wide rate-limited dispatcher.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

impl Dispatcher {
    /// Create a dispatcher owning the given rules.
    #[must_use]
    pub fn new(rules: RuleTable) -> Self {
        for (service, rule) in rules.iter() {
            info!(
                service = %service,
                rate = rule.rate(),
                window_ms = rule.window().as_millis() as u64,
                priority = rule.priority(),
                "Registered service rule"
            );
        }
        let services = rules
            .into_iter()
            .map(|(name, rule)| (name, Mutex::new(ServiceState::new(rule))))
            .collect();
        Self {
            inner: Arc::new(Inner {
                services,
                sequence: AtomicU64::new(0),
            }),
        }
    }

    /// Run `op` under `service`'s rate rule at the rule's priority.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownService`] without running `op` if the
    /// service has no rule. Otherwise returns whatever error `op` returns.
    pub async fn submit<T, F, Fut>(&self, service: &ServiceName, id: RequestId, op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Attempt<T>>>,
    {
        self.submit_with_priority(service, id, None, op).await
    }

    /// Like [`submit`](Self::submit), overriding the rule's priority for this
    /// request. Lower values are admitted first.
    ///
    /// # Errors
    ///
    /// See [`submit`](Self::submit).
    pub async fn submit_with_priority<T, F, Fut>(
        &self,
        service: &ServiceName,
        id: RequestId,
        priority: Option<u32>,
        mut op: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Attempt<T>>>,
    {
        let rule_priority = self
            .inner
            .services
            .get(service)
            .map(|state| state.lock().rule.priority())
            .ok_or_else(|| ConfigError::UnknownService {
                service: service.to_string(),
            })?;

        let ticket = Ticket {
            priority: priority.unwrap_or(rule_priority),
            sequence: self.inner.sequence.fetch_add(1, Ordering::Relaxed),
            id,
        };
        let submitted = Instant::now();
        let mut retries = 0u32;

        loop {
            self.inner.admit(service, ticket.clone()).await?;

            match op().await? {
                Attempt::Done(value) => {
                    if retries > 0 {
                        info!(
                            service = %service,
                            request_id = %ticket.id,
                            retries,
                            elapsed_ms = submitted.elapsed().as_millis() as u64,
                            "Request succeeded after rate-limit retries"
                        );
                    }
                    return Ok(value);
                }
                Attempt::RetryAfter(delay) => {
                    retries += 1;
                    warn!(
                        service = %service,
                        request_id = %ticket.id,
                        retry_after_ms = delay.as_millis() as u64,
                        attempt = retries,
                        "Provider rate limit hit, re-admitting after delay"
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    /// Whether `service` has a rule.
    #[must_use]
    pub fn knows(&self, service: &ServiceName) -> bool {
        self.inner.services.contains_key(service)
    }

    /// Current admission state for `service`.
    #[must_use]
    pub fn snapshot(&self, service: &ServiceName) -> Option<ServiceSnapshot> {
        let state = self.inner.services.get(service)?;
        let mut state = state.lock();
        state.expire(Instant::now());
        Some(ServiceSnapshot {
            in_window: state.admitted.len(),
            waiting: state.waiting.len(),
        })
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut services: Vec<_> = self.inner.services.keys().map(ServiceName::as_str).collect();
        services.sort_unstable();
        f.debug_struct("Dispatcher").field("services", &services).finish()
    }
}

#[cfg(test)]
mod tests;
