use std::cmp::Ordering;
use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, trace};

use crate::domain::{RequestId, ServiceName};
use crate::error::{ConfigError, Error, Result};

use super::Inner;

/// A request waiting for rate budget.
///
/// Ordered so that a `BinaryHeap` pops the lowest priority value first and,
/// within a priority, the earliest arrival.
#[derive(Debug)]
pub(super) struct Waiter {
    pub(super) priority: u32,
    pub(super) sequence: u64,
    pub(super) id: RequestId,
    pub(super) admit: oneshot::Sender<()>,
}

impl PartialEq for Waiter {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}

impl Eq for Waiter {}

impl PartialOrd for Waiter {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Waiter {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Identity of a logical request across re-admissions.
#[derive(Debug, Clone)]
pub(super) struct Ticket {
    pub(super) priority: u32,
    pub(super) sequence: u64,
    pub(super) id: RequestId,
}

impl Inner {
    /// Wait until the service has budget for this ticket.
    pub(super) async fn admit(self: &Arc<Self>, service: &ServiceName, ticket: Ticket) -> Result<()> {
        let state = self
            .services
            .get(service)
            .ok_or_else(|| ConfigError::UnknownService {
                service: service.to_string(),
            })?;

        let (tx, rx) = oneshot::channel();
        let request = ticket.id.to_string();
        state.lock().waiting.push(Waiter {
            priority: ticket.priority,
            sequence: ticket.sequence,
            id: ticket.id,
            admit: tx,
        });

        self.pump(service, false);

        rx.await.map_err(|_| Error::DispatcherClosed { request })
    }

    /// Release as many waiters as the budget allows, then make sure a
    /// wake-up is scheduled if anyone is still waiting.
    pub(super) fn pump(self: &Arc<Self>, service: &ServiceName, from_timer: bool) {
        let Some(state) = self.services.get(service) else {
            return;
        };
        let mut state = state.lock();
        if from_timer {
            state.timer_armed = false;
        }

        let now = Instant::now();
        state.expire(now);

        while state.has_budget() {
            let Some(waiter) = state.waiting.pop() else {
                break;
            };
            state.admitted.push_back(now);
            if waiter.admit.send(()).is_err() {
                // Caller gave up while waiting; hand the slot back.
                state.admitted.pop_back();
                debug!(
                    service = %service,
                    request_id = %waiter.id,
                    "Dropping abandoned request"
                );
                continue;
            }
            trace!(
                service = %service,
                request_id = %waiter.id,
                priority = waiter.priority,
                in_window = state.admitted.len(),
                "Request admitted"
            );
        }

        if state.waiting.is_empty() || state.timer_armed {
            return;
        }
        let Some(wake_at) = state.next_release() else {
            return;
        };
        state.timer_armed = true;
        debug!(
            service = %service,
            waiting = state.waiting.len(),
            wait_ms = wake_at.saturating_duration_since(now).as_millis() as u64,
            "Rate budget exhausted, scheduling release"
        );
        drop(state);

        let inner = Arc::clone(self);
        let service = service.clone();
        tokio::spawn(async move {
            sleep_until(wake_at).await;
            inner.pump(&service, true);
        });
    }
}
