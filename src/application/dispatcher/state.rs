use std::collections::{BinaryHeap, VecDeque};

use tokio::time::Instant;

use super::queue::Waiter;
use super::rule::ServiceRule;

/// Admission state for one service.
///
/// Guarded by the dispatcher's per-service mutex; never held across an
/// await point.
#[derive(Debug)]
pub(super) struct ServiceState {
    pub(super) rule: ServiceRule,
    /// Admission instants still inside the sliding window, oldest first.
    pub(super) admitted: VecDeque<Instant>,
    /// Requests waiting for budget, best first.
    pub(super) waiting: BinaryHeap<Waiter>,
    /// Whether a wake-up task is already scheduled for this service.
    pub(super) timer_armed: bool,
}

impl ServiceState {
    pub(super) fn new(rule: ServiceRule) -> Self {
        Self {
            rule,
            admitted: VecDeque::with_capacity(rule.rate() as usize),
            waiting: BinaryHeap::new(),
            timer_armed: false,
        }
    }

    /// Drop admissions that have left the window.
    pub(super) fn expire(&mut self, now: Instant) {
        let window = self.rule.window();
        while let Some(&oldest) = self.admitted.front() {
            if oldest.checked_add(window).is_some_and(|release| release <= now) {
                self.admitted.pop_front();
            } else {
                break;
            }
        }
    }

    pub(super) fn has_budget(&self) -> bool {
        self.admitted.len() < self.rule.rate() as usize
    }

    /// When the oldest admission leaves the window.
    pub(super) fn next_release(&self) -> Option<Instant> {
        self.admitted
            .front()
            .and_then(|&oldest| oldest.checked_add(self.rule.window()))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn budget_tracks_window() {
        let rule = ServiceRule::try_new(2, Duration::from_secs(1), 0).unwrap();
        let mut state = ServiceState::new(rule);
        let start = Instant::now();

        state.admitted.push_back(start);
        assert!(state.has_budget());
        state.admitted.push_back(start);
        assert!(!state.has_budget());
        assert_eq!(state.next_release(), Some(start + Duration::from_secs(1)));

        state.expire(start + Duration::from_millis(999));
        assert!(!state.has_budget());

        state.expire(start + Duration::from_secs(1));
        assert!(state.has_budget());
        assert!(state.admitted.is_empty());
    }
}
