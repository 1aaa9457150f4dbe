//! Rate and ordering behaviour of the request dispatcher under real timers.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use parking_lot::Mutex;
use tokio::time::Instant;

use lendscore::application::dispatcher::{Attempt, Dispatcher};
use lendscore::domain::{RequestId, ServiceName};
use lendscore::testkit::config::single_service;

/// Timer and scheduling slack tolerated on each gap.
const SLACK: Duration = Duration::from_millis(50);

async fn run_concurrently(dispatcher: &Dispatcher, service: &str, n: usize) -> Vec<Instant> {
    let service = ServiceName::new(service);
    let stamps = Arc::new(Mutex::new(Vec::with_capacity(n)));

    let requests = (0..n).map(|_| {
        dispatcher.submit(&service, RequestId::new(), || {
            let stamps = Arc::clone(&stamps);
            async move {
                stamps.lock().push(Instant::now());
                Ok(Attempt::Done(()))
            }
        })
    });
    for outcome in join_all(requests).await {
        outcome.unwrap();
    }

    let mut stamps = stamps.lock().clone();
    stamps.sort();
    stamps
}

#[tokio::test]
async fn one_per_window_spaces_requests_by_window() {
    let dispatcher = Dispatcher::new(single_service("svc", 1, 1_000));

    let stamps = run_concurrently(&dispatcher, "svc", 5).await;

    assert_eq!(stamps.len(), 5);
    for pair in stamps.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(
            gap + SLACK >= Duration::from_secs(1),
            "requests only {gap:?} apart"
        );
    }
}

#[tokio::test]
async fn budget_is_never_exceeded_in_any_window() {
    let rate = 5;
    let window = Duration::from_millis(200);
    let dispatcher = Dispatcher::new(single_service("svc", rate, 200));

    let stamps = run_concurrently(&dispatcher, "svc", 20).await;

    // The (i + rate)-th start must fall a full window after the i-th.
    for i in 0..stamps.len() - rate as usize {
        let gap = stamps[i + rate as usize] - stamps[i];
        assert!(gap + SLACK >= window, "window overrun at {i}: {gap:?}");
    }
}

#[tokio::test]
async fn rate_limit_retry_resolves_once_after_delay() {
    let dispatcher = Dispatcher::new(single_service("svc", 10, 1_000));
    let calls = Arc::new(Mutex::new(0u32));
    let start = Instant::now();

    let value = dispatcher
        .submit(&ServiceName::new("svc"), RequestId::new(), || {
            let calls = Arc::clone(&calls);
            async move {
                let mut calls = calls.lock();
                *calls += 1;
                if *calls == 1 {
                    Ok(Attempt::RetryAfter(Duration::from_millis(200)))
                } else {
                    Ok(Attempt::Done(*calls))
                }
            }
        })
        .await
        .unwrap();

    assert!(start.elapsed() >= Duration::from_millis(200));
    assert_eq!(value, 2);
    assert_eq!(*calls.lock(), 2);
}
