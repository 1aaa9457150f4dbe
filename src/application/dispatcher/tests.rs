use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use super::*;
use crate::error::Error;

fn rule(rate: u32, window_ms: u64, priority: u32) -> ServiceRule {
    ServiceRule::try_new(rate, Duration::from_millis(window_ms), priority).unwrap()
}

fn dispatcher(service: &str, rule: ServiceRule) -> Dispatcher {
    Dispatcher::new(RuleTable::new().with(service, rule))
}

// --- Rule tests ---

#[test]
fn rule_rejects_zero_rate() {
    let err = ServiceRule::try_new(0, Duration::from_secs(1), 0).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { field: "rate", .. }));
}

#[test]
fn rule_rejects_zero_window() {
    let err = ServiceRule::try_new(1, Duration::ZERO, 0).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidValue {
            field: "window_secs",
            ..
        }
    ));
}

// --- Submit tests ---

#[tokio::test]
async fn submit_returns_operation_value() {
    let dispatcher = dispatcher("svc", rule(5, 1000, 1));
    let value = dispatcher
        .submit(&ServiceName::new("svc"), RequestId::new(), || async {
            Ok(Attempt::Done(7u32))
        })
        .await
        .unwrap();
    assert_eq!(value, 7);
}

#[tokio::test]
async fn unknown_service_fails_without_running() {
    let dispatcher = dispatcher("svc", rule(5, 1000, 1));
    let calls = AtomicUsize::new(0);

    let result = dispatcher
        .submit(&ServiceName::new("other"), RequestId::new(), || {
            calls.fetch_add(1, AtomicOrdering::SeqCst);
            async { Ok(Attempt::Done(())) }
        })
        .await;

    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::UnknownService { ref service })) if service == "other"
    ));
    assert_eq!(calls.load(AtomicOrdering::SeqCst), 0);
}

#[tokio::test]
async fn operation_errors_propagate_unchanged() {
    let dispatcher = dispatcher("svc", rule(5, 1000, 1));
    let calls = AtomicUsize::new(0);

    let result: Result<()> = dispatcher
        .submit(&ServiceName::new("svc"), RequestId::new(), || {
            calls.fetch_add(1, AtomicOrdering::SeqCst);
            async { Err(Error::Provider("boom".into())) }
        })
        .await;

    assert!(matches!(result, Err(Error::Provider(ref m)) if m == "boom"));
    assert_eq!(calls.load(AtomicOrdering::SeqCst), 1);
}

#[tokio::test]
async fn burst_within_budget_is_not_delayed() {
    let dispatcher = dispatcher("svc", rule(3, 5_000, 1));
    let service = ServiceName::new("svc");
    let start = Instant::now();

    for _ in 0..3 {
        dispatcher
            .submit(&service, RequestId::new(), || async { Ok(Attempt::Done(())) })
            .await
            .unwrap();
    }

    assert!(start.elapsed() < Duration::from_millis(500));
    let snapshot = dispatcher.snapshot(&service).unwrap();
    assert_eq!(snapshot.in_window, 3);
    assert_eq!(snapshot.waiting, 0);
}

#[tokio::test]
async fn rate_limit_retry_is_transparent() {
    let dispatcher = dispatcher("svc", rule(10, 1000, 1));
    let calls = AtomicUsize::new(0);
    let start = Instant::now();

    let value = dispatcher
        .submit(&ServiceName::new("svc"), RequestId::new(), || {
            let call = calls.fetch_add(1, AtomicOrdering::SeqCst);
            async move {
                if call == 0 {
                    Ok(Attempt::RetryAfter(Duration::from_millis(200)))
                } else {
                    Ok(Attempt::Done("ok"))
                }
            }
        })
        .await
        .unwrap();

    assert_eq!(value, "ok");
    assert_eq!(calls.load(AtomicOrdering::SeqCst), 2);
    assert!(start.elapsed() >= Duration::from_millis(200));
    // The retry consumed its own budget slot.
    assert_eq!(
        dispatcher.snapshot(&ServiceName::new("svc")).unwrap().in_window,
        2
    );
}

#[tokio::test]
async fn waiting_requests_drain_by_priority() {
    let dispatcher = dispatcher("svc", rule(1, 300, 5));
    let service = ServiceName::new("svc");
    let order = Arc::new(Mutex::new(Vec::new()));

    // Occupy the only slot in the window.
    dispatcher
        .submit(&service, RequestId::from("blocker"), || async {
            Ok(Attempt::Done(()))
        })
        .await
        .unwrap();

    let mut handles = Vec::new();
    for (name, priority) in [("low", 9), ("high", 1), ("mid", 5)] {
        let dispatcher = dispatcher.clone();
        let service = service.clone();
        let order = Arc::clone(&order);
        handles.push(tokio::spawn(async move {
            dispatcher
                .submit_with_priority(&service, RequestId::from(name), Some(priority), || {
                    let order = Arc::clone(&order);
                    async move {
                        order.lock().push(name);
                        Ok(Attempt::Done(()))
                    }
                })
                .await
        }));
        // Make arrival order deterministic.
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(dispatcher.snapshot(&service).unwrap().waiting, 3);

    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    assert_eq!(*order.lock(), vec!["high", "mid", "low"]);
}

#[tokio::test]
async fn equal_priority_is_fifo() {
    let dispatcher = dispatcher("svc", rule(1, 200, 1));
    let service = ServiceName::new("svc");
    let order = Arc::new(Mutex::new(Vec::new()));

    dispatcher
        .submit(&service, RequestId::new(), || async { Ok(Attempt::Done(())) })
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..3u32 {
        let dispatcher = dispatcher.clone();
        let service = service.clone();
        let order = Arc::clone(&order);
        handles.push(tokio::spawn(async move {
            dispatcher
                .submit(&service, RequestId::new(), || {
                    let order = Arc::clone(&order);
                    async move {
                        order.lock().push(i);
                        Ok(Attempt::Done(()))
                    }
                })
                .await
        }));
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    assert_eq!(*order.lock(), vec![0, 1, 2]);
}

#[tokio::test]
async fn abandoned_waiter_does_not_consume_budget() {
    let dispatcher = dispatcher("svc", rule(1, 200, 1));
    let service = ServiceName::new("svc");

    dispatcher
        .submit(&service, RequestId::new(), || async { Ok(Attempt::Done(())) })
        .await
        .unwrap();

    // A caller with a deadline gives up while still waiting.
    let abandoned = tokio::time::timeout(
        Duration::from_millis(20),
        dispatcher.submit(&service, RequestId::from("abandoned"), || async {
            Ok(Attempt::Done(()))
        }),
    )
    .await;
    assert!(abandoned.is_err());

    let start = Instant::now();
    dispatcher
        .submit(&service, RequestId::from("survivor"), || async {
            Ok(Attempt::Done(()))
        })
        .await
        .unwrap();

    // Survivor is admitted at the first release, not one window later.
    assert!(start.elapsed() < Duration::from_millis(350));
    let snapshot = dispatcher.snapshot(&service).unwrap();
    assert_eq!(snapshot.waiting, 0);
    assert_eq!(snapshot.in_window, 1);
}

#[tokio::test]
async fn services_are_limited_independently() {
    let rules = RuleTable::new()
        .with("slow", rule(1, 5_000, 1))
        .with("fast", rule(10, 1_000, 1));
    let dispatcher = Dispatcher::new(rules);

    dispatcher
        .submit(&ServiceName::new("slow"), RequestId::new(), || async {
            Ok(Attempt::Done(()))
        })
        .await
        .unwrap();

    let start = Instant::now();
    dispatcher
        .submit(&ServiceName::new("fast"), RequestId::new(), || async {
            Ok(Attempt::Done(()))
        })
        .await
        .unwrap();
    assert!(start.elapsed() < Duration::from_millis(500));
}
