use gatehouse_ratelimit::prelude::*;
use std::sync::Arc;
use std::time::Duration;

fn limiter_with_clock() -> (RateLimiter, ManualClock, Arc<MemoryCounterStore>) {
    let clock = ManualClock::new();
    let store = Arc::new(MemoryCounterStore::new());
    let limiter = RateLimiter::new(store.clone(), Arc::new(clock.clone()));
    (limiter, clock, store)
}

#[tokio::test]
async fn admits_exactly_limit_calls_per_window() {
    let (limiter, _clock, _) = limiter_with_clock();
    let key = RateLimitKey::new("ratting-1", "client-a");
    let window = Interval::Minute.duration();

    for expected_remaining in (0..5).rev() {
        let decision = limiter.check(&key, 5, window).await.unwrap();
        assert_eq!(
            decision,
            Decision::Allowed {
                remaining: expected_remaining
            }
        );
    }

    let denied = limiter.check(&key, 5, window).await.unwrap();
    assert!(!denied.is_allowed());
    assert_eq!(denied.retry_after_secs(), Some(60));
}

#[tokio::test]
async fn retry_after_shrinks_as_window_ages() {
    let (limiter, clock, _) = limiter_with_clock();
    let key = RateLimitKey::new("ratting-1", "client-a");
    let window = Interval::Minute.duration();

    limiter.check(&key, 1, window).await.unwrap();
    clock.advance(Duration::from_secs(45));
    let decision = limiter.check(&key, 1, window).await.unwrap();
    assert_eq!(
        decision,
        Decision::Denied {
            retry_after: Duration::from_secs(15)
        }
    );
}

#[tokio::test]
async fn counter_resets_once_window_elapses() {
    let (limiter, clock, store) = limiter_with_clock();
    let key = RateLimitKey::new("ratting-1", "client-a");
    let window = Interval::Second.duration();

    assert!(limiter.check(&key, 2, window).await.unwrap().is_allowed());
    assert!(limiter.check(&key, 2, window).await.unwrap().is_allowed());
    assert!(!limiter.check(&key, 2, window).await.unwrap().is_allowed());

    clock.advance(window);
    let decision = limiter.check(&key, 2, window).await.unwrap();
    assert_eq!(decision, Decision::Allowed { remaining: 1 });
    let snapshot = store.peek(&key).await.unwrap().unwrap();
    assert_eq!(snapshot.count, 1);
}

#[tokio::test]
async fn clock_stepping_back_does_not_reset_the_window() {
    let (limiter, clock, store) = limiter_with_clock();
    let key = RateLimitKey::new("ratting-1", "client-a");
    let window = Interval::Minute.duration();

    // Leave room to step back before the window start.
    clock.advance(Duration::from_secs(120));
    assert!(limiter.check(&key, 3, window).await.unwrap().is_allowed());
    let opened = store.peek(&key).await.unwrap().unwrap().window_start;

    clock.advance(Duration::from_secs(10));
    assert!(limiter.check(&key, 3, window).await.unwrap().is_allowed());

    clock.rewind(Duration::from_secs(40));
    assert!(limiter.check(&key, 3, window).await.unwrap().is_allowed());
    let snapshot = store.peek(&key).await.unwrap().unwrap();
    assert_eq!(snapshot.count, 3);
    assert_eq!(snapshot.window_start, opened);

    let denied = limiter.check(&key, 3, window).await.unwrap();
    assert_eq!(
        denied,
        Decision::Denied {
            retry_after: Duration::from_secs(90)
        }
    );
    assert_eq!(store.peek(&key).await.unwrap().unwrap().count, 4);
}

#[tokio::test]
async fn keys_are_isolated() {
    let (limiter, _clock, store) = limiter_with_clock();
    let window = Interval::Hour.duration();
    let a = RateLimitKey::new("ratting-1", "client-a");
    let b = RateLimitKey::new("ratting-1", "client-b");
    let other_policy = RateLimitKey::new("ratting-2", "client-a");

    assert!(limiter.check(&a, 1, window).await.unwrap().is_allowed());
    assert!(!limiter.check(&a, 1, window).await.unwrap().is_allowed());
    assert!(limiter.check(&b, 1, window).await.unwrap().is_allowed());
    assert!(limiter.check(&other_policy, 1, window).await.unwrap().is_allowed());
    assert_eq!(store.len(), 3);
}

#[tokio::test]
async fn zero_limit_is_rejected() {
    let limiter = RateLimiter::in_memory();
    let key = RateLimitKey::new("ratting-1", "client-a");
    let err = limiter
        .check(&key, 0, Interval::Second.duration())
        .await
        .unwrap_err();
    assert_eq!(err.into_inner().code.0, "CONFIG.INVALID");
}

#[tokio::test]
async fn purge_drops_only_finished_windows() {
    let (limiter, clock, store) = limiter_with_clock();
    let short = RateLimitKey::new("per-second", "client-a");
    let long = RateLimitKey::new("per-day", "client-a");

    limiter.check(&short, 10, Interval::Second.duration()).await.unwrap();
    limiter.check(&long, 10, Interval::Day.duration()).await.unwrap();
    clock.advance(Duration::from_secs(2));

    assert_eq!(limiter.purge_expired().await.unwrap(), 1);
    assert!(store.peek(&short).await.unwrap().is_none());
    assert!(store.peek(&long).await.unwrap().is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_callers_never_exceed_limit() {
    let limiter = RateLimiter::in_memory();
    let key = RateLimitKey::new("ratting-1", "shared-client");
    let limit = 25;

    let mut handles = Vec::new();
    for _ in 0..200 {
        let limiter = limiter.clone();
        let key = key.clone();
        handles.push(tokio::spawn(async move {
            limiter
                .check(&key, limit, Interval::Hour.duration())
                .await
                .unwrap()
                .is_allowed()
        }));
    }

    let mut admitted = 0;
    for handle in handles {
        if handle.await.unwrap() {
            admitted += 1;
        }
    }
    assert_eq!(admitted, limit);
}
