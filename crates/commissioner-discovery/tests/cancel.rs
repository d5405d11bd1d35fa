//! Scenario 5 (spec §8): cancelling a long-timeout scan returns promptly
//! with a Cancelled error instead of waiting out the full timeout.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use commissioner_discovery::discover;
use commissioner_types::ErrorKind;

#[test]
fn cancel_before_timeout_returns_promptly() {
    let delivered = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&delivered);

    let session = discover(None, Duration::from_millis(60_000), move |_agent| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    std::thread::sleep(Duration::from_millis(10));
    let start = Instant::now();
    session.cancel();

    let result = session.join();
    let elapsed = start.elapsed();

    assert!(result.is_err());
    assert_eq!(result.unwrap_err().kind, ErrorKind::Cancelled);
    // Cancellation should land well inside the 60s timeout; bounded
    // generously above the 20ms poll interval to tolerate CI jitter.
    assert!(elapsed < Duration::from_secs(2), "cancel took {elapsed:?}");
}
