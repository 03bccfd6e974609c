//! Tests for probe cancellation

use super::*;
use std::time::Duration;

#[tokio::test]
async fn test_cancel_channel_initially_not_cancelled() {
    let (_controller, signal) = cancel_channel();

    assert!(!signal.is_cancelled());
}

#[tokio::test]
async fn test_controller_cancels_all_clones() {
    let (controller, signal) = cancel_channel();
    let signal2 = signal.clone();

    controller.cancel();

    assert!(signal.is_cancelled());
    assert!(signal2.is_cancelled());
}

#[tokio::test]
async fn test_cancelled_completes_when_controller_fires() {
    let (controller, mut signal) = cancel_channel();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        controller.cancel();
    });

    let result = tokio::time::timeout(Duration::from_secs(1), signal.cancelled()).await;

    assert!(result.is_ok(), "cancelled() should complete when triggered");
    assert!(signal.is_cancelled());
}

#[tokio::test]
async fn test_dropped_controller_counts_as_cancel() {
    let (controller, mut signal) = cancel_channel();
    drop(controller);

    let result = tokio::time::timeout(Duration::from_secs(1), signal.cancelled()).await;
    assert!(result.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_deadline_fires_signal() {
    let start = Instant::now();
    let mut signal = CancelSignal::at(start + Duration::from_secs(3));

    assert!(!signal.is_cancelled());
    signal.cancelled().await;

    assert_eq!(start.elapsed(), Duration::from_secs(3));
    assert!(signal.is_cancelled());
}

#[tokio::test(start_paused = true)]
async fn test_earlier_deadline_wins() {
    let start = Instant::now();
    let signal = CancelSignal::at(start + Duration::from_secs(10))
        .with_deadline(start + Duration::from_secs(2))
        .with_deadline(start + Duration::from_secs(5));

    assert_eq!(signal.deadline(), Some(start + Duration::from_secs(2)));
}

#[tokio::test(start_paused = true)]
async fn test_never_signal_does_not_fire() {
    let mut signal = CancelSignal::never();

    let result = tokio::time::timeout(Duration::from_secs(3600), signal.cancelled()).await;

    assert!(result.is_err(), "never() must not fire");
    assert!(!signal.is_cancelled());
}

#[tokio::test(start_paused = true)]
async fn test_expired_deadline_is_not_a_trigger() {
    let (controller, signal) = cancel_channel();
    let mut signal = signal.with_deadline(Instant::now() + Duration::from_secs(1));

    signal.cancelled().await;
    assert!(signal.is_cancelled());
    assert!(!signal.is_triggered());

    controller.cancel();
    assert!(signal.is_triggered());
}

#[tokio::test]
async fn test_wait_for_signal_registers_and_stays_pending() {
    let result = tokio::time::timeout(Duration::from_millis(50), wait_for_signal()).await;

    assert!(result.is_err(), "no signal was delivered");
}
