//! Tests for runtime adapters

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use prometheus_resource_core::runtime::{PeriodicTask, TokioSpawner};

#[tokio::test(start_paused = true)]
async fn test_periodic_task_first_tick_after_one_period() {
    let spawner = TokioSpawner::try_current().unwrap();
    let ticks = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&ticks);
    let task = PeriodicTask::spawn(&spawner, "heartbeat", Duration::from_millis(250), move || {
        counter.fetch_add(1, Ordering::SeqCst);
        ControlFlow::Continue(())
    });
    assert_eq!(task.name(), "heartbeat");

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(ticks.load(Ordering::SeqCst), 0);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(ticks.load(Ordering::SeqCst), 1);

    task.stop();
    task.stop();
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(ticks.load(Ordering::SeqCst), 1);
}
