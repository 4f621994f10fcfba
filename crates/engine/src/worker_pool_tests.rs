use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::*;

#[tokio::test]
async fn submitted_tasks_run_and_are_counted() {
    let pool = WorkerPool::new(4, Duration::from_secs(1));
    let counter = Arc::new(AtomicUsize::new(0));
    for _ in 0..5 {
        let counter = counter.clone();
        pool.submit(async move {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .expect("submit");
    }
    pool.drain().await;
    assert_eq!(counter.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn submit_blocks_when_pool_is_full() {
    let pool = Arc::new(WorkerPool::new(1, Duration::from_secs(5)));
    let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
    let release_rx = Arc::new(tokio::sync::Mutex::new(Some(release_rx)));

    pool.submit(async move {
        let rx = release_rx.lock().await.take().expect("single consumer");
        let _ = rx.await;
    })
    .await
    .expect("submit");

    let pool2 = pool.clone();
    let second = tokio::spawn(async move {
        pool2
            .submit(async {
                // No-op once scheduled.
            })
            .await
            .expect("submit");
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!second.is_finished());

    release_tx.send(()).expect("release first task");
    second.await.expect("second task submitted");
}

#[tokio::test]
async fn task_exceeding_lifetime_is_timed_out_not_leaked() {
    let pool = WorkerPool::new(2, Duration::from_millis(20));
    pool.submit(async {
        tokio::time::sleep(Duration::from_secs(5)).await;
    })
    .await
    .expect("submit");
    pool.drain().await;
}
