use std::time::Duration;

use tempfile::tempdir;
use tokio::time::timeout;

use super::*;

#[tokio::test]
async fn file_write_is_forwarded_by_watching_parent_directory() {
    let dir = tempdir().expect("tempdir");
    let file_path = dir.path().join("a.log");
    std::fs::write(&file_path, "").expect("create file");

    let (watcher, mut rx) = Watcher::new(16).expect("construct watcher");
    watcher.add(&file_path).expect("add file");

    std::fs::write(&file_path, "hello\n").expect("append");

    let event = timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("no timeout")
        .expect("channel open");
    assert_eq!(event.path, file_path);
    assert!(!event.is_dir);
}

#[tokio::test]
async fn directory_registration_reports_the_directory_as_owning_path() {
    let dir = tempdir().expect("tempdir");
    let (watcher, mut rx) = Watcher::new(16).expect("construct watcher");
    watcher.add(dir.path()).expect("add dir");

    std::fs::write(dir.path().join("b.log"), "x\n").expect("create child");

    let event = timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("no timeout")
        .expect("channel open");
    assert_eq!(event.path, dir.path());
    assert!(event.is_dir);
}

#[tokio::test]
async fn file_removal_is_not_forwarded() {
    let dir = tempdir().expect("tempdir");
    let file_path = dir.path().join("a.log");
    std::fs::write(&file_path, "").expect("create file");

    let (watcher, mut rx) = Watcher::new(16).expect("construct watcher");
    watcher.add(&file_path).expect("add file");

    std::fs::remove_file(&file_path).expect("remove file");

    // No event should surface for the removal itself.
    assert!(timeout(Duration::from_millis(300), rx.recv()).await.is_err());

    // Recreating the file still reaches the channel, proving it's alive
    // and that only the Remove event was dropped, not the registration.
    std::fs::write(&file_path, "hello\n").expect("recreate file");
    let event = timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("no timeout")
        .expect("channel open");
    assert_eq!(event.changed_filename, file_path);
}

#[tokio::test]
async fn close_is_idempotent_and_ends_the_channel() {
    let (watcher, mut rx) = Watcher::new(4).expect("construct watcher");
    watcher.close();
    watcher.close();
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn operations_after_close_return_closed_error() {
    let dir = tempdir().expect("tempdir");
    let (watcher, _rx) = Watcher::new(4).expect("construct watcher");
    watcher.close();
    let err = watcher.add(dir.path());
    assert!(matches!(err, Err(WatchError::Closed)));
}
