//! Unit tests for thread_pool.rs

use super::*;
use std::sync::mpsc;
use std::time::Duration;

fn pool(workers: usize) -> ThreadPool {
    ThreadPool::new(ThreadPoolConfig {
        worker_count: workers,
        thread_name: "test-worker".to_string(),
    }).unwrap()
}

#[test]
fn test_default_config() {
    let config = ThreadPoolConfig::default();
    assert_eq!(config.worker_count, 4);
    assert_eq!(config.thread_name, "galaxy3d-worker");
}

#[test]
fn test_zero_workers_uses_cpu_count() {
    let pool = pool(0);
    assert_eq!(pool.worker_count(), num_cpus::get());
}

#[test]
fn test_task_runs_on_worker_thread() {
    let pool = pool(2);
    let (tx, rx) = mpsc::channel();

    let task = pool.add_task(move || {
        let name = thread::current().name().map(str::to_string);
        tx.send(name).unwrap();
        Ok(())
    }).unwrap();

    task.wait().unwrap();
    let name = rx.recv().unwrap().unwrap();
    assert!(name.starts_with("test-worker-"));
}

#[test]
fn test_single_worker_runs_tasks_in_submission_order() {
    let pool = pool(1);
    let order = Arc::new(Mutex::new(Vec::new()));

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let order = order.clone();
            pool.add_task(move || {
                order.lock().unwrap().push(i);
                Ok(())
            }).unwrap()
        })
        .collect();

    for task in &tasks {
        task.wait().unwrap();
    }

    assert_eq!(*order.lock().unwrap(), (0..16).collect::<Vec<_>>());
}

#[test]
fn test_add_task_after_shutdown_fails() {
    let pool = pool(1);
    pool.shutdown();

    assert!(pool.is_shutdown());
    assert_eq!(pool.add_task(|| Ok(())).err(), Some(Error::PoolShutdown));
}

#[test]
fn test_queued_tasks_complete_after_shutdown() {
    let pool = pool(1);
    let (release_tx, release_rx) = mpsc::channel::<()>();

    let blocker = pool.add_task(move || {
        release_rx.recv().unwrap();
        Ok(())
    }).unwrap();
    let queued = pool.add_task(|| Ok(())).unwrap();

    pool.shutdown();
    release_tx.send(()).unwrap();

    assert_eq!(blocker.wait(), Ok(()));
    assert_eq!(queued.wait(), Ok(()));
}

#[test]
fn test_pending_count_tracks_queue() {
    let pool = pool(1);
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let (started_tx, started_rx) = mpsc::channel::<()>();

    let blocker = pool.add_task(move || {
        started_tx.send(()).unwrap();
        release_rx.recv().unwrap();
        Ok(())
    }).unwrap();
    started_rx.recv().unwrap();

    let queued = pool.add_task(|| Ok(())).unwrap();
    assert_eq!(pool.pending_count(), 1);

    release_tx.send(()).unwrap();
    blocker.wait().unwrap();
    queued.wait().unwrap();
    assert_eq!(pool.pending_count(), 0);
}

#[test]
fn test_drop_joins_workers_after_draining() {
    let done = Arc::new(AtomicUsize::new(0));
    {
        let pool = pool(2);
        for _ in 0..8 {
            let done = done.clone();
            pool.add_task(move || {
                thread::sleep(Duration::from_millis(5));
                done.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }).unwrap();
        }
    }
    assert_eq!(done.load(Ordering::SeqCst), 8);
}

#[test]
fn test_task_error_is_returned_by_wait() {
    let pool = pool(1);
    let task = pool.add_task(|| Err(Error::Io("disk gone".to_string()))).unwrap();
    assert_eq!(task.wait(), Err(Error::Io("disk gone".to_string())));
}
