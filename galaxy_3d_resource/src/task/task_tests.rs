//! Unit tests for task.rs

use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

#[test]
fn test_task_starts_pending() {
    let task = Task::new(|| Ok(()));
    assert!(!task.is_finished());
    assert!(!task.is_running());
}

#[test]
fn test_task_start_then_wait() {
    let counter = Arc::new(AtomicUsize::new(0));
    let c = counter.clone();
    let task = Task::new(move || {
        c.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    task.start();

    assert!(task.is_finished());
    assert_eq!(task.wait(), Ok(()));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn test_task_start_twice_runs_once() {
    let counter = Arc::new(AtomicUsize::new(0));
    let c = counter.clone();
    let task = Task::new(move || {
        c.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    task.start();
    task.start();

    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn test_wait_blocks_until_started_elsewhere() {
    let task: TaskHandle = Arc::new(Task::new(|| Ok(())));

    let waiter = {
        let task = task.clone();
        thread::spawn(move || task.wait())
    };

    thread::sleep(Duration::from_millis(30));
    assert!(!waiter.is_finished());

    task.start();
    assert_eq!(waiter.join().unwrap(), Ok(()));
}

#[test]
fn test_error_outcome_seen_by_every_waiter() {
    let task: TaskHandle = Arc::new(Task::new(|| {
        Err(Error::LoadFailed { name: "mesh".to_string(), reason: "bad data".to_string() })
    }));

    let waiters: Vec<_> = (0..3)
        .map(|_| {
            let task = task.clone();
            thread::spawn(move || task.wait())
        })
        .collect();

    task.start();

    for waiter in waiters {
        let outcome = waiter.join().unwrap();
        assert!(matches!(outcome, Err(Error::LoadFailed { .. })));
    }
}

#[test]
fn test_panic_in_work_is_reported() {
    let task = Task::new(|| panic!("decoder exploded"));

    task.start();

    match task.wait() {
        Err(Error::TaskPanicked(msg)) => assert!(msg.contains("decoder exploded")),
        other => panic!("unexpected outcome: {:?}", other),
    }
}
