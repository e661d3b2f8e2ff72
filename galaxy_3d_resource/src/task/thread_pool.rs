/// Fixed-size worker pool.
///
/// Tasks are queued on a single FIFO channel shared by all workers; whichever
/// worker becomes free first dequeues the oldest task. After `shutdown()`,
/// `add_task` fails with `PoolShutdown`, already-queued tasks still run, and
/// the workers exit once the queue is drained. Dropping the pool joins them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use crossbeam_channel::{Receiver, Sender};
use crate::error::{Error, Result};
use super::task::{Task, TaskHandle};

/// Thread pool configuration
#[derive(Debug, Clone)]
pub struct ThreadPoolConfig {
    /// Number of worker threads (0 = one per logical CPU)
    pub worker_count: usize,
    /// Worker thread name prefix; workers are named `{thread_name}-{index}`
    pub thread_name: String,
}

impl Default for ThreadPoolConfig {
    fn default() -> Self {
        Self {
            worker_count: 4,
            thread_name: "galaxy3d-worker".to_string(),
        }
    }
}

pub struct ThreadPool {
    sender: Mutex<Option<Sender<TaskHandle>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    worker_count: usize,
    queued: Arc<AtomicUsize>,
}

impl ThreadPool {
    /// Spawn the workers described by `config`
    ///
    /// # Errors
    ///
    /// Returns `InitializationFailed` if a worker thread cannot be spawned.
    /// Workers spawned before the failure are shut down and joined.
    pub fn new(config: ThreadPoolConfig) -> Result<Self> {
        let worker_count = if config.worker_count > 0 {
            config.worker_count
        } else {
            num_cpus::get()
        };

        let (sender, receiver) = crossbeam_channel::unbounded::<TaskHandle>();
        let queued = Arc::new(AtomicUsize::new(0));
        let mut workers = Vec::with_capacity(worker_count);

        for index in 0..worker_count {
            let name = format!("{}-{}", config.thread_name, index);
            let spawned = thread::Builder::new()
                .name(name.clone())
                .spawn({
                    let receiver = receiver.clone();
                    let queued = queued.clone();
                    move || worker_loop(receiver, queued)
                });

            match spawned {
                Ok(handle) => workers.push(handle),
                Err(err) => {
                    drop(sender);
                    for worker in workers {
                        let _ = worker.join();
                    }
                    return Err(Error::InitializationFailed(
                        format!("Failed to spawn worker '{}': {}", name, err)
                    ));
                }
            }
        }

        crate::engine_debug!("galaxy3d::ThreadPool", "Started {} workers", worker_count);

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
            worker_count,
            queued,
        })
    }

    /// Schedule `work` on the next free worker
    ///
    /// # Errors
    ///
    /// Returns `PoolShutdown` once `shutdown()` has been called.
    pub fn add_task<F>(&self, work: F) -> Result<TaskHandle>
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        let sender = self.sender.lock()
            .map_err(|_| Error::LockPoisoned("ThreadPool sender".to_string()))?;

        let sender = sender.as_ref().ok_or(Error::PoolShutdown)?;

        let task: TaskHandle = Arc::new(Task::new(work));
        self.queued.fetch_add(1, Ordering::SeqCst);
        if sender.send(task.clone()).is_err() {
            self.queued.fetch_sub(1, Ordering::SeqCst);
            return Err(Error::PoolShutdown);
        }

        Ok(task)
    }

    /// Stop accepting work. Queued and running tasks still complete.
    pub fn shutdown(&self) {
        let previous = self.sender.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if previous.is_some() {
            crate::engine_debug!("galaxy3d::ThreadPool", "Shutting down {} workers", self.worker_count);
        }
    }

    pub fn is_shutdown(&self) -> bool {
        self.sender.lock().unwrap_or_else(PoisonError::into_inner).is_none()
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Number of tasks submitted but not yet picked up by a worker
    pub fn pending_count(&self) -> usize {
        self.queued.load(Ordering::SeqCst)
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();

        let current = thread::current().id();
        let workers = std::mem::take(
            &mut *self.workers.lock().unwrap_or_else(PoisonError::into_inner)
        );
        for worker in workers {
            // A task holding the last reference drops the pool on its own worker
            if worker.thread().id() == current {
                continue;
            }
            let _ = worker.join();
        }
    }
}

fn worker_loop(receiver: Receiver<TaskHandle>, queued: Arc<AtomicUsize>) {
    for task in receiver.iter() {
        queued.fetch_sub(1, Ordering::SeqCst);
        task.start();
    }
}

#[cfg(test)]
#[path = "thread_pool_tests.rs"]
mod tests;
