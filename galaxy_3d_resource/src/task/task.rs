/// A unit of deferred work with blocking completion.
///
/// A task is created by `ThreadPool::add_task`, started exactly once by a
/// worker thread, and can be waited on from any number of threads. The
/// outcome of the work is kept so every waiter observes the same result.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use crate::error::{Error, Result};

type Work = Box<dyn FnOnce() -> Result<()> + Send + 'static>;

/// Shared handle to an in-flight or completed task
pub type TaskHandle = Arc<Task>;

enum TaskState {
    Pending,
    Running,
    Finished(Result<()>),
}

pub struct Task {
    work: Mutex<Option<Work>>,
    state: Mutex<TaskState>,
    finished: Condvar,
}

impl Task {
    pub(crate) fn new<F>(work: F) -> Self
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        Self {
            work: Mutex::new(Some(Box::new(work))),
            state: Mutex::new(TaskState::Pending),
            finished: Condvar::new(),
        }
    }

    /// Run the work on the current thread and publish its outcome.
    ///
    /// Invoked by pool workers. A second call is a no-op.
    pub(crate) fn start(&self) {
        let work = self.work.lock().unwrap_or_else(PoisonError::into_inner).take();
        let Some(work) = work else {
            return;
        };

        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = TaskState::Running;

        let outcome = match panic::catch_unwind(AssertUnwindSafe(work)) {
            Ok(result) => result,
            Err(payload) => Err(Error::TaskPanicked(panic_message(payload.as_ref()))),
        };

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state = TaskState::Finished(outcome);
        self.finished.notify_all();
    }

    /// Block until the work has run, then return its outcome.
    ///
    /// There is no timeout.
    pub fn wait(&self) -> Result<()> {
        let state = self.state.lock()
            .map_err(|_| Error::LockPoisoned("Task state".to_string()))?;

        let state = self.finished
            .wait_while(state, |s| !matches!(s, TaskState::Finished(_)))
            .map_err(|_| Error::LockPoisoned("Task state".to_string()))?;

        match &*state {
            TaskState::Finished(outcome) => outcome.clone(),
            TaskState::Pending | TaskState::Running => unreachable!("wait_while returned early"),
        }
    }

    /// Whether the work has completed (successfully or not)
    pub fn is_finished(&self) -> bool {
        matches!(
            *self.state.lock().unwrap_or_else(PoisonError::into_inner),
            TaskState::Finished(_)
        )
    }

    /// Whether a worker is currently executing the work
    pub fn is_running(&self) -> bool {
        matches!(
            *self.state.lock().unwrap_or_else(PoisonError::into_inner),
            TaskState::Running
        )
    }
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
