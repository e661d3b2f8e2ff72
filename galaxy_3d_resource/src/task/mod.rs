//! Background work scheduling
//!
//! A fixed-size worker pool executing deferred work in submission order.
//! The resource manager uses it to run `load()` for async-capable resources.

mod task;
mod thread_pool;

pub use task::{Task, TaskHandle};
pub(crate) use task::panic_message;
pub use thread_pool::{ThreadPool, ThreadPoolConfig};
