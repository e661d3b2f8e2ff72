/*!
# Galaxy 3D Resource

Reference-counted resource lifecycle management for the Galaxy 3D engine.

Resources are registered under unique names and loaded lazily: the first
reference to a name loads it, releasing the last reference frees it.
Resources that support it are loaded on a background worker pool.

## Architecture

- **Resource**: load/free capability implemented by each resource type
- **ResourceManager**: name registry and per-name reference counts
- **ResourceHandle**: RAII reference keeping a resource loaded while alive
- **ThreadPool / Task**: FIFO worker pool running asynchronous loads
- **Engine**: process-wide singleton owning the resource manager and logger
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod resource;
pub mod task;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }

    // Background work sub-module
    pub mod task {
        pub use crate::task::*;
    }
}
