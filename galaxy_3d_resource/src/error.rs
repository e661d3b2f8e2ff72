//! Error types for the Galaxy3D resource subsystem
//!
//! This module defines the error types used throughout the resource manager,
//! its handles, the task pool, and the engine singleton.

use std::fmt;

/// Result type for Galaxy3D resource operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D resource errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No resource is registered under this name
    NotFound(String),

    /// A resource is already registered under this name
    DuplicateName(String),

    /// Incrementing would exceed the maximum reference count
    RefCountOverflow(String),

    /// Decrementing a reference count that is already zero
    RefCountUnderflow(String),

    /// Resource accessed without holding a counted reference
    ReferenceNotHeld(String),

    /// Requested type does not match the registered resource type
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Work submitted to a thread pool after shutdown
    PoolShutdown,

    /// Erase requested while references are still outstanding
    StillReferenced(String),

    /// The resource's load callback failed
    LoadFailed {
        name: String,
        reason: String,
    },

    /// The registrant dropped the resource while it was still registered
    ResourceExpired(String),

    /// Payload accessed while the resource is unloaded
    NotLoaded(String),

    /// Task work panicked on a worker thread
    TaskPanicked(String),

    /// A lock was poisoned by a panicking holder
    LockPoisoned(String),

    /// Initialization failed (engine, thread pool, subsystems)
    InitializationFailed(String),

    /// I/O failure in a file-backed resource
    Io(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound(name) => write!(f, "Resource not found: {}", name),
            Error::DuplicateName(name) => write!(f, "Resource already registered: {}", name),
            Error::RefCountOverflow(name) => write!(f, "Reference count overflow: {}", name),
            Error::RefCountUnderflow(name) => write!(f, "Reference count underflow: {}", name),
            Error::ReferenceNotHeld(name) => {
                write!(f, "Reference count was not incremented for: {}", name)
            }
            Error::TypeMismatch { name, expected, actual } => write!(
                f,
                "Type mismatch for {}: requested {}, registered {}",
                name, expected, actual
            ),
            Error::PoolShutdown => write!(f, "Thread pool was shut down"),
            Error::StillReferenced(name) => write!(f, "Resource still referenced: {}", name),
            Error::LoadFailed { name, reason } => {
                write!(f, "Failed to load {}: {}", name, reason)
            }
            Error::ResourceExpired(name) => write!(f, "Resource dropped by its owner: {}", name),
            Error::NotLoaded(what) => write!(f, "Not loaded: {}", what),
            Error::TaskPanicked(msg) => write!(f, "Task panicked: {}", msg),
            Error::LockPoisoned(what) => write!(f, "Lock poisoned: {}", what),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
