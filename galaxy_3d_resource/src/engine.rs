/// Galaxy3D Engine - Singleton manager for engine subsystems
///
/// This module provides global singleton management for the resource manager
/// and the logger. It uses thread-safe static storage with RwLock for safe
/// concurrent access.

use std::sync::{OnceLock, RwLock, Arc};
use std::time::SystemTime;
use crate::resource::{ResourceManager, ResourceManagerConfig};
use crate::error::{Result, Error};
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

// ===== INTERNAL STATE =====

/// Global engine state storage
static ENGINE_STATE: OnceLock<EngineState> = OnceLock::new();

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Internal state structure holding all engine singletons
struct EngineState {
    /// Resource manager singleton
    resource_manager: RwLock<Option<Arc<ResourceManager>>>,
}

impl EngineState {
    /// Create a new empty engine state
    fn new() -> Self {
        Self {
            resource_manager: RwLock::new(None),
        }
    }
}

fn logger() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger::new())))
}

// ===== PUBLIC API =====

/// Main engine singleton manager
///
/// Owns the process-wide resource manager and routes engine logs.
///
/// # Example
///
/// ```no_run
/// use galaxy_3d_resource::galaxy3d::Engine;
/// use galaxy_3d_resource::galaxy3d::resource::ResourceManagerConfig;
///
/// // Initialize engine
/// Engine::initialize()?;
///
/// // Create the resource manager singleton
/// Engine::create_resource_manager(ResourceManagerConfig::default())?;
///
/// // Access it globally
/// let rm = Engine::resource_manager()?;
/// assert_eq!(rm.resource_count(), 0);
///
/// // Cleanup
/// Engine::shutdown();
/// # Ok::<(), galaxy_3d_resource::galaxy3d::Error>(())
/// ```
pub struct Engine;

impl Engine {
    /// Helper to log errors before returning them (internal use)
    fn log_and_return_error(error: Error) -> Error {
        match &error {
            Error::InitializationFailed(msg) => {
                crate::engine_error!("galaxy3d::Engine", "Initialization failed: {}", msg);
            }
            Error::LockPoisoned(what) => {
                crate::engine_error!("galaxy3d::Engine", "Lock poisoned: {}", what);
            }
            _ => {
                crate::engine_error!("galaxy3d::Engine", "Engine error: {}", error);
            }
        }
        error
    }

    fn state() -> Result<&'static EngineState> {
        ENGINE_STATE.get()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("Engine not initialized. Call Engine::initialize() first.".to_string())
            ))
    }

    /// Initialize the engine
    ///
    /// This must be called once at application startup before creating any subsystems.
    /// Calling it again is a no-op.
    ///
    /// # Errors
    ///
    /// Currently always succeeds, but returns Result for future extensibility.
    pub fn initialize() -> Result<()> {
        ENGINE_STATE.get_or_init(EngineState::new);
        Ok(())
    }

    /// Shutdown the engine and destroy all singletons
    ///
    /// Handles obtained earlier through `resource_manager()` stay valid until
    /// dropped. Calling shutdown on an uninitialized engine does nothing.
    pub fn shutdown() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut rm) = state.resource_manager.write() {
                if rm.take().is_some() {
                    crate::engine_info!("galaxy3d::Engine", "ResourceManager singleton destroyed on shutdown");
                }
            }
        }
    }

    // ===== RESOURCE MANAGER API =====

    /// Create and register the resource manager singleton
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The engine is not initialized
    /// - A resource manager already exists
    /// - The manager's thread pool cannot be started
    pub fn create_resource_manager(config: ResourceManagerConfig) -> Result<Arc<ResourceManager>> {
        let state = Self::state()?;

        let mut lock = state.resource_manager.write()
            .map_err(|_| Self::log_and_return_error(
                Error::LockPoisoned("ResourceManager singleton".to_string())
            ))?;

        if lock.is_some() {
            return Err(Self::log_and_return_error(
                Error::InitializationFailed("ResourceManager already exists. Call Engine::destroy_resource_manager() first.".to_string())
            ));
        }

        let workers = config.pool.worker_count;
        let manager = Arc::new(ResourceManager::with_config(config)
            .map_err(Self::log_and_return_error)?);
        *lock = Some(manager.clone());

        crate::engine_info!("galaxy3d::Engine",
            "ResourceManager singleton created ({} workers)", manager.thread_pool().worker_count());
        if workers == 0 {
            crate::engine_debug!("galaxy3d::Engine", "Worker count derived from logical CPUs");
        }

        Ok(manager)
    }

    /// Get the resource manager singleton
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The engine is not initialized
    /// - The resource manager has not been created
    ///
    /// # Example
    ///
    /// ```no_run
    /// use galaxy_3d_resource::galaxy3d::Engine;
    ///
    /// let rm = Engine::resource_manager()?;
    /// let loaded = rm.is_loaded("main.lua")?;
    /// # Ok::<(), galaxy_3d_resource::galaxy3d::Error>(())
    /// ```
    pub fn resource_manager() -> Result<Arc<ResourceManager>> {
        let state = Self::state()?;

        let lock = state.resource_manager.read()
            .map_err(|_| Self::log_and_return_error(
                Error::LockPoisoned("ResourceManager singleton".to_string())
            ))?;

        lock.clone()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("ResourceManager not created. Call Engine::create_resource_manager() first.".to_string())
            ))
    }

    /// Destroy the resource manager singleton
    ///
    /// Removes the singleton, allowing a new one to be created. Destroying a
    /// manager that was never created is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine is not initialized
    pub fn destroy_resource_manager() -> Result<()> {
        let state = Self::state()?;

        let mut lock = state.resource_manager.write()
            .map_err(|_| Self::log_and_return_error(
                Error::LockPoisoned("ResourceManager singleton".to_string())
            ))?;

        if lock.take().is_some() {
            crate::engine_info!("galaxy3d::Engine", "ResourceManager singleton destroyed");
        }

        Ok(())
    }

    /// Reset all singletons for testing (only available in test builds)
    #[cfg(test)]
    pub fn reset_for_testing() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut rm) = state.resource_manager.write() {
                *rm = None;
            }
        }
    }

    // ===== LOGGING API =====

    /// Set a custom logger
    ///
    /// Replace the default logger with a custom implementation (file logger, network logger, etc.)
    ///
    /// # Example
    ///
    /// ```no_run
    /// use galaxy_3d_resource::galaxy3d::{Engine, log::{Logger, LogEntry}};
    ///
    /// struct FileLogger;
    /// impl Logger for FileLogger {
    ///     fn log(&self, entry: &LogEntry) {
    ///         // Write to file...
    ///     }
    /// }
    ///
    /// Engine::set_logger(FileLogger);
    /// ```
    pub fn set_logger<L: Logger + 'static>(logger_impl: L) {
        if let Ok(mut lock) = logger().write() {
            *lock = Box::new(logger_impl);
        }
    }

    /// Reset logger to default (DefaultLogger, Info and above)
    pub fn reset_logger() {
        if let Ok(mut lock) = logger().write() {
            *lock = Box::new(DefaultLogger::new());
        }
    }

    /// Internal logging method (for simple logs without file:line)
    ///
    /// Used by macros like engine_info!, engine_warn!, etc.
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        if let Ok(lock) = logger().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Internal logging method with file:line information (for ERROR logs)
    ///
    /// Used by engine_error! macro to include source location.
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        if let Ok(lock) = logger().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
