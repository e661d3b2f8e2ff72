/// Central resource manager.
///
/// Maps resource names to caller-owned resources and per-name reference
/// counts. Loads happen exactly on the 0→1 transition of a name's count and
/// frees exactly on the 1→0 transition.
///
/// Ownership: the registrant keeps the `Arc<RwLock<R>>`; the registry only
/// holds weak references, so erasing a name never drops the resource and a
/// resource dropped by its owner is reported as `ResourceExpired`.
///
/// Threading: every operation takes the single registry mutex. Synchronous
/// loads and all frees run on the calling thread with that mutex held.
/// Loads of async-capable resources are submitted to the thread pool; the
/// pending task is recorded and `get_resource` blocks on it outside the lock.
/// A panicking `load()` is reported as `LoadFailed` on either path.

use std::any::{type_name, Any};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};
use crate::task::{panic_message, TaskHandle, ThreadPool, ThreadPoolConfig};
use super::resource::Resource;

/// Resource manager configuration
#[derive(Debug, Clone)]
pub struct ResourceManagerConfig {
    /// Worker pool used for async-capable loads
    pub pool: ThreadPoolConfig,
    /// Highest reference count a single name may reach
    pub max_ref_count: u32,
}

impl Default for ResourceManagerConfig {
    fn default() -> Self {
        Self {
            pool: ThreadPoolConfig::default(),
            max_ref_count: u32::MAX,
        }
    }
}

/// Registry entry: the resource reference and its count live together, so a
/// name can never have one without the other.
struct RegistryEntry {
    resource: Weak<RwLock<dyn Resource>>,
    typed: Weak<dyn Any + Send + Sync>,
    type_name: &'static str,
    ref_count: u32,
    /// In-flight (or finished but not yet collected) async load
    pending: Option<TaskHandle>,
}

impl RegistryEntry {
    fn is_loading(&self) -> bool {
        self.pending.as_ref().is_some_and(|task| !task.is_finished())
    }
}

pub struct ResourceManager {
    registry: Mutex<FxHashMap<String, RegistryEntry>>,
    pool: Arc<ThreadPool>,
    max_ref_count: u32,
}

impl ResourceManager {
    /// Create a manager with the default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ResourceManagerConfig::default())
    }

    /// Create a manager owning a new thread pool built from `config`
    pub fn with_config(config: ResourceManagerConfig) -> Result<Self> {
        let pool = Arc::new(ThreadPool::new(config.pool)?);
        Ok(Self::with_pool(pool, config.max_ref_count))
    }

    /// Create a manager sharing an existing thread pool
    pub fn with_pool(pool: Arc<ThreadPool>, max_ref_count: u32) -> Self {
        Self {
            registry: Mutex::new(FxHashMap::default()),
            pool,
            max_ref_count,
        }
    }

    fn lock_registry(&self) -> Result<MutexGuard<'_, FxHashMap<String, RegistryEntry>>> {
        self.registry.lock()
            .map_err(|_| Error::LockPoisoned("ResourceManager registry".to_string()))
    }

    /// Read-only view of the registry, recovered if a holder panicked
    fn inspect_registry(&self) -> MutexGuard<'_, FxHashMap<String, RegistryEntry>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ===== REGISTRATION =====

    /// Register an unloaded resource under `name` with a count of 0
    ///
    /// The manager keeps a weak reference; the caller keeps ownership.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateName` if `name` is already registered.
    pub fn add_resource<R: Resource>(
        &self,
        name: impl Into<String>,
        resource: &Arc<RwLock<R>>,
    ) -> Result<()> {
        let name = name.into();
        let mut registry = self.lock_registry()?;

        if registry.contains_key(&name) {
            return Err(Error::DuplicateName(name));
        }

        let dynamic: Arc<RwLock<dyn Resource>> = resource.clone();
        let typed: Arc<dyn Any + Send + Sync> = resource.clone();

        registry.insert(name.clone(), RegistryEntry {
            resource: Arc::downgrade(&dynamic),
            typed: Arc::downgrade(&typed),
            type_name: type_name::<R>(),
            ref_count: 0,
            pending: None,
        });

        crate::engine_debug!("galaxy3d::ResourceManager", "Registered '{}' ({})", name, type_name::<R>());
        Ok(())
    }

    /// Unregister `name`
    ///
    /// Blocks on an in-flight async load for `name` before removing it. The
    /// resource object itself is left untouched.
    ///
    /// # Errors
    ///
    /// - `NotFound` if `name` is not registered
    /// - `StillReferenced` if the count is above 0
    pub fn erase_resource(&self, name: &str) -> Result<()> {
        let mut registry = self.lock_registry()?;

        let entry = registry.get_mut(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;

        if entry.ref_count > 0 {
            return Err(Error::StillReferenced(name.to_string()));
        }

        if let Some(task) = entry.pending.take() {
            // Outcome is irrelevant once nobody references the resource
            let _ = task.wait();
        }

        registry.remove(name);

        crate::engine_debug!("galaxy3d::ResourceManager", "Erased '{}'", name);
        Ok(())
    }

    /// Alias of `erase_resource`
    pub fn remove_resource(&self, name: &str) -> Result<()> {
        self.erase_resource(name)
    }

    /// Erase every registered name whose count is 0
    ///
    /// Returns the number of names erased.
    pub fn clear_unreferenced(&self) -> Result<usize> {
        let mut registry = self.lock_registry()?;

        let names: Vec<String> = registry.iter()
            .filter(|(_, entry)| entry.ref_count == 0)
            .map(|(name, _)| name.clone())
            .collect();

        for name in &names {
            if let Some(task) = registry.get_mut(name).and_then(|entry| entry.pending.take()) {
                let _ = task.wait();
            }
            registry.remove(name);
        }

        if !names.is_empty() {
            crate::engine_debug!("galaxy3d::ResourceManager", "Erased {} unreferenced resources", names.len());
        }
        Ok(names.len())
    }

    // ===== REFERENCE COUNTING =====

    /// Add a reference to `name`, loading the resource on the 0→1 transition
    ///
    /// Async-capable resources are loaded on the thread pool and this call
    /// returns immediately; others are loaded inline before returning.
    /// Returns the new count.
    ///
    /// # Errors
    ///
    /// - `NotFound` if `name` is not registered
    /// - `RefCountOverflow` if the count is already at its maximum
    /// - `ResourceExpired` if the owner dropped the resource
    /// - `LoadFailed` if an inline load fails (the count is left unchanged)
    /// - `PoolShutdown` if an async load cannot be scheduled
    pub fn increment_ref(&self, name: &str) -> Result<u32> {
        let mut registry = self.lock_registry()?;

        let entry = registry.get_mut(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;

        if entry.ref_count >= self.max_ref_count {
            return Err(Error::RefCountOverflow(name.to_string()));
        }

        if entry.ref_count == 0 {
            let resource = entry.resource.upgrade()
                .ok_or_else(|| Error::ResourceExpired(name.to_string()))?;

            let supports_async = resource.read()
                .map_err(|_| Error::LockPoisoned(name.to_string()))?
                .supports_async();

            if supports_async {
                let task_name = name.to_string();
                let task = self.pool.add_task(move || {
                    let mut guard = resource.write()
                        .map_err(|_| Error::LockPoisoned(task_name.clone()))?;
                    run_load(&task_name, &mut *guard)
                })?;
                entry.pending = Some(task);
                crate::engine_debug!("galaxy3d::ResourceManager", "Dispatched async load of '{}'", name);
            } else {
                let mut guard = resource.write()
                    .map_err(|_| Error::LockPoisoned(name.to_string()))?;
                run_load(name, &mut *guard)?;
                crate::engine_debug!("galaxy3d::ResourceManager", "Loaded '{}'", name);
            }
        }

        entry.ref_count += 1;
        crate::engine_trace!("galaxy3d::ResourceManager", "'{}' references: {}", name, entry.ref_count);
        Ok(entry.ref_count)
    }

    /// Drop a reference to `name`, freeing the resource on the 1→0 transition
    ///
    /// If an async load is still in flight on the last release, this waits for
    /// it before freeing. Returns the new count.
    ///
    /// # Errors
    ///
    /// - `NotFound` if `name` is not registered
    /// - `RefCountUnderflow` if the count is already 0
    pub fn decrement_ref(&self, name: &str) -> Result<u32> {
        let mut registry = self.lock_registry()?;

        let entry = registry.get_mut(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;

        if entry.ref_count == 0 {
            return Err(Error::RefCountUnderflow(name.to_string()));
        }

        if entry.ref_count == 1 {
            if let Some(task) = entry.pending.take() {
                // A failed load leaves nothing to free; is_loaded() covers it
                let _ = task.wait();
            }

            // An expired resource has nothing left to free
            if let Some(resource) = entry.resource.upgrade() {
                {
                    // A poisoned lock still gets its free(), the count must drop regardless
                    let mut guard = resource.write().unwrap_or_else(PoisonError::into_inner);
                    if guard.is_loaded() {
                        guard.free();
                        crate::engine_debug!("galaxy3d::ResourceManager", "Freed '{}'", name);
                    }
                }
                resource.clear_poison();
            }
        }

        entry.ref_count -= 1;
        crate::engine_trace!("galaxy3d::ResourceManager", "'{}' references: {}", name, entry.ref_count);
        Ok(entry.ref_count)
    }

    // ===== ACCESS =====

    /// Get the typed resource registered under `name`
    ///
    /// The caller must hold a reference (count > 0). If an async load is
    /// pending, blocks until it completes.
    ///
    /// # Errors
    ///
    /// - `NotFound` if `name` is not registered
    /// - `ReferenceNotHeld` if the count is 0
    /// - `TypeMismatch` if `R` is not the registered type
    /// - `ResourceExpired` if the owner dropped the resource
    /// - the pending load's error if the async load failed
    pub fn get_resource<R: Resource>(&self, name: &str) -> Result<Arc<RwLock<R>>> {
        let (resource, pending) = {
            let registry = self.lock_registry()?;

            let entry = registry.get(name)
                .ok_or_else(|| Error::NotFound(name.to_string()))?;

            if entry.ref_count == 0 {
                return Err(Error::ReferenceNotHeld(name.to_string()));
            }

            let typed = entry.typed.upgrade()
                .ok_or_else(|| Error::ResourceExpired(name.to_string()))?;

            let resource = typed.downcast::<RwLock<R>>()
                .map_err(|_| Error::TypeMismatch {
                    name: name.to_string(),
                    expected: type_name::<R>(),
                    actual: entry.type_name,
                })?;

            (resource, entry.pending.clone())
        };

        if let Some(task) = pending {
            task.wait()?;
        }

        Ok(resource)
    }

    // ===== INTROSPECTION =====

    /// Current reference count of `name`
    pub fn reference_count(&self, name: &str) -> Result<u32> {
        let registry = self.lock_registry()?;
        registry.get(name)
            .map(|entry| entry.ref_count)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// Whether the resource under `name` is loaded
    ///
    /// Returns false while an async load is still running, without blocking on it.
    pub fn is_loaded(&self, name: &str) -> Result<bool> {
        let registry = self.lock_registry()?;
        let entry = registry.get(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;

        if entry.is_loading() {
            return Ok(false);
        }

        let resource = entry.resource.upgrade()
            .ok_or_else(|| Error::ResourceExpired(name.to_string()))?;
        let loaded = resource.read()
            .map_err(|_| Error::LockPoisoned(name.to_string()))?
            .is_loaded();
        Ok(loaded)
    }

    /// Whether an async load for `name` is still running
    pub fn is_loading(&self, name: &str) -> Result<bool> {
        let registry = self.lock_registry()?;
        registry.get(name)
            .map(RegistryEntry::is_loading)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inspect_registry().contains_key(name)
    }

    pub fn resource_count(&self) -> usize {
        self.inspect_registry().len()
    }

    /// Registered names, sorted
    pub fn resource_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inspect_registry().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn max_ref_count(&self) -> u32 {
        self.max_ref_count
    }

    pub fn thread_pool(&self) -> &Arc<ThreadPool> {
        &self.pool
    }
}

/// Run `load()`, turning an error or a panic into `LoadFailed`
///
/// The panic is caught before the caller's guards unwind, so neither the
/// registry mutex nor the resource lock is poisoned by a faulty loader.
fn run_load(name: &str, resource: &mut dyn Resource) -> Result<()> {
    match panic::catch_unwind(AssertUnwindSafe(|| resource.load())) {
        Ok(result) => result.map_err(|e| load_failed(name, e)),
        Err(payload) => Err(Error::LoadFailed {
            name: name.to_string(),
            reason: format!("load panicked: {}", panic_message(payload.as_ref())),
        }),
    }
}

fn load_failed(name: &str, error: Error) -> Error {
    match error {
        Error::LoadFailed { .. } => error,
        other => Error::LoadFailed {
            name: name.to_string(),
            reason: other.to_string(),
        },
    }
}

#[cfg(test)]
#[path = "resource_manager_tests.rs"]
mod tests;
