//! RAII reference handle

use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, RwLock};
use crate::error::{Error, Result};
use super::resource::{Resource, ResourcePayload};
use super::resource_manager::ResourceManager;

struct HandleTarget {
    name: String,
    manager: Arc<ResourceManager>,
}

/// Scoped, counted reference to a named resource.
///
/// Creating a handle adds a reference to its name; dropping it removes that
/// reference. `clone()` adds a fresh reference, while moving a handle (plain
/// Rust move or `take()`) transfers the existing one. An empty handle holds
/// no name and never touches a manager.
///
/// # Example
///
/// ```no_run
/// use std::sync::{Arc, RwLock};
/// use galaxy_3d_resource::galaxy3d::resource::{ResourceHandle, ResourceManager, TextFileResource};
///
/// let rm = Arc::new(ResourceManager::new()?);
/// let script = Arc::new(RwLock::new(TextFileResource::new("scripts/main.lua")));
/// rm.add_resource("main.lua", &script)?;
///
/// let handle = ResourceHandle::<TextFileResource>::new("main.lua", &rm)?;
/// let len = handle.read(|text| text.len())?;
/// # Ok::<(), galaxy_3d_resource::galaxy3d::Error>(())
/// ```
pub struct ResourceHandle<R> {
    target: Option<HandleTarget>,
    _marker: PhantomData<fn() -> R>,
}

impl<R> ResourceHandle<R> {
    /// Handle holding no reference
    pub fn empty() -> Self {
        Self { target: None, _marker: PhantomData }
    }

    pub fn is_empty(&self) -> bool {
        self.target.is_none()
    }

    /// Target name, or None for an empty handle
    pub fn name(&self) -> Option<&str> {
        self.target.as_ref().map(|t| t.name.as_str())
    }

    pub fn manager(&self) -> Option<&Arc<ResourceManager>> {
        self.target.as_ref().map(|t| &t.manager)
    }

    /// Move the reference out, leaving this handle empty
    pub fn take(&mut self) -> Self {
        Self { target: self.target.take(), _marker: PhantomData }
    }

    /// Drop the reference now, leaving this handle empty
    ///
    /// Unlike dropping the handle, a failing decrement is returned to the caller.
    pub fn release(&mut self) -> Result<()> {
        match self.target.take() {
            Some(target) => target.manager.decrement_ref(&target.name).map(|_| ()),
            None => Ok(()),
        }
    }

    fn same_target(&self, other: &Self) -> bool {
        match (&self.target, &other.target) {
            (Some(a), Some(b)) => a.name == b.name && Arc::ptr_eq(&a.manager, &b.manager),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<R: Resource> ResourceHandle<R> {
    /// Add a reference to `name` in `manager`
    ///
    /// # Errors
    ///
    /// Any error of `ResourceManager::increment_ref`. A failed construction
    /// leaves the count unchanged.
    pub fn new(name: impl Into<String>, manager: &Arc<ResourceManager>) -> Result<Self> {
        let name = name.into();
        manager.increment_ref(&name)?;
        Ok(Self {
            target: Some(HandleTarget { name, manager: manager.clone() }),
            _marker: PhantomData,
        })
    }

    /// Clone with a fresh reference, surfacing overflow as an error
    pub fn try_clone(&self) -> Result<Self> {
        match &self.target {
            Some(target) => Self::new(target.name.clone(), &target.manager),
            None => Ok(Self::empty()),
        }
    }

    /// The referenced resource, blocking on a pending async load
    ///
    /// # Panics
    ///
    /// Panics if the handle is empty.
    pub fn get(&self) -> Result<Arc<RwLock<R>>> {
        let Some(target) = &self.target else {
            panic!("ResourceHandle::get() called on an empty handle");
        };
        target.manager.get_resource::<R>(&target.name)
    }
}

impl<R: ResourcePayload> ResourceHandle<R> {
    /// Run `f` with the loaded payload under a read lock
    pub fn read<T>(&self, f: impl FnOnce(&R::Payload) -> T) -> Result<T> {
        let resource = self.get()?;
        let guard = resource.read()
            .map_err(|_| Error::LockPoisoned(self.name().unwrap_or_default().to_string()))?;
        Ok(f(guard.payload()?))
    }
}

impl<R: Resource> Clone for ResourceHandle<R> {
    /// # Panics
    ///
    /// Panics if the reference count would overflow; use `try_clone` to handle it.
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(handle) => handle,
            Err(err) => panic!("ResourceHandle clone failed: {}", err),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        if self.same_target(source) {
            return;
        }
        *self = source.clone();
    }
}

impl<R> Default for ResourceHandle<R> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<R> Drop for ResourceHandle<R> {
    fn drop(&mut self) {
        let Some(target) = self.target.take() else {
            return;
        };

        if let Err(err) = target.manager.decrement_ref(&target.name) {
            if std::thread::panicking() {
                crate::engine_error!(
                    "galaxy3d::ResourceHandle",
                    "Releasing '{}' during unwind failed: {}", target.name, err
                );
            } else {
                panic!("ResourceHandle release of '{}' failed: {}", target.name, err);
            }
        }
    }
}

impl<R> fmt::Debug for ResourceHandle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("name", &self.name())
            .field("type", &std::any::type_name::<R>())
            .finish()
    }
}

#[cfg(test)]
#[path = "resource_handle_tests.rs"]
mod tests;
