/// Resource capability traits.
///
/// A resource is a named payload that can be loaded and freed on demand.
/// The `ResourceManager` drives `load()`/`free()` from reference counts;
/// the typed payload is reached through `ResourcePayload`.
///
/// `FnResource<T>` is the generic implementation: its payload is produced
/// by a loader closure on `load()` and dropped on `free()`.

use crate::error::{Error, Result};

// ===== TRAITS =====

/// Loadable/unloadable resource.
///
/// Implementations must not call back into the `ResourceManager` from
/// `load()` or `free()`: synchronous loads and all frees run while the
/// manager's registry lock is held.
pub trait Resource: Send + Sync + 'static {
    /// Whether the payload is currently loaded
    fn is_loaded(&self) -> bool;

    /// Whether `load()` may run on a pool worker instead of the caller's thread
    ///
    /// Resources bound to a thread-affine context (graphics contexts, audio
    /// devices) must return false.
    fn supports_async(&self) -> bool {
        false
    }

    /// Load the payload. Called on the 0→1 reference transition.
    fn load(&mut self) -> Result<()>;

    /// Release the payload. Called on the 1→0 reference transition.
    fn free(&mut self);
}

/// Typed access to a resource's payload
pub trait ResourcePayload: Resource {
    type Payload;

    /// Borrow the loaded payload
    ///
    /// # Errors
    ///
    /// Returns `NotLoaded` while the resource is unloaded.
    fn payload(&self) -> Result<&Self::Payload>;
}

// ===== FN RESOURCE =====

type Loader<T> = Box<dyn Fn() -> Result<T> + Send + Sync>;

/// Resource whose payload is built by a loader closure.
///
/// # Example
///
/// ```no_run
/// use galaxy_3d_resource::galaxy3d::resource::FnResource;
///
/// let heights = FnResource::new(|| Ok(vec![0.0f32; 256 * 256])).with_async(true);
/// ```
pub struct FnResource<T> {
    loader: Loader<T>,
    value: Option<T>,
    supports_async: bool,
}

impl<T: Send + Sync + 'static> FnResource<T> {
    /// Create an unloaded resource driven by `loader`
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> Result<T> + Send + Sync + 'static,
    {
        Self {
            loader: Box::new(loader),
            value: None,
            supports_async: false,
        }
    }

    /// Allow the loader to run on a pool worker
    pub fn with_async(mut self, supports_async: bool) -> Self {
        self.supports_async = supports_async;
        self
    }
}

impl<T: Send + Sync + 'static> Resource for FnResource<T> {
    fn is_loaded(&self) -> bool {
        self.value.is_some()
    }

    fn supports_async(&self) -> bool {
        self.supports_async
    }

    fn load(&mut self) -> Result<()> {
        if self.value.is_none() {
            self.value = Some((self.loader)()?);
        }
        Ok(())
    }

    fn free(&mut self) {
        self.value = None;
    }
}

impl<T: Send + Sync + 'static> ResourcePayload for FnResource<T> {
    type Payload = T;

    fn payload(&self) -> Result<&T> {
        self.value.as_ref()
            .ok_or_else(|| Error::NotLoaded(std::any::type_name::<T>().to_string()))
    }
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
