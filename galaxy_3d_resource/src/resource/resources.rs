/// Owning bundle of named resources.
///
/// The manager never owns what it tracks; something on the registrant side
/// has to keep the `Arc<RwLock<R>>` alive. `Resources` is that owner: it
/// stores the objects by name and can register or unregister all of them
/// with a `ResourceManager` in one call.

use std::any::{type_name, Any};
use std::sync::{Arc, RwLock};
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};
use super::resource::Resource;
use super::resource_manager::ResourceManager;

type Registrar = Box<dyn Fn(&ResourceManager, &str) -> Result<()> + Send + Sync>;

struct OwnedEntry {
    object: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
    register: Registrar,
}

pub struct Resources {
    entries: FxHashMap<String, OwnedEntry>,
}

impl Resources {
    /// Create an empty bundle
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }

    /// Take ownership of `resource` under `name`
    ///
    /// Returns the shared object so the caller can keep a typed reference.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateName` if the bundle already holds `name`.
    pub fn add<R: Resource>(&mut self, name: impl Into<String>, resource: R) -> Result<Arc<RwLock<R>>> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(Error::DuplicateName(name));
        }

        let shared = Arc::new(RwLock::new(resource));
        let for_registry = shared.clone();
        self.entries.insert(name, OwnedEntry {
            object: shared.clone(),
            type_name: type_name::<R>(),
            register: Box::new(move |manager: &ResourceManager, name: &str| {
                manager.add_resource(name, &for_registry)
            }),
        });
        Ok(shared)
    }

    /// Give up ownership of `name`
    ///
    /// A manager still tracking the name will report `ResourceExpired`
    /// once the last strong reference is gone.
    pub fn remove(&mut self, name: &str) -> Result<()> {
        self.entries.remove(name)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// Typed access to an owned resource
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown name, `TypeMismatch` if `R` is not the
    /// type the resource was added with.
    pub fn get<R: Resource>(&self, name: &str) -> Result<Arc<RwLock<R>>> {
        let entry = self.entries.get(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;

        entry.object.clone()
            .downcast::<RwLock<R>>()
            .map_err(|_| Error::TypeMismatch {
                name: name.to_string(),
                expected: type_name::<R>(),
                actual: entry.type_name,
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Owned names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Register every owned resource with `manager`
    ///
    /// All or nothing: if one name fails, the names registered by this call
    /// are erased again and the error is returned.
    pub fn register_all(&self, manager: &ResourceManager) -> Result<()> {
        let mut registered: Vec<&str> = Vec::with_capacity(self.entries.len());

        for name in self.names() {
            let entry = &self.entries[name];
            if let Err(err) = (entry.register)(manager, name) {
                for done in registered {
                    let _ = manager.erase_resource(done);
                }
                return Err(err);
            }
            registered.push(name);
        }

        crate::engine_debug!("galaxy3d::Resources",
            "Registered {} resources", self.entries.len());
        Ok(())
    }

    /// Erase every owned name from `manager`
    ///
    /// All or nothing: if any owned name is still referenced, nothing is
    /// erased and `StillReferenced` is returned. Names the manager does not
    /// know are skipped.
    pub fn unregister_all(&self, manager: &ResourceManager) -> Result<()> {
        let names = self.names();

        for name in &names {
            match manager.reference_count(name) {
                Ok(0) | Err(Error::NotFound(_)) => {}
                Ok(_) => return Err(Error::StillReferenced(name.to_string())),
                Err(err) => return Err(err),
            }
        }

        for name in names {
            match manager.erase_resource(name) {
                Ok(()) | Err(Error::NotFound(_)) => {}
                Err(err) => return Err(err),
            }
        }

        crate::engine_debug!("galaxy3d::Resources",
            "Unregistered {} resources", self.entries.len());
        Ok(())
    }
}

impl Default for Resources {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "resources_tests.rs"]
mod tests;
