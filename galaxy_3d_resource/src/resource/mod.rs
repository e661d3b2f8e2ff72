//! Resource management module
//!
//! Named, reference-counted resources loaded and freed on demand.
//!
//! - **Resource**: load/free capability implemented by each resource type
//! - **ResourceManager**: name registry and per-name reference counts
//! - **ResourceHandle**: scoped reference that keeps a resource loaded
//! - **Resources**: owning bundle on the registrant side

mod resource;
mod resource_manager;
mod resource_handle;
mod resources;
mod text_resource;

pub use resource::{Resource, ResourcePayload, FnResource};
pub use resource_manager::{ResourceManager, ResourceManagerConfig};
pub use resource_handle::ResourceHandle;
pub use resources::Resources;
pub use text_resource::{TextFileResource, RawStringResource};
