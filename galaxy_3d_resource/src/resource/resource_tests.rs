//! Unit tests for resource.rs

use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_fn_resource_starts_unloaded() {
    let res = FnResource::new(|| Ok(42u32));
    assert!(!res.is_loaded());
    assert!(!res.supports_async());
    assert!(matches!(res.payload(), Err(Error::NotLoaded(_))));
}

#[test]
fn test_fn_resource_load_and_free() {
    let mut res = FnResource::new(|| Ok(vec![1u8, 2, 3]));

    res.load().unwrap();
    assert!(res.is_loaded());
    assert_eq!(res.payload().unwrap(), &vec![1u8, 2, 3]);

    res.free();
    assert!(!res.is_loaded());
    assert!(res.payload().is_err());
}

#[test]
fn test_fn_resource_load_is_idempotent() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = calls.clone();
    let mut res = FnResource::new(move || {
        c.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    res.load().unwrap();
    res.load().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    res.free();
    res.load().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_fn_resource_loader_error_leaves_unloaded() {
    let mut res: FnResource<String> = FnResource::new(|| Err(Error::Io("no such file".to_string())));

    assert_eq!(res.load(), Err(Error::Io("no such file".to_string())));
    assert!(!res.is_loaded());
}

#[test]
fn test_fn_resource_with_async() {
    let res = FnResource::new(|| Ok(0u8)).with_async(true);
    assert!(res.supports_async());
}

#[test]
fn test_default_supports_async_is_false() {
    struct GpuBound {
        loaded: bool,
    }

    impl Resource for GpuBound {
        fn is_loaded(&self) -> bool { self.loaded }
        fn load(&mut self) -> Result<()> { self.loaded = true; Ok(()) }
        fn free(&mut self) { self.loaded = false; }
    }

    let res = GpuBound { loaded: false };
    assert!(!res.supports_async());
}
