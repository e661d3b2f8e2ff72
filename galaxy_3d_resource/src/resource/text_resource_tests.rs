//! Unit tests for text_resource.rs

use super::*;
use std::io::Write;

#[test]
fn test_text_file_resource_loads_contents() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "print('hello')").unwrap();

    let mut res = TextFileResource::new(file.path());
    assert!(!res.is_loaded());
    assert!(res.payload().is_err());

    res.load().unwrap();
    assert!(res.is_loaded());
    assert_eq!(res.payload().unwrap(), "print('hello')");

    res.free();
    assert!(!res.is_loaded());
    assert!(matches!(res.payload(), Err(Error::NotLoaded(_))));
}

#[test]
fn test_text_file_resource_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.lua");

    let mut res = TextFileResource::new(&missing);
    match res.load() {
        Err(Error::Io(msg)) => assert!(msg.contains("missing.lua")),
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(!res.is_loaded());
}

#[test]
fn test_text_file_resource_async_flag() {
    let res = TextFileResource::new("scripts/main.lua");
    assert!(!res.supports_async());
    assert!(res.with_async(true).supports_async());
}

#[test]
fn test_text_file_resource_reload_sees_new_contents() {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), "v1").unwrap();

    let mut res = TextFileResource::new(file.path());
    res.load().unwrap();
    assert_eq!(res.payload().unwrap(), "v1");

    res.free();
    std::fs::write(file.path(), "v2").unwrap();
    res.load().unwrap();
    assert_eq!(res.payload().unwrap(), "v2");
}

#[test]
fn test_raw_string_resource() {
    let mut res = RawStringResource::new("{\"entities\": []}");
    assert!(!res.is_loaded());
    assert!(res.payload().is_err());

    res.load().unwrap();
    assert_eq!(res.payload().unwrap(), "{\"entities\": []}");

    res.free();
    assert!(!res.is_loaded());

    res.load().unwrap();
    assert_eq!(res.payload().unwrap(), "{\"entities\": []}");
}
