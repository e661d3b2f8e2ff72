/// Text resources.
///
/// - **TextFileResource**: UTF-8 file read on load, cleared on free
/// - **RawStringResource**: in-memory text, load/free only toggle the flag

use std::path::{Path, PathBuf};
use crate::error::{Error, Result};
use super::resource::{Resource, ResourcePayload};

// ===== TEXT FILE =====

pub struct TextFileResource {
    path: PathBuf,
    text: String,
    loaded: bool,
    supports_async: bool,
}

impl TextFileResource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            text: String::new(),
            loaded: false,
            supports_async: false,
        }
    }

    /// Allow the file to be read on a pool worker
    pub fn with_async(mut self, supports_async: bool) -> Self {
        self.supports_async = supports_async;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Resource for TextFileResource {
    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn supports_async(&self) -> bool {
        self.supports_async
    }

    fn load(&mut self) -> Result<()> {
        if self.loaded {
            return Ok(());
        }
        self.text = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::Io(format!("{}: {}", self.path.display(), e)))?;
        self.loaded = true;
        Ok(())
    }

    fn free(&mut self) {
        if !self.loaded {
            return;
        }
        self.text = String::new();
        self.loaded = false;
    }
}

impl ResourcePayload for TextFileResource {
    type Payload = String;

    fn payload(&self) -> Result<&String> {
        if !self.loaded {
            return Err(Error::NotLoaded(self.path.display().to_string()));
        }
        Ok(&self.text)
    }
}

// ===== RAW STRING =====

/// Text that already lives in memory.
///
/// The payload is readable whenever the resource is loaded; `free()` keeps
/// the text so a later load is free.
pub struct RawStringResource {
    text: String,
    loaded: bool,
}

impl RawStringResource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), loaded: false }
    }
}

impl Resource for RawStringResource {
    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn load(&mut self) -> Result<()> {
        self.loaded = true;
        Ok(())
    }

    fn free(&mut self) {
        self.loaded = false;
    }
}

impl ResourcePayload for RawStringResource {
    type Payload = String;

    fn payload(&self) -> Result<&String> {
        if !self.loaded {
            return Err(Error::NotLoaded("raw string".to_string()));
        }
        Ok(&self.text)
    }
}

#[cfg(test)]
#[path = "text_resource_tests.rs"]
mod tests;
