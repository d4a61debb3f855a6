//! # Shared Object Loading
//!
//! Abstraction for loading dynamic libraries and resolving symbols in them.
//!
//! ## Philosophy
//!
//! - **Opaque handles**: Callers never see a platform module handle
//! - **Addresses, not functions**: Resolved symbols are raw addresses; the
//!   caller that knows the signature does the cast
//! - **Testable**: `SymbolTableLoader` serves libraries from memory

use std::collections::HashMap;
use thiserror::Error;

/// Loaded library handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectHandle(pub usize);

/// Resolved symbol address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(pub usize);

impl Symbol {
    /// Returns the raw address
    pub fn addr(self) -> usize {
        self.0
    }
}

/// Loader errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("Failed loading {path}: {message}")]
    Object { path: String, message: String },

    #[error("Failed loading {name}: {message}")]
    Function { name: String, message: String },
}

/// Dynamic library loader trait
pub trait SharedObjectLoader {
    /// Loads the library at `path`
    fn load_object(&mut self, path: &str) -> Result<ObjectHandle, LoadError>;

    /// Resolves `name` in a loaded library
    fn load_function(&self, handle: ObjectHandle, name: &str) -> Result<Symbol, LoadError>;

    /// Unloads a library. Unknown handles are ignored.
    fn unload_object(&mut self, handle: ObjectHandle);
}

/// In-memory loader serving registered libraries
#[derive(Debug, Default)]
pub struct SymbolTableLoader {
    libraries: HashMap<String, HashMap<String, usize>>,
    loaded: HashMap<ObjectHandle, String>,
    next_handle: usize,
}

impl SymbolTableLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a library and its exported symbols
    pub fn with_library(mut self, path: &str, symbols: &[(&str, usize)]) -> Self {
        let table = symbols
            .iter()
            .map(|(name, addr)| (name.to_string(), *addr))
            .collect();
        self.libraries.insert(path.to_string(), table);
        self
    }

    /// Number of libraries currently loaded
    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }
}

impl SharedObjectLoader for SymbolTableLoader {
    fn load_object(&mut self, path: &str) -> Result<ObjectHandle, LoadError> {
        if !self.libraries.contains_key(path) {
            return Err(LoadError::Object {
                path: path.to_string(),
                message: "The specified module could not be found.".to_string(),
            });
        }
        self.next_handle += 1;
        let handle = ObjectHandle(self.next_handle);
        self.loaded.insert(handle, path.to_string());
        Ok(handle)
    }

    fn load_function(&self, handle: ObjectHandle, name: &str) -> Result<Symbol, LoadError> {
        self.loaded
            .get(&handle)
            .and_then(|path| self.libraries.get(path))
            .and_then(|table| table.get(name))
            .map(|addr| Symbol(*addr))
            .ok_or_else(|| LoadError::Function {
                name: name.to_string(),
                message: "The specified procedure could not be found.".to_string(),
            })
    }

    fn unload_object(&mut self, handle: ObjectHandle) {
        self.loaded.remove(&handle);
    }
}
