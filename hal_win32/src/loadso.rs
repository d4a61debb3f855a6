//! Shared object loading for Win32

use hal::loadso::SharedObjectLoader;
#[cfg(windows)]
pub use win32::Win32Loader;

/// The host's loader: Win32 on Windows, an empty symbol table elsewhere
pub fn system_loader() -> Box<dyn SharedObjectLoader + Send> {
    #[cfg(windows)]
    {
        Box::new(Win32Loader::new())
    }
    #[cfg(not(windows))]
    {
        Box::new(hal::loadso::SymbolTableLoader::new())
    }
}

#[cfg(windows)]
mod win32 {
    use hal::loadso::{LoadError, ObjectHandle, SharedObjectLoader, Symbol};
    use std::collections::HashSet;
    use std::ffi::{c_void, CString};
    use windows::core::{PCSTR, PCWSTR};
    use windows::Win32::Foundation::{GetLastError, HMODULE};
    use windows::Win32::System::LibraryLoader::{FreeLibrary, GetProcAddress, LoadLibraryW};

    fn last_error_message() -> String {
        // SAFETY: Reads the calling thread's last-error value.
        let code = unsafe { GetLastError() };
        system_message(code.to_hresult().message())
    }

    /// System messages end in a line break
    fn system_message(message: String) -> String {
        let trimmed = message.trim_end();
        if trimmed.is_empty() {
            "Unknown error".to_string()
        } else {
            trimmed.to_string()
        }
    }

    fn module(handle: ObjectHandle) -> HMODULE {
        HMODULE(handle.0 as *mut c_void)
    }

    /// Loader backed by the Win32 module APIs
    #[derive(Debug, Default)]
    pub struct Win32Loader {
        loaded: HashSet<usize>,
    }

    impl Win32Loader {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl SharedObjectLoader for Win32Loader {
        fn load_object(&mut self, path: &str) -> Result<ObjectHandle, LoadError> {
            let wide: Vec<u16> = path.encode_utf16().chain(std::iter::once(0)).collect();
            // SAFETY: `wide` is NUL-terminated and outlives the call.
            let result = unsafe { LoadLibraryW(PCWSTR(wide.as_ptr())) };
            match result {
                Ok(hmodule) => {
                    let handle = ObjectHandle(hmodule.0 as usize);
                    self.loaded.insert(handle.0);
                    tracing::debug!(path, "library loaded");
                    Ok(handle)
                }
                Err(err) => Err(LoadError::Object {
                    path: path.to_string(),
                    message: system_message(err.message()),
                }),
            }
        }

        fn load_function(&self, handle: ObjectHandle, name: &str) -> Result<Symbol, LoadError> {
            let function_error = |message: String| LoadError::Function {
                name: name.to_string(),
                message,
            };
            if !self.loaded.contains(&handle.0) {
                return Err(function_error("Invalid library handle".to_string()));
            }
            let cname =
                CString::new(name).map_err(|_| function_error("Invalid symbol name".to_string()))?;
            // SAFETY: The handle came from LoadLibraryW and is still loaded;
            // `cname` is NUL-terminated and outlives the call.
            let proc = unsafe { GetProcAddress(module(handle), PCSTR(cname.as_ptr().cast())) };
            match proc {
                Some(address) => Ok(Symbol(address as usize)),
                None => Err(function_error(last_error_message())),
            }
        }

        fn unload_object(&mut self, handle: ObjectHandle) {
            if !self.loaded.remove(&handle.0) {
                return;
            }
            // SAFETY: The handle came from LoadLibraryW and is released once.
            if let Err(err) = unsafe { FreeLibrary(module(handle)) } {
                tracing::warn!(%err, "FreeLibrary failed");
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_load_system_library() {
            let mut loader = Win32Loader::new();
            let handle = loader.load_object("kernel32.dll").unwrap();
            let symbol = loader.load_function(handle, "GetTickCount").unwrap();
            assert_ne!(symbol.addr(), 0);

            let err = loader
                .load_function(handle, "NoSuchFunctionAnywhere")
                .unwrap_err();
            assert!(err
                .to_string()
                .starts_with("Failed loading NoSuchFunctionAnywhere: "));

            loader.unload_object(handle);
            assert!(loader.load_function(handle, "GetTickCount").is_err());
        }

        #[test]
        fn test_missing_library() {
            let mut loader = Win32Loader::new();
            let err = loader.load_object("no_such_library_1234.dll").unwrap_err();
            assert!(err
                .to_string()
                .starts_with("Failed loading no_such_library_1234.dll: "));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_loader_reports_missing_library() {
        let mut loader = system_loader();
        let err = loader.load_object("WING32_MISSING.DLL").unwrap_err();
        assert!(err.to_string().starts_with("Failed loading WING32_MISSING.DLL: "));
    }
}
