//! Software interrupt vector table
//!
//! A 256-entry table of shared handlers. Under DOS the real-mode vector
//! points at a trampoline that calls `raise` for its vector; in tests,
//! `raise` is called directly to simulate a hardware interrupt.

use hal::interrupts::{InterruptError, InterruptHandler, InterruptVectors};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// Interrupt vector table backed by memory
///
/// Cloning shares the table.
#[derive(Clone)]
pub struct SoftVectorTable {
    handlers: Arc<Mutex<Vec<Option<InterruptHandler>>>>,
}

impl SoftVectorTable {
    /// Creates an empty table
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Mutex::new(vec![None; 256])),
        }
    }

    fn handlers(&self) -> MutexGuard<'_, Vec<Option<InterruptHandler>>> {
        self.handlers.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns whether a handler is installed on `vector`
    pub fn is_installed(&self, vector: u8) -> bool {
        self.handlers()[vector as usize].is_some()
    }

    /// Runs the handler installed on `vector`.
    ///
    /// The table lock is released before the handler runs, so handlers may
    /// themselves touch the table.
    pub fn raise(&self, vector: u8) -> Result<(), InterruptError> {
        let handler = self.handlers()[vector as usize].clone();
        let Some(handler) = handler else {
            return Err(InterruptError::NotInstalled(vector));
        };
        handler();
        Ok(())
    }
}

impl Default for SoftVectorTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SoftVectorTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let installed: Vec<usize> = self
            .handlers()
            .iter()
            .enumerate()
            .filter(|(_, h)| h.is_some())
            .map(|(v, _)| v)
            .collect();
        f.debug_struct("SoftVectorTable")
            .field("installed", &installed)
            .finish()
    }
}

impl InterruptVectors for SoftVectorTable {
    fn vector(&self, vector: u8) -> Option<InterruptHandler> {
        self.handlers()[vector as usize].clone()
    }

    fn set_vector(
        &self,
        vector: u8,
        handler: Option<InterruptHandler>,
    ) -> Result<(), InterruptError> {
        self.handlers()[vector as usize] = handler;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_set_and_raise() {
        let table = SoftVectorTable::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        table
            .set_vector(0x09, Some(Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })))
            .unwrap();

        assert!(table.is_installed(0x09));
        table.raise(0x09).unwrap();
        table.raise(0x09).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_raise_empty_vector() {
        let table = SoftVectorTable::new();
        assert_eq!(table.raise(0x33), Err(InterruptError::NotInstalled(0x33)));
    }

    #[test]
    fn test_clones_share_state() {
        let table = SoftVectorTable::new();
        let other = table.clone();
        other.set_vector(0x1C, Some(Arc::new(|| {}))).unwrap();
        assert!(table.is_installed(0x1C));

        table.set_vector(0x1C, None).unwrap();
        assert!(!other.is_installed(0x1C));
    }

    #[test]
    fn test_handler_may_reenter_table() {
        let table = SoftVectorTable::new();
        let inner = table.clone();
        table
            .set_vector(0x09, Some(Arc::new(move || {
                let _ = inner.vector(0x08);
            })))
            .unwrap();
        table.raise(0x09).unwrap();
    }
}
