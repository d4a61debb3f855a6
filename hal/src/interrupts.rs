//! Interrupt vector abstraction
//!
//! Backends that capture input in interrupt context install a handler on a
//! vector, keep whatever handler was there before, chain to it, and put it
//! back on teardown. `InstalledVector` makes that restore a scoped
//! obligation: it runs on `restore()` or on drop, whichever comes first.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Interrupt handler
///
/// Shared so the previous handler can be both chained to and restored.
pub type InterruptHandler = Arc<dyn Fn() + Send + Sync>;

/// Interrupt errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InterruptError {
    #[error("Interrupt vector {0:#04x} is reserved")]
    Reserved(u8),

    #[error("No handler installed on vector {0:#04x}")]
    NotInstalled(u8),
}

/// Interrupt vector table trait
///
/// Implementations model a platform's get/set vector calls. Methods take
/// `&self`; tables are shared between the driver and whatever raises the
/// interrupts.
pub trait InterruptVectors: Send + Sync {
    /// Returns the handler currently installed on `vector`
    fn vector(&self, vector: u8) -> Option<InterruptHandler>;

    /// Installs `handler` on `vector`, or clears it with `None`
    fn set_vector(
        &self,
        vector: u8,
        handler: Option<InterruptHandler>,
    ) -> Result<(), InterruptError>;
}

/// A handler installed on a vector, owning the handler it replaced
pub struct InstalledVector {
    vectors: Arc<dyn InterruptVectors>,
    vector: u8,
    previous: Option<InterruptHandler>,
    restored: bool,
}

impl InstalledVector {
    /// Installs a handler built from the currently installed one.
    ///
    /// `build` receives the previous handler so the new one can chain to it.
    pub fn install<F>(
        vectors: Arc<dyn InterruptVectors>,
        vector: u8,
        build: F,
    ) -> Result<Self, InterruptError>
    where
        F: FnOnce(Option<InterruptHandler>) -> InterruptHandler,
    {
        let previous = vectors.vector(vector);
        let handler = build(previous.clone());
        vectors.set_vector(vector, Some(handler))?;
        tracing::debug!(
            vector,
            chained = previous.is_some(),
            "interrupt handler installed"
        );
        Ok(Self {
            vectors,
            vector,
            previous,
            restored: false,
        })
    }

    /// Returns the vector this guard manages
    pub fn vector(&self) -> u8 {
        self.vector
    }

    /// Returns true if a previous handler is being chained to
    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    /// Puts the previous handler back. Later calls do nothing.
    pub fn restore(&mut self) {
        if self.restored {
            return;
        }
        self.restored = true;
        if let Err(err) = self.vectors.set_vector(self.vector, self.previous.take()) {
            tracing::warn!(vector = self.vector, %err, "failed to restore interrupt vector");
            return;
        }
        tracing::debug!(vector = self.vector, "interrupt handler restored");
    }
}

impl Drop for InstalledVector {
    fn drop(&mut self) {
        self.restore();
    }
}

impl fmt::Debug for InstalledVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstalledVector")
            .field("vector", &self.vector)
            .field("has_previous", &self.previous.is_some())
            .field("restored", &self.restored)
            .finish()
    }
}
