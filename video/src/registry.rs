//! Backend bootstrap and selection.

use crate::config::VideoConfig;
use crate::device::VideoDevice;
use crate::error::VideoError;

/// Entry point a backend registers
pub trait VideoBackend: Send + Sync {
    /// Short name matched against the configured driver
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Whether the backend can run on this machine
    fn available(&self) -> bool;

    /// Creates a device instance
    fn create(&self, config: &VideoConfig) -> Result<Box<dyn VideoDevice>, VideoError>;
}

/// Ordered set of backends
///
/// Registration order is priority order.
#[derive(Default)]
pub struct VideoRegistry {
    backends: Vec<Box<dyn VideoBackend>>,
}

impl VideoRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a backend at the lowest priority
    pub fn register(&mut self, backend: Box<dyn VideoBackend>) {
        tracing::debug!(name = backend.name(), "video backend registered");
        self.backends.push(backend);
    }

    /// Builder form of `register`
    pub fn with(mut self, backend: Box<dyn VideoBackend>) -> Self {
        self.register(backend);
        self
    }

    /// Backend names in priority order
    pub fn names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Creates a device.
    ///
    /// With a configured driver, only the backend whose name prefixes it
    /// (case-insensitively) is tried. Otherwise every available backend is
    /// tried in order and the first that creates a device wins.
    pub fn open(&self, config: &VideoConfig) -> Result<Box<dyn VideoDevice>, VideoError> {
        if let Some(wanted) = config.driver.as_deref() {
            let backend = self
                .backends
                .iter()
                .find(|b| name_matches(b.name(), wanted))
                .filter(|b| b.available())
                .ok_or_else(|| VideoError::DriverNotAvailable(wanted.to_string()))?;
            let device = backend.create(config)?;
            tracing::info!(driver = backend.name(), "video driver selected");
            return Ok(device);
        }

        for backend in self.backends.iter().filter(|b| b.available()) {
            match backend.create(config) {
                Ok(device) => {
                    tracing::info!(driver = backend.name(), "video driver selected");
                    return Ok(device);
                }
                Err(err) => {
                    tracing::debug!(driver = backend.name(), %err, "video driver failed to start");
                }
            }
        }
        Err(VideoError::NoVideoDevice)
    }
}

fn name_matches(name: &str, wanted: &str) -> bool {
    wanted
        .get(..name.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(name))
}
