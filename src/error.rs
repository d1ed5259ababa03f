//! Unified error type for hidhost.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.

/// Top-level error type used across the application.
///
/// Only [`Error::FatalInit`] stops the firmware; everything else is
/// logged and the system keeps running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Startup could not complete (storage, stack, or event delivery).
    FatalInit(InitStage),

    /// The discovery scan could not start or ended abnormally.
    ScanFailed,

    /// An open request was rejected or the link could not be set up.
    ConnectFailed,

    /// An input report had the wrong length and was dropped.
    MalformedReport(usize),

    /// Every device record is in use.
    DevicePoolExhausted,

    /// The device handle was already released (or never issued).
    StaleHandle,
}

/// Which startup step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitStage {
    /// Persistent key-value storage.
    Storage,
    /// Bluetooth stack / radio.
    Stack,
    /// HID host event delivery.
    EventHandler,
}

/// Failures reported by a persistent store during bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// The region has no free pages left.
    NoFreePages,
    /// The region holds data in an incompatible format.
    NewVersionFound,
    /// Any other flash failure.
    Io,
}

// Convenience conversions

impl From<InitStage> for Error {
    fn from(stage: InitStage) -> Self {
        Error::FatalInit(stage)
    }
}

impl From<StoreError> for Error {
    fn from(_: StoreError) -> Self {
        Error::FatalInit(InitStage::Storage)
    }
}

impl Error {
    /// Whether this error must halt the firmware.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::FatalInit(_))
    }
}
