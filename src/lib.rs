//! Host-testable core of the hidhost firmware.
//!
//! Addresses and scan results, the gamepad report decoder, device
//! handles, event dispatch, the scan-and-connect sequence, the startup
//! policy, and the flash-backed store. The SoftDevice glue lives in the
//! binary (`src/main.rs`, feature `embedded`) and reaches this code
//! through the [`host::HidHost`] and [`boot::PersistentStore`] traits.
//!
//! Usage: `cargo test --lib --tests`
//!
//! With the `defmt` feature the library logs through `defmt`; without it
//! the log calls compile to nothing.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod log;

pub mod addr;
pub mod boot;
pub mod config;
pub mod device;
pub mod error;
pub mod event;
pub mod gap;
pub mod hid;
pub mod host;
pub mod scan;
pub mod storage;

pub use addr::{AddrType, BdAddr};
pub use device::{DeviceHandle, DeviceRecord, DeviceTable};
pub use error::{Error, InitStage, StoreError};
pub use event::{HidEvent, HidEventHandler, Outcome};
pub use gap::{HidUsage, ScanResult, Transport};
pub use host::{HidHost, StackMode};
pub use scan::{scan_and_connect, ScanOutcome};
