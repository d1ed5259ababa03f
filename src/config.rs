//! Application-wide constants and compile-time configuration.
//!
//! The target device, scan window, and pool sizes are fixed at build
//! time; nothing here is read at runtime.

use crate::addr::BdAddr;
use crate::host::StackMode;

// HID host

/// The one controller whose reports are decoded and logged.
/// Put your device's Bluetooth device address here.
pub const TARGET_DEVICE: BdAddr = BdAddr::new([0x98, 0x7a, 0x14, 0xae, 0xec, 0xf8]);

/// Duration of the one-shot discovery scan (seconds).
pub const SCAN_DURATION_SECS: u32 = 5;

/// Radio mode requested from the Bluetooth stack at startup.
/// The S140 SoftDevice only provides LE, so `Dual` degrades to LE with a warning.
pub const STACK_MODE: StackMode = StackMode::Dual;

/// Maximum number of HID peripherals kept from one scan.
pub const MAX_SCAN_RESULTS: usize = 8;

/// Size of the device-record pool. Handles that are never released
/// exhaust it over repeated connect/disconnect cycles.
pub const MAX_DEVICES: usize = 2;

/// Largest HID report payload carried in an event.
pub const MAX_REPORT_LEN: usize = 64;

/// Depth of the stack → event-task queue.
pub const EVENT_QUEUE_DEPTH: usize = 8;

// BLE link

/// BLE connection interval range (in 1.25 ms units).
/// 6 = 7.5 ms (lowest latency for HID).
pub const BLE_CONN_INTERVAL_MIN: u16 = 6;
pub const BLE_CONN_INTERVAL_MAX: u16 = 12;

/// BLE slave latency (number of connection events the peripheral can skip).
pub const BLE_SLAVE_LATENCY: u16 = 0;

/// BLE supervision timeout (in 10 ms units). 400 = 4 s.
pub const BLE_SUP_TIMEOUT: u16 = 400;

// Persistent storage

/// Flash page index where the storage region starts (4 KB per page on nRF52840).
pub const STORAGE_FLASH_PAGE_START: u32 = 240;

/// Number of flash pages reserved for the storage region.
pub const STORAGE_FLASH_PAGE_COUNT: u32 = 4;

/// Layout version written into the storage region. Bump it when the
/// record format changes; older regions are erased on boot.
pub const STORAGE_LAYOUT_VERSION: u8 = 1;
