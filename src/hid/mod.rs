//! HID report handling: the fixed-layout gamepad report and the
//! report-map walker used to label devices.

pub mod gamepad;
pub mod report_map;

#[cfg(test)]
mod tests;

pub use gamepad::{render_report, GamepadReport, ReportLine, GAMEPAD_REPORT_SIZE};
pub use report_map::ReportMap;

/// Raw report payload as carried in HID events.
pub type ReportData = heapless::Vec<u8, { crate::config::MAX_REPORT_LEN }>;
