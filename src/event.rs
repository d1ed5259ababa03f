//! HID host event callback.
//!
//! The stack delivers one [`HidEvent`] at a time from its own context.
//! [`HidEventHandler::handle`] dispatches on the kind, never blocks, and
//! releases the device handle when the device closes.
//!
//! Filtering policy: input *and* feature reports are only processed for
//! the session whose address matched the target on open. Reports from
//! any other device are ignored.

use crate::addr::BdAddr;
use crate::device::{DeviceHandle, DeviceTable};
use crate::error::Error;
use crate::gap::HidUsage;
use crate::hid::{render_report, ReportData, ReportLine};

/// HCI disconnect reason code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisconnectReason(pub u8);

impl DisconnectReason {
    /// Used when the stack does not report a reason.
    pub const UNKNOWN: Self = Self(0x00);

    pub fn as_str(&self) -> &'static str {
        match self.0 {
            0x08 => "CONN_TIMEOUT",
            0x13 => "REMOTE_USER_TERMINATED",
            0x14 => "REMOTE_LOW_RESOURCES",
            0x15 => "REMOTE_POWER_OFF",
            0x16 => "LOCAL_HOST_TERMINATED",
            0x22 => "LMP_RESPONSE_TIMEOUT",
            0x3D => "MIC_FAILURE",
            0x3E => "FAILED_TO_ESTABLISH",
            _ => "UNKNOWN",
        }
    }
}

/// A report delivered by an open device.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Report {
    pub dev: DeviceHandle,
    pub usage: HidUsage,
    /// Index of the report map the report belongs to.
    pub map_index: u8,
    pub report_id: u8,
    pub data: ReportData,
}

/// Events delivered by the HID host stack.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HidEvent {
    /// A device finished connecting; its record is in the table.
    Open { dev: DeviceHandle },
    /// An open request did not produce a device.
    OpenFailed { addr: BdAddr },
    /// Battery level in percent.
    Battery { dev: DeviceHandle, level: u8 },
    Input(Report),
    Feature(Report),
    /// The device went away. Its handle must be released.
    Close {
        dev: DeviceHandle,
        reason: DisconnectReason,
    },
    /// Any other stack event, by numeric kind.
    Other(u32),
}

/// What handling one event did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Opened { is_target: bool },
    OpenFailed,
    Battery(u8),
    /// A target input report was decoded and logged.
    Rendered(ReportLine),
    /// A target report had the wrong length.
    Dropped(usize),
    /// A target feature report was logged.
    FeatureLogged,
    /// The report came from a device other than the target.
    Ignored,
    Closed,
    /// The event referenced a handle that is no longer valid.
    StaleHandle,
    Unhandled(u32),
}

/// Dispatches stack events for one configured target device.
pub struct HidEventHandler {
    target: BdAddr,
}

impl HidEventHandler {
    pub const fn new(target: BdAddr) -> Self {
        Self { target }
    }

    pub fn target(&self) -> BdAddr {
        self.target
    }

    pub fn handle<const N: usize>(
        &mut self,
        devices: &mut DeviceTable<N>,
        event: HidEvent,
    ) -> Outcome {
        match event {
            HidEvent::Open { dev } => {
                let Some(record) = devices.get_mut(dev) else {
                    return stale(dev);
                };
                info!("{} OPEN: {}", record.addr, record.name_str());
                #[cfg(feature = "defmt")]
                ::defmt::info!("{}", defmt::Display2Format(&*record));
                record.is_target = record.addr == self.target;
                if record.is_target {
                    info!("target device connected");
                }
                Outcome::Opened {
                    is_target: record.is_target,
                }
            }
            HidEvent::OpenFailed { addr } => {
                warn!("{} OPEN failed: {}", addr, Error::ConnectFailed);
                Outcome::OpenFailed
            }
            HidEvent::Battery { dev, level } => {
                let Some(record) = devices.get(dev) else {
                    return stale(dev);
                };
                info!("{} BATTERY: {}%", record.addr, level);
                Outcome::Battery(level)
            }
            HidEvent::Input(report) => {
                let Some(record) = devices.get(report.dev) else {
                    return stale(report.dev);
                };
                if !record.is_target {
                    return Outcome::Ignored;
                }
                match render_report(&report.data) {
                    Some(line) => {
                        info!("{}", line.as_str());
                        Outcome::Rendered(line)
                    }
                    None => {
                        let len = report.data.len();
                        debug!("{} INPUT dropped: {}", record.addr, Error::MalformedReport(len));
                        Outcome::Dropped(len)
                    }
                }
            }
            HidEvent::Feature(report) => {
                let Some(record) = devices.get(report.dev) else {
                    return stale(report.dev);
                };
                if !record.is_target {
                    return Outcome::Ignored;
                }
                info!(
                    "{} FEATURE: {}, MAP: {}, ID: {}, Len: {}",
                    record.addr,
                    report.usage.as_str(),
                    report.map_index,
                    report.report_id,
                    report.data.len()
                );
                info!("{=[u8]:x}", &report.data[..]);
                Outcome::FeatureLogged
            }
            HidEvent::Close { dev, reason } => match devices.release(dev) {
                Ok(record) => {
                    info!(
                        "{} CLOSE: '{}' {}",
                        record.addr,
                        record.name_str(),
                        reason.as_str()
                    );
                    Outcome::Closed
                }
                Err(_) => stale(dev),
            },
            HidEvent::Other(kind) => {
                info!("EVENT: {}", kind);
                Outcome::Unhandled(kind)
            }
        }
    }
}

fn stale(dev: DeviceHandle) -> Outcome {
    warn!("event for released device {}: {}", dev, Error::StaleHandle);
    Outcome::StaleHandle
}
