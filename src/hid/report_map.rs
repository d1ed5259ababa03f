//! HID Report Map (report descriptor) walker.
//!
//! Reads the Report Map characteristic of a connected device and works
//! out which top-level application collection each input report ID
//! belongs to. That is enough to label a device (gamepad, keyboard, ...)
//! without interpreting individual fields.
//!
//! ## Limitations
//!
//! - Only the usage of the outermost Application collection is kept
//! - Push/Pop state is not supported
//! - Delimiter tags are ignored

use crate::gap::HidUsage;

/// Maximum number of distinct input report IDs tracked.
pub const MAX_REPORT_IDS: usize = 8;

/// Usage page codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UsagePage {
    /// Generic Desktop (mouse, keyboard, joystick, gamepad).
    GenericDesktop,
    /// Digitizers (tablets, pens).
    Digitizer,
    /// Consumer Control.
    Consumer,
    /// Vendor-defined (0xFF00..=0xFFFF).
    Vendor,
    /// Unknown/unsupported.
    Unknown(u16),
}

impl From<u16> for UsagePage {
    fn from(code: u16) -> Self {
        match code {
            0x01 => UsagePage::GenericDesktop,
            0x0C => UsagePage::Consumer,
            0x0D => UsagePage::Digitizer,
            0xFF00..=0xFFFF => UsagePage::Vendor,
            other => UsagePage::Unknown(other),
        }
    }
}

fn application_usage(page: UsagePage, usage: u16) -> HidUsage {
    match page {
        UsagePage::GenericDesktop => match usage {
            0x01 | 0x02 => HidUsage::Mouse,
            0x04 => HidUsage::Joystick,
            0x05 => HidUsage::Gamepad,
            0x06 | 0x07 => HidUsage::Keyboard,
            _ => HidUsage::Generic,
        },
        UsagePage::Digitizer => HidUsage::Tablet,
        UsagePage::Consumer => HidUsage::ConsumerControl,
        UsagePage::Vendor => HidUsage::Vendor,
        UsagePage::Unknown(_) => HidUsage::Generic,
    }
}

/// Input report ID → application usage, in descriptor order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReportMap {
    reports: heapless::Vec<(u8, HidUsage), MAX_REPORT_IDS>,
}

impl ReportMap {
    /// Usage of the first application collection with an input report.
    pub fn primary_usage(&self) -> Option<HidUsage> {
        self.reports.first().map(|(_, usage)| *usage)
    }

    /// Usage for a report ID (0 when the device uses no report IDs).
    pub fn usage_for_id(&self, report_id: u8) -> Option<HidUsage> {
        self.reports
            .iter()
            .find(|(id, _)| *id == report_id)
            .map(|(_, usage)| *usage)
    }

    /// Number of distinct input reports found.
    pub fn report_count(&self) -> usize {
        self.reports.len()
    }

    /// Parse a HID Report Descriptor.
    ///
    /// Returns `None` when the descriptor declares no input reports.
    pub fn parse(data: &[u8]) -> Option<Self> {
        let mut map = ReportMap::default();

        // Parser state.
        let mut usage_page: u16 = 0;
        let mut usage: Option<(u16, u16)> = None;
        let mut report_id: u8 = 0;
        let mut depth: u8 = 0;
        let mut application = HidUsage::Generic;

        let mut i = 0;
        while i < data.len() {
            let prefix = data[i];
            let tag = (prefix >> 4) & 0x0F;
            let item_type = (prefix >> 2) & 0x03;
            let size = match prefix & 0x03 {
                0 => 0,
                1 => 1,
                2 => 2,
                _ => 4,
            };

            if i + 1 + size > data.len() {
                break;
            }

            let value: u32 = match size {
                0 => 0,
                1 => data[i + 1] as u32,
                2 => u16::from_le_bytes([data[i + 1], data[i + 2]]) as u32,
                _ => u32::from_le_bytes([data[i + 1], data[i + 2], data[i + 3], data[i + 4]]),
            };

            match item_type {
                // Main items
                0 => {
                    match tag {
                        // Input
                        0x08 => {
                            if map.usage_for_id(report_id).is_none()
                                && map.reports.push((report_id, application)).is_err()
                            {
                                debug!("Report map: more than {} input reports", MAX_REPORT_IDS);
                            }
                        }
                        // Collection
                        0x0A => {
                            // 0x01 = Application
                            if depth == 0 && value == 0x01 {
                                application = usage
                                    .map(|(page, u)| application_usage(UsagePage::from(page), u))
                                    .unwrap_or(HidUsage::Generic);
                            }
                            depth = depth.saturating_add(1);
                        }
                        // End Collection
                        0x0C => depth = depth.saturating_sub(1),
                        _ => {}
                    }
                    // Local items only apply to the next main item.
                    usage = None;
                }
                // Global items
                1 => match tag {
                    // Usage Page
                    0x00 => usage_page = value as u16,
                    // Report ID
                    0x08 => report_id = value as u8,
                    _ => {}
                },
                // Local items
                2 => {
                    // Usage; a 4-byte usage carries its own page.
                    if tag == 0x00 && usage.is_none() {
                        usage = Some(if size == 4 {
                            ((value >> 16) as u16, value as u16)
                        } else {
                            (usage_page, value as u16)
                        });
                    }
                }
                _ => {}
            }

            i += 1 + size;
        }

        if map.reports.is_empty() {
            debug!("Report map: no input reports found");
            None
        } else {
            Some(map)
        }
    }
}
