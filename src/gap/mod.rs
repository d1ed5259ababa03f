//! GAP-level model of a discovery scan.
//!
//! A scan yields one [`ScanResult`] per HID peripheral; its `Display`
//! impl is the one-line summary printed by the scan task.

pub mod adv_parser;

use crate::addr::{AddrType, BdAddr};
use core::fmt;

/// Device names are truncated to this many bytes.
pub type DeviceName = heapless::String<32>;

/// Link type of a discovered device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transport {
    /// Bluetooth Low Energy (HID over GATT).
    Ble,
    /// Bluetooth classic (BR/EDR HID).
    Bt,
}

impl Transport {
    /// Fixed-width label used in scan summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Ble => "BLE",
            Transport::Bt => "BT ",
        }
    }
}

/// Primary usage class of a HID device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HidUsage {
    Generic,
    Keyboard,
    Mouse,
    Joystick,
    Gamepad,
    Tablet,
    ConsumerControl,
    Vendor,
}

impl HidUsage {
    pub fn as_str(&self) -> &'static str {
        match self {
            HidUsage::Generic => "GENERIC",
            HidUsage::Keyboard => "KEYBOARD",
            HidUsage::Mouse => "MOUSE",
            HidUsage::Joystick => "JOYSTICK",
            HidUsage::Gamepad => "GAMEPAD",
            HidUsage::Tablet => "TABLET",
            HidUsage::ConsumerControl => "CCONTROL",
            HidUsage::Vendor => "VENDOR",
        }
    }

    /// Derive the usage from a GAP appearance value (LE).
    pub fn from_appearance(appearance: u16) -> Self {
        match appearance {
            0x0180 => HidUsage::ConsumerControl, // Generic Remote Control
            0x03C1 => HidUsage::Keyboard,
            0x03C2 => HidUsage::Mouse,
            0x03C3 => HidUsage::Joystick,
            0x03C4 => HidUsage::Gamepad,
            0x03C5 | 0x03C7 => HidUsage::Tablet, // Digitizer Tablet, Digital Pen
            _ => HidUsage::Generic,
        }
    }

    /// Derive the usage from a classic Class of Device.
    pub fn from_cod(cod: &ClassOfDevice) -> Self {
        if cod.major != COD_MAJOR_PERIPHERAL {
            return HidUsage::Generic;
        }
        match cod.minor & 0x0F {
            1 => return HidUsage::Joystick,
            2 => return HidUsage::Gamepad,
            3 => return HidUsage::ConsumerControl,
            5 => return HidUsage::Tablet,
            _ => {}
        }
        match cod.minor >> 4 {
            1 | 3 => HidUsage::Keyboard,
            2 => HidUsage::Mouse,
            _ => HidUsage::Generic,
        }
    }
}

const COD_MAJOR_PERIPHERAL: u8 = 0x05;

/// Class of Device (classic), split into its three fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClassOfDevice {
    /// Major device class (5 bits).
    pub major: u8,
    /// Minor device class (6 bits).
    pub minor: u8,
    /// Major service classes (11 bits).
    pub service: u16,
}

impl ClassOfDevice {
    /// Decode the 24-bit over-the-air CoD value.
    pub fn from_raw(cod: u32) -> Self {
        Self {
            minor: ((cod >> 2) & 0x3F) as u8,
            major: ((cod >> 8) & 0x1F) as u8,
            service: ((cod >> 13) & 0x7FF) as u16,
        }
    }

    pub fn major_str(&self) -> &'static str {
        match self.major {
            0x00 => "MISC",
            0x01 => "COMPUTER",
            0x02 => "PHONE",
            0x03 => "LAN_NAP",
            0x04 => "AV",
            0x05 => "PERIPHERAL",
            0x06 => "IMAGING",
            0x07 => "WEARABLE",
            0x08 => "TOY",
            0x09 => "HEALTH",
            _ => "UNCATEGORIZED",
        }
    }

    fn write_minor(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.major != COD_MAJOR_PERIPHERAL {
            return write!(f, "0x{:02x}", self.minor);
        }
        let kind = match self.minor >> 4 {
            1 => Some("KEYBOARD"),
            2 => Some("POINTING"),
            3 => Some("COMBO"),
            _ => None,
        };
        let device = match self.minor & 0x0F {
            0 => None,
            1 => Some("JOYSTICK"),
            2 => Some("GAMEPAD"),
            3 => Some("REMOTE"),
            4 => Some("SENSOR"),
            5 => Some("TABLET"),
            6 => Some("CARD_READER"),
            _ => Some("RESERVED"),
        };
        match (kind, device) {
            (Some(k), Some(d)) => write!(f, "{k}+{d}"),
            (Some(k), None) => f.write_str(k),
            (None, Some(d)) => f.write_str(d),
            (None, None) => f.write_str("UNCATEGORIZED"),
        }
    }
}

impl fmt::Display for ClassOfDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.major_str())?;
        f.write_str("[")?;
        self.write_minor(f)?;
        write!(f, "] srv 0x{:03x}", self.service)
    }
}

/// Service UUID advertised by a classic device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServiceUuid {
    Uuid16(u16),
    Uuid32(u32),
    /// Most-significant byte first.
    Uuid128([u8; 16]),
}

impl fmt::Display for ServiceUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceUuid::Uuid16(v) => write!(f, "UUID16: 0x{v:04x}"),
            ServiceUuid::Uuid32(v) => write!(f, "UUID32: 0x{v:08x}"),
            ServiceUuid::Uuid128(b) => {
                f.write_str("UUID128: ")?;
                for (i, byte) in b.iter().enumerate() {
                    if matches!(i, 4 | 6 | 8 | 10) {
                        f.write_str("-")?;
                    }
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }
    }
}

/// Transport-specific part of a scan result.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanDetails {
    Le {
        appearance: u16,
        addr_type: AddrType,
    },
    Classic {
        cod: ClassOfDevice,
        uuid: ServiceUuid,
    },
}

/// One discovered HID device.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanResult {
    pub addr: BdAddr,
    /// Received Signal Strength Indicator (dBm).
    pub rssi: i8,
    pub usage: HidUsage,
    pub name: Option<DeviceName>,
    pub details: ScanDetails,
}

impl ScanResult {
    pub fn transport(&self) -> Transport {
        match self.details {
            ScanDetails::Le { .. } => Transport::Ble,
            ScanDetails::Classic { .. } => Transport::Bt,
        }
    }

    /// Address type to open the device with. Classic devices are
    /// always addressed by their public BD_ADDR.
    pub fn addr_type(&self) -> AddrType {
        match self.details {
            ScanDetails::Le { addr_type, .. } => addr_type,
            ScanDetails::Classic { .. } => AddrType::Public,
        }
    }
}

impl fmt::Display for ScanResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}, RSSI: {}, USAGE: {}, ",
            self.transport().as_str(),
            self.addr,
            self.rssi,
            self.usage.as_str()
        )?;
        match &self.details {
            ScanDetails::Le {
                appearance,
                addr_type,
            } => write!(
                f,
                "APPEARANCE: 0x{:04x}, ADDR_TYPE: '{}', ",
                appearance,
                addr_type.as_str()
            )?,
            ScanDetails::Classic { cod, uuid } => write!(f, "COD: {cod}, {uuid}, ")?,
        }
        let name = self.name.as_ref().map(|n| n.as_str()).unwrap_or("");
        write!(f, "NAME: {name}")
    }
}
