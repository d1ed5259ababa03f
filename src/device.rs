//! Device records and their handles.
//!
//! The stack side admits a record when a device opens and hands the
//! event callback a [`DeviceHandle`]. The callback releases it on close.
//! Handles carry a generation, so a released (or reused) slot can never
//! be read or released again through an old handle.

use crate::addr::BdAddr;
use crate::error::Error;
use crate::gap::{DeviceName, HidUsage, Transport};
use core::fmt;

/// Opaque reference to a device record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceHandle {
    index: usize,
    generation: u16,
}

/// What the host knows about an open device.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceRecord {
    pub addr: BdAddr,
    pub name: Option<DeviceName>,
    pub transport: Transport,
    pub usage: HidUsage,
    /// Number of input reports declared by the report map.
    pub report_count: usize,
    /// Set on open when `addr` matches the configured target; reports
    /// from this session are decoded only when it is set.
    pub is_target: bool,
}

impl DeviceRecord {
    pub fn new(addr: BdAddr, transport: Transport) -> Self {
        Self {
            addr,
            name: None,
            transport,
            usage: HidUsage::Generic,
            report_count: 0,
            is_target: false,
        }
    }

    pub fn name_str(&self) -> &str {
        self.name.as_ref().map(|n| n.as_str()).unwrap_or("")
    }
}

/// Multi-line device dump logged on open.
impl fmt::Display for DeviceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Device {} ({})", self.addr, self.transport.as_str().trim_end())?;
        writeln!(f, "  Name:    {}", self.name_str())?;
        writeln!(f, "  Usage:   {}", self.usage.as_str())?;
        write!(f, "  Reports: {}", self.report_count)
    }
}

struct Slot {
    generation: u16,
    record: Option<DeviceRecord>,
}

/// Fixed pool of device records.
pub struct DeviceTable<const N: usize> {
    slots: [Slot; N],
}

impl<const N: usize> DeviceTable<N> {
    pub const fn new() -> Self {
        const EMPTY: Slot = Slot {
            generation: 0,
            record: None,
        };
        Self { slots: [EMPTY; N] }
    }

    /// Store a record and return its handle.
    pub fn admit(&mut self, record: DeviceRecord) -> Result<DeviceHandle, Error> {
        let (index, slot) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, s)| s.record.is_none())
            .ok_or(Error::DevicePoolExhausted)?;
        slot.record = Some(record);
        Ok(DeviceHandle {
            index,
            generation: slot.generation,
        })
    }

    fn slot(&self, handle: DeviceHandle) -> Option<&Slot> {
        self.slots
            .get(handle.index)
            .filter(|s| s.generation == handle.generation)
    }

    pub fn get(&self, handle: DeviceHandle) -> Option<&DeviceRecord> {
        self.slot(handle)?.record.as_ref()
    }

    pub fn get_mut(&mut self, handle: DeviceHandle) -> Option<&mut DeviceRecord> {
        self.slots
            .get_mut(handle.index)
            .filter(|s| s.generation == handle.generation)?
            .record
            .as_mut()
    }

    /// Free the record. A second release of the same handle fails.
    pub fn release(&mut self, handle: DeviceHandle) -> Result<DeviceRecord, Error> {
        let slot = self
            .slots
            .get_mut(handle.index)
            .filter(|s| s.generation == handle.generation)
            .ok_or(Error::StaleHandle)?;
        let record = slot.record.take().ok_or(Error::StaleHandle)?;
        slot.generation = slot.generation.wrapping_add(1);
        Ok(record)
    }

    /// Handle of the open record for `addr`, if any.
    pub fn find(&self, addr: &BdAddr) -> Option<DeviceHandle> {
        self.slots.iter().enumerate().find_map(|(index, s)| {
            s.record
                .as_ref()
                .filter(|r| r.addr == *addr)
                .map(|_| DeviceHandle {
                    index,
                    generation: s.generation,
                })
        })
    }

    pub fn open_count(&self) -> usize {
        self.slots.iter().filter(|s| s.record.is_some()).count()
    }
}

impl<const N: usize> Default for DeviceTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(last: u8) -> DeviceRecord {
        DeviceRecord::new(BdAddr::new([0, 0, 0, 0, 0, last]), Transport::Ble)
    }

    #[test]
    fn admit_and_get() {
        let mut table: DeviceTable<2> = DeviceTable::new();
        let h = table.admit(record(1)).unwrap();
        assert_eq!(table.get(h).unwrap().addr.bytes()[5], 1);
        assert_eq!(table.open_count(), 1);
        assert_eq!(table.find(&BdAddr::new([0, 0, 0, 0, 0, 1])), Some(h));
    }

    #[test]
    fn pool_exhaustion() {
        let mut table: DeviceTable<2> = DeviceTable::new();
        table.admit(record(1)).unwrap();
        table.admit(record(2)).unwrap();
        assert_eq!(table.admit(record(3)), Err(Error::DevicePoolExhausted));
    }

    #[test]
    fn double_release_is_detected() {
        let mut table: DeviceTable<1> = DeviceTable::new();
        let h = table.admit(record(1)).unwrap();
        assert!(table.release(h).is_ok());
        assert_eq!(table.release(h), Err(Error::StaleHandle));
        assert!(table.get(h).is_none());
        assert_eq!(table.open_count(), 0);
    }

    #[test]
    fn stale_handle_cannot_reach_reused_slot() {
        let mut table: DeviceTable<1> = DeviceTable::new();
        let old = table.admit(record(1)).unwrap();
        table.release(old).unwrap();
        let new = table.admit(record(2)).unwrap();
        assert_ne!(old, new);
        assert!(table.get(old).is_none());
        assert!(table.get_mut(old).is_none());
        assert_eq!(table.release(old), Err(Error::StaleHandle));
        assert_eq!(table.get(new).unwrap().addr.bytes()[5], 2);
    }

    #[test]
    fn handles_past_256_slots_stay_distinct() {
        let mut table: DeviceTable<300> = DeviceTable::new();
        let handles: Vec<DeviceHandle> = (0..257u16)
            .map(|i| {
                let [hi, lo] = i.to_be_bytes();
                table
                    .admit(DeviceRecord::new(BdAddr::new([0, 0, 0, 0, hi, lo]), Transport::Ble))
                    .unwrap()
            })
            .collect();
        assert_eq!(
            table.get(handles[256]).unwrap().addr,
            BdAddr::new([0, 0, 0, 0, 1, 0])
        );
        table.release(handles[256]).unwrap();
        assert_eq!(
            table.get(handles[0]).unwrap().addr,
            BdAddr::new([0, 0, 0, 0, 0, 0])
        );
    }

    #[test]
    fn repeated_cycles_do_not_leak() {
        let mut table: DeviceTable<2> = DeviceTable::new();
        for i in 0..100u8 {
            let h = table.admit(record(i)).unwrap();
            table.release(h).unwrap();
        }
        assert_eq!(table.open_count(), 0);
    }

    #[test]
    fn device_dump() {
        let mut rec = record(7);
        rec.name = Some(DeviceName::try_from("Pad").unwrap());
        rec.usage = HidUsage::Gamepad;
        rec.report_count = 1;
        let mut s: heapless::String<128> = heapless::String::new();
        core::fmt::write(&mut s, format_args!("{}", rec)).unwrap();
        assert_eq!(
            s.as_str(),
            "Device 00:00:00:00:00:07 (BLE)\n  Name:    Pad\n  Usage:   GAMEPAD\n  Reports: 1"
        );
    }
}
