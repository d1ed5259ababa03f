//! Bluetooth Low Energy subsystem.
//!
//! This module drives the Nordic SoftDevice S140 in **Central** role and
//! implements the HID host side of the application on top of it:
//!
//! 1. **Scanner** - discovers nearby BLE peripherals advertising the
//!    HID-over-GATT Profile (HOGP).
//! 2. **HID Client** - GATT discovery of the HID and Battery services on
//!    a connected peripheral, and the report notification loop.
//! 3. **Connection** - the [`hidhost::HidHost`] implementation and the
//!    task that turns open requests into connections and HID events.
//!
//! Communication between tasks goes through the channels defined here.

pub mod connection;
pub mod hid_client;
pub mod scanner;

use core::mem;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::mutex::Mutex;
use hidhost::addr::{AddrType, BdAddr};
use hidhost::config::{EVENT_QUEUE_DEPTH, MAX_DEVICES};
use hidhost::{DeviceTable, HidEvent};
use nrf_softdevice::ble::{Address, AddressType};
use nrf_softdevice::raw;

/// Advertised GAP device name of the host itself.
const DEVICE_NAME: &[u8] = b"hidhost";

/// A connection request from the scan task.
#[derive(Clone, Copy, defmt::Format)]
pub struct OpenRequest {
    pub addr: BdAddr,
    pub addr_type: AddrType,
}

/// Stack → event task.
pub static HID_EVENTS: Channel<CriticalSectionRawMutex, HidEvent, EVENT_QUEUE_DEPTH> =
    Channel::new();

/// Scan task → connection task. One outstanding request at a time.
pub static OPEN_REQUESTS: Channel<CriticalSectionRawMutex, OpenRequest, 1> = Channel::new();

/// Device records shared by the connection task (admits) and the event
/// task (reads and releases).
pub static DEVICES: Mutex<CriticalSectionRawMutex, DeviceTable<MAX_DEVICES>> =
    Mutex::new(DeviceTable::new());

/// SoftDevice configuration: central role only, one link per device record.
pub fn softdevice_config() -> nrf_softdevice::Config {
    nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: MAX_DEVICES as u8,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 128 }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 0,
            central_role_count: MAX_DEVICES as u8,
            central_sec_count: MAX_DEVICES as u8,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: DEVICE_NAME.as_ptr() as _,
            current_len: DEVICE_NAME.len() as u16,
            max_len: DEVICE_NAME.len() as u16,
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    }
}

/// SoftDevice address → application address and type.
pub fn from_nrf_address(address: &Address) -> (BdAddr, AddrType) {
    let addr_type = match address.address_type() {
        AddressType::Public => AddrType::Public,
        AddressType::RandomPrivateResolvable => AddrType::RpaRandom,
        AddressType::RandomStatic
        | AddressType::RandomPrivateNonResolvable
        | AddressType::Anonymous => AddrType::Random,
    };
    (BdAddr::from_le_bytes(address.bytes()), addr_type)
}

/// Application address and type → SoftDevice address.
pub fn to_nrf_address(addr: BdAddr, addr_type: AddrType) -> Address {
    let address_type = match addr_type {
        AddrType::Public | AddrType::RpaPublic => AddressType::Public,
        AddrType::Random => AddressType::RandomStatic,
        AddrType::RpaRandom => AddressType::RandomPrivateResolvable,
    };
    Address::new(address_type, addr.to_le_bytes())
}
