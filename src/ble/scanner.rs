//! BLE GAP scanner - discovers nearby HID peripherals.
//!
//! Uses the SoftDevice Central-role scanning API. A peripheral is kept
//! when its advertisement carries the HID Service UUID (0x1812) or a HID
//! appearance; scan responses for already-kept peripherals fill in the
//! name.

use defmt::{info, warn};
use embassy_time::{with_timeout, Duration};
use heapless::Vec;
use hidhost::config::MAX_SCAN_RESULTS;
use hidhost::gap::adv_parser::{contains_hid_service_uuid, extract_appearance, extract_device_name};
use hidhost::gap::{HidUsage, ScanDetails, ScanResult};
use hidhost::Error;
use nrf_softdevice::ble::{central, Address};
use nrf_softdevice::Softdevice;

use super::from_nrf_address;

/// Appearance category for HID devices (0x03C0..=0x03CF).
const APPEARANCE_HID_CATEGORY: u16 = 0x03C0 >> 6;

/// Results of one scan pass, in discovery order.
pub struct ScanList(Vec<ScanResult, MAX_SCAN_RESULTS>);

impl AsRef<[ScanResult]> for ScanList {
    fn as_ref(&self) -> &[ScanResult] {
        &self.0
    }
}

fn is_hid_appearance(appearance: u16) -> bool {
    appearance >> 6 == APPEARANCE_HID_CATEGORY
}

/// Run a BLE scan for `duration_secs` seconds.
///
/// Returns early if the result buffer fills up.
pub async fn scan(sd: &Softdevice, duration_secs: u32) -> Result<ScanList, Error> {
    info!("BLE scan starting ({} s window)", duration_secs);

    let mut found: Vec<ScanResult, MAX_SCAN_RESULTS> = Vec::new();

    let config = central::ScanConfig {
        // Active scan to retrieve scan-response data (device names).
        active: true,
        ..Default::default()
    };

    let scan = central::scan(sd, &config, |params| {
        let data =
            unsafe { core::slice::from_raw_parts(params.data.p_data, params.data.len as usize) };
        let (addr, addr_type) = from_nrf_address(&Address::from_raw(params.peer_addr));

        if let Some(existing) = found.iter_mut().find(|r| r.addr == addr) {
            if existing.name.is_none() {
                existing.name = extract_device_name(data);
            }
            return None;
        }

        let appearance = extract_appearance(data);
        let is_hid = contains_hid_service_uuid(data)
            || appearance.map(is_hid_appearance).unwrap_or(false);
        if !is_hid {
            return None;
        }

        let appearance = appearance.unwrap_or(0);
        let result = ScanResult {
            addr,
            rssi: params.rssi,
            usage: HidUsage::from_appearance(appearance),
            name: extract_device_name(data),
            details: ScanDetails::Le {
                appearance,
                addr_type,
            },
        };
        info!("Found: {} (RSSI {})", addr, result.rssi);
        let _ = found.push(result);

        // Return None to keep scanning, Some(()) to stop.
        if found.is_full() {
            Some(()) // Buffer full - stop early
        } else {
            None
        }
    });

    match with_timeout(Duration::from_secs(duration_secs as u64), scan).await {
        // Window elapsed: the normal end of a scan.
        Err(_) => {}
        Ok(Ok(())) => info!("BLE scan stopped early - result buffer full"),
        Ok(Err(e)) => {
            warn!("BLE scan ended with error: {:?}", e);
            return Err(Error::ScanFailed);
        }
    }

    info!("BLE scan complete - {} devices found", found.len());
    Ok(ScanList(found))
}
