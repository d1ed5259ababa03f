//! Advertising-data (AD structure) helpers for LE scan reports.

use super::DeviceName;

/// HID Service UUID (0x1812) in little-endian.
const HID_SERVICE_UUID_LE: [u8; 2] = [0x12, 0x18];

const AD_INCOMPLETE_UUID16: u8 = 0x02;
const AD_COMPLETE_UUID16: u8 = 0x03;
const AD_SHORTENED_NAME: u8 = 0x08;
const AD_COMPLETE_NAME: u8 = 0x09;
const AD_APPEARANCE: u8 = 0x19;

/// Iterate over `(ad_type, payload)` pairs, stopping at the first
/// malformed length.
fn ad_structures(data: &[u8]) -> impl Iterator<Item = (u8, &[u8])> {
    let mut i = 0;
    core::iter::from_fn(move || {
        let len = *data.get(i)? as usize;
        if len == 0 || i + len >= data.len() {
            return None;
        }
        let ad_type = data[i + 1];
        let payload = &data[i + 2..i + 1 + len];
        i += len + 1;
        Some((ad_type, payload))
    })
}

/// Check if raw advertisement data contains the HID Service UUID (0x1812).
pub fn contains_hid_service_uuid(data: &[u8]) -> bool {
    ad_structures(data)
        .filter(|(ad_type, _)| matches!(*ad_type, AD_INCOMPLETE_UUID16 | AD_COMPLETE_UUID16))
        .any(|(_, uuids)| uuids.chunks_exact(2).any(|c| c == HID_SERVICE_UUID_LE))
}

/// Extract complete/shortened local name from advertisement data.
pub fn extract_device_name(data: &[u8]) -> Option<DeviceName> {
    let (_, name_bytes) = ad_structures(data)
        .find(|(ad_type, _)| matches!(*ad_type, AD_SHORTENED_NAME | AD_COMPLETE_NAME))?;

    let mut name = DeviceName::new();
    for &b in name_bytes {
        if name.push(b as char).is_err() {
            break;
        }
    }
    Some(name)
}

/// Extract the GAP appearance value, if advertised.
pub fn extract_appearance(data: &[u8]) -> Option<u16> {
    ad_structures(data)
        .find(|(ad_type, payload)| *ad_type == AD_APPEARANCE && payload.len() >= 2)
        .map(|(_, payload)| u16::from_le_bytes([payload[0], payload[1]]))
}

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests (run on host, not embedded)
// ═══════════════════════════════════════════════════════════════════════════
