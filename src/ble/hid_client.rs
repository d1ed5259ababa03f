//! BLE GATT HID Client - discovers and subscribes to HID Report
//! characteristics on a connected peripheral.
//!
//! After GAP connection is established, this module:
//! 1. Discovers the HID Service (UUID 0x1812) and reads its Report Map.
//! 2. Enables CCCD notifications on the HID Report characteristic.
//! 3. Reads the peer name and battery level when those services exist.
//! 4. Forwards received reports to the event task as [`HidEvent::Input`].

use defmt::{info, warn};
use hidhost::event::Report;
use hidhost::gap::DeviceName;
use hidhost::hid::{ReportData, ReportMap};
use hidhost::{DeviceHandle, Error, HidEvent, HidUsage};
use nrf_softdevice::ble::{gatt_client, Connection};

use super::HID_EVENTS;

/// nrf-softdevice GATT client struct for the HID-over-GATT service.
///
/// The `#[nrf_softdevice::gatt_client]` macro generates discovery and
/// read/write/notify helpers for the listed characteristics.
#[nrf_softdevice::gatt_client(uuid = "1812")]
pub struct HidServiceClient {
    /// HID Report (Input) - notifications carry live controller data.
    #[characteristic(uuid = "2a4d", read, notify)]
    pub hid_report: ReportData,

    /// HID Report Map - the report descriptor.
    #[characteristic(uuid = "2a4b", read)]
    pub report_map: heapless::Vec<u8, 128>,
}

#[nrf_softdevice::gatt_client(uuid = "180f")]
pub struct BatteryServiceClient {
    #[characteristic(uuid = "2a19", read)]
    pub battery_level: u8,
}

#[nrf_softdevice::gatt_client(uuid = "1800")]
pub struct GapServiceClient {
    #[characteristic(uuid = "2a00", read)]
    pub device_name: heapless::Vec<u8, 32>,
}

/// Discover the HID service on the connected peripheral and subscribe
/// to HID Report notifications.
///
/// Returns the client together with the parsed report map, if the peer
/// exposed a readable one.
pub async fn discover_and_subscribe(
    conn: &Connection,
) -> Result<(HidServiceClient, Option<ReportMap>), Error> {
    info!("Discovering HID service...");

    let client: HidServiceClient = gatt_client::discover(conn).await.map_err(|e| {
        warn!("HID service discovery failed: {:?}", e);
        Error::ConnectFailed
    })?;

    info!("HID service discovered");

    let report_map = match client.report_map_read().await {
        Ok(raw) => {
            let map = ReportMap::parse(&raw);
            match &map {
                Some(m) => info!(
                    "Report map parsed: {} input reports, primary usage {}",
                    m.report_count(),
                    m.primary_usage().unwrap_or(HidUsage::Generic)
                ),
                None => warn!("Report map declares no input reports"),
            }
            map
        }
        Err(_) => {
            warn!("Could not read HID report map");
            None
        }
    };

    client.hid_report_cccd_write(true).await.map_err(|e| {
        warn!("Enabling report notifications failed: {:?}", e);
        Error::ConnectFailed
    })?;

    info!("Subscribed to HID report notifications");
    Ok((client, report_map))
}

/// Read the battery level once. `None` when the peer has no Battery
/// service.
pub async fn read_battery(conn: &Connection) -> Option<u8> {
    let client: BatteryServiceClient = gatt_client::discover(conn).await.ok()?;
    client.battery_level_read().await.ok()
}

/// Read the peer's GAP device name.
pub async fn read_device_name(conn: &Connection) -> Option<DeviceName> {
    let client: GapServiceClient = gatt_client::discover(conn).await.ok()?;
    let raw = client.device_name_read().await.ok()?;
    let text = core::str::from_utf8(&raw).ok()?;
    let mut name = DeviceName::new();
    for c in text.chars() {
        if name.push(c).is_err() {
            break;
        }
    }
    Some(name)
}

/// Run the notification listener loop.
///
/// Returns when the connection drops. Each notification becomes one
/// [`HidEvent::Input`]; the event task decides whether to decode it.
pub async fn run_notification_loop(
    conn: &Connection,
    client: &HidServiceClient,
    dev: DeviceHandle,
    report_map: Option<&ReportMap>,
) {
    info!("HID notification loop started");

    // HOGP notifications carry no report ID; the characteristic's report
    // reference maps them to the first input report of the descriptor.
    let usage = report_map
        .and_then(|m| m.primary_usage())
        .unwrap_or(HidUsage::Generic);

    let _ = gatt_client::run(conn, client, |event| match event {
        HidServiceClientEvent::HidReportNotification(data) => {
            let report = Report {
                dev,
                usage,
                map_index: 0,
                report_id: 0,
                data,
            };
            // try_send avoids blocking the SoftDevice event path; if the
            // event task is behind, we drop.
            if HID_EVENTS.try_send(HidEvent::Input(report)).is_err() {
                warn!("HID event queue full - dropping report");
            }
        }
    })
    .await;

    info!("HID notification loop ended (connection closed)");
}
