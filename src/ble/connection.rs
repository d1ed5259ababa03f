//! HID host on top of the SoftDevice central role.
//!
//! [`NrfHidHost`] is what the scan-and-connect sequence drives: `scan`
//! runs the GAP scanner, `open` queues a request for
//! [`connection_task`], which owns the link for its whole lifetime and
//! reports it to the event task as Open → Battery → Input… → Close.

use core::cell::RefCell;

use defmt::{info, warn};
use embassy_time::{Duration, Timer};
use heapless::Vec;
use hidhost::addr::{AddrType, BdAddr};
use hidhost::config::{self, MAX_DEVICES};
use hidhost::event::DisconnectReason;
use hidhost::hid::ReportMap;
use hidhost::{DeviceHandle, DeviceRecord, Error, HidEvent, HidHost, StackMode, Transport};
use nrf_softdevice::ble::security::{IoCapabilities, SecurityHandler};
use nrf_softdevice::ble::{
    central, Connection, EncryptError, EncryptionInfo, IdentityKey, MasterId, SecurityMode,
};
use nrf_softdevice::raw;
use nrf_softdevice::Softdevice;

use super::scanner::{self, ScanList};
use super::{hid_client, to_nrf_address, OpenRequest, DEVICES, HID_EVENTS, OPEN_REQUESTS};

struct PeerBond {
    master_id: MasterId,
    key: EncryptionInfo,
    peer_id: IdentityKey,
}

/// In-RAM bond table. Keys survive reconnects within one power cycle.
pub struct Bonder {
    peers: RefCell<Vec<PeerBond, MAX_DEVICES>>,
}

impl Bonder {
    pub fn new() -> Self {
        Self {
            peers: RefCell::new(Vec::new()),
        }
    }
}

impl SecurityHandler for Bonder {
    fn io_capabilities(&self) -> IoCapabilities {
        IoCapabilities::None
    }

    fn can_bond(&self, _conn: &Connection) -> bool {
        true
    }

    fn on_bonded(
        &self,
        _conn: &Connection,
        master_id: MasterId,
        key: EncryptionInfo,
        peer_id: IdentityKey,
    ) {
        let mut peers = self.peers.borrow_mut();
        if let Some(existing) = peers.iter_mut().find(|p| p.master_id == master_id) {
            existing.key = key;
            existing.peer_id = peer_id;
            return;
        }

        if peers.is_full() {
            peers.remove(0);
        }

        let _ = peers.push(PeerBond {
            master_id,
            key,
            peer_id,
        });
    }

    fn get_key(&self, _conn: &Connection, master_id: MasterId) -> Option<EncryptionInfo> {
        self.peers
            .borrow()
            .iter()
            .find_map(|p| (p.master_id == master_id).then_some(p.key))
    }

    fn get_peripheral_key(&self, conn: &Connection) -> Option<(MasterId, EncryptionInfo)> {
        self.peers.borrow().iter().find_map(|p| {
            p.peer_id
                .is_match(conn.peer_address())
                .then_some((p.master_id, p.key))
        })
    }

    fn on_security_update(&self, _conn: &Connection, mode: SecurityMode) {
        info!("BLE security mode updated: {}", mode);
    }
}

/// [`HidHost`] backed by the SoftDevice.
pub struct NrfHidHost {
    sd: &'static Softdevice,
    mode: StackMode,
}

impl NrfHidHost {
    pub fn new(sd: &'static Softdevice, mode: StackMode) -> Self {
        Self { sd, mode }
    }
}

impl HidHost for NrfHidHost {
    type ScanList = ScanList;

    async fn scan(&mut self, duration_secs: u32) -> Result<ScanList, Error> {
        scanner::scan(self.sd, duration_secs).await
    }

    async fn open(
        &mut self,
        addr: BdAddr,
        transport: Transport,
        addr_type: AddrType,
    ) -> Result<(), Error> {
        if !self.mode.supports(transport) {
            warn!("{} transport not available in {} mode", transport, self.mode);
            return Err(Error::ConnectFailed);
        }
        OPEN_REQUESTS
            .try_send(OpenRequest { addr, addr_type })
            .map_err(|_| {
                warn!("open request for {} rejected: connection busy", addr);
                Error::ConnectFailed
            })
    }
}

async fn wait_for_secure_link(conn: &Connection) -> bool {
    for _ in 0..25 {
        match conn.security_mode() {
            SecurityMode::NoAccess | SecurityMode::Open => {
                Timer::after(Duration::from_millis(200)).await
            }
            _ => return true,
        }
    }
    false
}

async fn secure(conn: &Connection) -> bool {
    match conn.encrypt() {
        Ok(()) => wait_for_secure_link(conn).await,
        Err(EncryptError::PeerKeysNotFound) => {
            conn.request_pairing().is_ok() && wait_for_secure_link(conn).await
        }
        Err(_) => false,
    }
}

/// Serve open requests, one link at a time.
pub async fn connection_task(sd: &'static Softdevice, bonder: &'static Bonder) -> ! {
    loop {
        let request = OPEN_REQUESTS.receive().await;
        if let Err(e) = connect_and_run(sd, bonder, request).await {
            warn!("{} open failed: {}", request.addr, e);
            HID_EVENTS
                .send(HidEvent::OpenFailed { addr: request.addr })
                .await;
        }
    }
}

/// Connect, secure, discover, and report one device until it goes away.
///
/// Returns `Err` only before the device was admitted; after that the
/// session always ends with a Close event.
async fn connect_and_run(
    sd: &'static Softdevice,
    bonder: &'static Bonder,
    request: OpenRequest,
) -> Result<(), Error> {
    if DEVICES.lock().await.find(&request.addr).is_some() {
        warn!("{} is already open", request.addr);
        return Err(Error::ConnectFailed);
    }

    info!("connecting to {} ({})", request.addr, request.addr_type);

    let address = to_nrf_address(request.addr, request.addr_type);
    let whitelist = [&address];
    let conn_cfg = central::ConnectConfig {
        scan_config: central::ScanConfig {
            whitelist: Some(&whitelist),
            ..Default::default()
        },
        conn_params: raw::ble_gap_conn_params_t {
            min_conn_interval: config::BLE_CONN_INTERVAL_MIN,
            max_conn_interval: config::BLE_CONN_INTERVAL_MAX,
            slave_latency: config::BLE_SLAVE_LATENCY,
            conn_sup_timeout: config::BLE_SUP_TIMEOUT,
        },
        ..Default::default()
    };

    let conn = central::connect_with_security(sd, &conn_cfg, bonder)
        .await
        .map_err(|e| {
            warn!("connect error: {:?}", e);
            Error::ConnectFailed
        })?;

    if !secure(&conn).await {
        warn!("failed to secure BLE link");
        let _ = conn.disconnect();
        return Err(Error::ConnectFailed);
    }

    let (client, report_map) = match hid_client::discover_and_subscribe(&conn).await {
        Ok(found) => found,
        Err(e) => {
            let _ = conn.disconnect();
            return Err(e);
        }
    };

    let dev = match admit(&conn, request.addr, report_map.as_ref()).await {
        Ok(dev) => dev,
        Err(e) => {
            let _ = conn.disconnect();
            return Err(e);
        }
    };
    HID_EVENTS.send(HidEvent::Open { dev }).await;

    if let Some(level) = hid_client::read_battery(&conn).await {
        HID_EVENTS.send(HidEvent::Battery { dev, level }).await;
    }

    hid_client::run_notification_loop(&conn, &client, dev, report_map.as_ref()).await;

    // The SoftDevice wrapper does not surface the HCI reason.
    HID_EVENTS
        .send(HidEvent::Close {
            dev,
            reason: DisconnectReason::UNKNOWN,
        })
        .await;
    Ok(())
}

async fn admit(
    conn: &Connection,
    addr: BdAddr,
    report_map: Option<&ReportMap>,
) -> Result<DeviceHandle, Error> {
    let mut record = DeviceRecord::new(addr, Transport::Ble);
    record.name = hid_client::read_device_name(conn).await;
    if let Some(map) = report_map {
        record.report_count = map.report_count();
        if let Some(usage) = map.primary_usage() {
            record.usage = usage;
        }
    }
    DEVICES.lock().await.admit(record)
}
