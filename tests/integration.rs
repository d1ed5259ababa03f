//! Integration tests for the scan-and-connect sequence and the event
//! callback, driven through a scripted stack.

use std::cell::Cell;
use std::rc::Rc;

use embassy_futures::block_on;
use hidhost::config::{MAX_DEVICES, TARGET_DEVICE};
use hidhost::event::{DisconnectReason, Report};
use hidhost::gap::ScanDetails;
use hidhost::hid::ReportData;
use hidhost::{
    scan_and_connect, AddrType, BdAddr, DeviceRecord, DeviceTable, Error, HidEvent,
    HidEventHandler, HidHost, HidUsage, Outcome, ScanOutcome, ScanResult, Transport,
};

/// Scan results that count how often they are released.
struct TrackedList {
    results: Vec<ScanResult>,
    releases: Rc<Cell<usize>>,
}

impl AsRef<[ScanResult]> for TrackedList {
    fn as_ref(&self) -> &[ScanResult] {
        &self.results
    }
}

impl Drop for TrackedList {
    fn drop(&mut self) {
        self.releases.set(self.releases.get() + 1);
    }
}

#[derive(Default)]
struct ScriptedHost {
    results: Vec<ScanResult>,
    scan_fails: bool,
    open_fails: bool,
    scans: usize,
    opens: Vec<(BdAddr, Transport, AddrType)>,
    releases: Rc<Cell<usize>>,
}

impl HidHost for ScriptedHost {
    type ScanList = TrackedList;

    async fn scan(&mut self, _duration_secs: u32) -> Result<TrackedList, Error> {
        self.scans += 1;
        if self.scan_fails {
            return Err(Error::ScanFailed);
        }
        Ok(TrackedList {
            results: self.results.clone(),
            releases: self.releases.clone(),
        })
    }

    async fn open(
        &mut self,
        addr: BdAddr,
        transport: Transport,
        addr_type: AddrType,
    ) -> Result<(), Error> {
        // The open request goes out while the scan list is still held.
        assert_eq!(self.releases.get() + 1, self.scans);
        self.opens.push((addr, transport, addr_type));
        if self.open_fails {
            Err(Error::ConnectFailed)
        } else {
            Ok(())
        }
    }
}

fn le_result(last: u8, rssi: i8) -> ScanResult {
    ScanResult {
        addr: BdAddr::new([0xAA, 0, 0, 0, 0, last]),
        rssi,
        usage: HidUsage::Gamepad,
        name: None,
        details: ScanDetails::Le {
            appearance: 0x03C4,
            addr_type: AddrType::Random,
        },
    }
}

fn run(host: &mut ScriptedHost) -> (Result<ScanOutcome, Error>, Vec<BdAddr>) {
    let mut printed = Vec::new();
    let outcome = block_on(scan_and_connect(host, |r| printed.push(r.addr)));
    (outcome, printed)
}

#[test]
fn zero_results_issue_no_open() {
    let mut host = ScriptedHost::default();
    let (outcome, printed) = run(&mut host);
    assert_eq!(
        outcome,
        Ok(ScanOutcome {
            seen: 0,
            opened: None
        })
    );
    assert!(printed.is_empty());
    assert!(host.opens.is_empty());
    assert_eq!(host.releases.get(), 1);
}

#[test]
fn three_results_print_in_order_and_open_the_last() {
    // B has the strongest signal; C is last.
    let (a, b, c) = (le_result(1, -70), le_result(2, -30), le_result(3, -90));
    let mut host = ScriptedHost {
        results: vec![a.clone(), b.clone(), c.clone()],
        ..Default::default()
    };
    let (outcome, printed) = run(&mut host);

    assert_eq!(printed, vec![a.addr, b.addr, c.addr]);
    assert_eq!(
        outcome,
        Ok(ScanOutcome {
            seen: 3,
            opened: Some(c.addr)
        })
    );
    assert_eq!(host.opens, vec![(c.addr, Transport::Ble, AddrType::Random)]);
    assert_eq!(host.releases.get(), 1);
}

#[test]
fn classic_result_opens_with_public_address() {
    let mut bt = le_result(9, -40);
    bt.details = ScanDetails::Classic {
        cod: hidhost::gap::ClassOfDevice::from_raw(0x002508),
        uuid: hidhost::gap::ServiceUuid::Uuid16(0x1124),
    };
    let mut host = ScriptedHost {
        results: vec![le_result(1, -50), bt.clone()],
        ..Default::default()
    };
    let (outcome, _) = run(&mut host);
    assert_eq!(outcome.unwrap().opened, Some(bt.addr));
    assert_eq!(host.opens, vec![(bt.addr, Transport::Bt, AddrType::Public)]);
}

#[test]
fn scan_failure_is_reported() {
    let mut host = ScriptedHost {
        scan_fails: true,
        ..Default::default()
    };
    let (outcome, printed) = run(&mut host);
    assert_eq!(outcome, Err(Error::ScanFailed));
    assert!(printed.is_empty());
    assert!(host.opens.is_empty());
}

#[test]
fn open_failure_is_reported_and_results_released() {
    let mut host = ScriptedHost {
        results: vec![le_result(1, -50)],
        open_fails: true,
        ..Default::default()
    };
    let (outcome, printed) = run(&mut host);
    assert_eq!(outcome, Err(Error::ConnectFailed));
    assert_eq!(printed.len(), 1);
    assert_eq!(host.releases.get(), 1);
}

fn input(dev: hidhost::DeviceHandle, data: &[u8]) -> HidEvent {
    HidEvent::Input(Report {
        dev,
        usage: HidUsage::Gamepad,
        map_index: 0,
        report_id: 0,
        data: ReportData::from_slice(data).unwrap(),
    })
}

#[test]
fn session_from_open_to_close() {
    let mut devices: DeviceTable<MAX_DEVICES> = DeviceTable::new();
    let mut handler = HidEventHandler::new(TARGET_DEVICE);

    let target = devices
        .admit(DeviceRecord::new(TARGET_DEVICE, Transport::Ble))
        .unwrap();
    let other = devices
        .admit(DeviceRecord::new(BdAddr::new([1, 2, 3, 4, 5, 6]), Transport::Ble))
        .unwrap();
    assert_eq!(
        handler.handle(&mut devices, HidEvent::Open { dev: target }),
        Outcome::Opened { is_target: true }
    );
    assert_eq!(
        handler.handle(&mut devices, HidEvent::Open { dev: other }),
        Outcome::Opened { is_target: false }
    );

    let report = [
        10, 20, 30, 40, 50, 60, 70, 80, 90, 0x1f, 100, 0x2e, 0xde, 0xad, 0xbe,
    ];
    assert_eq!(handler.handle(&mut devices, input(other, &report)), Outcome::Ignored);
    match handler.handle(&mut devices, input(target, &report)) {
        Outcome::Rendered(line) => assert_eq!(
            line.as_str(),
            "Lx: 10  20 Ly: 30  40 Rx: 50  60 Ry: 70  80 Lt: 90 01f Rt:100 02e"
        ),
        other => panic!("unexpected outcome {:?}", other),
    }

    for dev in [target, other] {
        assert_eq!(
            handler.handle(
                &mut devices,
                HidEvent::Close {
                    dev,
                    reason: DisconnectReason(0x13)
                }
            ),
            Outcome::Closed
        );
    }
    assert_eq!(devices.open_count(), 0);

    // The pool is usable again after every handle was released.
    for _ in 0..MAX_DEVICES {
        devices
            .admit(DeviceRecord::new(TARGET_DEVICE, Transport::Ble))
            .unwrap();
    }
}
