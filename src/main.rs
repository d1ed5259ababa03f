//! hidhost firmware entry point (nRF52840 + S140 SoftDevice).
//!
//! Boot order: SoftDevice, persistent storage, stack mode, then the
//! event, connection, and demo tasks. The demo task scans once, prints
//! every result, and opens the last one; from then on everything happens
//! in the event task.

#![no_std]
#![no_main]

mod ble;

use defmt::{error, info, unwrap};
use embassy_executor::Spawner;
use embassy_nrf::interrupt::Priority;
use hidhost::boot::{init_storage, select_stack_mode};
use hidhost::config::{STACK_MODE, TARGET_DEVICE};
use hidhost::storage::FlashStore;
use hidhost::{scan_and_connect, Error, HidEventHandler, InitStage, StackMode};
use nrf_softdevice::Softdevice;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use crate::ble::connection::{self, Bonder, NrfHidHost};
use crate::ble::{DEVICES, HID_EVENTS};

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

/// The HID host event callback. Events are handled one at a time, in
/// arrival order.
#[embassy_executor::task]
async fn hidh_event_task() -> ! {
    let mut handler = HidEventHandler::new(TARGET_DEVICE);
    info!("event handler ready, target {}", handler.target());
    loop {
        let event = HID_EVENTS.receive().await;
        let mut devices = DEVICES.lock().await;
        handler.handle(&mut *devices, event);
    }
}

#[embassy_executor::task]
async fn connection_task(sd: &'static Softdevice, bonder: &'static Bonder) -> ! {
    connection::connection_task(sd, bonder).await
}

/// One-shot scan and connect.
#[embassy_executor::task]
async fn hid_demo_task(sd: &'static Softdevice, mode: StackMode) {
    let mut host = NrfHidHost::new(sd, mode);
    let result = scan_and_connect(&mut host, |r| {
        defmt::println!("  {}", defmt::Display2Format(r));
    })
    .await;
    match result {
        Ok(outcome) => match outcome.opened {
            Some(addr) => info!("open requested for {}", addr),
            None => info!("nothing to open"),
        },
        Err(e) if e.is_fatal() => defmt::panic!("{}", e),
        Err(e) => error!("scan and connect failed: {}", e),
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("hidhost starting");

    // The SoftDevice reserves interrupt priorities 0, 1, and 4.
    let mut config = embassy_nrf::config::Config::default();
    config.gpiote_interrupt_priority = Priority::P2;
    config.time_interrupt_priority = Priority::P2;
    let _p = embassy_nrf::init(config);

    let sd = Softdevice::enable(&ble::softdevice_config());
    unwrap!(spawner.spawn(softdevice_task(sd)));

    // Flash access goes through the SoftDevice, so storage follows it.
    let mut store = FlashStore::new(nrf_softdevice::Flash::take(sd));
    if let Err(e) = init_storage(&mut store).await {
        defmt::panic!("{}", e);
    }

    let mode = match select_stack_mode(STACK_MODE, StackMode::Ble) {
        Ok(mode) => mode,
        Err(e) => defmt::panic!("{}", e),
    };
    info!("stack mode: {}", mode);

    static BONDER: StaticCell<Bonder> = StaticCell::new();
    let bonder = BONDER.init(Bonder::new());

    if spawner.spawn(hidh_event_task()).is_err() {
        defmt::panic!("{}", Error::from(InitStage::EventHandler));
    }
    unwrap!(spawner.spawn(connection_task(sd, bonder)));
    unwrap!(spawner.spawn(hid_demo_task(sd, mode)));
}
