//! The boundary to the Bluetooth stack.
//!
//! The firmware implements [`HidHost`] on top of the SoftDevice; tests
//! implement it with scripted results.

use crate::addr::{AddrType, BdAddr};
use crate::error::Error;
use crate::gap::{ScanResult, Transport};

/// Radio mode requested at stack initialisation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StackMode {
    /// Low Energy only.
    Ble,
    /// BR/EDR only.
    Classic,
    /// Both controllers.
    Dual,
}

impl StackMode {
    pub fn supports(&self, transport: Transport) -> bool {
        matches!(
            (self, transport),
            (StackMode::Dual, _)
                | (StackMode::Ble, Transport::Ble)
                | (StackMode::Classic, Transport::Bt)
        )
    }

    /// The mode a radio that only offers `available` can actually run.
    /// `None` means nothing requested is available.
    pub fn effective(self, available: StackMode) -> Option<StackMode> {
        match (self, available) {
            (StackMode::Dual, other) | (other, StackMode::Dual) => Some(other),
            (requested, available) if requested == available => Some(requested),
            _ => None,
        }
    }
}

/// HID host operations provided by the Bluetooth stack.
#[allow(async_fn_in_trait)]
pub trait HidHost {
    /// Results of one scan; dropping the list releases them.
    type ScanList: AsRef<[ScanResult]>;

    /// Scan for HID devices for `duration_secs`, blocking the caller
    /// for the whole window.
    async fn scan(&mut self, duration_secs: u32) -> Result<Self::ScanList, Error>;

    /// Request a connection. Success only means the request was
    /// accepted; the outcome arrives later as an open event.
    async fn open(
        &mut self,
        addr: BdAddr,
        transport: Transport,
        addr_type: AddrType,
    ) -> Result<(), Error>;
}
