//! One-shot scan-and-connect sequence.
//!
//! Scans once, prints every result in the order the stack returned
//! them, then asks to open the **last** one. There is no retry; the
//! caller's task ends afterwards.

use crate::addr::BdAddr;
use crate::config::SCAN_DURATION_SECS;
use crate::error::Error;
use crate::gap::ScanResult;
use crate::host::HidHost;

/// What one pass did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanOutcome {
    /// Number of results iterated (always the reported count).
    pub seen: usize,
    /// Address an open request was issued for.
    pub opened: Option<BdAddr>,
}

/// Run the scan and connect to the last result.
///
/// `print` receives each result in iteration order. The result list is
/// released after the open request, on every path including open failure.
pub async fn scan_and_connect<H, P>(host: &mut H, mut print: P) -> Result<ScanOutcome, Error>
where
    H: HidHost,
    P: FnMut(&ScanResult),
{
    info!("SCAN...");
    let results = host.scan(SCAN_DURATION_SECS).await.map_err(|e| {
        warn!("scan failed: {}", e);
        Error::ScanFailed
    })?;

    let mut seen = 0;
    let mut last: Option<&ScanResult> = None;
    for result in results.as_ref() {
        print(result);
        seen += 1;
        last = Some(result);
    }
    info!("SCAN: {} results", seen);

    let target = last.map(|r| (r.addr, r.transport(), r.addr_type()));

    let Some((addr, transport, addr_type)) = target else {
        drop(results);
        return Ok(ScanOutcome { seen, opened: None });
    };

    let opened = host.open(addr, transport, addr_type).await;
    drop(results);
    opened.map_err(|e| {
        warn!("open request for {} failed: {}", addr, e);
        Error::ConnectFailed
    })?;

    Ok(ScanOutcome {
        seen,
        opened: Some(addr),
    })
}
