//! Fixed-layout gamepad input report.
//!
//! Layout (15 bytes, one specific controller's report descriptor):
//! ```text
//! Byte 0-1:   Left stick  (Lx pair, signed)
//! Byte 2-3:   Left stick  (Ly pair, signed)
//! Byte 4-5:   Right stick (Rx pair, signed)
//! Byte 6-7:   Right stick (Ry pair, signed)
//! Byte 8-9:   Left trigger value + companion byte
//! Byte 10-11: Right trigger value + companion byte
//! Byte 12-14: Buttons / hat (not rendered)
//! ```
//! No report-descriptor parsing happens here; a report of any other
//! length is dropped.

use crate::error::Error;
use core::fmt::{self, Write};

/// Gamepad report size in bytes.
pub const GAMEPAD_REPORT_SIZE: usize = 15;

/// Capacity of a rendered report line.
pub const RENDERED_LINE_CAPACITY: usize = 96;

/// One rendered report line.
pub type ReportLine = heapless::String<RENDERED_LINE_CAPACITY>;

/// Word-aligned copy of a report.
///
/// Some targets deliver payloads in memory that only supports 32-bit
/// accesses; reads always go through this buffer.
#[repr(C, align(4))]
struct Scratch([u8; (GAMEPAD_REPORT_SIZE + 3) / 4 * 4]);

/// Decoded gamepad report. Axis and trigger values are signed bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GamepadReport {
    pub lx: [i8; 2],
    pub ly: [i8; 2],
    pub rx: [i8; 2],
    pub ry: [i8; 2],
    /// Left trigger value and its companion byte.
    pub lt: (i8, u8),
    /// Right trigger value and its companion byte.
    pub rt: (i8, u8),
    /// Trailing bytes, kept for completeness but never rendered.
    pub tail: [u8; 3],
}

impl GamepadReport {
    /// Parse a raw input report payload.
    ///
    /// Returns [`Error::MalformedReport`] for any length other than 15.
    pub fn parse(data: &[u8]) -> Result<Self, Error> {
        if data.len() != GAMEPAD_REPORT_SIZE {
            return Err(Error::MalformedReport(data.len()));
        }

        let mut scratch = Scratch([0; (GAMEPAD_REPORT_SIZE + 3) / 4 * 4]);
        scratch.0[..GAMEPAD_REPORT_SIZE].copy_from_slice(data);
        let p = &scratch.0;
        let s = |i: usize| p[i] as i8;

        Ok(Self {
            lx: [s(0), s(1)],
            ly: [s(2), s(3)],
            rx: [s(4), s(5)],
            ry: [s(6), s(7)],
            lt: (s(8), p[9]),
            rt: (s(10), p[11]),
            tail: [p[12], p[13], p[14]],
        })
    }

    /// Render the six labelled field groups in fixed order.
    pub fn render(&self) -> ReportLine {
        let mut line = ReportLine::new();
        // Widest possible line is 75 bytes.
        let _ = write!(line, "{}", self);
        line
    }
}

impl fmt::Display for GamepadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lx:{:3} {:3} ", self.lx[0], self.lx[1])?;
        write!(f, "Ly:{:3} {:3} ", self.ly[0], self.ly[1])?;
        write!(f, "Rx:{:3} {:3} ", self.rx[0], self.rx[1])?;
        write!(f, "Ry:{:3} {:3} ", self.ry[0], self.ry[1])?;
        write!(f, "Lt:{:3} {:03x} ", self.lt.0, self.lt.1)?;
        write!(f, "Rt:{:3} {:03x}", self.rt.0, self.rt.1)
    }
}

/// Decode and render in one step. `None` means the report was dropped.
pub fn render_report(data: &[u8]) -> Option<ReportLine> {
    GamepadReport::parse(data).ok().map(|r| r.render())
}
