//! Unit tests for report decoding and report-map parsing.
//!
//! These tests run on the host (not embedded).

use super::gamepad::{render_report, GamepadReport, GAMEPAD_REPORT_SIZE};
use super::report_map::ReportMap;
use crate::error::Error;
use crate::gap::HidUsage;

const SAMPLE: [u8; GAMEPAD_REPORT_SIZE] = [
    0x01, 0x02, // Lx
    0xFF, 0x80, // Ly: -1, -128
    0x7F, 0x00, // Rx: 127, 0
    0x10, 0xF0, // Ry: 16, -16
    0x40, 0x03, // Lt
    0xC0, 0xFF, // Rt: -64, 0xff
    0xAA, 0xBB, 0xCC, // tail
];

// ═══════════════════════════════════════════════════════════════════════════
// Gamepad Report Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn gamepad_report_fields() {
    let report = GamepadReport::parse(&SAMPLE).unwrap();
    assert_eq!(report.lx, [1, 2]);
    assert_eq!(report.ly, [-1, -128]);
    assert_eq!(report.rx, [127, 0]);
    assert_eq!(report.ry, [16, -16]);
    assert_eq!(report.lt, (64, 0x03));
    assert_eq!(report.rt, (-64, 0xFF));
    assert_eq!(report.tail, [0xAA, 0xBB, 0xCC]);
}

#[test]
fn gamepad_report_rendered_line() {
    let line = render_report(&SAMPLE).unwrap();
    assert_eq!(
        line.as_str(),
        "Lx:  1   2 Ly: -1 -128 Rx:127   0 Ry: 16 -16 Lt: 64 003 Rt:-64 0ff"
    );
}

#[test]
fn rendered_line_has_six_groups_in_order() {
    let line = render_report(&[0u8; GAMEPAD_REPORT_SIZE]).unwrap();
    let labels = ["Lx:", "Ly:", "Rx:", "Ry:", "Lt:", "Rt:"];
    let mut last = 0;
    for label in labels {
        let pos = line.as_str().find(label).expect("label present");
        assert!(pos >= last, "{} out of order", label);
        assert_eq!(line.as_str().matches(label).count(), 1);
        last = pos;
    }
}

#[test]
fn wrong_length_is_dropped() {
    for len in [0usize, 1, 14, 16, 20] {
        let data = [0u8; 20];
        assert_eq!(
            GamepadReport::parse(&data[..len]),
            Err(Error::MalformedReport(len))
        );
        assert!(render_report(&data[..len]).is_none());
    }
}

#[test]
fn trailing_bytes_never_affect_output() {
    let mut other = SAMPLE;
    other[12] = 0x00;
    other[13] = 0x11;
    other[14] = 0xFF;
    assert_eq!(render_report(&SAMPLE), render_report(&other));
}

#[test]
fn leading_bytes_do_affect_output() {
    for i in 0..12 {
        let mut other = SAMPLE;
        other[i] = other[i].wrapping_add(1);
        assert_ne!(render_report(&SAMPLE), render_report(&other), "byte {}", i);
    }
}

#[test]
fn unaligned_source_slice_parses() {
    let mut buf = [0u8; GAMEPAD_REPORT_SIZE + 1];
    buf[1..].copy_from_slice(&SAMPLE);
    assert_eq!(
        GamepadReport::parse(&buf[1..]),
        GamepadReport::parse(&SAMPLE)
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// Report Map Tests
// ═══════════════════════════════════════════════════════════════════════════

/// Gamepad descriptor without report IDs.
const GAMEPAD_MAP: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x05, // Usage (Gamepad)
    0xA1, 0x01, // Collection (Application)
    0x09, 0x30, //   Usage (X)
    0x09, 0x31, //   Usage (Y)
    0x15, 0x81, //   Logical Minimum (-127)
    0x25, 0x7F, //   Logical Maximum (127)
    0x75, 0x08, //   Report Size (8)
    0x95, 0x02, //   Report Count (2)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    0xC0, // End Collection
];

/// Keyboard (ID 1) + consumer control (ID 3) composite.
const COMPOSITE_MAP: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x06, // Usage (Keyboard)
    0xA1, 0x01, // Collection (Application)
    0x85, 0x01, //   Report ID (1)
    0x05, 0x07, //   Usage Page (Keyboard)
    0x75, 0x08, //   Report Size (8)
    0x95, 0x08, //   Report Count (8)
    0x81, 0x00, //   Input (Data, Array)
    0xC0, // End Collection
    0x05, 0x0C, // Usage Page (Consumer)
    0x09, 0x01, // Usage (Consumer Control)
    0xA1, 0x01, // Collection (Application)
    0x85, 0x03, //   Report ID (3)
    0x75, 0x10, //   Report Size (16)
    0x95, 0x01, //   Report Count (1)
    0x81, 0x00, //   Input (Data, Array)
    0xC0, // End Collection
];

#[test]
fn report_map_gamepad_without_ids() {
    let map = ReportMap::parse(GAMEPAD_MAP).unwrap();
    assert_eq!(map.primary_usage(), Some(HidUsage::Gamepad));
    assert_eq!(map.usage_for_id(0), Some(HidUsage::Gamepad));
    assert_eq!(map.report_count(), 1);
}

#[test]
fn report_map_composite_ids() {
    let map = ReportMap::parse(COMPOSITE_MAP).unwrap();
    assert_eq!(map.primary_usage(), Some(HidUsage::Keyboard));
    assert_eq!(map.usage_for_id(1), Some(HidUsage::Keyboard));
    assert_eq!(map.usage_for_id(3), Some(HidUsage::ConsumerControl));
    assert_eq!(map.usage_for_id(2), None);
    assert_eq!(map.report_count(), 2);
}

#[test]
fn report_map_without_inputs() {
    let data = [0x05, 0x01, 0x09, 0x05, 0xA1, 0x01, 0xC0];
    assert!(ReportMap::parse(&data).is_none());
    assert!(ReportMap::parse(&[]).is_none());
}

#[test]
fn report_map_truncated_item_stops_parse() {
    // Input item promises one data byte but the buffer ends.
    let mut data = heapless::Vec::<u8, 64>::new();
    data.extend_from_slice(&GAMEPAD_MAP[..18]).unwrap();
    data.push(0x81).unwrap();
    assert!(ReportMap::parse(&data).is_none());
}

#[test]
fn report_map_keeps_reports_before_truncation() {
    // Complete gamepad Input item, then an item cut short.
    let mut data = heapless::Vec::<u8, 64>::new();
    data.extend_from_slice(&GAMEPAD_MAP[..20]).unwrap();
    data.extend_from_slice(&[0x82, 0x02]).unwrap();
    let map = ReportMap::parse(&data).unwrap();
    assert_eq!(map.primary_usage(), Some(HidUsage::Gamepad));
    assert_eq!(map.report_count(), 1);
}
