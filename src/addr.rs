//! Bluetooth device addresses.

use core::fmt;

/// A 48-bit Bluetooth device address, most-significant byte first
/// (the order it is printed in).
///
/// Equality is on the raw bytes, so `98:7A:..` and `98:7a:..` name the
/// same device no matter how either side was formatted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BdAddr([u8; 6]);

impl BdAddr {
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Build from the little-endian byte order used on the air and by
    /// the SoftDevice.
    pub fn from_le_bytes(mut bytes: [u8; 6]) -> Self {
        bytes.reverse();
        Self(bytes)
    }

    pub fn to_le_bytes(self) -> [u8; 6] {
        let mut bytes = self.0;
        bytes.reverse();
        bytes
    }

    pub const fn bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// Parse `aa:bb:cc:dd:ee:ff` (either case).
    pub fn parse(s: &str) -> Option<Self> {
        let mut out = [0u8; 6];
        let mut parts = s.split(':');
        for byte in out.iter_mut() {
            let part = parts.next()?;
            if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            *byte = u8::from_str_radix(part, 16).ok()?;
        }
        if parts.next().is_some() {
            return None;
        }
        Some(Self(out))
    }
}

impl fmt::Display for BdAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for BdAddr {
    fn format(&self, f: defmt::Formatter) {
        let [a, b, c, d, e, g] = self.0;
        defmt::write!(
            f,
            "{=u8:02x}:{=u8:02x}:{=u8:02x}:{=u8:02x}:{=u8:02x}:{=u8:02x}",
            a,
            b,
            c,
            d,
            e,
            g
        )
    }
}

/// LE address type as reported by the scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddrType {
    Public,
    Random,
    /// Resolvable private address backed by a public identity.
    RpaPublic,
    /// Resolvable private address backed by a random identity.
    RpaRandom,
}

impl AddrType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddrType::Public => "PUBLIC",
            AddrType::Random => "RANDOM",
            AddrType::RpaPublic => "RPA_PUBLIC",
            AddrType::RpaRandom => "RPA_RANDOM",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    #[test]
    fn display_is_lowercase_colon_separated() {
        let addr = BdAddr::new([0x98, 0x7A, 0x14, 0xAE, 0xEC, 0xF8]);
        let mut s: heapless::String<17> = heapless::String::new();
        write!(s, "{}", addr).unwrap();
        assert_eq!(s.as_str(), "98:7a:14:ae:ec:f8");
    }

    #[test]
    fn parse_ignores_case() {
        let lower = BdAddr::parse("98:7a:14:ae:ec:f8").unwrap();
        let upper = BdAddr::parse("98:7A:14:AE:EC:F8").unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.bytes(), &[0x98, 0x7a, 0x14, 0xae, 0xec, 0xf8]);
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(BdAddr::parse("").is_none());
        assert!(BdAddr::parse("98:7a:14:ae:ec").is_none());
        assert!(BdAddr::parse("98:7a:14:ae:ec:f8:00").is_none());
        assert!(BdAddr::parse("98-7a-14-ae-ec-f8").is_none());
        assert!(BdAddr::parse("9:87a:14:ae:ec:f8").is_none());
        assert!(BdAddr::parse("zz:7a:14:ae:ec:f8").is_none());
    }

    #[test]
    fn le_byte_order_is_reversed() {
        let addr = BdAddr::from_le_bytes([0xf8, 0xec, 0xae, 0x14, 0x7a, 0x98]);
        assert_eq!(addr, BdAddr::new([0x98, 0x7a, 0x14, 0xae, 0xec, 0xf8]));
        assert_eq!(addr.to_le_bytes(), [0xf8, 0xec, 0xae, 0x14, 0x7a, 0x98]);
    }

    #[test]
    fn addr_type_labels() {
        assert_eq!(AddrType::Public.as_str(), "PUBLIC");
        assert_eq!(AddrType::RpaRandom.as_str(), "RPA_RANDOM");
    }
}
