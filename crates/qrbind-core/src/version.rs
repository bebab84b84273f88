//! QR symbol versions and their buffer geometry.

use std::fmt;

/// A QR symbol version in the range 1..=40.
///
/// The side length of a version-`v` symbol is `v * 4 + 17` modules,
/// giving sizes from 21 to 177.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(u8);

impl Version {
    /// The smallest version in the QR Code Model 2 standard.
    pub const MIN: Version = Version(1);

    /// The largest version in the QR Code Model 2 standard.
    pub const MAX: Version = Version(40);

    /// Create a version, panicking outside 1..=40.
    ///
    /// Versions are compile-time or table-driven values throughout
    /// qrbind; an out-of-range version is a programming error, not a
    /// runtime condition, hence the panic.
    pub const fn new(value: u8) -> Self {
        assert!(
            Version::MIN.0 <= value && value <= Version::MAX.0,
            "version out of range 1..=40"
        );
        Version(value)
    }

    /// The numeric version value, 1..=40.
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Side length of this version's symbol in modules (21..=177).
    pub const fn side_len(self) -> usize {
        self.0 as usize * 4 + 17
    }

    /// Bytes required for a result or working buffer at this version:
    /// one size byte plus the bit-packed module grid.
    pub const fn buffer_len(self) -> usize {
        let side = self.side_len();
        (side * side + 7) / 8 + 1
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}
