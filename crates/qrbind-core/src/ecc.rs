//! Error-correction levels.

use std::fmt;

/// Error-correction level of a QR symbol.
///
/// Levels are ordinally ranked from least to most redundant and are
/// passed through to the computation module unchanged. The ordinal
/// doubles as the level's wire value in the module call contract.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Ecc {
    /// Tolerates roughly 7% erroneous codewords.
    #[default]
    Low,
    /// Tolerates roughly 15% erroneous codewords.
    Medium,
    /// Tolerates roughly 25% erroneous codewords.
    Quartile,
    /// Tolerates roughly 30% erroneous codewords.
    High,
}

impl Ecc {
    /// All levels, in ascending redundancy order.
    pub const ALL: [Ecc; 4] = [Ecc::Low, Ecc::Medium, Ecc::Quartile, Ecc::High];

    /// Ordinal in the range 0..=3, used both for table indexing and as
    /// the value sent across the module boundary.
    pub const fn ordinal(self) -> usize {
        match self {
            Ecc::Low => 0,
            Ecc::Medium => 1,
            Ecc::Quartile => 2,
            Ecc::High => 3,
        }
    }

    /// The 2-bit value placed in the symbol's format information.
    ///
    /// Note this is not the ordinal: the QR format field uses its own
    /// historical numbering.
    pub const fn format_bits(self) -> u8 {
        match self {
            Ecc::Low => 1,
            Ecc::Medium => 0,
            Ecc::Quartile => 3,
            Ecc::High => 2,
        }
    }
}

impl fmt::Display for Ecc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Ecc::Low => "low",
            Ecc::Medium => "medium",
            Ecc::Quartile => "quartile",
            Ecc::High => "high",
        };
        f.write_str(name)
    }
}
