//! Capacity arithmetic for QR symbols.
//!
//! Everything here is derived from the QR Code Model 2 standard: the
//! raw-module count is a closed formula over the version number, and
//! the error-correction overhead comes from the standard's block
//! tables. The binary capacity ceiling used by the encode facade is
//! computed from these, never hard-coded.

use crate::ecc::Ecc;
use crate::version::Version;

/// Number of data modules available in a symbol of the given version,
/// after subtracting finder, timing, alignment, format, and version
/// patterns. Always a multiple of 8 plus a remainder below 8.
pub const fn num_raw_data_modules(version: Version) -> usize {
    let v = version.value() as usize;
    let mut result = (16 * v + 128) * v + 64;
    if v >= 2 {
        let num_align = v / 7 + 2;
        result -= (25 * num_align - 10) * num_align - 55;
        if v >= 7 {
            result -= 36;
        }
    }
    result
}

/// Number of 8-bit data codewords available at the given version and
/// error-correction level.
pub fn num_data_codewords(version: Version, ecc: Ecc) -> usize {
    num_raw_data_modules(version) / 8
        - ecc_codewords_per_block(version, ecc) * num_ecc_blocks(version, ecc)
}

/// Number of character-count bits used by a byte-mode segment header at
/// the given version.
pub const fn byte_mode_char_count_bits(version: Version) -> usize {
    if version.value() < 10 {
        8
    } else {
        16
    }
}

/// Maximum number of payload bytes a byte-mode symbol of the given
/// version can carry at the given error-correction level.
///
/// This is the capacity ceiling the binary encode path validates
/// against before performing any allocation. At `Version::MAX` and
/// `Ecc::Low` the ceiling is 2953 bytes.
pub fn byte_mode_capacity(version: Version, ecc: Ecc) -> usize {
    let data_bits = num_data_codewords(version, ecc) * 8;
    let header_bits = 4 + byte_mode_char_count_bits(version);
    (data_bits - header_bits) / 8
}

/// ECC codewords per block for the given version and level.
pub fn ecc_codewords_per_block(version: Version, ecc: Ecc) -> usize {
    ECC_CODEWORDS_PER_BLOCK[ecc.ordinal()][version.value() as usize] as usize
}

/// Number of error-correction blocks for the given version and level.
pub fn num_ecc_blocks(version: Version, ecc: Ecc) -> usize {
    NUM_ECC_BLOCKS[ecc.ordinal()][version.value() as usize] as usize
}

// Standard block tables, indexed [ecc ordinal][version]. Index 0 is a
// placeholder since versions start at 1.
const ECC_CODEWORDS_PER_BLOCK: [[i8; 41]; 4] = [
    [
        -1, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28,
        30, 30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
    [
        -1, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ],
    [
        -1, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30,
        30, 30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
    [
        -1, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
];

const NUM_ECC_BLOCKS: [[i8; 41]; 4] = [
    [
        -1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12,
        13, 14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ],
    [
        -1, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ],
    [
        -1, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27,
        29, 34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ],
    [
        -1, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32,
        35, 37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ],
];
