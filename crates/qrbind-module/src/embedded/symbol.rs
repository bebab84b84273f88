//! The compiled-in QR symbol encoder.
//!
//! A self-contained port of the QR Code Model 2 construction pipeline
//! (segment encoding, Reed-Solomon blocks, function patterns, mask
//! selection). The binding layer treats it as a black box behind the
//! module surface; nothing here is exported from the crate.
//!
//! Output layout matches the C computation-module contract so the
//! accessor calls are identical across backends: byte 0 of the result
//! buffer is the side length, followed by the module grid bit-packed
//! LSB-first at bit index `y * side + x`.

use qrbind_core::capacity::{
    byte_mode_char_count_bits, ecc_codewords_per_block, num_data_codewords, num_ecc_blocks,
    num_raw_data_modules,
};
use qrbind_core::{Ecc, Version};

/// Encoding parameters passed through from the module call contract.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SymbolRequest {
    pub ecc: Ecc,
    pub min_version: Version,
    pub max_version: Version,
    /// `None` selects the mask with the lowest penalty score.
    pub mask: Option<u8>,
    pub boost_ecc: bool,
}

/// Encode UTF-8 text into `out`, choosing the densest segment mode the
/// text permits. Returns false when the data fits no version in range.
pub(crate) fn encode_text(text: &str, out: &mut [u8], request: SymbolRequest) -> bool {
    let payload = if text.is_empty() {
        None
    } else if text.bytes().all(|b| b.is_ascii_digit()) {
        Some(Payload::Numeric(text))
    } else if text.bytes().all(|b| ALPHANUMERIC_CHARSET.contains(&b)) {
        Some(Payload::Alphanumeric(text))
    } else {
        Some(Payload::Bytes(text.as_bytes()))
    };
    encode_payload(payload, out, request)
}

/// Encode raw bytes into `out` using byte mode only.
pub(crate) fn encode_binary(data: &[u8], out: &mut [u8], request: SymbolRequest) -> bool {
    let payload = if data.is_empty() {
        None
    } else {
        Some(Payload::Bytes(data))
    };
    encode_payload(payload, out, request)
}

fn encode_payload(payload: Option<Payload<'_>>, out: &mut [u8], request: SymbolRequest) -> bool {
    let Some((version, used_bits)) = fit_version(payload.as_ref(), request) else {
        return false;
    };
    if out.len() < version.buffer_len() {
        return false;
    }

    // Boost the error-correction level while the data still fits the
    // chosen version.
    let mut ecc = request.ecc;
    if request.boost_ecc {
        for candidate in [Ecc::Medium, Ecc::Quartile, Ecc::High] {
            if used_bits <= num_data_codewords(version, candidate) * 8 {
                ecc = candidate;
            }
        }
    }

    let codewords = build_codewords(payload.as_ref(), version, ecc);
    let interleaved = add_ecc_and_interleave(&codewords, version, ecc);
    draw_symbol(&interleaved, version, ecc, request.mask, out);
    true
}

/// Data payload in one of the supported segment modes.
enum Payload<'a> {
    Numeric(&'a str),
    Alphanumeric(&'a str),
    Bytes(&'a [u8]),
}

impl Payload<'_> {
    fn mode_bits(&self) -> u32 {
        match self {
            Payload::Numeric(_) => 0x1,
            Payload::Alphanumeric(_) => 0x2,
            Payload::Bytes(_) => 0x4,
        }
    }

    fn char_count(&self) -> usize {
        match self {
            Payload::Numeric(text) | Payload::Alphanumeric(text) => text.len(),
            Payload::Bytes(data) => data.len(),
        }
    }

    fn char_count_bits(&self, version: Version) -> usize {
        let bracket = usize::from((version.value() + 7) / 17);
        match self {
            Payload::Numeric(_) => [10, 12, 14][bracket],
            Payload::Alphanumeric(_) => [9, 11, 13][bracket],
            Payload::Bytes(_) => byte_mode_char_count_bits(version),
        }
    }

    /// Payload bits excluding the segment header.
    fn data_bits(&self) -> Option<usize> {
        let ceil_mul_div = |count: usize, numer: usize, denom: usize| {
            count
                .checked_mul(numer)
                .and_then(|x| x.checked_add(denom - 1))
                .map(|x| x / denom)
        };
        match self {
            Payload::Numeric(text) => ceil_mul_div(text.len(), 10, 3),
            Payload::Alphanumeric(text) => ceil_mul_div(text.len(), 11, 2),
            Payload::Bytes(data) => data.len().checked_mul(8),
        }
    }

    /// Total bits for one segment at `version`, or `None` when the
    /// character count does not fit the header's count field.
    fn total_bits(&self, version: Version) -> Option<usize> {
        let cc_bits = self.char_count_bits(version);
        if let Some(limit) = 1usize.checked_shl(cc_bits as u32) {
            if self.char_count() >= limit {
                return None;
            }
        }
        Some(4 + cc_bits + self.data_bits()?)
    }

    fn append_to(&self, writer: &mut BitWriter<'_>) {
        match self {
            Payload::Numeric(text) => {
                let mut accum: u32 = 0;
                let mut count: u8 = 0;
                for b in text.bytes() {
                    accum = accum * 10 + u32::from(b - b'0');
                    count += 1;
                    if count == 3 {
                        writer.append(accum, 10);
                        accum = 0;
                        count = 0;
                    }
                }
                if count > 0 {
                    writer.append(accum, u32::from(count) * 3 + 1);
                }
            }
            Payload::Alphanumeric(text) => {
                let mut accum: u32 = 0;
                let mut count: u8 = 0;
                for b in text.bytes() {
                    let index = ALPHANUMERIC_CHARSET
                        .iter()
                        .position(|&c| c == b)
                        .unwrap_or(0) as u32;
                    accum = accum * 45 + index;
                    count += 1;
                    if count == 2 {
                        writer.append(accum, 11);
                        accum = 0;
                        count = 0;
                    }
                }
                if count > 0 {
                    writer.append(accum, 6);
                }
            }
            Payload::Bytes(data) => {
                for &b in *data {
                    writer.append(u32::from(b), 8);
                }
            }
        }
    }
}

const ALPHANUMERIC_CHARSET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

/// Smallest version in the requested range whose data capacity holds
/// the payload, together with the bit count actually used.
fn fit_version(
    payload: Option<&Payload<'_>>,
    request: SymbolRequest,
) -> Option<(Version, usize)> {
    let mut version = request.min_version;
    loop {
        let capacity_bits = num_data_codewords(version, request.ecc) * 8;
        let used = match payload {
            None => Some(0),
            Some(p) => p.total_bits(version),
        };
        if let Some(used) = used {
            if used <= capacity_bits {
                return Some((version, used));
            }
        }
        if version >= request.max_version {
            return None;
        }
        version = Version::new(version.value() + 1);
    }
}

/// Serialize the segment into data codewords: header, payload,
/// terminator, bit padding, then alternating pad bytes.
fn build_codewords(payload: Option<&Payload<'_>>, version: Version, ecc: Ecc) -> Vec<u8> {
    let capacity_bits = num_data_codewords(version, ecc) * 8;
    let mut buffer = vec![0u8; capacity_bits / 8];
    let mut writer = BitWriter::new(&mut buffer);
    if let Some(payload) = payload {
        writer.append(payload.mode_bits(), 4);
        writer.append(
            payload.char_count() as u32,
            payload.char_count_bits(version) as u32,
        );
        payload.append_to(&mut writer);
    }

    // Terminator, then pad to a byte boundary. The buffer is zeroed,
    // so advancing the cursor appends zero bits.
    let terminator = 4.min(capacity_bits - writer.len());
    writer.skip(terminator);
    writer.skip(writer.len().wrapping_neg() & 7);
    let mut written = writer.len();
    drop(writer);

    let mut pad = 0xEC;
    while written < capacity_bits {
        buffer[written / 8] = pad;
        written += 8;
        pad ^= 0xEC ^ 0x11;
    }
    buffer
}

/// MSB-first bit cursor over a zeroed byte buffer.
struct BitWriter<'a> {
    buffer: &'a mut [u8],
    length: usize,
}

impl<'a> BitWriter<'a> {
    fn new(buffer: &'a mut [u8]) -> Self {
        BitWriter { buffer, length: 0 }
    }

    fn len(&self) -> usize {
        self.length
    }

    fn append(&mut self, value: u32, count: u32) {
        debug_assert!(count <= 31 && value >> count == 0);
        for i in (0..count).rev() {
            let bit = ((value >> i) & 1) as u8;
            self.buffer[self.length >> 3] |= bit << (7 - (self.length & 7));
            self.length += 1;
        }
    }

    /// Advance over `count` already-zero bits.
    fn skip(&mut self, count: usize) {
        self.length += count;
    }
}

/// Split data codewords into error-correction blocks, compute each
/// block's Reed-Solomon remainder, and interleave everything into the
/// final codeword sequence.
fn add_ecc_and_interleave(data: &[u8], version: Version, ecc: Ecc) -> Vec<u8> {
    debug_assert_eq!(data.len(), num_data_codewords(version, ecc));
    let num_blocks = num_ecc_blocks(version, ecc);
    let block_ecc_len = ecc_codewords_per_block(version, ecc);
    let raw_codewords = num_raw_data_modules(version) / 8;
    let num_short_blocks = num_blocks - raw_codewords % num_blocks;
    let short_block_data_len = raw_codewords / num_blocks - block_ecc_len;

    let mut result = vec![0u8; raw_codewords];
    let generator = RsGenerator::new(block_ecc_len);
    let mut ecc_buf = [0u8; 30];
    let mut remaining = data;
    for block in 0..num_blocks {
        let data_len = short_block_data_len + usize::from(block >= num_short_blocks);
        generator.remainder(&remaining[..data_len], &mut ecc_buf[..block_ecc_len]);
        let mut k = block;
        for (j, &byte) in remaining[..data_len].iter().enumerate() {
            if j == short_block_data_len {
                k -= num_short_blocks;
            }
            result[k] = byte;
            k += num_blocks;
        }
        let mut k = data.len() + block;
        for &byte in &ecc_buf[..block_ecc_len] {
            result[k] = byte;
            k += num_blocks;
        }
        remaining = &remaining[data_len..];
    }
    debug_assert!(remaining.is_empty());
    result
}

/// Reed-Solomon generator polynomial over GF(2^8 / 0x11D).
struct RsGenerator {
    coefficients: [u8; 30],
    degree: usize,
}

impl RsGenerator {
    fn new(degree: usize) -> Self {
        debug_assert!((1..=30).contains(&degree));
        let mut coefficients = [0u8; 30];
        coefficients[degree - 1] = 1;
        let mut root: u8 = 1;
        for _ in 0..degree {
            for j in 0..degree {
                coefficients[j] = gf_multiply(coefficients[j], root);
                if j + 1 < degree {
                    coefficients[j] ^= coefficients[j + 1];
                }
            }
            root = gf_multiply(root, 0x02);
        }
        RsGenerator {
            coefficients,
            degree,
        }
    }

    fn remainder(&self, data: &[u8], result: &mut [u8]) {
        debug_assert_eq!(result.len(), self.degree);
        result.fill(0);
        for &byte in data {
            let factor = byte ^ result[0];
            result.copy_within(1.., 0);
            result[self.degree - 1] = 0;
            for (r, &c) in result.iter_mut().zip(self.coefficients.iter()) {
                *r ^= gf_multiply(c, factor);
            }
        }
    }
}

fn gf_multiply(x: u8, y: u8) -> u8 {
    let mut z: u8 = 0;
    for i in (0..8).rev() {
        z = (z << 1) ^ ((z >> 7) * 0x1D);
        z ^= ((y >> i) & 1) * x;
    }
    z
}

/// A module grid bit-packed into a byte slice, LSB-first at bit index
/// `y * side + x`. This is the in-memory layout the module surface's
/// cell accessor reads.
struct Grid<'a> {
    side: usize,
    bits: &'a mut [u8],
}

impl<'a> Grid<'a> {
    fn new(side: usize, bits: &'a mut [u8]) -> Self {
        debug_assert!(bits.len() >= (side * side + 7) / 8);
        Grid { side, bits }
    }

    fn get(&self, x: usize, y: usize) -> bool {
        let index = y * self.side + x;
        (self.bits[index >> 3] >> (index & 7)) & 1 != 0
    }

    fn set(&mut self, x: usize, y: usize, dark: bool) {
        let index = y * self.side + x;
        if dark {
            self.bits[index >> 3] |= 1 << (index & 7);
        } else {
            self.bits[index >> 3] &= !(1 << (index & 7));
        }
    }

    /// Set only when `(x, y)` is inside the grid.
    fn set_clipped(&mut self, x: i32, y: i32, dark: bool) {
        let side = self.side as i32;
        if (0..side).contains(&x) && (0..side).contains(&y) {
            self.set(x as usize, y as usize, dark);
        }
    }

    fn fill_rect(&mut self, left: usize, top: usize, width: usize, height: usize) {
        for dy in 0..height {
            for dx in 0..width {
                self.set(left + dx, top + dy, true);
            }
        }
    }
}

/// Draw the complete symbol into `out` (size byte + packed modules).
fn draw_symbol(codewords: &[u8], version: Version, ecc: Ecc, mask: Option<u8>, out: &mut [u8]) {
    let side = version.side_len();
    let packed_len = (side * side + 7) / 8;
    out[0] = side as u8;
    let out_bits = &mut out[1..1 + packed_len];
    out_bits.fill(0);

    // Reserve every function-module position, then fill codewords into
    // the remaining cells, then paint the actual function patterns
    // over the reserved (all-dark) regions.
    let mut reserved_bits = vec![0u8; packed_len];
    let mut reserved = Grid::new(side, &mut reserved_bits);
    reserve_function_modules(&mut reserved, version);
    out_bits.copy_from_slice(reserved.bits);

    let mut grid = Grid::new(side, out_bits);
    draw_codewords(&mut grid, &reserved, codewords);
    draw_function_patterns(&mut grid, version);

    let mask = match mask {
        Some(mask) => mask & 7,
        None => {
            let mut best = 0;
            let mut best_penalty = i32::MAX;
            for candidate in 0..8 {
                apply_mask(&mut grid, &reserved, candidate);
                draw_format_bits(&mut grid, ecc, candidate);
                let penalty = penalty_score(&grid);
                if penalty < best_penalty {
                    best = candidate;
                    best_penalty = penalty;
                }
                // XOR masking is its own inverse.
                apply_mask(&mut grid, &reserved, candidate);
            }
            best
        }
    };
    apply_mask(&mut grid, &reserved, mask);
    draw_format_bits(&mut grid, ecc, mask);
}

/// Mark every cell occupied by a function pattern: timing lines, the
/// three finder corners with their format strips, alignment patterns,
/// and the version blocks.
fn reserve_function_modules(grid: &mut Grid<'_>, version: Version) {
    let side = grid.side;
    grid.fill_rect(6, 0, 1, side);
    grid.fill_rect(0, 6, side, 1);
    grid.fill_rect(0, 0, 9, 9);
    grid.fill_rect(side - 8, 0, 8, 9);
    grid.fill_rect(0, side - 8, 9, 8);
    let positions = alignment_pattern_positions(version);
    let last = positions.len().saturating_sub(1);
    for (i, &px) in positions.iter().enumerate() {
        for (j, &py) in positions.iter().enumerate() {
            let finder_corner =
                (i == 0 && j == 0) || (i == 0 && j == last) || (i == last && j == 0);
            if !finder_corner {
                grid.fill_rect(px - 2, py - 2, 5, 5);
            }
        }
    }
    if version.value() >= 7 {
        grid.fill_rect(side - 11, 0, 3, 6);
        grid.fill_rect(0, side - 11, 6, 3);
    }
}

/// Centre coordinates of the alignment patterns, ascending. Empty for
/// version 1.
fn alignment_pattern_positions(version: Version) -> Vec<usize> {
    let v = usize::from(version.value());
    if v == 1 {
        return Vec::new();
    }
    let num_align = v / 7 + 2;
    let side = version.side_len();
    let step = if v == 32 {
        26
    } else {
        (v * 4 + num_align * 2 + 1) / (num_align * 2 - 2) * 2
    };
    let mut positions = vec![6];
    let mut pos = side - 7;
    for _ in 0..num_align - 1 {
        positions.push(pos);
        pos -= step;
    }
    positions[1..].sort_unstable();
    positions
}

/// Zigzag the interleaved codewords through every non-reserved cell.
fn draw_codewords(grid: &mut Grid<'_>, reserved: &Grid<'_>, codewords: &[u8]) {
    let side = grid.side as i32;
    let mut bit_index: usize = 0;
    let mut right = side - 1;
    while right >= 1 {
        if right == 6 {
            right = 5;
        }
        for vert in 0..side {
            for j in 0..2 {
                let x = (right - j) as usize;
                let upward = ((right + 1) & 2) == 0;
                let y = if upward { side - 1 - vert } else { vert } as usize;
                if !reserved.get(x, y) && bit_index < codewords.len() * 8 {
                    let byte = codewords[bit_index >> 3];
                    let dark = (byte >> (7 - (bit_index & 7))) & 1 != 0;
                    grid.set(x, y, dark);
                    bit_index += 1;
                }
            }
        }
        right -= 2;
    }
    debug_assert_eq!(bit_index, codewords.len() * 8);
}

/// Paint the real function patterns over the reserved regions: the
/// reserved cells start all-dark, so only the light cells and the
/// version information bits need drawing. Format bits are drawn
/// separately once the mask is known.
fn draw_function_patterns(grid: &mut Grid<'_>, version: Version) {
    let side = grid.side;

    // Timing patterns: alternating, starting dark at the even offsets.
    for i in (7..side - 7).step_by(2) {
        grid.set(6, i, false);
        grid.set(i, 6, false);
    }

    // Finder separators and inner light rings at the three corners.
    for dy in -4i32..=4 {
        for dx in -4i32..=4 {
            let dist = dx.abs().max(dy.abs());
            if dist == 2 || dist == 4 {
                let far = side as i32 - 4;
                grid.set_clipped(3 + dx, 3 + dy, false);
                grid.set_clipped(far + dx, 3 + dy, false);
                grid.set_clipped(3 + dx, far + dy, false);
            }
        }
    }

    // Alignment patterns: 3×3 light ring around a dark centre.
    let positions = alignment_pattern_positions(version);
    let last = positions.len().saturating_sub(1);
    for (i, &px) in positions.iter().enumerate() {
        for (j, &py) in positions.iter().enumerate() {
            if (i == 0 && j == 0) || (i == 0 && j == last) || (i == last && j == 0) {
                continue;
            }
            for dy in -1i32..=1 {
                for dx in -1i32..=1 {
                    grid.set(
                        (px as i32 + dx) as usize,
                        (py as i32 + dy) as usize,
                        dx == 0 && dy == 0,
                    );
                }
            }
        }
    }

    // Version information, v7 and above: 18 bits of BCH(18, 6).
    let v = u32::from(version.value());
    if v >= 7 {
        let bits = {
            let mut rem = v;
            for _ in 0..12 {
                rem = (rem << 1) ^ ((rem >> 11) * 0x1F25);
            }
            (v << 12) | rem
        };
        for i in 0..18usize {
            let dark = (bits >> i) & 1 != 0;
            let a = side - 11 + i % 3;
            let b = i / 3;
            grid.set(a, b, dark);
            grid.set(b, a, dark);
        }
    }
}

/// Draw the 15 format bits (ECC level + mask, BCH-protected) in both
/// copies, plus the always-dark module.
fn draw_format_bits(grid: &mut Grid<'_>, ecc: Ecc, mask: u8) {
    let bits: u32 = {
        let data = u32::from((ecc.format_bits() << 3) | mask);
        let mut rem = data;
        for _ in 0..10 {
            rem = (rem << 1) ^ ((rem >> 9) * 0x537);
        }
        ((data << 10) | rem) ^ 0x5412
    };
    let bit = |i: usize| (bits >> i) & 1 != 0;
    let side = grid.side;

    for i in 0..6 {
        grid.set(8, i, bit(i));
    }
    grid.set(8, 7, bit(6));
    grid.set(8, 8, bit(7));
    grid.set(7, 8, bit(8));
    for i in 9..15 {
        grid.set(14 - i, 8, bit(i));
    }
    for i in 0..8 {
        grid.set(side - 1 - i, 8, bit(i));
    }
    for i in 8..15 {
        grid.set(8, side - 15 + i, bit(i));
    }
    grid.set(8, side - 8, true);
}

/// XOR the mask pattern into every non-reserved cell. Applying the
/// same mask twice restores the original grid.
fn apply_mask(grid: &mut Grid<'_>, reserved: &Grid<'_>, mask: u8) {
    let side = grid.side;
    for y in 0..side {
        for x in 0..side {
            if reserved.get(x, y) {
                continue;
            }
            let (xi, yi) = (x as i32, y as i32);
            let invert = match mask {
                0 => (xi + yi) % 2 == 0,
                1 => yi % 2 == 0,
                2 => xi % 3 == 0,
                3 => (xi + yi) % 3 == 0,
                4 => (xi / 3 + yi / 2) % 2 == 0,
                5 => (xi * yi) % 2 + (xi * yi) % 3 == 0,
                6 => ((xi * yi) % 2 + (xi * yi) % 3) % 2 == 0,
                _ => ((xi + yi) % 2 + (xi * yi) % 3) % 2 == 0,
            };
            if invert {
                let current = grid.get(x, y);
                grid.set(x, y, !current);
            }
        }
    }
}

const PENALTY_N1: i32 = 3;
const PENALTY_N2: i32 = 3;
const PENALTY_N3: i32 = 40;
const PENALTY_N4: i32 = 10;

/// Standard penalty score: long runs, 2×2 blocks, finder-like
/// patterns, and dark/light balance.
fn penalty_score(grid: &Grid<'_>) -> i32 {
    let side = grid.side;
    let mut result: i32 = 0;

    // Horizontal runs and finder-like patterns.
    for y in 0..side {
        let mut run_color = false;
        let mut run_len: i32 = 0;
        let mut history = FinderPenalty::new(side);
        for x in 0..side {
            if grid.get(x, y) == run_color {
                run_len += 1;
                if run_len == 5 {
                    result += PENALTY_N1;
                } else if run_len > 5 {
                    result += 1;
                }
            } else {
                history.add_run(run_len);
                if !run_color {
                    result += history.count_patterns() * PENALTY_N3;
                }
                run_color = grid.get(x, y);
                run_len = 1;
            }
        }
        result += history.terminate_and_count(run_color, run_len) * PENALTY_N3;
    }

    // Vertical runs and finder-like patterns.
    for x in 0..side {
        let mut run_color = false;
        let mut run_len: i32 = 0;
        let mut history = FinderPenalty::new(side);
        for y in 0..side {
            if grid.get(x, y) == run_color {
                run_len += 1;
                if run_len == 5 {
                    result += PENALTY_N1;
                } else if run_len > 5 {
                    result += 1;
                }
            } else {
                history.add_run(run_len);
                if !run_color {
                    result += history.count_patterns() * PENALTY_N3;
                }
                run_color = grid.get(x, y);
                run_len = 1;
            }
        }
        result += history.terminate_and_count(run_color, run_len) * PENALTY_N3;
    }

    // 2×2 blocks of one color.
    for y in 0..side - 1 {
        for x in 0..side - 1 {
            let color = grid.get(x, y);
            if color == grid.get(x + 1, y)
                && color == grid.get(x, y + 1)
                && color == grid.get(x + 1, y + 1)
            {
                result += PENALTY_N2;
            }
        }
    }

    // Dark/light balance in 5% steps away from 50%.
    let dark: i32 = grid.bits.iter().map(|b| b.count_ones() as i32).sum();
    let total = (side * side) as i32;
    let k = ((dark * 20 - total * 10).abs() + total - 1) / total - 1;
    result + k * PENALTY_N4
}

/// Sliding run-length history for detecting finder-like 1:1:3:1:1
/// patterns with 4-wide light borders.
struct FinderPenalty {
    side: i32,
    history: [i32; 7],
}

impl FinderPenalty {
    fn new(side: usize) -> Self {
        FinderPenalty {
            side: side as i32,
            history: [0; 7],
        }
    }

    fn add_run(&mut self, mut run_len: i32) {
        if self.history[0] == 0 {
            // The leading border counts as light padding.
            run_len += self.side;
        }
        self.history.copy_within(0..6, 1);
        self.history[0] = run_len;
    }

    fn count_patterns(&self) -> i32 {
        let h = &self.history;
        let n = h[1];
        let core = n > 0 && h[2] == n && h[3] == n * 3 && h[4] == n && h[5] == n;
        i32::from(core && h[0] >= n * 4 && h[6] >= n)
            + i32::from(core && h[6] >= n * 4 && h[0] >= n)
    }

    fn terminate_and_count(mut self, current_color: bool, mut run_len: i32) -> i32 {
        if current_color {
            self.add_run(run_len);
            run_len = 0;
        }
        run_len += self.side;
        self.add_run(run_len);
        self.count_patterns()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(ecc: Ecc) -> SymbolRequest {
        SymbolRequest {
            ecc,
            min_version: Version::MIN,
            max_version: Version::MAX,
            mask: None,
            boost_ecc: true,
        }
    }

    fn grid_cell(out: &[u8], x: usize, y: usize) -> bool {
        let side = usize::from(out[0]);
        let index = y * side + x;
        (out[1 + (index >> 3)] >> (index & 7)) & 1 != 0
    }

    fn encode_to_buffer(text: &str, ecc: Ecc) -> Vec<u8> {
        let mut out = vec![0u8; Version::MAX.buffer_len()];
        assert!(encode_text(text, &mut out, request(ecc)));
        out
    }

    #[test]
    fn hello_world_fits_version_1_alphanumeric() {
        let out = encode_to_buffer("HELLO WORLD", Ecc::Low);
        // 11 alphanumeric chars fit v1 even after ECC boosting.
        assert_eq!(out[0], 21);
    }

    #[test]
    fn finder_pattern_corners_are_present() {
        let out = encode_to_buffer("HELLO WORLD", Ecc::Low);
        let side = usize::from(out[0]);
        // Outer finder ring is dark, separator ring is light.
        for &(cx, cy) in &[(3usize, 3usize), (side - 4, 3), (3, side - 4)] {
            assert!(grid_cell(&out, cx, cy), "centre at ({cx},{cy})");
            assert!(grid_cell(&out, cx - 3, cy - 3));
            assert!(!grid_cell(&out, cx - 2, cy - 2));
        }
    }

    #[test]
    fn timing_pattern_alternates() {
        let out = encode_to_buffer("timing check", Ecc::Medium);
        let side = usize::from(out[0]);
        for i in 8..side - 8 {
            assert_eq!(grid_cell(&out, i, 6), i % 2 == 0);
            assert_eq!(grid_cell(&out, 6, i), i % 2 == 0);
        }
    }

    #[test]
    fn dark_module_is_always_set() {
        for text in ["a", "0123456789", "MIXED case ÿ"] {
            let out = encode_to_buffer(text, Ecc::Quartile);
            let side = usize::from(out[0]);
            assert!(grid_cell(&out, 8, side - 8));
        }
    }

    #[test]
    fn version_selection_grows_with_payload() {
        let short = encode_to_buffer("a", Ecc::Low);
        let long = encode_to_buffer(&"a".repeat(200), Ecc::Low);
        assert!(long[0] > short[0]);
        assert_eq!((usize::from(long[0]) - 17) % 4, 0);
    }

    #[test]
    fn numeric_mode_packs_denser_than_byte() {
        // 60 digits fit v2 numeric; as bytes they would need v4.
        let digits = encode_to_buffer(&"7".repeat(60), Ecc::Low);
        let bytes = encode_to_buffer(&"x".repeat(60), Ecc::Low);
        assert!(digits[0] < bytes[0]);
    }

    #[test]
    fn oversized_data_is_rejected() {
        let mut out = vec![0u8; Version::MAX.buffer_len()];
        let data = vec![0u8; 3000];
        assert!(!encode_binary(&data, &mut out, request(Ecc::Low)));
    }

    #[test]
    fn capacity_boundary_is_exact() {
        let mut out = vec![0u8; Version::MAX.buffer_len()];
        let fits = vec![0u8; 2953];
        assert!(encode_binary(&fits, &mut out, request(Ecc::Low)));
        assert_eq!(out[0], 177);
        let too_big = vec![0u8; 2954];
        assert!(!encode_binary(&too_big, &mut out, request(Ecc::Low)));
    }

    #[test]
    fn empty_text_still_encodes() {
        let mut out = vec![0u8; Version::MAX.buffer_len()];
        assert!(encode_text("", &mut out, request(Ecc::Low)));
        assert_eq!(out[0], 21);
    }

    #[test]
    fn restricted_version_range_is_honored() {
        let mut out = vec![0u8; Version::MAX.buffer_len()];
        let req = SymbolRequest {
            ecc: Ecc::Low,
            min_version: Version::new(5),
            max_version: Version::new(5),
            mask: None,
            boost_ecc: false,
        };
        assert!(encode_text("a", &mut out, req));
        assert_eq!(out[0], 37);
        let req_too_small = SymbolRequest {
            max_version: Version::new(1),
            min_version: Version::new(1),
            ..req
        };
        assert!(!encode_text(&"a".repeat(100), &mut out, req_too_small));
    }

    #[test]
    fn fixed_mask_matches_auto_when_auto_picks_it() {
        // Encode with automatic masking, recover the chosen mask from
        // the format bits, then re-encode with that mask fixed; the
        // grids must be identical.
        let auto = encode_to_buffer("MASK ROUND TRIP", Ecc::Low);
        // Mask bits sit in format bits 10..13, XOR-scrambled by 0x5412.
        let scrambled = (u8::from(grid_cell(&auto, 2, 8)) << 2)
            | (u8::from(grid_cell(&auto, 3, 8)) << 1)
            | u8::from(grid_cell(&auto, 4, 8));
        let mask = scrambled ^ 0b101;
        let mut fixed = vec![0u8; Version::MAX.buffer_len()];
        let req = SymbolRequest {
            ecc: Ecc::Low,
            min_version: Version::MIN,
            max_version: Version::MAX,
            mask: Some(mask),
            boost_ecc: true,
        };
        assert!(encode_text("MASK ROUND TRIP", &mut fixed, req));
        let side = usize::from(auto[0]);
        let packed = (side * side + 7) / 8;
        assert_eq!(auto[..1 + packed], fixed[..1 + packed]);
    }

    #[test]
    fn rs_remainder_known_vector() {
        // gen degree 7 remainder of "hello" against published GF math:
        // verified property instead of a magic vector: appending the
        // remainder makes the whole codeword divisible.
        let generator = RsGenerator::new(7);
        let data = b"hello";
        let mut ecc = [0u8; 7];
        generator.remainder(data, &mut ecc);
        let mut padded: Vec<u8> = data.to_vec();
        padded.extend_from_slice(&ecc);
        let mut check = [0u8; 7];
        generator.remainder(&padded, &mut check);
        assert_eq!(check, [0u8; 7]);
    }

    #[test]
    fn alignment_positions_match_standard_samples() {
        assert!(alignment_pattern_positions(Version::new(1)).is_empty());
        assert_eq!(alignment_pattern_positions(Version::new(2)), vec![6, 18]);
        assert_eq!(alignment_pattern_positions(Version::new(7)), vec![6, 22, 38]);
        assert_eq!(
            alignment_pattern_positions(Version::new(32)),
            vec![6, 34, 60, 86, 112, 138]
        );
    }
}
