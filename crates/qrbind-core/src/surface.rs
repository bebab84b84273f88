//! The calling-surface contract of an instantiated computation module.

use crate::error::ModuleFault;

/// Mask sentinel telling the computation module to choose the mask
/// pattern with the lowest penalty score itself.
pub const AUTO_MASK: i32 = -1;

/// The set of operations an instantiated computation module exposes to
/// the binding layer.
///
/// Addresses are `u32` offsets into the module's flat linear memory;
/// they are not host pointers, and they are only meaningful between
/// the `alloc` that produced them and the matching `release`. The
/// scoped allocator in `qrbind-scope` is the only component that
/// balances those two calls.
///
/// Implementations serialize access to their linear memory internally;
/// individual calls are atomic, but callers wanting a whole encode
/// operation to be non-interleaved must hold their own operation lock
/// (the facade does).
///
/// Every method can fault on a wasm-hosted backend (a trap, a missing
/// memory view); the embedded backend is infallible and always returns
/// `Ok`.
pub trait ModuleSurface: Send + Sync + std::fmt::Debug {
    /// Request `size` bytes from the module allocator. Returns the
    /// address, or 0 when the allocator is exhausted.
    fn alloc(&self, size: u32) -> Result<u32, ModuleFault>;

    /// Return an allocation to the module allocator.
    ///
    /// Releasing an address not returned by `alloc` (or releasing one
    /// twice) corrupts the module allocator; the scoped allocator
    /// upholds this by construction.
    fn release(&self, address: u32) -> Result<(), ModuleFault>;

    /// Copy `bytes` into linear memory starting at `address`.
    fn write(&self, address: u32, bytes: &[u8]) -> Result<(), ModuleFault>;

    /// Copy `len` bytes out of linear memory starting at `address`.
    fn read(&self, address: u32, len: u32) -> Result<Vec<u8>, ModuleFault>;

    /// Encode the NUL-terminated UTF-8 text at `text`, using `temp` as
    /// working space and writing the symbol into `result`. Returns the
    /// module's success flag.
    #[allow(clippy::too_many_arguments)]
    fn encode_text(
        &self,
        text: u32,
        temp: u32,
        result: u32,
        ecc: i32,
        min_version: i32,
        max_version: i32,
        mask: i32,
        boost_ecc: bool,
    ) -> Result<bool, ModuleFault>;

    /// Encode `data_len` payload bytes already placed at `data` (the
    /// same buffer doubles as working space) into `result`. Returns
    /// the module's success flag.
    #[allow(clippy::too_many_arguments)]
    fn encode_binary(
        &self,
        data: u32,
        data_len: u32,
        result: u32,
        ecc: i32,
        min_version: i32,
        max_version: i32,
        mask: i32,
        boost_ecc: bool,
    ) -> Result<bool, ModuleFault>;

    /// Side length of the symbol previously encoded into `result`.
    fn matrix_size(&self, result: u32) -> Result<u32, ModuleFault>;

    /// Whether the module at `(x, y)` of the symbol in `result` is
    /// dark.
    fn matrix_cell(&self, result: u32, x: u32, y: u32) -> Result<bool, ModuleFault>;
}
