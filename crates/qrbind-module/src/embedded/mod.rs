//! The compiled-in computation module.
//!
//! Pairs the portable symbol encoder with an emulated linear memory so
//! the binding layer drives it through the exact same address-based
//! surface as a wasm-hosted module. Keeping the ABI identical means
//! the scoped allocator, marshaling, and facade are exercised the same
//! way regardless of backend.

mod memory;
mod symbol;

use std::sync::Mutex;

use qrbind_core::{Ecc, ModuleFault, ModuleSurface, Version};

use memory::LinearMemory;
use symbol::SymbolRequest;

/// Default linear-memory budget. Generously above the ~12 KiB a
/// maximum-version encode needs, small enough that a leak shows up
/// fast in tests.
const DEFAULT_MEMORY_LIMIT: u32 = 1 << 20;

/// A computation module compiled into the host binary.
///
/// All surface calls are infallible apart from contract violations
/// (reading an address that was never allocated), which surface as
/// [`ModuleFault`] like a wasm trap would.
pub struct EmbeddedModule {
    memory: Mutex<LinearMemory>,
}

impl std::fmt::Debug for EmbeddedModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddedModule").finish_non_exhaustive()
    }
}

impl EmbeddedModule {
    /// Create a module with the default memory budget.
    pub fn new() -> Self {
        Self::with_memory_limit(DEFAULT_MEMORY_LIMIT)
    }

    /// Create a module whose allocator refuses to grow past `limit`
    /// bytes. Exhaustion is reported through `alloc` returning 0, the
    /// same way a wasm module's allocator reports it.
    pub fn with_memory_limit(limit: u32) -> Self {
        EmbeddedModule {
            memory: Mutex::new(LinearMemory::new(limit)),
        }
    }

    /// Number of allocations currently outstanding. Zero whenever no
    /// encode operation is in flight; anything else is a leak.
    pub fn live_allocations(&self) -> usize {
        self.lock().live_allocations()
    }

    /// Total number of allocations ever made by this module.
    pub fn total_allocations(&self) -> u64 {
        self.lock().total_allocations()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LinearMemory> {
        // A panic while holding the lock leaves the memory consistent;
        // every mutation is complete before control can unwind.
        self.memory.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for EmbeddedModule {
    fn default() -> Self {
        Self::new()
    }
}

fn fault(reason: &str, address: u32) -> ModuleFault {
    ModuleFault::new(format!("{reason} at address {address}"))
}

/// Validate the raw call-contract parameters shared by both encode
/// entry points. Out-of-range values fail the encode rather than
/// faulting, matching the C module's defensive returns.
fn symbol_request(
    ecc: i32,
    min_version: i32,
    max_version: i32,
    mask: i32,
    boost_ecc: bool,
) -> Option<SymbolRequest> {
    let ecc = *Ecc::ALL.get(usize::try_from(ecc).ok()?)?;
    let min = u8::try_from(min_version).ok()?;
    let max = u8::try_from(max_version).ok()?;
    if !(Version::MIN.value()..=Version::MAX.value()).contains(&min)
        || !(min..=Version::MAX.value()).contains(&max)
        || !(-1..=7).contains(&mask)
    {
        return None;
    }
    Some(SymbolRequest {
        ecc,
        min_version: Version::new(min),
        max_version: Version::new(max),
        mask: u8::try_from(mask).ok(),
        boost_ecc,
    })
}

impl ModuleSurface for EmbeddedModule {
    fn alloc(&self, size: u32) -> Result<u32, ModuleFault> {
        Ok(self.lock().alloc(size))
    }

    fn release(&self, address: u32) -> Result<(), ModuleFault> {
        self.lock().release(address);
        Ok(())
    }

    fn write(&self, address: u32, bytes: &[u8]) -> Result<(), ModuleFault> {
        if self.lock().write(address, bytes) {
            Ok(())
        } else {
            Err(fault("write outside an allocated block", address))
        }
    }

    fn read(&self, address: u32, len: u32) -> Result<Vec<u8>, ModuleFault> {
        self.lock()
            .read(address, len)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| fault("read outside an allocated block", address))
    }

    fn encode_text(
        &self,
        text: u32,
        _temp: u32,
        result: u32,
        ecc: i32,
        min_version: i32,
        max_version: i32,
        mask: i32,
        boost_ecc: bool,
    ) -> Result<bool, ModuleFault> {
        let Some(request) = symbol_request(ecc, min_version, max_version, mask, boost_ecc) else {
            return Ok(false);
        };
        let mut memory = self.lock();
        let text_len = memory
            .block_size(text)
            .ok_or_else(|| fault("text buffer not allocated", text))?;
        let raw = memory
            .read(text, text_len)
            .ok_or_else(|| fault("text buffer not readable", text))?;
        // The string is NUL-terminated inside its block.
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        let Ok(string) = std::str::from_utf8(&raw[..end]) else {
            return Ok(false);
        };
        let string = string.to_owned();

        let result_len = memory
            .block_size(result)
            .ok_or_else(|| fault("result buffer not allocated", result))?;
        let mut out = vec![0u8; result_len as usize];
        if !symbol::encode_text(&string, &mut out, request) {
            return Ok(false);
        }
        if !memory.write(result, &out) {
            return Err(fault("result buffer not writable", result));
        }
        Ok(true)
    }

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
    ) -> Result<bool, ModuleFault> {
        let Some(request) = symbol_request(ecc, min_version, max_version, mask, boost_ecc) else {
            return Ok(false);
        };
        let mut memory = self.lock();
        let payload = memory
            .read(data, data_len)
            .ok_or_else(|| fault("data buffer not readable", data))?
            .to_vec();

        let result_len = memory
            .block_size(result)
            .ok_or_else(|| fault("result buffer not allocated", result))?;
        let mut out = vec![0u8; result_len as usize];
        if !symbol::encode_binary(&payload, &mut out, request) {
            return Ok(false);
        }
        if !memory.write(result, &out) {
            return Err(fault("result buffer not writable", result));
        }
        Ok(true)
    }

    fn matrix_size(&self, result: u32) -> Result<u32, ModuleFault> {
        let memory = self.lock();
        let byte = memory
            .read(result, 1)
            .ok_or_else(|| fault("result buffer not readable", result))?;
        Ok(u32::from(byte[0]))
    }

    fn matrix_cell(&self, result: u32, x: u32, y: u32) -> Result<bool, ModuleFault> {
        let memory = self.lock();
        let len = memory
            .block_size(result)
            .ok_or_else(|| fault("result buffer not allocated", result))?;
        let data = memory
            .read(result, len)
            .ok_or_else(|| fault("result buffer not readable", result))?;
        let side = u32::from(data[0]);
        if x >= side || y >= side {
            return Ok(false);
        }
        let index = (y * side + x) as usize;
        let byte = match data.get(1 + (index >> 3)) {
            Some(&b) => b,
            None => return Ok(false),
        };
        Ok((byte >> (index & 7)) & 1 != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrbind_core::AUTO_MASK;

    fn encode(module: &EmbeddedModule, text: &str) -> u32 {
        let text_buf = module.alloc(text.len() as u32 + 1).unwrap();
        module.write(text_buf, text.as_bytes()).unwrap();
        module.write(text_buf + text.len() as u32, &[0]).unwrap();
        let len = Version::MAX.buffer_len() as u32;
        let result = module.alloc(len).unwrap();
        let temp = module.alloc(len).unwrap();
        let ok = module
            .encode_text(text_buf, temp, result, 0, 1, 40, AUTO_MASK, true)
            .unwrap();
        assert!(ok);
        module.release(temp).unwrap();
        module.release(text_buf).unwrap();
        result
    }

    #[test]
    fn encode_through_the_surface_contract() {
        let module = EmbeddedModule::new();
        let result = encode(&module, "surface contract");
        let size = module.matrix_size(result).unwrap();
        assert!(size >= 21 && (size - 17) % 4 == 0);
        // Finder centre is dark, separator is light.
        assert!(module.matrix_cell(result, 3, 3).unwrap());
        assert!(!module.matrix_cell(result, 3, 5).unwrap());
        module.release(result).unwrap();
        assert_eq!(module.live_allocations(), 0);
    }

    #[test]
    fn out_of_range_cell_reads_are_light() {
        let module = EmbeddedModule::new();
        let result = encode(&module, "x");
        let size = module.matrix_size(result).unwrap();
        assert!(!module.matrix_cell(result, size, 0).unwrap());
        assert!(!module.matrix_cell(result, 0, size + 100).unwrap());
        module.release(result).unwrap();
    }

    #[test]
    fn invalid_parameters_fail_the_encode() {
        let module = EmbeddedModule::new();
        let buf = module.alloc(8).unwrap();
        module.write(buf, b"hi\0").unwrap();
        let result = module.alloc(Version::MAX.buffer_len() as u32).unwrap();
        // Bad ECC ordinal, then inverted version range.
        assert!(!module
            .encode_text(buf, 0, result, 9, 1, 40, AUTO_MASK, true)
            .unwrap());
        assert!(!module
            .encode_text(buf, 0, result, 0, 10, 5, AUTO_MASK, true)
            .unwrap());
    }

    #[test]
    fn exhausted_allocator_returns_null() {
        let module = EmbeddedModule::with_memory_limit(64);
        assert_ne!(module.alloc(32).unwrap(), 0);
        assert_eq!(module.alloc(1024).unwrap(), 0);
    }

    #[test]
    fn unallocated_result_read_faults() {
        let module = EmbeddedModule::new();
        assert!(module.matrix_size(0xDEAD).is_err());
    }
}
