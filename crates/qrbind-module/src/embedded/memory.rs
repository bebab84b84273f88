//! Emulated linear memory with an explicit allocator.
//!
//! The embedded backend exposes the same address-based contract a wasm
//! module does, so the scope and marshaling layers exercise identical
//! code against either backend. Addresses are offsets into one flat
//! byte vector; a first-fit free list recycles released ranges and a
//! configurable byte limit makes allocator exhaustion reachable in
//! tests.

use indexmap::IndexMap;

/// Address 0 is the allocator's failure sentinel; the first real
/// allocation starts past it, 8-byte aligned.
const BASE: u32 = 8;

/// A flat byte-addressable memory with malloc/free semantics.
pub struct LinearMemory {
    data: Vec<u8>,
    /// Live allocations, keyed by address. Insertion order is not
    /// meaningful; the map exists for O(1) size lookup on release and
    /// for live-count instrumentation.
    live: IndexMap<u32, u32>,
    /// Released ranges `(address, size)`, kept sorted by address and
    /// coalesced with neighbours.
    free: Vec<(u32, u32)>,
    /// Bump pointer for ranges never allocated before.
    brk: u32,
    /// Total bytes this memory may ever span.
    limit: u32,
    total_allocs: u64,
}

impl LinearMemory {
    /// Create a memory bounded by `limit` bytes.
    pub fn new(limit: u32) -> Self {
        LinearMemory {
            data: Vec::new(),
            live: IndexMap::new(),
            free: Vec::new(),
            brk: BASE,
            limit,
            total_allocs: 0,
        }
    }

    /// Allocate `size` bytes. Returns the address, or 0 when the
    /// request cannot be satisfied within the memory limit. Zero-size
    /// requests are rounded up to one byte so every allocation has a
    /// distinct address.
    pub fn alloc(&mut self, size: u32) -> u32 {
        let size = size.max(1);
        let address = match self.take_free_range(size) {
            Some(address) => address,
            None => {
                let aligned = (self.brk + 7) & !7;
                match aligned.checked_add(size) {
                    Some(end) if end <= self.limit => {
                        self.brk = end;
                        aligned
                    }
                    _ => return 0,
                }
            }
        };
        let end = (address + size) as usize;
        if self.data.len() < end {
            self.data.resize(end, 0);
        }
        // Recycled ranges may hold stale bytes from a previous user.
        self.data[address as usize..end].fill(0);
        self.live.insert(address, size);
        self.total_allocs += 1;
        address
    }

    /// Release the allocation at `address`. Unknown addresses are
    /// ignored; the scoped allocator never produces them.
    pub fn release(&mut self, address: u32) {
        let Some(size) = self.live.swap_remove(&address) else {
            debug_assert!(false, "release of unknown address {address}");
            return;
        };
        let at = self.free.partition_point(|&(a, _)| a < address);
        self.free.insert(at, (address, size));
        self.coalesce_around(at);
    }

    /// Bytes at `[address, address + len)`, or `None` if out of range.
    pub fn read(&self, address: u32, len: u32) -> Option<&[u8]> {
        self.data
            .get(address as usize..(address as usize).checked_add(len as usize)?)
    }

    /// Write `bytes` at `address`. Fails if the range is out of the
    /// memory's current extent.
    pub fn write(&mut self, address: u32, bytes: &[u8]) -> bool {
        let start = address as usize;
        match self.data.get_mut(start..start + bytes.len()) {
            Some(target) => {
                target.copy_from_slice(bytes);
                true
            }
            None => false,
        }
    }

    /// Size of the live allocation at `address`, if any.
    pub fn block_size(&self, address: u32) -> Option<u32> {
        self.live.get(&address).copied()
    }

    /// Number of allocations that have not been released.
    pub fn live_allocations(&self) -> usize {
        self.live.len()
    }

    /// Number of allocations ever made.
    pub fn total_allocations(&self) -> u64 {
        self.total_allocs
    }

    fn take_free_range(&mut self, size: u32) -> Option<u32> {
        let index = self.free.iter().position(|&(_, s)| s >= size)?;
        let (address, range_size) = self.free[index];
        if range_size == size {
            self.free.remove(index);
        } else {
            self.free[index] = (address + size, range_size - size);
        }
        Some(address)
    }

    fn coalesce_around(&mut self, index: usize) {
        // Merge with the successor first so the index stays valid.
        if index + 1 < self.free.len() {
            let (address, size) = self.free[index];
            let (next_address, next_size) = self.free[index + 1];
            if address + size == next_address {
                self.free[index] = (address, size + next_size);
                self.free.remove(index + 1);
            }
        }
        if index > 0 {
            let (prev_address, prev_size) = self.free[index - 1];
            let (address, size) = self.free[index];
            if prev_address + prev_size == address {
                self.free[index - 1] = (prev_address, prev_size + size);
                self.free.remove(index);
            }
        }
    }
}
