//! The scoped allocator for foreign linear memory.

use qrbind_core::{EncodeError, ModuleSurface};
use smallvec::SmallVec;

/// One tracked allocation inside a [`Scope`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Allocation {
    /// Linear-memory address returned by the module allocator.
    pub address: u32,
    /// Size of the allocation in bytes.
    pub size: u32,
}

/// Tracks every linear-memory buffer allocated during one logical
/// operation and releases all of them when dropped.
///
/// A scope borrows the module surface, so it cannot outlive the
/// instance it allocates from, and it is consumed by drop, so a closed
/// scope cannot be reused. Release order is unspecified; the module
/// allocator accepts frees in any order.
///
/// An encode touches at most three buffers, hence the inline capacity.
pub struct Scope<'m> {
    surface: &'m dyn ModuleSurface,
    allocations: SmallVec<[Allocation; 4]>,
}

impl<'m> Scope<'m> {
    fn new(surface: &'m dyn ModuleSurface) -> Self {
        Scope {
            surface,
            allocations: SmallVec::new(),
        }
    }

    /// The surface this scope allocates from.
    pub fn surface(&self) -> &'m dyn ModuleSurface {
        self.surface
    }

    /// Allocate `size` bytes of linear memory, tracked by this scope.
    ///
    /// A null address from the module allocator becomes
    /// [`EncodeError::OutOfMemory`]; nothing is tracked in that case.
    pub fn alloc(&mut self, size: u32) -> Result<u32, EncodeError> {
        let address = self.surface.alloc(size)?;
        if address == 0 {
            return Err(EncodeError::OutOfMemory { requested: size });
        }
        self.allocations.push(Allocation { address, size });
        Ok(address)
    }

    /// Allocate a buffer holding a copy of `bytes`.
    pub fn alloc_bytes(&mut self, bytes: &[u8]) -> Result<u32, EncodeError> {
        let address = self.alloc(bytes.len() as u32)?;
        self.surface.write(address, bytes)?;
        Ok(address)
    }

    /// Allocate a buffer of `text.len() + 1` bytes holding the UTF-8
    /// bytes of `text` followed by a single NUL terminator.
    ///
    /// Rust strings are already UTF-8, so this is the trusted fast
    /// path: a plain byte copy, no re-encoding.
    pub fn alloc_text(&mut self, text: &str) -> Result<u32, EncodeError> {
        let address = self.alloc(text.len() as u32 + 1)?;
        self.surface.write(address, text.as_bytes())?;
        self.surface.write(address + text.len() as u32, &[0])?;
        Ok(address)
    }

    /// Number of allocations currently tracked by this scope.
    pub fn tracked(&self) -> usize {
        self.allocations.len()
    }

    /// The tracked allocation records, in allocation order.
    pub fn allocations(&self) -> &[Allocation] {
        &self.allocations
    }
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        for allocation in self.allocations.drain(..) {
            // A fault during release cannot be surfaced from drop; the
            // address is abandoned to the module instance.
            let _ = self.surface.release(allocation.address);
        }
    }
}

/// Run `body` with a fresh scope over `surface`.
///
/// Whatever `body` returns, and even if it panics, every allocation
/// the scope recorded is released exactly once before control leaves
/// this function. Errors from `body` propagate unaltered.
pub fn with_scope<'m, T>(
    surface: &'m dyn ModuleSurface,
    body: impl FnOnce(&mut Scope<'m>) -> Result<T, EncodeError>,
) -> Result<T, EncodeError> {
    let mut scope = Scope::new(surface);
    body(&mut scope)
}
