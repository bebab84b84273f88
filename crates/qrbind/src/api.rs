//! The encode facade.
//!
//! An [`Encoder`] owns a handle to an instantiated computation module
//! and turns payloads into [`Matrix`] values. Each encode runs inside
//! a single allocation scope: the foreign buffers live exactly as long
//! as the call, whether it succeeds or fails.

use std::sync::{Arc, Mutex};

use qrbind_core::{
    capacity::byte_mode_capacity, Ecc, EncodeError, Matrix, ModuleSurface, Version, AUTO_MASK,
};
use qrbind_scope::{marshal, with_scope};

/// Encodes payloads into QR module matrices through a computation
/// module.
///
/// Cloning is cheap and every clone shares the same module instance
/// and operation lock. The lock keeps a whole encode (allocate, write,
/// encode, read back, release) from interleaving with another thread's
/// encode on the same instance.
#[derive(Clone)]
pub struct Encoder {
    surface: Arc<dyn ModuleSurface>,
    op_lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for Encoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Encoder").finish_non_exhaustive()
    }
}

impl Encoder {
    /// Wrap an instantiated module surface.
    pub fn new(surface: Arc<dyn ModuleSurface>) -> Self {
        Encoder {
            surface,
            op_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Encode UTF-8 text at the default error-correction level
    /// ([`Ecc::Low`]). The module picks the densest segment mode the
    /// text permits and boosts the level when the symbol has room.
    pub fn encode_text(&self, text: &str) -> Result<Matrix, EncodeError> {
        self.encode_text_with(text, Ecc::default())
    }

    /// Encode UTF-8 text at the given error-correction level.
    pub fn encode_text_with(&self, text: &str, ecc: Ecc) -> Result<Matrix, EncodeError> {
        let _op = self.lock_op();
        with_scope(self.surface.as_ref(), |scope| {
            let text_addr = scope.alloc_text(text)?;
            let buffer_len = Version::MAX.buffer_len() as u32;
            let result = scope.alloc(buffer_len)?;
            let temp = scope.alloc(buffer_len)?;
            let min = i32::from(Version::MIN.value());
            let max = i32::from(Version::MAX.value());
            let ok = scope.surface().encode_text(
                text_addr,
                temp,
                result,
                ecc.ordinal() as i32,
                min,
                max,
                AUTO_MASK,
                true,
            )?;
            if !ok {
                return Err(EncodeError::EncodingFailed);
            }
            marshal::read_matrix(scope.surface(), result)
        })
    }

    /// Encode raw bytes at the default error-correction level.
    pub fn encode_binary(&self, data: &[u8]) -> Result<Matrix, EncodeError> {
        self.encode_binary_with(data, Ecc::default())
    }

    /// Encode raw bytes at the given error-correction level.
    ///
    /// Payloads past the byte-mode capacity of the largest symbol are
    /// rejected up front, before any foreign memory is touched.
    pub fn encode_binary_with(&self, data: &[u8], ecc: Ecc) -> Result<Matrix, EncodeError> {
        let capacity = byte_mode_capacity(Version::MAX, ecc);
        if data.len() > capacity {
            return Err(EncodeError::PayloadTooLarge {
                length: data.len(),
                capacity,
            });
        }
        let _op = self.lock_op();
        with_scope(self.surface.as_ref(), |scope| {
            let buffer_len = Version::MAX.buffer_len() as u32;
            let result = scope.alloc(buffer_len)?;
            // The data buffer doubles as the module's working space,
            // so it is symbol-sized rather than payload-sized.
            let work = scope.alloc(buffer_len)?;
            scope.surface().write(work, data)?;
            let min = i32::from(Version::MIN.value());
            let max = i32::from(Version::MAX.value());
            let ok = scope.surface().encode_binary(
                work,
                data.len() as u32,
                result,
                ecc.ordinal() as i32,
                min,
                max,
                AUTO_MASK,
                true,
            )?;
            if !ok {
                return Err(EncodeError::EncodingFailed);
            }
            marshal::read_matrix(scope.surface(), result)
        })
    }

    /// Whether two encoders share the same module instance.
    pub fn same_instance(&self, other: &Encoder) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.surface), Arc::as_ptr(&other.surface))
    }

    fn lock_op(&self) -> std::sync::MutexGuard<'_, ()> {
        // The guard is a unit; a poisoned lock carries no bad state.
        self.op_lock.lock().unwrap_or_else(|e| e.into_inner())
    }
}
