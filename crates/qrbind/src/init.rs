//! Module lifecycle: one lazily-instantiated encoder per process.
//!
//! Instantiating a computation module is the expensive step (for a
//! wasm source it compiles and initializes the binary), so the process
//! shares a single instance. Initialization is single-flight: the slot
//! lock is held across instantiation, concurrent callers wait for the
//! first attempt instead of racing their own. A failed attempt leaves
//! the slot empty so a later call can retry, possibly with a different
//! source.

use std::sync::Mutex;

use qrbind_core::ModuleLoadError;
use qrbind_module::ModuleSource;

use crate::api::Encoder;

/// A lazily-initialized encoder slot.
///
/// The crate keeps one process-wide instance behind [`init`], but a
/// `Lifecycle` can also be owned directly when tests or embedders need
/// isolated instances.
pub struct Lifecycle {
    slot: Mutex<Option<Encoder>>,
}

impl Lifecycle {
    /// An empty slot; nothing is instantiated until the first
    /// [`get_or_init`](Self::get_or_init).
    pub const fn new() -> Self {
        Lifecycle {
            slot: Mutex::new(None),
        }
    }

    /// Return the shared encoder, instantiating it from `source` on
    /// first use. The source is only consulted when the slot is empty;
    /// an already-initialized slot wins regardless of the source
    /// passed.
    pub fn get_or_init(&self, source: &ModuleSource) -> Result<Encoder, ModuleLoadError> {
        let mut slot = self.lock();
        if let Some(encoder) = &*slot {
            return Ok(encoder.clone());
        }
        let surface = source.instantiate()?;
        let encoder = Encoder::new(surface);
        *slot = Some(encoder.clone());
        Ok(encoder)
    }

    /// Drop the current instance, if any. The next
    /// [`get_or_init`](Self::get_or_init) instantiates afresh.
    /// Encoders already handed out keep their instance alive.
    pub fn reset(&self) {
        *self.lock() = None;
    }

    /// Whether the slot currently holds an instance.
    pub fn is_ready(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Encoder>> {
        // Instantiation does not unwind midway through a slot update.
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

static LIFECYCLE: Lifecycle = Lifecycle::new();

/// Process-wide encoder backed by the embedded computation module.
pub fn init() -> Result<Encoder, ModuleLoadError> {
    LIFECYCLE.get_or_init(&ModuleSource::Embedded)
}

/// Process-wide encoder instantiated from an explicit source. Only the
/// first successful call's source takes effect; later calls return the
/// existing instance.
pub fn init_with(source: &ModuleSource) -> Result<Encoder, ModuleLoadError> {
    LIFECYCLE.get_or_init(source)
}

/// Drop the process-wide instance so the next [`init`] starts over.
pub fn reset() {
    LIFECYCLE.reset();
}
