//! Error taxonomy for the binding layer.
//!
//! Four conditions are surfaced to callers as distinct, inspectable
//! failures: allocator exhaustion, an oversized binary payload, a
//! failed encode, and a module that could not be loaded. A fifth,
//! [`ModuleFault`], covers boundary faults (a wasm trap, for example)
//! that the original call contract has no success flag for.

use std::error::Error;
use std::fmt;

/// A fault raised by the module boundary itself, as opposed to the
/// computation reporting failure through its success flag.
///
/// The embedded backend never faults; a wasm backend surfaces traps
/// through this type. A fault is scoped to the failing call; the
/// module instance stays usable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleFault {
    /// Human-readable description of the fault.
    pub reason: String,
}

impl ModuleFault {
    /// Build a fault from anything displayable.
    pub fn new(reason: impl fmt::Display) -> Self {
        ModuleFault {
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for ModuleFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "module boundary fault: {}", self.reason)
    }
}

impl Error for ModuleFault {}

/// Errors from a single encode operation.
///
/// None of these affect the module lifecycle: the instance remains
/// ready and every scope-tracked allocation is released before the
/// error reaches the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EncodeError {
    /// The module allocator returned the null address.
    OutOfMemory {
        /// Number of bytes requested.
        requested: u32,
    },
    /// Binary input exceeds the capacity ceiling for the highest
    /// supported version. Checked before any allocation is performed.
    PayloadTooLarge {
        /// Length of the rejected payload in bytes.
        length: usize,
        /// The capacity ceiling that was exceeded.
        capacity: usize,
    },
    /// The computation module reported failure for valid-sized input;
    /// legitimately possible when data does not fit any supported
    /// version even with error-correction boosting.
    EncodingFailed,
    /// The module boundary faulted mid-call.
    ModuleFault(ModuleFault),
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory { requested } => {
                write!(f, "module allocator exhausted: requested {requested} bytes")
            }
            Self::PayloadTooLarge { length, capacity } => {
                write!(
                    f,
                    "payload of {length} bytes exceeds capacity ceiling of {capacity} bytes"
                )
            }
            Self::EncodingFailed => write!(f, "module reported unencodable input"),
            Self::ModuleFault(fault) => fault.fmt(f),
        }
    }
}

impl Error for EncodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ModuleFault(fault) => Some(fault),
            _ => None,
        }
    }
}

impl From<ModuleFault> for EncodeError {
    fn from(fault: ModuleFault) -> Self {
        EncodeError::ModuleFault(fault)
    }
}

/// Errors from resolving or instantiating a computation module.
///
/// A load failure leaves the lifecycle uninitialized so a later call
/// may retry, possibly with a different source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModuleLoadError {
    /// A file-based source could not be read.
    Read {
        /// The path that failed.
        path: String,
        /// The I/O error text.
        reason: String,
    },
    /// The supplied bytes are not a valid module.
    InvalidModule {
        /// Validation or compilation error text.
        reason: String,
    },
    /// The module validated but did not export a required symbol.
    MissingExport {
        /// Name of the absent export.
        name: String,
    },
    /// Instantiation or the module's start routine failed.
    Instantiate {
        /// Failure description.
        reason: String,
    },
}

impl fmt::Display for ModuleLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, reason } => {
                write!(f, "failed to read module from '{path}': {reason}")
            }
            Self::InvalidModule { reason } => write!(f, "invalid module: {reason}"),
            Self::MissingExport { name } => write!(f, "module is missing export '{name}'"),
            Self::Instantiate { reason } => write!(f, "module instantiation failed: {reason}"),
        }
    }
}

impl Error for ModuleLoadError {}
