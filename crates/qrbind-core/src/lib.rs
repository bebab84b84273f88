//! Core types and the module calling-surface contract for qrbind.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every other qrbind crate: error-correction
//! levels, symbol versions and their capacity arithmetic, the module
//! matrix produced by an encode, the error taxonomy, and the
//! [`ModuleSurface`] trait through which a computation module is driven.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod capacity;
pub mod ecc;
pub mod error;
pub mod matrix;
pub mod surface;
pub mod version;

pub use ecc::Ecc;
pub use error::{EncodeError, ModuleFault, ModuleLoadError};
pub use matrix::Matrix;
pub use surface::{ModuleSurface, AUTO_MASK};
pub use version::Version;
