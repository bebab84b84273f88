//! Computation-module backends for qrbind.
//!
//! The binding layer drives any module through the
//! [`ModuleSurface`](qrbind_core::ModuleSurface) contract; this crate
//! provides the two implementations and the source resolution that
//! picks between them:
//!
//! - [`EmbeddedModule`]: the compiled-in encoder behind an emulated
//!   linear memory. The analogue of shipping the computation unit as
//!   an embedded payload, with no file or network access, works anywhere
//!   the host binary runs.
//! - [`WasmModule`]: a wasmtime-hosted instance of an externally
//!   supplied module exporting the C call contract (`malloc`, `free`,
//!   `qrcodegen_encodeText`, ...).
//! - [`ModuleSource`]: explicit source selection, injected by the
//!   caller instead of discovered by runtime environment sniffing.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod embedded;
pub mod source;
pub mod wasm;

pub use embedded::EmbeddedModule;
pub use source::ModuleSource;
pub use wasm::WasmModule;
