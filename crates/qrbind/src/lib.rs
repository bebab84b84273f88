//! QR code encoding over a scoped linear-memory computation module.
//!
//! The heavy lifting of QR encoding happens inside a *computation
//! module*: a unit with its own flat linear memory, addressed by `u32`
//! offsets, exposing a C-shaped call contract. This crate is the
//! binding layer around it:
//!
//! - `qrbind-core` defines the surface contract, the data model, and
//!   capacity arithmetic;
//! - `qrbind-scope` balances every foreign allocation with a release,
//!   even across errors and panics;
//! - `qrbind-module` provides the module backends (compiled-in encoder
//!   or a wasmtime-hosted binary);
//! - this crate ties them together behind [`Encoder`] and the
//!   process-wide [`init`] lifecycle, and renders matrices onto pixel
//!   surfaces.
//!
//! # Quick start
//!
//! ```
//! let encoder = qrbind::init()?;
//! let matrix = encoder.encode_text("https://example.com/")?;
//! assert!(matrix.size() >= 21);
//!
//! let image = qrbind::render::render_image(
//!     &matrix,
//!     4,
//!     &qrbind::render::DrawOptions::default(),
//! );
//! assert_eq!(image.width(), matrix.size() as u32 * 4);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Encoders are cheap to clone and safe to share across threads; all
//! clones from one [`init`] drive the same module instance.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod api;
pub mod init;
pub mod render;

pub use api::Encoder;
pub use init::{init, init_with, reset, Lifecycle};

pub use qrbind_core::{Ecc, EncodeError, Matrix, ModuleLoadError, ModuleSurface};
pub use qrbind_module::ModuleSource;
