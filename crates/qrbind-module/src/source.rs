//! Explicit computation-module source selection.

use std::path::PathBuf;
use std::sync::Arc;

use qrbind_core::{ModuleLoadError, ModuleSurface};

use crate::embedded::EmbeddedModule;
use crate::wasm::WasmModule;

/// Where the computation module comes from.
///
/// The caller picks a source and hands it to the lifecycle; nothing in
/// the binding layer sniffs its environment to guess one. The default
/// is the embedded module, which is always available.
#[derive(Clone, Debug, Default)]
pub enum ModuleSource {
    /// The encoder compiled into this binary.
    #[default]
    Embedded,
    /// A wasm module already loaded into memory.
    WasmBytes(Vec<u8>),
    /// A wasm module on disk.
    WasmFile(PathBuf),
}

impl ModuleSource {
    /// Instantiate a fresh module from this source.
    pub fn instantiate(&self) -> Result<Arc<dyn ModuleSurface>, ModuleLoadError> {
        match self {
            ModuleSource::Embedded => Ok(Arc::new(EmbeddedModule::new())),
            ModuleSource::WasmBytes(bytes) => Ok(Arc::new(WasmModule::from_bytes(bytes)?)),
            ModuleSource::WasmFile(path) => Ok(Arc::new(WasmModule::from_file(path)?)),
        }
    }
}
