//! Wasmtime-hosted computation module.
//!
//! Accepts an externally supplied wasm binary exporting the C call
//! contract and adapts it to [`ModuleSurface`]. A `Store` is not
//! `Sync`, so the instance lives behind a mutex; calls are short and
//! the facade already serializes whole encode operations above us.

use std::path::Path;
use std::sync::Mutex;

use qrbind_core::{ModuleFault, ModuleLoadError, ModuleSurface};
use wasmtime::{Engine, Instance, Memory, Module, Store, TypedFunc};

/// Export names of the C call contract.
mod exports {
    pub const MEMORY: &str = "memory";
    pub const MALLOC: &str = "malloc";
    pub const FREE: &str = "free";
    pub const ENCODE_TEXT: &str = "qrcodegen_encodeText";
    pub const ENCODE_BINARY: &str = "qrcodegen_encodeBinary";
    pub const GET_SIZE: &str = "qrcodegen_getSize";
    pub const GET_MODULE: &str = "qrcodegen_getModule";
    pub const INITIALIZE: &str = "_initialize";
}

type EncodeParams = (u32, u32, u32, i32, i32, i32, i32, i32);

struct Inner {
    store: Store<()>,
    memory: Memory,
    malloc: TypedFunc<u32, u32>,
    free: TypedFunc<u32, ()>,
    encode_text: TypedFunc<EncodeParams, i32>,
    encode_binary: TypedFunc<EncodeParams, i32>,
    get_size: TypedFunc<u32, i32>,
    get_module: TypedFunc<(u32, i32, i32), i32>,
}

/// A computation module instantiated from wasm bytes.
pub struct WasmModule {
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for WasmModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WasmModule").finish_non_exhaustive()
    }
}

impl WasmModule {
    /// Compile and instantiate a module from its binary (or text)
    /// encoding, resolve the call-contract exports, and run the
    /// module's `_initialize` hook if it exports one.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ModuleLoadError> {
        let engine = Engine::default();
        let module = Module::new(&engine, bytes).map_err(|e| ModuleLoadError::InvalidModule {
            reason: e.to_string(),
        })?;
        let mut store = Store::new(&engine, ());
        let instance = Instance::new(&mut store, &module, &[]).map_err(|e| {
            ModuleLoadError::Instantiate {
                reason: e.to_string(),
            }
        })?;

        let memory = instance.get_memory(&mut store, exports::MEMORY).ok_or_else(|| {
            ModuleLoadError::MissingExport {
                name: exports::MEMORY.to_owned(),
            }
        })?;
        let malloc = resolve(&instance, &mut store, exports::MALLOC)?;
        let free = resolve(&instance, &mut store, exports::FREE)?;
        let encode_text = resolve(&instance, &mut store, exports::ENCODE_TEXT)?;
        let encode_binary = resolve(&instance, &mut store, exports::ENCODE_BINARY)?;
        let get_size = resolve(&instance, &mut store, exports::GET_SIZE)?;
        let get_module = resolve(&instance, &mut store, exports::GET_MODULE)?;

        // Reactor-style modules expect a one-time initialization call
        // before any other export is used. The export is optional, but
        // if present it must be a nullary routine.
        if let Some(func) = instance.get_func(&mut store, exports::INITIALIZE) {
            let initialize = func.typed::<(), ()>(&store).map_err(|e| {
                ModuleLoadError::Instantiate {
                    reason: e.to_string(),
                }
            })?;
            initialize
                .call(&mut store, ())
                .map_err(|e| ModuleLoadError::Instantiate {
                    reason: e.to_string(),
                })?;
        }

        Ok(WasmModule {
            inner: Mutex::new(Inner {
                store,
                memory,
                malloc,
                free,
                encode_text,
                encode_binary,
                get_size,
                get_module,
            }),
        })
    }

    /// Load a wasm binary from disk and instantiate it.
    pub fn from_file(path: &Path) -> Result<Self, ModuleLoadError> {
        let bytes = std::fs::read(path).map_err(|e| ModuleLoadError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_bytes(&bytes)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn resolve<Params, Results>(
    instance: &Instance,
    store: &mut Store<()>,
    name: &str,
) -> Result<TypedFunc<Params, Results>, ModuleLoadError>
where
    Params: wasmtime::WasmParams,
    Results: wasmtime::WasmResults,
{
    instance
        .get_typed_func(store, name)
        .map_err(|_| ModuleLoadError::MissingExport {
            name: name.to_owned(),
        })
}

fn trap(error: wasmtime::Error) -> ModuleFault {
    ModuleFault::new(error)
}

#[allow(clippy::too_many_arguments)]
fn encode_params(
    a: u32,
    b: u32,
    result: u32,
    ecc: i32,
    min_version: i32,
    max_version: i32,
    mask: i32,
    boost_ecc: bool,
) -> EncodeParams {
    (
        a,
        b,
        result,
        ecc,
        min_version,
        max_version,
        mask,
        i32::from(boost_ecc),
    )
}

impl ModuleSurface for WasmModule {
    fn alloc(&self, size: u32) -> Result<u32, ModuleFault> {
        let inner = &mut *self.lock();
        inner.malloc.call(&mut inner.store, size).map_err(trap)
    }

    fn release(&self, address: u32) -> Result<(), ModuleFault> {
        let inner = &mut *self.lock();
        inner.free.call(&mut inner.store, address).map_err(trap)
    }

    fn write(&self, address: u32, bytes: &[u8]) -> Result<(), ModuleFault> {
        let inner = &mut *self.lock();
        inner
            .memory
            .write(&mut inner.store, address as usize, bytes)
            .map_err(ModuleFault::new)
    }

    fn read(&self, address: u32, len: u32) -> Result<Vec<u8>, ModuleFault> {
        let inner = &mut *self.lock();
        let mut buffer = vec![0u8; len as usize];
        inner
            .memory
            .read(&inner.store, address as usize, &mut buffer)
            .map_err(ModuleFault::new)?;
        Ok(buffer)
    }

    fn encode_text(
        &self,
        text: u32,
        temp: u32,
        result: u32,
        ecc: i32,
        min_version: i32,
        max_version: i32,
        mask: i32,
        boost_ecc: bool,
    ) -> Result<bool, ModuleFault> {
        let inner = &mut *self.lock();
        let params = encode_params(
            text,
            temp,
            result,
            ecc,
            min_version,
            max_version,
            mask,
            boost_ecc,
        );
        let ok = inner
            .encode_text
            .call(&mut inner.store, params)
            .map_err(trap)?;
        Ok(ok != 0)
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
        let inner = &mut *self.lock();
        let params = encode_params(
            data,
            data_len,
            result,
            ecc,
            min_version,
            max_version,
            mask,
            boost_ecc,
        );
        let ok = inner
            .encode_binary
            .call(&mut inner.store, params)
            .map_err(trap)?;
        Ok(ok != 0)
    }

    fn matrix_size(&self, result: u32) -> Result<u32, ModuleFault> {
        let inner = &mut *self.lock();
        let size = inner
            .get_size
            .call(&mut inner.store, result)
            .map_err(trap)?;
        u32::try_from(size)
            .map_err(|_| ModuleFault::new(format!("module reported negative size {size}")))
    }

    fn matrix_cell(&self, result: u32, x: u32, y: u32) -> Result<bool, ModuleFault> {
        let inner = &mut *self.lock();
        let (x, y) = match (i32::try_from(x), i32::try_from(y)) {
            (Ok(x), Ok(y)) => (x, y),
            // Coordinates past i32::MAX cannot address any symbol.
            _ => return Ok(false),
        };
        let dark = inner
            .get_module
            .call(&mut inner.store, (result, x, y))
            .map_err(trap)?;
        Ok(dark != 0)
    }
}
