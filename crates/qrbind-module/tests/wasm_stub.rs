//! Drives the wasmtime backend with a minimal stub module that speaks
//! the C call contract: a bump allocator and a fixed 21-module symbol
//! filled with an alternating bit pattern. The stub stands in for the
//! real computation unit so the host-side plumbing (export resolution,
//! memory access, trap mapping) is tested without a full encoder
//! binary.

use qrbind_core::{ModuleLoadError, ModuleSurface, AUTO_MASK};
use qrbind_module::WasmModule;

const STUB: &str = r#"
(module
  (memory (export "memory") 1)
  (global $brk (mut i32) (i32.const 8))
  (func (export "malloc") (param $size i32) (result i32)
    (local $addr i32)
    (local.set $addr (global.get $brk))
    (global.set $brk (i32.add (global.get $brk) (local.get $size)))
    (local.get $addr))
  (func (export "free") (param i32))
  (func $fill (param $result i32)
    (local $i i32)
    (i32.store8 (local.get $result) (i32.const 21))
    (block $done
      (loop $next
        (br_if $done (i32.ge_u (local.get $i) (i32.const 56)))
        (i32.store8
          (i32.add (i32.add (local.get $result) (i32.const 1)) (local.get $i))
          (i32.const 0xAA))
        (local.set $i (i32.add (local.get $i) (i32.const 1)))
        (br $next))))
  (func (export "qrcodegen_encodeText")
      (param i32 i32 i32 i32 i32 i32 i32 i32) (result i32)
    (call $fill (local.get 2))
    (i32.const 1))
  (func (export "qrcodegen_encodeBinary")
      (param i32 i32 i32 i32 i32 i32 i32 i32) (result i32)
    (call $fill (local.get 2))
    (i32.const 1))
  (func (export "qrcodegen_getSize") (param $result i32) (result i32)
    (i32.load8_u (local.get $result)))
  (func (export "qrcodegen_getModule")
      (param $result i32) (param $x i32) (param $y i32) (result i32)
    (local $index i32)
    (local.set $index
      (i32.add
        (i32.mul (local.get $y) (i32.load8_u (local.get $result)))
        (local.get $x)))
    (i32.and
      (i32.shr_u
        (i32.load8_u
          (i32.add (i32.add (local.get $result) (i32.const 1))
                   (i32.shr_u (local.get $index) (i32.const 3))))
        (i32.and (local.get $index) (i32.const 7)))
      (i32.const 1)))
  (func (export "_initialize")
    (i32.store8 (i32.const 4) (i32.const 1))))
"#;

fn stub_module() -> WasmModule {
    WasmModule::from_bytes(STUB.as_bytes()).expect("stub module instantiates")
}

#[test]
fn full_call_sequence_against_the_stub() {
    let module = stub_module();
    let text = module.alloc(6).unwrap();
    assert_ne!(text, 0);
    module.write(text, b"hello\0").unwrap();
    let result = module.alloc(64).unwrap();
    let temp = module.alloc(64).unwrap();

    let ok = module
        .encode_text(text, temp, result, 0, 1, 40, AUTO_MASK, true)
        .unwrap();
    assert!(ok);
    assert_eq!(module.matrix_size(result).unwrap(), 21);

    // The stub packs 0xAA LSB-first: odd bit indices are dark.
    assert!(!module.matrix_cell(result, 0, 0).unwrap());
    assert!(module.matrix_cell(result, 1, 0).unwrap());
    assert!(!module.matrix_cell(result, 2, 0).unwrap());

    module.release(temp).unwrap();
    module.release(result).unwrap();
    module.release(text).unwrap();
}

#[test]
fn allocator_hands_out_distinct_addresses() {
    let module = stub_module();
    let a = module.alloc(16).unwrap();
    let b = module.alloc(16).unwrap();
    assert_ne!(a, b);
    module.write(a, &[1; 16]).unwrap();
    module.write(b, &[2; 16]).unwrap();
    assert_eq!(module.read(a, 16).unwrap(), vec![1; 16]);
    assert_eq!(module.read(b, 16).unwrap(), vec![2; 16]);
}

#[test]
fn initialization_hook_runs_once_at_load() {
    let module = stub_module();
    assert_eq!(module.read(4, 1).unwrap(), vec![1]);
}

#[test]
fn out_of_bounds_memory_access_faults() {
    let module = stub_module();
    // One wasm page is 64 KiB.
    assert!(module.read(1 << 17, 1).is_err());
    assert!(module.write(1 << 17, &[0]).is_err());
}

#[test]
fn trapping_export_surfaces_as_fault() {
    let wat = r#"
    (module
      (memory (export "memory") 1)
      (func (export "malloc") (param i32) (result i32) unreachable)
      (func (export "free") (param i32))
      (func (export "qrcodegen_encodeText")
          (param i32 i32 i32 i32 i32 i32 i32 i32) (result i32)
        unreachable)
      (func (export "qrcodegen_encodeBinary")
          (param i32 i32 i32 i32 i32 i32 i32 i32) (result i32)
        unreachable)
      (func (export "qrcodegen_getSize") (param i32) (result i32) unreachable)
      (func (export "qrcodegen_getModule") (param i32 i32 i32) (result i32)
        unreachable))
    "#;
    let module = WasmModule::from_bytes(wat.as_bytes()).unwrap();
    let fault = module.alloc(8).unwrap_err();
    assert!(!fault.reason.is_empty());
    assert!(module.matrix_size(0).is_err());
}

#[test]
fn missing_contract_export_is_reported_by_name() {
    // Everything present except the allocator.
    let wat = r#"
    (module
      (memory (export "memory") 1)
      (func (export "free") (param i32)))
    "#;
    let err = WasmModule::from_bytes(wat.as_bytes()).unwrap_err();
    match err {
        ModuleLoadError::MissingExport { name } => assert_eq!(name, "malloc"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_initialization_hook_fails_the_load() {
    // Full contract, but `_initialize` is not a nullary routine.
    let wat = r#"
    (module
      (memory (export "memory") 1)
      (func (export "malloc") (param i32) (result i32) (i32.const 8))
      (func (export "free") (param i32))
      (func (export "qrcodegen_encodeText")
          (param i32 i32 i32 i32 i32 i32 i32 i32) (result i32)
        (i32.const 0))
      (func (export "qrcodegen_encodeBinary")
          (param i32 i32 i32 i32 i32 i32 i32 i32) (result i32)
        (i32.const 0))
      (func (export "qrcodegen_getSize") (param i32) (result i32) (i32.const 0))
      (func (export "qrcodegen_getModule") (param i32 i32 i32) (result i32)
        (i32.const 0))
      (func (export "_initialize") (param i32)))
    "#;
    let err = WasmModule::from_bytes(wat.as_bytes()).unwrap_err();
    assert!(matches!(err, ModuleLoadError::Instantiate { .. }));
}

#[test]
fn trapping_initialization_hook_fails_the_load() {
    let wat = r#"
    (module
      (memory (export "memory") 1)
      (func (export "malloc") (param i32) (result i32) (i32.const 8))
      (func (export "free") (param i32))
      (func (export "qrcodegen_encodeText")
          (param i32 i32 i32 i32 i32 i32 i32 i32) (result i32)
        (i32.const 0))
      (func (export "qrcodegen_encodeBinary")
          (param i32 i32 i32 i32 i32 i32 i32 i32) (result i32)
        (i32.const 0))
      (func (export "qrcodegen_getSize") (param i32) (result i32) (i32.const 0))
      (func (export "qrcodegen_getModule") (param i32 i32 i32) (result i32)
        (i32.const 0))
      (func (export "_initialize") unreachable))
    "#;
    let err = WasmModule::from_bytes(wat.as_bytes()).unwrap_err();
    assert!(matches!(err, ModuleLoadError::Instantiate { .. }));
}

#[test]
fn invalid_bytes_are_rejected_at_load() {
    let err = WasmModule::from_bytes(b"\0asm junk").unwrap_err();
    assert!(matches!(err, ModuleLoadError::InvalidModule { .. }));
}
