//! End-to-end encode tests against the embedded computation module,
//! including the leak-freedom guarantees of the scoped allocator.

use std::sync::Arc;

use qrbind::{Ecc, EncodeError, Encoder};
use qrbind_module::EmbeddedModule;

fn instrumented() -> (Arc<EmbeddedModule>, Encoder) {
    let module = Arc::new(EmbeddedModule::new());
    let encoder = Encoder::new(module.clone());
    (module, encoder)
}

#[test]
fn encode_text_yields_a_valid_symbol() {
    let (_, encoder) = instrumented();
    let matrix = encoder.encode_text_with("fdsafdsa", Ecc::Quartile).unwrap();
    let size = matrix.size();
    assert!(size >= 21 && size <= 177);
    assert_eq!((size - 17) % 4, 0);
    // Finder pattern corner is always dark.
    assert!(matrix.is_dark(0, 0));
    assert!(matrix.is_dark(size - 1, 0));
    assert!(matrix.is_dark(0, size - 1));
}

#[test]
fn encode_single_byte() {
    let (_, encoder) = instrumented();
    let matrix = encoder.encode_binary(&[1]).unwrap();
    assert_eq!(matrix.size(), 21);
}

#[test]
fn empty_text_encodes_to_the_smallest_symbol() {
    let (_, encoder) = instrumented();
    let matrix = encoder.encode_text("").unwrap();
    assert_eq!(matrix.size(), 21);
}

#[test]
fn oversized_binary_is_rejected_before_any_allocation() {
    let (module, encoder) = instrumented();
    let err = encoder.encode_binary(&[0u8; 3000]).unwrap_err();
    assert_eq!(
        err,
        EncodeError::PayloadTooLarge {
            length: 3000,
            capacity: 2953,
        }
    );
    // The precheck fired before the module was touched.
    assert_eq!(module.total_allocations(), 0);
}

#[test]
fn binary_capacity_boundary() {
    let (_, encoder) = instrumented();
    let matrix = encoder.encode_binary(&[7u8; 2953]).unwrap();
    assert_eq!(matrix.size(), 177);
    assert!(matches!(
        encoder.encode_binary(&[7u8; 2954]),
        Err(EncodeError::PayloadTooLarge { .. })
    ));
}

#[test]
fn capacity_ceiling_tracks_the_requested_ecc() {
    let (_, encoder) = instrumented();
    // 2000 bytes fit at Low but exceed the High ceiling of 1273.
    let payload = vec![0u8; 2000];
    assert!(encoder.encode_binary(&payload).is_ok());
    let err = encoder.encode_binary_with(&payload, Ecc::High).unwrap_err();
    assert!(matches!(
        err,
        EncodeError::PayloadTooLarge { capacity: 1273, .. }
    ));
}

#[test]
fn oversized_text_fails_inside_the_module() {
    let (_, encoder) = instrumented();
    // Text has no host-side precheck; the module reports the misfit.
    let long = "a".repeat(3000);
    assert_eq!(
        encoder.encode_text(&long).unwrap_err(),
        EncodeError::EncodingFailed
    );
}

#[test]
fn no_foreign_memory_leaks_on_success() {
    let (module, encoder) = instrumented();
    for _ in 0..10 {
        encoder.encode_text("leak check").unwrap();
    }
    assert!(module.total_allocations() > 0);
    assert_eq!(module.live_allocations(), 0);
}

#[test]
fn no_foreign_memory_leaks_on_failure() {
    let (module, encoder) = instrumented();
    let long = "a".repeat(3000);
    for _ in 0..10 {
        encoder.encode_text(&long).unwrap_err();
    }
    assert!(module.total_allocations() > 0);
    assert_eq!(module.live_allocations(), 0);
}

#[test]
fn higher_ecc_never_shrinks_the_symbol() {
    let (_, encoder) = instrumented();
    let payload = vec![0xA5u8; 100];
    let mut previous = 0;
    for ecc in Ecc::ALL {
        let matrix = encoder.encode_binary_with(&payload, ecc).unwrap();
        assert!(matrix.size() >= previous);
        previous = matrix.size();
    }
}

#[test]
fn concurrent_encodes_share_one_instance_cleanly() {
    let (module, encoder) = instrumented();
    std::thread::scope(|s| {
        for i in 0..8 {
            let encoder = encoder.clone();
            s.spawn(move || {
                let text = format!("thread payload {i}");
                let matrix = encoder.encode_text(&text).unwrap();
                assert!(matrix.size() >= 21);
            });
        }
    });
    assert_eq!(module.live_allocations(), 0);
}

#[test]
fn matrices_outlive_the_encode_call() {
    let (module, encoder) = instrumented();
    let matrix = encoder.encode_text("detached copy").unwrap();
    assert_eq!(module.live_allocations(), 0);
    // The matrix is host-owned; the module can even be replaced.
    drop(encoder);
    drop(module);
    assert!(matrix.dark_count() > 0);
}
