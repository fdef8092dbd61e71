#![no_main]

use libfuzzer_sys::fuzz_target;
use scriptbridge_rs::{manifest, parser};

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);

    // Interpreter output never panics the parser
    let result = parser::parse(&input);
    assert!(result.test_count() >= 1, "Result with zero tests");
    if result.raw_message() != input {
        assert!(!result.success(), "Unparseable output reported success");
    }

    // Same input, same result
    assert_eq!(result, parser::parse(&input), "Output parser is not deterministic");

    // Manifests either parse or fail with an error, never a panic
    if let Ok(registry) = manifest::parse(&input) {
        for id in registry.test_ids() {
            assert!(!id.is_empty(), "Empty test id");
            let _ = registry.resolve(id);
        }
    }
});
