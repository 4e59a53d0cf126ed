#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    if let Ok(resource) = calico_validator::parse(&s) {
        let first = calico_validator::validate(&resource);
        // Validation is a pure function of the resource.
        assert_eq!(first, calico_validator::validate(&resource));
    }
});
