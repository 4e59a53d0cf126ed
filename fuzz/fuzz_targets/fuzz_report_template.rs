#![no_main]

use calico_validator::report_template::{TemplateFault, check};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    if let Err(faults) = check(&s) {
        assert!(!faults.is_empty());
        let nil = faults.iter().filter(|f| matches!(f, TemplateFault::NilPointer { .. })).count();
        assert!(nil == 0 || nil == faults.len(), "{:?}", faults);
    }
});
