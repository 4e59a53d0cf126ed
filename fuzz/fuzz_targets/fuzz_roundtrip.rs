#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);

    let resource = match calico_validator::parse(&s) {
        Ok(r) => r,
        Err(_) => return,
    };

    let normalized = calico_validator::normalize(resource);

    let yaml = match calico_validator::serialize(&normalized) {
        Ok(y) => y,
        Err(_) => return,
    };

    // Whatever serialize writes, parse must accept.
    if let Err(e) = calico_validator::parse(&yaml) {
        panic!(
            "Roundtrip failure: {}\nInput (lossy): {:?}\nSerialized YAML:\n{}",
            e,
            s.get(..200).unwrap_or(&s),
            yaml.get(..500).unwrap_or(&yaml),
        );
    }
});
