#![no_main]

use calico_validator::enums::Dataset;
use calico_validator::query::parse;
use libfuzzer_sys::fuzz_target;

const DATASETS: [Dataset; 6] = [
    Dataset::Audit,
    Dataset::Dns,
    Dataset::Flows,
    Dataset::L7,
    Dataset::Waf,
    Dataset::Vulnerability,
];

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    if let Ok(query) = parse(&s) {
        for dataset in DATASETS {
            let _ = query.validate_for(dataset);
        }
    }
});
