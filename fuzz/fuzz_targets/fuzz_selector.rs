#![no_main]

use calico_validator::selector::parse;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    let Ok(selector) = parse(&s) else {
        return;
    };

    // Rendering a parsed selector must give text that parses to the same tree.
    let shown = selector.to_string();
    match parse(&shown) {
        Ok(reparsed) if reparsed == selector => {}
        other => panic!(
            "selector display does not reparse.\nInput: {:?}\nShown: {}\nResult: {:?}",
            s.get(..200).unwrap_or(&s),
            shown,
            other,
        ),
    }
});
