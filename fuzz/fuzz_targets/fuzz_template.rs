#![no_main]

use arbitrary::Arbitrary;
use calico_validator::Substitution;
use calico_validator::template::{extract_variables, substitute_variables};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    query: String,
    substitutions: Vec<(String, Vec<String>)>,
}

fuzz_target!(|input: Input| {
    let subs: Vec<Substitution> = input
        .substitutions
        .into_iter()
        .map(|(name, values)| Substitution { name, values })
        .collect();

    if extract_variables(&input.query).is_err() {
        // An unterminated placeholder must fail substitution the same way.
        assert!(substitute_variables(&input.query, &subs).is_err());
        return;
    }
    let _ = substitute_variables(&input.query, &subs);
});
