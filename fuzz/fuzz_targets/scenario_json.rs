//! Fuzz target for scenario documents and record conversion.

#![no_main]

use libfuzzer_sys::fuzz_target;
use palisade_validation::{ScenarioStore, record_from_json};

fuzz_target!(|data: &[u8]| {
    if let Ok(store) = serde_json::from_slice::<ScenarioStore>(data) {
        for key in store.keys() {
            let scenario = store.get(key).expect("listed key is present");
            assert!(scenario.rule_count() >= scenario.iter().filter(|(_, r)| !r.is_empty()).count());
        }
    }

    if let Ok(json) = serde_json::from_slice::<serde_json::Value>(data) {
        let _ = record_from_json(json);
    }
});
