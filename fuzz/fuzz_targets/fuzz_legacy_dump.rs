#![no_main]

use libfuzzer_sys::fuzz_target;
use quizvault::storage::LegacyDump;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(dump) = LegacyDump::parse(json, "quizletData") {
        let rendered = dump.to_json().expect("a parsed dump renders");
        let again = LegacyDump::parse(&rendered, "quizletData").expect("rendered dump parses");
        assert_eq!(again.record_count(), dump.record_count());
    }
});
