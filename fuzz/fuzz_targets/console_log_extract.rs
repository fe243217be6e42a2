#![no_main]

use libfuzzer_sys::fuzz_target;
use prow_log_digest::{
    contains_control_sequences, extract_result, strip_control_sequences, ExtractionPolicy,
};

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);

    let stripped = strip_control_sequences(&raw);
    assert!(!contains_control_sequences(&stripped));
    assert_eq!(strip_control_sequences(&stripped), stripped);

    let result = extract_result(&raw, &ExtractionPolicy::default());
    if result.reportable {
        assert!(!result.message.is_empty());
    }
    if let Some(duration) = result.duration.as_deref() {
        if result.state.is_some() {
            assert!(result.message.ends_with(&format!("Ran for {duration}\n")));
        }
    }
});
