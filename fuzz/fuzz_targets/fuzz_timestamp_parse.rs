#![no_main]

use libfuzzer_sys::fuzz_target;
use ticket_desk::util::time::parse_timestamp;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let _ = parse_timestamp("from", input);
        let _ = input.parse::<ticket_desk::model::Status>();
        let _ = input.parse::<ticket_desk::model::Priority>();
    }
});
