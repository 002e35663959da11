#![no_main]

use libfuzzer_sys::fuzz_target;
use ticket_desk::util::uploads::{guess_content_type, sanitize_filename};

fuzz_target!(|data: &[u8]| {
    let name = String::from_utf8_lossy(data);
    let safe = sanitize_filename(&name);
    assert!(!safe.is_empty());
    assert!(!safe.contains('/'));
    assert!(!safe.contains('\\'));
    assert!(!safe.starts_with('.'));
    let _ = guess_content_type(&safe);
});
