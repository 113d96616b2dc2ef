#![no_main]

use graphmem_namespace::{directory_fingerprint, normalize_relative_path, normalize_remote_url};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    let normalized = normalize_remote_url(&raw);
    assert_eq!(normalized, normalized.to_lowercase());
    assert!(!normalized.ends_with(".git/"));

    let relative = normalize_relative_path(&raw);
    assert!(!relative.contains('\\'));
    assert!(!relative.starts_with('/'));

    let fingerprint = directory_fingerprint(&normalized);
    assert_eq!(fingerprint.len(), 8);
    assert!(fingerprint.chars().all(|c| c.is_ascii_hexdigit()));
});
