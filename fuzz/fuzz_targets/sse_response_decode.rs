#![no_main]

use graphmem_transport::interpret_tool_result;
use graphmem_transport::jsonrpc::decode_response_body;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    for content_type in [None, Some("text/event-stream"), Some("application/json")] {
        let Ok(envelope) = decode_response_body(&raw, content_type) else {
            continue;
        };
        if let Ok(result) = envelope.into_result() {
            let _ = interpret_tool_result("fuzz", result);
        }
    }
});
