#![no_main]

use a2ui_core::{normalize_payload, parse_agent_reply};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(content) = std::str::from_utf8(data) else {
        return;
    };
    if content.len() > 16 * 1024 {
        return;
    }

    let reply = parse_agent_reply(content);
    if let Some(payload) = &reply.a2ui {
        let once = normalize_payload(payload);
        // Normalizing twice changes nothing once ids exist.
        assert_eq!(normalize_payload(&once), once);
        let _ = reply.response();
    }
});
