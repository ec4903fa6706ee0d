#![no_main]

use a2ui_core::{Response, build_component_tree, validate_response};
use a2ui_render::DiagnosticKind;
use a2ui_render::text::{OutlineGuides, text_renderer};
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

fuzz_target!(|data: &[u8]| {
    if data.len() > 16 * 1024 {
        return;
    }
    let Ok(raw) = serde_json::from_slice::<Value>(data) else {
        return;
    };

    let result = validate_response(&raw);
    assert_eq!(result.valid, result.errors.is_empty());

    // Anything that deserializes must walk without panicking, cycles included.
    if let Ok(response) = serde_json::from_value::<Response>(raw.clone()) {
        if let Some(tree) = build_component_tree(&response) {
            assert!(tree.size() >= 1);
        }
        let renderer = text_renderer(OutlineGuides::Ascii);
        let outcome = renderer.render_value(&raw);
        if outcome.validation.as_ref().is_some_and(|v| v.valid) {
            assert_eq!(outcome.count(DiagnosticKind::MissingRoot), 0);
        }
    }
});
