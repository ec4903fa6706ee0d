#![no_main]

use a2ui_core::{Condition, JsonMap, evaluate_condition};
use libfuzzer_sys::fuzz_target;
use serde_json::json;

fuzz_target!(|data: &[u8]| {
    let Ok(expr) = std::str::from_utf8(data) else {
        return;
    };
    if expr.len() > 1024 {
        return;
    }

    let mut model = JsonMap::new();
    model.insert("flag".into(), json!(true));
    model.insert("user".into(), json!({"name": "Ada", "admin": false}));

    // Unparseable expressions always fail open.
    match Condition::parse(expr) {
        Ok(condition) => {
            assert_eq!(condition.evaluate(&model), evaluate_condition(expr, &model));
            assert_eq!(condition.source(), expr);
        }
        Err(_) => assert!(evaluate_condition(expr, &model)),
    }
});
