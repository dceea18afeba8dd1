use proptest::prelude::*;
use serde_json::{json, Value};

/// Strategy for valid `(min, max)` bounds, `None` for open-ended
pub fn bounds_strategy() -> impl Strategy<Value = (u64, Option<u64>)> {
    (1u64..1_000_000, prop::option::weighted(0.8, 0u64..1_000_000))
        .prop_map(|(min, span)| (min, span.map(|span| min + span)))
}

/// Strategy rendering valid bounds in any accepted descriptor shape
pub fn valid_descriptor_strategy() -> impl Strategy<Value = ((u64, Option<u64>), Value)> {
    (bounds_strategy(), 0u8..4).prop_map(|((min, max), shape)| {
        let descriptor = match (shape, max) {
            (0, Some(max)) => json!(format!("{min},{max}")),
            (0, None) => json!(format!("{min},")),
            (1, _) => json!([min, max]),
            (2, _) => json!({"min": min, "max": max}),
            (_, Some(max)) => json!(format!("{min}-{max}")),
            (_, None) => json!(format!("{min}+")),
        };
        ((min, max), descriptor)
    })
}

/// Strategy for descriptors that must always be rejected
pub fn malformed_descriptor_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-z]{1,8}".prop_map(Value::String),
        Just(json!(null)),
        Just(json!(true)),
        Just(json!(17)),
        Just(json!([1, 2, 3])),
        Just(json!([0, 10])),
        Just(json!({"max": 10})),
        Just(json!("20,10")),
        Just(json!("1;10")),
    ]
}

/// Strategy for base queries carrying arbitrary filters plus conflicting bounds
pub fn base_query_strategy() -> impl Strategy<Value = Value> {
    (
        "[a-z ]{0,16}",
        prop::option::of(1u64..10_000),
        prop::option::of(1u64..10_000),
        any::<bool>(),
    )
        .prop_map(|(keywords, min, max, nested)| {
            let mut query = json!({ "q_keywords": keywords });
            if let Some(min) = min {
                query["organization_num_employees_min"] = json!(min);
            }
            if let Some(max) = max {
                query["organization_num_employees_max"] = json!(max);
            }
            if nested {
                query["query"] = json!({ "num_employees_min": min, "industry": "software" });
            }
            query
        })
}
