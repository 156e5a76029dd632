use proptest::prelude::*;

/// Item counts around the common batch limits
pub fn item_count_strategy() -> impl Strategy<Value = usize> {
    prop_oneof![0usize..10, 240usize..260, 490usize..760]
}

/// Batch limits used by the service's bulk endpoints, plus small values
pub fn batch_limit_strategy() -> impl Strategy<Value = usize> {
    prop_oneof![Just(50usize), Just(250usize), 1usize..20]
}

/// Per-batch outcomes: `true` succeeds, `false` fails
pub fn batch_outcomes_strategy() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(any::<bool>(), 0..30)
}

/// For each item: `None` (no target) or one of a few target ids, which may
/// collide with the item's assignee `"reviewer"`
pub fn resolution_strategy() -> impl Strategy<Value = Vec<Option<String>>> {
    prop::collection::vec(
        prop::option::of(prop_oneof![
            Just("m1".to_string()),
            Just("m2".to_string()),
            Just("m3".to_string()),
            Just("reviewer".to_string()),
        ]),
        0..60,
    )
}
