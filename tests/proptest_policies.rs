//! Property-based tests for policy resolution.
//!
//! Uses proptest to generate random declaration sequences and attribute maps,
//! verifying the structural invariants of the registry: never panic on
//! arbitrary input, last-match-wins ordering, and the heap-percentage
//! threshold rule.
//!
//! Run with: `cargo test --test proptest_policies`

use proptest::prelude::*;
use serde_json::{json, Value};

use eviction_engine::{
    EvictionConfig, PolicyDeclaration, PolicyRegistry, RegionPlan, RegionShortcut, SizerRegistry,
};

// =============================================================================
// Strategies for generating test data
// =============================================================================

fn algorithm_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("ENTRY_COUNT".to_string()),
        Just("ENTRY_SIZE".to_string()),
        Just("HEAP_PERCENTAGE".to_string()),
    ]
}

fn action_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("EVICT".to_string()),
        Just("OVERFLOW_TO_DISK".to_string()),
    ]
}

fn region_name_strategy() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{1,8}"
}

/// Generate a structurally valid declaration
fn valid_declaration_strategy() -> impl Strategy<Value = PolicyDeclaration> {
    (
        algorithm_strategy(),
        prop::option::of(1u32..100_000),
        action_strategy(),
        prop::collection::vec(region_name_strategy(), 0..3),
    )
        .prop_map(|(algorithm, maximum, action, region_names)| {
            PolicyDeclaration::from_value(json!({
                "type": algorithm,
                "maximum": maximum,
                "action": action,
                "regionNames": region_names,
            }))
            .unwrap()
        })
}

/// Generate arbitrary JSON values (including shapes no declaration has)
fn arbitrary_json_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        ".*".prop_map(Value::String),
    ];

    leaf.prop_recursive(3, 32, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
            prop::collection::hash_map(".*", inner, 0..8)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

// =============================================================================
// Parsing Fuzz Tests
// =============================================================================

proptest! {
    /// Declaration parsing should never panic on arbitrary JSON
    #[test]
    fn fuzz_declaration_from_arbitrary_json(json in arbitrary_json_strategy()) {
        // Either parses (if the shape happens to fit) or fails cleanly
        let _ = PolicyDeclaration::from_value(json);
    }

    /// Registry construction from valid declarations never fails
    #[test]
    fn prop_valid_declarations_always_build(
        declarations in prop::collection::vec(valid_declaration_strategy(), 0..10),
    ) {
        let registry = PolicyRegistry::from_declarations(&declarations, &SizerRegistry::new());
        prop_assert!(registry.is_ok());
    }

    /// An unknown algorithm string always aborts construction
    #[test]
    fn prop_unknown_algorithm_always_fails(name in "[a-z]{1,12}") {
        // Lowercase names never collide with the SCREAMING_SNAKE spellings
        let declaration = PolicyDeclaration::from_value(json!({"type": name})).unwrap();
        let result = PolicyRegistry::from_declarations(
            std::slice::from_ref(&declaration),
            &SizerRegistry::new(),
        );
        prop_assert!(result.is_err());
    }
}

// =============================================================================
// Resolution Invariant Tests
// =============================================================================

proptest! {
    /// For any declaration sequence, the last declaration matching a target
    /// decides that target's attribute bundle
    #[test]
    fn prop_last_matching_declaration_wins(
        declarations in prop::collection::vec(valid_declaration_strategy(), 1..10),
        name in region_name_strategy(),
    ) {
        let registry = PolicyRegistry::from_declarations(&declarations, &SizerRegistry::new())
            .unwrap();

        let mut plan = RegionPlan::new(name.clone(), RegionShortcut::Partition);
        registry.apply_to_plan(&mut plan);

        let last_match = declarations.iter().rev().find(|d| {
            d.region_names.is_empty() || d.region_names.contains(&name)
        });

        match last_match {
            Some(declaration) => {
                let resolved = plan.eviction().expect("a matching policy must set the bundle");
                let expected_algorithm: eviction_engine::EvictionAlgorithm =
                    declaration.r#type.parse().unwrap();
                prop_assert_eq!(resolved.algorithm, expected_algorithm);

                let expected_maximum = match expected_algorithm {
                    eviction_engine::EvictionAlgorithm::HeapPercentage => None,
                    algorithm => declaration.maximum.or(algorithm.native_default_maximum()),
                };
                prop_assert_eq!(resolved.maximum, expected_maximum);
            }
            None => prop_assert!(plan.eviction().is_none(), "no match must leave the plan untouched"),
        }
    }

    /// HEAP_PERCENTAGE always resolves to an unspecified threshold
    #[test]
    fn prop_heap_percentage_never_has_maximum(
        maximum in prop::option::of(1u32..100_000),
        action in action_strategy(),
    ) {
        let declaration = PolicyDeclaration::from_value(json!({
            "type": "HEAP_PERCENTAGE",
            "maximum": maximum,
            "action": action,
        }))
        .unwrap();
        let registry = PolicyRegistry::from_declarations(
            std::slice::from_ref(&declaration),
            &SizerRegistry::new(),
        )
        .unwrap();

        let mut plan = RegionPlan::new("Any", RegionShortcut::Partition);
        registry.apply_to_plan(&mut plan);

        prop_assert_eq!(plan.eviction().unwrap().maximum, None);
    }

    /// Plan application is idempotent: a second fold yields the same bundle
    #[test]
    fn prop_plan_application_idempotent(
        declarations in prop::collection::vec(valid_declaration_strategy(), 0..10),
        name in region_name_strategy(),
    ) {
        let registry = PolicyRegistry::from_declarations(&declarations, &SizerRegistry::new())
            .unwrap();

        let mut once = RegionPlan::new(name.clone(), RegionShortcut::Partition);
        registry.apply_to_plan(&mut once);

        let mut twice = RegionPlan::new(name, RegionShortcut::Partition);
        registry.apply_to_plan(&mut twice);
        registry.apply_to_plan(&mut twice);

        prop_assert_eq!(once.eviction(), twice.eviction());
    }

    /// Empty declaration sequences behave exactly like the default policy
    #[test]
    fn prop_empty_sequence_equals_defaults(name in region_name_strategy()) {
        let config = EvictionConfig::default();
        let registry = PolicyRegistry::from_config(&config, &SizerRegistry::new()).unwrap();

        let mut plan = RegionPlan::new(name, RegionShortcut::Partition);
        registry.apply_to_plan(&mut plan);

        prop_assert_eq!(
            plan.eviction(),
            Some(eviction_engine::EvictionAttributes::entry_count_lru())
        );
    }
}
