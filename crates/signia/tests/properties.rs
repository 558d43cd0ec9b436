//! End-to-end behavior of comparison, merging, and combination.

use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use serde_json::json;
use signia::{
    combine, merge_signatures, mirror_signature, same_signature, Annotation, Arguments, Callable,
    CombineOptions, CompareOptions, Function, Kind, MergeConfig, MergeError, MergeOptions,
    Parameter, Policy, Signature, SignatureError, SignatureSource, SigniaResult, Value,
};

fn sig(text: &str) -> Signature {
    text.parse().unwrap()
}

// ---------------------------------------------------------------------------
// Merging
// ---------------------------------------------------------------------------

#[test]
fn merging_one_signature_is_identity() {
    let f = sig("(a: int, /, b: str = \"x\", *rest: float, c: bool = false, **kw) -> list");
    let merged = merge_signatures(&[&f], &MergeOptions::default()).unwrap();
    assert!(same_signature(&merged, &f, &CompareOptions::strict()));
}

#[test]
fn tie_break_follows_policy_when_defaults_ignored() {
    let f = sig("(*, c=1)");
    let g = sig("(*, c=2)");

    let first = MergeOptions::default().compare_defaults(false);
    let merged = merge_signatures(&[&f, &g], &first).unwrap();
    assert_eq!(merged.get("c").unwrap().default.value(), Some(&json!(1)));

    let last = first.with_policy(Policy::PreferLast);
    let merged = merge_signatures(&[&f, &g], &last).unwrap();
    assert_eq!(merged.get("c").unwrap().default.value(), Some(&json!(2)));
}

#[test]
fn differing_defaults_conflict_by_default() {
    let f = sig("(*, c: int = 1)");
    let g = sig("(*, c: int = 2)");
    let err = merge_signatures(&[&f, &g], &MergeOptions::default()).unwrap_err();
    assert!(matches!(err, MergeError::Conflict { ref parameter, .. } if parameter == "c"));
    let message = err.to_string();
    assert!(message.contains('1') && message.contains('2'), "{message}");

    let tolerant = MergeOptions::default().compare_defaults(false);
    assert!(merge_signatures(&[&f, &g], &tolerant).is_ok());
}

#[test]
fn resolver_output_is_used_verbatim() {
    let f = sig("(*, c: int = 1)");
    let g = sig("(*, c: int = 2)");
    let chosen = Parameter::keyword_only("c")
        .with_default(99)
        .with_annotation("int");
    let expected = chosen.clone();
    let options = MergeOptions::default().with_resolver(move |_, _, _, _| Ok(chosen.clone()));
    let merged = merge_signatures(&[&f, &g], &options).unwrap();
    assert_eq!(merged.get("c"), Some(&expected));
}

#[test]
fn differently_named_variadics_break_kind_order() {
    let f = sig("(a, *args)");
    let g = sig("(*rest)");
    let err = merge_signatures(&[&f, &g], &MergeOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        MergeError::Invariant(SignatureError::MultipleVariadic { kind: Kind::VarPositional, .. })
    ));
}

#[test]
fn merge_config_drives_merge() -> SigniaResult<()> {
    let config = MergeConfig::from_toml_str(
        r#"
        policy = "prefer-last"
        on_conflict = "prefer-defaulted"
        "#,
    )?;
    let f = sig("(*, c: int, d)");
    let g = sig("(*, c: int = 5)");
    let merged = merge_signatures(&[&f, &g], &config.into_options())?;
    assert_eq!(merged.to_string(), "(*, c: int = 5, d)");
    Ok(())
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

#[test]
fn strict_and_structural_comparison() {
    let f = sig("(a=1, b=2)");
    let g = sig("(a=2, b=1)");
    assert!(!same_signature(&f, &g, &CompareOptions::strict()));
    assert!(same_signature(&f, &g, &CompareOptions::structural()));
}

// ---------------------------------------------------------------------------
// Combination
// ---------------------------------------------------------------------------

#[test]
fn combinator_routes_and_returns_primary_result() -> SigniaResult<()> {
    let seen: Arc<Mutex<Vec<(String, Value)>>> = Arc::default();

    let log = Arc::clone(&seen);
    let primary = Function::new("primary", sig("(a, b=1)"), move |args| {
        log.lock().unwrap().push(("primary".into(), json!(args.arguments())));
        Ok(json!({"sum": args.value::<i64>("a")? + args.value::<i64>("b")?}))
    });
    let log = Arc::clone(&seen);
    let secondary = Function::new("secondary", sig("(*, verbose=false)"), move |args| {
        log.lock().unwrap().push(("secondary".into(), json!(args.arguments())));
        Ok(json!("discarded"))
    });

    let combined = combine(
        Arc::new(primary),
        vec![Arc::new(secondary)],
        &CombineOptions::default(),
    )?;
    assert_eq!(combined.signature().to_string(), "(a, b=1, *, verbose=false)");

    let result = combined.call(Arguments::new().arg(2).kwarg("verbose", true))?;
    assert_eq!(result, json!({"sum": 3}));

    let seen = seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![
            ("primary".to_string(), json!({"a": 2, "b": 1})),
            ("secondary".to_string(), json!({"verbose": true})),
        ]
    );
    Ok(())
}

#[test]
fn combined_signature_can_be_mirrored() {
    let primary = Function::new("run", sig("(task: str)"), |_| Ok(json!("ran")));
    let side = Function::new("notify", sig("(*, channel=\"ops\")"), |_| Ok(Value::Null));
    let combined = combine(
        Arc::new(primary),
        vec![Arc::new(side)],
        &CombineOptions::new().with_doc("Run and notify."),
    )
    .unwrap();

    let wrapper = Function::new("wrapper", Signature::empty(), |args| {
        Ok(json!(args.arguments()))
    });
    let wrapper = mirror_signature(&combined).apply(wrapper);
    assert_eq!(wrapper.name(), "run");
    assert_eq!(wrapper.descriptor().doc.as_deref(), Some("Run and notify."));
    assert_eq!(
        wrapper.call(Arguments::new().arg("build")).unwrap(),
        json!({"task": "build", "channel": "ops"})
    );
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn keyword_only_params() -> impl Strategy<Value = Vec<Parameter>> {
    prop::collection::btree_map("[a-z][a-z0-9_]{0,6}", (any::<i32>(), any::<bool>()), 0..6)
        .prop_map(|entries| {
            entries
                .into_iter()
                .map(|(name, (default, annotated))| {
                    let param = Parameter::keyword_only(name).with_default(default);
                    if annotated {
                        param.with_annotation("int")
                    } else {
                        param
                    }
                })
                .collect()
        })
}

proptest! {
    #[test]
    fn merge_is_idempotent(params in keyword_only_params()) {
        let f = Signature::new(params, Annotation::Empty).unwrap();
        let merged = merge_signatures(&[&f], &MergeOptions::default()).unwrap();
        prop_assert!(same_signature(&merged, &f, &CompareOptions::strict()));
    }

    #[test]
    fn merging_a_signature_with_itself_changes_nothing(params in keyword_only_params()) {
        let f = Signature::new(params, Annotation::Empty).unwrap();
        let merged = merge_signatures(&[&f, &f], &MergeOptions::default()).unwrap();
        prop_assert_eq!(merged, f);
    }
}
