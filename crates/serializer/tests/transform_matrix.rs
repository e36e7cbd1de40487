//! Shape-by-shape coverage of the default converter set.

use std::collections::BTreeMap;

use capture_serializer::{
    CaptureValue, CapturedEntries, RawBytes, SafeValue, Serializer,
};
use indexmap::IndexMap;
use serde_json::json;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

#[test]
fn primitives_preserve_exact_values() {
    let serializer = Serializer::default();
    assert_eq!(serializer.transform(&true), SafeValue::Bool(true));
    assert_eq!(serializer.transform(&false), SafeValue::Bool(false));
    assert_eq!(serializer.transform(&42_i64), SafeValue::Integer(42));
    assert_eq!(serializer.transform(&-1_i8), SafeValue::Integer(-1));
    assert_eq!(serializer.transform(&7_u32), SafeValue::Integer(7));
    assert_eq!(serializer.transform(&2.5_f64), SafeValue::Float(2.5));
    assert_eq!(serializer.transform(&0.5_f32), SafeValue::Float(0.5));
    assert_eq!(serializer.transform(&()), SafeValue::Null);
}

#[test]
fn option_none_is_null_and_some_is_transparent() {
    let serializer = Serializer::default();
    assert_eq!(serializer.transform(&None::<i64>), SafeValue::Null);
    assert_eq!(serializer.transform(&Some(7_i64)), SafeValue::Integer(7));
    assert_eq!(
        serializer.transform(&Some("text".to_string())),
        SafeValue::Text("text".into())
    );
}

#[test]
fn oversized_unsigned_degrades_with_exact_digits() {
    let serializer = Serializer::default();
    assert_eq!(
        serializer.transform(&u64::MAX),
        SafeValue::Opaque("<u64: 18446744073709551615>".into())
    );
}

// ---------------------------------------------------------------------------
// Text and bytes
// ---------------------------------------------------------------------------

#[test]
fn text_is_normalized() {
    let serializer = Serializer::default();
    assert_eq!(
        serializer.transform(&"line\r\nnext".to_string()),
        SafeValue::Text("line\nnext".into())
    );
    assert_eq!(serializer.transform(&"plain"), SafeValue::Text("plain".into()));
    assert_eq!(serializer.transform(&'x'), SafeValue::Text("x".into()));
}

#[test]
fn raw_bytes_decode_lossily() {
    let serializer = Serializer::default();
    assert_eq!(
        serializer.transform(&RawBytes(b"ok\xffend".to_vec())),
        SafeValue::Text("ok\u{fffd}end".into())
    );
}

#[test]
fn bare_byte_vec_reads_as_integer_sequence() {
    let serializer = Serializer::default();
    assert_eq!(
        serializer.transform(&vec![1_u8, 2]),
        SafeValue::Sequence(vec![SafeValue::Integer(1), SafeValue::Integer(2)])
    );
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

#[test]
fn uuid_converts_to_canonical_text() {
    let serializer = Serializer::default();
    let id = Uuid::parse_str("123e4567-e89b-12d3-a456-426614174000").unwrap();
    assert_eq!(
        serializer.transform(&id),
        SafeValue::Text("123e4567-e89b-12d3-a456-426614174000".into())
    );
}

// ---------------------------------------------------------------------------
// Sequences
// ---------------------------------------------------------------------------

#[test]
fn sequence_preserves_element_order() {
    let serializer = Serializer::default();
    assert_eq!(
        serializer.transform(&vec![3_i64, 1, 2]),
        SafeValue::Sequence(vec![
            SafeValue::Integer(3),
            SafeValue::Integer(1),
            SafeValue::Integer(2),
        ])
    );
}

#[test]
fn set_iterates_in_natural_order() {
    let serializer = Serializer::default();
    let set: std::collections::BTreeSet<i64> = [3, 1, 2].into_iter().collect();
    assert_eq!(
        serializer.transform(&set),
        SafeValue::Sequence(vec![
            SafeValue::Integer(1),
            SafeValue::Integer(2),
            SafeValue::Integer(3),
        ])
    );
}

#[test]
fn heterogeneous_sequence_with_mixed_mapping() {
    // transform([1, "a", {2.5: true}]) from the contract examples.
    let serializer = Serializer::default();
    let mut entries = CapturedEntries::new();
    entries.push(2.5_f64, true);
    let value: Vec<Box<dyn CaptureValue>> =
        vec![Box::new(1_i64), Box::new("a"), Box::new(entries)];
    assert_eq!(
        serializer.transform(&value),
        SafeValue::Sequence(vec![
            SafeValue::Integer(1),
            SafeValue::Text("a".into()),
            SafeValue::Mapping(vec![("2.5".into(), SafeValue::Bool(true))]),
        ])
    );
}

// ---------------------------------------------------------------------------
// Mappings
// ---------------------------------------------------------------------------

#[test]
fn mapping_preserves_insertion_order() {
    let serializer = Serializer::default();
    let mut map = IndexMap::new();
    map.insert("b".to_string(), 1_i64);
    map.insert("a".to_string(), 2_i64);
    assert_eq!(
        serializer.transform(&map),
        SafeValue::Mapping(vec![
            ("b".into(), SafeValue::Integer(1)),
            ("a".into(), SafeValue::Integer(2)),
        ])
    );
}

#[test]
fn mapping_keys_coerce_to_text() {
    let serializer = Serializer::default();
    let mut map = BTreeMap::new();
    map.insert(10_i64, "ten".to_string());
    map.insert(2_i64, "two".to_string());
    assert_eq!(
        serializer.transform(&map),
        SafeValue::Mapping(vec![
            ("2".into(), SafeValue::Text("two".into())),
            ("10".into(), SafeValue::Text("ten".into())),
        ])
    );
}

#[test]
fn duplicate_coerced_keys_stay_ordered_and_collapse_in_json() {
    let serializer = Serializer::default();
    let mut entries = CapturedEntries::new();
    entries.push("k", 1_i64);
    entries.push("k", 2_i64);
    let mapping = serializer.transform(&entries);
    assert_eq!(
        mapping,
        SafeValue::Mapping(vec![
            ("k".into(), SafeValue::Integer(1)),
            ("k".into(), SafeValue::Integer(2)),
        ])
    );
    assert_eq!(mapping.to_json(), json!({"k": 2}));
}

// ---------------------------------------------------------------------------
// Fallbacks and pass-through
// ---------------------------------------------------------------------------

struct Mystery;

impl CaptureValue for Mystery {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn type_label(&self) -> &'static str {
        "Mystery"
    }

    fn render_text(&self) -> String {
        "???".to_string()
    }
}

#[test]
fn unknown_type_falls_back_to_opaque() {
    let serializer = Serializer::default();
    assert_eq!(
        serializer.transform(&Mystery),
        SafeValue::Opaque("<Mystery: ???>".into())
    );
}

#[test]
fn safe_values_pass_through_unchanged() {
    let serializer = Serializer::default();
    let already_safe = SafeValue::Mapping(vec![
        ("k".into(), SafeValue::Sequence(vec![SafeValue::Null])),
        ("o".into(), SafeValue::Opaque("<kept>".into())),
    ]);
    assert_eq!(serializer.transform(&already_safe), already_safe);
    // Twice through the pipeline is still the identity.
    let once = serializer.transform(&already_safe);
    assert_eq!(serializer.transform(&once), once);
}

#[test]
fn nested_safe_value_inside_capture_passes_through() {
    let serializer = Serializer::default();
    let value: Vec<Box<dyn CaptureValue>> = vec![
        Box::new(SafeValue::Opaque("<verbatim>".into())),
        Box::new(1_i64),
    ];
    assert_eq!(
        serializer.transform(&value),
        SafeValue::Sequence(vec![
            SafeValue::Opaque("<verbatim>".into()),
            SafeValue::Integer(1),
        ])
    );
}
