//! Recursive structural unpacking: nested schemas from mappings,
//! sequences, single values, and already-coerced instances; containers
//! of nested schemas; and the mismatch cases.

use std::sync::Arc;
use valcast_engine::instantiate_named;
use valcast_schema::{FieldDef, Schema, TypeDecl};
use valcast_value::{Record, Value};

fn point_schema() -> Arc<Schema> {
    Schema::builder("Point")
        .field(FieldDef::new("x", TypeDecl::Int))
        .field(FieldDef::new("y", TypeDecl::Int))
        .build()
}

fn segment_schema(point: &Arc<Schema>) -> Arc<Schema> {
    Schema::builder("Segment")
        .field(FieldDef::new("start", TypeDecl::schema(point)))
        .field(FieldDef::new("end", TypeDecl::schema(point)))
        .build()
}

fn point_record(x: i64, y: i64) -> Value {
    let mut record = Record::for_schema("Point");
    record.insert("x", Value::Int(x));
    record.insert("y", Value::Int(y));
    Value::Record(record)
}

#[test]
fn test_mapping_unpacks_as_keywords() -> anyhow::Result<()> {
    let point = point_schema();
    let segment = segment_schema(&point);

    let keywords: Record = [
        (
            "start",
            Value::Map(vec![
                (Value::Str("x".into()), Value::Str("1".into())),
                (Value::Str("y".into()), Value::Int(2)),
            ]),
        ),
        (
            "end",
            Value::Map(vec![
                (Value::Str("x".into()), Value::Int(3)),
                (Value::Str("y".into()), Value::Int(4)),
            ]),
        ),
    ]
    .into_iter()
    .collect();

    let instance = instantiate_named(&segment, keywords)?;
    assert_eq!(instance.get("start"), Some(&point_record(1, 2)));
    assert_eq!(instance.get("end"), Some(&point_record(3, 4)));
    Ok(())
}

#[test]
fn test_sequence_unpacks_positionally() -> anyhow::Result<()> {
    let point = point_schema();
    let segment = segment_schema(&point);

    let keywords: Record = [
        ("start", Value::List(vec![Value::Int(1), Value::Int(2)])),
        (
            "end",
            Value::List(vec![Value::Str("3".into()), Value::Str("4".into())]),
        ),
    ]
    .into_iter()
    .collect();

    let instance = instantiate_named(&segment, keywords)?;
    assert_eq!(instance.get("start"), Some(&point_record(1, 2)));
    assert_eq!(instance.get("end"), Some(&point_record(3, 4)));
    Ok(())
}

#[test]
fn test_tagged_record_passes_through_unchanged() -> anyhow::Result<()> {
    let point = point_schema();
    let segment = segment_schema(&point);

    let keywords: Record = [
        ("start", point_record(1, 2)),
        ("end", Value::List(vec![Value::Int(3), Value::Int(4)])),
    ]
    .into_iter()
    .collect();

    let instance = instantiate_named(&segment, keywords)?;
    assert_eq!(instance.get("start"), Some(&point_record(1, 2)));
    Ok(())
}

#[test]
fn test_scalar_unpacks_as_single_positional() -> anyhow::Result<()> {
    let wrapper = Schema::builder("Wrapper")
        .field(FieldDef::new("value", TypeDecl::Int))
        .build();
    let outer = Schema::builder("Holder")
        .field(FieldDef::new("inner", TypeDecl::schema(&wrapper)))
        .build();

    let keywords: Record = [("inner", Value::Int(5))].into_iter().collect();
    let instance = instantiate_named(&outer, keywords)?;

    let Some(Value::Record(inner)) = instance.get("inner") else {
        panic!("expected a nested record");
    };
    assert_eq!(inner.get("value"), Some(&Value::Int(5)));
    Ok(())
}

#[test]
fn test_scalar_mismatch_reports_structural_error() {
    let point = point_schema();
    let segment = segment_schema(&point);

    // A lone int cannot fill a two-field schema.
    let keywords: Record = [
        ("start", Value::Int(1)),
        ("end", Value::List(vec![Value::Int(3), Value::Int(4)])),
    ]
    .into_iter()
    .collect();

    let err = instantiate_named(&segment, keywords).unwrap_err();
    assert!(matches!(
        err,
        valcast_engine::Error::StructuralMismatch { .. }
    ));
}

#[test]
fn test_mapping_with_non_string_key_is_structural_mismatch() {
    let point = point_schema();
    let segment = segment_schema(&point);

    let keywords: Record = [
        ("start", Value::Map(vec![(Value::Int(1), Value::Int(2))])),
        ("end", Value::List(vec![Value::Int(3), Value::Int(4)])),
    ]
    .into_iter()
    .collect();

    let err = instantiate_named(&segment, keywords).unwrap_err();
    match err {
        valcast_engine::Error::StructuralMismatch { field, .. } => assert_eq!(field, "start"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_list_of_nested_schemas() -> anyhow::Result<()> {
    let point = point_schema();
    let path = Schema::builder("Path")
        .field(FieldDef::new(
            "points",
            TypeDecl::list(TypeDecl::schema(&point)),
        ))
        .build();

    let keywords: Record = [(
        "points",
        Value::List(vec![
            Value::List(vec![Value::Int(0), Value::Int(0)]),
            Value::Map(vec![
                (Value::Str("x".into()), Value::Int(1)),
                (Value::Str("y".into()), Value::Int(1)),
            ]),
        ]),
    )]
    .into_iter()
    .collect();

    let instance = instantiate_named(&path, keywords)?;
    assert_eq!(
        instance.get("points"),
        Some(&Value::List(vec![point_record(0, 0), point_record(1, 1)]))
    );
    Ok(())
}

#[test]
fn test_map_of_nested_schema_values() -> anyhow::Result<()> {
    let point = point_schema();
    let atlas = Schema::builder("Atlas")
        .field(FieldDef::new(
            "named",
            TypeDecl::map(TypeDecl::Str, TypeDecl::schema(&point)),
        ))
        .build();

    let keywords: Record = [(
        "named",
        Value::Map(vec![(
            Value::Str("origin".into()),
            Value::List(vec![Value::Int(0), Value::Int(0)]),
        )]),
    )]
    .into_iter()
    .collect();

    let instance = instantiate_named(&atlas, keywords)?;
    assert_eq!(
        instance.get("named"),
        Some(&Value::Map(vec![(
            Value::Str("origin".into()),
            point_record(0, 0)
        )]))
    );
    Ok(())
}

#[test]
fn test_nested_failure_propagates() {
    let point = point_schema();
    let segment = segment_schema(&point);

    // Inner "x" cannot coerce; the whole call must fail.
    let keywords: Record = [
        (
            "start",
            Value::List(vec![Value::Str("not a number".into()), Value::Int(2)]),
        ),
        ("end", Value::List(vec![Value::Int(3), Value::Int(4)])),
    ]
    .into_iter()
    .collect();

    assert!(instantiate_named(&segment, keywords).is_err());
}
