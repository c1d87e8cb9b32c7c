//! Environment-backed construction tests
//!
//! Each test uses its own variable prefix so tests stay independent
//! under the parallel test runner.

use std::sync::Arc;
use valcast_config::{EnvLoader, config_schema, from_env};
use valcast_schema::{FieldDef, Schema, TypeDecl};
use valcast_value::Value;

fn set(variable: &str, value: &str) {
    // SAFETY: each test writes only its own uniquely-prefixed variables.
    unsafe { std::env::set_var(variable, value) };
}

fn unset(variable: &str) {
    // SAFETY: see `set`.
    unsafe { std::env::remove_var(variable) };
}

fn db_schema(name: &str) -> Arc<Schema> {
    config_schema(name)
        .field(FieldDef::new("host", TypeDecl::Str).default(Value::Str("localhost".into())))
        .field(FieldDef::new("port", TypeDecl::Int).default(Value::Int(5432)))
        .field(FieldDef::new("debug", TypeDecl::Bool).default(Value::Bool(false)))
        .field(FieldDef::new("build_id", TypeDecl::Str).ignore_env().default(Value::Str("dev".into())))
        .build()
}

#[test]
fn test_environment_values_are_coerced() -> anyhow::Result<()> {
    set("CFGA_HOST", "db.example");
    set("CFGA_PORT", "6432");
    set("CFGA_DEBUG", "yes");

    let schema = db_schema("CfgA");
    let instance = from_env(&schema, "cfga")?;

    assert_eq!(instance.get("host"), Some(&Value::Str("db.example".into())));
    assert_eq!(instance.get("port"), Some(&Value::Int(6432)));
    assert_eq!(instance.get("debug"), Some(&Value::Bool(true)));

    unset("CFGA_HOST");
    unset("CFGA_PORT");
    unset("CFGA_DEBUG");
    Ok(())
}

#[test]
fn test_missing_entries_fall_back_to_defaults() -> anyhow::Result<()> {
    set("CFGB_PORT", "9999");

    let schema = db_schema("CfgB");
    let instance = from_env(&schema, "cfgb")?;

    assert_eq!(instance.get("host"), Some(&Value::Str("localhost".into())));
    assert_eq!(instance.get("port"), Some(&Value::Int(9999)));
    assert_eq!(instance.get("debug"), Some(&Value::Bool(false)));

    unset("CFGB_PORT");
    Ok(())
}

#[test]
fn test_ignore_env_field_never_reads_environment() -> anyhow::Result<()> {
    set("CFGC_BUILD_ID", "from-env");

    let schema = db_schema("CfgC");
    let instance = from_env(&schema, "cfgc")?;
    assert_eq!(instance.get("build_id"), Some(&Value::Str("dev".into())));

    unset("CFGC_BUILD_ID");
    Ok(())
}

#[test]
fn test_lenient_bool_accepts_config_tokens() -> anyhow::Result<()> {
    let schema = db_schema("CfgD");

    for (token, expected) in [("y", true), ("TRUE", true), ("1", true), ("off", false)] {
        set("CFGD_DEBUG", token);
        let instance = from_env(&schema, "cfgd")?;
        assert_eq!(instance.get("debug"), Some(&Value::Bool(expected)), "{token}");
    }

    unset("CFGD_DEBUG");
    Ok(())
}

#[test]
fn test_bad_entry_fails_coercion() {
    set("CFGE_PORT", "not-a-port");

    let schema = db_schema("CfgE");
    let err = from_env(&schema, "cfge").unwrap_err();
    assert!(matches!(
        err,
        valcast_config::Error::Engine(valcast_engine::Error::Conversion { .. })
    ));

    unset("CFGE_PORT");
}

#[test]
fn test_loader_instantiates_registered_schemas_by_name() -> anyhow::Result<()> {
    set("CFGF_HOST", "registry.example");

    let loader = EnvLoader::new("cfgf");
    loader.register(db_schema("CfgF"));

    let instance = loader.load("CfgF")?;
    assert_eq!(
        instance.get("host"),
        Some(&Value::Str("registry.example".into()))
    );

    assert!(matches!(
        loader.load("Missing"),
        Err(valcast_config::Error::UnknownSchema { .. })
    ));

    unset("CFGF_HOST");
    Ok(())
}
