//! Integration tests for tmfi-registry against the workspace catalog.

use tmfi_registry::{Registry, SpecLoadError, ValueType};

/// Path to the catalog file relative to the workspace root
const CATALOG_PATH: &str = "catalogs/gst-core.json";

/// Get the absolute path to the catalog file
fn catalog_path() -> std::path::PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = std::path::Path::new(&manifest_dir).parent().unwrap().parent().unwrap();
    workspace_root.join(CATALOG_PATH)
}

#[test]
fn test_load_workspace_catalog() {
    let registry = Registry::load(catalog_path()).unwrap();

    assert_eq!(registry.len(), 14);
    assert_eq!(registry.all()[0].name, "Availability");

    let delay = registry.lookup("Delay tolerance").unwrap();
    assert_eq!(delay.value_type, Some(ValueType::Float));
    assert_eq!(delay.unit.as_deref(), Some("ms"));
}

#[test]
fn test_unit_inferred_from_examples() {
    let registry = Registry::load(catalog_path()).unwrap();
    let availability = registry.lookup("Availability").unwrap();
    assert_eq!(availability.unit.as_deref(), Some("percent"));
}

#[test]
fn test_untyped_entry_is_kept() {
    let registry = Registry::load(catalog_path()).unwrap();
    let container = registry.lookup("Slice quality of service parameters").unwrap();
    assert_eq!(container.value_type, None);
}

#[test]
fn test_key_characteristics_in_catalog_order() {
    let registry = Registry::load(catalog_path()).unwrap();
    let keys: Vec<&str> = registry
        .key_characteristics()
        .iter()
        .map(|s| s.name.as_str())
        .collect();

    assert_eq!(
        keys,
        vec![
            "Availability",
            "Delay tolerance",
            "Downlink throughput per network slice: Maximum downlink throughput",
            "Uplink throughput per network slice: Maximum uplink throughput",
            "Area of service",
            "User management openness",
            "Energy efficiency",
        ]
    );
}

#[test]
fn test_missing_file_is_io_error() {
    let err = Registry::load("does/not/exist.json").unwrap_err();
    assert!(matches!(err, SpecLoadError::Io { .. }));
}
