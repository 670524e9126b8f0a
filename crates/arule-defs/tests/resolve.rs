use arule_core::AruleLayout;
use arule_defs::*;
use std::path::PathBuf;

fn fresh_store(name: &str) -> (PathBuf, DefinitionStore) {
    let root = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&root);
    let layout = AruleLayout::new(&root);
    layout.ensure_dirs().unwrap();
    (root, DefinitionStore::new(layout))
}

fn node(power: f64, stem: &str) -> NodeDefinition {
    NodeDefinition {
        feature_dc: 24.0,
        nominal_fd0: 0.0,
        noise_margin_pct: 5.0,
        avg_points_fdc: 10,
        avg_points_fd: 5,
        degradation_power: power,
        functional_failure_margin_pct: 70.0,
        default_ttff: 220.0,
        failure_model: FailureModel::Linear,
        input_file_stem: stem.to_string(),
        input_file_type: FileType::Txt,
        output_file_type: FileType::Csv,
        terminator: DEFAULT_TERMINATOR,
    }
}

#[test]
fn resolve_keeps_declared_order() {
    let (root, store) = fresh_store("arule_defs_resolve_order");

    store.write_node("A", &node(1.1, "IN_A")).unwrap();
    store.write_node("B", &node(1.2, "IN_B")).unwrap();
    store.write_node("C", &node(1.3, "IN_C")).unwrap();
    store
        .write_system(&SystemDefinition::new(
            "ORDER",
            vec![NodeRef::new(3, "C"), NodeRef::new(1, "A"), NodeRef::new(2, "B")],
        ))
        .unwrap();

    let records = resolve(&store, "ORDER").unwrap();
    let identity: Vec<(u32, &str)> = records.iter().map(|r| (r.id(), r.name())).collect();
    assert_eq!(identity, vec![(3, "C"), (1, "A"), (2, "B")]);
    assert_eq!(records[0].definition().degradation_power, 1.3);
    assert_eq!(records[1].definition().input_file_stem, "IN_A");

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn missing_node_definition_is_not_found() {
    let (root, store) = fresh_store("arule_defs_resolve_missing_node");

    store.write_node("A", &node(1.1, "IN_A")).unwrap();
    store
        .write_system(&SystemDefinition::new(
            "BROKEN",
            vec![NodeRef::new(1, "A"), NodeRef::new(2, "GHOST")],
        ))
        .unwrap();

    let err = resolve(&store, "BROKEN").unwrap_err();
    match err {
        DefsError::DefinitionNotFound { path } => {
            assert_eq!(path, store.node_path("GHOST"));
        }
        other => panic!("expected DefinitionNotFound, got {other:?}"),
    }

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn missing_system_definition_is_not_found() {
    let (root, store) = fresh_store("arule_defs_resolve_missing_system");

    let err = resolve(&store, "NOPE").unwrap_err();
    assert!(matches!(err, DefsError::DefinitionNotFound { .. }));

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn malformed_node_definition_names_path_and_key() {
    let (root, store) = fresh_store("arule_defs_resolve_malformed");

    let text: String = node(1.1, "IN_A")
        .encode("A")
        .lines()
        .filter(|line| !line.starts_with("FDNV"))
        .map(|line| format!("{line}\n"))
        .collect();
    std::fs::write(store.node_path("A"), text).unwrap();
    store
        .write_system(&SystemDefinition::new("SYS", vec![NodeRef::new(1, "A")]))
        .unwrap();

    let err = resolve(&store, "SYS").unwrap_err();
    match &err {
        DefsError::MalformedDefinition { path, source } => {
            assert_eq!(path, &store.node_path("A"));
            assert_eq!(source, &DecodeError::MissingKey { key: "FDNV" });
        }
        other => panic!("expected MalformedDefinition, got {other:?}"),
    }
    assert!(err.to_string().contains("FDNV"));

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn write_rejects_invalid_node_before_touching_disk() {
    let (root, store) = fresh_store("arule_defs_write_invalid");

    let mut bad = node(1.1, "IN_A");
    bad.avg_points_fdc = 40;
    let err = store.write_node("A", &bad).unwrap_err();
    assert!(matches!(err, DefsError::Validation(_)));
    assert!(!store.node_path("A").exists());

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn list_systems_returns_sorted_stems() {
    let (root, store) = fresh_store("arule_defs_list_systems");

    store.write_node("A", &node(1.1, "IN_A")).unwrap();
    for name in ["DEMO2", "DEMO1"] {
        store
            .write_system(&SystemDefinition::new(name, vec![NodeRef::new(1, "A")]))
            .unwrap();
    }

    assert_eq!(store.list_systems().unwrap(), vec!["DEMO1", "DEMO2"]);

    let _ = std::fs::remove_dir_all(&root);
}
