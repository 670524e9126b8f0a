use arule_core::AruleLayout;
use arule_defs::{FailureModel, FileType, NodeDefinition, ResolvedNodeRecord};
use arule_output::*;

fn record(id: u32, stem: &str, output_file_type: FileType) -> ResolvedNodeRecord {
    ResolvedNodeRecord::new(
        id,
        "DEMO1_NODE1",
        NodeDefinition {
            feature_dc: 24.0,
            nominal_fd0: 0.0,
            noise_margin_pct: 5.0,
            avg_points_fdc: 10,
            avg_points_fd: 5,
            degradation_power: 1.275,
            functional_failure_margin_pct: 70.0,
            default_ttff: 220.0,
            failure_model: FailureModel::Linear,
            input_file_stem: stem.to_string(),
            input_file_type: FileType::Txt,
            output_file_type,
            terminator: -9,
        },
    )
}

#[test]
fn output_path_is_deterministic() {
    let layout = AruleLayout::new("/runs/demo");
    let path = compute_output_path(&layout, &record(2, "SP4000_1", FileType::Csv), "DEMO1");

    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        "ND_2_DW_DEMO1_SP4000_1_OUT.csv"
    );
    assert_eq!(path.parent().unwrap(), layout.output_dir());
}

#[test]
fn parse_reads_engine_file() {
    let root = std::env::temp_dir().join("arule_output_parse_file");
    let _ = std::fs::remove_dir_all(&root);
    let layout = AruleLayout::new(&root);
    layout.ensure_dirs().unwrap();

    let node = record(1, "SP4000_1", FileType::Csv);
    let path = compute_output_path(&layout, &node, "DEMO1");
    let mut csv = String::from("FLAG,DT,DA,RUL,PH,SOH,BD,EOL,FDNOM,FD,FFP,DPS,FFS,FFIN,RC0,RS0\n");
    for step in 0..5 {
        let t = step as f64;
        let (bd, eol) = if step == 4 { (2.0, 4.0) } else { (0.0, 0.0) };
        csv.push_str(&format!(
            "0,{t},{},{},{},{},{bd},{eol},24,{},0,0,0,0,0,0\n",
            1.0 + t,
            220.0 - t,
            200.0 - t,
            100.0 - 10.0 * t,
            24.0 + t
        ));
    }
    std::fs::write(&path, csv).unwrap();

    let output = parse(&path).unwrap();
    assert_eq!(output.len(), 5);
    assert_eq!(output.soh.last().copied(), Some(60.0));

    let markers = locate_degradation_markers(&output).unwrap();
    assert_eq!(markers.indices(), (2, 4));

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn absent_file_is_output_not_found() {
    let layout = AruleLayout::new(std::env::temp_dir().join("arule_output_absent"));
    let path = compute_output_path(&layout, &record(9, "NOPE", FileType::Txt), "GHOST");

    let err = parse(&path).unwrap_err();
    match err {
        OutputError::OutputNotFound { path: missing } => assert_eq!(missing, path),
        other => panic!("expected OutputNotFound, got {other:?}"),
    }
}

#[test]
fn malformed_file_carries_path_and_column() {
    let dir = std::env::temp_dir().join("arule_output_malformed");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("ND_1_DW_S_IN_OUT.csv");
    std::fs::write(&path, "FLAG,DT\n0,0\n").unwrap();

    let err = parse(&path).unwrap_err();
    assert!(matches!(
        &err,
        OutputError::MalformedOutput {
            source: FormatError::MissingColumn { column: "DA" },
            ..
        }
    ));
    assert!(err.to_string().contains("DA"));

    let _ = std::fs::remove_dir_all(&dir);
}
