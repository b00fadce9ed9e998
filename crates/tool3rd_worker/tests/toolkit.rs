mod common;

use pretty_assertions::assert_eq;
use tool3rd_worker::{diff_models, BuiltinToolkit, ChangeKind, DiffError, DomainModel, Toolkit};

use common::{asn1_next_resource, asn1_resource, tabular_resource};

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

#[test]
fn asn1_sheet_lists_fields_without_expansion() {
    let model = DomainModel::from_serialized(&asn1_resource()).unwrap();
    let sheet = BuiltinToolkit
        .sheet_rows(&model, "NR-RRC-Definitions.RRCSetup", false)
        .unwrap();

    assert_eq!(sheet.title, "RRCSetup");
    assert_eq!(
        sheet.rows,
        vec![
            row(&["RRCSetup"]),
            row(&["criticalExtensions", "RRCSetup-IEs"]),
            row(&["type", "SEQUENCE"]),
        ]
    );
}

#[test]
fn expansion_inlines_referenced_types_one_level_deeper() {
    let model = DomainModel::from_serialized(&asn1_resource()).unwrap();
    let sheet = BuiltinToolkit
        .sheet_rows(&model, "NR-RRC-Definitions.RRCSetup", true)
        .unwrap();

    assert_eq!(
        sheet.rows,
        vec![
            row(&["RRCSetup"]),
            row(&["criticalExtensions", "RRCSetup-IEs"]),
            row(&["", "radioBearerConfig", "INTEGER"]),
            row(&["", "type", "SEQUENCE"]),
            row(&["type", "SEQUENCE"]),
        ]
    );
}

#[test]
fn value_assignments_and_unknown_keys_have_no_sheet() {
    let model = DomainModel::from_serialized(&asn1_resource()).unwrap();
    assert!(BuiltinToolkit
        .sheet_rows(&model, "NR-RRC-Definitions.maxDRB", false)
        .is_none());
    assert!(BuiltinToolkit.sheet_rows(&model, "RRCSetup", false).is_none());
    assert!(BuiltinToolkit
        .sheet_rows(&model, "Other-Module.RRCSetup", false)
        .is_none());
}

#[test]
fn tabular_sheet_starts_with_section_and_name() {
    let model = DomainModel::from_serialized(&tabular_resource()).unwrap();
    let sheet = BuiltinToolkit.sheet_rows(&model, "9.3.1.1", true).unwrap();
    assert_eq!(sheet.title, "Message Type");
    assert_eq!(
        sheet.rows,
        vec![row(&["9.3.1.1", "Message Type"]), row(&["presence", "M"])]
    );
}

#[test]
fn diff_classifies_assignment_changes() {
    let DomainModel::Asn1(old) = DomainModel::from_serialized(&asn1_resource()).unwrap() else {
        panic!("expected asn1");
    };
    let DomainModel::Asn1(new) = DomainModel::from_serialized(&asn1_next_resource()).unwrap() else {
        panic!("expected asn1");
    };

    let changes: Vec<_> = diff_models(&old, &new)
        .unwrap()
        .into_iter()
        .map(|change| (change.name, change.kind))
        .collect();
    assert_eq!(
        changes,
        vec![
            ("RRCRelease".to_string(), ChangeKind::Added),
            ("RRCSetup-IEs".to_string(), ChangeKind::Modified),
        ]
    );
}

#[test]
fn diff_report_rejects_tabular_resources() {
    let tabular = DomainModel::from_serialized(&tabular_resource()).unwrap();
    let asn1 = DomainModel::from_serialized(&asn1_resource()).unwrap();
    let err = BuiltinToolkit
        .diff_report("a", &tabular, "b", &asn1)
        .unwrap_err();
    assert!(matches!(err, DiffError::UnsupportedType));
}
