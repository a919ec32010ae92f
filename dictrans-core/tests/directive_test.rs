use dictrans_core::errors::DirectiveError;
use dictrans_core::{ClassificationKind, DictAnnotation, DirectiveKind};
use proptest::prelude::*;

#[test]
fn dict_code_without_table_is_system_dict() {
    let d = DictAnnotation::dict("user_status")
        .extract("User", "status", ",")
        .unwrap();
    assert_eq!(
        d.kind,
        DirectiveKind::SystemDict {
            dict_code: "user_status".into()
        }
    );
    assert_eq!(d.source_field, "status");
    assert_eq!(d.target_field, "status");
    assert_eq!(d.delimiter, ",");
}

#[test]
fn table_wins_over_dict_code() {
    let mut annotation = DictAnnotation::table("sys_dept", "id", "dept_name");
    annotation.dict_code = "ignored".into();
    let d = annotation.extract("User", "dept_id", ",").unwrap();
    assert!(matches!(d.kind, DirectiveKind::TableDict { ref table, .. } if table == "sys_dept"));
}

#[test]
fn blank_code_column_defaults_to_field_name() {
    let d = DictAnnotation::table("sys_dept", "  ", "dept_name")
        .with_condition("deleted = 0")
        .extract("User", "dept_id", ",")
        .unwrap();
    assert_eq!(
        d.kind,
        DirectiveKind::TableDict {
            table: "sys_dept".into(),
            code_column: "dept_id".into(),
            name_column: "dept_name".into(),
            condition: Some("deleted = 0".into()),
        }
    );
}

#[test]
fn table_without_name_column_is_rejected() {
    let err = DictAnnotation::table("sys_dept", "id", "")
        .extract("User", "dept_id", ",")
        .unwrap_err();
    assert!(matches!(
        err,
        DirectiveError::MissingAttribute {
            attribute: "name_column",
            ..
        }
    ));
}

#[test]
fn columns_without_table_are_rejected() {
    let annotation = DictAnnotation {
        name_column: "dept_name".into(),
        ..Default::default()
    };
    let err = annotation.extract("User", "dept_id", ",").unwrap_err();
    assert!(matches!(
        err,
        DirectiveError::MissingAttribute {
            attribute: "table",
            ..
        }
    ));
}

#[test]
fn empty_annotation_is_unclassifiable() {
    let err = DictAnnotation::default()
        .extract("User", "x", ",")
        .unwrap_err();
    assert!(matches!(err, DirectiveError::Unclassifiable { .. }));
}

#[test]
fn ignore_original_targets_text_suffix_or_alias() {
    let d = DictAnnotation::dict("sex")
        .ignore_original()
        .extract("User", "sex", ",")
        .unwrap();
    assert_eq!(d.target_field, "sexText");
    assert!(d.writes_separate_field());

    let d = DictAnnotation::dict("sex")
        .ignore_original()
        .with_alias("sexLabel")
        .extract("User", "sex", ",")
        .unwrap();
    assert_eq!(d.target_field, "sexLabel");
}

#[test]
fn ignore_original_falls_back_to_the_camel_cased_name_column() {
    let d = DictAnnotation::table("sys_dept", "id", "dept_name")
        .ignore_original()
        .extract("User", "deptId", ",")
        .unwrap();
    assert_eq!(d.target_field, "deptName");

    let d = DictAnnotation::table("sys_dept", "id", "dept_name")
        .ignore_original()
        .with_alias("department")
        .extract("User", "deptId", ",")
        .unwrap();
    assert_eq!(d.target_field, "department");

    // Without ignore_original the source field is overwritten.
    let d = DictAnnotation::table("sys_dept", "id", "dept_name")
        .extract("User", "deptId", ",")
        .unwrap();
    assert_eq!(d.target_field, "deptId");
}

#[test]
fn explicit_empty_delimiter_is_rejected() {
    let err = DictAnnotation::dict("roles")
        .with_delimiter("")
        .extract("User", "roles", ",")
        .unwrap_err();
    assert!(matches!(err, DirectiveError::EmptyDelimiter { .. }));
}

#[test]
fn expression_is_lowest_priority() {
    let d = DictAnnotation::expression("#root.name")
        .extract("User", "display", ",")
        .unwrap();
    assert_eq!(d.classify("a,b"), ClassificationKind::Expression);

    let mut annotation = DictAnnotation::dict("sex");
    annotation.expression = "#root.name".into();
    let d = annotation.extract("User", "sex", ",").unwrap();
    assert!(matches!(d.kind, DirectiveKind::SystemDict { .. }));
}

proptest! {
    #[test]
    fn multi_iff_raw_contains_delimiter(raw in "[a-z0-9,|]{0,12}", pipe in any::<bool>()) {
        let delimiter = if pipe { "|" } else { "," };
        let d = DictAnnotation::dict("codes")
            .with_delimiter(delimiter)
            .extract("T", "codes", ",")
            .unwrap();
        let kind = d.classify(&raw);
        prop_assert_eq!(kind.is_multi(), raw.contains(delimiter));
    }

    #[test]
    fn every_valid_annotation_yields_exactly_one_kind(
        dict in "[a-z]{0,3}",
        table in "[a-z]{0,3}",
        name in "[a-z]{0,3}",
        expr in "[a-z]{0,3}",
    ) {
        let annotation = DictAnnotation {
            dict_code: dict.clone(),
            table: table.clone(),
            name_column: name.clone(),
            expression: expr.clone(),
            ..Default::default()
        };
        match annotation.extract("T", "f", ",") {
            Ok(d) => match d.kind {
                DirectiveKind::SystemDict { .. } => prop_assert!(!dict.is_empty() && table.is_empty()),
                DirectiveKind::TableDict { .. } => prop_assert!(!table.is_empty() && !name.is_empty()),
                DirectiveKind::Expression { .. } => {
                    prop_assert!(dict.is_empty() && table.is_empty() && !expr.is_empty())
                }
            },
            Err(_) => prop_assert!(
                (!table.is_empty() && name.is_empty())
                    || (dict.is_empty() && table.is_empty() && expr.is_empty())
            ),
        }
    }
}
