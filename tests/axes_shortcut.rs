//! "A against B" requests over the churn fixture

mod common;

use askdata::{AxesShortcut, ChartKind, SchemaResolver, Value};
use common::{churn, churn_session, text_column};

#[test]
fn test_unique_categories_pair_rows() {
    let mut session = churn_session();
    let chart = session
        .try_shortcut("Plot ARR against client please")
        .unwrap()
        .unwrap();

    assert_eq!(chart.shortcut.x, "customer");
    assert_eq!(chart.shortcut.y, "revenue");
    assert_eq!(chart.spec.kind, ChartKind::Bar);
    assert_eq!(chart.spec.display_title(), "revenue by customer");
    assert_eq!(chart.spec.rendered_rows.len(), 8);
    assert_eq!(
        chart.spec.rendered_rows.rows()[0],
        vec![Value::from("Acme"), 460000.0.into()]
    );
}

#[test]
fn test_repeated_categories_average() {
    let mut session = churn_session();
    let chart = session.try_shortcut("churn risk vs company size").unwrap().unwrap();

    let rows = &chart.spec.rendered_rows;
    assert_eq!(rows.column_names(), vec!["segment", "churn_prob"]);
    assert_eq!(text_column(rows, "segment"), vec!["Enterprise", "SMB", "Mid-Market"]);
    let Value::Number(smb) = rows.rows()[1][1] else {
        panic!("expected a number, got {:?}", rows.rows()[1][1]);
    };
    assert!((smb - 0.6).abs() < 1e-9);
}

#[test]
fn test_unresolved_side_falls_through() {
    let mut session = churn_session();
    assert!(session.try_shortcut("profit against segment").is_none());
    assert!(session.try_shortcut("revenue against revenu").is_none());
    assert!(session.try_shortcut("revenue by segment").is_none());
    assert!(session.charts().is_empty());
}

#[test]
fn test_same_column_both_sides() {
    let (schema, _) = churn();
    let resolver = SchemaResolver::new(&schema);
    assert_eq!(AxesShortcut::try_parse("rev against sales", &resolver), None);
}

#[test]
fn test_boolean_category_pairs_rows() {
    let (_, dataset) = churn();
    let shortcut = AxesShortcut {
        x: "active".to_string(),
        y: "revenue".to_string(),
    };
    // only categorical columns are grouped
    assert!(!shortcut.has_repeated_categories(&dataset));
}
