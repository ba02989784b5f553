//! Chart history replay and persistence

mod common;

use askdata::{
    parser, ChartId, ChartSpecStore, ChartStep, ErrorKind, Plan, QueryStep, Session, Value,
};
use common::{churn, churn_session};

fn chart_top_three(session: &mut Session) -> ChartId {
    let plan = Plan::new(vec![
        QueryStep::new()
            .with_order_by(askdata::OrderBy::desc("revenue"))
            .with_limit(3)
            .into(),
        ChartStep::bar(0, "customer", "revenue").into(),
    ]);
    let results = session.execute(&plan);
    results[1].chart().map(|(id, _)| id).unwrap()
}

#[test]
fn test_replay_survives_dataset_reload() {
    let mut session = churn_session();
    let id = chart_top_three(&mut session);
    let before = session.replay(id).unwrap().clone();

    let (_, dataset) = churn();
    let shrunk = askdata::Dataset::new(dataset.fields().to_vec(), dataset.rows()[4..].to_vec())
        .unwrap();
    session.replace_dataset(shrunk).unwrap();

    let after = session.replay(id).unwrap();
    assert_eq!(after, &before);
    assert_eq!(
        after.rendered_rows.rows()[0],
        vec![Value::from("Globex"), 520000.0.into()]
    );

    // a fresh chart sees the new data
    let newer = chart_top_three(&mut session);
    assert_eq!(newer, ChartId(1));
    assert_eq!(
        session.replay(newer).unwrap().rendered_rows.rows()[0],
        vec![Value::from("Wayne"), 300000.0.into()]
    );
}

#[test]
fn test_replay_unknown_id() {
    let session = churn_session();
    let err = session.replay(ChartId(7)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_history_in_append_order() {
    let mut session = churn_session();
    chart_top_three(&mut session);
    session.try_shortcut("churn against segment").unwrap().unwrap();
    chart_top_three(&mut session);

    let history: Vec<_> = session
        .charts()
        .history()
        .map(|(id, spec)| (id.0, spec.y_column.clone()))
        .collect();
    assert_eq!(
        history,
        vec![
            (0, "revenue".to_string()),
            (1, "churn_prob".to_string()),
            (2, "revenue".to_string()),
        ]
    );
}

#[test]
fn test_history_restored_from_file() {
    let mut session = churn_session();
    chart_top_three(&mut session);
    session.try_shortcut("revenue vs segment").unwrap().unwrap();
    let history = session.close();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("charts.json");
    std::fs::write(&path, history.to_json().unwrap()).unwrap();

    let restored = ChartSpecStore::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(restored.len(), 2);
    for (id, spec) in history.history() {
        assert_eq!(restored.get(id).unwrap(), spec);
    }

    // ids keep counting from the restored history
    let (schema, dataset) = churn();
    let mut session = Session::new(schema, dataset).unwrap().with_history(restored);
    assert_eq!(chart_top_three(&mut session), ChartId(2));
}

#[test]
fn test_schema_rejected_at_load() {
    let yaml = "columns:\n\
        \x20 - {name: revenue, type: numeric, aliases: [sales]}\n\
        \x20 - {name: bookings, type: numeric, aliases: [Sales]}\n";
    let err = parser::parse_schema_str(yaml).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SchemaInvalid);
}
