//! Property tests for filtering, aggregation, relaxation, resolution and chart history

use std::collections::HashSet;

use askdata::config::{LiteralPolicy, RelaxationPolicy};
use askdata::filter::apply;
use askdata::relax::{relax, widen};
use askdata::{
    aggregate, AggregateFunction, AggregateSpec, ChartKind, ChartSpec, ChartSpecStore, ColumnDef,
    Dataset, Field, Operator, Predicate, Schema, SchemaResolver, SemanticType, Value,
};
use proptest::prelude::*;

const SEGMENTS: [&str; 3] = ["SMB", "Mid-Market", "Enterprise"];

fn fields() -> Vec<Field> {
    vec![
        Field::new("segment", SemanticType::Categorical),
        Field::new("region", SemanticType::Categorical),
        Field::new("revenue", SemanticType::Numeric),
    ]
}

fn arb_row() -> impl Strategy<Value = Vec<Value>> {
    (
        prop::sample::select(SEGMENTS.to_vec()),
        prop_oneof![Just(Value::from("EMEA")), Just(Value::from("APAC")), Just(Value::Null)],
        prop_oneof![
            4 => (0u32..1_000_000).prop_map(|n| Value::Number(f64::from(n))),
            1 => Just(Value::Null),
        ],
    )
        .prop_map(|(segment, region, revenue)| vec![Value::from(segment), region, revenue])
}

fn arb_dataset() -> impl Strategy<Value = Dataset> {
    prop::collection::vec(arb_row(), 0..24)
        .prop_map(|rows| Dataset::new(fields(), rows).expect("rows fit the fields"))
}

fn arb_predicate() -> impl Strategy<Value = Predicate> {
    prop_oneof![
        (
            prop::sample::select(vec![Operator::Gt, Operator::Ge, Operator::Lt, Operator::Le]),
            0u32..1_000_000
        )
            .prop_map(|(op, n)| Predicate::new("revenue", op, f64::from(n))),
        prop::sample::select(SEGMENTS.to_vec())
            .prop_map(|s| Predicate::new("segment", Operator::Eq, s)),
        Just(Predicate::new("region", Operator::Contains, "e")),
        Just(Predicate::new("segment", Operator::In, vec!["SMB", "Enterprise"])),
    ]
}

fn key(row: &[Value]) -> Vec<askdata::dataset::GroupKey> {
    row.iter().map(Value::group_key).collect()
}

proptest! {
    #[test]
    fn filter_with_no_predicates_is_identity(dataset in arb_dataset()) {
        prop_assert_eq!(apply(&dataset, &[]).unwrap(), dataset);
    }

    #[test]
    fn filter_is_idempotent(
        dataset in arb_dataset(),
        predicates in prop::collection::vec(arb_predicate(), 0..4),
    ) {
        let once = apply(&dataset, &predicates).unwrap();
        let twice = apply(&once, &predicates).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn scalar_aggregation_is_one_row(dataset in arb_dataset()) {
        let empty: [&str; 0] = [];
        let out = aggregate(
            &dataset,
            &empty,
            &[
                AggregateSpec::new("n", "revenue", AggregateFunction::Count),
                AggregateSpec::new("total", "revenue", AggregateFunction::Sum),
            ],
        )
        .unwrap();
        prop_assert_eq!(out.len(), 1);
    }

    #[test]
    fn grouped_aggregation_has_one_row_per_key(dataset in arb_dataset()) {
        let group_by = ["segment", "region"];
        let out = aggregate(
            &dataset,
            &group_by,
            &[AggregateSpec::new("avg", "revenue", AggregateFunction::Mean)],
        )
        .unwrap();

        let expected: HashSet<_> = dataset.rows().iter().map(|r| key(&r[..2])).collect();
        let produced: Vec<_> = out.rows().iter().map(|r| key(&r[..2])).collect();
        let unique: HashSet<_> = produced.iter().cloned().collect();

        prop_assert_eq!(produced.len(), expected.len());
        prop_assert_eq!(unique, expected);
        prop_assert_eq!(out.column_names(), vec!["segment", "region", "avg"]);
    }

    #[test]
    fn relaxation_is_bounded_and_widening(
        thresholds in prop::collection::vec(
            (prop::sample::select(vec![Operator::Gt, Operator::Ge, Operator::Lt, Operator::Le]),
             -1_000_000i32..1_000_000),
            1..4,
        ),
    ) {
        let predicates: Vec<Predicate> = thresholds
            .iter()
            .map(|(op, n)| Predicate::new("revenue", *op, f64::from(*n)))
            .collect();
        let eligible: Vec<usize> = (0..predicates.len()).collect();

        // never satisfied, so the full budget is spent
        let relaxed = relax(
            &predicates,
            &eligible,
            &RelaxationPolicy::default(),
            &LiteralPolicy::default(),
            |_| Ok::<_, ()>(((), false)),
        )
        .unwrap()
        .unwrap();

        prop_assert_eq!(relaxed.log.len(), 3);
        prop_assert!(!relaxed.satisfied);
        for entry in &relaxed.log {
            match entry.operator {
                Operator::Gt | Operator::Ge => {
                    prop_assert!(entry.relaxed_value < entry.original_value)
                }
                _ => prop_assert!(entry.relaxed_value > entry.original_value),
            }
        }
    }

    #[test]
    fn widen_moves_toward_inclusion(value in -1e9f64..1e9, fraction in 0.01f64..0.5) {
        prop_assert!(widen(value, Operator::Gt, fraction) < value);
        prop_assert!(widen(value, Operator::Le, fraction) > value);
    }

    #[test]
    fn resolution_ignores_case_and_padding(
        upper in prop::collection::vec(any::<bool>(), 7),
        left in 0usize..3,
        right in 0usize..3,
    ) {
        let schema = Schema::new(vec![
            ColumnDef::new("revenue", SemanticType::Numeric).with_aliases(["rev"]),
            ColumnDef::new("segment", SemanticType::Categorical),
        ])
        .unwrap();
        let resolver = SchemaResolver::new(&schema);

        let cased: String = "revenue"
            .chars()
            .zip(&upper)
            .map(|(c, up)| if *up { c.to_ascii_uppercase() } else { c })
            .collect();
        let padded = format!("{}{}{}", " ".repeat(left), cased, " ".repeat(right));

        prop_assert_eq!(resolver.resolve(&padded), Ok("revenue"));
        // the alias "rev" in the same casing
        let alias = format!("{}{}", " ".repeat(left), &cased[..3]);
        prop_assert_eq!(resolver.resolve(&alias), Ok("revenue"));
    }

    #[test]
    fn chart_ids_increase_and_replay_exactly(
        datasets in prop::collection::vec(arb_dataset(), 1..6),
    ) {
        let mut store = ChartSpecStore::new();
        let mut ids = Vec::new();
        for dataset in &datasets {
            let rendered_rows = dataset.project(&["segment", "revenue"]).unwrap();
            ids.push(store.append(ChartSpec {
                x_column: "segment".to_string(),
                y_column: "revenue".to_string(),
                kind: ChartKind::Bar,
                title: None,
                source_query_fingerprint: String::new(),
                rendered_rows,
            }));
        }

        prop_assert!(ids.windows(2).all(|w| w[0].0 < w[1].0));
        prop_assert_eq!(ids[0].0, 0);
        for (id, dataset) in ids.iter().zip(&datasets) {
            let replayed = &store.get(*id).unwrap().rendered_rows;
            prop_assert_eq!(replayed, &dataset.project(&["segment", "revenue"]).unwrap());
        }

        let restored = ChartSpecStore::from_json(&store.to_json().unwrap()).unwrap();
        prop_assert_eq!(restored.len(), store.len());
    }
}
