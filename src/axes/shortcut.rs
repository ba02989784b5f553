use std::collections::HashSet;

use tracing::debug;

use crate::dataset::{Dataset, SemanticType};
use crate::plan::{AggregateFunction, AggregateSpec, ChartStep, QueryStep};
use crate::resolver::SchemaResolver;

const SEPARATORS: &[&str] = &["against", "vs", "vs.", "versus"];

const LEADING_FILLERS: &[&str] = &[
    "show", "chart", "plot", "graph", "draw", "me", "a", "an", "the", "bar", "of",
];

const TRAILING_FILLERS: &[&str] = &["please", "chart", "graph", "plot"];

/// Split `<A> against <B>` into its two phrases, `(A, B)`
///
/// Separator and filler words match case-insensitively. Returns `None`
/// when there is no separator or either side is left empty.
pub fn split_axes(text: &str) -> Option<(String, String)> {
    let text = text.trim().trim_end_matches(['?', '!', '.', ',']);
    let tokens: Vec<&str> = text.split_whitespace().collect();

    let position = tokens
        .iter()
        .position(|t| SEPARATORS.contains(&t.to_lowercase().as_str()))?;
    let (left, right) = (&tokens[..position], &tokens[position + 1..]);

    let left = strip_leading(left, LEADING_FILLERS);
    let right = strip_trailing(right, TRAILING_FILLERS);
    if left.is_empty() || right.is_empty() {
        return None;
    }
    Some((left.join(" "), right.join(" ")))
}

fn strip_leading<'t, 's>(mut tokens: &'t [&'s str], fillers: &[&str]) -> &'t [&'s str] {
    while let Some((first, rest)) = tokens.split_first() {
        if !fillers.contains(&first.to_lowercase().as_str()) {
            break;
        }
        tokens = rest;
    }
    tokens
}

fn strip_trailing<'t, 's>(mut tokens: &'t [&'s str], fillers: &[&str]) -> &'t [&'s str] {
    while let Some((last, rest)) = tokens.split_last() {
        if !fillers.contains(&last.to_lowercase().as_str()) {
            break;
        }
        tokens = rest;
    }
    tokens
}

/// A recognised shortcut with both axes resolved to canonical columns
///
/// In `<A> against <B>`, A is plotted on the value axis and B on the
/// category axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxesShortcut {
    pub x: String,
    pub y: String,
}

impl AxesShortcut {
    /// Recognise the shortcut; both sides must resolve to distinct columns
    pub fn try_parse(text: &str, resolver: &SchemaResolver<'_>) -> Option<Self> {
        let (value_phrase, category_phrase) = split_axes(text)?;
        let y = resolver.try_resolve(&value_phrase)?;
        let x = resolver.try_resolve(&category_phrase)?;
        if x == y {
            return None;
        }
        debug!(x, y, "axes shortcut recognised");
        Some(Self {
            x: x.to_string(),
            y: y.to_string(),
        })
    }

    /// Whether `x` is categorical and some value occurs more than once
    pub fn has_repeated_categories(&self, dataset: &Dataset) -> bool {
        let Some(index) = dataset.column_index(&self.x) else {
            return false;
        };
        if dataset.fields()[index].semantic_type != SemanticType::Categorical {
            return false;
        }
        let mut seen = HashSet::new();
        dataset
            .column(index)
            .filter(|v| !v.is_null())
            .any(|v| !seen.insert(v.group_key()))
    }

    /// Query producing the two-column frame to chart
    ///
    /// Repeated categories are averaged per category; anything else pairs
    /// the two columns row by row.
    pub fn query_for(&self, dataset: &Dataset) -> QueryStep {
        if self.has_repeated_categories(dataset) {
            QueryStep::new()
                .with_group_by(self.x.as_str())
                .with_aggregation(AggregateSpec::new(
                    self.y.as_str(),
                    self.y.as_str(),
                    AggregateFunction::Mean,
                ))
        } else {
            QueryStep::new().with_select([self.x.as_str(), self.y.as_str()])
        }
    }

    /// Chart step over the query at `source`
    pub fn chart_step(&self, source: usize) -> ChartStep {
        ChartStep::bar(source, self.x.as_str(), self.y.as_str())
            .with_title(format!("{} by {}", self.y, self.x))
    }
}
