//! Plan and step variants

use serde::{Deserialize, Serialize};

use super::query::QueryStep;
use crate::chart::ChartKind;

/// Ordered sequence of steps for one user turn
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub steps: Vec<Step>,
}

impl Plan {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Step {
    Query(QueryStep),
    Chart(ChartStep),
    Narrate(NarrateStep),
}

impl Step {
    /// Step kind as it appears in plan payloads and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Step::Query(_) => "query",
            Step::Chart(_) => "chart",
            Step::Narrate(_) => "narrate",
        }
    }
}

impl From<QueryStep> for Step {
    fn from(step: QueryStep) -> Self {
        Step::Query(step)
    }
}

impl From<ChartStep> for Step {
    fn from(step: ChartStep) -> Self {
        Step::Chart(step)
    }
}

impl From<NarrateStep> for Step {
    fn from(step: NarrateStep) -> Self {
        Step::Narrate(step)
    }
}

/// Chart the result of an earlier query step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartStep {
    /// Index of the query step being charted
    pub source: usize,
    pub x: String,
    pub y: String,
    #[serde(default)]
    pub kind: ChartKind,
    #[serde(default)]
    pub title: Option<String>,
}

impl ChartStep {
    pub fn bar(source: usize, x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            source,
            x: x.into(),
            y: y.into(),
            kind: ChartKind::Bar,
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Optional guidance forwarded to the narrator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NarrationHint {
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub length: Option<String>,
    #[serde(default)]
    pub focus: Option<String>,
}

/// Narrate the result of an earlier query step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrateStep {
    pub source: usize,
    #[serde(default)]
    pub hint: NarrationHint,
}

impl NarrateStep {
    pub fn new(source: usize) -> Self {
        Self {
            source,
            hint: NarrationHint::default(),
        }
    }

    pub fn with_hint(mut self, hint: NarrationHint) -> Self {
        self.hint = hint;
        self
    }
}
