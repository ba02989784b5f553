//! Session-scoped state
//!
//! A session owns the dataset, its schema and the chart history for one
//! conversation. Nothing here is global: dropping (or [`Session::close`]-ing)
//! the session drops its history.

use std::sync::Arc;

use tracing::info;

use crate::axes::AxesShortcut;
use crate::chart::{ChartId, ChartSpec, ChartSpecStore, StoreError};
use crate::config::EngineConfig;
use crate::dataset::Dataset;
use crate::executor::{PlanExecutor, QueryResult, StepError, StepResult};
use crate::narrate::Narrator;
use crate::plan::{Plan, PlanError};
use crate::schema::{Schema, SchemaError};

/// Chart produced directly from an axes shortcut
#[derive(Debug, Clone, PartialEq)]
pub struct ShortcutChart {
    pub shortcut: AxesShortcut,
    pub result: QueryResult,
    pub id: ChartId,
    pub spec: ChartSpec,
}

pub struct Session {
    schema: Schema,
    dataset: Dataset,
    config: EngineConfig,
    charts: ChartSpecStore,
    narrator: Option<Arc<dyn Narrator>>,
}

impl Session {
    /// Start a session; the schema must agree with the dataset
    pub fn new(schema: Schema, dataset: Dataset) -> Result<Self, SchemaError> {
        schema.check_dataset(&dataset)?;
        info!(
            columns = schema.columns().len(),
            rows = dataset.len(),
            "session started"
        );
        Ok(Self {
            schema,
            dataset,
            config: EngineConfig::default(),
            charts: ChartSpecStore::new(),
            narrator: None,
        })
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_narrator(mut self, narrator: Arc<dyn Narrator>) -> Self {
        self.narrator = Some(narrator);
        self
    }

    /// Continue with a chart history restored from an earlier session
    pub fn with_history(mut self, charts: ChartSpecStore) -> Self {
        self.charts = charts;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn charts(&self) -> &ChartSpecStore {
        &self.charts
    }

    /// Swap in a reloaded dataset; chart history is kept
    pub fn replace_dataset(&mut self, dataset: Dataset) -> Result<(), SchemaError> {
        self.schema.check_dataset(&dataset)?;
        self.dataset = dataset;
        Ok(())
    }

    /// Execute a validated plan
    pub fn execute(&mut self, plan: &Plan) -> Vec<StepResult> {
        let mut executor = PlanExecutor::new(&self.dataset, &self.schema, &self.config);
        if let Some(narrator) = &self.narrator {
            executor = executor.with_narrator(Arc::clone(narrator));
        }
        executor.execute(plan, &mut self.charts)
    }

    /// Validate a planner payload and execute it
    pub fn execute_payload(
        &mut self,
        payload: &serde_json::Value,
    ) -> Result<Vec<StepResult>, PlanError> {
        let plan = Plan::from_json(payload)?;
        Ok(self.execute(&plan))
    }

    /// Chart "A against B" requests without a planner
    ///
    /// Returns `None` when the text is not a shortcut, so the caller can fall
    /// back to planning.
    pub fn try_shortcut(&mut self, text: &str) -> Option<Result<ShortcutChart, StepError>> {
        let executor = PlanExecutor::new(&self.dataset, &self.schema, &self.config);
        let shortcut = AxesShortcut::try_parse(text, executor.resolver())?;

        let run = || -> Result<(QueryResult, ChartSpec), StepError> {
            let query = shortcut.query_for(&self.dataset);
            let result = executor.execute_query(&query)?;
            let spec = executor.build_chart(0, &shortcut.chart_step(0), &result)?;
            Ok((result, spec))
        };
        let outcome = run();

        Some(outcome.map(|(result, spec)| {
            let id = self.charts.append(spec.clone());
            ShortcutChart {
                shortcut,
                result,
                id,
                spec,
            }
        }))
    }

    /// Chart spec to redraw from history
    pub fn replay(&self, id: ChartId) -> Result<&ChartSpec, StoreError> {
        self.charts.get(id)
    }

    /// End the session, handing back its chart history
    pub fn close(self) -> ChartSpecStore {
        info!(charts = self.charts.len(), "session closed");
        self.charts
    }
}
