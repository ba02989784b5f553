use std::sync::Arc;

use tracing::{debug, info, warn};

use super::error::StepError;
use super::query::run_query;
use super::result::{QueryResult, StepOutput, StepResult};
use crate::chart::{ChartSpec, ChartSpecStore};
use crate::config::EngineConfig;
use crate::dataset::Dataset;
use crate::narrate::{narrate_with_timeout, NarrationError, NarrationRequest, Narrator};
use crate::plan::{ChartStep, NarrateStep, Plan, PlanError, QueryStep, Step};
use crate::resolver::SchemaResolver;
use crate::schema::Schema;

/// Executes plans against one dataset
///
/// Steps run strictly in order. A failed step is recorded and the plan
/// carries on; only steps that consume its output fail with it.
pub struct PlanExecutor<'a> {
    dataset: &'a Dataset,
    resolver: SchemaResolver<'a>,
    config: &'a EngineConfig,
    narrator: Option<Arc<dyn Narrator>>,
}

impl<'a> PlanExecutor<'a> {
    pub fn new(dataset: &'a Dataset, schema: &'a Schema, config: &'a EngineConfig) -> Self {
        Self {
            dataset,
            resolver: SchemaResolver::new(schema),
            config,
            narrator: None,
        }
    }

    pub fn with_narrator(mut self, narrator: Arc<dyn Narrator>) -> Self {
        self.narrator = Some(narrator);
        self
    }

    pub fn resolver(&self) -> &SchemaResolver<'a> {
        &self.resolver
    }

    /// Execute every step, appending charts to `store`
    pub fn execute(&self, plan: &Plan, store: &mut ChartSpecStore) -> Vec<StepResult> {
        info!(steps = plan.len(), "executing plan");
        let mut results: Vec<StepResult> = Vec::with_capacity(plan.len());

        for (index, step) in plan.steps.iter().enumerate() {
            let kind = step.kind();
            debug!(step = index, kind, "step started");

            let outcome = match step {
                Step::Query(query) => self.execute_query(query).map(StepOutput::Query),
                Step::Chart(chart) => upstream(&results, index, chart.source).and_then(|result| {
                    let spec = self.build_chart(index, chart, result)?;
                    let id = store.append(spec.clone());
                    Ok(StepOutput::Chart { id, spec })
                }),
                Step::Narrate(narrate) => upstream(&results, index, narrate.source)
                    .and_then(|result| self.narrate(narrate, result))
                    .map(StepOutput::Narration),
            };

            match &outcome {
                Ok(_) => debug!(step = index, kind, "step finished"),
                Err(err) => warn!(
                    step = index,
                    kind,
                    error = %err,
                    error_kind = %err.kind(),
                    "step failed"
                ),
            }
            results.push(StepResult {
                index,
                kind,
                outcome,
            });
        }

        results
    }

    /// Run one query step on its own
    pub fn execute_query(&self, step: &QueryStep) -> Result<QueryResult, StepError> {
        let result = run_query(self.dataset, &self.resolver, self.config, step)?;
        debug!(
            rows = result.rows.len(),
            matched = result.matched_rows,
            relaxed = result.relaxed,
            "query finished"
        );
        Ok(result)
    }

    /// Snapshot the `[x, y]` columns of an upstream query result
    ///
    /// Column names may be written as the planner saw them; they must land
    /// on a column of the upstream result.
    pub fn build_chart(
        &self,
        index: usize,
        step: &ChartStep,
        upstream: &QueryResult,
    ) -> Result<ChartSpec, StepError> {
        let x = self.result_column(&upstream.rows, &step.x)?;
        let y = self.result_column(&upstream.rows, &step.y)?;
        if x == y {
            return Err(PlanError::invalid(
                Some(index),
                Some("y"),
                format!("x and y both name '{}'", x),
            )
            .into());
        }

        let rendered_rows = upstream.rows.project(&[x.as_str(), y.as_str()])?;
        Ok(ChartSpec {
            x_column: x,
            y_column: y,
            kind: step.kind,
            title: step.title.clone(),
            source_query_fingerprint: upstream.fingerprint.clone(),
            rendered_rows,
        })
    }

    fn result_column(&self, rows: &Dataset, name: &str) -> Result<String, StepError> {
        if rows.has_column(name) {
            return Ok(name.to_string());
        }
        match self.resolver.try_resolve(name) {
            Some(canonical) if rows.has_column(canonical) => Ok(canonical.to_string()),
            _ => Err(StepError::ChartColumnMissing {
                column: name.to_string(),
                available: rows.column_names().iter().map(|c| c.to_string()).collect(),
            }),
        }
    }

    fn narrate(&self, step: &NarrateStep, upstream: &QueryResult) -> Result<String, StepError> {
        let Some(narrator) = &self.narrator else {
            return Err(NarrationError::NotConfigured.into());
        };
        let request = NarrationRequest {
            source: step.source,
            result: upstream.clone(),
            hint: step.hint.clone(),
        };
        Ok(narrate_with_timeout(
            Arc::clone(narrator),
            request,
            self.config.narration_timeout(),
        )?)
    }
}

/// The query result a chart or narrate step builds on
fn upstream(
    results: &[StepResult],
    index: usize,
    source: usize,
) -> Result<&QueryResult, StepError> {
    let not_a_query = |reason: String| -> StepError {
        PlanError::invalid(Some(index), Some("source"), reason).into()
    };

    if source >= index {
        return Err(not_a_query(format!(
            "step {} does not precede step {}",
            source, index
        )));
    }
    let Some(previous) = results.get(source) else {
        return Err(not_a_query(format!("step {} has no result", source)));
    };
    match &previous.outcome {
        Ok(StepOutput::Query(result)) => Ok(result),
        Ok(_) => Err(not_a_query(format!(
            "step {} is a {} step, not a query",
            source, previous.kind
        ))),
        Err(err) => Err(StepError::UpstreamStepFailed {
            step: source,
            cause: err.kind(),
        }),
    }
}
