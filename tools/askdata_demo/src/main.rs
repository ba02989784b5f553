use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use askdata::{
    parser, Dataset, EngineConfig, NarrationError, NarrationRequest, QueryResult, SchemaResolver,
    Session, StepOutput, StepResult,
};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "askdata-demo")]
#[command(about = "Execute analytics plans and chart shortcuts over a local dataset")]
#[command(version)]
struct Args {
    /// Schema YAML (canonical columns and aliases)
    #[arg(long, default_value = "tools/askdata_demo/data/churn.yaml")]
    schema: PathBuf,

    /// Dataset JSON
    #[arg(long, default_value = "tools/askdata_demo/data/churn.json")]
    data: PathBuf,

    /// Engine config YAML; defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a planner payload
    Run {
        /// Plan JSON file
        #[arg(long, default_value = "tools/askdata_demo/data/plan.json")]
        plan: PathBuf,

        /// Print results as JSON instead of tables
        #[arg(long)]
        json: bool,

        /// Write the chart history here after the run
        #[arg(long)]
        history: Option<PathBuf>,
    },
    /// Chart an "A against B" request
    Chart {
        /// e.g. "revenue against segment"
        text: String,
    },
    /// Show how names resolve against the schema
    Resolve {
        names: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let schema = parser::parse_schema_file(&args.schema)
        .with_context(|| format!("loading schema {}", args.schema.display()))?;
    let dataset = parser::parse_dataset_file(&args.data)
        .with_context(|| format!("loading dataset {}", args.data.display()))?;
    info!(
        columns = schema.columns().len(),
        rows = dataset.len(),
        "dataset loaded"
    );
    let config = match &args.config {
        Some(path) => parser::parse_config_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    match args.command {
        Commands::Resolve { names } => {
            let resolver = SchemaResolver::new(&schema);
            for name in names {
                match resolver.resolve(&name) {
                    Ok(canonical) => println!("{:>20} → {}", name, canonical),
                    Err(err) => println!("{:>20} ✗ {} ({})", name, err, err.kind()),
                }
            }
            Ok(())
        }
        Commands::Chart { text } => {
            let mut session = Session::new(schema, dataset)?.with_config(config);
            let Some(outcome) = session.try_shortcut(&text) else {
                bail!("'{}' is not an \"A against B\" request this schema can answer", text);
            };
            let chart = outcome?;
            println!("📊 Chart {} - {}", chart.id, chart.spec.display_title());
            print_table(&chart.spec.rendered_rows);
            Ok(())
        }
        Commands::Run { plan, json, history } => {
            let plan_path = plan;
            let payload = std::fs::read_to_string(&plan_path)
                .with_context(|| format!("reading plan {}", plan_path.display()))?;
            let plan = parser::parse_plan_str(&payload)?;
            info!(steps = plan.len(), path = %plan_path.display(), "plan loaded");

            let mut session = Session::new(schema, dataset)?
                .with_config(config)
                .with_narrator(Arc::new(summarize));

            println!("🔍 askdata demo - {} step plan", plan.len());
            println!("==============================");
            let results = session.execute(&plan);
            if json {
                print_json(&results)?;
            } else {
                for result in &results {
                    print_step(result);
                }
            }

            if let Some(path) = history {
                let store = session.close();
                std::fs::write(&path, store.to_json()?)
                    .with_context(|| format!("writing history {}", path.display()))?;
                info!(charts = store.len(), path = %path.display(), "chart history saved");
                println!("\n💾 {} chart(s) saved to {}", store.len(), path.display());
            }
            Ok(())
        }
    }
}

/// Stand-in narrator: states the row count and any relaxation
fn summarize(request: &NarrationRequest) -> Result<String, NarrationError> {
    let result = &request.result;
    let mut text = format!(
        "Step {} returned {} row(s) from {} matching record(s).",
        request.source,
        result.rows.len(),
        result.matched_rows
    );
    if let Some(notice) = result.notice() {
        text.push(' ');
        text.push_str(&notice);
    }
    Ok(text)
}

fn print_step(result: &StepResult) {
    println!("\n[{}] {}", result.index, result.kind);
    match &result.outcome {
        Ok(StepOutput::Query(query)) => print_query(query),
        Ok(StepOutput::Chart { id, spec }) => {
            println!("📊 Chart {} - {} ({})", id, spec.display_title(), spec.kind);
            print_table(&spec.rendered_rows);
        }
        Ok(StepOutput::Narration(text)) => println!("📝 {}", text),
        Err(err) => println!("❌ {}: {}", err.kind(), err),
    }
}

fn print_query(query: &QueryResult) {
    if let Some(notice) = query.notice() {
        println!("⚠️  {}", notice);
    }
    print_table(&query.rows);
}

fn print_table(rows: &Dataset) {
    println!("{}", rows.column_names().join(" | "));
    for row in rows.rows() {
        let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
        println!("{}", cells.join(" | "));
    }
}

fn print_json(results: &[StepResult]) -> anyhow::Result<()> {
    let steps: Vec<serde_json::Value> = results
        .iter()
        .map(|result| -> Result<serde_json::Value, serde_json::Error> {
            let body = match &result.outcome {
                Ok(StepOutput::Query(query)) => serde_json::to_value(query)?,
                Ok(StepOutput::Chart { id, spec }) => serde_json::json!({
                    "id": id,
                    "x": spec.x_column,
                    "y": spec.y_column,
                    "rows": spec.rendered_rows,
                }),
                Ok(StepOutput::Narration(text)) => serde_json::json!({ "text": text }),
                Err(err) => serde_json::json!({
                    "error": err.kind().to_string(),
                    "message": err.to_string(),
                }),
            };
            Ok(serde_json::json!({
                "step": result.index,
                "kind": result.kind,
                "result": body,
            }))
        })
        .collect::<Result<_, serde_json::Error>>()?;
    println!("{}", serde_json::to_string_pretty(&steps)?);
    Ok(())
}
