mod config;

use anyhow::{Context, Result, anyhow};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use vd_database::duck::connect;
use vd_database::ingest::import_workbook;
use vd_database::init::apply_schema_file;
use vd_database::plan::LoadPlan;
use vd_database::schema::create_bundled_schema;
use vd_database::workbook::XlsxWorkbook;
use vd_engine::{Outcome, run_all};

use crate::config::PipelineConfig;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_line_number(true)
        .compact()
        .init();

    let cfg = PipelineConfig::from_env().context("configuration")?;
    info!(workbook = %cfg.workbook.display(), today = %cfg.today, "starting");

    let store = connect(cfg.db_path.as_deref()).context("connect to relational store")?;

    let statements = match &cfg.schema_file {
        Some(path) => apply_schema_file(&store, path)
            .with_context(|| format!("apply schema file {}", path.display()))?,
        None => create_bundled_schema(&store).context("apply bundled schema")?,
    };
    info!(statements, "schema ready");

    let plan = LoadPlan::workbook().context("build load plan")?;
    let mut workbook = XlsxWorkbook::open(&cfg.workbook).context("open workbook")?;
    let imported = import_workbook(&store, &mut workbook, &plan).context("import workbook")?;
    for r in imported.rejections() {
        println!(
            "skipped {} row {} ({}): {}",
            r.sheet, r.row, r.column, r.reason
        );
    }

    let report = run_all(&store, &cfg.analytics_params());
    for (requirement, outcome) in &report.outcomes {
        println!("\n== Requirement {requirement} ==");
        match outcome {
            Outcome::Done(output) => print!("{output}"),
            Outcome::Failed(e) => println!("FAILED: {e}"),
            Outcome::Skipped(why) => println!("skipped: {why}"),
        }
    }

    let failed: Vec<String> = report.failures().map(|(r, _)| r.to_string()).collect();
    if failed.is_empty() {
        info!("all requirements complete");
        Ok(())
    } else {
        error!(failed = failed.len(), "some requirements failed");
        Err(anyhow!("requirements failed: {}", failed.join(", ")))
    }
}
