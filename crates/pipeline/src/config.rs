use anyhow::{Context, Result, anyhow};
use chrono::{Local, NaiveDate};
use std::path::PathBuf;
use vd_engine::{AnalyticsParams, ContactQuery};
use vd_types::calendar::parse_date_text;

/// Best-effort: load `.env`, falling back to `.env.example`.
pub fn load_env_best_effort() {
    let _ = dotenvy::from_filename(".env").or_else(|_| dotenvy::from_filename(".env.example"));
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub workbook: PathBuf,
    /// DuckDB file; in-memory when unset.
    pub db_path: Option<PathBuf>,
    /// DDL to apply instead of the bundled schema.
    pub schema_file: Option<PathBuf>,
    pub today: NaiveDate,
    pub top_symptoms: usize,
    pub contact: Option<ContactQuery>,
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self> {
        load_env_best_effort();
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| var(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let date = |k: &str, v: String| {
            parse_date_text(&v).ok_or_else(|| anyhow!("{k}='{v}' is not a date (expected YYYY-MM-DD)"))
        };

        let workbook = get("VD_WORKBOOK")
            .map(PathBuf::from)
            .ok_or_else(|| anyhow!("VD_WORKBOOK not set. Point it at the campaign workbook (.xlsx)."))?;
        let today = match get("VD_TODAY") {
            Some(v) => date("VD_TODAY", v)?,
            None => Local::now().date_naive(),
        };
        let top_symptoms = match get("VD_TOP_SYMPTOMS") {
            Some(v) => v
                .parse::<usize>()
                .with_context(|| format!("VD_TOP_SYMPTOMS='{v}' is not a count"))?,
            None => 3,
        };

        let contact = match (
            get("VD_CONTACT_WORKER"),
            get("VD_CONTACT_FROM"),
            get("VD_CONTACT_TO"),
        ) {
            (Some(worker), Some(from), Some(to)) => {
                let from = date("VD_CONTACT_FROM", from)?;
                let to = date("VD_CONTACT_TO", to)?;
                if from > to {
                    return Err(anyhow!("contact window starts after it ends: {from} > {to}"));
                }
                Some(ContactQuery { worker, from, to })
            }
            (None, None, None) => None,
            _ => {
                return Err(anyhow!(
                    "VD_CONTACT_WORKER, VD_CONTACT_FROM and VD_CONTACT_TO must be set together"
                ));
            }
        };

        Ok(Self {
            workbook,
            db_path: get("VD_DB_PATH").map(PathBuf::from),
            schema_file: get("VD_SCHEMA_FILE").map(PathBuf::from),
            today,
            top_symptoms,
            contact,
        })
    }

    pub fn analytics_params(&self) -> AnalyticsParams {
        AnalyticsParams {
            today: self.today,
            top_n: self.top_symptoms,
            contact: self.contact.clone(),
        }
    }
}
