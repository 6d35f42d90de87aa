pub use self::csv_loader::CsvLoader;
pub use self::database::DatabaseLoader;

mod csv_loader;
mod database;

use crate::config::{Config, LoaderKind};
use crate::model::AssignmentPool;
use crate::stats::FairnessReport;
use eyre::{OptionExt, WrapErr};

/// A student as read from the input, before project names are resolved.
#[derive(Clone, Debug, Default)]
pub struct StudentRecord {
    pub name: String,
    pub nationality: String,
    pub background: Option<String>,
    pub slots: Option<String>,
    /// Project names in preference order; `None` for empty entries.
    pub preferences: Vec<Option<String>>,
    pub type_preference: String,
}

#[derive(Clone, Debug)]
pub struct ProjectRecord {
    pub name: String,
    pub org_type: String,
    pub capacity: i64,
}

/// Source of students and projects, and destination of the results.
pub enum Loader {
    Csv(CsvLoader),
    Database(DatabaseLoader),
}

impl Loader {
    pub async fn from_config(config: &Config) -> eyre::Result<Loader> {
        Ok(match config.solver.loader {
            LoaderKind::Csv => Loader::Csv(CsvLoader::new(&config.csv)),
            LoaderKind::Database => {
                let url = config
                    .database
                    .url
                    .as_deref()
                    .ok_or_eyre("database.url must be set to use the database loader")?;
                Loader::Database(
                    DatabaseLoader::new(url)
                        .await
                        .wrap_err("cannot connect to database")?,
                )
            }
        })
    }

    pub async fn load(&mut self) -> eyre::Result<(Vec<StudentRecord>, Vec<ProjectRecord>)> {
        match self {
            Loader::Csv(loader) => loader.load(),
            Loader::Database(loader) => loader.load().await,
        }
    }

    pub async fn save(&mut self, a: &AssignmentPool, report: &FairnessReport) -> eyre::Result<()> {
        match self {
            Loader::Csv(loader) => loader.save(a, report),
            Loader::Database(loader) => loader.save_assignments(a).await,
        }
    }
}
