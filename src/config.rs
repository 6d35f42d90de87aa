use crate::error::SolverError;
use crate::model::{Rounding, SLOT_ALPHABET};
use eyre::WrapErr;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "teamsolver.toml";

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub solver: SolverConfig,
    pub constraints: Constraints,
    pub csv: CsvConfig,
    pub database: DatabaseConfig,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LoaderKind {
    #[default]
    Csv,
    Database,
}

/// Order in which the initial placement examines preferences.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum InitialOrder {
    /// Every preference of a student before moving to the next student.
    #[default]
    Student,
    /// First preferences of all students, then second preferences, and so on.
    Rank,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    pub seed: u64,
    pub loader: LoaderKind,
    pub initial_order: InitialOrder,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            seed: 42,
            loader: LoaderKind::default(),
            initial_order: InitialOrder::default(),
        }
    }
}

/// Hard constraints applied to every roster.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Constraints {
    pub nationality_cap: usize,
    pub check_background: bool,
    pub background_cap: usize,
    pub check_slots: bool,
    pub min_shared_slots: usize,
    /// Fraction of the capacity a project must reach after the initial
    /// placement to be kept.
    pub undersubscription_fraction: f64,
    pub rounding: Rounding,
}

impl Default for Constraints {
    fn default() -> Self {
        Constraints {
            nationality_cap: 2,
            check_background: true,
            background_cap: 2,
            check_slots: true,
            min_shared_slots: 2,
            undersubscription_fraction: 0.5,
            rounding: Rounding::Ceil,
        }
    }
}

impl Constraints {
    pub fn validate(&self) -> Result<(), SolverError> {
        let invalid = |msg: String| Err(SolverError::InvalidConfiguration(msg));
        if self.nationality_cap == 0 {
            return invalid("nationality_cap must be at least 1".into());
        }
        if self.check_background && self.background_cap == 0 {
            return invalid("background_cap must be at least 1".into());
        }
        if self.check_slots && self.min_shared_slots > SLOT_ALPHABET {
            return invalid(format!(
                "min_shared_slots cannot exceed {SLOT_ALPHABET}, got {}",
                self.min_shared_slots
            ));
        }
        if !(0.0..=1.0).contains(&self.undersubscription_fraction) {
            return invalid(format!(
                "undersubscription_fraction must be between 0 and 1, got {}",
                self.undersubscription_fraction
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CsvConfig {
    pub students: PathBuf,
    pub projects: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for CsvConfig {
    fn default() -> Self {
        CsvConfig {
            students: "student_preferences.csv".into(),
            projects: "projects.csv".into(),
            output_dir: ".".into(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: Option<String>,
}

impl Config {
    pub fn load(file_name: &Path) -> eyre::Result<Config> {
        let content = std::fs::read_to_string(file_name)
            .wrap_err_with(|| format!("cannot load configuration file {}", file_name.display()))?;
        Self::parse(&content)
    }

    /// Load the given file, or the default one if it exists, or fall back
    /// to the built-in defaults.
    pub fn load_or_default(file_name: Option<&Path>) -> eyre::Result<Config> {
        match file_name {
            Some(file_name) => Self::load(file_name),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::load(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Config::default()),
        }
    }

    pub fn parse(content: &str) -> eyre::Result<Config> {
        let config: Config = toml::from_str(content).wrap_err("cannot parse configuration")?;
        config.constraints.validate()?;
        Ok(config)
    }
}
