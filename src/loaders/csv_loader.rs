use super::{ProjectRecord, StudentRecord};
use crate::config::CsvConfig;
use crate::model::{AssignmentPool, Outcome};
use crate::stats::FairnessReport;
use eyre::WrapErr;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub const ASSIGNED_TEAMS_FILE: &str = "assigned_teams.csv";
pub const UNASSIGNED_FILE: &str = "unassigned_students.csv";
pub const SUMMARY_FILE: &str = "assignment_summary.csv";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StudentRow {
    name: String,
    nationality: String,
    #[serde(default)]
    background: Option<String>,
    #[serde(default)]
    slots: Option<String>,
    #[serde(default)]
    pref1: Option<String>,
    #[serde(default)]
    pref2: Option<String>,
    #[serde(default)]
    pref3: Option<String>,
    #[serde(default)]
    pref4: Option<String>,
    #[serde(default)]
    pref5: Option<String>,
    #[serde(alias = "TypePreference")]
    company_preference: String,
}

impl From<StudentRow> for StudentRecord {
    fn from(row: StudentRow) -> Self {
        StudentRecord {
            name: row.name,
            nationality: row.nationality,
            background: row.background,
            slots: row.slots,
            preferences: vec![row.pref1, row.pref2, row.pref3, row.pref4, row.pref5],
            type_preference: row.company_preference,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ProjectRow {
    project: String,
    #[serde(rename = "Type")]
    org_type: String,
    capacity: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct AssignedRow<'a> {
    student: &'a str,
    assigned_project: &'a str,
    project_type: String,
    student_type_preference: String,
    type_matched: bool,
    nationality: &'a str,
    background: Option<&'a str>,
    preference_rank: Option<usize>,
    stage: String,
}

pub struct CsvLoader {
    students: PathBuf,
    projects: PathBuf,
    output_dir: PathBuf,
}

fn reader<R: io::Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input)
}

pub fn read_students<R: io::Read>(input: R) -> eyre::Result<Vec<StudentRecord>> {
    reader(input)
        .deserialize::<StudentRow>()
        .enumerate()
        .map(|(i, row)| {
            row.map(StudentRecord::from)
                .wrap_err_with(|| format!("invalid student record #{}", i + 1))
        })
        .collect()
}

pub fn read_projects<R: io::Read>(input: R) -> eyre::Result<Vec<ProjectRecord>> {
    reader(input)
        .deserialize::<ProjectRow>()
        .enumerate()
        .map(|(i, row)| {
            row.map(|row| ProjectRecord {
                name: row.project,
                org_type: row.org_type,
                capacity: row.capacity,
            })
            .wrap_err_with(|| format!("invalid project record #{}", i + 1))
        })
        .collect()
}

/// Write one line per assigned student, sorted by project, rank and name.
pub fn write_assignments<W: io::Write>(output: W, a: &AssignmentPool) -> eyre::Result<()> {
    let mut rows = a
        .all_students()
        .into_iter()
        .filter_map(|s| match a.outcome(s) {
            Outcome::Assigned {
                project,
                rank,
                stage,
            } => {
                let (student, project) = (a.student(s), a.project(project));
                Some(AssignedRow {
                    student: &student.name,
                    assigned_project: &project.name,
                    project_type: project.org_type.to_string(),
                    student_type_preference: student.type_preference.to_string(),
                    type_matched: student.type_preference == project.org_type,
                    nationality: &student.nationality,
                    background: student.background.as_deref(),
                    preference_rank: rank.map(|r| r + 1),
                    stage: stage.to_string(),
                })
            }
            Outcome::Unassigned => None,
        })
        .collect::<Vec<_>>();
    rows.sort_by_key(|r| {
        (
            r.assigned_project,
            r.preference_rank.unwrap_or(usize::MAX),
            r.student,
        )
    });
    let mut writer = csv::Writer::from_writer(output);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_unassigned<W: io::Write>(output: W, a: &AssignmentPool) -> eyre::Result<()> {
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record([
        "Student",
        "Nationality",
        "Background",
        "TypePreference",
        "Preferences",
    ])?;
    for s in a.unassigned_students() {
        let student = a.student(s);
        let preferences = student
            .preferences()
            .map(|(_, p)| a.project(p).name.as_str())
            .collect::<Vec<_>>()
            .join(";");
        writer.write_record([
            student.name.as_str(),
            student.nationality.as_str(),
            student.background.as_deref().unwrap_or(""),
            student.type_preference.to_string().as_str(),
            preferences.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the fairness summary as several titled tables in a single file.
pub fn write_summary<W: io::Write>(mut output: W, report: &FairnessReport) -> eyre::Result<()> {
    writeln!(output, "# Type match rate by project")?;
    {
        let mut writer = csv::Writer::from_writer(&mut output);
        writer.write_record(["AssignedProject", "TypeMatchRate"])?;
        for p in report.projects.iter().filter(|p| p.size > 0) {
            let rate = p.type_match_rate().unwrap_or(0.0);
            writer.write_record([p.name.clone(), format!("{rate:.3}")])?;
        }
        writer.flush()?;
    }
    writeln!(output, "\n# Nationality distribution by project")?;
    {
        let mut writer = csv::Writer::from_writer(&mut output);
        writer.write_record(["AssignedProject", "Nationality", "Count"])?;
        for p in &report.projects {
            for (nationality, n) in &p.nationalities {
                writer.write_record([p.name.as_str(), nationality.as_str(), n.to_string().as_str()])?;
            }
        }
        writer.flush()?;
    }
    writeln!(output, "\n# Background distribution by project")?;
    {
        let mut writer = csv::Writer::from_writer(&mut output);
        writer.write_record(["AssignedProject", "Background", "Count"])?;
        for p in &report.projects {
            for (background, n) in &p.backgrounds {
                writer.write_record([p.name.as_str(), background.as_str(), n.to_string().as_str()])?;
            }
        }
        writer.flush()?;
    }
    writeln!(output, "\n# Preference satisfaction distribution")?;
    {
        let mut writer = csv::Writer::from_writer(&mut output);
        writer.write_record(["PreferenceRank", "NumStudents"])?;
        for (rank, n) in report.ranks.iter().enumerate() {
            writer.write_record([(rank + 1).to_string(), n.to_string()])?;
        }
        writer.flush()?;
    }
    writeln!(output, "\n# Totals")?;
    {
        let mut writer = csv::Writer::from_writer(&mut output);
        writer.write_record(["Metric", "Count"])?;
        for (metric, n) in [
            ("Students", report.students),
            ("Assigned", report.assigned()),
            ("OutsidePreferences", report.outside_preferences),
            ("Fallback", report.fallback),
            ("Unassigned", report.unassigned),
            ("TypeMatched", report.type_matched),
            ("DroppedProjects", report.dropped.len()),
        ] {
            writer.write_record([metric.to_owned(), n.to_string()])?;
        }
        writer.flush()?;
    }
    Ok(())
}

fn open(path: &Path) -> eyre::Result<File> {
    File::open(path).wrap_err_with(|| format!("cannot open {}", path.display()))
}

fn create(path: &Path) -> eyre::Result<File> {
    File::create(path).wrap_err_with(|| format!("cannot create {}", path.display()))
}

impl CsvLoader {
    pub fn new(config: &CsvConfig) -> CsvLoader {
        CsvLoader {
            students: config.students.clone(),
            projects: config.projects.clone(),
            output_dir: config.output_dir.clone(),
        }
    }

    pub fn load(&self) -> eyre::Result<(Vec<StudentRecord>, Vec<ProjectRecord>)> {
        let projects = read_projects(open(&self.projects)?).wrap_err("cannot load projects")?;
        let students = read_students(open(&self.students)?).wrap_err("cannot load students")?;
        info!(
            students = students.len(),
            projects = projects.len(),
            "Loaded CSV records"
        );
        Ok((students, projects))
    }

    pub fn save(&self, a: &AssignmentPool, report: &FairnessReport) -> eyre::Result<()> {
        std::fs::create_dir_all(&self.output_dir).wrap_err_with(|| {
            format!("cannot create directory {}", self.output_dir.display())
        })?;
        let teams = self.output_dir.join(ASSIGNED_TEAMS_FILE);
        write_assignments(create(&teams)?, a).wrap_err("cannot save assignments")?;
        let unassigned = self.output_dir.join(UNASSIGNED_FILE);
        write_unassigned(create(&unassigned)?, a).wrap_err("cannot save unassigned students")?;
        let summary = self.output_dir.join(SUMMARY_FILE);
        let mut file = create(&summary)?;
        write_summary(&mut file, report).wrap_err("cannot save summary")?;
        file.flush()?;
        info!(directory = %self.output_dir.display(), "Results saved");
        Ok(())
    }
}
