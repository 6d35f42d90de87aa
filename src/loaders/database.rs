use super::{ProjectRecord, StudentRecord};
use crate::model::AssignmentPool;
use eyre::WrapErr;
use sqlx::any::AnyRow;
use sqlx::{AnyConnection, Connection, Row};
use tracing::{info, trace};

/// Students and projects stored in a database reachable through any
/// sqlx driver. Expected tables:
///
/// - `projects(id, org_type, capacity)`
/// - `students(id, nationality, background, slots, pref1, …, pref5,
///   type_preference, assigned_project)`
pub struct DatabaseLoader {
    conn: AnyConnection,
}

impl DatabaseLoader {
    pub async fn new(url: &str) -> eyre::Result<Self> {
        sqlx::any::install_default_drivers();
        Ok(Self {
            conn: AnyConnection::connect(url).await?,
        })
    }

    pub async fn load(&mut self) -> eyre::Result<(Vec<StudentRecord>, Vec<ProjectRecord>)> {
        let projects = self.load_projects().await.wrap_err("cannot load projects")?;
        let students = self.load_students().await.wrap_err("cannot load students")?;
        info!(
            students = students.len(),
            projects = projects.len(),
            "Loaded database records"
        );
        Ok((students, projects))
    }

    async fn load_projects(&mut self) -> Result<Vec<ProjectRecord>, sqlx::Error> {
        sqlx::query("SELECT id, org_type, capacity FROM projects ORDER BY id")
            .fetch_all(&mut self.conn)
            .await?
            .iter()
            .map(|row: &AnyRow| {
                Ok(ProjectRecord {
                    name: row.try_get("id")?,
                    org_type: row.try_get("org_type")?,
                    capacity: i64::from(row.try_get::<i32, _>("capacity")?),
                })
            })
            .collect()
    }

    async fn load_students(&mut self) -> Result<Vec<StudentRecord>, sqlx::Error> {
        sqlx::query(
            "SELECT id, nationality, background, slots, pref1, pref2, pref3, pref4, pref5, \
             type_preference FROM students ORDER BY id",
        )
        .fetch_all(&mut self.conn)
        .await?
        .iter()
        .map(|row: &AnyRow| {
            let preferences = ["pref1", "pref2", "pref3", "pref4", "pref5"]
                .into_iter()
                .map(|column| row.try_get::<Option<String>, _>(column))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(StudentRecord {
                name: row.try_get("id")?,
                nationality: row.try_get("nationality")?,
                background: row.try_get("background")?,
                slots: row.try_get("slots")?,
                preferences,
                type_preference: row.try_get("type_preference")?,
            })
        })
        .collect()
    }

    /// Record the project of every student, or NULL for unassigned ones,
    /// in a single transaction.
    pub async fn save_assignments(&mut self, a: &AssignmentPool) -> eyre::Result<()> {
        let mut trans = self.conn.begin().await?;
        for s in a.all_students() {
            let student = &a.student(s).name;
            match a.project_for(s) {
                Some(p) => {
                    trace!(%student, project = %a.project(p), "Saving assignment");
                    sqlx::query("UPDATE students SET assigned_project=? WHERE id=?")
                        .bind(a.project(p).name.as_str())
                        .bind(student.as_str())
                        .execute(&mut *trans)
                        .await
                        .wrap_err("cannot save assignments")?;
                }
                None => {
                    sqlx::query("UPDATE students SET assigned_project=NULL WHERE id=?")
                        .bind(student.as_str())
                        .execute(&mut *trans)
                        .await
                        .wrap_err("cannot clear assignment of unassigned student")?;
                }
            }
        }
        trans
            .commit()
            .await
            .wrap_err("error when committing transaction")?;
        Ok(())
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;
    use crate::model::{ProjectId, Stage, StudentId};
    use crate::remap::remap;

    async fn fixture() -> DatabaseLoader {
        let mut loader = DatabaseLoader::new("sqlite::memory:").await.unwrap();
        for statement in [
            "CREATE TABLE projects (id TEXT PRIMARY KEY, org_type TEXT NOT NULL, capacity INTEGER NOT NULL)",
            "CREATE TABLE students (id TEXT PRIMARY KEY, nationality TEXT NOT NULL, background TEXT, \
             slots TEXT, pref1 TEXT, pref2 TEXT, pref3 TEXT, pref4 TEXT, pref5 TEXT, \
             type_preference TEXT NOT NULL, assigned_project TEXT)",
            "INSERT INTO projects VALUES ('Alpha', 'Company', 3), ('Beta', 'Institutional', 2)",
            "INSERT INTO students VALUES \
             ('Ada', 'FR', 'CS', 'A;B', 'Beta', 'Alpha', NULL, NULL, NULL, 'Company', NULL), \
             ('Bob', 'DE', NULL, NULL, 'Alpha', NULL, NULL, NULL, NULL, 'Institutional', 'Beta')",
        ] {
            sqlx::query(statement)
                .execute(&mut loader.conn)
                .await
                .unwrap();
        }
        loader
    }

    #[tokio::test]
    async fn test_load_and_save() {
        let mut loader = fixture().await;
        let (students, projects) = loader.load().await.unwrap();
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].capacity, 3);
        assert_eq!(students[0].preferences[0].as_deref(), Some("Beta"));
        assert_eq!(students[1].background, None);

        let (students, projects) = remap(students, projects).unwrap();
        let mut pool = AssignmentPool::new(students, projects);
        pool.assign_to(StudentId(0), ProjectId(1), Stage::Preference);
        loader.save_assignments(&pool).await.unwrap();

        let rows = sqlx::query("SELECT id, assigned_project FROM students ORDER BY id")
            .fetch_all(&mut loader.conn)
            .await
            .unwrap();
        let saved = rows
            .iter()
            .map(|row| row.try_get::<Option<String>, _>("assigned_project").unwrap())
            .collect::<Vec<_>>();
        assert_eq!(saved, vec![Some("Beta".to_owned()), None]);
    }
}
