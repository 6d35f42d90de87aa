use crate::error::SolverError;
use crate::loaders::{ProjectRecord, StudentRecord};
use crate::model::{MAX_PREFERENCES, OrgType, Project, ProjectId, Slots, Student, StudentId};
use std::collections::HashMap;
use tracing::debug;

fn non_blank(field: Option<String>) -> Option<String> {
    field
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

fn remap_projects(
    projects: Vec<ProjectRecord>,
) -> Result<(Vec<Project>, HashMap<String, ProjectId>), SolverError> {
    let mut map = HashMap::new();
    let mut result = Vec::with_capacity(projects.len());
    for record in projects {
        let name = record.name.trim().to_owned();
        let id = ProjectId(result.len());
        if map.insert(name.clone(), id).is_some() {
            return Err(SolverError::DuplicateProject(name));
        }
        let capacity = usize::try_from(record.capacity)
            .ok()
            .filter(|&c| c > 0)
            .ok_or_else(|| SolverError::InvalidCapacity {
                project: name.clone(),
                capacity: record.capacity,
            })?;
        result.push(Project {
            id,
            name,
            org_type: record.org_type.parse()?,
            capacity,
        });
    }
    Ok((result, map))
}

fn remap_students(
    students: Vec<StudentRecord>,
    projects: &HashMap<String, ProjectId>,
) -> Result<Vec<Student>, SolverError> {
    let mut seen = HashMap::new();
    let mut result = Vec::with_capacity(students.len());
    for record in students {
        let name = record.name.trim().to_owned();
        let id = StudentId(result.len());
        if seen.insert(name.clone(), id).is_some() {
            return Err(SolverError::DuplicateStudent(name));
        }
        let rankings = record
            .preferences
            .into_iter()
            .take(MAX_PREFERENCES)
            .map(|p| {
                let p = non_blank(p)?;
                let project = projects.get(&p).copied();
                if project.is_none() {
                    debug!(student = %name, preference = %p, "Ignoring unknown project");
                }
                project
            })
            .collect();
        let slots = non_blank(record.slots)
            .map(|s| s.parse::<Slots>())
            .transpose()?;
        result.push(Student {
            id,
            name,
            nationality: record.nationality.trim().to_owned(),
            background: non_blank(record.background),
            slots,
            rankings,
            type_preference: record.type_preference.parse::<OrgType>()?,
        });
    }
    Ok(result)
}

/// Turn loaded records into students and projects with dense identifiers,
/// resolving preferences by project name.
pub fn remap(
    students: Vec<StudentRecord>,
    projects: Vec<ProjectRecord>,
) -> Result<(Vec<Student>, Vec<Project>), SolverError> {
    let (projects, map) = remap_projects(projects)?;
    let students = remap_students(students, &map)?;
    Ok((students, projects))
}
