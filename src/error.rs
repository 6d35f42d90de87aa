use thiserror::Error;

/// Failures which prevent a run from starting at all. Students which cannot
/// be placed are not errors, they end up unassigned.
#[derive(Debug, Error, PartialEq)]
pub enum SolverError {
    #[error("insufficient project capacity, can host {capacity} students out of {students}")]
    StructuralInfeasibility { capacity: usize, students: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("student {0} is listed more than once")]
    DuplicateStudent(String),
    #[error("project {0} is listed more than once")]
    DuplicateProject(String),
    #[error("project {project} has invalid capacity {capacity}")]
    InvalidCapacity { project: String, capacity: i64 },
    #[error("unknown organization type {0:?}")]
    UnknownOrganizationType(String),
    #[error("invalid time slot {0:?}")]
    InvalidSlot(char),
}
