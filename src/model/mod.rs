pub use self::pool::{AssignmentPool, Outcome, Stage};
pub use self::project::{OrgType, Project, ProjectId, Rounding};
pub use self::slots::{SLOT_ALPHABET, Slots};
pub use self::student::{MAX_PREFERENCES, Student, StudentId};

mod pool;
mod project;
mod slots;
mod student;

#[cfg(test)]
pub mod fixtures {
    use super::*;

    pub fn student(id: usize, nationality: &str, rankings: &[usize]) -> Student {
        Student {
            id: StudentId(id),
            name: format!("s{id}"),
            nationality: nationality.into(),
            background: None,
            slots: None,
            rankings: rankings.iter().map(|&p| Some(ProjectId(p))).collect(),
            type_preference: OrgType::Company,
        }
    }

    pub fn project(id: usize, org_type: OrgType, capacity: usize) -> Project {
        Project {
            id: ProjectId(id),
            name: format!("p{id}"),
            org_type,
            capacity,
        }
    }

    pub fn with_slots(mut s: Student, slots: &str) -> Student {
        s.slots = Some(slots.parse().expect("valid slots"));
        s
    }
}
