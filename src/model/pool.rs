use super::*;
use crate::error::SolverError;
use std::collections::BTreeMap;
use std::fmt;

/// Step of the placement process which placed a student.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Stage {
    /// Initial placement on one of the student's preferences.
    Preference,
    /// Placed again on one of its preferences after a project was dropped.
    Reassigned,
    /// Placed on a project of the preferred organization type.
    TypeFallback,
    /// Placed during final balancing on any project with room.
    Balancing,
}

impl Stage {
    pub fn is_fallback(self) -> bool {
        matches!(self, Stage::TypeFallback | Stage::Balancing)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Stage::Preference => "preference",
            Stage::Reassigned => "reassigned",
            Stage::TypeFallback => "type-fallback",
            Stage::Balancing => "balancing",
        };
        write!(f, "{name}")
    }
}

/// Final result for a single student.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    Assigned {
        project: ProjectId,
        rank: Option<usize>,
        stage: Stage,
    },
    Unassigned,
}

/// Working state of a run: rosters, per-student assignment and the
/// projects which have been dropped for lack of members.
#[derive(Debug)]
pub struct AssignmentPool {
    pub students: Vec<Student>,
    pub projects: Vec<Project>,
    assigned_to: Vec<Option<(ProjectId, Stage)>>,
    assigned: Vec<Vec<StudentId>>,
    dropped: Vec<bool>,
    cursor: Vec<usize>,
}

impl AssignmentPool {
    pub fn new(students: Vec<Student>, projects: Vec<Project>) -> AssignmentPool {
        let slen = students.len();
        let plen = projects.len();
        AssignmentPool {
            students,
            projects,
            assigned_to: vec![None; slen],
            assigned: vec![Vec::new(); plen],
            dropped: vec![false; plen],
            cursor: vec![0; slen],
        }
    }

    pub fn student(&self, StudentId(student): StudentId) -> &Student {
        &self.students[student]
    }

    pub fn project(&self, ProjectId(project): ProjectId) -> &Project {
        &self.projects[project]
    }

    pub fn all_projects(&self) -> Vec<ProjectId> {
        self.filter_projects(|_| true)
    }

    pub fn filter_projects<F>(&self, condition: F) -> Vec<ProjectId>
    where
        F: Fn(ProjectId) -> bool,
    {
        self.projects
            .iter()
            .map(|project| project.id)
            .filter(|&p| condition(p))
            .collect()
    }

    pub fn viable_projects(&self) -> Vec<ProjectId> {
        self.filter_projects(|p| !self.is_dropped(p))
    }

    pub fn all_students(&self) -> Vec<StudentId> {
        self.students.iter().map(|student| student.id).collect()
    }

    pub fn project_for(&self, StudentId(student): StudentId) -> Option<ProjectId> {
        self.assigned_to[student].map(|(p, _)| p)
    }

    pub fn rank_of(&self, student: StudentId, project: ProjectId) -> Option<usize> {
        self.student(student).rank_of(project)
    }

    pub fn outcome(&self, student: StudentId) -> Outcome {
        match self.assigned_to[student.0] {
            Some((project, stage)) => Outcome::Assigned {
                project,
                rank: self.rank_of(student, project),
                stage,
            },
            None => Outcome::Unassigned,
        }
    }

    pub fn students_for(&self, ProjectId(project): ProjectId) -> &Vec<StudentId> {
        &self.assigned[project]
    }

    /// Members currently assigned to a project.
    pub fn roster(&self, project: ProjectId) -> Vec<&Student> {
        self.students_for(project)
            .iter()
            .map(|&s| self.student(s))
            .collect()
    }

    /// Return the next raw ranking entry of a student not examined yet,
    /// and move past it.
    pub fn next_choice(&mut self, student: StudentId) -> Option<(usize, Option<ProjectId>)> {
        let rank = self.cursor[student.0];
        let choice = *self.student(student).rankings.get(rank)?;
        self.cursor[student.0] += 1;
        Some((rank, choice))
    }

    /// Start examining the rankings of a student from the first one again.
    pub fn rewind(&mut self, student: StudentId) {
        self.cursor[student.0] = 0;
    }

    pub fn assign_to(&mut self, student: StudentId, project: ProjectId, stage: Stage) {
        assert!(
            self.project_for(student).is_none(),
            "a project is already assigned to this student"
        );
        assert!(
            !self.is_dropped(project),
            "cannot assign to a dropped project"
        );
        assert!(
            self.size(project) < self.capacity(project),
            "project is already full"
        );
        self.assigned_to[student.0] = Some((project, stage));
        self.assigned[project.0].push(student);
    }

    pub fn unassign_from(&mut self, student: StudentId, project: ProjectId) {
        assert_eq!(
            self.project_for(student),
            Some(project),
            "project not assigned to this student"
        );
        self.assigned_to[student.0] = None;
        let pos = self.assigned[project.0]
            .iter()
            .position(|&s| s == student)
            .expect("student not found in project");
        self.assigned[project.0].remove(pos);
    }

    pub fn clear_assignments_for(&mut self, project: ProjectId) -> Vec<StudentId> {
        let students = self.students_for(project).clone();
        for &student in &students {
            self.unassign_from(student, project);
        }
        students
    }

    /// Drop a project for the rest of the run. Its members go back to the
    /// unassigned students and are returned.
    pub fn drop_project(&mut self, project: ProjectId) -> Vec<StudentId> {
        assert!(!self.is_dropped(project), "project is dropped already");
        let students = self.clear_assignments_for(project);
        self.dropped[project.0] = true;
        students
    }

    pub fn is_dropped(&self, ProjectId(project): ProjectId) -> bool {
        self.dropped[project]
    }

    pub fn dropped_projects(&self) -> Vec<ProjectId> {
        self.filter_projects(|p| self.is_dropped(p))
    }

    pub fn unassigned_students(&self) -> Vec<StudentId> {
        self.assigned_to
            .iter()
            .enumerate()
            .filter_map(|(id, assignment)| {
                if assignment.is_none() {
                    Some(StudentId(id))
                } else {
                    None
                }
            })
            .collect()
    }

    pub fn size(&self, project: ProjectId) -> usize {
        self.students_for(project).len()
    }

    pub fn capacity(&self, project: ProjectId) -> usize {
        self.project(project).capacity
    }

    pub fn remaining_capacity(&self, project: ProjectId) -> usize {
        self.capacity(project).saturating_sub(self.size(project))
    }

    /// Number of seats over all projects, dropped or not.
    pub fn total_capacity(&self) -> usize {
        self.projects.iter().map(|p| p.capacity).sum()
    }

    /// Check that there are enough seats for all students.
    pub fn check_number_of_seats(&self) -> Result<(), SolverError> {
        let capacity = self.total_capacity();
        if capacity < self.students.len() {
            return Err(SolverError::StructuralInfeasibility {
                capacity,
                students: self.students.len(),
            });
        }
        Ok(())
    }

    /// Number of members per nationality on a project.
    pub fn nationality_tally(&self, project: ProjectId) -> BTreeMap<&str, usize> {
        let mut tally = BTreeMap::new();
        for s in self.roster(project) {
            *tally.entry(s.nationality.as_str()).or_insert(0) += 1;
        }
        tally
    }

    /// Number of members per background on a project. Members without
    /// background information are not counted.
    pub fn background_tally(&self, project: ProjectId) -> BTreeMap<&str, usize> {
        let mut tally = BTreeMap::new();
        for s in self.roster(project) {
            if let Some(background) = &s.background {
                *tally.entry(background.as_str()).or_insert(0) += 1;
            }
        }
        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{project, student};

    #[test]
    fn test_assign_and_drop() {
        let mut pool = AssignmentPool::new(
            vec![student(0, "FR", &[0]), student(1, "DE", &[0, 1])],
            vec![
                project(0, OrgType::Company, 3),
                project(1, OrgType::Institutional, 2),
            ],
        );
        pool.assign_to(StudentId(0), ProjectId(0), Stage::Preference);
        pool.assign_to(StudentId(1), ProjectId(0), Stage::Preference);
        assert_eq!(pool.remaining_capacity(ProjectId(0)), 1);
        assert!(pool.unassigned_students().is_empty());
        assert_eq!(
            pool.outcome(StudentId(1)),
            Outcome::Assigned {
                project: ProjectId(0),
                rank: Some(0),
                stage: Stage::Preference
            }
        );
        let displaced = pool.drop_project(ProjectId(0));
        assert_eq!(displaced, vec![StudentId(0), StudentId(1)]);
        assert!(pool.is_dropped(ProjectId(0)));
        assert_eq!(pool.viable_projects(), vec![ProjectId(1)]);
        assert_eq!(pool.unassigned_students().len(), 2);
        assert_eq!(pool.outcome(StudentId(0)), Outcome::Unassigned);
    }

    #[test]
    #[should_panic(expected = "cannot assign to a dropped project")]
    fn test_no_assignment_to_dropped_project() {
        let mut pool = AssignmentPool::new(
            vec![student(0, "FR", &[0])],
            vec![project(0, OrgType::Company, 3)],
        );
        pool.drop_project(ProjectId(0));
        pool.assign_to(StudentId(0), ProjectId(0), Stage::Balancing);
    }

    #[test]
    fn test_cursor() {
        let mut pool = AssignmentPool::new(
            vec![student(0, "FR", &[1, 0])],
            vec![
                project(0, OrgType::Company, 3),
                project(1, OrgType::Company, 3),
            ],
        );
        assert_eq!(pool.next_choice(StudentId(0)), Some((0, Some(ProjectId(1)))));
        assert_eq!(pool.next_choice(StudentId(0)), Some((1, Some(ProjectId(0)))));
        assert_eq!(pool.next_choice(StudentId(0)), None);
        pool.rewind(StudentId(0));
        assert_eq!(pool.next_choice(StudentId(0)), Some((0, Some(ProjectId(1)))));
    }

    #[test]
    fn test_number_of_seats() {
        let pool = AssignmentPool::new(
            vec![student(0, "FR", &[]), student(1, "FR", &[])],
            vec![project(0, OrgType::Company, 1)],
        );
        assert_eq!(pool.total_capacity(), 1);
        assert_eq!(
            pool.check_number_of_seats(),
            Err(SolverError::StructuralInfeasibility {
                capacity: 1,
                students: 2
            })
        );
    }

    #[test]
    fn test_tallies() {
        let mut a = student(0, "FR", &[0]);
        a.background = Some("CS".into());
        let b = student(1, "FR", &[0]);
        let mut pool = AssignmentPool::new(vec![a, b], vec![project(0, OrgType::Company, 4)]);
        pool.assign_to(StudentId(0), ProjectId(0), Stage::Preference);
        pool.assign_to(StudentId(1), ProjectId(0), Stage::Preference);
        assert_eq!(pool.nationality_tally(ProjectId(0)).get("FR"), Some(&2));
        assert_eq!(pool.background_tally(ProjectId(0)).len(), 1);
    }
}
