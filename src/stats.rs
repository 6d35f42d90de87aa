use crate::model::{AssignmentPool, MAX_PREFERENCES, OrgType, Outcome, ProjectId};
use std::collections::BTreeMap;

/// Composition of a project which has been kept.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectSummary {
    pub project: ProjectId,
    pub name: String,
    pub org_type: OrgType,
    pub size: usize,
    pub capacity: usize,
    /// Members whose preferred organization type is the project's one.
    pub type_matched: usize,
    pub nationalities: BTreeMap<String, usize>,
    pub backgrounds: BTreeMap<String, usize>,
}

impl ProjectSummary {
    pub fn type_match_rate(&self) -> Option<f64> {
        (self.size > 0).then(|| self.type_matched as f64 / self.size as f64)
    }
}

/// Tallies describing how well students have been served.
#[derive(Clone, Debug, PartialEq)]
pub struct FairnessReport {
    pub students: usize,
    /// Number of students placed on each preference rank.
    pub ranks: Vec<usize>,
    /// Students placed on a project they did not rank.
    pub outside_preferences: usize,
    /// Students placed by type fallback or final balancing.
    pub fallback: usize,
    pub unassigned: usize,
    /// Students placed on a project of their preferred organization type.
    pub type_matched: usize,
    pub projects: Vec<ProjectSummary>,
    pub dropped: Vec<String>,
}

impl FairnessReport {
    pub fn new(a: &AssignmentPool) -> FairnessReport {
        let mut report = FairnessReport {
            students: a.students.len(),
            ranks: vec![0; MAX_PREFERENCES],
            outside_preferences: 0,
            fallback: 0,
            unassigned: 0,
            type_matched: 0,
            projects: Vec::new(),
            dropped: a
                .dropped_projects()
                .into_iter()
                .map(|p| a.project(p).name.clone())
                .collect(),
        };
        for s in a.all_students() {
            match a.outcome(s) {
                Outcome::Assigned {
                    project,
                    rank,
                    stage,
                } => {
                    match rank {
                        Some(rank) => {
                            if rank >= report.ranks.len() {
                                report.ranks.resize(rank + 1, 0);
                            }
                            report.ranks[rank] += 1;
                        }
                        None => report.outside_preferences += 1,
                    }
                    if stage.is_fallback() {
                        report.fallback += 1;
                    }
                    if a.project(project).org_type == a.student(s).type_preference {
                        report.type_matched += 1;
                    }
                }
                Outcome::Unassigned => report.unassigned += 1,
            }
        }
        report.projects = a
            .viable_projects()
            .into_iter()
            .map(|p| {
                let project = a.project(p);
                ProjectSummary {
                    project: p,
                    name: project.name.clone(),
                    org_type: project.org_type,
                    size: a.size(p),
                    capacity: project.capacity,
                    type_matched: a
                        .roster(p)
                        .iter()
                        .filter(|s| s.type_preference == project.org_type)
                        .count(),
                    nationalities: owned(a.nationality_tally(p)),
                    backgrounds: owned(a.background_tally(p)),
                }
            })
            .collect();
        report
    }

    pub fn assigned(&self) -> usize {
        self.students - self.unassigned
    }
}

fn owned(tally: BTreeMap<&str, usize>) -> BTreeMap<String, usize> {
    tally.into_iter().map(|(k, v)| (k.to_owned(), v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{project, student};
    use crate::model::{Stage, StudentId};

    #[test]
    fn test_report() {
        let mut institutional = student(2, "FR", &[]);
        institutional.type_preference = OrgType::Institutional;
        let mut pool = AssignmentPool::new(
            vec![
                student(0, "FR", &[0]),
                student(1, "DE", &[1, 0]),
                institutional,
                student(3, "IT", &[0]),
            ],
            vec![
                project(0, OrgType::Company, 4),
                project(1, OrgType::Company, 4),
            ],
        );
        pool.assign_to(StudentId(0), ProjectId(0), Stage::Preference);
        pool.assign_to(StudentId(1), ProjectId(0), Stage::Reassigned);
        pool.assign_to(StudentId(2), ProjectId(0), Stage::Balancing);
        pool.drop_project(ProjectId(1));
        let report = FairnessReport::new(&pool);
        assert_eq!(report.ranks, vec![1, 1, 0, 0, 0]);
        assert_eq!(report.outside_preferences, 1);
        assert_eq!(report.fallback, 1);
        assert_eq!(report.unassigned, 1);
        assert_eq!(report.assigned(), 3);
        assert_eq!(report.type_matched, 2);
        assert_eq!(report.dropped, vec!["p1".to_owned()]);
        assert_eq!(report.projects.len(), 1);
        let summary = &report.projects[0];
        assert_eq!(summary.size, 3);
        assert_eq!(summary.nationalities.get("FR"), Some(&2));
        assert_eq!(summary.type_match_rate(), Some(2.0 / 3.0));
    }
}
