use crate::feasibility::FeasibilityChecker;
use crate::model::{AssignmentPool, ProjectId, StudentId};
use eyre::bail;
use std::fmt;
use tracing::warn;

/// A broken invariant in a final assignment.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Violation {
    OverCapacity(ProjectId),
    Nationality(ProjectId, String),
    Background(ProjectId, String),
    SharedSlots(ProjectId),
    DroppedProjectInUse(ProjectId),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Violation::OverCapacity(p) => write!(f, "project #{} is over capacity", p.0),
            Violation::Nationality(p, n) => {
                write!(f, "project #{} has too many members of nationality {n}", p.0)
            }
            Violation::Background(p, b) => {
                write!(f, "project #{} has too many members with background {b}", p.0)
            }
            Violation::SharedSlots(p) => {
                write!(f, "project #{} members do not share enough time slots", p.0)
            }
            Violation::DroppedProjectInUse(p) => {
                write!(f, "dropped project #{} still has members", p.0)
            }
        }
    }
}

/// Verify every roster against the hard constraints.
pub fn audit(a: &AssignmentPool, checker: &FeasibilityChecker) -> Vec<Violation> {
    let constraints = checker.constraints();
    let mut violations = Vec::new();
    for p in a.all_projects() {
        if a.is_dropped(p) {
            if !a.students_for(p).is_empty() {
                violations.push(Violation::DroppedProjectInUse(p));
            }
            continue;
        }
        if a.size(p) > a.capacity(p) {
            violations.push(Violation::OverCapacity(p));
        }
        for (nationality, &n) in &a.nationality_tally(p) {
            if n > constraints.nationality_cap {
                violations.push(Violation::Nationality(p, (*nationality).to_owned()));
            }
        }
        if constraints.check_background {
            for (background, &n) in &a.background_tally(p) {
                if n > constraints.background_cap {
                    violations.push(Violation::Background(p, (*background).to_owned()));
                }
            }
        }
        let roster = a.roster(p);
        if constraints.check_slots && roster.len() >= 2 {
            let shared = roster
                .iter()
                .skip(1)
                .fold(roster[0].availability(), |acc, s| {
                    acc.intersection(s.availability())
                });
            if shared.len() < constraints.min_shared_slots {
                violations.push(Violation::SharedSlots(p));
            }
        }
    }
    violations
}

/// Fail if any roster breaks a hard constraint.
pub fn ensure_consistent(a: &AssignmentPool, checker: &FeasibilityChecker) -> eyre::Result<()> {
    let violations = audit(a, checker);
    if let Some(first) = violations.first() {
        for v in &violations {
            warn!(violation = %v, "Inconsistent assignment");
        }
        bail!("{} constraint violations, first one: {first}", violations.len());
    }
    Ok(())
}

/// Students who did not get their first choice although it is still
/// running. This is expected when constraints got in the way.
pub fn missed_first_choices(a: &AssignmentPool) -> Vec<StudentId> {
    a.all_students()
        .into_iter()
        .filter(|&s| {
            a.student(s).rankings.first().copied().flatten().is_some_and(|p| {
                !a.is_dropped(p) && a.project_for(s) != Some(p)
            })
        })
        .collect()
}
