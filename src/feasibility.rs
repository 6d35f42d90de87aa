use crate::config::Constraints;
use crate::model::{Project, Student};
use std::fmt;

/// Reason why a student cannot join a project.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Rejection {
    Full,
    Nationality,
    Background,
    Slots,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let reason = match self {
            Rejection::Full => "project is full",
            Rejection::Nationality => "nationality cap reached",
            Rejection::Background => "background cap reached",
            Rejection::Slots => "not enough shared time slots",
        };
        write!(f, "{reason}")
    }
}

/// Decide whether a student may join a roster without breaking any hard
/// constraint. It never modifies anything.
#[derive(Clone, Debug)]
pub struct FeasibilityChecker {
    constraints: Constraints,
}

impl FeasibilityChecker {
    pub fn new(constraints: Constraints) -> Self {
        FeasibilityChecker { constraints }
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    #[allow(dead_code)]
    pub fn can_place(&self, student: &Student, project: &Project, roster: &[&Student]) -> bool {
        self.check(student, project, roster).is_ok()
    }

    /// Checks are made in a fixed order and the first failing one is
    /// reported.
    pub fn check(
        &self,
        student: &Student,
        project: &Project,
        roster: &[&Student],
    ) -> Result<(), Rejection> {
        if roster.len() >= project.capacity {
            return Err(Rejection::Full);
        }
        let same_nationality = roster
            .iter()
            .filter(|m| m.nationality == student.nationality)
            .count();
        if same_nationality + 1 > self.constraints.nationality_cap {
            return Err(Rejection::Nationality);
        }
        if self.constraints.check_background {
            if let Some(background) = &student.background {
                let same_background = roster
                    .iter()
                    .filter(|m| m.background.as_ref() == Some(background))
                    .count();
                if same_background + 1 > self.constraints.background_cap {
                    return Err(Rejection::Background);
                }
            }
        }
        // An empty roster always accepts its first member.
        if self.constraints.check_slots && !roster.is_empty() {
            let shared = roster
                .iter()
                .fold(student.availability(), |acc, m| {
                    acc.intersection(m.availability())
                });
            if shared.len() < self.constraints.min_shared_slots {
                return Err(Rejection::Slots);
            }
        }
        Ok(())
    }
}
