use super::Shuffle;
use crate::config::InitialOrder;
use crate::feasibility::FeasibilityChecker;
use crate::model::{AssignmentPool, ProjectId, Stage, StudentId};
use std::cmp::Reverse;
use tracing::{debug, info, instrument, trace};

/// Snapshot of the unassigned students between phases, and the projects
/// dropped for lack of members.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunSummary {
    /// Order in which students have been considered.
    pub order: Vec<StudentId>,
    pub unassigned_after_initial: Vec<StudentId>,
    pub dropped: Vec<ProjectId>,
    /// Students sent back to the pool because their project was dropped.
    pub displaced: Vec<StudentId>,
    pub unassigned_after_reassignment: Vec<StudentId>,
    pub unassigned: Vec<StudentId>,
}

/// Greedy placement in four phases: initial placement on preferences,
/// pruning of undersubscribed projects, reassignment of the students left
/// without a project, and final balancing.
pub struct PlacementEngine<'a> {
    pool: &'a mut AssignmentPool,
    checker: FeasibilityChecker,
    shuffle: Shuffle,
    initial_order: InitialOrder,
    order: Vec<StudentId>,
}

impl<'a> PlacementEngine<'a> {
    pub fn new(
        pool: &'a mut AssignmentPool,
        checker: FeasibilityChecker,
        shuffle: Shuffle,
    ) -> PlacementEngine<'a> {
        PlacementEngine {
            pool,
            checker,
            shuffle,
            initial_order: InitialOrder::default(),
            order: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_initial_order(mut self, initial_order: InitialOrder) -> Self {
        self.initial_order = initial_order;
        self
    }

    #[cfg(test)]
    pub fn get_assignments(&self) -> &AssignmentPool {
        self.pool
    }

    pub fn run(&mut self) -> RunSummary {
        self.initial_placement();
        let unassigned_after_initial = self.pool.unassigned_students();
        let (dropped, displaced) = self.prune_undersubscribed();
        self.reassign();
        let unassigned_after_reassignment = self.pool.unassigned_students();
        self.balance();
        RunSummary {
            order: self.order.clone(),
            unassigned_after_initial,
            dropped,
            displaced,
            unassigned_after_reassignment,
            unassigned: self.pool.unassigned_students(),
        }
    }

    /// Place a student on a project if no constraint forbids it.
    fn try_place(&mut self, student: StudentId, project: ProjectId, stage: Stage) -> bool {
        if self.pool.is_dropped(project) {
            return false;
        }
        let verdict = {
            let roster = self.pool.roster(project);
            self.checker
                .check(self.pool.student(student), self.pool.project(project), &roster)
        };
        match verdict {
            Ok(()) => {
                trace!(
                    student = %self.pool.student(student),
                    project = %self.pool.project(project),
                    %stage,
                    "Assigning student",
                );
                self.pool.assign_to(student, project, stage);
                true
            }
            Err(reason) => {
                trace!(
                    student = %self.pool.student(student),
                    project = %self.pool.project(project),
                    %reason,
                    "Placement rejected",
                );
                false
            }
        }
    }

    /// Try the not yet examined preferences of a student in rank order,
    /// stopping at the first one which accepts it.
    fn place_on_remaining_preferences(&mut self, student: StudentId, stage: Stage) -> bool {
        while let Some((_, choice)) = self.pool.next_choice(student) {
            if let Some(project) = choice {
                if self.try_place(student, project, stage) {
                    return true;
                }
            }
        }
        false
    }

    fn pending(&self) -> Vec<StudentId> {
        self.order
            .iter()
            .copied()
            .filter(|&s| self.pool.project_for(s).is_none())
            .collect()
    }

    /// Shuffle the students and place them on their preferences.
    #[instrument(skip_all)]
    pub fn initial_placement(&mut self) {
        self.order = self.shuffle.order(self.pool.all_students());
        match self.initial_order {
            InitialOrder::Student => {
                for student in self.order.clone() {
                    self.place_on_remaining_preferences(student, Stage::Preference);
                }
            }
            InitialOrder::Rank => {
                let rounds = self
                    .pool
                    .students
                    .iter()
                    .map(|s| s.rankings.len())
                    .max()
                    .unwrap_or(0);
                for rank in 0..rounds {
                    for student in self.pending() {
                        if let Some((_, Some(project))) = self.pool.next_choice(student) {
                            if self.try_place(student, project, Stage::Preference) {
                                trace!(rank = rank + 1, "Placed during rank round");
                            }
                        }
                    }
                }
            }
        }
        info!(
            placed = self.order.len() - self.pending().len(),
            unassigned = self.pending().len(),
            "Initial placement done"
        );
    }

    /// Drop every project below its viability threshold and send its
    /// members back to the pool. Returns the dropped projects and the
    /// displaced students.
    #[instrument(skip_all)]
    pub fn prune_undersubscribed(&mut self) -> (Vec<ProjectId>, Vec<StudentId>) {
        let constraints = self.checker.constraints();
        let (fraction, rounding) = (
            constraints.undersubscription_fraction,
            constraints.rounding,
        );
        let non_viable = self.pool.filter_projects(|p| {
            !self.pool.is_dropped(p)
                && self.pool.size(p)
                    < self.pool.project(p).viability_threshold(fraction, rounding)
        });
        let mut displaced = Vec::new();
        for &project in &non_viable {
            let members = self.pool.drop_project(project);
            info!(
                project = %self.pool.project(project),
                members = members.len(),
                threshold = self.pool.project(project).viability_threshold(fraction, rounding),
                "Dropping undersubscribed project"
            );
            displaced.extend(members);
        }
        displaced.sort();
        (non_viable, displaced)
    }

    /// Place students left without a project on their preferences, then on
    /// a project of their preferred organization type.
    #[instrument(skip_all)]
    pub fn reassign(&mut self) {
        for student in self.pending() {
            self.pool.rewind(student);
            if self.place_on_remaining_preferences(student, Stage::Reassigned) {
                continue;
            }
            let preferred = self.pool.student(student).type_preference;
            let mut candidates = self
                .pool
                .filter_projects(|p| {
                    !self.pool.is_dropped(p) && self.pool.project(p).org_type == preferred
                });
            candidates.sort_by_key(|&p| (Reverse(self.pool.remaining_capacity(p)), p));
            if !candidates
                .into_iter()
                .any(|p| self.try_place(student, p, Stage::TypeFallback))
            {
                debug!(
                    student = %self.pool.student(student),
                    "No project found during reassignment"
                );
            }
        }
        info!(
            unassigned = self.pending().len(),
            "Reassignment done"
        );
    }

    /// Last chance for the remaining students: every viable project is
    /// considered, those of the preferred organization type first.
    #[instrument(skip_all)]
    pub fn balance(&mut self) {
        for student in self.pending() {
            let preferred = self.pool.student(student).type_preference;
            let mut candidates = self.pool.viable_projects();
            candidates.sort_by_key(|&p| {
                (
                    self.pool.project(p).org_type != preferred,
                    Reverse(self.pool.remaining_capacity(p)),
                    p,
                )
            });
            if !candidates
                .into_iter()
                .any(|p| self.try_place(student, p, Stage::Balancing))
            {
                debug!(
                    student = %self.pool.student(student),
                    "Student cannot be placed on any project"
                );
            }
        }
        info!(unassigned = self.pending().len(), "Final balancing done");
    }
}
