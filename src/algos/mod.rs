pub use self::engine::{PlacementEngine, RunSummary};
pub use self::shuffle::Shuffle;

mod engine;
mod shuffle;

use crate::config::{Constraints, InitialOrder};
use crate::error::SolverError;
use crate::feasibility::FeasibilityChecker;
use crate::model::AssignmentPool;

/// Run all placement phases on a fresh pool. The run is refused before
/// any phase when the configuration is invalid or when there are not
/// enough seats for everybody.
pub fn solve(
    pool: &mut AssignmentPool,
    constraints: &Constraints,
    initial_order: InitialOrder,
    shuffle: Shuffle,
) -> Result<RunSummary, SolverError> {
    constraints.validate()?;
    pool.check_number_of_seats()?;
    let checker = FeasibilityChecker::new(constraints.clone());
    Ok(PlacementEngine::new(pool, checker, shuffle)
        .with_initial_order(initial_order)
        .run())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks;
    use crate::model::fixtures::{project, student};
    use crate::model::{OrgType, Project, ProjectId, Rounding, Slots, Student, StudentId};
    use proptest::prelude::*;

    #[test]
    fn test_structural_infeasibility() {
        let mut pool = AssignmentPool::new(
            (0..5).map(|i| student(i, "FR", &[0])).collect(),
            vec![
                project(0, OrgType::Company, 2),
                project(1, OrgType::Company, 2),
            ],
        );
        let result = solve(
            &mut pool,
            &Constraints::default(),
            InitialOrder::Student,
            Shuffle::seeded(42),
        );
        assert_eq!(
            result,
            Err(SolverError::StructuralInfeasibility {
                capacity: 4,
                students: 5
            })
        );
        assert_eq!(pool.unassigned_students().len(), 5);
    }

    #[test]
    fn test_invalid_configuration() {
        let mut pool = AssignmentPool::new(vec![], vec![]);
        let constraints = Constraints {
            nationality_cap: 0,
            ..Constraints::default()
        };
        assert!(matches!(
            solve(
                &mut pool,
                &constraints,
                InitialOrder::Student,
                Shuffle::seeded(42)
            ),
            Err(SolverError::InvalidConfiguration(_))
        ));
    }

    fn population() -> impl Strategy<Value = (Vec<Student>, Vec<Project>)> {
        let projects = prop::collection::vec((any::<bool>(), 1usize..=6), 1..8);
        let students = prop::collection::vec(
            (
                0usize..4,
                prop::option::of(0usize..3),
                prop::option::of(1u32..32),
                prop::collection::vec(0usize..10, 0..=5),
                any::<bool>(),
            ),
            0..40,
        );
        (projects, students).prop_map(|(projects, students)| {
            let mut projects = projects
                .into_iter()
                .enumerate()
                .map(|(id, (company, capacity))| Project {
                    id: ProjectId(id),
                    name: format!("p{id}"),
                    org_type: if company {
                        OrgType::Company
                    } else {
                        OrgType::Institutional
                    },
                    capacity,
                })
                .collect::<Vec<_>>();
            let seats = projects.iter().map(|p| p.capacity).sum::<usize>();
            if seats < students.len() {
                let id = projects.len();
                projects.push(Project {
                    id: ProjectId(id),
                    name: format!("p{id}"),
                    org_type: OrgType::Company,
                    capacity: students.len() - seats,
                });
            }
            let plen = projects.len();
            let students = students
                .into_iter()
                .enumerate()
                .map(|(id, (nationality, background, slots, rankings, company))| {
                    let slots = slots.map(|bits| {
                        let mut s = Slots::empty();
                        for (i, c) in ('A'..='E').enumerate() {
                            if bits & (1 << i) != 0 {
                                s.insert(c).unwrap();
                            }
                        }
                        s
                    });
                    Student {
                        id: StudentId(id),
                        name: format!("s{id}"),
                        nationality: format!("N{nationality}"),
                        background: background.map(|b| format!("B{b}")),
                        slots,
                        rankings: rankings
                            .into_iter()
                            .map(|p| (p < plen).then_some(ProjectId(p)))
                            .collect(),
                        type_preference: if company {
                            OrgType::Company
                        } else {
                            OrgType::Institutional
                        },
                    }
                })
                .collect();
            (students, projects)
        })
    }

    fn constraints() -> impl Strategy<Value = Constraints> {
        (
            1usize..=3,
            any::<bool>(),
            1usize..=3,
            any::<bool>(),
            0usize..=3,
            0.0f64..=1.0,
            any::<bool>(),
        )
            .prop_map(
                |(
                    nationality_cap,
                    check_background,
                    background_cap,
                    check_slots,
                    min_shared_slots,
                    undersubscription_fraction,
                    floor,
                )| Constraints {
                    nationality_cap,
                    check_background,
                    background_cap,
                    check_slots,
                    min_shared_slots,
                    undersubscription_fraction,
                    rounding: if floor { Rounding::Floor } else { Rounding::Ceil },
                },
            )
    }

    fn is_subset(a: &[StudentId], b: &[StudentId]) -> bool {
        a.iter().all(|s| b.contains(s))
    }

    proptest! {
        #[test]
        fn final_state_respects_constraints(
            (students, projects) in population(),
            seed in any::<u64>(),
            rank_major in any::<bool>(),
            constraints in constraints(),
        ) {
            let initial_order = if rank_major { InitialOrder::Rank } else { InitialOrder::Student };
            let mut pool = AssignmentPool::new(students, projects);
            let summary = solve(&mut pool, &constraints, initial_order, Shuffle::seeded(seed)).unwrap();
            let checker = FeasibilityChecker::new(constraints);
            prop_assert!(checks::audit(&pool, &checker).is_empty());
            for &p in &summary.dropped {
                prop_assert!(pool.students_for(p).is_empty());
            }
            prop_assert_eq!(&summary.unassigned, &pool.unassigned_students());
        }

        #[test]
        fn phases_only_resolve(
            (students, projects) in population(),
            seed in any::<u64>(),
        ) {
            let mut pool = AssignmentPool::new(students, projects);
            let summary = solve(
                &mut pool,
                &Constraints::default(),
                InitialOrder::Student,
                Shuffle::seeded(seed),
            ).unwrap();
            let mut reopened = summary.unassigned_after_initial.clone();
            reopened.extend(summary.displaced.iter().copied());
            prop_assert!(is_subset(&summary.unassigned_after_reassignment, &reopened));
            prop_assert!(is_subset(&summary.unassigned, &summary.unassigned_after_reassignment));
        }

        #[test]
        fn unassigned_students_fit_nowhere(
            (students, projects) in population(),
            seed in any::<u64>(),
            constraints in constraints(),
        ) {
            let mut pool = AssignmentPool::new(students, projects);
            let summary = solve(&mut pool, &constraints, InitialOrder::Student, Shuffle::seeded(seed)).unwrap();
            let checker = FeasibilityChecker::new(constraints);
            for &s in &summary.unassigned {
                for p in pool.viable_projects() {
                    prop_assert!(!checker.can_place(pool.student(s), pool.project(p), &pool.roster(p)));
                }
            }
        }

        #[test]
        fn same_seed_same_assignments(
            (students, projects) in population(),
            seed in any::<u64>(),
        ) {
            let run = || {
                let mut pool = AssignmentPool::new(students.clone(), projects.clone());
                solve(&mut pool, &Constraints::default(), InitialOrder::Student, Shuffle::seeded(seed)).unwrap();
                pool.all_students().into_iter().map(|s| pool.outcome(s)).collect::<Vec<_>>()
            };
            prop_assert_eq!(run(), run());
        }
    }
}
