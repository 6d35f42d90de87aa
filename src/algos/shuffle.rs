use crate::model::StudentId;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Source of the order in which students are considered.
#[derive(Debug)]
pub enum Shuffle {
    /// Pseudo-random permutation, reproducible for a given seed.
    Seeded(StdRng),
    /// Explicit permutation. Students missing from it come last, in their
    /// original order.
    #[allow(dead_code)]
    Fixed(Vec<StudentId>),
}

impl Shuffle {
    pub fn seeded(seed: u64) -> Self {
        Shuffle::Seeded(StdRng::seed_from_u64(seed))
    }

    #[allow(dead_code)]
    pub fn fixed(order: Vec<StudentId>) -> Self {
        Shuffle::Fixed(order)
    }

    pub fn order(&mut self, mut students: Vec<StudentId>) -> Vec<StudentId> {
        match self {
            Shuffle::Seeded(rng) => {
                students.shuffle(rng);
                students
            }
            Shuffle::Fixed(order) => {
                let mut result = order
                    .iter()
                    .copied()
                    .filter(|s| students.contains(s))
                    .collect::<Vec<_>>();
                students.retain(|s| !result.contains(s));
                result.extend(students);
                result
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<StudentId> {
        (0..n).map(StudentId).collect()
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let a = Shuffle::seeded(42).order(ids(20));
        let b = Shuffle::seeded(42).order(ids(20));
        assert_eq!(a, b);
        let mut sorted = a.clone();
        sorted.sort();
        assert_eq!(sorted, ids(20));
    }

    #[test]
    fn test_fixed_order() {
        let order = Shuffle::fixed(vec![StudentId(2), StudentId(0), StudentId(7)]).order(ids(4));
        assert_eq!(
            order,
            vec![StudentId(2), StudentId(0), StudentId(1), StudentId(3)]
        );
    }
}
