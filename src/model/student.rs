use super::{OrgType, ProjectId, Slots};
use std::fmt;

/// Number of ranked preferences a student may express.
pub const MAX_PREFERENCES: usize = 5;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct StudentId(pub usize);

#[derive(Clone, Debug)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub nationality: String,
    pub background: Option<String>,
    pub slots: Option<Slots>,
    /// Ranked preferences, keeping their original positions. Entries which
    /// did not name a known project are `None`.
    pub rankings: Vec<Option<ProjectId>>,
    pub type_preference: OrgType,
}

impl Student {
    pub fn rank_of(&self, project: ProjectId) -> Option<usize> {
        self.rankings.iter().position(|&p| p == Some(project))
    }

    /// Known projects in preference order, with their rank.
    pub fn preferences(&self) -> impl Iterator<Item = (usize, ProjectId)> + '_ {
        self.rankings
            .iter()
            .enumerate()
            .filter_map(|(rank, p)| p.map(|p| (rank, p)))
    }

    /// Availability used by the overlap rule. A student who did not
    /// declare any slot is available at all times.
    pub fn availability(&self) -> Slots {
        self.slots.unwrap_or(Slots::ALL)
    }

    pub fn is_lazy(&self) -> bool {
        self.rankings.iter().all(Option::is_none)
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_keeps_positions() {
        let s = Student {
            id: StudentId(0),
            name: "Ada".into(),
            nationality: "FR".into(),
            background: None,
            slots: None,
            rankings: vec![None, Some(ProjectId(3)), None, Some(ProjectId(1))],
            type_preference: OrgType::Company,
        };
        assert_eq!(s.rank_of(ProjectId(3)), Some(1));
        assert_eq!(s.rank_of(ProjectId(1)), Some(3));
        assert_eq!(s.rank_of(ProjectId(0)), None);
        assert_eq!(
            s.preferences().collect::<Vec<_>>(),
            vec![(1, ProjectId(3)), (3, ProjectId(1))]
        );
        assert!(!s.is_lazy());
        assert_eq!(s.availability(), Slots::ALL);
    }
}
