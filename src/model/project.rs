use crate::error::SolverError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ProjectId(pub usize);

/// Kind of organization hosting a project.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum OrgType {
    Company,
    Institutional,
}

impl FromStr for OrgType {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "company" => Ok(OrgType::Company),
            "institutional" | "institution" | "non-company" | "noncompany" => {
                Ok(OrgType::Institutional)
            }
            _ => Err(SolverError::UnknownOrganizationType(s.to_owned())),
        }
    }
}

impl fmt::Display for OrgType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OrgType::Company => write!(f, "Company"),
            OrgType::Institutional => write!(f, "Institutional"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub org_type: OrgType,
    pub capacity: usize,
}

impl Project {
    /// Minimum number of members for the project to be kept after the
    /// initial placement.
    pub fn viability_threshold(&self, fraction: f64, rounding: Rounding) -> usize {
        // Products such as 25 × 0.28 land just above the integer.
        let raw = (self.capacity as f64 * fraction * 1e9).round() / 1e9;
        let rounded = match rounding {
            Rounding::Ceil => raw.ceil(),
            Rounding::Floor => raw.floor(),
        };
        rounded as usize
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// How to round the undersubscription threshold for odd capacities.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rounding {
    #[default]
    Ceil,
    Floor,
}
