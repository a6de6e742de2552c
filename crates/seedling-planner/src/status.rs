use std::fmt;

use serde::{Deserialize, Serialize};

/// Terminal outcome of a planning request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlannerStatus {
    SolutionFound,
    ErrorInvalidInput,
    /// Reserved for planners that can fail after accepting their input.
    FailedToFindValidSolution,
}

impl PlannerStatus {
    pub const fn message(self) -> &'static str {
        match self {
            Self::SolutionFound => "Found valid solution",
            Self::ErrorInvalidInput => {
                "Input to planner is invalid. Check that instructions and seed are compatible"
            }
            Self::FailedToFindValidSolution => "Failed to find valid solution",
        }
    }

    pub const fn is_success(self) -> bool {
        matches!(self, Self::SolutionFound)
    }
}

impl fmt::Display for PlannerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_messages() {
        assert_eq!(PlannerStatus::SolutionFound.to_string(), "Found valid solution");
        assert_eq!(
            PlannerStatus::ErrorInvalidInput.to_string(),
            "Input to planner is invalid. Check that instructions and seed are compatible"
        );
        assert_eq!(
            PlannerStatus::FailedToFindValidSolution.message(),
            "Failed to find valid solution"
        );
    }

    #[test]
    fn only_solution_found_is_success() {
        assert!(PlannerStatus::SolutionFound.is_success());
        assert!(!PlannerStatus::ErrorInvalidInput.is_success());
        assert!(!PlannerStatus::FailedToFindValidSolution.is_success());
    }
}
