use std::fmt;
use std::sync::Arc;

use seedling_core::config::ProfileRemapping;
use seedling_core::error::PlanningError;
use seedling_core::traits::KinematicsProvider;
use seedling_core::types::{CompositeInstruction, EnvState};

use crate::status::PlannerStatus;

// ---------------------------------------------------------------------------
// PlannerRequest
// ---------------------------------------------------------------------------

/// Everything one planning call reads. Nothing in it is mutated.
#[derive(Clone, Default)]
pub struct PlannerRequest {
    /// The authored program.
    pub instructions: CompositeInstruction,
    /// Snapshot of current joint values and link transforms.
    pub env_state: EnvState,
    pub kinematics: Option<Arc<dyn KinematicsProvider>>,
    /// `remapping[planner_name][profile] = replacement`.
    pub plan_profile_remapping: ProfileRemapping,
}

impl PlannerRequest {
    pub fn new(instructions: CompositeInstruction, env_state: EnvState) -> Self {
        Self {
            instructions,
            env_state,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_kinematics(mut self, kinematics: Arc<dyn KinematicsProvider>) -> Self {
        self.kinematics = Some(kinematics);
        self
    }

    #[must_use]
    pub fn with_remapping(mut self, remapping: ProfileRemapping) -> Self {
        self.plan_profile_remapping = remapping;
        self
    }

    pub fn kinematics(&self) -> Result<&dyn KinematicsProvider, PlanningError> {
        self.kinematics.as_deref().ok_or(PlanningError::MissingKinematics)
    }
}

impl fmt::Debug for PlannerRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlannerRequest")
            .field("instructions", &self.instructions)
            .field("env_state", &self.env_state)
            .field("has_kinematics", &self.kinematics.is_some())
            .field("plan_profile_remapping", &self.plan_profile_remapping)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// PlannerResponse
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct PlannerResponse {
    /// The seed; `None` unless `status` is `SolutionFound`.
    pub results: Option<CompositeInstruction>,
    pub status: PlannerStatus,
}

impl PlannerResponse {
    pub const fn success(results: CompositeInstruction) -> Self {
        Self {
            results: Some(results),
            status: PlannerStatus::SolutionFound,
        }
    }

    pub const fn failure(status: PlannerStatus) -> Self {
        Self { results: None, status }
    }

    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
