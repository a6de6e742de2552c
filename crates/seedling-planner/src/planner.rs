//! The simple planner: expands an instruction tree into a seed trajectory.
//!
//! Planning is a depth-first fold over the tree. The accumulator is the last
//! authored waypoint, starting from the resolved start state. Every plan
//! instruction becomes a child composite of moves ending at its target;
//! nested composites keep their place and metadata. Any error raised while
//! expanding is reported once, in [`SimplePlanner::solve`], as
//! `ErrorInvalidInput`.

use std::sync::Arc;

use tracing::{debug, error, warn};

use seedling_core::config::{DEFAULT_PLANNER_NAME, PlannerConfig, ProfileConfig};
use seedling_core::error::{ConfigError, PlanningError};
use seedling_core::types::{
    CompositeInstruction, Instruction, ManipulatorInfo, MotionType, MoveInstruction, PlanInstruction, StateWaypoint,
    Waypoint,
};

use crate::profile::{FixedSizePlanProfile, LvsPlanProfile, PlanProfile, plan_segment};
use crate::registry::{ProfileRegistry, resolve_profile_name};
use crate::request::{PlannerRequest, PlannerResponse};
use crate::status::PlannerStatus;

/// Seed generator driven by named plan profiles.
#[derive(Debug, Clone)]
pub struct SimplePlanner {
    name: String,
    plan_profiles: ProfileRegistry,
}

impl Default for SimplePlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl SimplePlanner {
    /// Planner named `SimplePlanner` with the default LVS profile.
    pub fn new() -> Self {
        Self::with_name(DEFAULT_PLANNER_NAME)
    }

    /// The name keys this planner's entries in a request's remapping table.
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            plan_profiles: ProfileRegistry::new(),
        }
    }

    /// Build a planner and register every profile in `config`.
    pub fn from_config(config: &PlannerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut planner = Self::with_name(config.name.clone());
        for (name, profile) in &config.profiles {
            let profile: Arc<dyn PlanProfile> = match profile {
                ProfileConfig::Lvs(lvs) => Arc::new(LvsPlanProfile::new(lvs.clone())),
                ProfileConfig::FixedSize(fixed) => Arc::new(FixedSizePlanProfile::new(fixed.clone())),
            };
            planner.register_profile(name.clone(), profile);
        }
        debug!(planner = %planner.name, profiles = ?planner.plan_profiles.names(), "planner configured");
        Ok(planner)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn profiles(&self) -> &ProfileRegistry {
        &self.plan_profiles
    }

    /// Register or replace a named profile. Not for use during `solve`.
    pub fn register_profile(&mut self, name: impl Into<String>, profile: Arc<dyn PlanProfile>) {
        self.plan_profiles.register(name, profile);
    }

    /// Planning runs to completion; there is nothing to interrupt.
    pub fn terminate(&self) -> bool {
        warn!(planner = %self.name, "termination of ongoing planning is not implemented");
        false
    }

    /// The planner keeps no per-request state.
    pub fn clear(&self) {}

    // -----------------------------------------------------------------------
    // Solve
    // -----------------------------------------------------------------------

    pub fn solve(&self, request: &PlannerRequest) -> PlannerResponse {
        if request.kinematics.is_none() {
            error!(planner = %self.name, "request has no kinematics provider");
            return PlannerResponse::failure(PlannerStatus::ErrorInvalidInput);
        }
        if request.instructions.is_empty() {
            error!(planner = %self.name, "request has no instructions");
            return PlannerResponse::failure(PlannerStatus::ErrorInvalidInput);
        }

        match self.generate_seed(request) {
            Ok(seed) => {
                debug!(planner = %self.name, moves = seed.flatten_moves().len(), "seed generated");
                PlannerResponse::success(seed)
            }
            Err(err) => {
                error!(planner = %self.name, "failed to generate seed: {err}");
                PlannerResponse::failure(PlannerStatus::ErrorInvalidInput)
            }
        }
    }

    fn generate_seed(&self, request: &PlannerRequest) -> Result<CompositeInstruction, PlanningError> {
        let start = start_instruction(request)?;
        let (seed, _) = self.expand(
            &request.instructions,
            start.waypoint.clone(),
            &ManipulatorInfo::default(),
            request,
        )?;
        Ok(seed.with_start(start))
    }

    /// Expand `composite`, returning its seed and the last authored waypoint.
    fn expand(
        &self,
        composite: &CompositeInstruction,
        mut prev: Waypoint,
        inherited: &ManipulatorInfo,
        request: &PlannerRequest,
    ) -> Result<(CompositeInstruction, Waypoint), PlanningError> {
        let manip_info = inherited.combine(&composite.manipulator_info);
        let mut seed = CompositeInstruction::empty_like(composite);

        for instruction in composite {
            match instruction {
                Instruction::Composite(child) => {
                    let (child_seed, last) = self.expand(child, prev, &manip_info, request)?;
                    seed.push(child_seed);
                    prev = last;
                }
                Instruction::Plan(plan) => {
                    let profile = self.profile_for(plan, request);
                    let moves = plan_segment(profile.as_ref(), &prev, plan, request, &manip_info)?;
                    seed.push(moves);
                    prev = plan.waypoint.clone();
                }
                Instruction::Move(mv) => seed.push(mv.clone()),
            }
        }
        Ok((seed, prev))
    }

    fn profile_for(&self, plan: &PlanInstruction, request: &PlannerRequest) -> Arc<dyn PlanProfile> {
        let name = resolve_profile_name(plan.profile.as_deref(), &self.name, &request.plan_profile_remapping);
        self.plan_profiles.get(&name)
    }
}

// ---------------------------------------------------------------------------
// Start state
// ---------------------------------------------------------------------------

/// Resolve the start move of the seed.
///
/// Joint and state starts are taken as authored. A Cartesian start, or no
/// start at all, uses the environment's current joint values; IK is not run.
fn start_instruction(request: &PlannerRequest) -> Result<MoveInstruction, PlanningError> {
    let root = &request.instructions;
    let manipulator = root
        .manipulator_info
        .manipulator
        .as_deref()
        .ok_or_else(|| PlanningError::MissingManipulator("start".into()))?;
    let fwd = request.kinematics()?.fwd_kin(manipulator)?;
    let names = fwd.joint_names();
    let current = || -> Result<StateWaypoint, PlanningError> {
        let values = request.env_state.joint_values(names)?;
        Ok(StateWaypoint::new(names.to_vec(), values))
    };

    let Some(start) = root.start_instruction.as_deref() else {
        return Ok(MoveInstruction::new(current()?, MotionType::Start));
    };
    let plan = match start {
        Instruction::Plan(plan) if plan.is_start() => plan,
        Instruction::Plan(plan) => {
            return Err(PlanningError::InvalidStartInstruction(format!("{:?} plan", plan.plan_type)));
        }
        Instruction::Move(_) => return Err(PlanningError::InvalidStartInstruction("move".into())),
        Instruction::Composite(_) => return Err(PlanningError::InvalidStartInstruction("composite".into())),
    };

    let waypoint = match &plan.waypoint {
        Waypoint::Joint(joint) => {
            joint.validate()?;
            joint.check_names(names)?;
            StateWaypoint::from(joint.clone())
        }
        Waypoint::State(state) => {
            state.check_names(names)?;
            state.clone()
        }
        Waypoint::Cartesian(_) => current()?,
    };

    let mut start_move = MoveInstruction::new(waypoint, MotionType::Start);
    start_move.manipulator_info = plan.manipulator_info.clone();
    Ok(start_move)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
