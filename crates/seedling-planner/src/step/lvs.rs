//! Longest-valid-segment interpolation.
//!
//! The step count of a segment is the largest of
//!
//! * `floor(translation / translation_lvs) + 1`
//! * `floor(rotation / rotation_lvs) + 1`
//! * `floor(|q2 - q1| / state_lvs) + 1`, when both ends have joint values
//! * `min_steps`
//!
//! Translation and rotation are measured between the two endpoint poses in
//! the chain's base frame. When IK finds no joint values for a Cartesian
//! endpoint the joint term is skipped and the segment holds a known state for
//! the derived count. Such a run is a placeholder, not a path.

use nalgebra::DVector;

use seedling_core::config::LvsProfileConfig;
use seedling_core::error::PlanningError;
use seedling_core::types::{CartesianWaypoint, JointWaypoint, ManipulatorInfo, PlanInstruction, Pose};

use super::{
    KinematicContext, PairResolution, StepResult, bounded, closest_solution, emit_held, emit_states,
    move_type_for, resolve_pair, steps_for,
};
use crate::interpolate::interpolate_joints;
use crate::request::PlannerRequest;

/// Steps demanded by the Cartesian distance between two poses.
pub fn cartesian_steps(p1: &Pose, p2: &Pose, config: &LvsProfileConfig) -> Result<usize, PlanningError> {
    let translation = (p2.translation.vector - p1.translation.vector).norm();
    let rotation = p1.rotation.angle_to(&p2.rotation);
    Ok(steps_for(translation, config.translation_longest_valid_segment_length)?
        .max(steps_for(rotation, config.rotation_longest_valid_segment_length)?))
}

/// Steps demanded by the joint-space distance between two states.
pub fn joint_steps(j1: &DVector<f64>, j2: &DVector<f64>, config: &LvsProfileConfig) -> Result<usize, PlanningError> {
    steps_for((j2 - j1).norm(), config.state_longest_valid_segment_length)
}

pub fn joint_joint(
    start: &JointWaypoint,
    end: &JointWaypoint,
    base: &PlanInstruction,
    request: &PlannerRequest,
    manip_info: &ManipulatorInfo,
    config: &LvsProfileConfig,
) -> StepResult {
    config.validate()?;
    let move_type = move_type_for(base)?;
    let ctx = KinematicContext::forward(request, manip_info, base)?;
    let j1 = ctx.joints_of(start)?;
    let j2 = ctx.joints_of(end)?;

    let p1 = ctx.world_tool_pose(&j1)?;
    let p2 = ctx.world_tool_pose(&j2)?;
    let steps = bounded(
        cartesian_steps(&p1, &p2, config)?
            .max(joint_steps(&j1, &j2, config)?)
            .max(config.min_steps),
    )?;

    Ok(emit_states(ctx.joint_names(), &interpolate_joints(&j1, &j2, steps), move_type, base))
}

pub fn joint_cart(
    start: &JointWaypoint,
    end: &CartesianWaypoint,
    base: &PlanInstruction,
    request: &PlannerRequest,
    manip_info: &ManipulatorInfo,
    config: &LvsProfileConfig,
) -> StepResult {
    config.validate()?;
    let move_type = move_type_for(base)?;
    let ctx = KinematicContext::with_inverse(request, manip_info, base)?;
    let j1 = ctx.joints_of(start)?;

    // Both poses as base-frame flange poses so they compare like for like.
    let p1 = ctx.base_pose(&j1)?;
    let p2 = ctx.to_base_flange(&end.pose);
    let mut steps = cartesian_steps(&p1, &p2, config)?;

    let solutions = ctx.solve_ik(&p2, &j1)?;
    let j2 = closest_solution(&solutions, &j1);
    if let Some(j2) = j2 {
        steps = steps.max(joint_steps(&j1, j2, config)?);
    }
    steps = bounded(steps.max(config.min_steps))?;

    Ok(match j2 {
        Some(j2) => emit_states(ctx.joint_names(), &interpolate_joints(&j1, j2, steps), move_type, base),
        None => emit_held(ctx.joint_names(), &j1, steps, move_type, base),
    })
}

pub fn cart_joint(
    start: &CartesianWaypoint,
    end: &JointWaypoint,
    base: &PlanInstruction,
    request: &PlannerRequest,
    manip_info: &ManipulatorInfo,
    config: &LvsProfileConfig,
) -> StepResult {
    config.validate()?;
    let move_type = move_type_for(base)?;
    let ctx = KinematicContext::with_inverse(request, manip_info, base)?;
    let j2 = ctx.joints_of(end)?;

    let p1 = ctx.to_base_flange(&start.pose);
    let p2 = ctx.base_pose(&j2)?;
    let mut steps = cartesian_steps(&p1, &p2, config)?;

    let solutions = ctx.solve_ik(&p1, &j2)?;
    let j1 = closest_solution(&solutions, &j2);
    if let Some(j1) = j1 {
        steps = steps.max(joint_steps(j1, &j2, config)?);
    }
    steps = bounded(steps.max(config.min_steps))?;

    Ok(match j1 {
        Some(j1) => emit_states(ctx.joint_names(), &interpolate_joints(j1, &j2, steps), move_type, base),
        None => emit_held(ctx.joint_names(), &j2, steps, move_type, base),
    })
}

/// Both poses are solved from the current environment state; the pair of
/// solutions closest to each other is interpolated.
pub fn cart_cart(
    start: &CartesianWaypoint,
    end: &CartesianWaypoint,
    base: &PlanInstruction,
    request: &PlannerRequest,
    manip_info: &ManipulatorInfo,
    config: &LvsProfileConfig,
) -> StepResult {
    config.validate()?;
    let move_type = move_type_for(base)?;
    let ctx = KinematicContext::with_inverse(request, manip_info, base)?;
    let seed = ctx.env_seed(request)?;

    let p1 = ctx.to_base_flange(&start.pose);
    let p2 = ctx.to_base_flange(&end.pose);
    let first = ctx.solve_ik(&p1, &seed)?;
    let second = ctx.solve_ik(&p2, &seed)?;

    let mut steps = cartesian_steps(&p1, &p2, config)?;
    let resolution = resolve_pair(&first, &second, &seed);
    if let PairResolution::Both(j1, j2) = &resolution {
        steps = steps.max(joint_steps(j1, j2, config)?);
    }
    steps = bounded(steps.max(config.min_steps))?;

    Ok(match resolution {
        PairResolution::Both(j1, j2) => {
            emit_states(ctx.joint_names(), &interpolate_joints(&j1, &j2, steps), move_type, base)
        }
        PairResolution::Hold(state) => emit_held(ctx.joint_names(), &state, steps, move_type, base),
    })
}

// ---------------------------------------------------------------------------
// Cartesian-space variants
// ---------------------------------------------------------------------------

/// Pose-space LVS. Not available: every entry point fails immediately.
pub mod cartesian {
    use seedling_core::config::LvsProfileConfig;
    use seedling_core::error::PlanningError;
    use seedling_core::types::{CartesianWaypoint, JointWaypoint, ManipulatorInfo, PlanInstruction};

    use super::super::StepResult;
    use crate::request::PlannerRequest;

    const UNAVAILABLE: &str = "LVS interpolation in Cartesian space";

    pub fn joint_joint(
        _start: &JointWaypoint,
        _end: &JointWaypoint,
        _base: &PlanInstruction,
        _request: &PlannerRequest,
        _manip_info: &ManipulatorInfo,
        _config: &LvsProfileConfig,
    ) -> StepResult {
        Err(PlanningError::NotImplemented(UNAVAILABLE))
    }

    pub fn joint_cart(
        _start: &JointWaypoint,
        _end: &CartesianWaypoint,
        _base: &PlanInstruction,
        _request: &PlannerRequest,
        _manip_info: &ManipulatorInfo,
        _config: &LvsProfileConfig,
    ) -> StepResult {
        Err(PlanningError::NotImplemented(UNAVAILABLE))
    }

    pub fn cart_joint(
        _start: &CartesianWaypoint,
        _end: &JointWaypoint,
        _base: &PlanInstruction,
        _request: &PlannerRequest,
        _manip_info: &ManipulatorInfo,
        _config: &LvsProfileConfig,
    ) -> StepResult {
        Err(PlanningError::NotImplemented(UNAVAILABLE))
    }

    pub fn cart_cart(
        _start: &CartesianWaypoint,
        _end: &CartesianWaypoint,
        _base: &PlanInstruction,
        _request: &PlannerRequest,
        _manip_info: &ManipulatorInfo,
        _config: &LvsProfileConfig,
    ) -> StepResult {
        Err(PlanningError::NotImplemented(UNAVAILABLE))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
