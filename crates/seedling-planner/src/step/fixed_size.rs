//! Fixed-size interpolation: every segment gets exactly `steps` moves.
//!
//! Cartesian endpoints are resolved through IK first and the segment is then
//! interpolated in joint space. The [`cartesian`] variants interpolate the
//! tool pose directly and emit Cartesian waypoints instead.

use seedling_core::types::{CartesianWaypoint, JointWaypoint, ManipulatorInfo, PlanInstruction};

use super::{
    KinematicContext, PairResolution, StepResult, bounded, closest_solution, emit_held, emit_states,
    move_type_for, resolve_pair,
};
use crate::interpolate::interpolate_joints;
use crate::request::PlannerRequest;

pub fn joint_joint(
    start: &JointWaypoint,
    end: &JointWaypoint,
    base: &PlanInstruction,
    request: &PlannerRequest,
    manip_info: &ManipulatorInfo,
    steps: usize,
) -> StepResult {
    let move_type = move_type_for(base)?;
    let steps = bounded(steps)?;
    let ctx = KinematicContext::forward(request, manip_info, base)?;
    let j1 = ctx.joints_of(start)?;
    let j2 = ctx.joints_of(end)?;

    let states = interpolate_joints(&j1, &j2, steps);
    Ok(emit_states(ctx.joint_names(), &states, move_type, base))
}

/// The end pose is solved with the start as IK seed; the solution closest
/// to the start wins. Without a solution the start is held.
pub fn joint_cart(
    start: &JointWaypoint,
    end: &CartesianWaypoint,
    base: &PlanInstruction,
    request: &PlannerRequest,
    manip_info: &ManipulatorInfo,
    steps: usize,
) -> StepResult {
    let move_type = move_type_for(base)?;
    let steps = bounded(steps)?;
    let ctx = KinematicContext::with_inverse(request, manip_info, base)?;
    let j1 = ctx.joints_of(start)?;

    let solutions = ctx.solve_ik(&ctx.to_base_flange(&end.pose), &j1)?;
    Ok(match closest_solution(&solutions, &j1) {
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
    steps: usize,
) -> StepResult {
    let move_type = move_type_for(base)?;
    let steps = bounded(steps)?;
    let ctx = KinematicContext::with_inverse(request, manip_info, base)?;
    let j2 = ctx.joints_of(end)?;

    let solutions = ctx.solve_ik(&ctx.to_base_flange(&start.pose), &j2)?;
    Ok(match closest_solution(&solutions, &j2) {
        Some(j1) => emit_states(ctx.joint_names(), &interpolate_joints(j1, &j2, steps), move_type, base),
        None => emit_held(ctx.joint_names(), &j2, steps, move_type, base),
    })
}

/// Both poses are solved from the current environment state.
pub fn cart_cart(
    start: &CartesianWaypoint,
    end: &CartesianWaypoint,
    base: &PlanInstruction,
    request: &PlannerRequest,
    manip_info: &ManipulatorInfo,
    steps: usize,
) -> StepResult {
    let move_type = move_type_for(base)?;
    let steps = bounded(steps)?;
    let ctx = KinematicContext::with_inverse(request, manip_info, base)?;
    let seed = ctx.env_seed(request)?;

    let first = ctx.solve_ik(&ctx.to_base_flange(&start.pose), &seed)?;
    let second = ctx.solve_ik(&ctx.to_base_flange(&end.pose), &seed)?;
    Ok(match resolve_pair(&first, &second, &seed) {
        PairResolution::Both(j1, j2) => {
            emit_states(ctx.joint_names(), &interpolate_joints(&j1, &j2, steps), move_type, base)
        }
        PairResolution::Hold(state) => emit_held(ctx.joint_names(), &state, steps, move_type, base),
    })
}

// ---------------------------------------------------------------------------
// Cartesian-space variants
// ---------------------------------------------------------------------------

/// Interpolate world-frame tool poses and emit Cartesian waypoints.
pub mod cartesian {
    use seedling_core::types::{CartesianWaypoint, JointWaypoint, ManipulatorInfo, PlanInstruction};

    use super::super::{KinematicContext, StepResult, bounded, emit_poses, move_type_for};
    use crate::interpolate::interpolate_poses;
    use crate::request::PlannerRequest;

    pub fn joint_joint(
        start: &JointWaypoint,
        end: &JointWaypoint,
        base: &PlanInstruction,
        request: &PlannerRequest,
        manip_info: &ManipulatorInfo,
        steps: usize,
    ) -> StepResult {
        let move_type = move_type_for(base)?;
        let steps = bounded(steps)?;
        let ctx = KinematicContext::forward(request, manip_info, base)?;
        let p1 = ctx.world_tool_pose(&ctx.joints_of(start)?)?;
        let p2 = ctx.world_tool_pose(&ctx.joints_of(end)?)?;
        Ok(emit_poses(&interpolate_poses(&p1, &p2, steps), move_type, base))
    }

    pub fn joint_cart(
        start: &JointWaypoint,
        end: &CartesianWaypoint,
        base: &PlanInstruction,
        request: &PlannerRequest,
        manip_info: &ManipulatorInfo,
        steps: usize,
    ) -> StepResult {
        let move_type = move_type_for(base)?;
        let steps = bounded(steps)?;
        let ctx = KinematicContext::forward(request, manip_info, base)?;
        let p1 = ctx.world_tool_pose(&ctx.joints_of(start)?)?;
        Ok(emit_poses(&interpolate_poses(&p1, &end.pose, steps), move_type, base))
    }

    pub fn cart_joint(
        start: &CartesianWaypoint,
        end: &JointWaypoint,
        base: &PlanInstruction,
        request: &PlannerRequest,
        manip_info: &ManipulatorInfo,
        steps: usize,
    ) -> StepResult {
        let move_type = move_type_for(base)?;
        let steps = bounded(steps)?;
        let ctx = KinematicContext::forward(request, manip_info, base)?;
        let p2 = ctx.world_tool_pose(&ctx.joints_of(end)?)?;
        Ok(emit_poses(&interpolate_poses(&start.pose, &p2, steps), move_type, base))
    }

    /// Needs no kinematics: both endpoints are already poses.
    pub fn cart_cart(
        start: &CartesianWaypoint,
        end: &CartesianWaypoint,
        base: &PlanInstruction,
        _request: &PlannerRequest,
        _manip_info: &ManipulatorInfo,
        steps: usize,
    ) -> StepResult {
        let move_type = move_type_for(base)?;
        let steps = bounded(steps)?;
        Ok(emit_poses(&interpolate_poses(&start.pose, &end.pose, steps), move_type, base))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
