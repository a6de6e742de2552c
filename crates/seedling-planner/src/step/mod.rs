//! Step generators: expand one segment between two waypoints into moves.
//!
//! [`fixed_size`] emits a caller-chosen number of steps; [`lvs`] derives the
//! count from translation, rotation and joint-space distance. Both emit
//! `StateWaypoint` moves by default and Cartesian moves from their
//! `cartesian` submodules.

pub mod fixed_size;
pub mod lvs;

use std::sync::Arc;

use nalgebra::DVector;
use tracing::debug;

use seedling_core::error::{KinematicsError, PlanningError};
use seedling_core::traits::{ForwardKinematics, InverseKinematics};
use seedling_core::types::{
    CartesianWaypoint, CompositeInstruction, JointWaypoint, ManipulatorInfo, MotionType, MoveInstruction,
    PlanInstruction, Pose, StateWaypoint, Waypoint,
};

use crate::request::PlannerRequest;

/// Output of every step generator and profile strategy.
pub type StepResult = Result<CompositeInstruction, PlanningError>;

// ---------------------------------------------------------------------------
// KinematicContext
// ---------------------------------------------------------------------------

/// Solvers and frames for the manipulator a segment moves.
///
/// Base-frame poses are expressed in the IK solver's base frame whenever an
/// inverse solver is loaded, since that is the frame IK targets live in.
/// Otherwise the forward solver's base frame is used.
pub(crate) struct KinematicContext {
    fwd: Arc<dyn ForwardKinematics>,
    inv: Option<Arc<dyn InverseKinematics>>,
    world_to_fwd_base: Pose,
    world_to_base: Pose,
    tcp: Pose,
}

impl KinematicContext {
    /// Forward kinematics only; enough when both endpoints are joint-valued.
    pub(crate) fn forward(
        request: &PlannerRequest,
        manip_info: &ManipulatorInfo,
        base: &PlanInstruction,
    ) -> Result<Self, PlanningError> {
        Self::build(request, manip_info, base, false)
    }

    /// Forward and inverse kinematics, with matching joint order enforced.
    pub(crate) fn with_inverse(
        request: &PlannerRequest,
        manip_info: &ManipulatorInfo,
        base: &PlanInstruction,
    ) -> Result<Self, PlanningError> {
        Self::build(request, manip_info, base, true)
    }

    fn build(
        request: &PlannerRequest,
        manip_info: &ManipulatorInfo,
        base: &PlanInstruction,
        need_inverse: bool,
    ) -> Result<Self, PlanningError> {
        let mi = manip_info.combine(&base.manipulator_info);
        let manipulator = mi
            .manipulator
            .as_deref()
            .ok_or_else(|| PlanningError::MissingManipulator(base.description.clone()))?;
        let provider = request.kinematics()?;

        let fwd = provider.fwd_kin(manipulator)?;
        let inv = if need_inverse {
            let inv = provider.inv_kin(manipulator, mi.ik_solver.as_deref())?;
            if inv.joint_names() != fwd.joint_names() {
                return Err(KinematicsError::JointOrderMismatch(manipulator.to_string()).into());
            }
            Some(inv)
        } else {
            None
        };

        let world_to_fwd_base = *request.env_state.link_transform(fwd.base_link_name())?;
        let world_to_base = match &inv {
            Some(inv) => *request.env_state.link_transform(inv.base_link_name())?,
            None => world_to_fwd_base,
        };
        let tcp = provider.find_tcp(&mi)?;
        Ok(Self {
            fwd,
            inv,
            world_to_fwd_base,
            world_to_base,
            tcp,
        })
    }

    pub(crate) fn joint_names(&self) -> &[String] {
        self.fwd.joint_names()
    }

    /// Joint vector of `wp`, after checking it names the chain's joints in order.
    pub(crate) fn joints_of(&self, wp: &JointWaypoint) -> Result<DVector<f64>, PlanningError> {
        wp.validate()?;
        wp.check_names(self.fwd.joint_names())?;
        Ok(wp.position.clone())
    }

    /// Flange pose in the solving base frame.
    pub(crate) fn base_pose(&self, joints: &DVector<f64>) -> Result<Pose, PlanningError> {
        let flange = self.fwd.calc_fwd_kin(joints)?;
        if self.world_to_fwd_base == self.world_to_base {
            return Ok(flange);
        }
        Ok(self.world_to_base.inverse() * self.world_to_fwd_base * flange)
    }

    /// Tool pose in the world frame.
    pub(crate) fn world_tool_pose(&self, joints: &DVector<f64>) -> Result<Pose, PlanningError> {
        Ok(self.world_to_fwd_base * self.fwd.calc_fwd_kin(joints)? * self.tcp)
    }

    /// World-frame tool pose converted to a base-frame flange pose.
    pub(crate) fn to_base_flange(&self, world_tool: &Pose) -> Pose {
        self.world_to_base.inverse() * world_tool * self.tcp.inverse()
    }

    /// IK for a base-frame flange pose. An empty result is not an error.
    pub(crate) fn solve_ik(&self, base_flange: &Pose, seed: &DVector<f64>) -> Result<Vec<DVector<f64>>, PlanningError> {
        let inv = self
            .inv
            .as_ref()
            .ok_or_else(|| KinematicsError::InverseFailed("no inverse solver in context".into()))?;
        let solutions = inv.calc_inv_kin(base_flange, seed)?;
        if solutions.is_empty() {
            debug!(pose = ?base_flange.translation.vector, "no IK solution, holding a known state");
        }
        Ok(solutions)
    }

    /// Current joint values from the environment, in chain order.
    pub(crate) fn env_seed(&self, request: &PlannerRequest) -> Result<DVector<f64>, PlanningError> {
        Ok(request.env_state.joint_values(self.fwd.joint_names())?)
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Move type for the expansion of `base`; only linear and freespace expand.
pub(crate) fn move_type_for(base: &PlanInstruction) -> Result<MotionType, PlanningError> {
    match base.plan_type {
        MotionType::Linear => Ok(MotionType::Linear),
        MotionType::Freespace => Ok(MotionType::Freespace),
        MotionType::Start => Err(PlanningError::UnsupportedMoveType(MotionType::Start)),
    }
}

/// Upper bound on the moves one segment may expand into.
pub const MAX_SEGMENT_STEPS: usize = 1_000_000;

/// `floor(distance / limit) + 1`, bounded by [`MAX_SEGMENT_STEPS`].
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn steps_for(distance: f64, limit: f64) -> Result<usize, PlanningError> {
    let steps = (distance / limit).floor() + 1.0;
    if !steps.is_finite() || steps > MAX_SEGMENT_STEPS as f64 {
        return Err(PlanningError::TooManySteps {
            requested: steps,
            max: MAX_SEGMENT_STEPS,
        });
    }
    Ok(steps as usize)
}

/// Reject step counts above [`MAX_SEGMENT_STEPS`].
#[allow(clippy::cast_precision_loss)]
pub(crate) fn bounded(steps: usize) -> Result<usize, PlanningError> {
    if steps > MAX_SEGMENT_STEPS {
        return Err(PlanningError::TooManySteps {
            requested: steps as f64,
            max: MAX_SEGMENT_STEPS,
        });
    }
    Ok(steps)
}

/// Solution closest to `reference` in joint space. Ties keep the first.
pub fn closest_solution<'a>(solutions: &'a [DVector<f64>], reference: &DVector<f64>) -> Option<&'a DVector<f64>> {
    let mut best: Option<(&DVector<f64>, f64)> = None;
    for solution in solutions {
        let d = (solution - reference).norm();
        if best.is_none_or(|(_, best_d)| d < best_d) {
            best = Some((solution, d));
        }
    }
    best.map(|(solution, _)| solution)
}

/// Pair `(a, b)` minimising `|a - b|` over the product of both sets.
pub fn closest_pair<'a>(
    first: &'a [DVector<f64>],
    second: &'a [DVector<f64>],
) -> Option<(&'a DVector<f64>, &'a DVector<f64>)> {
    let mut best: Option<(&DVector<f64>, &DVector<f64>, f64)> = None;
    for a in first {
        for b in second {
            let d = (b - a).norm();
            if best.is_none_or(|(_, _, best_d)| d < best_d) {
                best = Some((a, b, d));
            }
        }
    }
    best.map(|(a, b, _)| (a, b))
}

/// Outcome of resolving two IK solution sets against each other.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PairResolution {
    /// Both endpoints resolved; the pair closest to each other.
    Both(DVector<f64>, DVector<f64>),
    /// At most one side resolved; hold this state.
    Hold(DVector<f64>),
}

/// Pick endpoints for a Cartesian/Cartesian segment. When one side has no
/// solution, hold the other side's solution closest to `seed`, or `seed`
/// itself when neither side resolved.
pub(crate) fn resolve_pair(first: &[DVector<f64>], second: &[DVector<f64>], seed: &DVector<f64>) -> PairResolution {
    if let Some((a, b)) = closest_pair(first, second) {
        return PairResolution::Both(a.clone(), b.clone());
    }
    let held = closest_solution(first, seed)
        .or_else(|| closest_solution(second, seed))
        .unwrap_or(seed);
    PairResolution::Hold(held.clone())
}

fn push_move(
    composite: &mut CompositeInstruction,
    waypoint: impl Into<Waypoint>,
    move_type: MotionType,
    base: &PlanInstruction,
) {
    composite.push(MoveInstruction::from_plan(waypoint, move_type, base));
}

/// One move per sample after the first.
pub(crate) fn emit_states(
    names: &[String],
    samples: &[DVector<f64>],
    move_type: MotionType,
    base: &PlanInstruction,
) -> CompositeInstruction {
    let mut composite = CompositeInstruction::new();
    for state in samples.iter().skip(1) {
        push_move(&mut composite, StateWaypoint::new(names.to_vec(), state.clone()), move_type, base);
    }
    composite
}

/// `steps` identical moves at `state`, the placeholder when IK found nothing.
pub(crate) fn emit_held(
    names: &[String],
    state: &DVector<f64>,
    steps: usize,
    move_type: MotionType,
    base: &PlanInstruction,
) -> CompositeInstruction {
    let mut composite = CompositeInstruction::new();
    for _ in 0..steps {
        push_move(&mut composite, StateWaypoint::new(names.to_vec(), state.clone()), move_type, base);
    }
    composite
}

/// One Cartesian move per sample after the first.
pub(crate) fn emit_poses(samples: &[Pose], move_type: MotionType, base: &PlanInstruction) -> CompositeInstruction {
    let mut composite = CompositeInstruction::new();
    for pose in samples.iter().skip(1) {
        push_move(&mut composite, CartesianWaypoint::new(*pose), move_type, base);
    }
    composite
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(values: &[f64]) -> DVector<f64> {
        DVector::from_column_slice(values)
    }

    #[test]
    fn steps_for_is_floor_plus_one() {
        assert_eq!(steps_for(0.0, 0.1).unwrap(), 1);
        assert_eq!(steps_for(0.05, 0.1).unwrap(), 1);
        assert_eq!(steps_for(0.25, 0.1).unwrap(), 3);
        assert_eq!(steps_for(0.5, 0.1).unwrap(), 6);
    }

    #[test]
    fn steps_for_rejects_runaway_counts() {
        assert!(matches!(
            steps_for(1.0, 1e-20),
            Err(PlanningError::TooManySteps { max: MAX_SEGMENT_STEPS, .. })
        ));
        assert!(steps_for(0.5, 1e-6).is_ok());
        assert!(steps_for(2.0, 1e-6).is_err());
        assert!(steps_for(f64::NAN, 0.1).is_err());
    }

    #[test]
    fn bounded_caps_step_counts() {
        assert_eq!(bounded(MAX_SEGMENT_STEPS).unwrap(), MAX_SEGMENT_STEPS);
        assert!(bounded(MAX_SEGMENT_STEPS + 1).is_err());
    }

    #[test]
    fn closest_solution_picks_nearest_and_first_on_ties() {
        let reference = v(&[0.0, 0.0]);
        let solutions = [v(&[1.0, 0.0]), v(&[0.2, 0.1]), v(&[-0.2, 0.1])];
        assert_eq!(closest_solution(&solutions, &reference), Some(&solutions[1]));
        assert_eq!(closest_solution(&[], &reference), None);
    }

    #[test]
    fn closest_pair_scans_the_product() {
        let first = [v(&[0.0]), v(&[5.0])];
        let second = [v(&[2.0]), v(&[5.5])];
        let (a, b) = closest_pair(&first, &second).unwrap();
        assert_eq!((a, b), (&first[1], &second[1]));
        assert!(closest_pair(&first, &[]).is_none());
    }

    #[test]
    fn resolve_pair_falls_back_in_order() {
        let seed = v(&[0.0]);
        let near = [v(&[0.1]), v(&[3.0])];
        let far = [v(&[2.9])];

        assert_eq!(
            resolve_pair(&near, &far, &seed),
            PairResolution::Both(v(&[3.0]), v(&[2.9]))
        );
        assert_eq!(resolve_pair(&near, &[], &seed), PairResolution::Hold(v(&[0.1])));
        assert_eq!(resolve_pair(&[], &far, &seed), PairResolution::Hold(v(&[2.9])));
        assert_eq!(resolve_pair(&[], &[], &seed), PairResolution::Hold(seed.clone()));
    }

    #[test]
    fn start_is_not_a_move_type() {
        let base = PlanInstruction::new(JointWaypoint::from_slice(&["a"], &[0.0]), MotionType::Start);
        assert!(matches!(
            move_type_for(&base),
            Err(PlanningError::UnsupportedMoveType(MotionType::Start))
        ));
    }

    #[test]
    fn emitted_moves_copy_plan_metadata() {
        let base = PlanInstruction::new(JointWaypoint::from_slice(&["a"], &[1.0]), MotionType::Linear)
            .with_profile("SLOW")
            .with_description("approach");
        let names = vec!["a".to_string()];
        let held = emit_held(&names, &v(&[0.3]), 3, MotionType::Linear, &base);
        assert_eq!(held.len(), 3);
        for mv in held.flatten_moves() {
            assert_eq!(mv.profile.as_deref(), Some("SLOW"));
            assert_eq!(mv.description, "approach");
            assert_eq!(mv.move_type, MotionType::Linear);
        }
    }
}
