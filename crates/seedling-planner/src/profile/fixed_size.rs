use seedling_core::config::{FixedSizeProfileConfig, InterpolationSpace};
use seedling_core::types::{CartesianWaypoint, JointWaypoint, ManipulatorInfo, PlanInstruction};

use super::PlanProfile;
use crate::request::PlannerRequest;
use crate::step::{StepResult, fixed_size};

/// Profile with a constant step count per motion type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedSizePlanProfile {
    pub config: FixedSizeProfileConfig,
}

impl FixedSizePlanProfile {
    pub const fn new(config: FixedSizeProfileConfig) -> Self {
        Self { config }
    }

    pub fn with_steps(freespace_steps: usize, linear_steps: usize) -> Self {
        Self::new(FixedSizeProfileConfig {
            freespace_steps,
            linear_steps,
            ..FixedSizeProfileConfig::default()
        })
    }

    const fn cartesian_linear(&self) -> bool {
        matches!(self.config.linear_space, InterpolationSpace::Cartesian)
    }
}

impl PlanProfile for FixedSizePlanProfile {
    fn linear_joint_joint(
        &self,
        start: &JointWaypoint,
        end: &JointWaypoint,
        base: &PlanInstruction,
        request: &PlannerRequest,
        manip_info: &ManipulatorInfo,
    ) -> StepResult {
        let steps = self.config.linear_steps;
        if self.cartesian_linear() {
            fixed_size::cartesian::joint_joint(start, end, base, request, manip_info, steps)
        } else {
            fixed_size::joint_joint(start, end, base, request, manip_info, steps)
        }
    }

    fn linear_joint_cart(
        &self,
        start: &JointWaypoint,
        end: &CartesianWaypoint,
        base: &PlanInstruction,
        request: &PlannerRequest,
        manip_info: &ManipulatorInfo,
    ) -> StepResult {
        let steps = self.config.linear_steps;
        if self.cartesian_linear() {
            fixed_size::cartesian::joint_cart(start, end, base, request, manip_info, steps)
        } else {
            fixed_size::joint_cart(start, end, base, request, manip_info, steps)
        }
    }

    fn linear_cart_joint(
        &self,
        start: &CartesianWaypoint,
        end: &JointWaypoint,
        base: &PlanInstruction,
        request: &PlannerRequest,
        manip_info: &ManipulatorInfo,
    ) -> StepResult {
        let steps = self.config.linear_steps;
        if self.cartesian_linear() {
            fixed_size::cartesian::cart_joint(start, end, base, request, manip_info, steps)
        } else {
            fixed_size::cart_joint(start, end, base, request, manip_info, steps)
        }
    }

    fn linear_cart_cart(
        &self,
        start: &CartesianWaypoint,
        end: &CartesianWaypoint,
        base: &PlanInstruction,
        request: &PlannerRequest,
        manip_info: &ManipulatorInfo,
    ) -> StepResult {
        let steps = self.config.linear_steps;
        if self.cartesian_linear() {
            fixed_size::cartesian::cart_cart(start, end, base, request, manip_info, steps)
        } else {
            fixed_size::cart_cart(start, end, base, request, manip_info, steps)
        }
    }

    fn freespace_joint_joint(
        &self,
        start: &JointWaypoint,
        end: &JointWaypoint,
        base: &PlanInstruction,
        request: &PlannerRequest,
        manip_info: &ManipulatorInfo,
    ) -> StepResult {
        fixed_size::joint_joint(start, end, base, request, manip_info, self.config.freespace_steps)
    }

    fn freespace_joint_cart(
        &self,
        start: &JointWaypoint,
        end: &CartesianWaypoint,
        base: &PlanInstruction,
        request: &PlannerRequest,
        manip_info: &ManipulatorInfo,
    ) -> StepResult {
        fixed_size::joint_cart(start, end, base, request, manip_info, self.config.freespace_steps)
    }

    fn freespace_cart_joint(
        &self,
        start: &CartesianWaypoint,
        end: &JointWaypoint,
        base: &PlanInstruction,
        request: &PlannerRequest,
        manip_info: &ManipulatorInfo,
    ) -> StepResult {
        fixed_size::cart_joint(start, end, base, request, manip_info, self.config.freespace_steps)
    }

    fn freespace_cart_cart(
        &self,
        start: &CartesianWaypoint,
        end: &CartesianWaypoint,
        base: &PlanInstruction,
        request: &PlannerRequest,
        manip_info: &ManipulatorInfo,
    ) -> StepResult {
        fixed_size::cart_cart(start, end, base, request, manip_info, self.config.freespace_steps)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use seedling_core::types::{MotionType, Pose, Waypoint};
    use seedling_test_utils::{MANIPULATOR, env_state, joint_waypoint, stub_provider};

    use super::*;

    fn request() -> PlannerRequest {
        PlannerRequest::new(Default::default(), env_state(&[0.0; 3], Pose::identity()))
            .with_kinematics(Arc::new(stub_provider(3)))
    }

    #[test]
    fn motion_type_picks_step_count() {
        let profile = FixedSizePlanProfile::with_steps(3, 7);
        let start = joint_waypoint(&[0.0, 0.0, 0.0]);
        let end = joint_waypoint(&[1.0, 0.0, 0.0]);
        let info = ManipulatorInfo::new(MANIPULATOR);

        let base = PlanInstruction::new(end.clone(), MotionType::Freespace);
        let out = profile.freespace_joint_joint(&start, &end, &base, &request(), &info).unwrap();
        assert_eq!(out.len(), 3);

        let base = PlanInstruction::new(end.clone(), MotionType::Linear);
        let out = profile.linear_joint_joint(&start, &end, &base, &request(), &info).unwrap();
        assert_eq!(out.len(), 7);
    }

    #[test]
    fn cartesian_linear_space_emits_poses() {
        let profile = FixedSizePlanProfile::new(FixedSizeProfileConfig {
            linear_steps: 4,
            linear_space: InterpolationSpace::Cartesian,
            ..FixedSizeProfileConfig::default()
        });
        let start = joint_waypoint(&[0.0, 0.0, 0.0]);
        let end = CartesianWaypoint::new(Pose::translation(0.4, 0.0, 0.0));
        let base = PlanInstruction::new(end.clone(), MotionType::Linear);
        let info = ManipulatorInfo::new(MANIPULATOR);

        let out = profile.linear_joint_cart(&start, &end, &base, &request(), &info).unwrap();
        assert_eq!(out.len(), 4);
        assert!(out.flatten_moves().iter().all(|mv| matches!(mv.waypoint, Waypoint::Cartesian(_))));
    }
}
