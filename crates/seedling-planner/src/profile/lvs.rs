use seedling_core::config::{InterpolationSpace, LvsProfileConfig};
use seedling_core::types::{CartesianWaypoint, JointWaypoint, ManipulatorInfo, PlanInstruction};

use super::PlanProfile;
use crate::request::PlannerRequest;
use crate::step::{StepResult, lvs};

/// Distance-adaptive profile. The planner's built-in default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LvsPlanProfile {
    pub config: LvsProfileConfig,
}

impl LvsPlanProfile {
    pub const fn new(config: LvsProfileConfig) -> Self {
        Self { config }
    }

    const fn cartesian_linear(&self) -> bool {
        matches!(self.config.linear_space, InterpolationSpace::Cartesian)
    }
}

impl PlanProfile for LvsPlanProfile {
    fn linear_joint_joint(
        &self,
        start: &JointWaypoint,
        end: &JointWaypoint,
        base: &PlanInstruction,
        request: &PlannerRequest,
        manip_info: &ManipulatorInfo,
    ) -> StepResult {
        if self.cartesian_linear() {
            lvs::cartesian::joint_joint(start, end, base, request, manip_info, &self.config)
        } else {
            lvs::joint_joint(start, end, base, request, manip_info, &self.config)
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
        if self.cartesian_linear() {
            lvs::cartesian::joint_cart(start, end, base, request, manip_info, &self.config)
        } else {
            lvs::joint_cart(start, end, base, request, manip_info, &self.config)
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
        if self.cartesian_linear() {
            lvs::cartesian::cart_joint(start, end, base, request, manip_info, &self.config)
        } else {
            lvs::cart_joint(start, end, base, request, manip_info, &self.config)
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
        if self.cartesian_linear() {
            lvs::cartesian::cart_cart(start, end, base, request, manip_info, &self.config)
        } else {
            lvs::cart_cart(start, end, base, request, manip_info, &self.config)
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
        lvs::joint_joint(start, end, base, request, manip_info, &self.config)
    }

    fn freespace_joint_cart(
        &self,
        start: &JointWaypoint,
        end: &CartesianWaypoint,
        base: &PlanInstruction,
        request: &PlannerRequest,
        manip_info: &ManipulatorInfo,
    ) -> StepResult {
        lvs::joint_cart(start, end, base, request, manip_info, &self.config)
    }

    fn freespace_cart_joint(
        &self,
        start: &CartesianWaypoint,
        end: &JointWaypoint,
        base: &PlanInstruction,
        request: &PlannerRequest,
        manip_info: &ManipulatorInfo,
    ) -> StepResult {
        lvs::cart_joint(start, end, base, request, manip_info, &self.config)
    }

    fn freespace_cart_cart(
        &self,
        start: &CartesianWaypoint,
        end: &CartesianWaypoint,
        base: &PlanInstruction,
        request: &PlannerRequest,
        manip_info: &ManipulatorInfo,
    ) -> StepResult {
        lvs::cart_cart(start, end, base, request, manip_info, &self.config)
    }
}
