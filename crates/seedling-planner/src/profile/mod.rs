//! Plan profiles: one strategy per (start kind, end kind, motion type).
//!
//! A segment's endpoints are normalised to [`Endpoint`] first. Resolved
//! states dispatch as joint waypoints, so the nine waypoint pairings collapse
//! onto four strategies per motion type and the match in [`plan_segment`] is
//! exhaustive.

pub mod fixed_size;
pub mod lvs;
pub mod switch;

use std::borrow::Cow;
use std::fmt;

use seedling_core::error::PlanningError;
use seedling_core::types::{CartesianWaypoint, JointWaypoint, ManipulatorInfo, MotionType, PlanInstruction, Waypoint};

use crate::request::PlannerRequest;
use crate::step::StepResult;

pub use fixed_size::FixedSizePlanProfile;
pub use lvs::LvsPlanProfile;
pub use switch::{ProfileSwitch, ProfileSwitchProfile};

// ---------------------------------------------------------------------------
// PlanProfile
// ---------------------------------------------------------------------------

/// Interpolation strategies for every endpoint pairing.
///
/// `base` is the plan instruction being expanded; its waypoint is `end`.
/// `manip_info` is the manipulator inherited from enclosing composites.
pub trait PlanProfile: Send + Sync + fmt::Debug {
    fn linear_joint_joint(
        &self,
        start: &JointWaypoint,
        end: &JointWaypoint,
        base: &PlanInstruction,
        request: &PlannerRequest,
        manip_info: &ManipulatorInfo,
    ) -> StepResult;

    fn linear_joint_cart(
        &self,
        start: &JointWaypoint,
        end: &CartesianWaypoint,
        base: &PlanInstruction,
        request: &PlannerRequest,
        manip_info: &ManipulatorInfo,
    ) -> StepResult;

    fn linear_cart_joint(
        &self,
        start: &CartesianWaypoint,
        end: &JointWaypoint,
        base: &PlanInstruction,
        request: &PlannerRequest,
        manip_info: &ManipulatorInfo,
    ) -> StepResult;

    fn linear_cart_cart(
        &self,
        start: &CartesianWaypoint,
        end: &CartesianWaypoint,
        base: &PlanInstruction,
        request: &PlannerRequest,
        manip_info: &ManipulatorInfo,
    ) -> StepResult;

    fn freespace_joint_joint(
        &self,
        start: &JointWaypoint,
        end: &JointWaypoint,
        base: &PlanInstruction,
        request: &PlannerRequest,
        manip_info: &ManipulatorInfo,
    ) -> StepResult;

    fn freespace_joint_cart(
        &self,
        start: &JointWaypoint,
        end: &CartesianWaypoint,
        base: &PlanInstruction,
        request: &PlannerRequest,
        manip_info: &ManipulatorInfo,
    ) -> StepResult;

    fn freespace_cart_joint(
        &self,
        start: &CartesianWaypoint,
        end: &JointWaypoint,
        base: &PlanInstruction,
        request: &PlannerRequest,
        manip_info: &ManipulatorInfo,
    ) -> StepResult;

    fn freespace_cart_cart(
        &self,
        start: &CartesianWaypoint,
        end: &CartesianWaypoint,
        base: &PlanInstruction,
        request: &PlannerRequest,
        manip_info: &ManipulatorInfo,
    ) -> StepResult;
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// A segment endpoint as the strategies see it.
#[derive(Debug, Clone, PartialEq)]
pub enum Endpoint<'a> {
    Joint(Cow<'a, JointWaypoint>),
    Cartesian(&'a CartesianWaypoint),
}

impl<'a> From<&'a Waypoint> for Endpoint<'a> {
    fn from(wp: &'a Waypoint) -> Self {
        match wp {
            Waypoint::Joint(j) => Self::Joint(Cow::Borrowed(j)),
            Waypoint::State(s) => Self::Joint(Cow::Owned(JointWaypoint::from(s))),
            Waypoint::Cartesian(c) => Self::Cartesian(c),
        }
    }
}

/// Expand the segment from `prev` to `base.waypoint` with `profile`.
pub fn plan_segment(
    profile: &dyn PlanProfile,
    prev: &Waypoint,
    base: &PlanInstruction,
    request: &PlannerRequest,
    manip_info: &ManipulatorInfo,
) -> StepResult {
    use Endpoint::{Cartesian, Joint};

    let start = Endpoint::from(prev);
    let end = Endpoint::from(&base.waypoint);
    let (r, m) = (request, manip_info);

    match (base.plan_type, start, end) {
        (MotionType::Linear, Joint(s), Joint(e)) => profile.linear_joint_joint(&s, &e, base, r, m),
        (MotionType::Linear, Joint(s), Cartesian(e)) => profile.linear_joint_cart(&s, e, base, r, m),
        (MotionType::Linear, Cartesian(s), Joint(e)) => profile.linear_cart_joint(s, &e, base, r, m),
        (MotionType::Linear, Cartesian(s), Cartesian(e)) => profile.linear_cart_cart(s, e, base, r, m),
        (MotionType::Freespace, Joint(s), Joint(e)) => profile.freespace_joint_joint(&s, &e, base, r, m),
        (MotionType::Freespace, Joint(s), Cartesian(e)) => profile.freespace_joint_cart(&s, e, base, r, m),
        (MotionType::Freespace, Cartesian(s), Joint(e)) => profile.freespace_cart_joint(s, &e, base, r, m),
        (MotionType::Freespace, Cartesian(s), Cartesian(e)) => profile.freespace_cart_cart(s, e, base, r, m),
        (MotionType::Start, _, _) => Err(PlanningError::UnsupportedMoveType(MotionType::Start)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use nalgebra::DVector;
    use seedling_core::types::{CompositeInstruction, Pose, StateWaypoint};

    use super::*;

    /// Records which strategy was called.
    #[derive(Debug, Default)]
    struct Recorder {
        calls: Mutex<Vec<&'static str>>,
    }

    impl Recorder {
        fn hit(&self, name: &'static str) -> StepResult {
            self.calls.lock().unwrap().push(name);
            Ok(CompositeInstruction::new())
        }

        fn last(&self) -> &'static str {
            self.calls.lock().unwrap().last().copied().unwrap()
        }
    }

    impl PlanProfile for Recorder {
        fn linear_joint_joint(
            &self,
            _: &JointWaypoint,
            _: &JointWaypoint,
            _: &PlanInstruction,
            _: &PlannerRequest,
            _: &ManipulatorInfo,
        ) -> StepResult {
            self.hit("linear_joint_joint")
        }
        fn linear_joint_cart(
            &self,
            _: &JointWaypoint,
            _: &CartesianWaypoint,
            _: &PlanInstruction,
            _: &PlannerRequest,
            _: &ManipulatorInfo,
        ) -> StepResult {
            self.hit("linear_joint_cart")
        }
        fn linear_cart_joint(
            &self,
            _: &CartesianWaypoint,
            _: &JointWaypoint,
            _: &PlanInstruction,
            _: &PlannerRequest,
            _: &ManipulatorInfo,
        ) -> StepResult {
            self.hit("linear_cart_joint")
        }
        fn linear_cart_cart(
            &self,
            _: &CartesianWaypoint,
            _: &CartesianWaypoint,
            _: &PlanInstruction,
            _: &PlannerRequest,
            _: &ManipulatorInfo,
        ) -> StepResult {
            self.hit("linear_cart_cart")
        }
        fn freespace_joint_joint(
            &self,
            _: &JointWaypoint,
            _: &JointWaypoint,
            _: &PlanInstruction,
            _: &PlannerRequest,
            _: &ManipulatorInfo,
        ) -> StepResult {
            self.hit("freespace_joint_joint")
        }
        fn freespace_joint_cart(
            &self,
            _: &JointWaypoint,
            _: &CartesianWaypoint,
            _: &PlanInstruction,
            _: &PlannerRequest,
            _: &ManipulatorInfo,
        ) -> StepResult {
            self.hit("freespace_joint_cart")
        }
        fn freespace_cart_joint(
            &self,
            _: &CartesianWaypoint,
            _: &JointWaypoint,
            _: &PlanInstruction,
            _: &PlannerRequest,
            _: &ManipulatorInfo,
        ) -> StepResult {
            self.hit("freespace_cart_joint")
        }
        fn freespace_cart_cart(
            &self,
            _: &CartesianWaypoint,
            _: &CartesianWaypoint,
            _: &PlanInstruction,
            _: &PlannerRequest,
            _: &ManipulatorInfo,
        ) -> StepResult {
            self.hit("freespace_cart_cart")
        }
    }

    fn joint() -> Waypoint {
        JointWaypoint::from_slice(&["a"], &[0.0]).into()
    }

    fn state() -> Waypoint {
        StateWaypoint::new(vec!["a".into()], DVector::zeros(1)).into()
    }

    fn cart() -> Waypoint {
        CartesianWaypoint::new(Pose::identity()).into()
    }

    #[test]
    fn every_pairing_reaches_a_strategy() {
        let recorder = Recorder::default();
        let request = PlannerRequest::default();
        let info = ManipulatorInfo::default();

        let cases = [
            (MotionType::Linear, joint(), joint(), "linear_joint_joint"),
            (MotionType::Linear, state(), joint(), "linear_joint_joint"),
            (MotionType::Linear, state(), state(), "linear_joint_joint"),
            (MotionType::Linear, joint(), cart(), "linear_joint_cart"),
            (MotionType::Linear, state(), cart(), "linear_joint_cart"),
            (MotionType::Linear, cart(), state(), "linear_cart_joint"),
            (MotionType::Linear, cart(), cart(), "linear_cart_cart"),
            (MotionType::Freespace, joint(), state(), "freespace_joint_joint"),
            (MotionType::Freespace, state(), cart(), "freespace_joint_cart"),
            (MotionType::Freespace, cart(), joint(), "freespace_cart_joint"),
            (MotionType::Freespace, cart(), cart(), "freespace_cart_cart"),
        ];
        for (motion, prev, target, expected) in cases {
            let base = PlanInstruction::new(target, motion);
            plan_segment(&recorder, &prev, &base, &request, &info).unwrap();
            assert_eq!(recorder.last(), expected);
        }
    }

    #[test]
    fn start_plan_is_rejected() {
        let base = PlanInstruction::new(joint(), MotionType::Start);
        let result = plan_segment(
            &Recorder::default(),
            &joint(),
            &base,
            &PlannerRequest::default(),
            &ManipulatorInfo::default(),
        );
        assert!(matches!(
            result,
            Err(PlanningError::UnsupportedMoveType(MotionType::Start))
        ));
    }

    #[test]
    fn state_endpoint_becomes_owned_joint() {
        let wp = state();
        match Endpoint::from(&wp) {
            Endpoint::Joint(Cow::Owned(j)) => assert_eq!(j.joint_names, ["a"]),
            other => panic!("unexpected endpoint {other:?}"),
        }
    }
}
