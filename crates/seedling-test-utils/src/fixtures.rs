//! Fixture builders for instructions, environment state and providers.

use nalgebra::DVector;

use seedling_core::types::{EnvState, JointWaypoint, Pose};

use crate::mocks::{StubKinematics, StubProvider};

/// Manipulator name used by every fixture.
pub const MANIPULATOR: &str = "manipulator";

/// Base link of the stub chain.
pub const BASE_LINK: &str = "base_link";

/// `["joint_a1", ..., "joint_a{dof}"]`.
pub fn joint_names(dof: usize) -> Vec<String> {
    (1..=dof).map(|i| format!("joint_a{i}")).collect()
}

/// Joint waypoint over [`joint_names`] with the given values.
pub fn joint_waypoint(values: &[f64]) -> JointWaypoint {
    JointWaypoint::new(joint_names(values.len()), DVector::from_column_slice(values))
}

/// Environment with `values` on [`joint_names`] and the base link at `base`.
pub fn env_state(values: &[f64], base: Pose) -> EnvState {
    joint_names(values.len())
        .into_iter()
        .zip(values)
        .fold(EnvState::new(), |env, (name, &value)| env.with_joint(name, value))
        .with_link_transform(BASE_LINK, base)
}

/// Provider holding one [`StubKinematics`] of `dof` joints under [`MANIPULATOR`].
pub fn stub_provider(dof: usize) -> StubProvider {
    StubProvider::new().with_manipulator(MANIPULATOR, stub_kinematics(dof))
}

pub fn stub_kinematics(dof: usize) -> StubKinematics {
    let names = joint_names(dof);
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    StubKinematics::new(&refs, BASE_LINK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_state_fixture_resolves_joints() {
        let env = env_state(&[0.1, 0.2], Pose::identity());
        let values = env.joint_values(&joint_names(2)).unwrap();
        assert_eq!(values.as_slice(), [0.1, 0.2]);
        assert!(env.link_transform(BASE_LINK).is_ok());
    }

    #[test]
    fn joint_waypoint_fixture() {
        let wp = joint_waypoint(&[1.0, 2.0, 3.0]);
        assert_eq!(wp.joint_names, ["joint_a1", "joint_a2", "joint_a3"]);
        assert_eq!(wp.dof(), 3);
    }
}
