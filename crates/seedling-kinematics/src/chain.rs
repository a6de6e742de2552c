//! Serial kinematic chain described by a [`ChainSpec`].
//!
//! A [`KinematicChain`] is an ordered list of actuated joints from the base
//! link to the flange. It stores the static transforms (origins) and joint
//! axes needed for forward kinematics and Jacobian computation.

use std::collections::HashSet;

use nalgebra::{DVector, Isometry3, Translation3, UnitQuaternion, UnitVector3, Vector3};
use serde::{Deserialize, Serialize};

use seedling_core::error::ConfigError;

// ---------------------------------------------------------------------------
// ChainSpec
// ---------------------------------------------------------------------------

fn default_base_link() -> String {
    "base_link".into()
}
const fn default_axis() -> [f64; 3] {
    [0.0, 0.0, 1.0]
}

/// Static transform as translation + roll/pitch/yaw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OriginSpec {
    #[serde(default)]
    pub xyz: [f64; 3],
    #[serde(default)]
    pub rpy: [f64; 3],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointKind {
    #[default]
    Revolute,
    Continuous,
    Prismatic,
    Fixed,
}

impl JointKind {
    pub const fn is_actuated(self) -> bool {
        !matches!(self, Self::Fixed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointSpec {
    pub name: String,
    #[serde(default)]
    pub kind: JointKind,
    #[serde(default)]
    pub origin: OriginSpec,
    #[serde(default = "default_axis")]
    pub axis: [f64; 3],
    /// `[lower, upper]` in rad or m. Revolute joints default to +-pi.
    #[serde(default)]
    pub limits: Option<[f64; 2]>,
}

/// Declarative description of a manipulator chain, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSpec {
    pub name: String,
    #[serde(default = "default_base_link")]
    pub base_link: String,
    pub joints: Vec<JointSpec>,
    /// Transform from the last joint's child link to the flange.
    #[serde(default)]
    pub tip_offset: OriginSpec,
}

impl ChainSpec {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

// ---------------------------------------------------------------------------
// KinematicChain
// ---------------------------------------------------------------------------

/// A single actuated joint in the kinematic chain.
#[derive(Debug, Clone)]
pub struct ChainJoint {
    pub name: String,
    /// Static transform from parent link frame to this joint frame.
    pub origin: Isometry3<f64>,
    /// Joint axis in the joint's local frame.
    pub axis: UnitVector3<f64>,
    pub is_prismatic: bool,
    pub lower_limit: f64,
    pub upper_limit: f64,
}

/// An ordered kinematic chain from base to flange.
///
/// Fixed joints have their transforms folded into the next actuated joint's
/// origin, or into the flange offset when they trail the last actuated joint.
#[derive(Debug, Clone)]
pub struct KinematicChain {
    name: String,
    base_link: String,
    joints: Vec<ChainJoint>,
    joint_names: Vec<String>,
    ee_offset: Isometry3<f64>,
}

impl KinematicChain {
    /// Build a chain from its declarative description.
    pub fn from_spec(spec: &ChainSpec) -> Result<Self, ConfigError> {
        let mut joints = Vec::new();
        let mut seen = HashSet::new();
        let mut accumulated_fixed = Isometry3::identity();

        for joint in &spec.joints {
            if !seen.insert(joint.name.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: format!("joints.{}", joint.name),
                    message: "duplicate joint name".into(),
                });
            }

            let joint_origin = origin_to_isometry(&joint.origin);
            if !joint.kind.is_actuated() {
                accumulated_fixed *= joint_origin;
                continue;
            }

            let axis = Vector3::from(joint.axis);
            if axis.norm() < 1e-9 {
                return Err(ConfigError::InvalidValue {
                    field: format!("joints.{}.axis", joint.name),
                    message: "axis must be non-zero".into(),
                });
            }

            let (lower, upper) = match (joint.kind, joint.limits) {
                (JointKind::Continuous, _) | (_, None) => (-std::f64::consts::PI, std::f64::consts::PI),
                (_, Some([lo, hi])) => (lo, hi),
            };
            if lower > upper {
                return Err(ConfigError::InvalidValue {
                    field: format!("joints.{}.limits", joint.name),
                    message: format!("lower {lower} exceeds upper {upper}"),
                });
            }

            joints.push(ChainJoint {
                name: joint.name.clone(),
                origin: accumulated_fixed * joint_origin,
                axis: UnitVector3::new_normalize(axis),
                is_prismatic: joint.kind == JointKind::Prismatic,
                lower_limit: lower,
                upper_limit: upper,
            });
            accumulated_fixed = Isometry3::identity();
        }

        if joints.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "joints".into(),
                message: format!("chain '{}' has no actuated joints", spec.name),
            });
        }

        let joint_names = joints.iter().map(|j| j.name.clone()).collect();
        Ok(Self {
            name: spec.name.clone(),
            base_link: spec.base_link.clone(),
            joints,
            joint_names,
            ee_offset: accumulated_fixed * origin_to_isometry(&spec.tip_offset),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_link(&self) -> &str {
        &self.base_link
    }

    /// Number of actuated degrees of freedom.
    pub fn dof(&self) -> usize {
        self.joints.len()
    }

    /// Joint names in chain order.
    pub fn joint_names(&self) -> &[String] {
        &self.joint_names
    }

    pub fn joints(&self) -> &[ChainJoint] {
        &self.joints
    }

    pub fn ee_offset(&self) -> &Isometry3<f64> {
        &self.ee_offset
    }

    /// Compute forward kinematics: joint positions -> flange pose in the base frame.
    ///
    /// # Panics
    ///
    /// Panics if `q.len() != self.dof()`.
    pub fn forward_kinematics(&self, q: &[f64]) -> Isometry3<f64> {
        assert_eq!(q.len(), self.dof(), "q.len() must equal chain DOF");

        let mut transform = Isometry3::identity();
        for (joint, &position) in self.joints.iter().zip(q) {
            transform *= joint.origin;
            transform *= joint_transform(&joint.axis, joint.is_prismatic, position);
        }
        transform * self.ee_offset
    }

    /// Per-joint origins and axes in the base frame, plus the flange position.
    pub fn joint_frames(&self, q: &[f64]) -> (Vec<Vector3<f64>>, Vec<Vector3<f64>>, Vector3<f64>) {
        assert_eq!(q.len(), self.dof());

        let mut transform = Isometry3::identity();
        let mut origins = Vec::with_capacity(self.dof());
        let mut axes = Vec::with_capacity(self.dof());

        for (joint, &position) in self.joints.iter().zip(q) {
            transform *= joint.origin;
            // Recorded before the joint's own motion is applied.
            origins.push(transform.translation.vector);
            axes.push(transform.rotation * joint.axis.into_inner());
            transform *= joint_transform(&joint.axis, joint.is_prismatic, position);
        }

        let ee = transform * self.ee_offset;
        (origins, axes, ee.translation.vector)
    }

    pub fn clamp_joints(&self, q: &mut [f64]) {
        for (value, joint) in q.iter_mut().zip(&self.joints) {
            *value = value.clamp(joint.lower_limit, joint.upper_limit);
        }
    }

    pub fn within_limits(&self, q: &DVector<f64>) -> bool {
        q.len() == self.dof()
            && q.iter()
                .zip(&self.joints)
                .all(|(&v, j)| v >= j.lower_limit - 1e-9 && v <= j.upper_limit + 1e-9)
    }
}

pub fn origin_to_isometry(origin: &OriginSpec) -> Isometry3<f64> {
    let [x, y, z] = origin.xyz;
    let [roll, pitch, yaw] = origin.rpy;
    Isometry3::from_parts(
        Translation3::new(x, y, z),
        UnitQuaternion::from_euler_angles(roll, pitch, yaw),
    )
}

fn joint_transform(axis: &UnitVector3<f64>, is_prismatic: bool, position: f64) -> Isometry3<f64> {
    if is_prismatic {
        Isometry3::from_parts(
            Translation3::from(axis.into_inner() * position),
            UnitQuaternion::identity(),
        )
    } else {
        Isometry3::from_parts(
            Translation3::identity(),
            UnitQuaternion::from_axis_angle(axis, position),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Two revolute joints about Z with links along X (planar arm), reach 0.55 m.
    pub(crate) const PLANAR_ARM: &str = r#"
        name = "planar"
        base_link = "base"

        [[joints]]
        name = "shoulder"
        origin = { xyz = [0.0, 0.0, 0.05] }
        limits = [-2.617, 2.617]

        [[joints]]
        name = "elbow"
        origin = { xyz = [0.3, 0.0, 0.0] }
        limits = [-2.094, 2.094]

        [[joints]]
        name = "ee_fixed"
        kind = "fixed"
        origin = { xyz = [0.25, 0.0, 0.0] }
    "#;

    pub(crate) const SIX_DOF_ARM: &str = r#"
        name = "six_dof"

        [[joints]]
        name = "j1_base_yaw"
        origin = { xyz = [0.0, 0.0, 0.05] }
        axis = [0.0, 0.0, 1.0]

        [[joints]]
        name = "j2_shoulder_pitch"
        origin = { xyz = [0.0, 0.0, 0.2] }
        axis = [0.0, 1.0, 0.0]
        limits = [-1.5708, 2.356]

        [[joints]]
        name = "j3_elbow_pitch"
        origin = { xyz = [0.0, 0.0, 0.3] }
        axis = [0.0, 1.0, 0.0]
        limits = [-2.356, 2.356]

        [[joints]]
        name = "j4_forearm_roll"
        origin = { xyz = [0.0, 0.0, 0.1] }

        [[joints]]
        name = "j5_wrist_pitch"
        origin = { xyz = [0.0, 0.0, 0.2] }
        axis = [0.0, 1.0, 0.0]
        limits = [-2.094, 2.094]

        [[joints]]
        name = "j6_wrist_roll"
        origin = { xyz = [0.0, 0.0, 0.06] }
    "#;

    pub(crate) fn planar_chain() -> KinematicChain {
        KinematicChain::from_spec(&ChainSpec::from_toml_str(PLANAR_ARM).unwrap()).unwrap()
    }

    pub(crate) fn six_dof_chain() -> KinematicChain {
        KinematicChain::from_spec(&ChainSpec::from_toml_str(SIX_DOF_ARM).unwrap()).unwrap()
    }

    #[test]
    fn chain_from_planar_spec() {
        let chain = planar_chain();
        assert_eq!(chain.dof(), 2);
        assert_eq!(chain.joint_names(), ["shoulder", "elbow"]);
        assert_eq!(chain.base_link(), "base");
        assert_eq!(chain.name(), "planar");
    }

    #[test]
    fn fk_zero_position() {
        let chain = planar_chain();
        let ee = chain.forward_kinematics(&[0.0, 0.0]);
        assert_relative_eq!(ee.translation.x, 0.55, epsilon = 1e-9);
        assert_relative_eq!(ee.translation.y, 0.0, epsilon = 1e-9);
        assert_relative_eq!(ee.translation.z, 0.05, epsilon = 1e-9);
    }

    #[test]
    fn fk_shoulder_90_deg_swings_into_y() {
        let chain = planar_chain();
        let ee = chain.forward_kinematics(&[std::f64::consts::FRAC_PI_2, 0.0]);
        assert_relative_eq!(ee.translation.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(ee.translation.y, 0.55, epsilon = 1e-9);
        assert_relative_eq!(ee.rotation.angle(), std::f64::consts::FRAC_PI_2, epsilon = 1e-9);
    }

    #[test]
    fn fk_six_dof_zero() {
        let chain = six_dof_chain();
        assert_eq!(chain.dof(), 6);
        let ee = chain.forward_kinematics(&[0.0; 6]);
        // 0.05 + 0.2 + 0.3 + 0.1 + 0.2 + 0.06
        assert_relative_eq!(ee.translation.z, 0.91, epsilon = 1e-9);
        assert_relative_eq!(ee.translation.x, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn joint_frames_report_base_frame_axes() {
        let chain = six_dof_chain();
        let (origins, axes, ee) = chain.joint_frames(&[0.0; 6]);
        assert_eq!(origins.len(), 6);
        assert_relative_eq!(axes[1], Vector3::y(), epsilon = 1e-9);
        assert_relative_eq!(origins[2].z, 0.55, epsilon = 1e-9);
        assert_relative_eq!(ee.z, 0.91, epsilon = 1e-9);
    }

    #[test]
    fn clamp_and_limit_check() {
        let chain = planar_chain();
        let mut q = [5.0, -5.0];
        chain.clamp_joints(&mut q);
        assert_relative_eq!(q[0], 2.617);
        assert_relative_eq!(q[1], -2.094);
        assert!(chain.within_limits(&DVector::from_column_slice(&q)));
        assert!(!chain.within_limits(&DVector::from_column_slice(&[3.0, 0.0])));
    }

    #[test]
    fn duplicate_joint_rejected() {
        let mut spec = ChainSpec::from_toml_str(PLANAR_ARM).unwrap();
        spec.joints[1].name = "shoulder".into();
        let err = KinematicChain::from_spec(&spec).unwrap_err();
        assert!(err.to_string().contains("duplicate joint name"));
    }

    #[test]
    fn chain_without_actuated_joints_rejected() {
        let spec = ChainSpec {
            name: "rigid".into(),
            base_link: "base".into(),
            joints: vec![JointSpec {
                name: "weld".into(),
                kind: JointKind::Fixed,
                origin: OriginSpec::default(),
                axis: default_axis(),
                limits: None,
            }],
            tip_offset: OriginSpec::default(),
        };
        assert!(KinematicChain::from_spec(&spec).is_err());
    }

    #[test]
    fn origin_rpy_matches_axis_angle() {
        let origin = OriginSpec {
            xyz: [1.0, 2.0, 3.0],
            rpy: [0.0, 0.0, std::f64::consts::FRAC_PI_2],
        };
        let iso = origin_to_isometry(&origin);
        let expected = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(iso.rotation, expected, epsilon = 1e-12);
        assert_relative_eq!(iso.translation.vector, Vector3::new(1.0, 2.0, 3.0));
    }
}
