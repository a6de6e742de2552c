use std::sync::Arc;

use nalgebra::DVector;

use crate::error::KinematicsError;
use crate::types::{ManipulatorInfo, Pose};

// ---------------------------------------------------------------------------
// ForwardKinematics
// ---------------------------------------------------------------------------

/// Joint vector to flange pose, expressed in the chain's base frame.
pub trait ForwardKinematics: Send + Sync {
    fn calc_fwd_kin(&self, joints: &DVector<f64>) -> Result<Pose, KinematicsError>;

    /// Joint names in the order the solver expects its inputs.
    fn joint_names(&self) -> &[String];

    /// Link that the returned poses are relative to.
    fn base_link_name(&self) -> &str;

    fn num_joints(&self) -> usize {
        self.joint_names().len()
    }
}

// ---------------------------------------------------------------------------
// InverseKinematics
// ---------------------------------------------------------------------------

/// Flange pose in the base frame to zero or more joint solutions.
pub trait InverseKinematics: Send + Sync {
    /// Solve for `pose`, warm-started from `seed`.
    ///
    /// An empty vector means no solution was found. Redundant chains may
    /// return several.
    fn calc_inv_kin(&self, pose: &Pose, seed: &DVector<f64>) -> Result<Vec<DVector<f64>>, KinematicsError>;

    fn joint_names(&self) -> &[String];

    fn base_link_name(&self) -> &str;

    fn num_joints(&self) -> usize {
        self.joint_names().len()
    }
}

// ---------------------------------------------------------------------------
// KinematicsProvider
// ---------------------------------------------------------------------------

/// Hands out solvers per named manipulator and resolves tool frames.
pub trait KinematicsProvider: Send + Sync {
    fn fwd_kin(&self, manipulator: &str) -> Result<Arc<dyn ForwardKinematics>, KinematicsError>;

    /// `solver` selects a named IK variant; `None` picks the manipulator default.
    fn inv_kin(
        &self,
        manipulator: &str,
        solver: Option<&str>,
    ) -> Result<Arc<dyn InverseKinematics>, KinematicsError>;

    /// Flange-to-tool transform for `info`.
    fn find_tcp(&self, info: &ManipulatorInfo) -> Result<Pose, KinematicsError> {
        Ok(info.tcp.unwrap_or_else(Pose::identity))
    }
}
