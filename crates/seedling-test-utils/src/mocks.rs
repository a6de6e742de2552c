//! Stub implementations of the kinematics traits for testing.
//!
//! [`StubKinematics`] maps the first three joints straight onto the flange
//! translation with identity rotation, which makes expected poses easy to
//! write by hand. IK is the exact inverse unless solutions are scripted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use nalgebra::{DVector, Translation3, UnitQuaternion, Vector3};

use seedling_core::error::{KinematicsError, ValidationError};
use seedling_core::traits::{ForwardKinematics, InverseKinematics, KinematicsProvider};
use seedling_core::types::{ManipulatorInfo, Pose};

// ---------------------------------------------------------------------------
// StubKinematics
// ---------------------------------------------------------------------------

/// Translation-only kinematics: `fk(q) = (q[0], q[1], q[2])`.
#[derive(Debug, Default)]
pub struct StubKinematics {
    joint_names: Vec<String>,
    base_link: String,
    scripted: Option<Vec<DVector<f64>>>,
    ik_calls: Mutex<usize>,
}

impl StubKinematics {
    pub fn new(joint_names: &[&str], base_link: &str) -> Self {
        Self {
            joint_names: joint_names.iter().map(|&n| n.to_string()).collect(),
            base_link: base_link.to_string(),
            scripted: None,
            ik_calls: Mutex::new(0),
        }
    }

    /// Always answer IK with `solutions`, regardless of the target pose.
    #[must_use]
    pub fn with_ik_solutions(mut self, solutions: Vec<DVector<f64>>) -> Self {
        self.scripted = Some(solutions);
        self
    }

    /// IK finds nothing, for every target.
    #[must_use]
    pub fn unreachable(self) -> Self {
        self.with_ik_solutions(Vec::new())
    }

    /// Number of IK queries answered so far.
    pub fn ik_calls(&self) -> usize {
        self.ik_calls.lock().map_or(0, |calls| *calls)
    }

    fn check(&self, joints: &DVector<f64>) -> Result<(), KinematicsError> {
        if joints.len() == self.joint_names.len() {
            Ok(())
        } else {
            Err(ValidationError::DofMismatch {
                expected: self.joint_names.len(),
                got: joints.len(),
            }
            .into())
        }
    }
}

impl ForwardKinematics for StubKinematics {
    fn calc_fwd_kin(&self, joints: &DVector<f64>) -> Result<Pose, KinematicsError> {
        self.check(joints)?;
        let mut xyz = Vector3::zeros();
        for (axis, value) in joints.iter().take(3).enumerate() {
            xyz[axis] = *value;
        }
        Ok(Pose::from_parts(Translation3::from(xyz), UnitQuaternion::identity()))
    }

    fn joint_names(&self) -> &[String] {
        &self.joint_names
    }

    fn base_link_name(&self) -> &str {
        &self.base_link
    }
}

impl InverseKinematics for StubKinematics {
    fn calc_inv_kin(&self, pose: &Pose, seed: &DVector<f64>) -> Result<Vec<DVector<f64>>, KinematicsError> {
        self.check(seed)?;
        if let Ok(mut calls) = self.ik_calls.lock() {
            *calls += 1;
        }
        if let Some(solutions) = &self.scripted {
            return Ok(solutions.clone());
        }
        let mut solution = seed.clone();
        for (axis, value) in solution.iter_mut().take(3).enumerate() {
            *value = pose.translation.vector[axis];
        }
        Ok(vec![solution])
    }

    fn joint_names(&self) -> &[String] {
        &self.joint_names
    }

    fn base_link_name(&self) -> &str {
        &self.base_link
    }
}

// ---------------------------------------------------------------------------
// StubProvider
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct StubEntry {
    fwd: Option<Arc<StubKinematics>>,
    inv: Option<Arc<StubKinematics>>,
    tcp: Option<Pose>,
}

/// Provider over named [`StubKinematics`].
#[derive(Debug, Default)]
pub struct StubProvider {
    entries: HashMap<String, StubEntry>,
}

impl StubProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `kin` for both forward and inverse queries.
    #[must_use]
    pub fn with_manipulator(mut self, name: &str, kin: StubKinematics) -> Self {
        let kin = Arc::new(kin);
        let entry = self.entries.entry(name.to_string()).or_default();
        entry.fwd = Some(Arc::clone(&kin));
        entry.inv = Some(kin);
        self
    }

    /// Replace only the inverse solver for `name`.
    #[must_use]
    pub fn with_inverse(mut self, name: &str, kin: StubKinematics) -> Self {
        self.entries.entry(name.to_string()).or_default().inv = Some(Arc::new(kin));
        self
    }

    /// Default tool offset for `name`.
    #[must_use]
    pub fn with_tcp(mut self, name: &str, tcp: Pose) -> Self {
        self.entries.entry(name.to_string()).or_default().tcp = Some(tcp);
        self
    }

    /// The inverse stub registered for `name`, to inspect call counts.
    pub fn inverse(&self, name: &str) -> Option<Arc<StubKinematics>> {
        self.entries.get(name).and_then(|e| e.inv.clone())
    }
}

impl KinematicsProvider for StubProvider {
    fn fwd_kin(&self, manipulator: &str) -> Result<Arc<dyn ForwardKinematics>, KinematicsError> {
        let fwd = self
            .entries
            .get(manipulator)
            .and_then(|e| e.fwd.clone())
            .ok_or_else(|| KinematicsError::UnknownManipulator(manipulator.to_string()))?;
        Ok(fwd)
    }

    fn inv_kin(&self, manipulator: &str, _solver: Option<&str>) -> Result<Arc<dyn InverseKinematics>, KinematicsError> {
        let inv = self
            .entries
            .get(manipulator)
            .and_then(|e| e.inv.clone())
            .ok_or_else(|| KinematicsError::UnknownManipulator(manipulator.to_string()))?;
        Ok(inv)
    }

    fn find_tcp(&self, info: &ManipulatorInfo) -> Result<Pose, KinematicsError> {
        if let Some(tcp) = info.tcp {
            return Ok(tcp);
        }
        Ok(info
            .manipulator
            .as_deref()
            .and_then(|name| self.entries.get(name))
            .and_then(|e| e.tcp)
            .unwrap_or_else(Pose::identity))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
