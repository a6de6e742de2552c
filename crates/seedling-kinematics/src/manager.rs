//! Named manipulators backed by [`KinematicChain`]s.
//!
//! [`KinematicsManager`] maps a manipulator name to its chain, any number of
//! named IK solver variants and an optional default tool offset. It is the
//! concrete [`KinematicsProvider`] used outside of tests.

use std::collections::HashMap;
use std::sync::Arc;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use tracing::debug;

use seedling_core::error::{ConfigError, KinematicsError, ValidationError};
use seedling_core::traits::{ForwardKinematics, InverseKinematics, KinematicsProvider};
use seedling_core::types::{ManipulatorInfo, Pose};

use crate::chain::{ChainSpec, KinematicChain, OriginSpec, origin_to_isometry};
use crate::solver::{DlsConfig, DlsSolver, IkTarget};

/// Name the default IK variant is registered under.
pub const DEFAULT_IK_SOLVER: &str = "dls";

// ---------------------------------------------------------------------------
// ChainKinematics
// ---------------------------------------------------------------------------

/// Which constraint the IK solver enforces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IkTargetMode {
    /// Position and orientation (6 constraints).
    #[default]
    Pose,
    /// Position only, for chains with fewer than six joints.
    Position,
}

/// Forward and inverse kinematics over one chain.
#[derive(Debug, Clone)]
pub struct ChainKinematics {
    chain: Arc<KinematicChain>,
    solver: DlsSolver,
    mode: IkTargetMode,
}

impl ChainKinematics {
    pub fn new(chain: Arc<KinematicChain>, config: DlsConfig, mode: IkTargetMode) -> Self {
        Self {
            chain,
            solver: DlsSolver::new(config),
            mode,
        }
    }

    pub fn chain(&self) -> &KinematicChain {
        &self.chain
    }

    fn check_input(&self, joints: &DVector<f64>) -> Result<(), ValidationError> {
        if joints.len() != self.chain.dof() {
            return Err(ValidationError::DofMismatch {
                expected: self.chain.dof(),
                got: joints.len(),
            });
        }
        if joints.iter().any(|v| v.is_nan()) {
            return Err(ValidationError::ContainsNan);
        }
        Ok(())
    }
}

impl ForwardKinematics for ChainKinematics {
    fn calc_fwd_kin(&self, joints: &DVector<f64>) -> Result<Pose, KinematicsError> {
        self.check_input(joints)?;
        Ok(self.chain.forward_kinematics(joints.as_slice()))
    }

    fn joint_names(&self) -> &[String] {
        self.chain.joint_names()
    }

    fn base_link_name(&self) -> &str {
        self.chain.base_link()
    }
}

impl InverseKinematics for ChainKinematics {
    fn calc_inv_kin(&self, pose: &Pose, seed: &DVector<f64>) -> Result<Vec<DVector<f64>>, KinematicsError> {
        self.check_input(seed)?;
        let target = match self.mode {
            IkTargetMode::Pose => IkTarget::Pose(*pose),
            IkTargetMode::Position => IkTarget::Position(pose.translation.vector),
        };
        let solutions: Vec<DVector<f64>> = self
            .solver
            .solve_all(&self.chain, &target, seed.as_slice())
            .into_iter()
            .map(DVector::from_vec)
            .collect();
        debug!(chain = self.chain.name(), count = solutions.len(), "IK solve finished");
        Ok(solutions)
    }

    fn joint_names(&self) -> &[String] {
        self.chain.joint_names()
    }

    fn base_link_name(&self) -> &str {
        self.chain.base_link()
    }
}

// ---------------------------------------------------------------------------
// ManipulatorSpec
// ---------------------------------------------------------------------------

/// Declarative manipulator: chain, IK settings and default tool offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManipulatorSpec {
    pub chain: ChainSpec,
    #[serde(default)]
    pub ik: DlsConfig,
    #[serde(default)]
    pub ik_mode: IkTargetMode,
    /// Flange-to-tool transform used when an instruction names no TCP.
    #[serde(default)]
    pub tcp: Option<OriginSpec>,
}

// ---------------------------------------------------------------------------
// KinematicsManager
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct ManipulatorEntry {
    fwd: Arc<ChainKinematics>,
    solvers: HashMap<String, Arc<ChainKinematics>>,
    tcp: Option<Pose>,
}

/// Registry of manipulators by name.
#[derive(Debug, Default)]
pub struct KinematicsManager {
    manipulators: HashMap<String, ManipulatorEntry>,
}

impl KinematicsManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `chain` under `name` with a default DLS solver.
    pub fn insert(&mut self, name: impl Into<String>, chain: KinematicChain, config: DlsConfig, mode: IkTargetMode) {
        let chain = Arc::new(chain);
        let kin = Arc::new(ChainKinematics::new(Arc::clone(&chain), config, mode));
        let mut solvers = HashMap::new();
        solvers.insert(DEFAULT_IK_SOLVER.to_string(), Arc::clone(&kin));
        self.manipulators.insert(
            name.into(),
            ManipulatorEntry {
                fwd: kin,
                solvers,
                tcp: None,
            },
        );
    }

    /// Build and register a manipulator from its spec.
    pub fn insert_spec(&mut self, name: impl Into<String>, spec: &ManipulatorSpec) -> Result<(), ConfigError> {
        let name = name.into();
        let chain = KinematicChain::from_spec(&spec.chain)?;
        self.insert(name.clone(), chain, spec.ik.clone(), spec.ik_mode);
        if let Some(tcp) = &spec.tcp {
            self.set_tcp(&name, origin_to_isometry(tcp))
                .map_err(|e| ConfigError::InvalidValue {
                    field: "tcp".into(),
                    message: e.to_string(),
                })?;
        }
        Ok(())
    }

    /// Add a named IK variant for an already registered manipulator.
    pub fn add_ik_solver(
        &mut self,
        manipulator: &str,
        solver_name: impl Into<String>,
        config: DlsConfig,
        mode: IkTargetMode,
    ) -> Result<(), KinematicsError> {
        let entry = self
            .manipulators
            .get_mut(manipulator)
            .ok_or_else(|| KinematicsError::UnknownManipulator(manipulator.to_string()))?;
        let chain = Arc::clone(&entry.fwd.chain);
        entry
            .solvers
            .insert(solver_name.into(), Arc::new(ChainKinematics::new(chain, config, mode)));
        Ok(())
    }

    /// Default flange-to-tool transform for `manipulator`.
    pub fn set_tcp(&mut self, manipulator: &str, tcp: Pose) -> Result<(), KinematicsError> {
        let entry = self
            .manipulators
            .get_mut(manipulator)
            .ok_or_else(|| KinematicsError::UnknownManipulator(manipulator.to_string()))?;
        entry.tcp = Some(tcp);
        Ok(())
    }

    pub fn contains(&self, manipulator: &str) -> bool {
        self.manipulators.contains_key(manipulator)
    }

    /// Registered manipulator names, sorted.
    pub fn manipulator_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.manipulators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn entry(&self, manipulator: &str) -> Result<&ManipulatorEntry, KinematicsError> {
        self.manipulators
            .get(manipulator)
            .ok_or_else(|| KinematicsError::UnknownManipulator(manipulator.to_string()))
    }
}

impl KinematicsProvider for KinematicsManager {
    fn fwd_kin(&self, manipulator: &str) -> Result<Arc<dyn ForwardKinematics>, KinematicsError> {
        let fwd: Arc<dyn ForwardKinematics> = self.entry(manipulator)?.fwd.clone();
        Ok(fwd)
    }

    fn inv_kin(&self, manipulator: &str, solver: Option<&str>) -> Result<Arc<dyn InverseKinematics>, KinematicsError> {
        let entry = self.entry(manipulator)?;
        let name = solver.unwrap_or(DEFAULT_IK_SOLVER);
        let inv: Arc<dyn InverseKinematics> = entry
            .solvers
            .get(name)
            .cloned()
            .ok_or_else(|| KinematicsError::InverseFailed(format!("{manipulator}: no IK solver named '{name}'")))?;
        Ok(inv)
    }

    fn find_tcp(&self, info: &ManipulatorInfo) -> Result<Pose, KinematicsError> {
        if let Some(tcp) = info.tcp {
            return Ok(tcp);
        }
        let Some(name) = info.manipulator.as_deref() else {
            return Ok(Pose::identity());
        };
        Ok(self.entry(name)?.tcp.unwrap_or_else(Pose::identity))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::tests::{planar_chain, six_dof_chain};
    use approx::assert_relative_eq;
    use nalgebra::{Translation3, UnitQuaternion};

    fn manager() -> KinematicsManager {
        let mut manager = KinematicsManager::new();
        manager.insert("planar", planar_chain(), DlsConfig::default(), IkTargetMode::Position);
        manager.insert("arm", six_dof_chain(), DlsConfig::default(), IkTargetMode::Pose);
        manager
    }

    #[test]
    fn fwd_kin_by_name() {
        let manager = manager();
        let fwd = manager.fwd_kin("planar").unwrap();
        assert_eq!(fwd.joint_names(), ["shoulder", "elbow"]);
        assert_eq!(fwd.num_joints(), 2);
        assert_eq!(fwd.base_link_name(), "base");

        let pose = fwd.calc_fwd_kin(&DVector::from_vec(vec![0.0, 0.0])).unwrap();
        assert_relative_eq!(pose.translation.x, 0.55, epsilon = 1e-9);
    }

    #[test]
    fn fwd_kin_rejects_wrong_dof_and_nan() {
        let fwd = manager().fwd_kin("planar").unwrap();
        let err = fwd.calc_fwd_kin(&DVector::from_vec(vec![0.0])).unwrap_err();
        assert!(matches!(
            err,
            KinematicsError::Validation(ValidationError::DofMismatch { expected: 2, got: 1 })
        ));
        let err = fwd.calc_fwd_kin(&DVector::from_vec(vec![0.0, f64::NAN])).unwrap_err();
        assert!(matches!(err, KinematicsError::Validation(ValidationError::ContainsNan)));
    }

    #[test]
    fn unknown_manipulator() {
        let manager = manager();
        assert!(matches!(
            manager.fwd_kin("ghost"),
            Err(KinematicsError::UnknownManipulator(name)) if name == "ghost"
        ));
        assert!(manager.inv_kin("ghost", None).is_err());
        assert!(manager.inv_kin("planar", Some("trac_ik")).is_err());
    }

    #[test]
    fn inv_kin_recovers_fk_pose() {
        let manager = manager();
        let fwd = manager.fwd_kin("arm").unwrap();
        let inv = manager.inv_kin("arm", None).unwrap();

        let q = DVector::from_vec(vec![0.5, 0.3, -0.4, 0.2, 0.1, -0.3]);
        let pose = fwd.calc_fwd_kin(&q).unwrap();
        let solutions = inv.calc_inv_kin(&pose, &q.map(|v| v * 0.8)).unwrap();
        assert!(!solutions.is_empty());
        let reached = fwd.calc_fwd_kin(&solutions[0]).unwrap();
        assert_relative_eq!(reached.translation.vector, pose.translation.vector, epsilon = 1e-3);
    }

    #[test]
    fn inv_kin_unreachable_is_empty_not_error() {
        let manager = manager();
        let inv = manager.inv_kin("planar", None).unwrap();
        let far = Pose::translation(4.0, 0.0, 0.0);
        let solutions = inv.calc_inv_kin(&far, &DVector::zeros(2)).unwrap();
        assert!(solutions.is_empty());
    }

    #[test]
    fn named_solver_variant() {
        let mut manager = manager();
        manager
            .add_ik_solver(
                "planar",
                "multi",
                DlsConfig {
                    extra_seeds: 8,
                    ..DlsConfig::default()
                },
                IkTargetMode::Position,
            )
            .unwrap();
        assert!(manager.inv_kin("planar", Some("multi")).is_ok());
        assert!(manager.add_ik_solver("ghost", "x", DlsConfig::default(), IkTargetMode::Pose).is_err());
    }

    #[test]
    fn find_tcp_prefers_instruction_then_manipulator() {
        let mut manager = manager();
        let tool = Pose::from_parts(Translation3::new(0.0, 0.0, 0.1), UnitQuaternion::identity());
        manager.set_tcp("planar", tool).unwrap();

        let info = ManipulatorInfo::new("planar");
        assert_relative_eq!(manager.find_tcp(&info).unwrap(), tool);

        let explicit = Pose::translation(0.0, 0.02, 0.0);
        let info = ManipulatorInfo::new("planar").with_tcp(explicit);
        assert_relative_eq!(manager.find_tcp(&info).unwrap(), explicit);

        let info = ManipulatorInfo::new("arm");
        assert_relative_eq!(manager.find_tcp(&info).unwrap(), Pose::identity());
    }

    #[test]
    fn manipulator_spec_from_toml() {
        let toml = r#"
            ik_mode = "position"
            tcp = { xyz = [0.0, 0.0, 0.1] }

            [ik]
            extra_seeds = 3

            [chain]
            name = "planar"

            [[chain.joints]]
            name = "shoulder"

            [[chain.joints]]
            name = "elbow"
            origin = { xyz = [0.3, 0.0, 0.0] }
        "#;
        let spec: ManipulatorSpec = toml::from_str(toml).unwrap();
        assert_eq!(spec.chain.base_link, "base_link");
        assert_eq!(spec.ik.max_iterations, 100);
        assert_eq!(spec.ik.extra_seeds, 3);
        assert_eq!(spec.ik_mode, IkTargetMode::Position);

        let mut manager = KinematicsManager::new();
        manager.insert_spec("planar", &spec).unwrap();
        assert_eq!(manager.manipulator_names(), ["planar"]);
        let tcp = manager.find_tcp(&ManipulatorInfo::new("planar")).unwrap();
        assert_relative_eq!(tcp.translation.z, 0.1);
    }
}
