//! Damped Least Squares (Levenberg-Marquardt) IK solver.
//!
//! Iteratively solves for joint positions that place the flange at a target
//! pose, using the geometric Jacobian and DLS pseudoinverse. [`DlsSolver::solve_all`]
//! restarts from random seeds inside the joint limits to collect several
//! distinct solutions for the same target.

use nalgebra::{DMatrix, DVector, Isometry3, UnitQuaternion, Vector3};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::chain::KinematicChain;

/// What the solver should target.
#[derive(Debug, Clone)]
pub enum IkTarget {
    /// Target position only (3-DOF constraint).
    Position(Vector3<f64>),
    /// Target full pose: position + orientation (6-DOF constraint).
    Pose(Isometry3<f64>),
}

const fn default_max_iterations() -> u32 {
    100
}
const fn default_position_tolerance() -> f64 {
    1e-4
}
const fn default_angle_tolerance() -> f64 {
    1e-3
}
const fn default_damping() -> f64 {
    0.01
}
const fn default_extra_seeds() -> usize {
    0
}
const fn default_rng_seed() -> u64 {
    42
}
const fn default_dedup_tolerance() -> f64 {
    1e-3
}

/// Configuration for the DLS solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DlsConfig {
    /// Maximum solver iterations.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// Position error tolerance (meters).
    #[serde(default = "default_position_tolerance")]
    pub position_tolerance: f64,
    /// Orientation error tolerance (radians).
    #[serde(default = "default_angle_tolerance")]
    pub angle_tolerance: f64,
    /// Damping factor (lambda). Higher = more robust near singularities,
    /// but slower convergence.
    #[serde(default = "default_damping")]
    pub damping: f64,
    /// Random restarts tried by [`DlsSolver::solve_all`] after the warm start.
    #[serde(default = "default_extra_seeds")]
    pub extra_seeds: usize,
    /// Seed for the restart generator, so repeated solves agree.
    #[serde(default = "default_rng_seed")]
    pub rng_seed: u64,
    /// Max per-joint difference under which two solutions count as the same.
    #[serde(default = "default_dedup_tolerance")]
    pub dedup_tolerance: f64,
}

impl Default for DlsConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            position_tolerance: default_position_tolerance(),
            angle_tolerance: default_angle_tolerance(),
            damping: default_damping(),
            extra_seeds: default_extra_seeds(),
            rng_seed: default_rng_seed(),
            dedup_tolerance: default_dedup_tolerance(),
        }
    }
}

/// Result of an IK solve.
#[derive(Debug, Clone)]
pub struct IkResult {
    /// Solved joint positions.
    pub joint_positions: Vec<f64>,
    /// Whether the solver converged within tolerance.
    pub converged: bool,
    /// Number of iterations used.
    pub iterations: u32,
    /// Final position error (meters).
    pub position_error: f64,
    /// Final orientation error (radians). Zero if target is position-only.
    pub orientation_error: f64,
}

/// Damped Least Squares IK solver.
#[derive(Debug, Clone)]
pub struct DlsSolver {
    config: DlsConfig,
}

impl DlsSolver {
    pub const fn new(config: DlsConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(DlsConfig::default())
    }

    pub const fn config(&self) -> &DlsConfig {
        &self.config
    }

    /// Solve IK for the given chain and target.
    ///
    /// `q_init` is the starting joint configuration (warm start).
    pub fn solve(&self, chain: &KinematicChain, target: &IkTarget, q_init: &[f64]) -> IkResult {
        assert_eq!(q_init.len(), chain.dof());

        let mut q: Vec<f64> = q_init.to_vec();
        chain.clamp_joints(&mut q);
        let lambda_sq = self.config.damping * self.config.damping;

        for iteration in 0..self.config.max_iterations {
            let ee_pose = chain.forward_kinematics(&q);
            let (pos_err, ori_err, error_vec) = compute_error(&ee_pose, target);

            if self.is_converged(target, pos_err, ori_err) {
                return IkResult {
                    joint_positions: q,
                    converged: true,
                    iterations: iteration,
                    position_error: pos_err,
                    orientation_error: ori_err,
                };
            }

            let jacobian = compute_jacobian(chain, &q, target);
            let m = jacobian.nrows();

            // dq = J^T (J J^T + lambda^2 I)^-1 * error
            let damped = &jacobian * jacobian.transpose() + DMatrix::identity(m, m) * lambda_sq;
            let Some(damped_inv) = damped.try_inverse() else {
                return IkResult {
                    joint_positions: q,
                    converged: false,
                    iterations: iteration,
                    position_error: pos_err,
                    orientation_error: ori_err,
                };
            };

            let dq = jacobian.transpose() * damped_inv * error_vec;
            for (value, delta) in q.iter_mut().zip(dq.iter()) {
                *value += delta;
            }
            chain.clamp_joints(&mut q);
        }

        let ee_pose = chain.forward_kinematics(&q);
        let (pos_err, ori_err, _) = compute_error(&ee_pose, target);
        IkResult {
            converged: self.is_converged(target, pos_err, ori_err),
            joint_positions: q,
            iterations: self.config.max_iterations,
            position_error: pos_err,
            orientation_error: ori_err,
        }
    }

    /// Collect distinct converged solutions: the warm start first, then
    /// `extra_seeds` random restarts drawn uniformly within joint limits.
    pub fn solve_all(&self, chain: &KinematicChain, target: &IkTarget, q_init: &[f64]) -> Vec<Vec<f64>> {
        let mut solutions: Vec<Vec<f64>> = Vec::new();
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.rng_seed);

        let mut seeds = vec![q_init.to_vec()];
        for _ in 0..self.config.extra_seeds {
            seeds.push(
                chain
                    .joints()
                    .iter()
                    .map(|j| {
                        if j.upper_limit > j.lower_limit {
                            rng.gen_range(j.lower_limit..=j.upper_limit)
                        } else {
                            j.lower_limit
                        }
                    })
                    .collect(),
            );
        }

        for seed in &seeds {
            let result = self.solve(chain, target, seed);
            if !result.converged {
                continue;
            }
            let duplicate = solutions.iter().any(|known| {
                known
                    .iter()
                    .zip(&result.joint_positions)
                    .all(|(a, b)| (a - b).abs() <= self.config.dedup_tolerance)
            });
            if !duplicate {
                solutions.push(result.joint_positions);
            }
        }
        solutions
    }

    fn is_converged(&self, target: &IkTarget, pos_err: f64, ori_err: f64) -> bool {
        match target {
            IkTarget::Position(_) => pos_err < self.config.position_tolerance,
            IkTarget::Pose(_) => {
                pos_err < self.config.position_tolerance && ori_err < self.config.angle_tolerance
            }
        }
    }
}

/// Returns `(position_error_norm, orientation_error_norm, error_vector)`.
fn compute_error(ee_pose: &Isometry3<f64>, target: &IkTarget) -> (f64, f64, DVector<f64>) {
    match target {
        IkTarget::Position(target_pos) => {
            let pos_err = target_pos - ee_pose.translation.vector;
            (pos_err.norm(), 0.0, DVector::from_column_slice(pos_err.as_slice()))
        }
        IkTarget::Pose(target_pose) => {
            let pos_err = target_pose.translation.vector - ee_pose.translation.vector;
            let rot_err = target_pose.rotation * ee_pose.rotation.inverse();
            let ori_err = orientation_error(&rot_err);

            let error = DVector::from_iterator(6, pos_err.iter().chain(ori_err.iter()).copied());
            (pos_err.norm(), ori_err.norm(), error)
        }
    }
}

/// Axis * angle of a unit quaternion.
fn orientation_error(q: &UnitQuaternion<f64>) -> Vector3<f64> {
    q.axis().map_or_else(Vector3::zeros, |axis| axis.into_inner() * q.angle())
}

/// Geometric Jacobian: 3xN for position targets, 6xN for full poses.
fn compute_jacobian(chain: &KinematicChain, q: &[f64], target: &IkTarget) -> DMatrix<f64> {
    let n = chain.dof();
    let (origins, axes, ee_pos) = chain.joint_frames(q);

    let rows = match target {
        IkTarget::Position(_) => 3,
        IkTarget::Pose(_) => 6,
    };
    let mut jacobian = DMatrix::zeros(rows, n);

    for (i, joint) in chain.joints().iter().enumerate() {
        let z_i = &axes[i];
        if joint.is_prismatic {
            jacobian.fixed_view_mut::<3, 1>(0, i).copy_from(z_i);
        } else {
            let linear = z_i.cross(&(ee_pos - origins[i]));
            jacobian.fixed_view_mut::<3, 1>(0, i).copy_from(&linear);
            if rows == 6 {
                jacobian.fixed_view_mut::<3, 1>(3, i).copy_from(z_i);
            }
        }
    }
    jacobian
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
