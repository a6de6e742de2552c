//! Kinematics backends for seedling.
//!
//! Provides forward kinematics, geometric Jacobian computation, and
//! Damped Least Squares (Levenberg-Marquardt) IK solving for serial chains
//! described by a [`ChainSpec`].
//!
//! # Architecture
//!
//! ```text
//! ChainSpec ──► KinematicChain ──► DlsSolver ──► joint solutions
//!                      │
//!                      └──► KinematicsManager (KinematicsProvider)
//! ```

pub mod chain;
pub mod manager;
pub mod solver;

pub use chain::{ChainSpec, JointKind, JointSpec, KinematicChain, OriginSpec};
pub use manager::{ChainKinematics, IkTargetMode, KinematicsManager, ManipulatorSpec};
pub use solver::{DlsConfig, DlsSolver, IkResult, IkTarget};
