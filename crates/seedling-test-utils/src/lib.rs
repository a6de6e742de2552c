//! Shared test fixtures and utilities for seedling crates.
//!
//! Provides stub kinematics with predictable FK/IK, fixture builders for
//! instructions and environment state, and deterministic RNG setup.

pub mod fixtures;
pub mod mocks;
pub mod rng;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use fixtures::{
    BASE_LINK, MANIPULATOR, env_state, joint_names, joint_waypoint, stub_kinematics, stub_provider,
};
pub use mocks::{StubKinematics, StubProvider};
pub use rng::{deterministic_joints, seeded_rng};
