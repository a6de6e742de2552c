use thiserror::Error;

use crate::types::MotionType;

/// Top-level error type for seedling.
#[derive(Debug, Error)]
pub enum SeedlingError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Kinematics error: {0}")]
    Kinematics(#[from] KinematicsError),

    #[error("Planning error: {0}")]
    Planning(#[from] PlanningError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Errors raised by a kinematics provider or while reading the environment.
#[derive(Debug, Error)]
pub enum KinematicsError {
    #[error("Unknown manipulator: {0}")]
    UnknownManipulator(String),

    #[error("Forward kinematics failed for {0}")]
    ForwardFailed(String),

    #[error("Inverse kinematics failed for {0}")]
    InverseFailed(String),

    #[error("Forward and inverse kinematics joints are not ordered the same for {0}")]
    JointOrderMismatch(String),

    #[error("Joint names do not match the kinematic chain: expected {expected:?}, got {got:?}")]
    JointNamesMismatch {
        expected: Vec<String>,
        got: Vec<String>,
    },

    #[error("Joint not found in environment state: {0}")]
    MissingJoint(String),

    #[error("Link transform not found in environment state: {0}")]
    MissingLinkTransform(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Abortive failures while expanding an instruction tree into a seed.
#[derive(Debug, Error)]
pub enum PlanningError {
    #[error("Unsupported move instruction type: {0:?}")]
    UnsupportedMoveType(MotionType),

    #[error("Start instruction must be a plan instruction of type Start, got {0}")]
    InvalidStartInstruction(String),

    #[error("Request has no kinematics provider")]
    MissingKinematics,

    #[error("No manipulator specified for instruction '{0}'")]
    MissingManipulator(String),

    #[error("Segment needs {requested} steps, more than the limit of {max}")]
    TooManySteps { requested: f64, max: usize },

    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("Invalid profile: {0}")]
    InvalidProfile(#[from] ConfigError),

    #[error(transparent)]
    Kinematics(#[from] KinematicsError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Internal invariant violations on joint vectors.
///
/// Copy + static messages for cheap propagation in hot paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Joint name/position length mismatch: {names} names, {positions} positions")]
    JointLengthMismatch { names: usize, positions: usize },

    #[error("Degrees of freedom mismatch: expected {expected}, got {got}")]
    DofMismatch { expected: usize, got: usize },

    #[error("Joint vector contains NaN")]
    ContainsNan,
}
