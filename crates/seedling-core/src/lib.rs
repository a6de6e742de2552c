// seedling-core: Instruction model, kinematics traits, config and errors for seed trajectory generation.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub mod prelude {
    pub use crate::config::{
        DEFAULT_PLANNER_NAME, DEFAULT_PROFILE_KEY, FixedSizeProfileConfig, InterpolationSpace,
        LvsProfileConfig, PlannerConfig, ProfileConfig, ProfileRemapping,
    };
    pub use crate::error::{ConfigError, KinematicsError, PlanningError, SeedlingError, ValidationError};
    pub use crate::traits::{ForwardKinematics, InverseKinematics, KinematicsProvider};
    pub use crate::types::{
        CartesianWaypoint, CompositeInstruction, CompositeOrder, EnvState, Instruction, JointWaypoint,
        ManipulatorInfo, MotionType, MoveInstruction, PlanInstruction, Pose, StateWaypoint, Waypoint,
        WaypointKind,
    };
}
