//! Seed trajectory generation for seedling.
//!
//! [`SimplePlanner`] walks an instruction tree and expands every plan
//! instruction into a dense run of moves. How a segment is expanded is chosen
//! by the named [`PlanProfile`] that the instruction resolves to: the default
//! [`LvsPlanProfile`] derives step counts from distance limits, while
//! [`FixedSizePlanProfile`] uses constant counts.

pub mod interpolate;
pub mod planner;
pub mod profile;
pub mod registry;
pub mod request;
pub mod status;
pub mod step;

pub use planner::SimplePlanner;
pub use profile::{
    Endpoint, FixedSizePlanProfile, LvsPlanProfile, PlanProfile, ProfileSwitch, ProfileSwitchProfile, plan_segment,
};
pub use registry::{ProfileRegistry, resolve_profile_name};
pub use request::{PlannerRequest, PlannerResponse};
pub use status::PlannerStatus;

/// Common imports for planner users.
pub mod prelude {
    pub use crate::{
        FixedSizePlanProfile, LvsPlanProfile, PlanProfile, PlannerRequest, PlannerResponse, PlannerStatus,
        SimplePlanner,
    };
    pub use seedling_core::prelude::*;
}
