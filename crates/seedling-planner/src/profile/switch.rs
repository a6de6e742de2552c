//! Branch selection on a composite's profile, for an outer task graph.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tracing::debug;

use seedling_core::config::ProfileRemapping;
use seedling_core::types::CompositeInstruction;

use crate::registry::resolve_profile_name;

/// Name under which remapping entries for the switch are looked up.
pub const DEFAULT_SWITCH_NAME: &str = "Profile Switch";

const fn default_return_value() -> i32 {
    1
}

/// Branch value returned for one composite profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSwitchProfile {
    #[serde(default = "default_return_value")]
    pub return_value: i32,
}

impl Default for ProfileSwitchProfile {
    fn default() -> Self {
        Self {
            return_value: default_return_value(),
        }
    }
}

impl ProfileSwitchProfile {
    pub const fn new(return_value: i32) -> Self {
        Self { return_value }
    }
}

/// Maps a composite instruction's profile to a branch value.
///
/// Returns 0 once aborted; unknown profiles yield the default value of 1.
#[derive(Debug)]
pub struct ProfileSwitch {
    name: String,
    pub composite_profiles: HashMap<String, ProfileSwitchProfile>,
    abort: AtomicBool,
}

impl Default for ProfileSwitch {
    fn default() -> Self {
        Self::new(DEFAULT_SWITCH_NAME)
    }
}

impl ProfileSwitch {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            composite_profiles: HashMap::new(),
            abort: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn with_profile(mut self, name: impl Into<String>, profile: ProfileSwitchProfile) -> Self {
        self.composite_profiles.insert(name.into(), profile);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn abort(&self) -> bool {
        self.abort.load(Ordering::Acquire)
    }

    pub fn set_abort(&self, abort: bool) {
        self.abort.store(abort, Ordering::Release);
    }

    pub fn evaluate(&self, composite: &CompositeInstruction, remapping: &ProfileRemapping) -> i32 {
        if self.abort() {
            return 0;
        }

        let profile = resolve_profile_name(composite.profile.as_deref(), &self.name, remapping);
        let value = self.composite_profiles.get(&profile).copied().unwrap_or_else(|| {
            debug!(switch = %self.name, profile = %profile, "no switch profile registered, using default");
            ProfileSwitchProfile::default()
        });
        value.return_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composite(profile: &str) -> CompositeInstruction {
        CompositeInstruction::new().with_profile(profile)
    }

    #[test]
    fn unknown_profile_returns_one() {
        let switch = ProfileSwitch::default();
        assert_eq!(switch.name(), "Profile Switch");
        assert_eq!(switch.evaluate(&composite("RASTER"), &ProfileRemapping::new()), 1);
        assert_eq!(switch.evaluate(&CompositeInstruction::new(), &ProfileRemapping::new()), 1);
    }

    #[test]
    fn registered_profile_selects_branch() {
        let switch = ProfileSwitch::default()
            .with_profile("RASTER", ProfileSwitchProfile::new(2))
            .with_profile("DEFAULT", ProfileSwitchProfile::new(5));
        assert_eq!(switch.evaluate(&composite("RASTER"), &ProfileRemapping::new()), 2);
        assert_eq!(switch.evaluate(&CompositeInstruction::new(), &ProfileRemapping::new()), 5);
    }

    #[test]
    fn remapping_uses_switch_name() {
        let switch = ProfileSwitch::new("branch").with_profile("TRANSITION", ProfileSwitchProfile::new(3));
        let mut remapping = ProfileRemapping::new();
        remapping.insert(
            "branch".into(),
            HashMap::from([("RASTER".to_string(), "TRANSITION".to_string())]),
        );
        assert_eq!(switch.evaluate(&composite("RASTER"), &remapping), 3);
    }

    #[test]
    fn aborted_switch_returns_zero() {
        let switch = ProfileSwitch::default().with_profile("RASTER", ProfileSwitchProfile::new(2));
        switch.set_abort(true);
        assert!(switch.abort());
        assert_eq!(switch.evaluate(&composite("RASTER"), &ProfileRemapping::new()), 0);
        switch.set_abort(false);
        assert_eq!(switch.evaluate(&composite("RASTER"), &ProfileRemapping::new()), 2);
    }
}
