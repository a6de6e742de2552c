//! Profile name resolution and the per-planner profile table.
//!
//! Lookup order is fixed:
//!
//! 1. the instruction's profile name, or `DEFAULT` when it has none,
//!    rewritten through `remapping[planner_name]` when an entry exists;
//! 2. the profile registered under that name;
//! 3. the profile registered under `DEFAULT`;
//! 4. a built-in [`LvsPlanProfile`] with default limits.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use seedling_core::config::{DEFAULT_PROFILE_KEY, ProfileRemapping};

use crate::profile::{LvsPlanProfile, PlanProfile};

/// Effective profile name for an instruction.
pub fn resolve_profile_name(profile: Option<&str>, planner_name: &str, remapping: &ProfileRemapping) -> String {
    let name = profile.filter(|p| !p.is_empty()).unwrap_or(DEFAULT_PROFILE_KEY);
    match remapping.get(planner_name).and_then(|table| table.get(name)) {
        Some(remapped) => {
            debug!(planner = planner_name, from = name, to = %remapped, "profile remapped");
            remapped.clone()
        }
        None => name.to_string(),
    }
}

// ---------------------------------------------------------------------------
// ProfileRegistry
// ---------------------------------------------------------------------------

/// Named plan profiles. `DEFAULT` is always present.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: HashMap<String, Arc<dyn PlanProfile>>,
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileRegistry {
    pub fn new() -> Self {
        let mut profiles: HashMap<String, Arc<dyn PlanProfile>> = HashMap::new();
        profiles.insert(DEFAULT_PROFILE_KEY.to_string(), Arc::new(LvsPlanProfile::default()));
        Self { profiles }
    }

    /// Register or replace the profile stored under `name`.
    pub fn register(&mut self, name: impl Into<String>, profile: Arc<dyn PlanProfile>) {
        self.profiles.insert(name.into(), profile);
    }

    /// Remove a profile. Returns whether it was present.
    ///
    /// Removing `DEFAULT` reinstalls the built-in LVS profile in its place.
    pub fn remove(&mut self, name: &str) -> bool {
        let removed = self.profiles.remove(name).is_some();
        if name == DEFAULT_PROFILE_KEY {
            self.profiles.insert(DEFAULT_PROFILE_KEY.to_string(), Arc::new(LvsPlanProfile::default()));
        }
        removed
    }

    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Profile for `name`, falling back to `DEFAULT` and then to the built-in
    /// LVS profile.
    pub fn get(&self, name: &str) -> Arc<dyn PlanProfile> {
        if let Some(profile) = self.profiles.get(name) {
            return Arc::clone(profile);
        }
        if let Some(profile) = self.profiles.get(DEFAULT_PROFILE_KEY) {
            debug!(profile = name, "profile not registered, using {DEFAULT_PROFILE_KEY}");
            return Arc::clone(profile);
        }
        debug!(profile = name, "no {DEFAULT_PROFILE_KEY} profile registered, using built-in LVS");
        Arc::new(LvsPlanProfile::default())
    }
}
