use std::collections::HashMap;
use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Profile name used when an instruction does not name one.
pub const DEFAULT_PROFILE_KEY: &str = "DEFAULT";

/// Planner name used when none is configured.
pub const DEFAULT_PLANNER_NAME: &str = "SimplePlanner";

/// `remapping[planner_name][profile] = replacement_profile`.
pub type ProfileRemapping = HashMap<String, HashMap<String, String>>;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_state_lvs() -> f64 {
    5.0 * PI / 180.0
}
const fn default_translation_lvs() -> f64 {
    0.1
}
const fn default_rotation_lvs() -> f64 {
    5.0 * PI / 180.0
}
const fn default_min_steps() -> usize {
    1
}
const fn default_fixed_steps() -> usize {
    10
}
fn default_planner_name() -> String {
    DEFAULT_PLANNER_NAME.into()
}

// ---------------------------------------------------------------------------
// InterpolationSpace
// ---------------------------------------------------------------------------

/// Space in which linear motion is interpolated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationSpace {
    /// Resolve endpoints to joint vectors and interpolate joint-wise.
    #[default]
    Joint,
    /// Interpolate tool poses directly and emit Cartesian waypoints.
    Cartesian,
}

// ---------------------------------------------------------------------------
// LvsProfileConfig
// ---------------------------------------------------------------------------

/// Longest-valid-segment limits for distance-adaptive interpolation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LvsProfileConfig {
    /// Maximum joint-space displacement per step (norm of the joint delta).
    #[serde(default = "default_state_lvs")]
    pub state_longest_valid_segment_length: f64,

    /// Maximum tool translation per step in meters.
    #[serde(default = "default_translation_lvs")]
    pub translation_longest_valid_segment_length: f64,

    /// Maximum tool rotation per step in radians.
    #[serde(default = "default_rotation_lvs")]
    pub rotation_longest_valid_segment_length: f64,

    /// Lower bound on the derived step count.
    #[serde(default = "default_min_steps")]
    pub min_steps: usize,

    #[serde(default)]
    pub linear_space: InterpolationSpace,
}

impl Default for LvsProfileConfig {
    fn default() -> Self {
        Self {
            state_longest_valid_segment_length: default_state_lvs(),
            translation_longest_valid_segment_length: default_translation_lvs(),
            rotation_longest_valid_segment_length: default_rotation_lvs(),
            min_steps: default_min_steps(),
            linear_space: InterpolationSpace::Joint,
        }
    }
}

impl LvsProfileConfig {
    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive(
            "state_longest_valid_segment_length",
            self.state_longest_valid_segment_length,
        )?;
        check_positive(
            "translation_longest_valid_segment_length",
            self.translation_longest_valid_segment_length,
        )?;
        check_positive(
            "rotation_longest_valid_segment_length",
            self.rotation_longest_valid_segment_length,
        )
    }
}

fn check_positive(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field: field.into(),
            message: format!("must be finite and > 0, got {value}"),
        })
    }
}

// ---------------------------------------------------------------------------
// FixedSizeProfileConfig
// ---------------------------------------------------------------------------

/// Fixed step counts per motion type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedSizeProfileConfig {
    #[serde(default = "default_fixed_steps")]
    pub freespace_steps: usize,

    #[serde(default = "default_fixed_steps")]
    pub linear_steps: usize,

    #[serde(default)]
    pub linear_space: InterpolationSpace,
}

impl Default for FixedSizeProfileConfig {
    fn default() -> Self {
        Self {
            freespace_steps: default_fixed_steps(),
            linear_steps: default_fixed_steps(),
            linear_space: InterpolationSpace::Joint,
        }
    }
}

// ---------------------------------------------------------------------------
// ProfileConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProfileConfig {
    Lvs(LvsProfileConfig),
    FixedSize(FixedSizeProfileConfig),
}

impl ProfileConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Lvs(lvs) => lvs.validate(),
            Self::FixedSize(_) => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// PlannerConfig
// ---------------------------------------------------------------------------

/// Planner identity, named profiles and profile remapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default = "default_planner_name")]
    pub name: String,

    #[serde(default)]
    pub profiles: HashMap<String, ProfileConfig>,

    #[serde(default)]
    pub remapping: ProfileRemapping,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            name: default_planner_name(),
            profiles: HashMap::new(),
            remapping: ProfileRemapping::new(),
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::MissingField("name".into()));
        }
        for (name, profile) in &self.profiles {
            profile.validate().map_err(|e| match e {
                ConfigError::InvalidValue { field, message } => ConfigError::InvalidValue {
                    field: format!("profiles.{name}.{field}"),
                    message,
                },
                other => other,
            })?;
        }
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn lvs_defaults() {
        let cfg = LvsProfileConfig::default();
        assert_relative_eq!(cfg.state_longest_valid_segment_length, 0.087_266, epsilon = 1e-6);
        assert_relative_eq!(cfg.translation_longest_valid_segment_length, 0.1);
        assert_relative_eq!(cfg.rotation_longest_valid_segment_length, 0.087_266, epsilon = 1e-6);
        assert_eq!(cfg.min_steps, 1);
        assert_eq!(cfg.linear_space, InterpolationSpace::Joint);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn lvs_rejects_non_positive_limits() {
        let cfg = LvsProfileConfig {
            translation_longest_valid_segment_length: 0.0,
            ..LvsProfileConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("translation_longest_valid_segment_length"));

        let cfg = LvsProfileConfig {
            state_longest_valid_segment_length: f64::NAN,
            ..LvsProfileConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn fixed_size_defaults() {
        let cfg = FixedSizeProfileConfig::default();
        assert_eq!(cfg.freespace_steps, 10);
        assert_eq!(cfg.linear_steps, 10);
    }

    #[test]
    fn planner_config_defaults() {
        let cfg = PlannerConfig::default();
        assert_eq!(cfg.name, "SimplePlanner");
        assert!(cfg.profiles.is_empty());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn planner_config_from_toml() {
        let toml = r#"
            name = "seed"

            [profiles.DEFAULT]
            kind = "lvs"
            state_longest_valid_segment_length = 0.05
            min_steps = 3

            [profiles.COARSE]
            kind = "fixed_size"
            freespace_steps = 4
            linear_space = "cartesian"

            [remapping.seed]
            FAST = "COARSE"
        "#;
        let cfg = PlannerConfig::from_toml_str(toml).unwrap();
        assert_eq!(cfg.name, "seed");
        match &cfg.profiles["DEFAULT"] {
            ProfileConfig::Lvs(lvs) => {
                assert_relative_eq!(lvs.state_longest_valid_segment_length, 0.05);
                assert_relative_eq!(lvs.translation_longest_valid_segment_length, 0.1);
                assert_eq!(lvs.min_steps, 3);
            }
            other => panic!("expected lvs profile, got {other:?}"),
        }
        match &cfg.profiles["COARSE"] {
            ProfileConfig::FixedSize(fixed) => {
                assert_eq!(fixed.freespace_steps, 4);
                assert_eq!(fixed.linear_steps, 10);
                assert_eq!(fixed.linear_space, InterpolationSpace::Cartesian);
            }
            other => panic!("expected fixed_size profile, got {other:?}"),
        }
        assert_eq!(cfg.remapping["seed"]["FAST"], "COARSE");
    }

    #[test]
    fn planner_config_invalid_profile_names_field() {
        let toml = r#"
            [profiles.BAD]
            kind = "lvs"
            rotation_longest_valid_segment_length = -1.0
        "#;
        let err = PlannerConfig::from_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("profiles.BAD.rotation_longest_valid_segment_length"));
    }

    #[test]
    fn planner_config_unknown_kind_is_parse_error() {
        let toml = r#"
            [profiles.X]
            kind = "spline"
        "#;
        assert!(matches!(
            PlannerConfig::from_toml_str(toml),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn planner_config_missing_file() {
        let err = PlannerConfig::from_file("/nonexistent/planner.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
