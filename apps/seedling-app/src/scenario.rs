//! TOML scenarios: manipulators, environment, planner config and a program.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use nalgebra::DVector;
use serde::Deserialize;

use seedling_core::config::PlannerConfig;
use seedling_core::error::{ConfigError, SeedlingError, ValidationError};
use seedling_core::traits::KinematicsProvider;
use seedling_core::types::{
    CartesianWaypoint, CompositeInstruction, EnvState, JointWaypoint, ManipulatorInfo, MotionType, PlanInstruction,
    Waypoint,
};
use seedling_kinematics::chain::origin_to_isometry;
use seedling_kinematics::{KinematicsManager, ManipulatorSpec, OriginSpec};
use seedling_planner::{PlannerRequest, SimplePlanner};

// ---------------------------------------------------------------------------
// Serde model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub planner: PlannerConfig,
    pub manipulators: HashMap<String, ManipulatorSpec>,
    #[serde(default)]
    pub environment: EnvironmentSpec,
    pub program: ProgramSpec,
}

/// Current joint values and world poses of links.
///
/// A manipulator whose base link is not listed sits at the world origin.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvironmentSpec {
    #[serde(default)]
    pub joints: HashMap<String, f64>,
    #[serde(default)]
    pub links: HashMap<String, OriginSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProgramSpec {
    pub manipulator: String,
    #[serde(default)]
    pub ik_solver: Option<String>,
    #[serde(default)]
    pub tcp: Option<OriginSpec>,
    #[serde(default)]
    pub profile: Option<String>,
    /// Explicit start; the current joint values are used when absent.
    #[serde(default)]
    pub start: Option<WaypointSpec>,
    pub steps: Vec<StepSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WaypointSpec {
    Joint {
        values: Vec<f64>,
    },
    Cartesian {
        #[serde(default)]
        xyz: [f64; 3],
        #[serde(default)]
        rpy: [f64; 3],
    },
}

/// One entry of a step list: a single plan or a nested group of steps.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StepSpec {
    Plan(PlanStepSpec),
    Group(GroupSpec),
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlanStepSpec {
    pub target: WaypointSpec,
    #[serde(default)]
    pub motion: MotionType,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub manipulator: Option<String>,
    #[serde(default)]
    pub ik_solver: Option<String>,
    #[serde(default)]
    pub tcp: Option<OriginSpec>,
}

/// Nested composite. Its profile and manipulator settings are inherited by
/// every step inside it unless a step sets its own.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupSpec {
    pub steps: Vec<StepSpec>,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub manipulator: Option<String>,
    #[serde(default)]
    pub ik_solver: Option<String>,
    #[serde(default)]
    pub tcp: Option<OriginSpec>,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Scenario {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let scenario: Self = toml::from_str(content)?;
        scenario.planner.validate()?;
        if scenario.program.steps.is_empty() {
            return Err(ConfigError::MissingField("program.steps".into()));
        }
        Ok(scenario)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Build the planner and the request this scenario describes.
    pub fn build(&self) -> Result<(SimplePlanner, PlannerRequest), SeedlingError> {
        let planner = SimplePlanner::from_config(&self.planner)?;

        let mut manager = KinematicsManager::new();
        let mut env = EnvState::new();
        for (name, value) in &self.environment.joints {
            env = env.with_joint(name.clone(), *value);
        }
        for (link, origin) in &self.environment.links {
            env = env.with_link_transform(link.clone(), origin_to_isometry(origin));
        }
        for (name, spec) in &self.manipulators {
            manager.insert_spec(name.clone(), spec)?;
            if env.link_transform(&spec.chain.base_link).is_err() {
                env = env.with_link_transform(spec.chain.base_link.clone(), origin_to_isometry(&OriginSpec::default()));
            }
        }

        let instructions = self.program.instructions(&manager)?;

        let request = PlannerRequest::new(instructions, env)
            .with_kinematics(Arc::new(manager))
            .with_remapping(self.planner.remapping.clone());
        Ok((planner, request))
    }
}

impl ProgramSpec {
    fn instructions(&self, kinematics: &dyn KinematicsProvider) -> Result<CompositeInstruction, SeedlingError> {
        let info = manipulator_info(Some(&self.manipulator), self.ik_solver.as_ref(), self.tcp.as_ref());
        let mut program = CompositeInstruction::new().with_manipulator_info(info);
        program.profile.clone_from(&self.profile);
        if let Some(start) = &self.start {
            let names = joint_names(kinematics, &self.manipulator)?;
            program = program.with_start(PlanInstruction::new(start.to_waypoint(&names)?, MotionType::Start));
        }
        push_steps(&mut program, &self.steps, &self.manipulator, kinematics)?;
        Ok(program)
    }
}

/// Append `steps` to `composite`; `manipulator` is the one inherited from
/// the enclosing level and decides how joint targets are named.
fn push_steps(
    composite: &mut CompositeInstruction,
    steps: &[StepSpec],
    manipulator: &str,
    kinematics: &dyn KinematicsProvider,
) -> Result<(), SeedlingError> {
    for step in steps {
        match step {
            StepSpec::Plan(plan) => {
                let names = joint_names(kinematics, plan.manipulator.as_deref().unwrap_or(manipulator))?;
                let mut instruction = PlanInstruction::new(plan.target.to_waypoint(&names)?, plan.motion)
                    .with_description(plan.description.clone())
                    .with_manipulator_info(manipulator_info(
                        plan.manipulator.as_ref(),
                        plan.ik_solver.as_ref(),
                        plan.tcp.as_ref(),
                    ));
                instruction.profile.clone_from(&plan.profile);
                composite.push(instruction);
            }
            StepSpec::Group(group) => {
                if group.steps.is_empty() {
                    return Err(ConfigError::MissingField("steps of a nested group".into()).into());
                }
                let info = manipulator_info(group.manipulator.as_ref(), group.ik_solver.as_ref(), group.tcp.as_ref());
                let mut child = CompositeInstruction::new().with_manipulator_info(info);
                child.profile.clone_from(&group.profile);
                push_steps(
                    &mut child,
                    &group.steps,
                    group.manipulator.as_deref().unwrap_or(manipulator),
                    kinematics,
                )?;
                composite.push(child);
            }
        }
    }
    Ok(())
}

fn manipulator_info(
    manipulator: Option<&String>,
    ik_solver: Option<&String>,
    tcp: Option<&OriginSpec>,
) -> ManipulatorInfo {
    ManipulatorInfo {
        manipulator: manipulator.cloned(),
        ik_solver: ik_solver.cloned(),
        tcp: tcp.map(origin_to_isometry),
    }
}

fn joint_names(kinematics: &dyn KinematicsProvider, manipulator: &str) -> Result<Vec<String>, SeedlingError> {
    Ok(kinematics.fwd_kin(manipulator)?.joint_names().to_vec())
}

impl WaypointSpec {
    fn to_waypoint(&self, joint_names: &[String]) -> Result<Waypoint, ValidationError> {
        match self {
            Self::Joint { values } => {
                if values.len() != joint_names.len() {
                    return Err(ValidationError::DofMismatch {
                        expected: joint_names.len(),
                        got: values.len(),
                    });
                }
                Ok(JointWaypoint::new(joint_names.to_vec(), DVector::from_column_slice(values)).into())
            }
            Self::Cartesian { xyz, rpy } => {
                let pose = origin_to_isometry(&OriginSpec { xyz: *xyz, rpy: *rpy });
                Ok(CartesianWaypoint::new(pose).into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use seedling_core::types::Instruction;

    const SCENARIO: &str = include_str!("../../../demos/planar_pick.toml");

    #[test]
    fn demo_scenario_parses_and_builds() {
        let scenario = Scenario::from_toml_str(SCENARIO).unwrap();
        assert_eq!(scenario.program.manipulator, "arm");
        assert!(scenario.planner.profiles.contains_key("FINE"));

        let (planner, request) = scenario.build().unwrap();
        assert!(planner.profiles().contains("FINE"));
        assert_eq!(request.instructions.len(), scenario.program.steps.len());
        assert!(request.instructions.has_start_instruction());
        assert!(request.env_state.link_transform("base").is_ok());
    }

    #[test]
    fn demo_scenario_solves() {
        let (planner, request) = Scenario::from_toml_str(SCENARIO).unwrap().build().unwrap();
        let response = planner.solve(&request);
        assert!(response.is_success());
        let seed = response.results.unwrap();
        assert!(seed.flatten_moves().len() >= seed.len());

        // the nested group comes back as a composite holding one leaf per step
        let group = seed.instructions[3].as_composite().unwrap();
        assert_eq!(group.len(), 2);
        assert!(group.iter().all(|i| i.as_composite().is_some()));
    }

    #[test]
    fn joint_target_with_wrong_dof_is_rejected() {
        let spec = WaypointSpec::Joint { values: vec![0.0] };
        let names = vec!["a".to_string(), "b".to_string()];
        assert_eq!(
            spec.to_waypoint(&names).unwrap_err(),
            ValidationError::DofMismatch { expected: 2, got: 1 }
        );
    }

    #[test]
    fn cartesian_target_pose() {
        let spec = WaypointSpec::Cartesian {
            xyz: [0.4, 0.1, 0.05],
            rpy: [0.0, 0.0, 0.0],
        };
        let waypoint = spec.to_waypoint(&[]).unwrap();
        let pose = waypoint.as_cartesian().unwrap().pose;
        assert_relative_eq!(pose.translation.x, 0.4);
        assert_relative_eq!(pose.translation.z, 0.05);
    }

    const TWO_MANIPULATORS: &str = r#"
        [manipulators.arm.chain]
        name = "arm"
        [[manipulators.arm.chain.joints]]
        name = "a1"
        [[manipulators.arm.chain.joints]]
        name = "a2"
        origin = { xyz = [0.3, 0.0, 0.0] }

        [manipulators.gripper.chain]
        name = "gripper"
        [[manipulators.gripper.chain.joints]]
        name = "g"

        [environment]
        joints = { a1 = 0.0, a2 = 0.0, g = 0.0 }

        [program]
        manipulator = "arm"

        [[program.steps]]
        target = { type = "joint", values = [0.1, 0.2] }

        [[program.steps]]
        manipulator = "gripper"
        profile = "GRIP"

        [[program.steps.steps]]
        description = "close"
        target = { type = "joint", values = [0.5] }

        [[program.steps.steps]]
        tcp = { xyz = [0.0, 0.0, 0.1] }

        [[program.steps.steps.steps]]
        target = { type = "joint", values = [0.0] }
    "#;

    fn joint_names_of(instruction: &Instruction) -> Vec<String> {
        let plan = instruction.as_plan().unwrap();
        let Waypoint::Joint(joint) = &plan.waypoint else {
            panic!("expected a joint target, got {:?}", plan.waypoint.kind());
        };
        joint.joint_names.clone()
    }

    #[test]
    fn nested_groups_become_nested_composites() {
        let (_, request) = Scenario::from_toml_str(TWO_MANIPULATORS).unwrap().build().unwrap();
        let program = &request.instructions;
        assert_eq!(program.len(), 2);
        assert_eq!(joint_names_of(&program.instructions[0]), ["a1", "a2"]);

        let group = program.instructions[1].as_composite().unwrap();
        assert_eq!(group.manipulator_info.manipulator.as_deref(), Some("gripper"));
        assert_eq!(group.profile.as_deref(), Some("GRIP"));
        assert_eq!(group.len(), 2);
        assert_eq!(joint_names_of(&group.instructions[0]), ["g"]);
        assert_eq!(group.instructions[0].as_plan().unwrap().description, "close");

        let inner = group.instructions[1].as_composite().unwrap();
        assert!(inner.manipulator_info.manipulator.is_none());
        let tcp = inner.manipulator_info.tcp.unwrap();
        assert_relative_eq!(tcp.translation.z, 0.1);
        assert_eq!(joint_names_of(&inner.instructions[0]), ["g"]);
    }

    #[test]
    fn group_targets_use_the_group_manipulator() {
        let content = TWO_MANIPULATORS.replace("values = [0.5]", "values = [0.5, 0.5]");
        let err = Scenario::from_toml_str(&content).unwrap().build().unwrap_err();
        assert!(matches!(
            err,
            SeedlingError::Validation(ValidationError::DofMismatch { expected: 1, got: 2 })
        ));
    }

    #[test]
    fn empty_group_is_rejected() {
        let content = r#"
            [manipulators.arm.chain]
            name = "single"
            [[manipulators.arm.chain.joints]]
            name = "j"

            [program]
            manipulator = "arm"
            steps = [{ steps = [] }]
        "#;
        let err = Scenario::from_toml_str(content).unwrap().build().unwrap_err();
        assert!(matches!(err, SeedlingError::Config(ConfigError::MissingField(_))));
    }

    #[test]
    fn empty_program_is_rejected() {
        let content = r#"
            [manipulators.arm.chain]
            name = "single"
            [[manipulators.arm.chain.joints]]
            name = "j"

            [program]
            manipulator = "arm"
            steps = []
        "#;
        assert!(matches!(
            Scenario::from_toml_str(content),
            Err(ConfigError::MissingField(_))
        ));
    }
}
