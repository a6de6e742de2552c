use std::collections::HashMap;
use std::fmt;

use nalgebra::{DVector, Isometry3};
use serde::{Deserialize, Serialize};

use crate::error::{KinematicsError, ValidationError};

/// Rigid transform used for every Cartesian quantity (world, base, tool).
pub type Pose = Isometry3<f64>;

// ---------------------------------------------------------------------------
// Waypoints
// ---------------------------------------------------------------------------

/// A joint-space target authored by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointWaypoint {
    pub joint_names: Vec<String>,
    pub position: DVector<f64>,
}

impl JointWaypoint {
    /// # Panics
    ///
    /// Panics if `joint_names.len() != position.len()`.
    pub fn new(joint_names: Vec<String>, position: DVector<f64>) -> Self {
        assert_eq!(
            joint_names.len(),
            position.len(),
            "joint names and positions must have equal length"
        );
        Self {
            joint_names,
            position,
        }
    }

    pub fn from_slice(joint_names: &[&str], position: &[f64]) -> Self {
        Self::new(
            joint_names.iter().map(ToString::to_string).collect(),
            DVector::from_column_slice(position),
        )
    }

    pub fn dof(&self) -> usize {
        self.position.len()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_joint_format(&self.joint_names, &self.position)
    }

    /// Verify these joints are named and ordered exactly as `expected`.
    pub fn check_names(&self, expected: &[String]) -> Result<(), KinematicsError> {
        check_joint_names(expected, &self.joint_names)
    }
}

/// A fully resolved joint state. Produced only by the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateWaypoint {
    pub joint_names: Vec<String>,
    pub position: DVector<f64>,
}

impl StateWaypoint {
    /// # Panics
    ///
    /// Panics if `joint_names.len() != position.len()`.
    pub fn new(joint_names: Vec<String>, position: DVector<f64>) -> Self {
        assert_eq!(
            joint_names.len(),
            position.len(),
            "joint names and positions must have equal length"
        );
        Self {
            joint_names,
            position,
        }
    }

    pub fn dof(&self) -> usize {
        self.position.len()
    }

    pub fn check_names(&self, expected: &[String]) -> Result<(), KinematicsError> {
        check_joint_names(expected, &self.joint_names)
    }
}

impl From<&StateWaypoint> for JointWaypoint {
    fn from(state: &StateWaypoint) -> Self {
        Self {
            joint_names: state.joint_names.clone(),
            position: state.position.clone(),
        }
    }
}

impl From<JointWaypoint> for StateWaypoint {
    fn from(joint: JointWaypoint) -> Self {
        Self {
            joint_names: joint.joint_names,
            position: joint.position,
        }
    }
}

/// A tool pose target in the world frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartesianWaypoint {
    pub pose: Pose,
}

impl CartesianWaypoint {
    pub const fn new(pose: Pose) -> Self {
        Self { pose }
    }
}

impl From<Pose> for CartesianWaypoint {
    fn from(pose: Pose) -> Self {
        Self::new(pose)
    }
}

/// Discriminant of [`Waypoint`], used for logging and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaypointKind {
    Joint,
    Cartesian,
    State,
}

impl fmt::Display for WaypointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Joint => "joint",
            Self::Cartesian => "cartesian",
            Self::State => "state",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waypoint {
    Joint(JointWaypoint),
    Cartesian(CartesianWaypoint),
    State(StateWaypoint),
}

impl Waypoint {
    pub const fn kind(&self) -> WaypointKind {
        match self {
            Self::Joint(_) => WaypointKind::Joint,
            Self::Cartesian(_) => WaypointKind::Cartesian,
            Self::State(_) => WaypointKind::State,
        }
    }

    pub const fn as_state(&self) -> Option<&StateWaypoint> {
        match self {
            Self::State(s) => Some(s),
            _ => None,
        }
    }

    pub const fn as_cartesian(&self) -> Option<&CartesianWaypoint> {
        match self {
            Self::Cartesian(c) => Some(c),
            _ => None,
        }
    }
}

impl From<JointWaypoint> for Waypoint {
    fn from(wp: JointWaypoint) -> Self {
        Self::Joint(wp)
    }
}

impl From<CartesianWaypoint> for Waypoint {
    fn from(wp: CartesianWaypoint) -> Self {
        Self::Cartesian(wp)
    }
}

impl From<StateWaypoint> for Waypoint {
    fn from(wp: StateWaypoint) -> Self {
        Self::State(wp)
    }
}

fn check_joint_format(names: &[String], position: &DVector<f64>) -> Result<(), ValidationError> {
    if names.len() != position.len() {
        return Err(ValidationError::JointLengthMismatch {
            names: names.len(),
            positions: position.len(),
        });
    }
    if position.iter().any(|v| v.is_nan()) {
        return Err(ValidationError::ContainsNan);
    }
    Ok(())
}

fn check_joint_names(expected: &[String], got: &[String]) -> Result<(), KinematicsError> {
    if expected == got {
        Ok(())
    } else {
        Err(KinematicsError::JointNamesMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        })
    }
}

// ---------------------------------------------------------------------------
// ManipulatorInfo
// ---------------------------------------------------------------------------

/// Identifies the kinematic chain, IK solver and tool frame for a motion.
///
/// Every field is optional; [`ManipulatorInfo::combine`] layers a child
/// description over a parent one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManipulatorInfo {
    #[serde(default)]
    pub manipulator: Option<String>,
    #[serde(default)]
    pub ik_solver: Option<String>,
    #[serde(default)]
    pub tcp: Option<Pose>,
}

impl ManipulatorInfo {
    pub fn new(manipulator: impl Into<String>) -> Self {
        Self {
            manipulator: Some(manipulator.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_ik_solver(mut self, solver: impl Into<String>) -> Self {
        self.ik_solver = Some(solver.into());
        self
    }

    #[must_use]
    pub fn with_tcp(mut self, tcp: Pose) -> Self {
        self.tcp = Some(tcp);
        self
    }

    pub const fn is_empty(&self) -> bool {
        self.manipulator.is_none() && self.ik_solver.is_none() && self.tcp.is_none()
    }

    /// Fields set on `child` win; unset fields inherit from `self`.
    #[must_use]
    pub fn combine(&self, child: &Self) -> Self {
        Self {
            manipulator: child.manipulator.clone().or_else(|| self.manipulator.clone()),
            ik_solver: child.ik_solver.clone().or_else(|| self.ik_solver.clone()),
            tcp: child.tcp.or(self.tcp),
        }
    }
}

// ---------------------------------------------------------------------------
// Instructions
// ---------------------------------------------------------------------------

/// Motion tag shared by plan and move instructions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionType {
    Start,
    Linear,
    #[default]
    Freespace,
}

/// One authored motion directive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanInstruction {
    pub waypoint: Waypoint,
    pub plan_type: MotionType,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub manipulator_info: ManipulatorInfo,
    #[serde(default)]
    pub description: String,
}

impl PlanInstruction {
    pub fn new(waypoint: impl Into<Waypoint>, plan_type: MotionType) -> Self {
        Self {
            waypoint: waypoint.into(),
            plan_type,
            profile: None,
            manipulator_info: ManipulatorInfo::default(),
            description: String::new(),
        }
    }

    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    #[must_use]
    pub fn with_manipulator_info(mut self, info: ManipulatorInfo) -> Self {
        self.manipulator_info = info;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_start(&self) -> bool {
        self.plan_type == MotionType::Start
    }

    pub fn is_linear(&self) -> bool {
        self.plan_type == MotionType::Linear
    }

    pub fn is_freespace(&self) -> bool {
        self.plan_type == MotionType::Freespace
    }
}

/// One dense output state of a seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveInstruction {
    pub waypoint: Waypoint,
    pub move_type: MotionType,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub manipulator_info: ManipulatorInfo,
    #[serde(default)]
    pub description: String,
}

impl MoveInstruction {
    pub fn new(waypoint: impl Into<Waypoint>, move_type: MotionType) -> Self {
        Self {
            waypoint: waypoint.into(),
            move_type,
            profile: None,
            manipulator_info: ManipulatorInfo::default(),
            description: String::new(),
        }
    }

    /// Build a move that carries the metadata of the plan instruction it expands.
    pub fn from_plan(waypoint: impl Into<Waypoint>, move_type: MotionType, base: &PlanInstruction) -> Self {
        Self {
            waypoint: waypoint.into(),
            move_type,
            profile: base.profile.clone(),
            manipulator_info: base.manipulator_info.clone(),
            description: base.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instruction {
    Plan(PlanInstruction),
    Move(MoveInstruction),
    Composite(CompositeInstruction),
}

impl Instruction {
    pub const fn as_plan(&self) -> Option<&PlanInstruction> {
        match self {
            Self::Plan(p) => Some(p),
            _ => None,
        }
    }

    pub const fn as_move(&self) -> Option<&MoveInstruction> {
        match self {
            Self::Move(m) => Some(m),
            _ => None,
        }
    }

    pub const fn as_composite(&self) -> Option<&CompositeInstruction> {
        match self {
            Self::Composite(c) => Some(c),
            _ => None,
        }
    }
}

impl From<PlanInstruction> for Instruction {
    fn from(i: PlanInstruction) -> Self {
        Self::Plan(i)
    }
}

impl From<MoveInstruction> for Instruction {
    fn from(i: MoveInstruction) -> Self {
        Self::Move(i)
    }
}

impl From<CompositeInstruction> for Instruction {
    fn from(i: CompositeInstruction) -> Self {
        Self::Composite(i)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeOrder {
    #[default]
    Ordered,
    Unordered,
    OrderedAndReversible,
}

/// An ordered, possibly nested program of instructions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositeInstruction {
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub order: CompositeOrder,
    #[serde(default)]
    pub manipulator_info: ManipulatorInfo,
    #[serde(default)]
    pub start_instruction: Option<Box<Instruction>>,
    #[serde(default)]
    pub instructions: Vec<Instruction>,
}

impl CompositeInstruction {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty composite carrying the same profile, order and manipulator.
    pub fn empty_like(other: &Self) -> Self {
        Self {
            profile: other.profile.clone(),
            order: other.order,
            manipulator_info: other.manipulator_info.clone(),
            start_instruction: None,
            instructions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    #[must_use]
    pub fn with_manipulator_info(mut self, info: ManipulatorInfo) -> Self {
        self.manipulator_info = info;
        self
    }

    #[must_use]
    pub fn with_start(mut self, start: impl Into<Instruction>) -> Self {
        self.start_instruction = Some(Box::new(start.into()));
        self
    }

    pub fn push(&mut self, instruction: impl Into<Instruction>) {
        self.instructions.push(instruction.into());
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }

    pub fn has_start_instruction(&self) -> bool {
        self.start_instruction.is_some()
    }

    /// All move instructions in depth-first order, excluding the start.
    pub fn flatten_moves(&self) -> Vec<&MoveInstruction> {
        let mut out = Vec::new();
        collect_moves(self, &mut out);
        out
    }
}

fn collect_moves<'a>(composite: &'a CompositeInstruction, out: &mut Vec<&'a MoveInstruction>) {
    for instruction in &composite.instructions {
        match instruction {
            Instruction::Move(m) => out.push(m),
            Instruction::Composite(c) => collect_moves(c, out),
            Instruction::Plan(_) => {}
        }
    }
}

impl<'a> IntoIterator for &'a CompositeInstruction {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}

// ---------------------------------------------------------------------------
// EnvState
// ---------------------------------------------------------------------------

/// Snapshot of the environment: current joint values and world link poses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvState {
    #[serde(default)]
    pub joints: HashMap<String, f64>,
    #[serde(default)]
    pub link_transforms: HashMap<String, Pose>,
}

impl EnvState {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_joint(mut self, name: impl Into<String>, value: f64) -> Self {
        self.joints.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn with_link_transform(mut self, link: impl Into<String>, pose: Pose) -> Self {
        self.link_transforms.insert(link.into(), pose);
        self
    }

    /// Joint values in the order of `names`.
    pub fn joint_values(&self, names: &[String]) -> Result<DVector<f64>, KinematicsError> {
        let values = names
            .iter()
            .map(|name| {
                self.joints
                    .get(name)
                    .copied()
                    .ok_or_else(|| KinematicsError::MissingJoint(name.clone()))
            })
            .collect::<Result<Vec<f64>, _>>()?;
        Ok(DVector::from_vec(values))
    }

    pub fn link_transform(&self, link: &str) -> Result<&Pose, KinematicsError> {
        self.link_transforms
            .get(link)
            .ok_or_else(|| KinematicsError::MissingLinkTransform(link.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
