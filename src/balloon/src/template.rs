use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};

use crate::error::BuildError;
use crate::ring::Ring;
use crate::shape::ShapeDescriptor;
use crate::V2;
use protocol::FruitKind;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringParams {
	pub frequency: f32,
	pub damping: f32,
}

impl Default for SpringParams {
	fn default() -> Self {
		Self {
			frequency: 12.0,
			damping: 0.6,
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorMode {
	#[default]
	None,
	// anchor body moves with the ring
	ParentDynamic,
	FixedWorld,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionMode {
	#[default]
	SoftForce,
	HardSnap,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PressureParams {
	pub stiffness: f32,
	pub damping: f32,
}

impl Default for PressureParams {
	fn default() -> Self {
		Self {
			stiffness: 40.0,
			damping: 0.2,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaxClamp {
	pub soft: bool,
	pub stiffness: f32,
	pub damping: f32,
}

impl Default for MaxClamp {
	fn default() -> Self {
		Self {
			soft: true,
			stiffness: 60.0,
			damping: 0.3,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stabilization {
	pub velocity_damping: f32,
	pub max_speed: f32,
	pub center_strength: f32,
}

impl Default for Stabilization {
	fn default() -> Self {
		Self {
			velocity_damping: 0.96,
			max_speed: 12.0,
			center_strength: 6.0,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoSnap {
	pub trigger_factor: f32,
	pub cooldown: f32,
	pub velocity_damping: f32,
}

impl Default for AutoSnap {
	fn default() -> Self {
		Self {
			trigger_factor: 0.8,
			cooldown: 0.5,
			velocity_damping: 0.6,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Spread {
	// edge rest length during the spread, as a fraction of the chord
	pub rest_length_factor: f32,
	pub delay: f32,
}

impl Default for Spread {
	fn default() -> Self {
		Self {
			rest_length_factor: 0.1,
			delay: 0.1,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftCancel {
	pub strength: f32,
	pub idle_epsilon: f32,
}

impl Default for DriftCancel {
	fn default() -> Self {
		Self {
			strength: 0.35,
			idle_epsilon: 0.02,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Solver {
	pub substeps: usize,
	pub iterations: usize,
}

impl Default for Solver {
	fn default() -> Self {
		Self {
			substeps: 4,
			iterations: 2,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingTemplate {
	pub node_count: usize,
	// None: take the radius of the node shape
	pub radius: Option<f32>,
	pub node_shape: ShapeDescriptor,
	pub node_scale: [f32; 2],
	pub node_mass: f32,
	pub gravity_scale: f32,
	pub linear_drag: f32,
	pub gravity: [f32; 2],

	pub edge: SpringParams,
	pub shear: Option<SpringParams>,
	pub radial: Option<SpringParams>,
	pub anchor: AnchorMode,
	pub anchor_mass: f32,

	pub pressure: PressureParams,
	pub max_compression: f32,
	pub compression_mode: CompressionMode,
	pub min_clamp_stiffness: f32,
	pub max_radius_factor: f32,
	pub max_clamp: MaxClamp,

	pub self_collision: bool,
	pub stabilization: Option<Stabilization>,
	pub auto_snap: Option<AutoSnap>,
	pub spread: Option<Spread>,
	pub drift_cancel: Option<DriftCancel>,
	pub initial_impulse: f32,
	pub solver: Solver,
	pub seed: u64,
}

impl Default for RingTemplate {
	fn default() -> Self {
		Self {
			node_count: 32,
			radius: Some(0.5),
			node_shape: ShapeDescriptor::Circle { radius: 0.08 },
			node_scale: [1.0, 1.0],
			node_mass: 0.05,
			gravity_scale: 1.0,
			linear_drag: 0.1,
			gravity: [0.0, -9.81],

			edge: SpringParams::default(),
			shear: None,
			radial: None,
			anchor: AnchorMode::None,
			anchor_mass: 1.0,

			pressure: PressureParams::default(),
			max_compression: 0.4,
			compression_mode: CompressionMode::SoftForce,
			min_clamp_stiffness: 60.0,
			max_radius_factor: 1.25,
			max_clamp: MaxClamp::default(),

			self_collision: false,
			stabilization: None,
			auto_snap: Some(AutoSnap::default()),
			spread: Some(Spread::default()),
			drift_cancel: Some(DriftCancel::default()),
			initial_impulse: 0.0,
			solver: Solver::default(),
			seed: 0,
		}
	}
}

fn positive(name: &'static str, x: f32) -> Result<(), BuildError> {
	if x.is_finite() && x > 0.0 {
		Ok(())
	} else {
		Err(BuildError::invalid(name, format!("must be positive, got {}", x)))
	}
}

fn non_negative(name: &'static str, x: f32) -> Result<(), BuildError> {
	if x.is_finite() && x >= 0.0 {
		Ok(())
	} else {
		Err(BuildError::invalid(
			name,
			format!("must be non-negative, got {}", x),
		))
	}
}

impl RingTemplate {
	pub fn with_node_count(mut self, n: usize) -> Self {
		self.node_count = n;
		self
	}

	pub fn with_radius(mut self, r: f32) -> Self {
		self.radius = Some(r);
		self
	}

	pub fn with_gravity(mut self, g: [f32; 2]) -> Self {
		self.gravity = g;
		self
	}

	pub fn node_radius(&self) -> f32 {
		self.node_shape.radius(self.node_scale)
	}

	pub fn ring_radius(&self) -> f32 {
		self.radius.unwrap_or_else(|| self.node_radius()).max(0.001)
	}

	pub fn gravity_v(&self) -> V2 {
		V2::new(self.gravity[0], self.gravity[1])
	}

	pub fn validate(&self) -> Result<(), BuildError> {
		if self.node_count < 3 {
			return Err(BuildError::TooFewNodes {
				count: self.node_count,
			});
		}
		if let Some(r) = self.radius {
			positive("radius", r)?;
		}
		positive("node_mass", self.node_mass)?;
		positive("anchor_mass", self.anchor_mass)?;
		non_negative("linear_drag", self.linear_drag)?;
		positive("edge.frequency", self.edge.frequency)?;
		if let Some(s) = self.shear {
			positive("shear.frequency", s.frequency)?;
		}
		if let Some(s) = self.radial {
			positive("radial.frequency", s.frequency)?;
			if self.anchor == AnchorMode::None {
				return Err(BuildError::invalid(
					"radial",
					"radial springs need an anchor",
				));
			}
		}
		non_negative("pressure.stiffness", self.pressure.stiffness)?;
		if !(0.0..1.0).contains(&self.max_compression) {
			return Err(BuildError::invalid(
				"max_compression",
				format!("must be in [0, 1), got {}", self.max_compression),
			));
		}
		positive("max_radius_factor", self.max_radius_factor)?;
		if let Some(a) = self.auto_snap {
			non_negative("auto_snap.cooldown", a.cooldown)?;
			non_negative("auto_snap.trigger_factor", a.trigger_factor)?;
		}
		if let Some(s) = self.spread {
			non_negative("spread.delay", s.delay)?;
			non_negative("spread.rest_length_factor", s.rest_length_factor)?;
		}
		if self.solver.substeps == 0 || self.solver.iterations == 0 {
			return Err(BuildError::invalid(
				"solver",
				"substeps and iterations must be at least 1",
			));
		}
		non_negative("initial_impulse", self.initial_impulse)?;
		Ok(())
	}
}

/// Ring templates keyed by fruit kind.
#[derive(Clone, Debug, Default)]
pub struct TemplateSet {
	data: FnvHashMap<FruitKind, RingTemplate>,
}

impl TemplateSet {
	pub fn insert(&mut self, kind: FruitKind, template: RingTemplate) {
		self.data.insert(kind, template);
	}

	pub fn get(&self, kind: FruitKind) -> Option<&RingTemplate> {
		self.data.get(&kind)
	}

	pub fn len(&self) -> usize {
		self.data.len()
	}

	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	pub fn build(&self, kind: FruitKind, origin: V2) -> Result<Ring, BuildError> {
		let template = self
			.get(kind)
			.ok_or(BuildError::MissingTemplate { kind })?;
		Ring::build(template, origin)
	}
}
