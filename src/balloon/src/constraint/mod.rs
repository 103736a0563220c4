pub mod distance;

use dyn_clone::DynClone;

use crate::particle::PointMass;

// constraints index into the ring's own point list
pub trait Constraint: DynClone + Send + Sync {
	fn pre_iteration(&mut self) {}

	fn step(&mut self, ps: &mut [PointMass], dt: f32);

	// velocity pass after positions are finalized
	fn damp(&mut self, _ps: &mut [PointMass], _dt: f32) {}

	fn end_spread(&mut self) {}
}

dyn_clone::clone_trait_object!(Constraint);

pub type CRef = Box<dyn Constraint>;
