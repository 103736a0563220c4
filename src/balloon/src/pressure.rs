use crate::particle::PointMass;
use crate::V2;

const AREA_EPS: f32 = 1e-5;
const EDGE_EPS: f32 = 1e-6;

/// Edge-normal pressure toward a target enclosed area.
///
/// Every edge pushes along its outward normal, half onto each endpoint, so the
/// forces are internal and the net momentum of the ring is unchanged.
#[derive(Clone, Debug)]
pub struct PressureForce {
	s0: f32,
	stiffness: f32,
	damping: f32,
}

impl PressureForce {
	pub fn new(s0: f32) -> Self {
		Self {
			s0: s0.abs(),
			stiffness: 40.0,
			damping: 0.2,
		}
	}

	pub fn with_stiffness(mut self, k: f32) -> Self {
		self.stiffness = k.max(0.0);
		self
	}

	pub fn with_damping(mut self, c: f32) -> Self {
		self.damping = c.max(0.0);
		self
	}

	pub fn target_area(&self) -> f32 {
		self.s0
	}

	pub fn area_error(&self, s: f32) -> f32 {
		(self.s0 - s.abs()) / self.s0.max(AREA_EPS)
	}

	// ps[..n] are the ring members in cyclic order
	pub fn apply(&self, ps: &mut [PointMass], n: usize) -> f32 {
		let pos: Vec<V2> = ps[..n].iter().map(|p| p.get_pos()).collect();
		let s = geom::signed_area(&pos);
		let err = self.area_error(s);
		let orient = if s < 0.0 { -1.0 } else { 1.0 };
		// damp relative to the ring so free flight is left alone
		let v_mean = ps[..n].iter().map(|p| p.vel).sum::<V2>() / n as f32;
		for i in 0..n {
			let j = (i + 1) % n;
			let e = pos[j] - pos[i];
			let len = e.magnitude();
			if !(len > EDGE_EPS) {
				continue;
			}
			let normal = V2::new(e[1], -e[0]) * (orient / len);
			let f = normal * (self.stiffness * err * len * 0.5);
			for k in [i, j] {
				let vn = (ps[k].vel - v_mean).dot(&normal);
				ps[k].apply_force(f - normal * (vn * self.damping));
			}
		}
		err
	}
}
