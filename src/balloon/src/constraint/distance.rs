use crate::constraint::{CRef, Constraint};
use crate::particle::PointMass;

const EPS: f32 = 1e-6;

#[derive(Clone, Debug)]
pub struct DistanceConstraint {
	ps: [usize; 2],
	l0: f32,
	spread_l0: Option<f32>,
	lambda: f32,
	omega: f32,
	damping_ratio: f32,
}

impl DistanceConstraint {
	pub fn new(p1: usize, p2: usize, l0: f32) -> Self {
		Self {
			ps: [p1, p2],
			l0,
			spread_l0: None,
			lambda: 0f32,
			omega: 2.0 * std::f32::consts::PI,
			damping_ratio: 0.0,
		}
	}

	pub fn with_frequency(mut self, hz: f32) -> Self {
		self.omega = 2.0 * std::f32::consts::PI * hz.max(0.01);
		self
	}

	pub fn with_damping_ratio(mut self, zeta: f32) -> Self {
		self.damping_ratio = zeta.clamp(0.0, 1.0);
		self
	}

	pub fn with_spread(mut self, l0: Option<f32>) -> Self {
		self.spread_l0 = l0.map(|l| l.max(0.0));
		self
	}

	pub fn rest_length(&self) -> f32 {
		self.spread_l0.unwrap_or(self.l0)
	}

	pub fn build(self) -> CRef {
		Box::new(self)
	}
}

impl Constraint for DistanceConstraint {
	fn pre_iteration(&mut self) {
		self.lambda = 0f32;
	}

	fn step(&mut self, ps: &mut [PointMass], dt: f32) {
		let [i1, i2] = self.ps;
		let imass1 = ps[i1].get_imass();
		let imass2 = ps[i2].get_imass();
		let imass = imass1 + imass2;
		if imass == 0.0 {
			return;
		}
		let dp = ps[i1].get_pos() - ps[i2].get_pos();
		let l = dp.magnitude();
		if !(l > EPS) {
			return;
		}
		let dl = l - self.rest_length();
		// stiffness k = m_eff * omega^2 with m_eff = 1 / imass
		let compliance = imass / self.omega.powi(2);
		let compliance_t = compliance / dt.powi(2);
		let dlambda =
			(-dl - compliance_t * self.lambda) / (imass + compliance_t);
		let correct = dlambda * dp / l;
		self.lambda += dlambda;

		ps[i1].add_pos(correct * imass1);
		ps[i2].add_pos(-correct * imass2);
	}

	fn damp(&mut self, ps: &mut [PointMass], dt: f32) {
		if self.damping_ratio == 0.0 {
			return;
		}
		let [i1, i2] = self.ps;
		let imass1 = ps[i1].get_imass();
		let imass2 = ps[i2].get_imass();
		let imass = imass1 + imass2;
		if imass == 0.0 {
			return;
		}
		let dp = ps[i1].get_pos() - ps[i2].get_pos();
		let l = dp.magnitude();
		if !(l > EPS) {
			return;
		}
		let n = dp / l;
		let vn = (ps[i1].vel - ps[i2].vel).dot(&n);
		let k = (2.0 * self.damping_ratio * self.omega * dt).min(1.0);
		let dv = -vn * k / imass;
		ps[i1].vel += n * dv * imass1;
		ps[i2].vel -= n * dv * imass2;
	}

	fn end_spread(&mut self) {
		self.spread_l0 = None;
	}
}
