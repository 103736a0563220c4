use crate::V2;

#[derive(Clone, Debug)]
pub struct PointMass {
	pub imass: f32, // 0 for fixed bodies
	pub pos: V2,
	pub ppos: V2,
	pub vel: V2,
	pub force: V2,
	pub gravity_scale: f32,
	pub drag: f32,
	pub radius: Option<f32>,
	safe_pos: V2,
}

impl PointMass {
	pub fn new(mass: f32, pos: V2) -> Self {
		let imass = if mass.is_finite() && mass > 0.0 {
			1.0 / mass
		} else {
			0.0
		};
		Self {
			imass,
			pos,
			ppos: pos,
			vel: V2::zeros(),
			force: V2::zeros(),
			gravity_scale: 1.0,
			drag: 0.0,
			radius: None,
			safe_pos: pos,
		}
	}

	pub fn fixed(pos: V2) -> Self {
		Self::new(f32::INFINITY, pos)
	}

	pub fn with_gravity_scale(mut self, s: f32) -> Self {
		self.gravity_scale = s;
		self
	}

	pub fn with_drag(mut self, drag: f32) -> Self {
		self.drag = drag.max(0.0);
		self
	}

	pub fn with_radius(mut self, radius: Option<f32>) -> Self {
		self.radius = radius.filter(|r| r.is_finite() && *r > 0.0);
		self
	}

	pub fn get_pos(&self) -> V2 {
		self.pos
	}

	pub fn get_imass(&self) -> f32 {
		self.imass
	}

	pub fn mass(&self) -> f32 {
		if self.imass == 0.0 {
			f32::INFINITY
		} else {
			1.0 / self.imass
		}
	}

	pub fn add_pos(&mut self, dp: V2) {
		self.pos += dp
	}

	pub fn offset_pos(&mut self, dp: V2) {
		self.pos += dp;
		self.ppos += dp;
		self.safe_pos += dp;
	}

	pub fn reset_pos(&mut self, p: V2) {
		self.pos = p;
		self.ppos = p;
	}

	pub fn apply_force(&mut self, f: V2) {
		self.force += f;
	}

	pub fn apply_impulse(&mut self, j: V2) {
		self.vel += j * self.imass;
	}

	pub fn integrate_velocity(&mut self, h: f32, gravity: V2) {
		if self.imass == 0.0 {
			return;
		}
		let accel = self.force * self.imass + gravity * self.gravity_scale;
		self.vel += accel * h;
		self.vel /= 1.0 + h * self.drag;
	}

	pub fn predict(&mut self, h: f32) {
		self.ppos = self.pos;
		self.pos += self.vel * h;
	}

	/// Derive the velocity from the solved position.
	pub fn finish(&mut self, h: f32) {
		if self.imass == 0.0 {
			self.vel = V2::zeros();
			return;
		}
		self.vel = (self.pos - self.ppos) / h;
	}

	pub fn clear_force(&mut self) {
		self.force = V2::zeros();
	}

	pub fn is_finite(&self) -> bool {
		self.pos.iter().all(|x| x.is_finite())
			&& self.vel.iter().all(|x| x.is_finite())
	}

	pub fn mark_safe(&mut self) {
		if self.is_finite() {
			self.safe_pos = self.pos;
		}
	}

	pub fn restore_safe(&mut self) {
		self.reset_pos(self.safe_pos);
		self.vel = V2::zeros();
		self.force = V2::zeros();
	}
}
