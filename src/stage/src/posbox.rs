use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::V2;

/// Container walls.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PosBox {
	pub xmin: f32,
	pub xmax: f32,
	pub ymin: f32,
	pub ymax: f32,
}

impl Default for PosBox {
	fn default() -> Self {
		Self {
			xmin: -2.5,
			xmax: 2.5,
			ymin: 0.0,
			ymax: 10.0,
		}
	}
}

fn clamp_axis(x: &mut f32, v: &mut f32, lo: f32, hi: f32) -> bool {
	if lo > hi {
		// narrower than the point itself
		*x = (lo + hi) * 0.5;
		*v = 0.0;
		return true;
	}
	if *x < lo {
		*x = lo;
		*v = v.max(0.0);
		true
	} else if *x > hi {
		*x = hi;
		*v = v.min(0.0);
		true
	} else {
		false
	}
}

impl PosBox {
	/// Keeps a point of `radius` inside, dropping the velocity into the wall.
	/// Returns whether a wall was hit.
	pub fn apply(&self, pos: &mut V2, vel: &mut V2, radius: f32) -> bool {
		let r = radius.max(0.0);
		let mut flag = false;
		flag |= clamp_axis(&mut pos[0], &mut vel[0], self.xmin + r, self.xmax - r);
		flag |= clamp_axis(&mut pos[1], &mut vel[1], self.ymin + r, self.ymax - r);
		flag
	}

	pub fn contains(&self, p: V2) -> bool {
		p[0] >= self.xmin && p[0] <= self.xmax && p[1] >= self.ymin && p[1] <= self.ymax
	}

	/// Random drop point below the top wall. The margin shrinks to a
	/// quarter of the box on narrow walls.
	pub fn drop_point(&self, rng: &mut impl Rng, margin: f32) -> V2 {
		let mx = margin.min((self.xmax - self.xmin) * 0.25).max(0.0);
		let my = margin.min((self.ymax - self.ymin) * 0.25).max(0.0);
		let (lo, hi) = (self.xmin + mx, self.xmax - mx);
		let x = if lo < hi {
			rng.gen_range(lo..hi)
		} else {
			(self.xmin + self.xmax) * 0.5
		};
		V2::new(x, self.ymax - my)
	}
}
