use crate::V2;

const MIN_EXTENT: f32 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
	pub min: V2,
	pub max: V2,
}

impl Default for Aabb {
	fn default() -> Self {
		Self {
			min: V2::repeat(f32::INFINITY),
			max: V2::repeat(f32::NEG_INFINITY),
		}
	}
}

impl Aabb {
	pub fn from_points(points: &[V2]) -> Self {
		points.iter().fold(Self::default(), |mut acc, p| {
			acc.min = acc.min.inf(p);
			acc.max = acc.max.sup(p);
			acc
		})
	}

	pub fn is_empty(&self) -> bool {
		self.min[0] > self.max[0] || self.min[1] > self.max[1]
	}

	pub fn center(&self) -> V2 {
		(self.min + self.max) * 0.5
	}

	/// Extent per axis, never below 1e-6.
	pub fn size(&self) -> V2 {
		(self.max - self.min).map(|x| x.max(MIN_EXTENT))
	}

	/// Position of `p` relative to the box, 0..1 inside it.
	pub fn normalize(&self, p: V2) -> V2 {
		(p - self.min).component_div(&self.size())
	}
}
