// pr_model: ring state handed from the simulator to the skin builder

use geom::V2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PrPoint {
	pub pos: V2,
	// collision/visual radius of the point, if it has one
	pub radius: Option<f32>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PrRing {
	pub center: V2,
	pub points: Vec<PrPoint>,
}

impl PrRing {
	pub fn positions(&self) -> Vec<V2> {
		self.points.iter().map(|p| p.pos).collect()
	}

	pub fn radius_hints(&self) -> Vec<Option<f32>> {
		self.points.iter().map(|p| p.radius).collect()
	}

	pub fn len(&self) -> usize {
		self.points.len()
	}

	pub fn is_empty(&self) -> bool {
		self.points.is_empty()
	}
}
