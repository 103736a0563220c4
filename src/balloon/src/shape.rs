use serde::{Deserialize, Serialize};

// collision/visual shape of one ring node, attached at build time
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeDescriptor {
	Circle { radius: f32 },
	Box { size: [f32; 2] },
	Capsule { size: [f32; 2] },
	BoundsOnly { extents: [f32; 2] },
}

impl Default for ShapeDescriptor {
	fn default() -> Self {
		Self::Circle { radius: 0.25 }
	}
}

impl ShapeDescriptor {
	/// Effective radius under a (possibly non-uniform) node scale.
	pub fn radius(&self, scale: [f32; 2]) -> f32 {
		let sx = scale[0].abs();
		let sy = scale[1].abs();
		let r = match *self {
			Self::Circle { radius } => radius * sx.max(sy),
			Self::Box { size } | Self::Capsule { size } => {
				0.5 * (size[0] * sx).max(size[1] * sy)
			}
			Self::BoundsOnly { extents } => (extents[0] * sx).max(extents[1] * sy),
		};
		if r.is_finite() {
			r.max(0.0)
		} else {
			0.0
		}
	}
}
