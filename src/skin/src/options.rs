use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinOptions {
	// hull + fan when set, cleaned outline + ear clipping otherwise
	pub force_convex: bool,
	pub uv_padding: f32,
	pub use_sprite_rect: bool,
	pub inflate_from_node_size: bool,
	// diameter used when a point carries no radius
	pub fallback_node_size: f32,
	pub extra_inflate: f32,
	pub clean_eps_dist: f32,
	pub clean_eps_colinear: f32,
	pub shader: String,
}

impl Default for SkinOptions {
	fn default() -> Self {
		Self {
			force_convex: true,
			uv_padding: 0.02,
			use_sprite_rect: true,
			inflate_from_node_size: true,
			fallback_node_size: 0.0,
			extra_inflate: 0.0,
			clean_eps_dist: 1e-5,
			clean_eps_colinear: 1e-6,
			shader: "Sprites/Default".to_string(),
		}
	}
}

impl SkinOptions {
	pub fn padding(&self) -> f32 {
		if self.uv_padding.is_finite() {
			self.uv_padding.clamp(0.0, 1.0)
		} else {
			0.0
		}
	}

	/// Outward offset of one outline point.
	pub fn inflate_radius(&self, hint: Option<f32>) -> f32 {
		let mut r = 0.0;
		if self.inflate_from_node_size {
			r = hint.filter(|r| r.is_finite()).unwrap_or(0.0);
		}
		if r <= 0.0 && self.fallback_node_size > 0.0 {
			r = self.fallback_node_size * 0.5;
		}
		(r + self.extra_inflate).max(0.0)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_inflate_radius() {
		let mut o = SkinOptions::default();
		assert_eq!(o.inflate_radius(None), 0.0);
		assert_eq!(o.inflate_radius(Some(0.1)), 0.1);
		o.fallback_node_size = 0.4;
		assert_eq!(o.inflate_radius(None), 0.2);
		o.extra_inflate = 0.05;
		assert_eq!(o.inflate_radius(Some(0.1)), 0.15);
		o.inflate_from_node_size = false;
		assert_eq!(o.inflate_radius(Some(0.1)), 0.25);
	}

	#[test]
	fn test_padding_clamped() {
		let mut o = SkinOptions::default();
		o.uv_padding = 3.0;
		assert_eq!(o.padding(), 1.0);
		o.uv_padding = f32::NAN;
		assert_eq!(o.padding(), 0.0);
	}
}
