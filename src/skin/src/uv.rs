use crate::sprite::UvRect;
use crate::V2;
use geom::Aabb;

fn lerp(a: f32, b: f32, t: f32) -> f32 {
	a + (b - a) * t
}

/// Maps a world point inside `bounds` into `rect`, pulled inward by `pad`.
pub fn map_uv(p: V2, bounds: &Aabb, rect: &UvRect, pad: f32) -> V2 {
	let t = bounds
		.normalize(p)
		.map(|x| lerp(pad, 1.0 - pad, x.clamp(0.0, 1.0)));
	rect.lerp(t)
}

#[cfg(test)]
mod test {
	use super::*;
	use approx::assert_abs_diff_eq;

	fn unit_box() -> Aabb {
		Aabb::from_points(&[V2::new(0., 0.), V2::new(1., 1.)])
	}

	#[test]
	fn test_sub_rect() {
		let rect = UvRect {
			min: V2::new(0.25, 0.0),
			max: V2::new(0.75, 0.5),
		};
		let uv = map_uv(V2::new(0.5, 0.5), &unit_box(), &rect, 0.0);
		assert_abs_diff_eq!(uv[0], 0.5, epsilon = 1e-6);
		assert_abs_diff_eq!(uv[1], 0.25, epsilon = 1e-6);
	}

	#[test]
	fn test_padding_and_clamp() {
		let rect = UvRect::unit();
		let uv = map_uv(V2::new(0., 1.), &unit_box(), &rect, 0.1);
		assert_abs_diff_eq!(uv[0], 0.1, epsilon = 1e-6);
		assert_abs_diff_eq!(uv[1], 0.9, epsilon = 1e-6);
		let uv = map_uv(V2::new(-5., 5.), &unit_box(), &rect, 0.0);
		assert_eq!(uv, V2::new(0., 1.));
	}
}
