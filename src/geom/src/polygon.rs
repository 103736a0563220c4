use crate::V2;

// boundary tolerance of the inclusive triangle test
const INSIDE_EPS: f32 = 1e-8;

/// Twice the signed area of the triangle (a, b, c).
/// Positive when the turn at b is counter-clockwise.
pub fn cross(a: V2, b: V2, c: V2) -> f32 {
	let ab = b - a;
	let ac = c - a;
	ab[0] * ac[1] - ab[1] * ac[0]
}

/// Shoelace area, positive for CCW winding.
pub fn signed_area(poly: &[V2]) -> f32 {
	let n = poly.len();
	let mut sum = 0f32;
	for i in 0..n {
		let p = poly[i];
		let q = poly[(i + 1) % n];
		sum += p[0] * q[1] - q[0] * p[1];
	}
	sum * 0.5
}

pub fn centroid(points: &[V2]) -> V2 {
	if points.is_empty() {
		return V2::zeros();
	}
	let sum = points.iter().fold(V2::zeros(), |acc, p| acc + p);
	sum / points.len() as f32
}

/// Inclusive: points on an edge or a corner count as inside.
pub fn point_in_triangle(p: V2, a: V2, b: V2, c: V2) -> bool {
	let c1 = cross(a, b, p);
	let c2 = cross(b, c, p);
	let c3 = cross(c, a, p);
	let has_neg = c1 < -INSIDE_EPS || c2 < -INSIDE_EPS || c3 < -INSIDE_EPS;
	let has_pos = c1 > INSIDE_EPS || c2 > INSIDE_EPS || c3 > INSIDE_EPS;
	!(has_neg && has_pos)
}

/// Drops points closer than `eps_dist` to their successor, then points whose
/// corner has a doubled area below `eps_colinear`. When the second pass would
/// leave fewer than 3 points the distance-cleaned list is returned.
pub fn clean_polygon(src: &[V2], eps_dist: f32, eps_colinear: f32) -> Vec<V2> {
	let n = src.len();
	let mut tmp = Vec::with_capacity(n);
	for i in 0..n {
		let p = src[i];
		let q = src[(i + 1) % n];
		if (p - q).norm_squared() > eps_dist * eps_dist {
			tmp.push(p);
		}
	}
	if tmp.len() < 3 {
		return tmp;
	}

	let m = tmp.len();
	let out: Vec<V2> = (0..m)
		.filter(|&i| {
			let a = tmp[(i + m - 1) % m];
			let b = tmp[i];
			let c = tmp[(i + 1) % m];
			cross(a, b, c).abs() > eps_colinear
		})
		.map(|i| tmp[i])
		.collect();
	if out.len() >= 3 {
		out
	} else {
		tmp
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use approx::assert_abs_diff_eq;

	fn unit_square() -> Vec<V2> {
		vec![
			V2::new(0., 0.),
			V2::new(1., 0.),
			V2::new(1., 1.),
			V2::new(0., 1.),
		]
	}

	#[test]
	fn test_cross_orientation() {
		let a = V2::new(0., 0.);
		let b = V2::new(1., 0.);
		let c = V2::new(1., 1.);
		assert!(cross(a, b, c) > 0.0);
		assert!(cross(a, c, b) < 0.0);
		assert_abs_diff_eq!(cross(a, b, V2::new(2., 0.)), 0.0);
	}

	#[test]
	fn test_signed_area_winding() {
		let mut sq = unit_square();
		assert_abs_diff_eq!(signed_area(&sq), 1.0, epsilon = 1e-6);
		sq.reverse();
		assert_abs_diff_eq!(signed_area(&sq), -1.0, epsilon = 1e-6);
		assert_eq!(signed_area(&sq[..2]), 0.0);
	}

	#[test]
	fn test_centroid() {
		let c = centroid(&unit_square());
		assert_abs_diff_eq!(c[0], 0.5);
		assert_abs_diff_eq!(c[1], 0.5);
		assert_eq!(centroid(&[]), V2::zeros());
	}

	#[test]
	fn test_point_in_triangle_inclusive() {
		let a = V2::new(0., 0.);
		let b = V2::new(2., 0.);
		let c = V2::new(0., 2.);
		assert!(point_in_triangle(V2::new(0.5, 0.5), a, b, c));
		assert!(point_in_triangle(V2::new(1.0, 0.0), a, b, c));
		assert!(point_in_triangle(b, a, b, c));
		assert!(!point_in_triangle(V2::new(1.5, 1.5), a, b, c));
		assert!(!point_in_triangle(V2::new(-0.1, 0.5), a, b, c));
	}

	#[test]
	fn test_clean_removes_duplicates_and_colinear() {
		let src = vec![
			V2::new(0., 0.),
			V2::new(0., 0.),
			V2::new(0.5, 0.),
			V2::new(1., 0.),
			V2::new(1., 1.),
			V2::new(0., 1.),
		];
		let out = clean_polygon(&src, 1e-5, 1e-6);
		assert_eq!(out.len(), 4);
		assert_abs_diff_eq!(signed_area(&out), 1.0, epsilon = 1e-6);
		assert!(!out.contains(&V2::new(0.5, 0.)));
	}

	#[test]
	fn test_clean_falls_back_to_distance_pass() {
		let src: Vec<V2> = (0..5).map(|i| V2::new(i as f32, 0.)).collect();
		let out = clean_polygon(&src, 1e-5, 1e-6);
		assert_eq!(out, src);
	}

	#[test]
	fn test_clean_collapsed_input() {
		let src = vec![V2::new(1., 1.); 4];
		assert!(clean_polygon(&src, 1e-5, 1e-6).is_empty());
	}
}
