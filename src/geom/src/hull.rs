use crate::polygon::cross;
use crate::V2;

/// Andrew's monotone chain. Returns the hull in CCW order starting from the
/// lowest-x (then lowest-y) point. Collinear and duplicate points are dropped,
/// so degenerate input yields fewer than 3 vertices.
pub fn convex_hull(points: &[V2]) -> Vec<V2> {
	let mut p: Vec<V2> = points.to_vec();
	p.sort_by(|a, b| a[0].total_cmp(&b[0]).then(a[1].total_cmp(&b[1])));

	let mut lower: Vec<V2> = Vec::with_capacity(p.len());
	for v in p.iter() {
		while lower.len() >= 2
			&& cross(lower[lower.len() - 2], lower[lower.len() - 1], *v) <= 0.0
		{
			lower.pop();
		}
		lower.push(*v);
	}

	let mut upper: Vec<V2> = Vec::with_capacity(p.len());
	for v in p.iter().rev() {
		while upper.len() >= 2
			&& cross(upper[upper.len() - 2], upper[upper.len() - 1], *v) <= 0.0
		{
			upper.pop();
		}
		upper.push(*v);
	}

	lower.pop();
	upper.pop();
	lower.extend(upper);
	lower
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::polygon::signed_area;
	use rand::rngs::StdRng;
	use rand::{Rng, SeedableRng};

	#[test]
	fn test_square_with_interior_points() {
		let pts = vec![
			V2::new(0.5, 0.5),
			V2::new(1., 1.),
			V2::new(0., 0.),
			V2::new(0.2, 0.7),
			V2::new(1., 0.),
			V2::new(0., 1.),
			V2::new(0.5, 0.),
		];
		let hull = convex_hull(&pts);
		assert_eq!(
			hull,
			vec![
				V2::new(0., 0.),
				V2::new(1., 0.),
				V2::new(1., 1.),
				V2::new(0., 1.),
			]
		);
	}

	#[test]
	fn test_degenerate_inputs() {
		assert!(convex_hull(&[]).is_empty());
		assert!(convex_hull(&[V2::new(1., 2.)]).len() < 3);
		assert!(convex_hull(&[V2::new(1., 2.); 5]).len() < 3);
		let line: Vec<V2> = (0..6).map(|i| V2::new(i as f32, 2. * i as f32)).collect();
		assert_eq!(convex_hull(&line).len(), 2);
	}

	#[test]
	fn test_random_clouds_are_enclosed() {
		let mut rng = StdRng::seed_from_u64(17);
		for _ in 0..50 {
			let n = rng.gen_range(3..40);
			let pts: Vec<V2> = (0..n)
				.map(|_| V2::new(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0)))
				.collect();
			let hull = convex_hull(&pts);
			if hull.len() < 3 {
				continue;
			}
			assert!(signed_area(&hull) > 0.0);
			let m = hull.len();
			for p in pts.iter() {
				for i in 0..m {
					let turn = cross(hull[i], hull[(i + 1) % m], *p);
					assert!(turn >= -1e-4, "point {:?} outside hull edge {}", p, i);
				}
			}
		}
	}
}
