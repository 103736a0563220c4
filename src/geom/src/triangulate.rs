use crate::polygon::{cross, point_in_triangle, signed_area};
use crate::V2;

// minimum doubled area of an ear
const EAR_EPS: f32 = 1e-8;
const EAR_GUARD: usize = 20000;

fn fan(ids: &[u32], out: &mut Vec<u32>) {
	for i in 1..ids.len().saturating_sub(1) {
		out.extend_from_slice(&[ids[0], ids[i], ids[i + 1]]);
	}
}

/// Fan from vertex 0; only valid for convex outlines.
pub fn triangulate_convex_fan(n: usize) -> Vec<u32> {
	let ids: Vec<u32> = (0..n as u32).collect();
	let mut out = Vec::with_capacity(n.saturating_sub(2) * 3);
	fan(&ids, &mut out);
	out
}

fn find_ear(poly: &[V2], ids: &[u32]) -> Option<usize> {
	let m = ids.len();
	(0..m).find(|&i| {
		let i0 = ids[(i + m - 1) % m];
		let i1 = ids[i];
		let i2 = ids[(i + 1) % m];
		let a = poly[i0 as usize];
		let b = poly[i1 as usize];
		let c = poly[i2 as usize];
		if cross(a, b, c) <= EAR_EPS {
			return false;
		}
		!ids.iter().any(|&k| {
			k != i0
				&& k != i1 && k != i2
				&& point_in_triangle(poly[k as usize], a, b, c)
		})
	})
}

/// Ear clipping over a simple polygon of either winding. Emits CCW
/// triangles as a flat index list into `poly`. When no ear can be found the
/// remaining vertices are fanned, so the result always holds n - 2 triangles.
pub fn triangulate_ear_clip(poly: &[V2]) -> Vec<u32> {
	let n = poly.len();
	let mut out = Vec::with_capacity(n.saturating_sub(2) * 3);
	if n < 3 {
		return out;
	}
	let mut ids: Vec<u32> = (0..n as u32).collect();
	if signed_area(poly) < 0.0 {
		ids.reverse();
	}

	let mut guard = 0;
	while ids.len() > 2 {
		guard += 1;
		let ear = if guard > EAR_GUARD {
			None
		} else {
			find_ear(poly, &ids)
		};
		match ear {
			Some(i) => {
				let m = ids.len();
				out.extend_from_slice(&[
					ids[(i + m - 1) % m],
					ids[i],
					ids[(i + 1) % m],
				]);
				ids.remove(i);
			}
			None => {
				tracing::debug!(remaining = ids.len(), "no ear left, fanning");
				fan(&ids, &mut out);
				break;
			}
		}
	}
	out
}
