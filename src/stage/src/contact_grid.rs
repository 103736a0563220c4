use fnv::FnvHashMap;

use crate::{C2, V2};
use protocol::RingId;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Entry {
	pub ring: RingId,
	pub index: usize,
	pub pos: V2,
	pub radius: f32,
}

// uniform hash grid over ring points
pub struct ContactGrid {
	csize: f32,
	data: FnvHashMap<C2, Vec<Entry>>,
}

impl Default for ContactGrid {
	fn default() -> Self {
		Self::new(0.25)
	}
}

// half of the neighborhood, so every cell pair is visited once
const FORWARD: [[i32; 2]; 4] = [[1, 0], [1, 1], [0, 1], [-1, 1]];

impl ContactGrid {
	pub fn new(csize: f32) -> Self {
		Self {
			csize: if csize.is_finite() && csize > 0.0 { csize } else { 0.25 },
			data: FnvHashMap::default(),
		}
	}

	pub fn csize(&self) -> f32 {
		self.csize
	}

	pub fn clear(&mut self) {
		self.data.values_mut().for_each(|v| v.clear());
	}

	fn get_cpos(&self, p: V2) -> C2 {
		C2::new(
			(p[0] / self.csize).floor() as i32,
			(p[1] / self.csize).floor() as i32,
		)
	}

	pub fn insert(&mut self, entry: Entry) {
		if !entry.pos.iter().all(|x| x.is_finite()) {
			return;
		}
		let cpos = self.get_cpos(entry.pos);
		self.data.entry(cpos).or_insert_with(Vec::new).push(entry);
	}

	/// Overlapping points of different rings, ordered by ring id then
	/// point index. The first entry of each pair has the smaller ring id.
	pub fn pairs(&self) -> Vec<(Entry, Entry)> {
		let mut result = Vec::new();
		let mut check = |a: &Entry, b: &Entry| {
			if a.ring == b.ring {
				return;
			}
			let reach = a.radius + b.radius;
			if (a.pos - b.pos).magnitude_squared() >= reach * reach {
				return;
			}
			if (a.ring, a.index) < (b.ring, b.index) {
				result.push((*a, *b));
			} else {
				result.push((*b, *a));
			}
		};
		for (cpos, cell) in self.data.iter() {
			for (i, a) in cell.iter().enumerate() {
				for b in cell[i + 1..].iter() {
					check(a, b);
				}
			}
			for off in FORWARD.iter() {
				let npos = cpos + C2::new(off[0], off[1]);
				let Some(other) = self.data.get(&npos) else {
					continue;
				};
				for a in cell.iter() {
					for b in other.iter() {
						check(a, b);
					}
				}
			}
		}
		result.sort_by(|(a1, b1), (a2, b2)| {
			(a1.ring, b1.ring, a1.index, b1.index)
				.cmp(&(a2.ring, b2.ring, a2.index, b2.index))
		});
		result
	}
}
