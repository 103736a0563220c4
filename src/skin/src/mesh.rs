use bytemuck::{Pod, Zeroable};
use nalgebra::Vector3;

use crate::V2;
use geom::Aabb;

#[repr(C)]
#[derive(Zeroable, Pod, Default, Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
	pub pos: [f32; 2],
	pub tex_coord: [f32; 2],
}

/// Skin geometry in the owner's local frame, replaced wholesale on rebuild.
#[derive(Clone, Debug, Default)]
pub struct MeshBuffer {
	pub vertices: Vec<V2>,
	pub uvs: Vec<V2>,
	pub indices: Vec<u32>,
	pub normals: Vec<Vector3<f32>>,
	pub bounds: Aabb,
}

impl MeshBuffer {
	pub fn replace(&mut self, vertices: Vec<V2>, uvs: Vec<V2>, indices: Vec<u32>) {
		self.bounds = Aabb::from_points(&vertices);
		self.vertices = vertices;
		self.uvs = uvs;
		self.indices = indices;
		self.recalculate_normals();
	}

	fn recalculate_normals(&mut self) {
		let mut acc = vec![Vector3::zeros(); self.vertices.len()];
		for tri in self.indices.chunks_exact(3) {
			let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
			let z = geom::cross(self.vertices[a], self.vertices[b], self.vertices[c]);
			let n = Vector3::new(0.0, 0.0, z);
			for i in [a, b, c] {
				acc[i] += n;
			}
		}
		self.normals = acc
			.into_iter()
			.map(|n| n.try_normalize(1e-12).unwrap_or_else(Vector3::z))
			.collect();
	}

	pub fn interleaved(&self) -> Vec<Vertex> {
		self.vertices
			.iter()
			.zip(self.uvs.iter())
			.map(|(p, uv)| Vertex {
				pos: [p[0], p[1]],
				tex_coord: [uv[0], uv[1]],
			})
			.collect()
	}

	pub fn index_bytes(&self) -> &[u8] {
		bytemuck::cast_slice(&self.indices)
	}

	pub fn triangle_count(&self) -> usize {
		self.indices.len() / 3
	}

	pub fn area(&self) -> f32 {
		self.indices
			.chunks_exact(3)
			.map(|t| {
				0.5 * geom::cross(
					self.vertices[t[0] as usize],
					self.vertices[t[1] as usize],
					self.vertices[t[2] as usize],
				)
			})
			.sum()
	}

	pub fn is_empty(&self) -> bool {
		self.indices.is_empty()
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_replace() {
		let mut m = MeshBuffer::default();
		assert!(m.is_empty());
		let vs = vec![V2::new(0., 0.), V2::new(2., 0.), V2::new(2., 1.), V2::new(0., 1.)];
		let uvs = vec![V2::zeros(); 4];
		m.replace(vs, uvs, vec![0, 1, 2, 0, 2, 3]);
		assert_eq!(m.triangle_count(), 2);
		assert_eq!(m.area(), 2.0);
		assert_eq!(m.bounds.max, V2::new(2., 1.));
		assert!(m.normals.iter().all(|n| *n == Vector3::z()));
		assert_eq!(m.index_bytes().len(), 24);
		let verts = m.interleaved();
		assert_eq!(bytemuck::cast_slice::<Vertex, u8>(&verts).len(), 64);
	}
}
