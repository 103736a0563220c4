use nalgebra::{Isometry2, Point2};

use crate::material::Material;
use crate::mesh::MeshBuffer;
use crate::options::SkinOptions;
use crate::sprite::{Sprite, UvRect};
use crate::uv::map_uv;
use crate::V2;
use geom::Aabb;
use protocol::PrRing;

const DIR_EPS: f32 = 1e-8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
	TooFewPoints,
	DegenerateOutline,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rebuild {
	Rebuilt { vertices: usize, triangles: usize },
	// previous mesh kept as is
	Skipped(SkipReason),
}

pub struct SkinBuilder {
	options: SkinOptions,
	mesh: MeshBuffer,
	outline: Vec<V2>,
	sprite: Option<Sprite>,
	material: Option<Material>,
	material_dirty: bool,
}

impl Default for SkinBuilder {
	fn default() -> Self {
		Self::new(SkinOptions::default())
	}
}

impl SkinBuilder {
	pub fn new(options: SkinOptions) -> Self {
		Self {
			options,
			mesh: MeshBuffer::default(),
			outline: Vec::new(),
			sprite: None,
			material: None,
			material_dirty: true,
		}
	}

	pub fn with_sprite(mut self, sprite: Sprite) -> Self {
		self.set_sprite(Some(sprite));
		self
	}

	pub fn options(&self) -> &SkinOptions {
		&self.options
	}

	pub fn set_options(&mut self, options: SkinOptions) {
		self.options = options;
	}

	pub fn mesh(&self) -> &MeshBuffer {
		&self.mesh
	}

	// world-space outline of the last successful rebuild
	pub fn outline(&self) -> &[V2] {
		&self.outline
	}

	pub fn sprite(&self) -> Option<&Sprite> {
		self.sprite.as_ref()
	}

	pub fn material(&self) -> Option<&Material> {
		self.material.as_ref()
	}

	pub fn set_sprite(&mut self, sprite: Option<Sprite>) {
		let same = match (&self.sprite, &sprite) {
			(Some(a), Some(b)) => a.same_as(b),
			(None, None) => true,
			_ => false,
		};
		if !same {
			self.sprite = sprite;
			self.material_dirty = true;
		}
	}

	pub fn rebuild_from(&mut self, ring: &PrRing, frame: &Isometry2<f32>) -> Rebuild {
		self.rebuild(&ring.positions(), &ring.radius_hints(), frame)
	}

	/// Rebuilds the mesh from world positions in any order.
	///
	/// `hints` holds the radius of each point (missing entries count as
	/// `None`); vertices come out in the local space of `frame`.
	pub fn rebuild(
		&mut self,
		points: &[V2],
		hints: &[Option<f32>],
		frame: &Isometry2<f32>,
	) -> Rebuild {
		let mut pairs: Vec<(V2, Option<f32>)> = points
			.iter()
			.enumerate()
			.map(|(i, p)| (*p, hints.get(i).copied().flatten()))
			.filter(|(p, _)| p.iter().all(|x| x.is_finite()))
			.collect();
		if pairs.len() < 3 {
			tracing::trace!("skip skin rebuild: {} usable points", pairs.len());
			return Rebuild::Skipped(SkipReason::TooFewPoints);
		}

		let ps: Vec<V2> = pairs.iter().map(|(p, _)| *p).collect();
		let c = geom::centroid(&ps);
		// stable, so equal angles keep their input order
		pairs.sort_by(|(a, _), (b, _)| {
			let da = a - c;
			let db = b - c;
			da[1].atan2(da[0]).total_cmp(&db[1].atan2(db[0]))
		});

		let inflated: Vec<V2> = pairs
			.iter()
			.map(|(p, hint)| {
				let to = p - c;
				let d = to.magnitude();
				let dir = if d > DIR_EPS { to / d } else { V2::new(0.0, 1.0) };
				p + dir * self.options.inflate_radius(*hint)
			})
			.collect();

		let outline = if self.options.force_convex {
			geom::convex_hull(&inflated)
		} else {
			geom::clean_polygon(
				&inflated,
				self.options.clean_eps_dist,
				self.options.clean_eps_colinear,
			)
		};
		if outline.len() < 3 {
			tracing::trace!("skip skin rebuild: outline has {} points", outline.len());
			return Rebuild::Skipped(SkipReason::DegenerateOutline);
		}

		let bounds = Aabb::from_points(&outline);
		let rect = match &self.sprite {
			Some(s) if self.options.use_sprite_rect => s.uv_rect(),
			_ => UvRect::unit(),
		};
		let pad = self.options.padding();
		let uvs: Vec<V2> = outline
			.iter()
			.map(|p| map_uv(*p, &bounds, &rect, pad))
			.collect();
		let local: Vec<V2> = outline
			.iter()
			.map(|p| frame.inverse_transform_point(&Point2::from(*p)).coords)
			.collect();
		let indices = if self.options.force_convex {
			geom::triangulate_convex_fan(outline.len())
		} else {
			geom::triangulate_ear_clip(&outline)
		};

		let result = Rebuild::Rebuilt {
			vertices: local.len(),
			triangles: indices.len() / 3,
		};
		self.mesh.replace(local, uvs, indices);
		self.outline = outline;
		self.bind_material();
		result
	}

	fn bind_material(&mut self) {
		if self.material.is_none() {
			tracing::debug!("create skin material `{}`", self.options.shader);
			self.material = Some(Material::new(&self.options.shader));
			self.material_dirty = true;
		}
		if !self.material_dirty {
			return;
		}
		if let Some(m) = self.material.as_mut() {
			m.texture = self.sprite.as_ref().map(|s| s.texture.clone());
		}
		self.material_dirty = false;
	}
}
