use fnv::FnvHashMap;
use nalgebra::Isometry2;

use crate::config::{ConfigError, StageConfig};
use crate::contact_grid::{ContactGrid, Entry};
use crate::posbox::PosBox;
use crate::time_manager::TimeManager;
use crate::V2;
use balloon::{BuildError, Ring, TemplateSet};
use fusion::{Contact, FusionCoordinator};
use protocol::{EventQueue, FruitKind, GameEvent, RingId};
use skin::{SkinBuilder, Sprite};

pub struct StageRing {
	pub kind: FruitKind,
	pub ring: Ring,
	pub skin: SkinBuilder,
}

// position and velocity change queued for one ring point
struct Correction {
	ring: RingId,
	index: usize,
	dpos: V2,
	dvel: V2,
}

/// All rings of one container, advanced by a fixed-step clock.
pub struct Stage {
	config: StageConfig,
	templates: TemplateSet,
	rings: FnvHashMap<RingId, StageRing>,
	fusion: FusionCoordinator,
	events: EventQueue,
	outbox: Vec<GameEvent>,
	time: TimeManager,
	walls: PosBox,
	grid: ContactGrid,
	sprites: FnvHashMap<FruitKind, Sprite>,
	id_alloc: u32,
	score: u32,
}

impl Stage {
	pub fn new(config: StageConfig) -> Result<Self, ConfigError> {
		let templates = config.templates()?;
		let csize = config.contact_cell.max(2.0 * config.max_node_radius());
		Ok(Self {
			templates,
			rings: FnvHashMap::default(),
			fusion: FusionCoordinator::default(),
			events: EventQueue::default(),
			outbox: Vec::new(),
			time: TimeManager::new(config.fixed_dt, config.max_ticks_per_frame),
			walls: config.walls,
			grid: ContactGrid::new(csize),
			sprites: FnvHashMap::default(),
			id_alloc: 0,
			score: 0,
			config,
		})
	}

	pub fn config(&self) -> &StageConfig {
		&self.config
	}

	pub fn spawn(&mut self, kind: FruitKind, pos: V2) -> Result<RingId, BuildError> {
		let mut ring = match self.templates.build(kind, pos) {
			Ok(ring) => ring,
			Err(e) => {
				tracing::error!("cannot spawn {} at {:?}: {}", kind, pos, e);
				return Err(e);
			}
		};
		ring.set_gravity(V2::new(self.config.gravity[0], self.config.gravity[1]));
		let mut skin = SkinBuilder::new(self.config.skin.clone());
		skin.set_sprite(self.sprites.get(&kind).cloned());

		let id = RingId(self.id_alloc);
		self.id_alloc += 1;
		self.fusion.register(id, kind);
		self.rings.insert(id, StageRing { kind, ring, skin });
		tracing::debug!("spawn {} {} at ({:.2}, {:.2})", kind, id, pos[0], pos[1]);
		Ok(id)
	}

	pub fn despawn(&mut self, id: RingId) -> bool {
		self.fusion.unregister(id);
		self.rings.remove(&id).is_some()
	}

	pub fn set_sprite(&mut self, kind: FruitKind, sprite: Sprite) {
		for r in self.rings.values_mut().filter(|r| r.kind == kind) {
			r.skin.set_sprite(Some(sprite.clone()));
		}
		self.sprites.insert(kind, sprite);
	}

	pub fn ring(&self, id: RingId) -> Option<&StageRing> {
		self.rings.get(&id)
	}

	pub fn ring_mut(&mut self, id: RingId) -> Option<&mut StageRing> {
		self.rings.get_mut(&id)
	}

	pub fn ring_ids(&self) -> Vec<RingId> {
		let mut ids: Vec<RingId> = self.rings.keys().copied().collect();
		ids.sort();
		ids
	}

	pub fn len(&self) -> usize {
		self.rings.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rings.is_empty()
	}

	pub fn score(&self) -> u32 {
		self.score
	}

	pub fn sim_time(&self) -> f64 {
		self.time.sim_time()
	}

	pub fn walls(&self) -> &PosBox {
		&self.walls
	}

	// events already applied to the stage, for gameplay consumers
	pub fn drain_events(&mut self) -> Vec<GameEvent> {
		std::mem::take(&mut self.outbox)
	}

	/// One variable-rate frame: zero or more fixed ticks, then skins.
	pub fn advance(&mut self, frame_dt: f32) -> usize {
		let ticks = self.time.take_ticks(frame_dt);
		for _ in 0..ticks {
			self.tick();
		}
		self.rebuild_skins();
		ticks
	}

	pub fn tick(&mut self) {
		let dt = self.time.dt();
		self.step_rings(dt);
		let mut touches: FnvHashMap<RingId, usize> = FnvHashMap::default();
		self.apply_walls(&mut touches);
		self.resolve_contacts(&mut touches);
		for (id, r) in self.rings.iter_mut() {
			r.ring
				.set_external_contacts(touches.get(id).copied().unwrap_or(0));
		}
		self.dispatch();
	}

	#[cfg(not(debug_assertions))]
	fn step_rings(&mut self, dt: f32) {
		use rayon::prelude::*;
		self.rings.par_iter_mut().for_each(|(_, r)| r.ring.step(dt));
	}

	#[cfg(debug_assertions)]
	fn step_rings(&mut self, dt: f32) {
		self.rings.values_mut().for_each(|r| r.ring.step(dt));
	}

	fn apply_walls(&mut self, touches: &mut FnvHashMap<RingId, usize>) {
		for (id, r) in self.rings.iter_mut() {
			let radius = r.ring.node_radius();
			let mut hits = 0;
			for i in 0..r.ring.node_count() {
				let Some(p) = r.ring.point_mut(i) else {
					continue;
				};
				let mut pos = p.pos;
				if self.walls.apply(&mut pos, &mut p.vel, radius) {
					p.offset_pos(pos - p.pos);
					hits += 1;
				}
			}
			if hits > 0 {
				*touches.entry(*id).or_insert(0) += hits;
			}
		}
	}

	fn resolve_contacts(&mut self, touches: &mut FnvHashMap<RingId, usize>) {
		self.grid.clear();
		for (id, r) in self.rings.iter() {
			let radius = r.ring.node_radius();
			for (index, p) in r.ring.points().iter().enumerate() {
				self.grid.insert(Entry {
					ring: *id,
					index,
					pos: p.get_pos(),
					radius,
				});
			}
		}

		let mut corrections = Vec::new();
		for (a, b) in self.grid.pairs() {
			let d = b.pos - a.pos;
			let dist = d.magnitude();
			let n = if dist > 1e-6 {
				d / dist
			} else {
				self.center_dir(a.ring, b.ring)
			};
			let push = n * ((a.radius + b.radius - dist) * 0.5);
			let (va, vb) = match (self.point_vel(&a), self.point_vel(&b)) {
				(Some(va), Some(vb)) => (va, vb),
				_ => continue,
			};
			// cancel the approaching part of the relative velocity
			let approach = (vb - va).dot(&n).min(0.0);
			let dv = n * (approach * 0.5);
			corrections.push(Correction {
				ring: a.ring,
				index: a.index,
				dpos: -push,
				dvel: dv,
			});
			corrections.push(Correction {
				ring: b.ring,
				index: b.index,
				dpos: push,
				dvel: -dv,
			});
			*touches.entry(a.ring).or_insert(0) += 1;
			*touches.entry(b.ring).or_insert(0) += 1;

			let contact = Contact {
				sensor: a.ring,
				other: b.ring,
				sensor_point: a.pos,
				other_point: b.pos,
			};
			self.fusion.on_contact(&contact, &mut self.events);
		}

		for c in corrections {
			let Some(p) = self
				.rings
				.get_mut(&c.ring)
				.and_then(|r| r.ring.point_mut(c.index))
			else {
				continue;
			};
			p.offset_pos(c.dpos);
			p.vel += c.dvel;
		}
	}

	fn point_vel(&self, e: &Entry) -> Option<V2> {
		let r = self.rings.get(&e.ring)?;
		r.ring.points().get(e.index).map(|p| p.vel)
	}

	fn center_dir(&self, a: RingId, b: RingId) -> V2 {
		let ca = self.rings.get(&a).map(|r| r.ring.center());
		let cb = self.rings.get(&b).map(|r| r.ring.center());
		if let (Some(ca), Some(cb)) = (ca, cb) {
			let d = cb - ca;
			if let Some(n) = d.try_normalize(1e-6) {
				return n;
			}
		}
		V2::new(1.0, 0.0)
	}

	/// Applies queued gameplay events in order.
	pub fn dispatch(&mut self) {
		while let Some(event) = self.events.pop() {
			match &event {
				GameEvent::RingDestroyed { id } => {
					self.despawn(*id);
				}
				GameEvent::SpawnSuccessor { kind, position } => {
					// failures are logged by spawn
					let _ = self.spawn(*kind, *position);
				}
				GameEvent::ScoreIncrement { amount, terminal } => {
					self.score += amount;
					if *terminal {
						tracing::info!("top tier merged, score {}", self.score);
					}
				}
			}
			self.outbox.push(event);
		}
	}

	#[cfg(not(debug_assertions))]
	pub fn rebuild_skins(&mut self) {
		use rayon::prelude::*;
		self.rings.par_iter_mut().for_each(|(_, r)| {
			let snap = r.ring.snapshot();
			r.skin.rebuild_from(&snap, &Isometry2::new(snap.center, 0.0));
		});
	}

	#[cfg(debug_assertions)]
	pub fn rebuild_skins(&mut self) {
		for r in self.rings.values_mut() {
			let snap = r.ring.snapshot();
			r.skin.rebuild_from(&snap, &Isometry2::new(snap.center, 0.0));
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn calm() -> StageConfig {
		StageConfig {
			gravity: [0.0, 0.0],
			..Default::default()
		}
	}

	#[test]
	fn test_spawn_and_despawn() {
		let mut stage = Stage::new(calm()).unwrap();
		let a = stage.spawn(FruitKind::Berry, V2::new(0.0, 2.0)).unwrap();
		let b = stage.spawn(FruitKind::Grape, V2::new(1.5, 2.0)).unwrap();
		assert_eq!(stage.ring_ids(), vec![a, b]);
		assert_eq!(stage.ring(b).unwrap().kind, FruitKind::Grape);
		assert!(stage.despawn(a));
		assert!(!stage.despawn(a));
		assert_eq!(stage.len(), 1);
	}

	#[test]
	fn test_advance_builds_skins() {
		let mut stage = Stage::new(calm()).unwrap();
		let id = stage.spawn(FruitKind::Apple, V2::new(0.0, 2.0)).unwrap();
		assert_eq!(stage.advance(0.02), 1);
		let mesh = stage.ring(id).unwrap().skin.mesh();
		assert!(!mesh.is_empty());
		// local frame is centered on the ring
		assert!(mesh.bounds.center().magnitude() < 0.1);
	}

	#[test]
	fn test_wall_keeps_ring_inside() {
		let mut stage = Stage::new(StageConfig::default()).unwrap();
		let id = stage.spawn(FruitKind::Berry, V2::new(0.0, 0.5)).unwrap();
		for _ in 0..100 {
			stage.advance(0.02);
		}
		let r = &stage.ring(id).unwrap().ring;
		for p in r.points() {
			assert!(p.get_pos()[1] >= stage.walls().ymin + r.node_radius() - 1e-4);
		}
	}
}
