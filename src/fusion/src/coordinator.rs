use fnv::FnvHashMap;

use geom::V2;
use protocol::{EventSink, FruitKind, GameEvent, RingId};

/// A sensor of one ring touching a body of another.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
	pub sensor: RingId,
	pub other: RingId,
	pub sensor_point: V2,
	pub other_point: V2,
}

impl Contact {
	pub fn midpoint(&self) -> V2 {
		(self.sensor_point + self.other_point) * 0.5
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Merge {
	pub a: RingId,
	pub b: RingId,
	pub kind: FruitKind,
	pub successor: Option<FruitKind>,
	pub midpoint: V2,
}

#[derive(Clone, Copy, Debug)]
struct Member {
	kind: FruitKind,
	merging: bool,
}

#[derive(Debug, Default)]
pub struct FusionCoordinator {
	members: FnvHashMap<RingId, Member>,
}

impl FusionCoordinator {
	pub fn register(&mut self, id: RingId, kind: FruitKind) {
		self.members.insert(
			id,
			Member {
				kind,
				merging: false,
			},
		);
	}

	pub fn unregister(&mut self, id: RingId) {
		self.members.remove(&id);
	}

	pub fn kind(&self, id: RingId) -> Option<FruitKind> {
		self.members.get(&id).map(|m| m.kind)
	}

	pub fn is_merging(&self, id: RingId) -> bool {
		self.members.get(&id).map_or(false, |m| m.merging)
	}

	pub fn len(&self) -> usize {
		self.members.len()
	}

	pub fn is_empty(&self) -> bool {
		self.members.is_empty()
	}

	/// Handles one contact; repeated contacts of an already merging pair are
	/// no-ops.
	pub fn on_contact(
		&mut self,
		contact: &Contact,
		sink: &mut impl EventSink,
	) -> Option<Merge> {
		if contact.sensor == contact.other {
			return None;
		}
		let a = *self.members.get(&contact.sensor)?;
		let b = *self.members.get(&contact.other)?;
		if a.merging || b.merging || a.kind != b.kind {
			return None;
		}
		// flag before emitting anything
		for id in [contact.sensor, contact.other] {
			if let Some(m) = self.members.get_mut(&id) {
				m.merging = true;
			}
		}

		let merge = Merge {
			a: contact.sensor,
			b: contact.other,
			kind: a.kind,
			successor: a.kind.successor(),
			midpoint: contact.midpoint(),
		};
		tracing::info!(
			"merge {} + {} ({}) -> {:?}",
			merge.a,
			merge.b,
			merge.kind,
			merge.successor,
		);
		sink.emit(GameEvent::RingDestroyed { id: contact.other });
		sink.emit(GameEvent::RingDestroyed { id: contact.sensor });
		sink.emit(GameEvent::ScoreIncrement {
			amount: 1,
			terminal: merge.successor.is_none(),
		});
		if let Some(kind) = merge.successor {
			sink.emit(GameEvent::SpawnSuccessor {
				kind,
				position: merge.midpoint,
			});
		}
		Some(merge)
	}
}
