use std::collections::VecDeque;

use crate::kind::{FruitKind, RingId};
use geom::V2;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
	RingDestroyed { id: RingId },
	SpawnSuccessor { kind: FruitKind, position: V2 },
	// terminal: the merged kind has no successor
	ScoreIncrement { amount: u32, terminal: bool },
}

pub trait EventSink {
	fn emit(&mut self, event: GameEvent);
}

impl EventSink for Vec<GameEvent> {
	fn emit(&mut self, event: GameEvent) {
		self.push(event);
	}
}

/// FIFO drained once per tick by a single dispatcher.
#[derive(Debug, Default)]
pub struct EventQueue {
	queue: VecDeque<GameEvent>,
}

impl EventQueue {
	pub fn pop(&mut self) -> Option<GameEvent> {
		self.queue.pop_front()
	}

	pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
		self.queue.drain(..)
	}

	pub fn len(&self) -> usize {
		self.queue.len()
	}

	pub fn is_empty(&self) -> bool {
		self.queue.is_empty()
	}
}

impl EventSink for EventQueue {
	fn emit(&mut self, event: GameEvent) {
		self.queue.push_back(event);
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_queue_is_fifo() {
		let mut q = EventQueue::default();
		q.emit(GameEvent::RingDestroyed { id: RingId(1) });
		q.emit(GameEvent::ScoreIncrement {
			amount: 1,
			terminal: false,
		});
		assert_eq!(q.len(), 2);
		assert_eq!(q.pop(), Some(GameEvent::RingDestroyed { id: RingId(1) }));
		let rest: Vec<_> = q.drain().collect();
		assert_eq!(rest.len(), 1);
		assert!(q.is_empty());
	}
}
