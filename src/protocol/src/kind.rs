use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RingId(pub u32);

impl fmt::Display for RingId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ring#{}", self.0)
	}
}

/// Merge tiers, smallest first.
#[derive(
	Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FruitKind {
	Berry,
	Apple,
	Grape,
	Orange,
	Melon,
	Suika,
}

impl FruitKind {
	pub const ALL: [FruitKind; 6] = [
		FruitKind::Berry,
		FruitKind::Apple,
		FruitKind::Grape,
		FruitKind::Orange,
		FruitKind::Melon,
		FruitKind::Suika,
	];

	pub fn tier(self) -> usize {
		self as usize
	}

	/// Kind produced by merging two of `self`, `None` for the last tier.
	pub fn successor(self) -> Option<Self> {
		Self::ALL.get(self.tier() + 1).copied()
	}

	pub fn name(self) -> &'static str {
		match self {
			FruitKind::Berry => "berry",
			FruitKind::Apple => "apple",
			FruitKind::Grape => "grape",
			FruitKind::Orange => "orange",
			FruitKind::Melon => "melon",
			FruitKind::Suika => "suika",
		}
	}
}

impl fmt::Display for FruitKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_successor_chain() {
		let mut kind = FruitKind::Berry;
		let mut steps = 0;
		while let Some(next) = kind.successor() {
			assert_eq!(next.tier(), kind.tier() + 1);
			kind = next;
			steps += 1;
		}
		assert_eq!(kind, FruitKind::Suika);
		assert_eq!(steps, 5);
	}

	#[test]
	fn test_display() {
		assert_eq!(FruitKind::Melon.to_string(), "melon");
		assert_eq!(RingId(3).to_string(), "ring#3");
	}
}
