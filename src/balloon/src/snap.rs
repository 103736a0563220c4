use crate::template::CompressionMode;

/// Auto-recovery from an anomalous collapse.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum SnapState {
	#[default]
	Normal,
	// hard snap forced until the deadline, then `prior` comes back
	ForcedHardSnap { until: f32, prior: CompressionMode },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapTransition {
	None,
	Entered,
	Exited,
}

impl SnapState {
	pub fn is_forced(&self) -> bool {
		matches!(self, Self::ForcedHardSnap { .. })
	}

	// at most one transition per tick
	pub fn tick(
		&mut self,
		now: f32,
		collapsed: bool,
		cooldown: f32,
		mode: &mut CompressionMode,
	) -> SnapTransition {
		match *self {
			Self::Normal => {
				if !collapsed {
					return SnapTransition::None;
				}
				*self = Self::ForcedHardSnap {
					until: now + cooldown,
					prior: *mode,
				};
				*mode = CompressionMode::HardSnap;
				SnapTransition::Entered
			}
			Self::ForcedHardSnap { until, prior } => {
				if now < until {
					return SnapTransition::None;
				}
				*self = Self::Normal;
				*mode = prior;
				SnapTransition::Exited
			}
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_enter_and_exit() {
		let mut s = SnapState::default();
		let mut mode = CompressionMode::SoftForce;
		assert_eq!(s.tick(0.0, false, 0.5, &mut mode), SnapTransition::None);
		assert_eq!(s.tick(0.1, true, 0.5, &mut mode), SnapTransition::Entered);
		assert_eq!(mode, CompressionMode::HardSnap);
		assert!(s.is_forced());
		// still collapsed, but the deadline holds
		assert_eq!(s.tick(0.5, true, 0.5, &mut mode), SnapTransition::None);
		assert_eq!(s.tick(0.6, true, 0.5, &mut mode), SnapTransition::Exited);
		assert_eq!(mode, CompressionMode::SoftForce);
		assert_eq!(s, SnapState::Normal);
	}

	#[test]
	fn test_restores_hard_snap() {
		let mut s = SnapState::default();
		let mut mode = CompressionMode::HardSnap;
		s.tick(0.0, true, 0.0, &mut mode);
		assert_eq!(s.tick(0.0, false, 0.0, &mut mode), SnapTransition::Exited);
		assert_eq!(mode, CompressionMode::HardSnap);
	}
}
