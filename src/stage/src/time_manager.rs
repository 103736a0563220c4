/// Fixed-step clock fed with variable frame times.
pub struct TimeManager {
	dt: f32,
	max_ticks: usize,
	accumulator: f32,
	sim_time: f64,
}

impl TimeManager {
	pub fn new(dt: f32, max_ticks: usize) -> Self {
		Self {
			dt: if dt.is_finite() && dt > 0.0 { dt } else { 0.02 },
			max_ticks: max_ticks.max(1),
			accumulator: 0.0,
			sim_time: 0.0,
		}
	}

	pub fn dt(&self) -> f32 {
		self.dt
	}

	pub fn sim_time(&self) -> f64 {
		self.sim_time
	}

	pub fn take_ticks(&mut self, frame_dt: f32) -> usize {
		if frame_dt.is_finite() && frame_dt > 0.0 {
			self.accumulator += frame_dt;
		}
		let mut ticks = ((self.accumulator + 1e-6) / self.dt).floor() as usize;
		if ticks > self.max_ticks {
			tracing::warn!(
				"simulation behind by {} ticks, dropping backlog",
				ticks - self.max_ticks
			);
			ticks = self.max_ticks;
			self.accumulator = 0.0;
		} else {
			self.accumulator = (self.accumulator - ticks as f32 * self.dt).max(0.0);
		}
		self.sim_time += ticks as f64 * self.dt as f64;
		ticks
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_accumulates() {
		let mut t = TimeManager::new(0.02, 8);
		assert_eq!(t.take_ticks(0.01), 0);
		assert_eq!(t.take_ticks(0.01), 1);
		assert_eq!(t.take_ticks(0.05), 2);
		assert_eq!(t.take_ticks(0.01), 1);
		assert!((t.sim_time() - 0.08).abs() < 1e-6);
	}

	#[test]
	fn test_backlog_dropped() {
		let mut t = TimeManager::new(0.02, 8);
		assert_eq!(t.take_ticks(1.0), 8);
		assert_eq!(t.take_ticks(0.0), 0);
		assert_eq!(t.take_ticks(f32::NAN), 0);
	}

	#[test]
	fn test_one_tick_per_fixed_frame() {
		let mut t = TimeManager::new(0.02, 8);
		for _ in 0..100 {
			assert_eq!(t.take_ticks(0.02), 1);
		}
		assert!((t.sim_time() - 2.0).abs() < 1e-6);
	}
}
