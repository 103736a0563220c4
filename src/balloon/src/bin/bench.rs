use std::time::SystemTime;

use balloon::{RingTemplate, V2};
use tracing_subscriber::EnvFilter;

fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| EnvFilter::new("warn")),
		)
		.init();

	let template = RingTemplate::default();
	let mut rings = Vec::new();
	for m in 0..4 {
		for n in 0..4 {
			let origin = V2::new(1.2 * m as f32, 1.2 * n as f32);
			match balloon::Ring::build(&template, origin) {
				Ok(ring) => rings.push(ring),
				Err(e) => {
					eprintln!("ERROR: {}", e);
					return;
				}
			}
		}
	}

	let start = SystemTime::now();
	let dt = 0.02;
	let frames = 500;
	for _ in 0..frames {
		for ring in rings.iter_mut() {
			ring.step(dt);
		}
	}
	let time = frames as f32 * dt;
	let duration = SystemTime::now()
		.duration_since(start)
		.map(|d| d.as_micros())
		.unwrap_or(0);
	eprintln!(
		"{} rings, {:.3}% of realtime",
		rings.len(),
		duration as f32 / time / 1e4
	);
}
