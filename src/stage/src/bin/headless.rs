use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use protocol::{FruitKind, GameEvent};
use stage::{Stage, StageConfig};

#[derive(Parser, Debug)]
#[command(name = "headless")]
#[command(about = "Run the fruit stage without a renderer", long_about = None)]
struct Args {
	/// Stage config (TOML); built-in defaults when omitted
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Frames to simulate
	#[arg(short, long, default_value_t = 1500)]
	frames: usize,

	/// Number of fruits dropped
	#[arg(short, long, default_value_t = 20)]
	drops: usize,

	#[arg(short, long, default_value_t = 1)]
	seed: u64,

	/// Enable verbose logging
	#[arg(short, long)]
	verbose: bool,
}

fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	let filter = if args.verbose {
		"stage=debug,balloon=debug,fusion=info,skin=info"
	} else {
		"info"
	};
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
		)
		.init();

	let config = match &args.config {
		Some(path) => StageConfig::load(path)
			.with_context(|| format!("loading {}", path.display()))?,
		None => StageConfig::default(),
	};
	let frame_dt = config.fixed_dt;
	let walls = config.walls;
	let mut stage = Stage::new(config).context("building stage")?;
	let mut rng = StdRng::seed_from_u64(args.seed);

	// only the smaller tiers are dropped
	let droppable = &FruitKind::ALL[..4];
	let interval = (args.frames / args.drops.max(1)).max(1);
	let mut dropped = 0;
	for frame in 0..args.frames {
		if dropped < args.drops && frame % interval == 0 {
			let kind = droppable[rng.gen_range(0..droppable.len())];
			let pos = walls.drop_point(&mut rng, 1.0);
			if stage.spawn(kind, pos).is_ok() {
				dropped += 1;
			}
		}
		stage.advance(frame_dt);
		for event in stage.drain_events() {
			if let GameEvent::SpawnSuccessor { kind, position } = event {
				info!(
					"frame {}: {} at ({:.2}, {:.2})",
					frame, kind, position[0], position[1]
				);
			}
		}
	}
	info!(
		"{} drops, {} rings left, score {}, {:.1}s simulated",
		dropped,
		stage.len(),
		stage.score(),
		stage.sim_time(),
	);
	Ok(())
}
