use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::posbox::PosBox;
use balloon::{BuildError, RingTemplate, ShapeDescriptor, TemplateSet};
use protocol::FruitKind;
use skin::SkinOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("cannot read {}: {source}", .path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("bad stage config: {0}")]
	Parse(#[from] toml::de::Error),

	#[error(transparent)]
	Build(#[from] BuildError),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FruitEntry {
	pub kind: FruitKind,
	#[serde(default)]
	pub ring: RingTemplate,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
	pub fixed_dt: f32,
	pub max_ticks_per_frame: usize,
	// overrides the gravity of every template
	pub gravity: [f32; 2],
	pub walls: PosBox,
	pub contact_cell: f32,
	pub skin: SkinOptions,
	pub fruits: Vec<FruitEntry>,
}

impl Default for StageConfig {
	fn default() -> Self {
		Self {
			fixed_dt: 0.02,
			max_ticks_per_frame: 8,
			gravity: [0.0, -9.81],
			walls: PosBox::default(),
			contact_cell: 0.25,
			skin: SkinOptions::default(),
			fruits: default_fruits(),
		}
	}
}

fn default_fruits() -> Vec<FruitEntry> {
	const RADII: [f32; 6] = [0.3, 0.4, 0.5, 0.62, 0.76, 0.92];
	FruitKind::ALL
		.iter()
		.zip(RADII.iter())
		.map(|(&kind, &radius)| {
			let mut ring = RingTemplate::default().with_radius(radius);
			ring.node_shape = ShapeDescriptor::Circle {
				radius: 0.06 + 0.01 * kind.tier() as f32,
			};
			ring.seed = kind.tier() as u64;
			FruitEntry { kind, ring }
		})
		.collect()
}

impl StageConfig {
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let text = std::fs::read_to_string(path).map_err(|source| {
			ConfigError::Io {
				path: path.to_path_buf(),
				source,
			}
		})?;
		Self::from_toml(&text)
	}

	pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(text)?)
	}

	/// Validated templates; a later entry for the same kind wins.
	pub fn templates(&self) -> Result<TemplateSet, ConfigError> {
		let mut set = TemplateSet::default();
		for entry in self.fruits.iter() {
			entry.ring.validate()?;
			set.insert(entry.kind, entry.ring.clone());
		}
		Ok(set)
	}

	pub fn max_node_radius(&self) -> f32 {
		self.fruits
			.iter()
			.map(|f| f.ring.node_radius())
			.fold(0.0, f32::max)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_defaults() {
		let c = StageConfig::default();
		let set = c.templates().unwrap();
		assert_eq!(set.len(), 6);
		assert_eq!(set.get(FruitKind::Melon).unwrap().ring_radius(), 0.76);
		assert!((c.max_node_radius() - 0.11).abs() < 1e-6);
	}

	#[test]
	fn test_from_toml() {
		let text = r#"
			fixed_dt = 0.01
			gravity = [0.0, -5.0]

			[walls]
			xmin = -1.0
			xmax = 1.0

			[skin]
			force_convex = false

			[[fruits]]
			kind = "berry"

			[fruits.ring]
			node_count = 16
			radius = 0.25
			compression_mode = "hard_snap"
			node_shape = { type = "box", size = [0.1, 0.2] }

			[[fruits]]
			kind = "apple"
		"#;
		let c = StageConfig::from_toml(text).unwrap();
		assert_eq!(c.fixed_dt, 0.01);
		assert_eq!(c.max_ticks_per_frame, 8);
		assert_eq!(c.walls.xmin, -1.0);
		assert_eq!(c.walls.ymax, 10.0);
		assert!(!c.skin.force_convex);
		assert_eq!(c.fruits.len(), 2);
		let berry = &c.fruits[0].ring;
		assert_eq!(berry.node_count, 16);
		assert_eq!(berry.compression_mode, balloon::CompressionMode::HardSnap);
		assert_eq!(berry.node_radius(), 0.1);
		// untouched fields keep their defaults
		assert_eq!(berry.edge.frequency, 12.0);
		assert_eq!(c.fruits[1].ring, RingTemplate::default());
	}

	#[test]
	fn test_errors() {
		assert!(matches!(
			StageConfig::from_toml("fixed_dt = \"fast\""),
			Err(ConfigError::Parse(_))
		));
		assert!(matches!(
			StageConfig::load("/nonexistent/stage.toml"),
			Err(ConfigError::Io { .. })
		));
		let c = StageConfig::from_toml(
			"[[fruits]]\nkind = \"berry\"\n[fruits.ring]\nnode_count = 2\n",
		)
		.unwrap();
		assert!(matches!(
			c.templates(),
			Err(ConfigError::Build(BuildError::TooFewNodes { count: 2 }))
		));
	}
}
