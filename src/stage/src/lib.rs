pub mod config;
pub mod contact_grid;
pub mod posbox;
pub mod stage;
pub mod time_manager;

pub use geom::V2;
pub type C2 = nalgebra::Vector2<i32>;

pub use config::{ConfigError, FruitEntry, StageConfig};
pub use stage::{Stage, StageRing};
