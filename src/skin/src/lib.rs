pub mod builder;
pub mod material;
pub mod mesh;
pub mod options;
pub mod sprite;
pub mod uv;

pub use geom::V2;

pub use builder::{Rebuild, SkinBuilder, SkipReason};
pub use material::Material;
pub use mesh::{MeshBuffer, Vertex};
pub use options::SkinOptions;
pub use sprite::{PixelRect, Sprite, UvRect};
