//! Stateless 2D polygon helpers shared by the ring simulator and the skin
//! builder.

pub mod aabb;
pub mod hull;
pub mod polygon;
pub mod triangulate;

pub type V2 = nalgebra::Vector2<f32>;

pub use aabb::Aabb;
pub use hull::convex_hull;
pub use polygon::{
	centroid, clean_polygon, cross, point_in_triangle, signed_area,
};
pub use triangulate::{triangulate_convex_fan, triangulate_ear_clip};
