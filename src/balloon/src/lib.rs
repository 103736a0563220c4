//! Ring-of-point-masses soft body: edge springs, edge-normal pressure and
//! radius clamps, advanced at a fixed physics step.

pub mod constraint;
pub mod error;
pub mod particle;
pub mod pressure;
pub mod ring;
pub mod shape;
pub mod snap;
pub mod template;

pub use geom::V2;

pub use error::BuildError;
pub use ring::Ring;
pub use shape::ShapeDescriptor;
pub use snap::SnapState;
pub use template::{
	AnchorMode, CompressionMode, RingTemplate, SpringParams, TemplateSet,
};
