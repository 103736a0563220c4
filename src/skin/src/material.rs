use std::sync::Arc;

use image::RgbaImage;

// rendering surface binding: shader name plus main texture
#[derive(Clone, Debug)]
pub struct Material {
	pub shader: String,
	pub texture: Option<Arc<RgbaImage>>,
}

impl Material {
	pub fn new(shader: &str) -> Self {
		Self {
			shader: shader.to_string(),
			texture: None,
		}
	}
}
