use std::sync::Arc;

use image::RgbaImage;

use crate::V2;

/// Sub-rectangle of a texture in pixels, origin at the texture's lower left.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
	pub x: u32,
	pub y: u32,
	pub width: u32,
	pub height: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UvRect {
	pub min: V2,
	pub max: V2,
}

impl UvRect {
	pub fn unit() -> Self {
		Self {
			min: V2::zeros(),
			max: V2::new(1.0, 1.0),
		}
	}

	pub fn lerp(&self, t: V2) -> V2 {
		self.min + (self.max - self.min).component_mul(&t)
	}
}

#[derive(Clone, Debug)]
pub struct Sprite {
	pub texture: Arc<RgbaImage>,
	pub rect: PixelRect,
}

impl Sprite {
	pub fn new(texture: Arc<RgbaImage>, rect: PixelRect) -> Self {
		Self { texture, rect }
	}

	// the whole texture
	pub fn full(texture: Arc<RgbaImage>) -> Self {
		let rect = PixelRect {
			x: 0,
			y: 0,
			width: texture.width(),
			height: texture.height(),
		};
		Self { texture, rect }
	}

	pub fn uv_rect(&self) -> UvRect {
		let w = self.texture.width().max(1) as f32;
		let h = self.texture.height().max(1) as f32;
		let r = self.rect;
		UvRect {
			min: V2::new(r.x as f32 / w, r.y as f32 / h),
			max: V2::new((r.x + r.width) as f32 / w, (r.y + r.height) as f32 / h),
		}
	}

	pub fn same_as(&self, other: &Sprite) -> bool {
		Arc::ptr_eq(&self.texture, &other.texture) && self.rect == other.rect
	}
}
