use image::{Rgba, RgbaImage};

use crate::host::Color;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Filled disc on a transparent square, used for the mask and the border.
pub fn circle_texture(diameter: u32, color: Color) -> RgbaImage {
    let radius = (diameter / 2) as f32;
    RgbaImage::from_fn(diameter, diameter, |x, y| {
        let dx = x as f32 - radius;
        let dy = y as f32 - radius;
        if dx * dx + dy * dy <= radius * radius {
            Rgba(color)
        } else {
            TRANSPARENT
        }
    })
}
