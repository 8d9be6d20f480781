//! Drawable component data handed to the renderer

use lumen_core::Color;
use serde::{Deserialize, Serialize};

/// Opaque reference to a texture owned by the asset layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureHandle(pub u64);

/// Textured or flat-colored quad
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteRendererComponent {
    pub color: Color,
    pub texture: Option<TextureHandle>,
    /// Texture coordinate multiplier
    pub tiling_factor: f32,
}

impl Default for SpriteRendererComponent {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            texture: None,
            tiling_factor: 1.0,
        }
    }
}

impl SpriteRendererComponent {
    pub fn from_color(color: Color) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }
}

/// Filled or ring-shaped circle drawn on a quad
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleRendererComponent {
    pub color: Color,
    /// 1.0 is a filled disc, smaller values leave a hole
    pub thickness: f32,
    /// Edge softness
    pub fade: f32,
}

impl Default for CircleRendererComponent {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            thickness: 1.0,
            fade: 0.005,
        }
    }
}
