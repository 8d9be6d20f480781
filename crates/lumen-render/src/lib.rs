//! Lumen Render - renderer-facing contract of the scene
//!
//! The scene never talks to the GPU. It brackets each frame with
//! `begin_scene`/`end_scene` on a [`Renderer2D`] and issues one draw per
//! drawable entity in between. [`RecordingRenderer`] is a backend-agnostic
//! implementation that packs per-draw instance data and keeps the command
//! stream for inspection.

pub mod camera;
pub mod drawable;
pub mod renderer;

pub use camera::{CameraView, EditorCamera};
pub use drawable::{CircleRendererComponent, SpriteRendererComponent, TextureHandle};
pub use renderer::{DrawKind, QuadInstance, RecordingRenderer, RenderCommand, RenderStats, Renderer2D};
