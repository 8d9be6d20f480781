//! Renderer contract and a recording implementation

use glam::Mat4;
use lumen_core::EntityKey;

use crate::camera::CameraView;
use crate::drawable::{CircleRendererComponent, SpriteRendererComponent, TextureHandle};

/// What the scene needs from a 2D renderer.
///
/// Calls arrive as `begin_scene`, any number of draws, `end_scene`. Scenes
/// never nest. Implementations must not keep references to component data
/// past the call that handed it over.
pub trait Renderer2D {
    fn begin_scene(&mut self, camera: &CameraView);

    fn draw_sprite(&mut self, transform: Mat4, sprite: &SpriteRendererComponent, entity: EntityKey);

    fn draw_circle(&mut self, transform: Mat4, circle: &CircleRendererComponent, entity: EntityKey);

    fn end_scene(&mut self);
}

/// Per-draw instance data, laid out for direct upload to a GPU buffer
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadInstance {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// Sprite: x = tiling factor. Circle: x = thickness, y = fade.
    pub params: [f32; 4],
    /// Entity key split into low/high words, written to the picking target
    pub entity: [u32; 2],
}

impl QuadInstance {
    pub fn sprite(transform: Mat4, sprite: &SpriteRendererComponent, entity: EntityKey) -> Self {
        Self {
            model: transform.to_cols_array_2d(),
            color: sprite.color.to_array(),
            params: [sprite.tiling_factor, 0.0, 0.0, 0.0],
            entity: split_key(entity),
        }
    }

    pub fn circle(transform: Mat4, circle: &CircleRendererComponent, entity: EntityKey) -> Self {
        Self {
            model: transform.to_cols_array_2d(),
            color: circle.color.to_array(),
            params: [circle.thickness, circle.fade, 0.0, 0.0],
            entity: split_key(entity),
        }
    }

    /// The entity key stored in this instance
    pub fn entity_key(&self) -> EntityKey {
        EntityKey::from_raw(u64::from(self.entity[0]) | (u64::from(self.entity[1]) << 32))
    }

    pub fn transform(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model)
    }
}

fn split_key(entity: EntityKey) -> [u32; 2] {
    let raw = entity.to_raw();
    [raw as u32, (raw >> 32) as u32]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawKind {
    Sprite,
    Circle,
}

/// One recorded renderer call
#[derive(Clone, Debug, PartialEq)]
pub enum RenderCommand {
    BeginScene(CameraView),
    Draw {
        kind: DrawKind,
        instance: QuadInstance,
        texture: Option<TextureHandle>,
    },
    EndScene,
}

/// Counters across every recorded frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub scenes: u32,
    pub sprites: u32,
    pub circles: u32,
}

impl RenderStats {
    pub fn draw_calls(&self) -> u32 {
        self.sprites + self.circles
    }
}

/// Renderer that records every call instead of submitting GPU work.
///
/// Enforces the begin/draw/end bracket: nesting, drawing outside a scene and
/// unmatched `end_scene` are contract violations.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    commands: Vec<RenderCommand>,
    in_scene: bool,
    stats: RenderStats,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    pub fn in_scene(&self) -> bool {
        self.in_scene
    }

    /// Instance data of every recorded draw, in submission order
    pub fn instances(&self) -> impl Iterator<Item = &QuadInstance> {
        self.commands.iter().filter_map(|cmd| match cmd {
            RenderCommand::Draw { instance, .. } => Some(instance),
            _ => None,
        })
    }

    /// Cameras of every recorded `begin_scene`
    pub fn scene_cameras(&self) -> impl Iterator<Item = &CameraView> {
        self.commands.iter().filter_map(|cmd| match cmd {
            RenderCommand::BeginScene(camera) => Some(camera),
            _ => None,
        })
    }

    /// Instance buffer contents as raw bytes, ready for upload
    pub fn instance_bytes(&self) -> Vec<u8> {
        let instances: Vec<QuadInstance> = self.instances().copied().collect();
        bytemuck::cast_slice(&instances).to_vec()
    }

    /// Drop recorded commands, keeping the running stats
    pub fn clear(&mut self) {
        assert!(!self.in_scene, "cannot clear while a scene is open");
        self.commands.clear();
    }

    fn record_draw(&mut self, kind: DrawKind, instance: QuadInstance, texture: Option<TextureHandle>) {
        assert!(self.in_scene, "draw issued outside begin_scene/end_scene");
        self.commands.push(RenderCommand::Draw {
            kind,
            instance,
            texture,
        });
    }
}

impl Renderer2D for RecordingRenderer {
    fn begin_scene(&mut self, camera: &CameraView) {
        assert!(!self.in_scene, "begin_scene called while a scene is already open");
        self.in_scene = true;
        self.stats.scenes += 1;
        self.commands.push(RenderCommand::BeginScene(*camera));
    }

    fn draw_sprite(&mut self, transform: Mat4, sprite: &SpriteRendererComponent, entity: EntityKey) {
        self.record_draw(
            DrawKind::Sprite,
            QuadInstance::sprite(transform, sprite, entity),
            sprite.texture,
        );
        self.stats.sprites += 1;
    }

    fn draw_circle(&mut self, transform: Mat4, circle: &CircleRendererComponent, entity: EntityKey) {
        self.record_draw(
            DrawKind::Circle,
            QuadInstance::circle(transform, circle, entity),
            None,
        );
        self.stats.circles += 1;
    }

    fn end_scene(&mut self) {
        assert!(self.in_scene, "end_scene without matching begin_scene");
        self.in_scene = false;
        self.commands.push(RenderCommand::EndScene);
    }
}
