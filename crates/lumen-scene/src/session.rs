//! Edit/play workflow around a scene

use lumen_core::Timestep;
use lumen_render::{EditorCamera, Renderer2D};
use tracing::info;

use crate::error::SceneError;
use crate::scene::Scene;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SceneState {
    #[default]
    Edit,
    Play,
}

/// Owns the authored scene and, while playing, a disposable runtime copy.
///
/// Playing never mutates the editor scene; stopping throws the runtime copy
/// away.
#[derive(Debug)]
pub struct SceneSession {
    editor_scene: Scene,
    runtime_scene: Option<Scene>,
    editor_camera: EditorCamera,
}

impl SceneSession {
    pub fn new(editor_scene: Scene) -> Self {
        Self {
            editor_scene,
            runtime_scene: None,
            editor_camera: EditorCamera::default(),
        }
    }

    pub fn state(&self) -> SceneState {
        if self.runtime_scene.is_some() {
            SceneState::Play
        } else {
            SceneState::Edit
        }
    }

    pub fn editor_scene(&self) -> &Scene {
        &self.editor_scene
    }

    pub fn editor_scene_mut(&mut self) -> &mut Scene {
        &mut self.editor_scene
    }

    pub fn runtime_scene(&self) -> Option<&Scene> {
        self.runtime_scene.as_ref()
    }

    /// The scene the current state updates: the runtime copy while playing
    pub fn active_scene(&self) -> &Scene {
        self.runtime_scene.as_ref().unwrap_or(&self.editor_scene)
    }

    pub fn active_scene_mut(&mut self) -> &mut Scene {
        self.runtime_scene.as_mut().unwrap_or(&mut self.editor_scene)
    }

    pub fn editor_camera(&self) -> &EditorCamera {
        &self.editor_camera
    }

    pub fn editor_camera_mut(&mut self) -> &mut EditorCamera {
        &mut self.editor_camera
    }

    /// Copy the editor scene and start its runtime
    pub fn play(&mut self) -> Result<(), SceneError> {
        if self.runtime_scene.is_some() {
            return Err(SceneError::RuntimeAlreadyActive);
        }
        let mut runtime = Scene::copy(&self.editor_scene);
        runtime.on_runtime_start()?;
        info!(
            "Playing scene {:?} as {:?}",
            self.editor_scene.id(),
            runtime.id()
        );
        self.runtime_scene = Some(runtime);
        Ok(())
    }

    /// Stop the runtime and discard the runtime copy
    pub fn stop(&mut self) -> Result<(), SceneError> {
        let mut runtime = self
            .runtime_scene
            .take()
            .ok_or(SceneError::RuntimeNotActive)?;
        runtime.on_runtime_stop()?;
        info!("Stopped scene {:?}", runtime.id());
        Ok(())
    }

    pub fn on_update(
        &mut self,
        ts: Timestep,
        renderer: &mut dyn Renderer2D,
    ) -> Result<(), SceneError> {
        match self.runtime_scene.as_mut() {
            Some(runtime) => runtime.on_update_runtime(ts, renderer),
            None => {
                self.editor_scene
                    .on_update_editor(ts, &self.editor_camera, renderer);
                Ok(())
            }
        }
    }

    pub fn on_viewport_resize(&mut self, width: u32, height: u32) {
        self.editor_camera
            .set_viewport_size(width as f32, height as f32);
        self.editor_scene.on_viewport_resize(width, height);
        if let Some(runtime) = self.runtime_scene.as_mut() {
            runtime.on_viewport_resize(width, height);
        }
    }
}
