//! The game loop.
//!
//! [`SceneRunner::run`] drives one scene (and whatever scenes it chains
//! into) to completion, synchronously: check `is_running`, compute one
//! frame, draw it, repeat. Exactly one run may be active at a time: a
//! nested `run` from inside a scene fails with
//! [`SceneError::AlreadyRunning`]; running scenes one after the other is
//! fine.

use std::cell::Cell;

use battle_core::GameConfig;

use crate::error::SceneError;
use crate::scene::Scene;

/// Drives scenes through the frame loop, one run at a time.
#[derive(Default)]
pub struct SceneRunner {
    active: Cell<bool>,
}

/// Clears the active flag even when a scene panics mid-frame.
struct ActiveGuard<'a>(&'a Cell<bool>);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl SceneRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a run is currently driving a scene.
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Runs `scene` to completion, following `next_scene` chains.
    ///
    /// `frame_time` yields the elapsed seconds for each frame.
    ///
    /// # Errors
    ///
    /// [`SceneError::AlreadyRunning`] when a run is already active.
    pub fn run(
        &self,
        scene: Box<dyn Scene>,
        mut frame_time: impl FnMut() -> f64,
    ) -> Result<(), SceneError> {
        if self.active.get() {
            return Err(SceneError::AlreadyRunning);
        }
        self.active.set(true);
        let _guard = ActiveGuard(&self.active);

        let mut current = Some(scene);
        while let Some(mut scene) = current.take() {
            while scene.is_running() {
                scene.process(frame_time());
                scene.draw();
            }
            current = scene.next_scene();
            if current.is_some() {
                tracing::debug!("scene finished, chaining into next scene");
            }
        }
        tracing::debug!("scene processing finished");

        Ok(())
    }

    /// Runs `scene` with the default fixed frame delta.
    pub fn run_with_default_delta(&self, scene: Box<dyn Scene>) -> Result<(), SceneError> {
        self.run(scene, || GameConfig::DEFAULT_FRAME_DELTA)
    }
}
