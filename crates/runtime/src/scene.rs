//! Scene abstraction for the game loop.

/// A scene driven by the [`SceneRunner`](crate::SceneRunner).
///
/// The runner checks [`is_running`](Scene::is_running) before computing each
/// frame, so a scene gets the chance to observe its final state before the
/// runner moves on.
pub trait Scene {
    /// Advances the scene state by `delta` seconds.
    fn process(&mut self, delta: f64);

    /// Draws the current state to the screen.
    fn draw(&self);

    /// Whether this scene still wants frames.
    fn is_running(&self) -> bool;

    /// The scene to drive once this one is done.
    fn next_scene(&mut self) -> Option<Box<dyn Scene>> {
        None
    }
}
