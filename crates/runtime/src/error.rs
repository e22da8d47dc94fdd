//! Errors raised by the scene runner.

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SceneError {
    /// A run was started while another one is still driving a scene.
    #[error("cannot run several scenes in parallel")]
    AlreadyRunning,
}
