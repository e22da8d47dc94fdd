//! Deferred scene-state mutations.
//!
//! Noisy effect hooks cannot touch the scene state directly, since they run in
//! the middle of damage or state resolution. Instead they return a
//! [`SceneReaction`] which the owning scene queues and applies between
//! frames, one reaction at a time, so each mutation gets its own frame
//! (message display, animation, ...).

use std::any::Any;
use std::collections::VecDeque;

/// A deferred change to a scene's state.
///
/// The state parameter is type-erased: reactions are produced by hook code
/// that cannot know the concrete scene state, and downcast it on apply.
pub type SceneReaction = Box<dyn FnOnce(&mut dyn Any)>;

/// FIFO queue of pending scene reactions.
#[derive(Default)]
pub struct MutationQueue {
    queue: VecDeque<SceneReaction>,
}

impl MutationQueue {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queues one reaction after the already pending ones.
    pub fn queue_reaction(&mut self, reaction: SceneReaction) {
        self.queue.push_back(reaction);
    }

    /// Queues several reactions; they will run in the given order.
    pub fn queue_reactions(&mut self, reactions: impl IntoIterator<Item = SceneReaction>) {
        self.queue.extend(reactions);
    }

    /// Applies the oldest pending reaction to `state`, if any.
    ///
    /// Returns whether a reaction ran. At most one reaction is applied per
    /// call.
    pub fn execute_next<S: Any>(&mut self, state: &mut S) -> bool {
        match self.queue.pop_front() {
            Some(reaction) => {
                reaction(state);
                true
            }
            None => false,
        }
    }
}
