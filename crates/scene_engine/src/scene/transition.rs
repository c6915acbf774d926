//! Deferred scene transitions
//!
//! A scene asking to move elsewhere cannot remove itself from the director
//! while the director is ticking it. The request is queued on the engine
//! services instead, and the director applies the queue once the tick is over.

use crate::scene::director::SceneKey;

/// A requested change of scene
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneTransition {
    /// Remove `from` from the director, then start a scene of type `target`
    MoveTo {
        /// Requesting scene; `None` for a scene the director does not manage, such as a popup
        from: Option<SceneKey>,
        /// Registered scene type to start; `None` only removes
        target: Option<String>,
    },
}

/// Transitions waiting for the end of the tick
#[derive(Debug, Default)]
pub struct TransitionQueue {
    queue: Vec<SceneTransition>,
}

impl TransitionQueue {
    /// Empty queue
    pub fn new() -> Self {
        Self { queue: Vec::new() }
    }

    /// Queue a transition
    pub fn push(&mut self, transition: SceneTransition) {
        self.queue.push(transition);
    }

    /// Queued transitions, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &SceneTransition> {
        self.queue.iter()
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of queued transitions
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Take every queued transition, leaving the queue empty
    pub fn take(&mut self) -> Vec<SceneTransition> {
        std::mem::take(&mut self.queue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_empties_queue_in_order() {
        let mut queue = TransitionQueue::new();
        queue.push(SceneTransition::MoveTo { from: None, target: Some("menu".to_string()) });
        queue.push(SceneTransition::MoveTo { from: None, target: None });
        assert_eq!(queue.len(), 2);

        let taken = queue.take();
        assert!(queue.is_empty());
        assert_eq!(
            taken[0],
            SceneTransition::MoveTo { from: None, target: Some("menu".to_string()) }
        );
    }
}
