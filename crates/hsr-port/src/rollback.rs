//! Undo stack for multi-step operations.
//!
//! Each completed step pushes the action that reverses it. Dropping the
//! stack without [`Rollback::commit`] runs the actions newest first, so an
//! early `?` return leaves things as they were before the first step.

use tracing::debug;

type UndoFn<'a> = Box<dyn FnOnce() + 'a>;

pub(crate) struct Rollback<'a> {
    steps: Vec<(&'static str, UndoFn<'a>)>,
}

impl<'a> Rollback<'a> {
    pub(crate) fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Registers the undo action for a step that just succeeded.
    pub(crate) fn push(&mut self, step: &'static str, undo: impl FnOnce() + 'a) {
        self.steps.push((step, Box::new(undo)));
    }

    /// Keeps every step; nothing is undone.
    pub(crate) fn commit(mut self) {
        self.steps.clear();
    }
}

impl Drop for Rollback<'_> {
    fn drop(&mut self) {
        while let Some((step, undo)) = self.steps.pop() {
            debug!(step, "rolling back");
            undo();
        }
    }
}
