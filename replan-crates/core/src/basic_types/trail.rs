use std::iter::Rev;
use std::vec::Drain;

use crate::replan_assert_simple;

/// A stack of undo entries partitioned into worlds. World 0 is the root; every pushed world owns
/// the entries recorded since it was pushed.
#[derive(Clone, Debug)]
pub(crate) struct Trail<T> {
    /// `world_starts[i]` is the first entry of world `i + 1`.
    world_starts: Vec<usize>,
    entries: Vec<T>,
}

impl<T> Default for Trail<T> {
    fn default() -> Self {
        Trail {
            world_starts: Vec::new(),
            entries: Vec::new(),
        }
    }
}

impl<T> Trail<T> {
    pub(crate) fn current_world(&self) -> usize {
        self.world_starts.len()
    }

    pub(crate) fn push_world(&mut self) {
        self.world_starts.push(self.entries.len());
    }

    pub(crate) fn record(&mut self, entry: T) {
        self.entries.push(entry);
    }

    /// The entries recorded while `world` was the innermost world.
    pub(crate) fn entries_of(&self, world: usize) -> &[T] {
        replan_assert_simple!(world <= self.current_world());

        let start = match world {
            0 => 0,
            _ => self.world_starts[world - 1],
        };
        let end = self
            .world_starts
            .get(world)
            .copied()
            .unwrap_or(self.entries.len());

        &self.entries[start..end]
    }

    /// Drops every world above `world` and hands back their entries, most recent first.
    pub(crate) fn pop_to(&mut self, world: usize) -> Rev<Drain<'_, T>> {
        replan_assert_simple!(world < self.current_world());

        let start = self.world_starts[world];
        self.world_starts.truncate(world);
        self.entries.drain(start..).rev()
    }

    /// Hands the entries of the current world over to its parent, so that popping the parent
    /// undoes them as well.
    pub(crate) fn merge_into_parent(&mut self) {
        replan_assert_simple!(self.current_world() > 0);

        let _ = self.world_starts.pop();
    }
}
