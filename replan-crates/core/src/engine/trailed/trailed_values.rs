use super::TrailedCell;
use super::TrailedChange;
use crate::basic_types::Trail;
use crate::containers::KeyedVec;
use crate::replan_assert_moderate;
use crate::replan_assert_simple;

/// An arena of backtrackable cells.
///
/// The arena keeps track of a stack of worlds. Writing to a cell logs its previous value at most
/// once per world, so popping a world restores every cell to the value it had when the world was
/// pushed. Writes in the root world are permanent and are never logged.
#[derive(Debug, Clone)]
pub struct TrailedValues<T> {
    trail: Trail<TrailedChange<T>>,
    values: KeyedVec<TrailedCell, T>,
    /// The stamp of the world in which each cell was last saved on the trail.
    stamps: KeyedVec<TrailedCell, u64>,
    /// The stamp of every open world, root included. Stamps are never reused, so a popped world
    /// cannot be mistaken for a later sibling.
    world_stamps: Vec<u64>,
    next_stamp: u64,
}

impl<T> Default for TrailedValues<T> {
    fn default() -> Self {
        TrailedValues {
            trail: Trail::default(),
            values: KeyedVec::default(),
            stamps: KeyedVec::default(),
            world_stamps: vec![0],
            next_stamp: 1,
        }
    }
}

impl<T: Copy + PartialEq> TrailedValues<T> {
    /// Allocates a new cell holding `initial_value`.
    pub fn grow(&mut self, initial_value: T) -> TrailedCell {
        let _ = self.stamps.push(u64::MAX);
        self.values.push(initial_value)
    }

    pub fn num_cells(&self) -> usize {
        self.values.len()
    }

    pub fn read(&self, cell: TrailedCell) -> T {
        self.values[cell]
    }

    pub fn assign(&mut self, cell: TrailedCell, value: T) {
        let old_value = self.values[cell];
        if old_value == value {
            return;
        }

        let world_stamp = self.current_stamp();
        if self.current_world() > 0 && self.stamps[cell] != world_stamp {
            self.trail.record(TrailedChange {
                old_value,
                old_stamp: self.stamps[cell],
                reference: cell,
            });
            self.stamps[cell] = world_stamp;
        }

        self.values[cell] = value;
    }

    pub fn current_world(&self) -> usize {
        self.trail.current_world()
    }

    /// The number of saved values in the current world.
    pub fn saved_in_current_world(&self) -> usize {
        self.trail.entries_of(self.current_world()).len()
    }

    pub fn world_push(&mut self) {
        self.world_stamps.push(self.next_stamp);
        self.next_stamp += 1;
        self.trail.push_world();
    }

    /// Restores every cell written in the current world and returns to the parent world.
    pub fn world_pop(&mut self) {
        replan_assert_simple!(self.current_world() > 0, "cannot pop the root world of the trail");

        self.synchronise(self.current_world() - 1);
    }

    /// Folds the current world into its parent. The current values are kept, but the state the
    /// parent had before the current world was pushed can no longer be restored.
    ///
    /// # Panics
    /// Committing the root world is a usage error.
    pub fn world_commit(&mut self) {
        assert!(
            self.current_world() > 0,
            "cannot commit the root world of the trail"
        );

        let _ = self.world_stamps.pop();
        self.trail.merge_into_parent();
    }

    /// Pops worlds until `world` is the current world.
    pub fn synchronise(&mut self, world: usize) {
        replan_assert_moderate!(world < self.current_world());

        self.world_stamps.truncate(world + 1);
        for change in self.trail.pop_to(world) {
            self.values[change.reference] = change.old_value;
            self.stamps[change.reference] = change.old_stamp;
        }
    }

    fn current_stamp(&self) -> u64 {
        self.world_stamps.last().copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popping_restores_the_value_of_the_parent_world() {
        let mut values = TrailedValues::default();
        let cell = values.grow(0_i64);

        values.world_push();
        values.assign(cell, 5);
        values.assign(cell, 10);
        assert_eq!(values.read(cell), 10);

        values.world_push();
        values.assign(cell, 11);
        assert_eq!(values.read(cell), 11);

        values.world_pop();
        assert_eq!(values.read(cell), 10);

        values.world_pop();
        assert_eq!(values.read(cell), 0);
    }

    #[test]
    fn a_cell_is_saved_once_per_world() {
        let mut values = TrailedValues::default();
        let cell = values.grow(0_i64);

        values.world_push();
        values.assign(cell, 1);
        values.assign(cell, 2);
        values.assign(cell, 3);

        assert_eq!(1, values.saved_in_current_world());
    }

    #[test]
    fn unchanged_writes_are_not_saved() {
        let mut values = TrailedValues::default();
        let cell = values.grow(true);

        values.world_push();
        values.assign(cell, true);

        assert_eq!(0, values.saved_in_current_world());
    }

    #[test]
    fn writes_in_the_root_world_are_permanent() {
        let mut values = TrailedValues::default();
        let cell = values.grow(0_i64);
        values.assign(cell, 4);

        values.world_push();
        values.assign(cell, 8);
        values.world_pop();

        assert_eq!(values.read(cell), 4);
    }

    #[test]
    fn a_cell_is_saved_again_after_its_world_was_popped() {
        let mut values = TrailedValues::default();
        let cell = values.grow(0_i64);

        values.world_push();
        values.assign(cell, 1);
        values.world_push();
        values.assign(cell, 2);
        values.world_pop();

        values.world_push();
        values.assign(cell, 3);
        values.world_pop();
        assert_eq!(values.read(cell), 1);

        values.world_pop();
        assert_eq!(values.read(cell), 0);
    }

    #[test]
    fn a_parent_world_does_not_save_a_cell_again_after_a_child_is_popped() {
        let mut values = TrailedValues::default();
        let cell = values.grow(0_i64);

        values.world_push();
        values.assign(cell, 1);
        values.world_push();
        values.assign(cell, 2);
        values.world_pop();
        values.assign(cell, 3);

        assert_eq!(1, values.saved_in_current_world());
        values.world_pop();
        assert_eq!(values.read(cell), 0);
    }

    #[test]
    fn repeated_push_pop_cycles_do_not_grow_the_trail() {
        let mut values = TrailedValues::default();
        let cell = values.grow(0_i64);

        values.world_push();
        for value in 1..50 {
            values.assign(cell, value);
            values.world_push();
            values.assign(cell, -value);
            values.world_pop();
        }

        assert_eq!(1, values.saved_in_current_world());
        assert_eq!(values.read(cell), 49);
    }

    #[test]
    #[should_panic(expected = "cannot pop the root world")]
    fn popping_the_root_world_panics() {
        let mut values = TrailedValues::<i64>::default();
        values.world_pop();
    }

    #[test]
    fn committed_worlds_are_undone_with_their_parent() {
        let mut values = TrailedValues::default();
        let cell = values.grow(0_i64);

        values.world_push();
        values.assign(cell, 1);
        values.world_push();
        values.assign(cell, 2);
        values.world_commit();

        assert_eq!(1, values.current_world());
        assert_eq!(values.read(cell), 2);

        values.world_pop();
        assert_eq!(values.read(cell), 0);
    }

    #[test]
    #[should_panic(expected = "cannot commit the root world")]
    fn committing_the_root_world_panics() {
        let mut values = TrailedValues::<i64>::default();
        values.world_commit();
    }
}
