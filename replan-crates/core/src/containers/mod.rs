//! Collections shared by the engine and the scheduler.
mod keyed_vec;

use fnv::FnvBuildHasher;
pub use keyed_vec::KeyedVec;
pub use keyed_vec::StorageKey;

/// A [`std::collections::HashMap`] with a deterministic hasher, so that runs are reproducible.
pub type HashMap<K, V, Hasher = FnvBuildHasher> = std::collections::HashMap<K, V, Hasher>;
/// A [`std::collections::HashSet`] with a deterministic hasher, so that runs are reproducible.
pub type HashSet<K, Hasher = FnvBuildHasher> = std::collections::HashSet<K, Hasher>;

/// Declares a `u32`-backed handle which indexes a [`KeyedVec`].
macro_rules! storage_key {
    ($(#[$attribute:meta])* $visibility:vis struct $name:ident;) => {
        $(#[$attribute])*
        #[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
        $visibility struct $name(pub(crate) u32);

        impl $crate::containers::StorageKey for $name {
            fn index(&self) -> usize {
                self.0 as usize
            }

            fn create_from_index(index: usize) -> Self {
                $crate::replan_assert_simple!(index <= u32::MAX as usize);
                $name(index as u32)
            }
        }
    };
}

pub(crate) use storage_key;
