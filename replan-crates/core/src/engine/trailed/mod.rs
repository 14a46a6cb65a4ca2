mod trailed_cell;
mod trailed_change;
mod trailed_values;

pub use trailed_cell::TrailedCell;
pub(crate) use trailed_change::TrailedChange;
pub use trailed_values::TrailedValues;
