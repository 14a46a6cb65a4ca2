use super::TrailedCell;

#[derive(Debug, Clone)]
pub(crate) struct TrailedChange<T> {
    pub(crate) old_value: T,
    pub(crate) old_stamp: u64,
    pub(crate) reference: TrailedCell,
}
