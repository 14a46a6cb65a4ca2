crate::containers::storage_key! {
    /// A handle to a backtrackable cell stored in [`TrailedValues`](super::TrailedValues).
    pub struct TrailedCell;
}
