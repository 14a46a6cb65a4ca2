/// Variables which can hand out an affine view of themselves, `y = a * x + b`, without posting a
/// new variable and a linking constraint.
pub trait TransformableVariable<View> {
    /// `scale * self`. The view has holes: scaling `{1, 2}` by 2 gives `{2, 4}`.
    fn scaled(&self, scale: i32) -> View;

    /// `self + offset`.
    fn offset(&self, offset: i32) -> View;
}
