mod linear_less_or_equal;
mod linear_not_equal;

pub use linear_less_or_equal::LinearLessOrEqualConstructor;
pub use linear_less_or_equal::LinearLessOrEqualPropagator;
pub use linear_not_equal::LinearNotEqualConstructor;
pub use linear_not_equal::LinearNotEqualPropagator;
