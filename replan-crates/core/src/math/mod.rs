//! Integer division with a chosen rounding direction, for signed operands.

/// `numerator / denominator`, rounded towards positive infinity.
pub(crate) fn div_round_up(numerator: i32, denominator: i32) -> i32 {
    let quotient = numerator / denominator;
    let inexact = numerator % denominator != 0;
    if inexact && (numerator < 0) == (denominator < 0) {
        quotient + 1
    } else {
        quotient
    }
}

/// `numerator / denominator`, rounded towards negative infinity.
pub(crate) fn div_round_down(numerator: i32, denominator: i32) -> i32 {
    let quotient = numerator / denominator;
    let inexact = numerator % denominator != 0;
    if inexact && (numerator < 0) != (denominator < 0) {
        quotient - 1
    } else {
        quotient
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_follows_the_sign_of_the_quotient() {
        assert_eq!(2, div_round_up(3, 2));
        assert_eq!(-1, div_round_up(-3, 2));
        assert_eq!(2, div_round_up(-3, -2));
        assert_eq!(1, div_round_down(3, 2));
        assert_eq!(-2, div_round_down(-3, 2));
        assert_eq!(-2, div_round_down(3, -2));
    }

    #[test]
    fn exact_divisions_are_not_rounded() {
        assert_eq!(-3, div_round_up(6, -2));
        assert_eq!(-3, div_round_down(6, -2));
    }
}
