use num_bigint::BigInt;

use super::traits::{Int, Precision};

impl Int for BigInt {
    fn precision() -> Precision {
        Precision::Arbitrary
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn never_overflows() {
        let big = BigInt::from(i64::MAX);
        let bigger = big.try_mul(&big).unwrap();
        assert_eq!(bigger, BigInt::from(i64::MAX) * i64::MAX);
        assert_eq!(BigInt::from(i64::MIN).try_neg().unwrap(), -BigInt::from(i64::MIN));
    }

    #[test]
    fn parses_beyond_fixed_width() {
        let e = <BigInt as Int>::parse("123456789012345678901234567890").unwrap();
        assert_eq!(e.to_string(), "123456789012345678901234567890");
        assert!(<i64 as Int>::parse("123456789012345678901234567890").is_err());
    }
}
