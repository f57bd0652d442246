//! The kind of integer the solver computes with.
//!
//! A run picks one concrete type up front: a fast fixed width type (`i32`,
//! `i64`) or [`num_bigint::BigInt`]. Everything downstream is generic over
//! the [`Int`] trait, so the choice is a type parameter and not a runtime
//! dispatch per operation.
//!
//! The fixed width types are not allowed to wrap. Every arithmetic operation
//! goes through the checked `try_*` methods and reports
//! [`crate::error::Error::Overflow`] the moment a result would leave the
//! representable range. `BigInt` implements the same interface and simply
//! never fails.

mod arbitrary;
mod primitive;
mod traits;

pub use traits::{Int, Precision};

/// Run an expression with the concrete integer type for a runtime precision.
///
/// ```
/// use latsolve::{rings::{Int, Precision}, with_precision};
///
/// let p = Precision::Int64;
/// let text = with_precision!(p, I => format!("{}", I::parse("42").unwrap()));
/// assert_eq!(text, "42");
/// ```
#[macro_export]
macro_rules! with_precision {
    ($p:expr, $I:ident => $e:expr) => {
        match $p {
            $crate::rings::Precision::Int32 => {
                #[allow(non_camel_case_types)]
                type $I = i32;
                $e
            }
            $crate::rings::Precision::Int64 => {
                #[allow(non_camel_case_types)]
                type $I = i64;
                $e
            }
            $crate::rings::Precision::Arbitrary => {
                #[allow(non_camel_case_types)]
                type $I = ::num_bigint::BigInt;
                $e
            }
        }
    };
}

#[cfg(test)]
mod test {
    use super::*;
    use num_bigint::BigInt;

    #[test]
    fn precision_tokens_round_trip() {
        for p in [Precision::Int32, Precision::Int64, Precision::Arbitrary] {
            assert_eq!(Precision::from_token(p.token()).unwrap(), p);
        }
        assert!(Precision::from_token("128").is_err());
    }

    #[test]
    fn precision_reported_per_type() {
        assert_eq!(<i32 as Int>::precision(), Precision::Int32);
        assert_eq!(<i64 as Int>::precision(), Precision::Int64);
        assert_eq!(<BigInt as Int>::precision(), Precision::Arbitrary);
    }

    #[test]
    fn with_precision_selects_the_type() {
        let p = Precision::Arbitrary;
        let ok = with_precision!(p, I => I::parse("340282366920938463463374607431768211456").is_ok());
        assert!(ok);
        let p = Precision::Int32;
        let ok = with_precision!(p, I => I::parse("340282366920938463463374607431768211456").is_ok());
        assert!(!ok);
    }
}
