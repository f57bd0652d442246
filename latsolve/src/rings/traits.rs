use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::str::FromStr;

use num_integer::Integer;
use num_traits::{CheckedAdd, CheckedDiv, CheckedMul, CheckedSub, One, Signed, Zero};

use crate::error::{Error, Result};

/// The numeric precision a run was started with.
///
/// The precision is chosen once per run and recorded in checkpoints so that a
/// resumed run cannot silently continue with a narrower type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Precision {
    Int32,
    Int64,
    Arbitrary,
}

impl Precision {
    /// The token used in checkpoint headers.
    pub fn token(self) -> &'static str {
        match self {
            Precision::Int32 => "32",
            Precision::Int64 => "64",
            Precision::Arbitrary => "arbitrary",
        }
    }

    pub fn from_token(s: &str) -> Result<Self> {
        match s {
            "32" => Ok(Precision::Int32),
            "64" => Ok(Precision::Int64),
            "arbitrary" => Ok(Precision::Arbitrary),
            _ => Err(Error::Parse(format!("unknown precision `{s}`"))),
        }
    }
}

/// The integer capability set the whole solver is generic over.
///
/// The fixed width implementations (`i32`, `i64`) report overflow as
/// [`Error::Overflow`] through the `try_*` methods the moment an operation
/// would leave their range. [`num_bigint::BigInt`] never fails. There is no
/// wrapping or truncation anywhere: a result is either exact or an error.
///
/// All the heavy lifting is done by the `num` traits in the supertrait list,
/// the methods here only exist to turn the `Option`s of the checked operations
/// into crate errors and to fill the gaps (checked negation and absolute
/// value, euclidean division, gcd).
pub trait Int:
    Clone
    + Integer
    + Signed
    + Hash
    + Debug
    + Display
    + FromStr
    + CheckedAdd
    + CheckedSub
    + CheckedMul
    + CheckedDiv
    + 'static
{
    /// Which concrete precision this type provides.
    fn precision() -> Precision;

    /// Checked addition.
    fn try_add(&self, rhs: &Self) -> Result<Self> {
        self.checked_add(rhs).ok_or(Error::Overflow)
    }

    /// Checked subtraction.
    fn try_sub(&self, rhs: &Self) -> Result<Self> {
        self.checked_sub(rhs).ok_or(Error::Overflow)
    }

    /// Checked multiplication.
    fn try_mul(&self, rhs: &Self) -> Result<Self> {
        self.checked_mul(rhs).ok_or(Error::Overflow)
    }

    /// Checked truncating division.
    fn try_div(&self, rhs: &Self) -> Result<Self> {
        self.checked_div(rhs).ok_or(Error::Overflow)
    }

    /// Checked negation. `0 - e` is exactly the negation and lets
    /// `checked_sub` catch the one value a two's complement type cannot
    /// negate.
    fn try_neg(&self) -> Result<Self> {
        Self::zero().checked_sub(self).ok_or(Error::Overflow)
    }

    /// Checked absolute value.
    fn try_abs(&self) -> Result<Self> {
        if self.is_negative() {
            self.try_neg()
        } else {
            Ok(self.clone())
        }
    }

    /// Checked euclidean division: the quotient `q` with
    /// `0 <= self - q * rhs < |rhs|`.
    fn try_div_euclid(&self, rhs: &Self) -> Result<Self> {
        let q = self.try_div(rhs)?;
        let r = self.try_sub(&q.try_mul(rhs)?)?;
        if r.is_negative() {
            if rhs.is_positive() {
                q.try_sub(&Self::one())
            } else {
                q.try_add(&Self::one())
            }
        } else {
            Ok(q)
        }
    }

    /// Checked euclidean remainder, always non-negative.
    fn try_rem_euclid(&self, rhs: &Self) -> Result<Self> {
        self.try_sub(&self.try_div_euclid(rhs)?.try_mul(rhs)?)
    }

    /// Gcd of the absolute values. Taking the absolute values first keeps the
    /// computation inside the non-negative range where it cannot overflow.
    fn try_gcd(&self, rhs: &Self) -> Result<Self> {
        Ok(self.try_abs()?.gcd(&rhs.try_abs()?))
    }

    /// Parse a decimal literal.
    fn parse(s: &str) -> Result<Self> {
        s.parse()
            .map_err(|_| Error::Parse(format!("invalid integer literal `{s}`")))
    }
}
