//! Run options and the executable variants.
//!
//! The historical front ends differ only in default column signs and in
//! which inputs they accept, so they are one enum with a default sign and a
//! validation method instead of a class hierarchy.

use crate::error::{Error, Result};
use crate::rings::{Int, Precision};
use crate::system::{LinearSystem, Relation, Sign};

/// Which generating set a run computes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    /// Minimal inhomogeneous solutions plus monoid generators of the
    /// homogeneous part.
    Solutions,
    /// The Hilbert basis of a pointed cone.
    Hilbert,
    /// The Graver basis of the lattice.
    Graver,
}

impl Variant {
    pub fn token(self) -> &'static str {
        match self {
            Variant::Solutions => "solutions",
            Variant::Hilbert => "hilbert",
            Variant::Graver => "graver",
        }
    }

    pub fn from_token(s: &str) -> Result<Self> {
        match s {
            "solutions" => Ok(Variant::Solutions),
            "hilbert" => Ok(Variant::Hilbert),
            "graver" => Ok(Variant::Graver),
            _ => Err(Error::Parse(format!("unknown variant `{s}`"))),
        }
    }

    /// The sign a column gets when the input does not specify one.
    pub fn default_sign(self) -> Sign {
        match self {
            Variant::Solutions | Variant::Hilbert => Sign::NonNegative,
            Variant::Graver => Sign::TwoSided,
        }
    }

    /// Eager consistency checks, run before any real work starts.
    pub fn validate<I: Int>(self, system: &LinearSystem<I>) -> Result<()> {
        match self {
            Variant::Solutions => Ok(()),
            Variant::Hilbert | Variant::Graver => {
                if system.rhs.iter().any(|b| !b.is_zero()) {
                    return Err(Error::Inconsistent(format!(
                        "the {} variant requires a homogeneous system",
                        self.token()
                    )));
                }
                if system.relations.iter().any(|r| !matches!(r, Relation::Equal)) {
                    return Err(Error::Inconsistent(format!(
                        "the {} variant accepts only equality rows",
                        self.token()
                    )));
                }
                for property in &system.properties {
                    let two_sided =
                        !property.free && property.lower.is_none() && property.upper.is_none();
                    match self {
                        Variant::Hilbert if two_sided => {
                            return Err(Error::Inconsistent(
                                "two sided columns are not supported by the hilbert variant"
                                    .into(),
                            ));
                        }
                        Variant::Graver if !property.free && !two_sided => {
                            return Err(Error::Inconsistent(
                                "the graver variant accepts only free and two sided columns"
                                    .into(),
                            ));
                        }
                        _ => {}
                    }
                }
                Ok(())
            }
        }
    }
}

/// Options recorded in checkpoints and honored by the file controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    pub verbosity: u32,
    pub log_level: u32,
    /// Seconds between checkpoints, zero disables them.
    pub backup_interval: u64,
    pub variant: Variant,
    pub precision: Precision,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            verbosity: 1,
            log_level: 1,
            backup_interval: 0,
            variant: Variant::Solutions,
            precision: Precision::Int64,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::matrix::VectorArray;
    use crate::system::{VariableProperty, properties_from};

    fn system(rhs: i64, sign: Sign) -> LinearSystem<i64> {
        let matrix = VectorArray::from_rows(2, vec![vec![1, -1]]);
        let properties = properties_from(&[sign, sign], None, None).unwrap();
        LinearSystem::new(matrix, vec![rhs], vec![Relation::Equal], properties).unwrap()
    }

    #[test]
    fn variant_tokens_round_trip() {
        for v in [Variant::Solutions, Variant::Hilbert, Variant::Graver] {
            assert_eq!(Variant::from_token(v.token()).unwrap(), v);
        }
        assert!(Variant::from_token("markov").is_err());
    }

    #[test]
    fn hilbert_and_graver_require_homogeneous_input() {
        assert!(Variant::Hilbert.validate(&system(0, Sign::NonNegative)).is_ok());
        assert!(matches!(
            Variant::Hilbert.validate(&system(1, Sign::NonNegative)),
            Err(Error::Inconsistent(_))
        ));
        assert!(matches!(
            Variant::Graver.validate(&system(3, Sign::TwoSided)),
            Err(Error::Inconsistent(_))
        ));
        // the solutions variant takes anything
        assert!(Variant::Solutions.validate(&system(3, Sign::Free)).is_ok());
    }

    #[test]
    fn sign_restrictions_per_variant() {
        assert!(matches!(
            Variant::Hilbert.validate(&system(0, Sign::TwoSided)),
            Err(Error::Inconsistent(_))
        ));
        assert!(matches!(
            Variant::Graver.validate(&system(0, Sign::NonNegative)),
            Err(Error::Inconsistent(_))
        ));
        assert!(Variant::Graver.validate(&system(0, Sign::TwoSided)).is_ok());
        assert!(Variant::Graver.validate(&system(0, Sign::Free)).is_ok());
    }

    #[test]
    fn bounded_columns_pass_hilbert_validation() {
        let matrix = VectorArray::from_rows(1, vec![vec![1i64]]);
        let properties = vec![VariableProperty::bounded(0, Some(0), Some(5))];
        let system =
            LinearSystem::new(matrix, vec![0], vec![Relation::Equal], properties).unwrap();
        assert!(Variant::Hilbert.validate(&system).is_ok());
    }
}
