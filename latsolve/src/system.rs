//! Linear systems: per row relations, per column metadata, homogenization.
//!
//! A [`LinearSystem`] is created once from the parsed input and consumed by
//! [`LinearSystem::homogenize`], which turns it into an equivalent
//! homogeneous equality system. Inequalities fold into slack columns whose
//! sign bound matches the inequality direction, congruences get a free
//! multiplier column, and a non-zero right-hand side moves into a single
//! additional column bounded to {0, 1}.

use crate::error::{Error, Result};
use crate::matrix::VectorArray;
use crate::rings::Int;

/// Marks internal slack columns in [`VariableProperty::column`].
pub const SLACK_COLUMN: i32 = -1;
/// Marks the homogenization indicator column in [`VariableProperty::column`].
pub const INDICATOR_COLUMN: i32 = -2;

/// The constraint kind of one row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Relation<I> {
    Equal,
    Lesser,
    LesserEqual,
    Greater,
    GreaterEqual,
    /// Congruence modulo the given non-zero modulus.
    Modulo(I),
}

impl<I: Int> Relation<I> {
    pub fn from_token(s: &str) -> Result<Self> {
        match s {
            "=" => Ok(Relation::Equal),
            "<" => Ok(Relation::Lesser),
            "<=" => Ok(Relation::LesserEqual),
            ">" => Ok(Relation::Greater),
            ">=" => Ok(Relation::GreaterEqual),
            _ => Err(Error::Parse(format!("unknown relation `{s}`"))),
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Relation::Equal => "=",
            Relation::Lesser => "<",
            Relation::LesserEqual => "<=",
            Relation::Greater => ">",
            Relation::GreaterEqual => ">=",
            Relation::Modulo(_) => "%",
        }
    }
}

/// The sign code of a column: which side of zero its values may take.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sign {
    /// Any value, and the column is excluded from the completion. Its
    /// generators surface as the free part of the result.
    Free,
    NonNegative,
    NonPositive,
    /// Any value, but the column runs through the symmetric completion.
    TwoSided,
}

impl Sign {
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            0 => Ok(Sign::Free),
            1 => Ok(Sign::NonNegative),
            -1 => Ok(Sign::NonPositive),
            2 => Ok(Sign::TwoSided),
            _ => Err(Error::Parse(format!("unknown sign code `{code}`"))),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Sign::Free => 0,
            Sign::NonNegative => 1,
            Sign::NonPositive => -1,
            Sign::TwoSided => 2,
        }
    }
}

/// Per column metadata, moved in lock-step with its column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableProperty<I> {
    /// Original result column (>= 0), [`SLACK_COLUMN`] or
    /// [`INDICATOR_COLUMN`].
    pub column: i32,
    /// Free columns are unbounded in both directions and skipped by the
    /// completion.
    pub free: bool,
    /// `None` is unbounded below.
    pub lower: Option<I>,
    /// `None` is unbounded above.
    pub upper: Option<I>,
}

impl<I: Int> VariableProperty<I> {
    pub fn free_var(column: i32) -> Self {
        Self { column, free: true, lower: None, upper: None }
    }

    pub fn bounded(column: i32, lower: Option<I>, upper: Option<I>) -> Self {
        Self { column, free: false, lower, upper }
    }

    pub fn from_sign(column: i32, sign: Sign) -> Self {
        match sign {
            Sign::Free => Self::free_var(column),
            Sign::NonNegative => Self::bounded(column, Some(I::zero()), None),
            Sign::NonPositive => Self::bounded(column, None, Some(I::zero())),
            Sign::TwoSided => Self::bounded(column, None, None),
        }
    }

    /// Is the value within the bounds?
    pub fn check(&self, value: &I) -> bool {
        self.lower.as_ref().is_none_or(|l| value >= l)
            && self.upper.as_ref().is_none_or(|u| value <= u)
    }

    /// How many directions are unbounded (0, 1 or 2)?
    pub fn infinite_directions(&self) -> usize {
        self.lower.is_none() as usize + self.upper.is_none() as usize
    }

    /// `upper - lower` when both bounds are finite.
    pub fn range(&self) -> Result<Option<I>> {
        match (&self.lower, &self.upper) {
            (Some(l), Some(u)) => Ok(Some(u.try_sub(l)?)),
            _ => Ok(None),
        }
    }

    /// Is the bound interval symmetric about zero? Negating a value of a
    /// symmetric column preserves validity.
    pub fn symmetric(&self) -> bool {
        match (&self.lower, &self.upper) {
            (None, None) => true,
            (Some(l), Some(u)) => l.try_neg().map(|n| n == *u).unwrap_or(false),
            _ => false,
        }
    }
}

/// Builds the result column properties from sign codes and optional explicit
/// bounds. An explicit bound on a free column turns it into a bounded one.
pub fn properties_from<I: Int>(
    signs: &[Sign],
    lower: Option<&[Option<I>]>,
    upper: Option<&[Option<I>]>,
) -> Result<Vec<VariableProperty<I>>> {
    if let Some(l) = lower {
        if l.len() != signs.len() {
            return Err(Error::Dimensions(format!(
                "{} lower bounds for {} columns",
                l.len(),
                signs.len()
            )));
        }
    }
    if let Some(u) = upper {
        if u.len() != signs.len() {
            return Err(Error::Dimensions(format!(
                "{} upper bounds for {} columns",
                u.len(),
                signs.len()
            )));
        }
    }

    let mut properties = Vec::with_capacity(signs.len());
    for (i, sign) in signs.iter().enumerate() {
        let mut p = VariableProperty::from_sign(i as i32, *sign);
        if let Some(l) = lower.and_then(|l| l[i].clone()) {
            p.lower = Some(l);
            p.free = false;
        }
        if let Some(u) = upper.and_then(|u| u[i].clone()) {
            p.upper = Some(u);
            p.free = false;
        }
        properties.push(p);
    }
    Ok(properties)
}

/// Matrix, right-hand side, relations and column metadata of one problem.
#[derive(Clone, Debug)]
pub struct LinearSystem<I> {
    pub matrix: VectorArray<I>,
    pub rhs: Vec<I>,
    pub relations: Vec<Relation<I>>,
    pub properties: Vec<VariableProperty<I>>,
}

impl<I: Int> LinearSystem<I> {
    pub fn new(
        matrix: VectorArray<I>,
        rhs: Vec<I>,
        relations: Vec<Relation<I>>,
        properties: Vec<VariableProperty<I>>,
    ) -> Result<Self> {
        if rhs.len() != matrix.num_rows() {
            return Err(Error::Dimensions(format!(
                "{} right-hand side entries for {} rows",
                rhs.len(),
                matrix.num_rows()
            )));
        }
        if relations.len() != matrix.num_rows() {
            return Err(Error::Dimensions(format!(
                "{} relations for {} rows",
                relations.len(),
                matrix.num_rows()
            )));
        }
        if properties.len() != matrix.num_cols() {
            return Err(Error::Dimensions(format!(
                "{} column properties for {} columns",
                properties.len(),
                matrix.num_cols()
            )));
        }
        for relation in &relations {
            if let Relation::Modulo(m) = relation {
                if m.is_zero() {
                    return Err(Error::Inconsistent("zero modulus in a congruence".into()));
                }
            }
        }
        Ok(Self { matrix, rhs, relations, properties })
    }

    /// Folds the system into a homogeneous equality system and the column
    /// properties of the result.
    pub fn homogenize(self) -> Result<(VectorArray<I>, Vec<VariableProperty<I>>)> {
        let cols = self.matrix.num_cols();

        // Strict inequalities become non-strict ones over the integers by
        // adjusting the constant.
        let mut rhs = self.rhs;
        for (b, relation) in rhs.iter_mut().zip(&self.relations) {
            match relation {
                Relation::Lesser => *b = b.try_sub(&I::one())?,
                Relation::Greater => *b = b.try_add(&I::one())?,
                _ => {}
            }
        }

        let slacks = self
            .relations
            .iter()
            .filter(|r| !matches!(r, Relation::Equal))
            .count();
        let inhomogeneous = rhs.iter().any(|b| !b.is_zero());
        let width = cols + slacks + inhomogeneous as usize;

        let mut matrix = VectorArray::new(width);
        let mut properties = self.properties;
        let mut slack = cols;
        for (i, relation) in self.relations.iter().enumerate() {
            let mut row = self.matrix.row(i).to_vec();
            row.resize(width, I::zero());
            match relation {
                Relation::Equal => {}
                Relation::Lesser | Relation::LesserEqual => {
                    // a + s = b with s >= 0 is a <= b
                    row[slack] = I::one();
                    properties.push(VariableProperty::bounded(
                        SLACK_COLUMN,
                        Some(I::zero()),
                        None,
                    ));
                    slack += 1;
                }
                Relation::Greater | Relation::GreaterEqual => {
                    // a + s = b with s <= 0 is a >= b
                    row[slack] = I::one();
                    properties.push(VariableProperty::bounded(
                        SLACK_COLUMN,
                        None,
                        Some(I::zero()),
                    ));
                    slack += 1;
                }
                Relation::Modulo(m) => {
                    // a + m k = b with a free multiplier k
                    row[slack] = m.clone();
                    properties.push(VariableProperty::free_var(SLACK_COLUMN));
                    slack += 1;
                }
            }
            if inhomogeneous {
                row[width - 1] = rhs[i].try_neg()?;
            }
            matrix.append_row(row);
        }

        if inhomogeneous {
            properties.push(VariableProperty::bounded(
                INDICATOR_COLUMN,
                Some(I::zero()),
                Some(I::one()),
            ));
        }

        Ok((matrix, properties))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn nonneg(n: usize) -> Vec<VariableProperty<i64>> {
        (0..n)
            .map(|i| VariableProperty::from_sign(i as i32, Sign::NonNegative))
            .collect()
    }

    #[test]
    fn property_predicates() {
        let p = VariableProperty::bounded(0, Some(-2i64), Some(2));
        assert!(p.check(&0) && p.check(&-2) && p.check(&2));
        assert!(!p.check(&3) && !p.check(&-3));
        assert!(p.symmetric());
        assert_eq!(p.range().unwrap(), Some(4));
        assert_eq!(p.infinite_directions(), 0);

        let h = VariableProperty::bounded(0, Some(0i64), None);
        assert!(!h.symmetric());
        assert_eq!(h.infinite_directions(), 1);

        assert!(VariableProperty::<i64>::free_var(0).symmetric());
    }

    #[test]
    fn homogenize_moves_the_constant_into_an_indicator_column() {
        let matrix = VectorArray::from_rows(3, vec![vec![1i64, 1, 1]]);
        let system =
            LinearSystem::new(matrix, vec![1], vec![Relation::Equal], nonneg(3)).unwrap();
        let (h, properties) = system.homogenize().unwrap();

        assert_eq!(h.num_cols(), 4);
        assert_eq!(h.row(0), &[1, 1, 1, -1]);
        assert_eq!(properties.len(), 4);
        let indicator = &properties[3];
        assert_eq!(indicator.column, INDICATOR_COLUMN);
        assert_eq!(indicator.lower, Some(0));
        assert_eq!(indicator.upper, Some(1));
    }

    #[test]
    fn homogenize_slack_signs_follow_the_relation() {
        let matrix = VectorArray::from_rows(1, vec![vec![1i64], vec![1]]);
        let system = LinearSystem::new(
            matrix,
            vec![0, 0],
            vec![Relation::LesserEqual, Relation::GreaterEqual],
            nonneg(1),
        )
        .unwrap();
        let (h, properties) = system.homogenize().unwrap();

        assert_eq!(h.num_cols(), 3);
        assert_eq!(h.row(0), &[1, 1, 0]);
        assert_eq!(h.row(1), &[1, 0, 1]);
        // the first slack is non-negative, the second non-positive
        assert_eq!(properties[1].lower, Some(0));
        assert_eq!(properties[1].upper, None);
        assert_eq!(properties[2].lower, None);
        assert_eq!(properties[2].upper, Some(0));
    }

    #[test]
    fn homogenize_adjusts_strict_relations() {
        let matrix = VectorArray::from_rows(1, vec![vec![1i64]]);
        let system =
            LinearSystem::new(matrix, vec![3], vec![Relation::Lesser], nonneg(1)).unwrap();
        let (h, _) = system.homogenize().unwrap();
        // x < 3 is x + s = 2 with s >= 0
        assert_eq!(h.row(0), &[1, 1, -2]);
    }

    #[test]
    fn homogenize_congruence_gets_a_free_multiplier() {
        let matrix = VectorArray::from_rows(1, vec![vec![1i64]]);
        let system =
            LinearSystem::new(matrix, vec![0], vec![Relation::Modulo(5)], nonneg(1)).unwrap();
        let (h, properties) = system.homogenize().unwrap();
        assert_eq!(h.row(0), &[1, 5]);
        assert!(properties[1].free);
    }

    #[test]
    fn explicit_bounds_override_signs() {
        let properties = properties_from::<i64>(
            &[Sign::Free, Sign::NonNegative],
            Some(&[None, None]),
            Some(&[Some(4), Some(7)]),
        )
        .unwrap();
        assert!(!properties[0].free);
        assert_eq!(properties[0].upper, Some(4));
        assert_eq!(properties[0].lower, None);
        assert_eq!(properties[1].lower, Some(0));
        assert_eq!(properties[1].upper, Some(7));
    }

    #[test]
    fn dimension_mismatches_are_rejected() {
        let matrix = VectorArray::from_rows(2, vec![vec![1i64, 2]]);
        assert!(matches!(
            LinearSystem::new(matrix.clone(), vec![], vec![Relation::Equal], nonneg(2)),
            Err(Error::Dimensions(_))
        ));
        assert!(matches!(
            LinearSystem::new(matrix.clone(), vec![0], vec![], nonneg(2)),
            Err(Error::Dimensions(_))
        ));
        assert!(matches!(
            LinearSystem::new(matrix, vec![0], vec![Relation::Equal], nonneg(1)),
            Err(Error::Dimensions(_))
        ));
    }

    #[test]
    fn zero_modulus_is_rejected() {
        let matrix = VectorArray::from_rows(1, vec![vec![1i64]]);
        assert!(matches!(
            LinearSystem::new(matrix, vec![0], vec![Relation::Modulo(0)], nonneg(1)),
            Err(Error::Inconsistent(_))
        ));
    }
}
