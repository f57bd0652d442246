//! The text formats of the surrounding batch tools.
//!
//! Matrices carry a `<rows> <cols>` header line followed by the entries.
//! Sign and relation files are a single row of per-column and per-row codes.
//! Bound files hold one line per column with a literal value or `*` for
//! unbounded. Parsing is strict: wrong counts and trailing garbage are
//! input consistency errors, reported before any computation starts.

use std::io::Write;

use itertools::Itertools;

use crate::error::{Error, Result};
use crate::extract::SolutionBasis;
use crate::matrix::VectorArray;
use crate::rings::Int;
use crate::system::{Relation, Sign};

/// Parses the matrix text format.
pub fn parse_matrix<I: Int>(text: &str) -> Result<VectorArray<I>> {
    let mut tokens = text.split_whitespace();
    let mut count = |what: &str| -> Result<usize> {
        let token = tokens
            .next()
            .ok_or_else(|| Error::Parse(format!("missing {what}")))?;
        token
            .parse()
            .map_err(|_| Error::Parse(format!("invalid {what} `{token}`")))
    };
    let rows = count("row count")?;
    let cols = count("column count")?;

    let mut matrix = VectorArray::new(cols);
    for r in 0..rows {
        let mut row = Vec::with_capacity(cols);
        for c in 0..cols {
            let token = tokens.next().ok_or_else(|| {
                Error::Parse(format!("matrix ends inside row {r}, column {c}"))
            })?;
            row.push(I::parse(token)?);
        }
        matrix.append_row(row);
    }
    if tokens.next().is_some() {
        return Err(Error::Parse("trailing data after the matrix".into()));
    }
    Ok(matrix)
}

/// Writes the matrix text format.
pub fn write_matrix<I: Int, W: Write>(writer: &mut W, matrix: &VectorArray<I>) -> Result<()> {
    writeln!(writer, "{} {}", matrix.num_rows(), matrix.num_cols())?;
    for row in matrix.rows() {
        writeln!(writer, "{}", row.iter().join(" "))?;
    }
    Ok(())
}

/// Parses a single row vector in the matrix text format with a `1 <cols>`
/// header.
pub fn parse_rhs<I: Int>(text: &str) -> Result<Vec<I>> {
    let matrix = parse_matrix::<I>(text)?;
    if matrix.num_rows() != 1 {
        return Err(Error::Parse(format!(
            "expected a single row, found {}",
            matrix.num_rows()
        )));
    }
    Ok(matrix.row(0).to_vec())
}

/// Parses the sign file: one row of per-column codes.
pub fn parse_signs(text: &str) -> Result<Vec<Sign>> {
    text.split_whitespace()
        .map(|token| {
            let code = token
                .parse()
                .map_err(|_| Error::Parse(format!("invalid sign code `{token}`")))?;
            Sign::from_code(code)
        })
        .collect()
}

/// Parses a bound file: one line per column, a literal value or `*`.
pub fn parse_bounds<I: Int>(text: &str) -> Result<Vec<Option<I>>> {
    let mut bounds = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let mut tokens = line.split_whitespace();
        let Some(token) = tokens.next() else {
            continue;
        };
        if tokens.next().is_some() {
            return Err(Error::Parse(format!(
                "more than one bound on line {}",
                number + 1
            )));
        }
        if token == "*" {
            bounds.push(None);
        } else {
            bounds.push(Some(I::parse(token)?));
        }
    }
    Ok(bounds)
}

/// Parses the relation file: one row of per-row tokens.
pub fn parse_relations<I: Int>(text: &str) -> Result<Vec<Relation<I>>> {
    text.split_whitespace().map(Relation::from_token).collect()
}

/// Writes the three result files in the matrix text format.
pub fn write_results<I: Int, W: Write>(
    inhomogeneous: &mut W,
    homogeneous: &mut W,
    free: &mut W,
    basis: &SolutionBasis<I>,
) -> Result<()> {
    write_matrix(inhomogeneous, &basis.inhomogeneous)?;
    write_matrix(homogeneous, &basis.homogeneous)?;
    write_matrix(free, &basis.free)?;
    Ok(())
}
