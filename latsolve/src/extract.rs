//! Turning the terminal lattice into the emitted generating sets.
//!
//! Rows are classified by the indicator column: non-zero means the row is an
//! inhomogeneous solution, zero means it generates the homogeneous part.
//! Homogeneous rows supported entirely on free columns form the free
//! sublattice instead. Internal slack and indicator columns are dropped from
//! the emitted vectors and result columns appear in their original order.
//!
//! Two cleanup passes keep the output minimal. Rows dominated by another
//! pool row are dropped first (together with exact duplicates), restricted
//! to rows that never touch a free column, since the free sublattice is a
//! basis and not a domination minimal set. Then every row whose support lies
//! entirely in symmetric columns keeps exactly one representative of its
//! `±w` pair, the lexicographically greater one.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::error::Result;
use crate::lattice::Lattice;
use crate::matrix::VectorArray;
use crate::rings::Int;
use crate::system::INDICATOR_COLUMN;
use crate::vector;

/// The three emitted generating sets, in original result columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolutionBasis<I> {
    pub inhomogeneous: VectorArray<I>,
    pub homogeneous: VectorArray<I>,
    pub free: VectorArray<I>,
}

pub fn extract<I: Int>(lattice: &Lattice<I>) -> Result<SolutionBasis<I>> {
    let properties = &lattice.properties;
    let width = lattice.vectors.num_cols();

    // result columns in their original order
    let mut result_columns: Vec<(i32, usize)> = properties
        .iter()
        .enumerate()
        .filter(|(_, p)| p.column >= 0)
        .map(|(i, p)| (p.column, i))
        .collect();
    result_columns.sort_by_key(|&(id, _)| id);
    let indicator = properties.iter().position(|p| p.column == INDICATOR_COLUMN);

    let touches_free = |row: &[I]| {
        row.iter()
            .zip(properties)
            .any(|(e, p)| !e.is_zero() && p.free)
    };

    // Minimality sweep. A row is dropped when another row dominates it; of
    // two identical rows the first one stays. Rows touching free columns are
    // exempt, only exact duplicates are dropped there.
    let mut keep = Vec::new();
    let mut seen = HashSet::new();
    'rows: for i in 0..lattice.vectors.num_rows() {
        let row = lattice.vectors.row(i);
        if vector::is_zero(row) {
            continue;
        }
        if !seen.insert(row.to_vec()) {
            continue;
        }
        if !touches_free(row) {
            for j in 0..lattice.vectors.num_rows() {
                if i == j {
                    continue;
                }
                let other = lattice.vectors.row(j);
                if !touches_free(other)
                    && vector::dominates(other, row, 0, width)
                    && !vector::dominates(row, other, 0, width)
                {
                    continue 'rows;
                }
            }
        }
        keep.push(i);
    }

    let mut inhomogeneous = VectorArray::new(result_columns.len());
    let mut homogeneous = VectorArray::new(result_columns.len());
    let mut free = VectorArray::new(result_columns.len());
    let mut emitted: HashSet<Vec<I>> = HashSet::new();

    for i in keep {
        let row = lattice.vectors.row(i);
        let mut projected: Vec<I> = result_columns
            .iter()
            .map(|&(_, c)| row[c].clone())
            .collect();

        if indicator.is_some_and(|c| !row[c].is_zero()) {
            if emitted.insert(projected.clone()) {
                inhomogeneous.append_row(projected);
            }
            continue;
        }
        if vector::is_zero(&projected) {
            // supported only on internal columns
            continue;
        }

        let support_free = row
            .iter()
            .zip(properties)
            .all(|(e, p)| e.is_zero() || p.free);
        let support_symmetric = row
            .iter()
            .zip(properties)
            .all(|(e, p)| e.is_zero() || p.symmetric());

        if support_symmetric {
            // of w and -w only the lexicographically greater one survives
            let negated = vector::try_neg(&projected)?;
            if vector::lex_cmp(&projected, &negated) == Ordering::Less {
                projected = negated;
            }
        }

        if emitted.insert(projected.clone()) {
            let target = if support_free { &mut free } else { &mut homogeneous };
            target.append_row(projected);
        }
    }

    inhomogeneous.sort_rows();
    homogeneous.sort_rows();
    free.sort_rows();

    Ok(SolutionBasis { inhomogeneous, homogeneous, free })
}
