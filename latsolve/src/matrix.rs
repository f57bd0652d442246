//! A growable, column addressable collection of equal length rows.
//!
//! [`VectorArray`] plays two roles. It is the matrix type used while systems
//! are assembled and reduced, and it is the working pool of generators the
//! completion engine appends to and filters. Rows are owned by value and
//! copies are always deep, there is no aliasing between arrays.

use std::ops::{Index, IndexMut};

use crate::error::Result;
use crate::rings::Int;
use crate::vector;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VectorArray<I> {
    width: usize,
    rows: Vec<Vec<I>>,
}

impl<I: Int> VectorArray<I> {
    /// An empty array of the given width.
    pub fn new(width: usize) -> Self {
        Self { width, rows: Vec::new() }
    }

    /// A zero matrix.
    pub fn zero(rows: usize, cols: usize) -> Self {
        Self {
            width: cols,
            rows: (0..rows).map(|_| vec![I::zero(); cols]).collect(),
        }
    }

    /// The identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zero(n, n);
        for i in 0..n {
            m[(i, i)] = I::one();
        }
        m
    }

    /// Builds an array from rows, which must all have the given width.
    pub fn from_rows(width: usize, rows: Vec<Vec<I>>) -> Self {
        for row in &rows {
            assert_eq!(row.len(), width, "All rows must have the declared width.");
        }
        Self { width, rows }
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_cols(&self) -> usize {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, r: usize) -> &[I] {
        &self.rows[r]
    }

    pub fn row_mut(&mut self, r: usize) -> &mut [I] {
        &mut self.rows[r]
    }

    /// Iterator over the rows as slices.
    pub fn rows(&self) -> impl Iterator<Item = &[I]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Appends a row and returns its index.
    pub fn append_row(&mut self, row: Vec<I>) -> usize {
        assert_eq!(row.len(), self.width, "All rows must have the declared width.");
        self.rows.push(row);
        self.rows.len() - 1
    }

    /// Keeps only the rows the predicate accepts.
    pub fn retain_rows(&mut self, mut f: impl FnMut(&[I]) -> bool) {
        self.rows.retain(|r| f(r));
    }

    pub fn swap_rows(&mut self, i: usize, j: usize) {
        self.rows.swap(i, j);
    }

    pub fn swap_columns(&mut self, i: usize, j: usize) {
        for row in &mut self.rows {
            row.swap(i, j);
        }
    }

    /// Reorders the columns of every row; `order[i]` is the old index of the
    /// column that ends up at position `i`.
    pub fn permute_columns(&mut self, order: &[usize]) {
        assert_eq!(order.len(), self.width);
        for row in &mut self.rows {
            let old = std::mem::take(row);
            *row = order.iter().map(|&i| old[i].clone()).collect();
        }
    }

    /// Negates a row in place.
    pub fn negate_row(&mut self, r: usize) -> Result<()> {
        for e in &mut self.rows[r] {
            *e = e.try_neg()?;
        }
        Ok(())
    }

    /// Adds `m` times row `r` to row `k`.
    pub fn row_multiply_add(&mut self, k: usize, r: usize, m: &I) -> Result<()> {
        assert_ne!(k, r, "Tried to combine a row with itself.");
        let (target, source) = if k < r {
            let (a, b) = self.rows.split_at_mut(r);
            (&mut a[k], &b[0][..])
        } else {
            let (a, b) = self.rows.split_at_mut(k);
            (&mut b[0], &a[r][..])
        };
        for (t, s) in target.iter_mut().zip(source) {
            *t = t.try_add(&m.try_mul(s)?)?;
        }
        Ok(())
    }

    /// Removes rows that are entirely zero.
    pub fn remove_zero_rows(&mut self) {
        self.rows.retain(|r| !vector::is_zero(r));
    }

    /// Sorts the rows lexicographically. Used to make emitted sets
    /// deterministic.
    pub fn sort_rows(&mut self) {
        self.rows.sort_by(|a, b| vector::lex_cmp(a, b));
    }

    pub fn transposed(&self) -> VectorArray<I> {
        let mut t = VectorArray::zero(self.width, self.rows.len());
        for (i, row) in self.rows.iter().enumerate() {
            for (j, e) in row.iter().enumerate() {
                t[(j, i)] = e.clone();
            }
        }
        t
    }

    /// Gcd of the absolute values of the entries of a column, zero for an
    /// all zero column.
    pub fn column_gcd(&self, c: usize) -> Result<I> {
        let mut g = I::zero();
        for row in &self.rows {
            g = g.try_gcd(&row[c])?;
        }
        Ok(g)
    }

    /// Number of zero entries in a column.
    pub fn column_zeros(&self, c: usize) -> usize {
        self.rows.iter().filter(|r| r[c].is_zero()).count()
    }
}

impl<I: Int> Index<(usize, usize)> for VectorArray<I> {
    type Output = I;

    fn index(&self, (r, c): (usize, usize)) -> &I {
        &self.rows[r][c]
    }
}

impl<I: Int> IndexMut<(usize, usize)> for VectorArray<I> {
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut I {
        &mut self.rows[r][c]
    }
}

/// Computes the (row-style) Hermite normal form of a matrix in place and
/// returns the transformation matrix.
///
/// The pivot of each step is the remaining entry of smallest absolute value
/// in its column, every other entry in the column is eliminated by integer
/// row combinations, and the same operations are mirrored into an identity
/// seeded transform so that `u * original = reduced` holds at all times.
pub fn hermite_normal_form<I: Int>(a: &mut VectorArray<I>) -> Result<VectorArray<I>> {
    // The transformation matrix.
    let mut u = VectorArray::identity(a.num_rows());

    let mut r = 0;
    let mut c = 0;
    while r < a.num_rows() && c < a.num_cols() {
        // Choose a pivot in the column: the non-zero entry of smallest
        // magnitude below the already finished rows.
        let mut pivot: Option<(usize, I)> = None;
        for i in r..a.num_rows() {
            if a[(i, c)].is_zero() {
                continue;
            }
            let m = a[(i, c)].try_abs()?;
            if pivot.as_ref().is_none_or(|(_, best)| m < *best) {
                pivot = Some((i, m));
            }
        }

        let Some((pivot, _)) = pivot else {
            // If we didn't find a pivot then the column is 0.
            // Continue with the next one.
            c += 1;
            continue;
        };

        // Move the pivot to the beginning.
        a.swap_rows(r, pivot);
        u.swap_rows(r, pivot);

        // Try to eliminate every other entry in the column.
        // This might not work instantly.
        // If there remain non-zero entries in this column,
        // then we will go over this column again.
        for k in r + 1..a.num_rows() {
            if a[(k, c)].is_zero() {
                continue;
            }
            let m = a[(k, c)].try_div_euclid(&a[(r, c)])?.try_neg()?;
            a.row_multiply_add(k, r, &m)?;
            u.row_multiply_add(k, r, &m)?;
        }

        // If there is any non-zero element then we need to continue in the
        // same column.
        if (r + 1..a.num_rows()).any(|k| !a[(k, c)].is_zero()) {
            continue;
        }

        // Flip sign if necessary.
        if a[(r, c)].is_negative() {
            a.negate_row(r)?;
            u.negate_row(r)?;
        }

        // Reduce the elements above the pivot. The Hermite normal form
        // requires the entries above the pivot to be non-negative and
        // smaller than it.
        if !a[(r, c)].is_zero() {
            for k in 0..r {
                let m = a[(k, c)].try_div_euclid(&a[(r, c)])?.try_neg()?;
                if !m.is_zero() {
                    a.row_multiply_add(k, r, &m)?;
                    u.row_multiply_add(k, r, &m)?;
                }
            }
        }

        // Continue with the bottom right part of the matrix that remains.
        c += 1;
        r += 1;
    }

    Ok(u)
}

/// An integral basis of the kernel `{x : A x = 0}`, one generator per row.
///
/// The reduction runs on the transpose with a carried transform: a row of the
/// transform whose image row became zero is a certified integer combination
/// in kernel of `A`.
pub fn kernel_basis<I: Int>(a: &VectorArray<I>) -> Result<VectorArray<I>> {
    let mut m = a.transposed();
    let u = hermite_normal_form(&mut m)?;
    let mut basis = VectorArray::new(a.num_cols());
    for i in 0..m.num_rows() {
        if vector::is_zero(m.row(i)) {
            basis.append_row(u.row(i).to_vec());
        }
    }
    Ok(basis)
}

#[cfg(test)]
mod test {
    use super::*;

    fn from_i64(rows: &[&[i64]]) -> VectorArray<i64> {
        let width = rows.first().map_or(0, |r| r.len());
        VectorArray::from_rows(width, rows.iter().map(|r| r.to_vec()).collect())
    }

    #[test]
    fn row_and_column_operations() {
        let mut m = from_i64(&[&[1, 2, 3], &[4, 5, 6]]);
        m.swap_columns(0, 2);
        assert_eq!(m.row(0), &[3, 2, 1]);
        m.row_multiply_add(1, 0, &-2).unwrap();
        assert_eq!(m.row(1), &[0, 1, 4]);
        m.negate_row(0).unwrap();
        assert_eq!(m.row(0), &[-3, -2, -1]);
    }

    #[test]
    fn column_statistics() {
        let m = from_i64(&[&[4, 0], &[-6, 0], &[0, 0]]);
        assert_eq!(m.column_gcd(0).unwrap(), 2);
        assert_eq!(m.column_gcd(1).unwrap(), 0);
        assert_eq!(m.column_zeros(0), 1);
        assert_eq!(m.column_zeros(1), 3);
    }

    #[test]
    fn permute_columns_by_order() {
        let mut m = from_i64(&[&[10, 20, 30]]);
        m.permute_columns(&[2, 0, 1]);
        assert_eq!(m.row(0), &[30, 10, 20]);
    }

    #[test]
    fn hermite_form_of_small_matrix() {
        let mut a = from_i64(&[&[2, 4, 4], &[-6, 6, 12], &[10, 4, 16]]);
        let original = a.clone();
        let u = hermite_normal_form(&mut a).unwrap();

        // u * original = reduced
        for i in 0..a.num_rows() {
            for j in 0..a.num_cols() {
                let mut acc = 0i64;
                for k in 0..original.num_rows() {
                    acc += u[(i, k)] * original[(k, j)];
                }
                assert_eq!(acc, a[(i, j)]);
            }
        }

        // row echelon with non-negative pivots
        let mut last_pivot = None;
        for i in 0..a.num_rows() {
            let pivot = (0..a.num_cols()).find(|&j| a[(i, j)] != 0);
            if let Some(p) = pivot {
                assert!(a[(i, p)] > 0);
                if let Some(last) = last_pivot {
                    assert!(p > last);
                }
                last_pivot = Some(p);
            }
        }
    }

    #[test]
    fn kernel_rows_are_in_the_kernel() {
        let a = from_i64(&[&[1, 1, 1, -1], &[0, 2, -1, 0]]);
        let basis = kernel_basis(&a).unwrap();
        assert_eq!(basis.num_rows(), 2);
        for row in basis.rows() {
            for i in 0..a.num_rows() {
                let dot: i64 = (0..a.num_cols()).map(|j| a[(i, j)] * row[j]).sum();
                assert_eq!(dot, 0, "kernel candidate {row:?} fails row {i}");
            }
        }
    }

    #[test]
    fn kernel_of_single_equation() {
        let a = from_i64(&[&[1, 1, 1]]);
        let basis = kernel_basis(&a).unwrap();
        assert_eq!(basis.num_rows(), 2);
        for row in basis.rows() {
            assert_eq!(row[0] + row[1] + row[2], 0);
        }
    }
}
