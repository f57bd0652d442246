//! Integer kernel lattices with per column metadata.
//!
//! A [`Lattice`] is the working object of the completion engine: the rows of
//! [`Lattice::vectors`] are the current generators and
//! [`Lattice::properties`] describes every column. Column swaps always move
//! both in lock-step, so a property keeps describing the same variable while
//! the engine permutes columns into its lift order.

use crate::error::Result;
use crate::matrix::{self, VectorArray};
use crate::rings::Int;
use crate::system::VariableProperty;

#[derive(Clone, Debug)]
pub struct Lattice<I> {
    pub vectors: VectorArray<I>,
    pub properties: Vec<VariableProperty<I>>,
}

impl<I: Int> Lattice<I> {
    pub fn new(vectors: VectorArray<I>, properties: Vec<VariableProperty<I>>) -> Self {
        assert_eq!(
            vectors.num_cols(),
            properties.len(),
            "One property per lattice column."
        );
        Self { vectors, properties }
    }

    /// The kernel lattice of a homogeneous equality system. The properties
    /// of the system's columns carry over unchanged.
    pub fn kernel_of(
        matrix: &VectorArray<I>,
        properties: Vec<VariableProperty<I>>,
    ) -> Result<Self> {
        let basis = matrix::kernel_basis(matrix)?;
        log::debug!(
            "kernel basis has {} generators in dimension {}",
            basis.num_rows(),
            basis.num_cols()
        );
        Ok(Self::new(basis, properties))
    }

    pub fn num_variables(&self) -> usize {
        self.properties.len()
    }

    pub fn swap_columns(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        self.vectors.swap_columns(i, j);
        self.properties.swap(i, j);
    }

    /// Removes every row whose entry at `col` violates the column bound.
    /// Returns how many rows were removed.
    pub fn filter_bounds(&mut self, col: usize) -> usize {
        let property = self.properties[col].clone();
        let before = self.vectors.num_rows();
        self.vectors.retain_rows(|row| property.check(&row[col]));
        before - self.vectors.num_rows()
    }

    /// Restores result columns to ascending original order. Internal slack
    /// and indicator columns move behind them; their relative order carries
    /// no meaning, result extraction addresses them by id.
    pub fn sort_columns(&mut self) {
        let mut order: Vec<usize> = (0..self.properties.len()).collect();
        order.sort_by_key(|&i| {
            let column = self.properties[i].column;
            if column >= 0 { (0, column) } else { (1, i as i32) }
        });
        self.vectors.permute_columns(&order);
        self.properties = order
            .iter()
            .map(|&i| self.properties[i].clone())
            .collect();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::system::{Sign, VariableProperty};

    fn lattice_2x3() -> Lattice<i64> {
        let vectors = VectorArray::from_rows(3, vec![vec![1, -2, 3], vec![0, 4, -5]]);
        let properties = vec![
            VariableProperty::from_sign(0, Sign::NonNegative),
            VariableProperty::from_sign(1, Sign::Free),
            VariableProperty::from_sign(2, Sign::TwoSided),
        ];
        Lattice::new(vectors, properties)
    }

    #[test]
    fn swap_moves_properties_with_columns() {
        let mut l = lattice_2x3();
        l.swap_columns(0, 2);
        assert_eq!(l.vectors.row(0), &[3, -2, 1]);
        assert_eq!(l.properties[0].column, 2);
        assert_eq!(l.properties[2].column, 0);
    }

    #[test]
    fn sort_columns_restores_original_order() {
        let mut l = lattice_2x3();
        l.swap_columns(0, 2);
        l.swap_columns(1, 2);
        l.sort_columns();
        assert_eq!(
            l.properties.iter().map(|p| p.column).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(l.vectors.row(0), &[1, -2, 3]);
    }

    #[test]
    fn bound_filter_drops_violating_rows() {
        let mut l = lattice_2x3();
        // column 0 is non-negative, both rows pass
        assert_eq!(l.filter_bounds(0), 0);
        l.vectors.append_row(vec![-1, 0, 0]);
        assert_eq!(l.filter_bounds(0), 1);
        assert_eq!(l.vectors.num_rows(), 2);
    }

    #[test]
    fn kernel_carries_properties() {
        let matrix = VectorArray::from_rows(3, vec![vec![1i64, 1, 1]]);
        let properties = (0..3)
            .map(|i| VariableProperty::from_sign(i, Sign::NonNegative))
            .collect();
        let l = Lattice::kernel_of(&matrix, properties).unwrap();
        assert_eq!(l.num_variables(), 3);
        assert_eq!(l.vectors.num_rows(), 2);
    }
}
