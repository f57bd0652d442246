//! Integer solutions and generating sets of linear Diophantine systems.
//!
//! Given a system of linear equations, inequalities and congruences together
//! with per variable sign and bound constraints, this crate computes a finite
//! basis from which every integer solution can be reconstructed: a set of
//! minimal inhomogeneous solutions, generators of the homogeneous monoid
//! (Hilbert or Graver bases, depending on the signs), and a basis of the
//! sublattice living on the free variables. The solution sets themselves are
//! usually astronomically large, so they are never materialized.
//!
//! The pipeline is: [`system::LinearSystem::homogenize`] folds inequalities
//! and the right-hand side into a homogeneous equality system,
//! [`lattice::Lattice::kernel_of`] extracts an integral kernel basis, and
//! [`algorithm::Algorithm`] grows that basis one coordinate at a time into a
//! pool that respects every bound and is minimal under sign compatible
//! domination. [`extract::extract`] classifies and projects the terminal
//! pool into the emitted sets.
//!
//! Long runs can checkpoint through an injected [`controller::Controller`]
//! and continue later with [`solve::resume_solve`]. All arithmetic is
//! generic over [`rings::Int`]; the fixed width types abort the run with
//! [`error::Error::Overflow`] instead of ever wrapping.

pub mod algorithm;
pub mod checkpoint;
pub mod controller;
pub mod error;
pub mod extract;
pub mod io;
pub mod lattice;
pub mod matrix;
pub mod options;
pub mod rings;
pub mod solve;
pub mod system;
pub mod vector;

pub use algorithm::Algorithm;
pub use controller::{BackupController, Controller, NopController};
pub use error::{Error, Result};
pub use extract::SolutionBasis;
pub use lattice::Lattice;
pub use matrix::VectorArray;
pub use options::{Options, Variant};
pub use rings::{Int, Precision};
pub use solve::{resume_solve, solve_system};
pub use system::{LinearSystem, Relation, Sign, VariableProperty};
