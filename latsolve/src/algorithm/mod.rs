//! The incremental norm graded completion engine.
//!
//! The engine owns one [`Lattice`] and finalizes its coordinates one at a
//! time. For the coordinate being worked on it keeps the pool partitioned
//! into norm classes over the already finalized prefix, each class indexed by
//! a [`ValueTree`]. Pairs of vectors with opposite signs at the current
//! coordinate and no sign conflict on the finalized prefix are summed in
//! order of increasing combined norm; a sum survives only if it is non-zero,
//! within every finalized bound and not dominated by a pool vector. Once the
//! combined norm passes twice the largest inserted norm no further sum can
//! survive, the coordinate's own bound is enforced on the pool and the next
//! coordinate starts.
//!
//! The state machine is fully described by the tuple
//! `(current_variable, sum_norm, first_norm)` together with the symmetric
//! flag and the lattice itself, which is what checkpoints serialize.

mod value_tree;

use std::collections::BTreeMap;

use crate::controller::{CheckpointView, Controller};
use crate::error::Result;
use crate::lattice::Lattice;
use crate::rings::Int;
use crate::vector;

use value_tree::ValueTree;

struct NormClass<I> {
    members: Vec<usize>,
    tree: ValueTree<I>,
}

impl<I: Int> NormClass<I> {
    fn new() -> Self {
        Self { members: Vec::new(), tree: ValueTree::new() }
    }
}

pub struct Algorithm<I: Int> {
    lattice: Lattice<I>,
    current_variable: usize,
    sum_norm: I,
    first_norm: I,
    /// While set, every inserted vector is accompanied by its negative. The
    /// flag drops the first time a coordinate with an asymmetric bound
    /// interval is finalized and never comes back.
    symmetric: bool,
    /// Largest class norm seen for the current coordinate.
    max_norm: I,
    /// Whether the current coordinate has been chosen, lifted and indexed.
    entered: bool,
    classes: BTreeMap<I, NormClass<I>>,
}

impl<I: Int> Algorithm<I> {
    /// A fresh run. The pool starts as the kernel basis together with the
    /// negative of every generator.
    pub fn new(mut lattice: Lattice<I>) -> Result<Self> {
        for i in 0..lattice.vectors.num_rows() {
            let negative = vector::try_neg(lattice.vectors.row(i))?;
            lattice.vectors.append_row(negative);
        }
        Ok(Self {
            lattice,
            current_variable: 0,
            sum_norm: I::zero(),
            first_norm: I::zero(),
            symmetric: true,
            max_norm: I::zero(),
            entered: false,
            classes: BTreeMap::new(),
        })
    }

    /// Rebuilds a mid-run instance from checkpointed state. The lattice is
    /// stored with its columns already permuted, so the stored coordinate is
    /// re-entered without choosing or lifting again.
    pub fn resume(
        lattice: Lattice<I>,
        current_variable: usize,
        sum_norm: I,
        first_norm: I,
        symmetric: bool,
    ) -> Result<Self> {
        let mut algorithm = Self {
            lattice,
            current_variable,
            sum_norm,
            first_norm,
            symmetric,
            max_norm: I::zero(),
            entered: false,
            classes: BTreeMap::new(),
        };
        if algorithm.current_variable < algorithm.lattice.num_variables() {
            algorithm.rebuild_classes()?;
            algorithm.entered = true;
        }
        Ok(algorithm)
    }

    pub fn lattice(&self) -> &Lattice<I> {
        &self.lattice
    }

    pub fn into_lattice(self) -> Lattice<I> {
        self.lattice
    }

    /// Runs the state machine to completion.
    pub fn run<C: Controller<I>>(&mut self, controller: &mut C) -> Result<()> {
        let total = self.lattice.num_variables();
        while self.current_variable < total {
            if !self.entered && !self.enter_variable()? {
                // a free coordinate, nothing to complete
                continue;
            }
            self.complete_current(controller)?;
        }
        self.lattice.sort_columns();
        log::info!(
            "completion finished with {} generators",
            self.lattice.vectors.num_rows()
        );
        Ok(())
    }

    /// Chooses, swaps in and prepares the next coordinate. Returns false for
    /// a free coordinate, which is skipped entirely.
    fn enter_variable(&mut self) -> Result<bool> {
        let current = self.current_variable;
        let choice = self.choose_variable()?;
        self.lattice.swap_columns(current, choice);
        if self.lattice.properties[current].free {
            self.current_variable += 1;
            return Ok(false);
        }
        log::debug!(
            "variable {} of {}, {} vectors in the pool",
            current + 1,
            self.lattice.num_variables(),
            self.lattice.vectors.num_rows()
        );
        self.lift()?;
        self.rebuild_classes()?;
        self.entered = true;
        Ok(true)
    }

    /// The most constrained remaining coordinate: bounded before free,
    /// fewest infinite directions, smallest finite range, smallest column
    /// gcd, fewest non-zero entries.
    fn choose_variable(&self) -> Result<usize> {
        let mut best = self.current_variable;
        let mut best_key = self.variable_key(best)?;
        for candidate in self.current_variable + 1..self.lattice.num_variables() {
            let key = self.variable_key(candidate)?;
            if key < best_key {
                best = candidate;
                best_key = key;
            }
        }
        Ok(best)
    }

    fn variable_key(&self, col: usize) -> Result<(bool, usize, Option<I>, I, usize)> {
        let property = &self.lattice.properties[col];
        // columns with the same number of infinite directions either all
        // have a finite range or none does, so the `Option` ordering is
        // never the deciding comparison
        let range = property.range()?;
        let gcd = self.lattice.vectors.column_gcd(col)?;
        let nonzeros = self.lattice.vectors.num_rows() - self.lattice.vectors.column_zeros(col);
        Ok((
            property.free,
            property.infinite_directions(),
            range,
            gcd,
            nonzeros,
        ))
    }

    /// Reduces the current column by the vectors supported only on it, the
    /// rows that are zero on every finalized coordinate but not at the
    /// current one. Each such reducer shrinks every compatible-sign entry of
    /// larger or equal magnitude by an integer combination.
    fn lift(&mut self) -> Result<()> {
        let current = self.current_variable;
        let mut reducers = Vec::new();
        for i in 0..self.lattice.vectors.num_rows() {
            let row = self.lattice.vectors.row(i);
            if vector::norm(row, current)?.is_zero() && !row[current].is_zero() {
                reducers.push(i);
            }
        }

        loop {
            let mut changed = false;
            for &g in &reducers {
                let pivot = self.lattice.vectors[(g, current)].clone();
                if pivot.is_zero() {
                    continue;
                }
                for v in 0..self.lattice.vectors.num_rows() {
                    if v == g {
                        continue;
                    }
                    let value = self.lattice.vectors[(v, current)].clone();
                    if value.is_zero() || value.is_positive() != pivot.is_positive() {
                        continue;
                    }
                    // with equal signs the truncating quotient is the number
                    // of times the pivot fits, zero when the entry is smaller
                    let q = value.try_div(&pivot)?;
                    if q.is_zero() {
                        continue;
                    }
                    let m = q.try_neg()?;
                    self.lattice.vectors.row_multiply_add(v, g, &m)?;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        self.lattice.vectors.remove_zero_rows();
        Ok(())
    }

    /// Partitions the pool into norm classes over the finalized prefix and
    /// builds their search trees. Vectors that are zero on the prefix and at
    /// the current coordinate cannot contribute and stay out.
    fn rebuild_classes(&mut self) -> Result<()> {
        let current = self.current_variable;
        self.classes.clear();
        self.max_norm = I::zero();
        for index in 0..self.lattice.vectors.num_rows() {
            let row = self.lattice.vectors.row(index);
            let norm = vector::norm(row, current)?;
            if norm.is_zero() && row[current].is_zero() {
                continue;
            }
            if norm > self.max_norm {
                self.max_norm = norm.clone();
            }
            let class = self.classes.entry(norm).or_insert_with(NormClass::new);
            class.members.push(index);
            class.tree.insert(&self.lattice.vectors, index, current);
        }
        Ok(())
    }

    /// Appends a fresh vector to the pool and indexes it under its class.
    fn insert_vector(&mut self, w: Vec<I>, norm: I) {
        let current = self.current_variable;
        if norm > self.max_norm {
            self.max_norm = norm.clone();
        }
        let index = self.lattice.vectors.append_row(w);
        let class = self.classes.entry(norm).or_insert_with(NormClass::new);
        class.members.push(index);
        class.tree.insert(&self.lattice.vectors, index, current);
    }

    /// The norm sum loop for the entered coordinate, then its finalization.
    fn complete_current<C: Controller<I>>(&mut self, controller: &mut C) -> Result<()> {
        loop {
            // Once the combined norm exceeds twice the largest inserted
            // norm, both halves of any further pair would have to come from
            // an empty class.
            if self.sum_norm > self.max_norm.try_add(&self.max_norm)? {
                break;
            }
            while self.first_norm.try_add(&self.first_norm)? <= self.sum_norm {
                self.checkpoint_tick(controller)?;
                let first = self.first_norm.clone();
                let second = self.sum_norm.try_sub(&first)?;
                self.pair_round(&first, &second)?;
                self.first_norm = self.first_norm.try_add(&I::one())?;
            }
            // Sums of this combined norm land back in the class of the norm
            // itself, where the zero prefix reducers can still combine with
            // them. Repeat that round until the grade is closed.
            let sum = self.sum_norm.clone();
            while self.pair_round(&I::zero(), &sum)? {}
            self.sum_norm = self.sum_norm.try_add(&I::one())?;
            self.first_norm = I::zero();
        }
        self.finish_variable()
    }

    /// Enumerates the sign compatible pairs of two norm classes and tries
    /// their sums. Returns whether anything was inserted.
    fn pair_round(&mut self, first: &I, second: &I) -> Result<bool> {
        if !self.classes.contains_key(first) || !self.classes.contains_key(second) {
            return Ok(false);
        }
        let current = self.current_variable;
        let same_class = first == second;
        // The round may insert into the classes it reads, so it works off a
        // snapshot of the first class and collects partners per vector.
        let first_members = self.classes[first].members.clone();
        let mut inserted = false;
        let mut partners = Vec::new();
        for u_index in first_members {
            let u = self.lattice.vectors.row(u_index).to_vec();
            partners.clear();
            self.classes[second]
                .tree
                .partners(&self.lattice.vectors, &u, current, &mut partners);
            for &v_index in &partners {
                if same_class && v_index <= u_index {
                    // the sum is commutative, enumerate unordered pairs once
                    continue;
                }
                if self.try_candidate(&u, v_index)? {
                    inserted = true;
                }
            }
        }
        Ok(inserted)
    }

    /// Forms the sum of a pair, tests it, and inserts it if it survives.
    fn try_candidate(&mut self, u: &[I], v_index: usize) -> Result<bool> {
        let current = self.current_variable;
        let w = vector::try_add(u, self.lattice.vectors.row(v_index))?;
        if vector::is_zero(&w) {
            return Ok(false);
        }
        for i in 0..current {
            if !self.lattice.properties[i].check(&w[i]) {
                return Ok(false);
            }
        }
        let norm = vector::norm(&w, current)?;
        if self.reducible(&w, &norm) {
            return Ok(false);
        }
        let negative = if self.symmetric {
            // the pool stays closed under negation, so the mirror image is
            // irreducible as well
            Some(vector::try_neg(&w)?)
        } else {
            None
        };
        self.insert_vector(w, norm.clone());
        if let Some(negative) = negative {
            self.insert_vector(negative, norm);
        }
        Ok(true)
    }

    /// Walks every class of norm up to `norm` looking for a reducer of `w`.
    fn reducible(&self, w: &[I], norm: &I) -> bool {
        let current = self.current_variable;
        self.classes
            .range(..=norm)
            .any(|(_, class)| class.tree.has_reducer(&self.lattice.vectors, w, current))
    }

    /// Enforces the bound of the completed coordinate and advances.
    fn finish_variable(&mut self) -> Result<()> {
        let current = self.current_variable;
        self.classes.clear();
        if !self.lattice.properties[current].symmetric() {
            self.symmetric = false;
        }
        let removed = self.lattice.filter_bounds(current);
        log::debug!(
            "variable {} finished, its bound removed {} vectors, {} remain",
            current + 1,
            removed,
            self.lattice.vectors.num_rows()
        );
        self.current_variable += 1;
        self.sum_norm = I::zero();
        self.first_norm = I::zero();
        self.entered = false;
        Ok(())
    }

    fn checkpoint_tick<C: Controller<I>>(&mut self, controller: &mut C) -> Result<()> {
        controller.on_progress(
            self.current_variable,
            &self.sum_norm,
            self.lattice.vectors.num_rows(),
        );
        if controller.backup_due() {
            controller.write_backup(CheckpointView {
                current_variable: self.current_variable,
                sum_norm: &self.sum_norm,
                first_norm: &self.first_norm,
                symmetric: self.symmetric,
                lattice: &self.lattice,
            })?;
        }
        Ok(())
    }
}
