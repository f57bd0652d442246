//! Sign pattern search trees over pool indices.
//!
//! Each norm class of the completion engine keeps one [`ValueTree`] over the
//! indices of its vectors. A node either is a terminal bucket or has split on
//! one coordinate, with a zero branch and positive/negative branches keyed by
//! the exact value. Queries descend only into branches compatible with the
//! probe vector, which prunes whole subtrees and keeps both pair enumeration
//! and the reducibility test well below a scan of the full pool.
//!
//! Trees never store vectors, only indices into the pool, so discarding a
//! tree never touches vector lifetimes.

use crate::matrix::VectorArray;
use crate::rings::Int;
use crate::vector;

/// Buckets split on their next coordinate once they outgrow this.
const MAX_BUCKET: usize = 16;

#[derive(Clone, Debug)]
pub struct ValueTree<I> {
    root: Node<I>,
}

#[derive(Clone, Debug)]
enum Node<I> {
    /// Terminal bucket; `level` is the first coordinate the path above has
    /// not pinned down.
    Bucket { level: usize, members: Vec<usize> },
    /// Split on the value at coordinate `level`.
    Split {
        level: usize,
        zero: Option<Box<Node<I>>>,
        positive: Vec<(I, Node<I>)>,
        negative: Vec<(I, Node<I>)>,
    },
}

impl<I: Int> ValueTree<I> {
    pub fn new() -> Self {
        Self {
            root: Node::Bucket { level: 0, members: Vec::new() },
        }
    }

    /// Inserts a pool vector by index. `last` is the deepest coordinate a
    /// split may key on (the current variable of the engine).
    pub fn insert(&mut self, pool: &VectorArray<I>, index: usize, last: usize) {
        Self::insert_node(&mut self.root, pool, index, last);
    }

    fn insert_node(node: &mut Node<I>, pool: &VectorArray<I>, index: usize, last: usize) {
        match node {
            Node::Bucket { level, members } => {
                members.push(index);
                if members.len() > MAX_BUCKET && *level <= last {
                    // Split the bucket and redistribute its members.
                    let level = *level;
                    let members = std::mem::take(members);
                    let mut split = Node::Split {
                        level,
                        zero: None,
                        positive: Vec::new(),
                        negative: Vec::new(),
                    };
                    for member in members {
                        Self::insert_node(&mut split, pool, member, last);
                    }
                    *node = split;
                }
            }
            Node::Split { level, zero, positive, negative } => {
                let value = &pool[(index, *level)];
                let next = *level + 1;
                let child = if value.is_zero() {
                    zero.get_or_insert_with(|| {
                        Box::new(Node::Bucket { level: next, members: Vec::new() })
                    })
                    .as_mut()
                } else {
                    let branches = if value.is_positive() { positive } else { negative };
                    match branches.iter().position(|(v, _)| v == value) {
                        Some(i) => &mut branches[i].1,
                        None => {
                            branches.push((
                                value.clone(),
                                Node::Bucket { level: next, members: Vec::new() },
                            ));
                            // Just pushed, the branch exists.
                            &mut branches.last_mut().unwrap().1
                        }
                    }
                };
                Self::insert_node(child, pool, index, last);
            }
        }
    }

    /// Collects the members that can pair with `u`: opposite sign at
    /// `current` and no sign conflict on any earlier coordinate.
    pub fn partners(
        &self,
        pool: &VectorArray<I>,
        u: &[I],
        current: usize,
        out: &mut Vec<usize>,
    ) {
        Self::partners_node(&self.root, pool, u, current, out);
    }

    fn partners_node(
        node: &Node<I>,
        pool: &VectorArray<I>,
        u: &[I],
        current: usize,
        out: &mut Vec<usize>,
    ) {
        match node {
            Node::Bucket { level, members } => {
                for &member in members {
                    if Self::pair_tail(u, pool.row(member), *level, current) {
                        out.push(member);
                    }
                }
            }
            Node::Split { level, zero, positive, negative } => {
                if *level == current {
                    // The pair has to cancel at the current coordinate.
                    let branches = if u[current].is_positive() {
                        negative
                    } else if u[current].is_negative() {
                        positive
                    } else {
                        return;
                    };
                    for (_, child) in branches {
                        Self::partners_node(child, pool, u, current, out);
                    }
                } else {
                    if let Some(child) = zero {
                        Self::partners_node(child, pool, u, current, out);
                    }
                    if !u[*level].is_negative() {
                        for (_, child) in positive {
                            Self::partners_node(child, pool, u, current, out);
                        }
                    }
                    if !u[*level].is_positive() {
                        for (_, child) in negative {
                            Self::partners_node(child, pool, u, current, out);
                        }
                    }
                }
            }
        }
    }

    /// Checks the conditions the path above a bucket has not pinned down.
    fn pair_tail(u: &[I], v: &[I], from: usize, current: usize) -> bool {
        if from > current {
            return true;
        }
        vector::signs_compatible(u, v, from, current)
            && vector::opposite_signs(&u[current], &v[current])
    }

    /// Is some member of this tree a reducer for `w`, sign compatible and
    /// nowhere larger in magnitude on the coordinates up to and including
    /// `current`? Exits on the first hit.
    pub fn has_reducer(&self, pool: &VectorArray<I>, w: &[I], current: usize) -> bool {
        Self::reducer_node(&self.root, pool, w, current)
    }

    fn reducer_node(node: &Node<I>, pool: &VectorArray<I>, w: &[I], current: usize) -> bool {
        match node {
            Node::Bucket { level, members } => members.iter().any(|&member| {
                *level > current
                    || vector::dominates(pool.row(member), w, *level, current + 1)
            }),
            Node::Split { level, zero, positive, negative } => {
                if let Some(child) = zero {
                    if Self::reducer_node(child, pool, w, current) {
                        return true;
                    }
                }
                let probe = &w[*level];
                if probe.is_positive() {
                    for (value, child) in positive {
                        if value <= probe && Self::reducer_node(child, pool, w, current) {
                            return true;
                        }
                    }
                } else if probe.is_negative() {
                    for (value, child) in negative {
                        if value >= probe && Self::reducer_node(child, pool, w, current) {
                            return true;
                        }
                    }
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_pool(rng: &mut StdRng, rows: usize, cols: usize) -> VectorArray<i64> {
        let mut pool = VectorArray::new(cols);
        for _ in 0..rows {
            pool.append_row((0..cols).map(|_| rng.random_range(-3..=3)).collect());
        }
        pool
    }

    fn tree_over(pool: &VectorArray<i64>, current: usize) -> ValueTree<i64> {
        let mut tree = ValueTree::new();
        for i in 0..pool.num_rows() {
            tree.insert(pool, i, current);
        }
        tree
    }

    #[test]
    fn partners_match_brute_force() {
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..20 {
            let current = 2;
            let pool = random_pool(&mut rng, 80, 4);
            let tree = tree_over(&pool, current);
            for u_index in 0..pool.num_rows() {
                let u = pool.row(u_index).to_vec();
                let mut found = Vec::new();
                tree.partners(&pool, &u, current, &mut found);
                found.sort_unstable();

                let expected: Vec<usize> = (0..pool.num_rows())
                    .filter(|&v| {
                        vector::signs_compatible(&u, pool.row(v), 0, current)
                            && vector::opposite_signs(&u[current], &pool.row(v)[current])
                    })
                    .collect();
                assert_eq!(found, expected, "partners of row {u_index}");
            }
        }
    }

    #[test]
    fn reducer_query_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            let current = 3;
            let pool = random_pool(&mut rng, 60, 5);
            let tree = tree_over(&pool, current);
            for _ in 0..40 {
                let w: Vec<i64> = (0..5).map(|_| rng.random_range(-4..=4)).collect();
                let expected = (0..pool.num_rows())
                    .any(|r| vector::dominates(pool.row(r), &w, 0, current + 1));
                assert_eq!(
                    tree.has_reducer(&pool, &w, current),
                    expected,
                    "reducer query for {w:?}"
                );
            }
        }
    }

    #[test]
    fn zero_probe_only_matches_zero_entries() {
        let mut pool = VectorArray::new(2);
        pool.append_row(vec![1, 0]);
        pool.append_row(vec![0, 1]);
        let tree = tree_over(&pool, 1);
        // a reducer for (0, 2) must be zero in the first coordinate
        assert!(tree.has_reducer(&pool, &[0, 2], 1));
        assert!(!tree.has_reducer(&pool, &[0, -2], 1));
    }
}
