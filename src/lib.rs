//! A PQ-tree[^1] compactly represents the set of permutations of a ground
//! set that satisfy a collection of consecutivity constraints: each
//! constraint is a subset of the ground set whose values must appear next
//! to each other. PQ-trees drive consecutive-ones testing for matrices,
//! interval-graph recognition, graph planarity testing and similar
//! combinatorial pipelines.
//!
//! The tree has three kinds of nodes: P-nodes, whose children may be
//! permuted arbitrarily, Q-nodes, whose children may only be reversed as
//! a whole, and leaves carrying the ground-set values.
//!
//! # Reduction
//!
//! Applying a constraint is called *reduction*: [`PQTree::reduce`] takes
//! the subset of values and rewrites the tree in place, using the original
//! Booth-Lueker two-pass algorithm, so that exactly the orderings keeping
//! the subset consecutive remain admissible. An inapplicable constraint
//! fails the reduction and invalidates the tree; [`PQTree::safe_reduce`]
//! trades a snapshot for the guarantee that a failed call leaves the tree
//! untouched.
//!
//! Every successfully applied set is logged: [`PQTree::reductions`]
//! returns the log, [`PQTree::contained`] the union of its sets, and
//! [`PQTree::reduced_frontier`] a frontier restricted to values that a
//! constraint has mentioned.
//!
//! # Frontier
//!
//! Reading the leaves left to right yields the tree's *frontier*, one of
//! the admissible permutations.
//!
//! # Consecutive-ones example
//!
//! A 0/1-matrix has the *consecutive ones property* if its rows can be
//! reordered so that every column holds a single run of ones. Build a
//! tree over the row indices and reduce by each column's support:
//!
//! ```
//! use pqtree::PQTree;
//!
//! let mut tree = PQTree::new(&[1, 2, 3, 4, 5]).unwrap();
//! tree.reduce(&[1, 3, 4, 5]).unwrap();
//! tree.reduce(&[1, 3, 4]).unwrap();
//! tree.reduce(&[3, 4, 5]).unwrap();
//! tree.reduce(&[1, 4]).unwrap();
//!
//! let row_order = tree.frontier();
//! # assert_eq!(row_order.len(), 5);
//! ```
//!
//! All reductions succeeded, so the matrix with those column supports has
//! the property and `row_order` is a witness ordering.
//!
//! # Irreducible constraints
//!
//! ```
//! use pqtree::{PQTree, ReductionError};
//!
//! let mut tree = PQTree::new(&[1, 2, 3, 4]).unwrap();
//! tree.reduce(&[1, 2]).unwrap();
//! tree.reduce(&[2, 3]).unwrap();
//!
//! // 2 is now wedged between 1 and 3; it cannot also touch 4.
//! assert_eq!(tree.reduce(&[2, 4]), Err(ReductionError::InconsistentConstraint));
//!
//! // the failed reduction invalidated the tree
//! assert_eq!(tree.reduce(&[1, 2]), Err(ReductionError::TreeInvalid));
//! ```
//!
//! With [`PQTree::safe_reduce`] the same failure would have left the tree
//! as it was, ready for further reductions.
//!
//! [^1]: Booth, K.S., & Lueker, G.S. (1976). Testing for the Consecutive
//! Ones Property, Interval Graphs, and Graph Planarity Using PQ-Tree
//! Algorithms. J. Comput. Syst. Sci., 13, 335-379.
//! <https://doi.org/10.1016/s0022-0000(76)80045-1>

pub use self::errors::*;
pub use self::tree::PQTree;

mod bubble;
mod errors;
mod node;
mod reduce;
mod rel;
pub mod sets;
mod sublist;
mod tree;
mod walk;

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crate::{CreationError, PQTree, ReductionError};

    fn assert_consecutive(frontier: &[i32], s: &[i32]) {
        let positions: Vec<usize> =
            frontier.iter().enumerate().filter(|(_, v)| s.contains(v)).map(|(i, _)| i).collect();
        assert_eq!(positions.len(), s.len(), "{s:?} missing from frontier {frontier:?}");
        if positions.is_empty() {
            return;
        }
        let width = positions.last().unwrap() - positions.first().unwrap() + 1;
        assert_eq!(width, s.len(), "{s:?} not consecutive in frontier {frontier:?}");
    }

    fn btree(values: &[i32]) -> BTreeSet<i32> {
        values.iter().copied().collect()
    }

    /// Reductions known to be jointly satisfiable on {1..8}; ends in a
    /// state where 4 is wedged strictly between 3 and 5.
    const CHAIN: [&[i32]; 7] =
        [&[3, 4], &[3, 4, 6], &[3, 4, 5], &[4, 5], &[2, 6], &[1, 2], &[4, 5]];

    fn tree_after_chain() -> PQTree<i32> {
        let mut tree = PQTree::new(&[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        tree.reduce_all(&CHAIN).unwrap();
        tree
    }

    #[test]
    fn fresh_tree_prints_a_flat_p_node() {
        let tree = PQTree::new(&[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        assert_eq!(tree.to_string(), "(1 2 3 4 5 6 7 8)");
    }

    #[test]
    fn single_value_ground_set() {
        let tree = PQTree::new(&[7]).unwrap();
        assert_eq!(tree.to_string(), "(7)");
        assert_eq!(tree.frontier(), vec![7]);
    }

    #[test]
    fn creation_rejects_bad_ground_sets() {
        assert_eq!(PQTree::<i32>::new(&[]).unwrap_err(), CreationError::EmptyGroundSet);
        assert_eq!(PQTree::new(&[1, 2, 1]).unwrap_err(), CreationError::DuplicateLeaf(1));
    }

    #[test]
    fn every_applied_constraint_stays_consecutive() {
        let mut tree = PQTree::new(&[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let mut applied: Vec<&[i32]> = Vec::new();
        for s in CHAIN {
            tree.reduce(s).unwrap();
            applied.push(s);

            let frontier = tree.frontier();
            for a in &applied {
                assert_consecutive(&frontier, a);
            }
        }
    }

    #[test]
    fn failed_reduction_invalidates_the_tree() {
        let mut tree = tree_after_chain();
        assert_eq!(tree.reduce(&[5, 3]), Err(ReductionError::InconsistentConstraint));
        assert_eq!(tree.reduce(&[1, 2]), Err(ReductionError::TreeInvalid));
        assert_eq!(tree.reduce(&[7, 8]), Err(ReductionError::TreeInvalid));
    }

    #[test]
    fn safe_reduce_rolls_back_on_failure() {
        let mut tree = tree_after_chain();
        let frontier_before = tree.frontier();
        let printed_before = tree.to_string();
        let log_before = tree.reductions().len();

        assert_eq!(tree.safe_reduce(&[5, 3]), Err(ReductionError::InconsistentConstraint));

        assert_eq!(tree.frontier(), frontier_before);
        assert_eq!(tree.to_string(), printed_before);
        assert_eq!(tree.reductions().len(), log_before);

        // the restored tree still reduces
        tree.reduce(&[7, 8]).unwrap();
        assert_consecutive(&tree.frontier(), &[7, 8]);
    }

    #[test]
    fn safe_reduce_all_rolls_back_the_whole_batch() {
        let mut tree = PQTree::new(&[1, 2, 3, 4]).unwrap();
        tree.reduce(&[1, 2]).unwrap();
        let printed_before = tree.to_string();
        let log_before = tree.reductions().len();

        let batch: [&[i32]; 3] = [&[2, 3], &[3, 4], &[2, 4]];
        assert_eq!(tree.safe_reduce_all(&batch), Err(ReductionError::InconsistentConstraint));

        assert_eq!(tree.to_string(), printed_before);
        assert_eq!(tree.reductions().len(), log_before);
        tree.reduce(&[2, 3]).unwrap();
    }

    #[test]
    fn unknown_value_fails_and_invalidates() {
        let mut tree = PQTree::new(&[1, 2, 3]).unwrap();
        assert_eq!(tree.reduce(&[2, 9]), Err(ReductionError::UnknownLeaf(9)));
        assert_eq!(tree.reduce(&[1, 2]), Err(ReductionError::TreeInvalid));
    }

    #[test]
    fn safe_reduce_survives_an_unknown_value() {
        let mut tree = PQTree::new(&[1, 2, 3]).unwrap();
        assert_eq!(tree.safe_reduce(&[2, 9]), Err(ReductionError::UnknownLeaf(9)));
        tree.reduce(&[1, 2]).unwrap();
    }

    #[test]
    fn trivial_sets_are_logged_without_touching_the_tree() {
        let mut tree = PQTree::new(&[1, 2, 3]).unwrap();
        let printed_before = tree.to_string();

        tree.reduce(&[2]).unwrap();
        tree.reduce(&[]).unwrap();

        assert_eq!(tree.to_string(), printed_before);
        assert_eq!(tree.reductions().len(), 2);
        assert!(tree.contained().contains(&2));
    }

    #[test]
    fn duplicate_values_in_a_constraint_collapse() {
        let mut tree = PQTree::new(&[1, 2, 3, 4]).unwrap();
        tree.reduce(&[2, 3, 3, 2]).unwrap();
        assert_consecutive(&tree.frontier(), &[2, 3]);
        assert_eq!(tree.reductions()[0], btree(&[2, 3]));
    }

    #[test]
    fn repeating_a_reduction_succeeds_and_still_holds() {
        let mut tree = tree_after_chain();
        for s in CHAIN {
            tree.reduce(s).unwrap();
        }
        let frontier = tree.frontier();
        for s in CHAIN {
            assert_consecutive(&frontier, s);
        }
    }

    #[test]
    fn reduced_frontier_filters_untouched_values() {
        let mut tree = PQTree::new(&[1, 2, 3, 4, 5]).unwrap();
        tree.reduce(&[2, 3]).unwrap();
        tree.reduce(&[3, 4]).unwrap();

        assert_eq!(tree.contained(), btree(&[2, 3, 4]));

        let filtered: Vec<i32> =
            tree.frontier().into_iter().filter(|v| tree.contained().contains(v)).collect();
        assert_eq!(tree.reduced_frontier(), filtered);
        assert_eq!(tree.reduced_frontier().len(), 3);
    }

    #[test]
    fn log_records_sets_in_application_order() {
        let mut tree = PQTree::new(&[1, 2, 3, 4]).unwrap();
        tree.reduce(&[3, 4]).unwrap();
        tree.reduce(&[1, 2]).unwrap();

        let log = tree.reductions();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0], btree(&[3, 4]));
        assert_eq!(log[1], btree(&[1, 2]));
    }

    #[test]
    fn full_ground_set_reduction_is_a_no_constraint() {
        let mut tree = PQTree::new(&[1, 2, 3, 4]).unwrap();
        tree.reduce(&[1, 2, 3, 4]).unwrap();
        tree.reduce(&[2, 3]).unwrap();
        assert_consecutive(&tree.frontier(), &[2, 3]);
    }

    #[test]
    fn deep_copy_is_independent() {
        let mut tree = tree_after_chain();
        let copy = tree.clone();
        assert_eq!(tree.to_string(), copy.to_string());

        tree.reduce(&[7, 8]).unwrap();
        assert_eq!(copy.reductions().len(), CHAIN.len());
        let frontier = copy.frontier();
        for s in CHAIN {
            assert_consecutive(&frontier, s);
        }
    }
}
