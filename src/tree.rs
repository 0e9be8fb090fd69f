use std::collections::{BTreeSet, VecDeque};
use std::fmt::{self, Display, Formatter};
use std::hash::Hash;

use bimap::BiMap;

use crate::errors::{CreationError, ReductionError};
use crate::node::{Node, PNode, QNode, ReductionInfo, TreeNode, PSEUDONODE, ROOT};
use crate::rel::{ChildOfP, Rel};
use crate::sets;
use crate::walk::QChildren;

/// A PQ-tree over ground-set values of type `T`.
///
/// The tree compactly represents every permutation of the ground set in
/// which each successfully [reduced](PQTree::reduce) constraint set
/// appears consecutively; [`PQTree::frontier`] reads one of them out.
///
/// Nodes live in an index arena: the pseudo-node used by the bubble pass
/// occupies the reserved slot 0, the root slot 1, and slots freed by
/// template rewrites are recycled through a free-list. Cloning the arena
/// is a deep copy of the tree, sibling chains included.
#[derive(Debug, Clone)]
pub struct PQTree<T>
where
    T: Copy + Hash + Ord,
{
    pub(crate) nodes: Vec<TreeNode>,
    freelist: VecDeque<usize>,
    pub(crate) leaves: BiMap<T, usize>,
    reductions: Vec<BTreeSet<T>>,
    invalid: bool,
}

impl<T: Copy + Hash + Ord> PQTree<T> {
    /// Builds the unconstrained tree: a P-node over one leaf per
    /// ground-set value, admitting every permutation.
    pub fn new(ground_set: &[T]) -> Result<PQTree<T>, CreationError<T>> {
        if ground_set.is_empty() {
            return Err(CreationError::EmptyGroundSet);
        }

        let n = ground_set.len();
        let pseudonode = TreeNode {
            node: Node::Q(QNode { left: 0, right: 0 }),
            rel: Rel::Root,
            red: ReductionInfo::default(),
        };
        let root = TreeNode {
            node: Node::P(PNode { child: 2 }),
            rel: Rel::Root,
            red: ReductionInfo::default(),
        };
        let mut nodes = vec![pseudonode, root];
        nodes.extend((0..n).map(|i| TreeNode {
            node: Node::L,
            rel: Rel::P(ChildOfP { parent: ROOT, next: (i + 1) % n + 2 }),
            red: ReductionInfo::default(),
        }));

        let mut leaves = BiMap::new();
        for (i, &value) in ground_set.iter().enumerate() {
            if leaves.insert_no_overwrite(value, i + 2).is_err() {
                return Err(CreationError::DuplicateLeaf(value));
            }
        }

        Ok(PQTree { nodes, freelist: VecDeque::new(), leaves, reductions: Vec::new(), invalid: false })
    }

    /// Applies one consecutivity constraint: afterwards every admissible
    /// permutation keeps the values of `s` next to each other.
    ///
    /// Sets of fewer than two distinct values constrain nothing; they are
    /// logged and succeed without touching the tree. Any other failure
    /// leaves the tree *invalid*: further non-safe reductions are refused
    /// until the state is restored from a [`PQTree::safe_reduce`]
    /// snapshot or the tree is rebuilt.
    pub fn reduce(&mut self, s: &[T]) -> Result<(), ReductionError<T>> {
        let set: BTreeSet<T> = s.iter().copied().collect();
        if set.len() < 2 {
            self.reductions.push(set);
            return Ok(());
        }
        if self.invalid {
            return Err(ReductionError::TreeInvalid);
        }

        let mut s_nodes = Vec::with_capacity(set.len());
        for &value in &set {
            match self.leaves.get_by_left(&value) {
                Some(&leaf) => s_nodes.push(leaf),
                None => {
                    self.invalid = true;
                    return Err(ReductionError::UnknownLeaf(value));
                }
            }
        }

        if let Err(e) = self.bubble(&s_nodes).and_then(|_| self.reduce_pass(&s_nodes)) {
            self.invalid = true;
            return Err(e);
        }

        self.reductions.push(set);
        Ok(())
    }

    /// Reduces by each set in turn; the first failure aborts the batch
    /// and is returned. Earlier reductions stay applied.
    pub fn reduce_all<S: AsRef<[T]>>(&mut self, sets: &[S]) -> Result<(), ReductionError<T>> {
        for s in sets {
            self.reduce(s.as_ref())?;
        }
        Ok(())
    }

    /// Like [`reduce`](PQTree::reduce), but failure restores the tree to
    /// its state before the call, at the cost of a full snapshot.
    pub fn safe_reduce(&mut self, s: &[T]) -> Result<(), ReductionError<T>> {
        let snapshot = self.clone();
        match self.reduce(s) {
            Ok(()) => Ok(()),
            Err(e) => {
                *self = snapshot;
                Err(e)
            }
        }
    }

    /// Like [`reduce_all`](PQTree::reduce_all), but failure rolls the
    /// whole batch back.
    pub fn safe_reduce_all<S: AsRef<[T]>>(&mut self, sets: &[S]) -> Result<(), ReductionError<T>> {
        let snapshot = self.clone();
        match self.reduce_all(sets) {
            Ok(()) => Ok(()),
            Err(e) => {
                *self = snapshot;
                Err(e)
            }
        }
    }

    /// One admissible permutation: the leaves read off depth-first, with
    /// P-children in stored order and Q-children in chain order.
    pub fn frontier(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.leaves.len());
        self.push_frontier(&mut out, ROOT);
        out
    }

    /// The frontier restricted to values that took part in at least one
    /// logged reduction.
    pub fn reduced_frontier(&self) -> Vec<T> {
        let contained = self.contained();
        self.frontier().into_iter().filter(|v| sets::contains(&contained, v)).collect()
    }

    /// The constraint sets applied so far, in application order.
    pub fn reductions(&self) -> &[BTreeSet<T>] {
        &self.reductions
    }

    /// The union of all logged constraint sets.
    pub fn contained(&self) -> BTreeSet<T> {
        self.reductions.iter().fold(BTreeSet::new(), |acc, s| sets::union(&acc, s))
    }

    fn push_frontier(&self, out: &mut Vec<T>, idx: usize) {
        match self.nodes[idx].node {
            Node::L => out.push(*self.leaves.get_by_right(&idx).expect("leaf missing from index")),
            Node::P(p) => {
                let mut child = p.child;
                loop {
                    self.push_frontier(out, child);
                    child = self.nodes[child].rel.as_p().next;
                    if child == p.child {
                        break;
                    }
                }
            }
            Node::Q(_) => {
                for child in QChildren::new(&self.nodes, idx) {
                    self.push_frontier(out, child);
                }
            }
        }
    }

    /// Puts a node into a recycled or fresh arena slot.
    pub(crate) fn add_node(&mut self, node: TreeNode) -> usize {
        if let Some(free) = self.freelist.pop_front() {
            self.nodes[free] = node;
            free
        } else {
            self.nodes.push(node);
            self.nodes.len() - 1
        }
    }

    /// Releases a slot whose subtree has been spliced elsewhere.
    pub(crate) fn recycle_node(&mut self, idx: usize) {
        debug_assert_ne!(idx, PSEUDONODE);
        debug_assert_ne!(idx, ROOT);
        debug_assert!(!self.freelist.contains(&idx));
        self.nodes[idx].rel = Rel::Root;
        self.freelist.push_back(idx);
    }
}

impl<T: Copy + Hash + Ord + Display> PQTree<T> {
    fn fmt_node(&self, f: &mut Formatter<'_>, idx: usize) -> fmt::Result {
        match self.nodes[idx].node {
            Node::L => {
                write!(f, "{}", self.leaves.get_by_right(&idx).expect("leaf missing from index"))
            }
            Node::P(p) => {
                write!(f, "(")?;
                let mut child = p.child;
                loop {
                    self.fmt_node(f, child)?;
                    child = self.nodes[child].rel.as_p().next;
                    if child == p.child {
                        break;
                    }
                    write!(f, " ")?;
                }
                write!(f, ")")
            }
            Node::Q(_) => {
                write!(f, "[")?;
                let mut sep = "";
                for child in QChildren::new(&self.nodes, idx) {
                    write!(f, "{}", sep)?;
                    self.fmt_node(f, child)?;
                    sep = " ";
                }
                write!(f, "]")
            }
        }
    }
}

/// Stable debug rendering: leaves as their value, P-nodes as
/// `(c1 c2 … cn)`, Q-nodes as `[c1 c2 … cn]` in chain order from the
/// left end.
impl<T: Copy + Hash + Ord + Display> Display for PQTree<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, ROOT)
    }
}
